#![allow(dead_code)]

use httpmock::MockServer;
use trip_planner::config::Config;
use trip_planner::llm::Provider;

/// A config whose every provider points at `server`.
pub fn config(server: &MockServer) -> Config {
    let base = server.base_url();
    let mut config = Config::default();
    config.http.timeout_secs = 5;
    config.weather.api_key = "owm-test".into();
    config.weather.base_url = format!("{base}/data/2.5");
    config.hotels.geocode_url = base.clone();
    config.hotels.overpass_url = format!("{base}/api/interpreter");
    config.flights.api_key = "as-test".into();
    config.flights.base_url = format!("{base}/v1");
    config.llm.provider = Provider::OpenAi;
    config.llm.model = "test-model".into();
    config.llm.api_key_env = Some("TRIP_PLANNER_TEST_LLM_KEY".into());
    config.llm.base_url = Some(format!("{base}/v1"));
    config
}

pub const PARIS_WEATHER: &str = r#"{
    "name": "Paris",
    "weather": [{"description": "clear sky"}],
    "main": {"temp": 22.5, "feels_like": 22.0, "humidity": 45},
    "wind": {"speed": 4.1}
}"#;

pub const PARIS_FORECAST: &str = r#"{
    "list": [
        {"dt": 1749549600, "main": {"temp": 23.0}, "weather": [{"description": "few clouds"}]},
        {"dt": 1749560400, "main": {"temp": 18.0}, "weather": [{"description": "light rain"}]}
    ]
}"#;

pub const PARIS_GEOCODE: &str = r#"[{"lat": "48.8566", "lon": "2.3522", "display_name": "Paris, France"}]"#;

pub const PARIS_OVERPASS: &str = r#"{
    "elements": [
        {"type": "node", "id": 10, "lat": 48.8606, "lon": 2.3376,
         "tags": {"tourism": "hotel", "name": "Hôtel du Louvre", "stars": "5",
                  "addr:street": "Place André Malraux", "addr:country": "FR",
                  "phone": "+33 1 44 58 38 38"}},
        {"type": "node", "id": 11, "lat": 48.853, "lon": 2.3499,
         "tags": {"tourism": "hotel", "name": "Hôtel Esmeralda"}},
        {"type": "way", "id": 12, "nodes": [13],
         "tags": {"tourism": "hotel", "name": "Hôtel Lutetia"}},
        {"type": "node", "id": 13, "lat": 48.8511, "lon": 2.3270}
    ]
}"#;

pub const PARIS_FLIGHTS: &str = r#"{
    "data": [
        {
            "airline": {"name": "Air France"},
            "flight": {"number": "1081", "iata": "AF1081"},
            "departure": {"iata": "LHR", "timezone": "Europe/London",
                          "scheduled": "2025-06-10T07:15:00+00:00"},
            "arrival": {"iata": "CDG", "timezone": "Europe/Paris",
                        "scheduled": "2025-06-10T09:30:00+00:00"}
        }
    ]
}"#;

pub fn chat_completion(content: &str) -> String {
    serde_json::json!({
        "id": "chatcmpl-test",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
    })
    .to_string()
}

pub const PARIS_ITINERARY: &str = "Paris has shaped European art, politics and cuisine for centuries.\n\nDay 1: Louvre and the Tuileries.\nDay 2: Montmartre.";
