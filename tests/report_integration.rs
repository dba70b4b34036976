use chrono::Utc;
use trip_planner::output;
use trip_planner::trip::{
    Address, ContextSource, CurrentConditions, FlightOption, HotelOption, Month, TripPlan,
    TripRequest, WeatherSnapshot,
};

fn make_plan() -> TripPlan {
    TripPlan {
        request: TripRequest::new("Tokyo", 3, Month::April, "London").unwrap(),
        destination_summary: "Tokyo mixes ancient shrines with neon-lit streets.".into(),
        weather: Some(WeatherSnapshot {
            location: "Tokyo".into(),
            current: CurrentConditions {
                temperature_c: 16.2,
                feels_like_c: 15.0,
                humidity_pct: 60,
                wind_speed_ms: 3.3,
                description: "scattered clouds".into(),
            },
            forecast: vec![],
            travel_month: Month::April,
        }),
        hotels: vec![HotelOption {
            name: "Park Hyatt Tokyo".into(),
            price_indicator: None,
            rating: Some(5.0),
            address: Address {
                street: Some("Nishi-Shinjuku".into()),
                city: "Tokyo".into(),
                country: Some("JP".into()),
            },
            phone: Some("+81 3-5322-1234".into()),
            website: None,
            latitude: 35.6856,
            longitude: 139.6909,
        }],
        flights: vec![FlightOption {
            carrier: "Japan Airlines".into(),
            flight_number: "JL44".into(),
            price: None,
            departure: None,
            arrival: None,
            duration: None,
        }],
        itinerary: "Day 1: Senso-ji & Asakusa\n\nDay 2: Shinjuku Gyoen".into(),
        degraded: vec![],
        generated_at: Utc::now(),
    }
}

#[test]
fn page_contains_all_sections() {
    let html = output::render_trip_plan(&make_plan()).unwrap();
    assert!(html.contains("<!DOCTYPE html>"));
    assert!(html.contains("3-day trip to Tokyo"));
    assert!(html.contains("scattered clouds"));
    assert!(html.contains("Park Hyatt Tokyo"));
    assert!(html.contains("5 stars"));
    assert!(html.contains("openstreetmap.org/?mlat=35.6856"));
    assert!(html.contains("Japan Airlines - Flight JL44"));
    assert!(html.contains("Shinjuku Gyoen"));
}

#[test]
fn itinerary_text_is_escaped() {
    let html = output::render_trip_plan(&make_plan()).unwrap();
    assert!(html.contains("Senso-ji &amp; Asakusa") || html.contains("Senso-ji &#38; Asakusa"));
    assert!(!html.contains("Senso-ji & Asakusa"));
}

#[test]
fn only_http_websites_become_links() {
    let mut plan = make_plan();
    plan.hotels[0].website = Some("javascript:alert(1)".into());
    let html = output::render_trip_plan(&plan).unwrap();
    assert!(!html.contains("javascript:"));
    assert!(!html.contains("Website:"));

    plan.hotels[0].website = Some("https://park.hyatt.example/tokyo".into());
    let html = output::render_trip_plan(&plan).unwrap();
    assert!(html.contains("Website:"));
    assert!(html.contains("park.hyatt.example/tokyo"));
}

#[test]
fn empty_sections_show_fallback_notes() {
    let mut plan = make_plan();
    plan.hotels.clear();
    plan.flights.clear();
    let html = output::render_trip_plan(&plan).unwrap();
    assert!(html.contains("Could not find hotel listings"));
    assert!(html.contains("No scheduled flights found"));
}

#[test]
fn degraded_sources_are_flagged() {
    let mut plan = make_plan();
    plan.weather = None;
    plan.degraded = vec![ContextSource::Weather];
    let html = output::render_trip_plan(&plan).unwrap();
    assert!(html.contains("Planned without"));
    assert!(html.contains("Could not reach OpenWeatherMap"));
}

#[test]
fn plan_json_roundtrip_renders() {
    let json = serde_json::to_string(&make_plan()).unwrap();
    let plan: TripPlan = serde_json::from_str(&json).unwrap();
    let html = output::render_trip_plan(&plan).unwrap();
    assert!(html.contains("Tokyo"));
}
