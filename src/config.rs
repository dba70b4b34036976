use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub weather: WeatherConfig,
    #[serde(default)]
    pub hotels: HotelsConfig,
    #[serde(default)]
    pub flights: FlightsConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Nominatim rejects requests without an identifying agent.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

/// OpenWeatherMap settings.
#[derive(Debug, Deserialize)]
pub struct WeatherConfig {
    #[serde(default = "default_weather_key")]
    pub api_key: String,
    #[serde(default = "default_weather_url")]
    pub base_url: String,
    #[serde(default = "default_units")]
    pub units: String,
    /// Number of 3-hour forecast steps to keep.
    #[serde(default = "default_forecast_entries")]
    pub forecast_entries: usize,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: default_weather_key(),
            base_url: default_weather_url(),
            units: default_units(),
            forecast_entries: default_forecast_entries(),
        }
    }
}

/// OpenStreetMap settings (Nominatim + Overpass, both keyless).
#[derive(Debug, Deserialize)]
pub struct HotelsConfig {
    #[serde(default = "default_geocode_url")]
    pub geocode_url: String,
    #[serde(default = "default_overpass_url")]
    pub overpass_url: String,
    #[serde(default = "default_radius_m")]
    pub radius_m: u32,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl Default for HotelsConfig {
    fn default() -> Self {
        Self {
            geocode_url: default_geocode_url(),
            overpass_url: default_overpass_url(),
            radius_m: default_radius_m(),
            max_results: default_max_results(),
        }
    }
}

/// AviationStack settings.
#[derive(Debug, Deserialize)]
pub struct FlightsConfig {
    #[serde(default = "default_flights_key")]
    pub api_key: String,
    #[serde(default = "default_flights_url")]
    pub base_url: String,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl Default for FlightsConfig {
    fn default() -> Self {
        Self {
            api_key: default_flights_key(),
            base_url: default_flights_url(),
            max_results: default_max_results(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: crate::llm::Provider,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    pub api_key_env: Option<String>,
    pub base_url: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: crate::llm::Provider::default(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            api_key_env: None,
            base_url: None,
        }
    }
}

/// What the pipeline does when a weather/hotel/flight fetch fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContextPolicy {
    /// Abort the request with the provider's error.
    #[default]
    FailFast,
    /// Leave the field empty, mark it degraded and keep composing.
    Degrade,
}

#[derive(Debug, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub on_context_failure: ContextPolicy,
    #[serde(default = "default_origin")]
    pub default_origin: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            on_context_failure: ContextPolicy::default(),
            default_origin: default_origin(),
        }
    }
}

// Defaults
fn default_timeout_secs() -> u64 {
    30
}
fn default_user_agent() -> String {
    concat!("trip-planner/", env!("CARGO_PKG_VERSION")).into()
}
fn default_weather_key() -> String {
    std::env::var("OPENWEATHER_API_KEY").unwrap_or_default()
}
fn default_weather_url() -> String {
    "https://api.openweathermap.org/data/2.5".into()
}
fn default_units() -> String {
    "metric".into()
}
fn default_forecast_entries() -> usize {
    8
}
fn default_geocode_url() -> String {
    "https://nominatim.openstreetmap.org".into()
}
fn default_overpass_url() -> String {
    "https://overpass-api.de/api/interpreter".into()
}
fn default_radius_m() -> u32 {
    5000
}
fn default_max_results() -> usize {
    3
}
fn default_flights_key() -> String {
    std::env::var("AVIATIONSTACK_API_KEY").unwrap_or_default()
}
fn default_flights_url() -> String {
    // Free AviationStack plans are HTTP-only.
    "http://api.aviationstack.com/v1".into()
}
fn default_model() -> String {
    "llama-3.1-8b-instant".into()
}
fn default_max_tokens() -> u32 {
    2048
}
fn default_temperature() -> f32 {
    0.7
}
fn default_origin() -> String {
    "London".into()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("Failed to read config {}: {e}", path.display())))?;
        toml::from_str(&content).map_err(|e| Error::config(format!("Failed to parse config: {e}")))
    }

    /// Missing provider keys are fatal under fail-fast. Under degrade they
    /// only warn, since the pipeline can plan without that source.
    pub fn validate(&self) -> Result<()> {
        let missing = [
            (
                self.weather.api_key.is_empty(),
                "OPENWEATHER_API_KEY not set. Export it or set weather.api_key in config.toml",
            ),
            (
                self.flights.api_key.is_empty(),
                "AVIATIONSTACK_API_KEY not set. Export it or set flights.api_key in config.toml",
            ),
        ];
        for (is_missing, msg) in missing {
            if !is_missing {
                continue;
            }
            match self.pipeline.on_context_failure {
                ContextPolicy::FailFast => return Err(Error::config(msg)),
                ContextPolicy::Degrade => warn!("{msg}; that source will be left out"),
            }
        }
        if self.hotels.max_results == 0 || self.flights.max_results == 0 {
            return Err(Error::config("max_results must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Provider;

    #[test]
    fn full_config_parses() {
        let toml = r#"
[http]
timeout_secs = 10
user_agent = "test-agent/1.0"

[weather]
api_key = "owm_test"
base_url = "http://localhost:9000/data/2.5"
forecast_entries = 4

[hotels]
radius_m = 2500
max_results = 5

[flights]
api_key = "as_test"

[llm]
provider = "anthropic"
model = "claude-test"
max_tokens = 1024
temperature = 0.2

[pipeline]
on_context_failure = "degrade"
default_origin = "Berlin"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.http.timeout(), Duration::from_secs(10));
        assert_eq!(config.weather.api_key, "owm_test");
        assert_eq!(config.weather.forecast_entries, 4);
        assert_eq!(config.hotels.radius_m, 2500);
        assert_eq!(config.hotels.max_results, 5);
        assert_eq!(config.flights.max_results, 3);
        assert!(matches!(config.llm.provider, Provider::Anthropic));
        assert!((config.llm.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.pipeline.on_context_failure, ContextPolicy::Degrade);
        assert_eq!(config.pipeline.default_origin, "Berlin");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.http.timeout_secs, 30);
        assert_eq!(config.weather.units, "metric");
        assert_eq!(config.weather.forecast_entries, 8);
        assert_eq!(config.hotels.radius_m, 5000);
        assert_eq!(config.llm.model, "llama-3.1-8b-instant");
        assert!(matches!(config.llm.provider, Provider::Groq));
        assert_eq!(config.pipeline.on_context_failure, ContextPolicy::FailFast);
        assert_eq!(config.pipeline.default_origin, "London");
    }

    #[test]
    fn degrade_tolerates_missing_provider_keys() {
        let mut config = Config::default();
        config.weather.api_key = "x".into();
        config.flights.api_key = String::new();
        config.pipeline.on_context_failure = ContextPolicy::Degrade;
        assert!(config.validate().is_ok());

        config.flights.max_results = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_missing_keys() {
        let mut config = Config::default();
        config.weather.api_key = String::new();
        config.flights.api_key = "x".into();
        assert!(config.validate().is_err());

        config.weather.api_key = "x".into();
        config.flights.api_key = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[flights]\nmax_results = 7\n").unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.flights.max_results, 7);
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Config::load(Path::new("/nonexistent/trip.toml")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
