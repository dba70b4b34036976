use super::types::{ContextSource, CurrentConditions, ForecastPoint, Month, WeatherSnapshot};
use super::WeatherSource;
use crate::config::WeatherConfig;
use crate::error::{Error, Result};
use crate::http::HttpClient;
use async_trait::async_trait;
use chrono::DateTime;
use serde::Deserialize;
use tracing::{debug, info};

#[derive(Deserialize)]
struct CurrentResponse {
    name: String,
    #[serde(default)]
    weather: Vec<Condition>,
    main: MainReadings,
    #[serde(default)]
    wind: Option<Wind>,
}

#[derive(Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    list: Vec<ForecastItem>,
}

#[derive(Deserialize)]
struct ForecastItem {
    dt: i64,
    main: MainReadings,
    #[serde(default)]
    weather: Vec<Condition>,
}

#[derive(Deserialize)]
struct Condition {
    description: String,
}

#[derive(Deserialize)]
struct MainReadings {
    temp: f64,
    #[serde(default)]
    feels_like: Option<f64>,
    #[serde(default)]
    humidity: Option<u8>,
}

#[derive(Deserialize)]
struct Wind {
    speed: f64,
}

/// OpenWeatherMap current conditions + 3-hourly forecast.
pub struct WeatherClient {
    api_key: String,
    base_url: String,
    units: String,
    forecast_entries: usize,
    http: HttpClient,
}

impl WeatherClient {
    pub fn new(config: &WeatherConfig, http: HttpClient) -> Self {
        Self {
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            units: config.units.clone(),
            forecast_entries: config.forecast_entries,
            http,
        }
    }

    async fn fetch_inner(&self, city: &str, month: Month) -> Result<WeatherSnapshot> {
        let cnt = self.forecast_entries.to_string();
        let params = [
            ("q", city),
            ("appid", self.api_key.as_str()),
            ("units", self.units.as_str()),
        ];

        debug!(city, "fetching current weather");
        let current: CurrentResponse = self
            .http
            .get_json(&format!("{}/weather", self.base_url), &params)
            .await?;

        debug!(city, "fetching forecast");
        let mut forecast_params = params.to_vec();
        forecast_params.push(("cnt", cnt.as_str()));
        let forecast: ForecastResponse = self
            .http
            .get_json(&format!("{}/forecast", self.base_url), &forecast_params)
            .await?;

        into_snapshot(current, forecast, month, self.forecast_entries)
    }
}

#[async_trait]
impl WeatherSource for WeatherClient {
    async fn fetch(&self, city: &str, month: Month) -> Result<WeatherSnapshot> {
        let snapshot = self
            .fetch_inner(city, month)
            .await
            .map_err(|e| Error::external(ContextSource::Weather, e))?;
        info!(
            city,
            temperature = snapshot.current.temperature_c,
            forecast_points = snapshot.forecast.len(),
            "collected weather"
        );
        Ok(snapshot)
    }
}

fn describe(conditions: &[Condition]) -> String {
    conditions
        .first()
        .map(|c| c.description.clone())
        .unwrap_or_else(|| "unknown".into())
}

fn into_snapshot(
    current: CurrentResponse,
    forecast: ForecastResponse,
    month: Month,
    max_points: usize,
) -> Result<WeatherSnapshot> {
    let forecast = forecast
        .list
        .into_iter()
        .take(max_points)
        .map(|item| {
            let time = DateTime::from_timestamp(item.dt, 0)
                .ok_or_else(|| Error::parse(format!("forecast timestamp out of range: {}", item.dt)))?;
            Ok(ForecastPoint {
                time,
                temperature_c: item.main.temp,
                description: describe(&item.weather),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(WeatherSnapshot {
        location: current.name,
        current: CurrentConditions {
            temperature_c: current.main.temp,
            feels_like_c: current.main.feels_like.unwrap_or(current.main.temp),
            humidity_pct: current.main.humidity.unwrap_or_default(),
            wind_speed_ms: current.wind.map(|w| w.speed).unwrap_or_default(),
            description: describe(&current.weather),
        },
        forecast,
        travel_month: month,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CURRENT: &str = r#"{
        "name": "Paris",
        "weather": [{"id": 800, "main": "Clear", "description": "clear sky"}],
        "main": {"temp": 21.4, "feels_like": 20.9, "humidity": 48},
        "wind": {"speed": 3.6}
    }"#;

    const FORECAST: &str = r#"{
        "cnt": 3,
        "list": [
            {"dt": 1718010000, "main": {"temp": 22.0}, "weather": [{"description": "few clouds"}]},
            {"dt": 1718020800, "main": {"temp": 19.5}, "weather": [{"description": "light rain"}]},
            {"dt": 1718031600, "main": {"temp": 17.1}, "weather": []}
        ]
    }"#;

    #[test]
    fn snapshot_from_openweathermap_payloads() {
        let current: CurrentResponse = serde_json::from_str(CURRENT).unwrap();
        let forecast: ForecastResponse = serde_json::from_str(FORECAST).unwrap();
        let snapshot = into_snapshot(current, forecast, Month::June, 8).unwrap();

        assert_eq!(snapshot.location, "Paris");
        assert_eq!(snapshot.current.description, "clear sky");
        assert_eq!(snapshot.current.humidity_pct, 48);
        assert!((snapshot.current.wind_speed_ms - 3.6).abs() < 1e-9);
        assert_eq!(snapshot.forecast.len(), 3);
        assert_eq!(snapshot.forecast[1].description, "light rain");
        assert_eq!(snapshot.forecast[2].description, "unknown");
        assert_eq!(snapshot.forecast[0].time.timestamp(), 1718010000);
        assert_eq!(snapshot.travel_month, Month::June);
    }

    #[test]
    fn forecast_is_capped() {
        let current: CurrentResponse = serde_json::from_str(CURRENT).unwrap();
        let forecast: ForecastResponse = serde_json::from_str(FORECAST).unwrap();
        let snapshot = into_snapshot(current, forecast, Month::June, 2).unwrap();
        assert_eq!(snapshot.forecast.len(), 2);
    }

    #[test]
    fn sparse_current_payload_falls_back() {
        let current: CurrentResponse =
            serde_json::from_str(r#"{"name": "Reykjavik", "main": {"temp": -2.0}}"#).unwrap();
        let snapshot =
            into_snapshot(current, ForecastResponse { list: vec![] }, Month::January, 8).unwrap();
        assert!((snapshot.current.feels_like_c + 2.0).abs() < 1e-9);
        assert_eq!(snapshot.current.description, "unknown");
        assert!(snapshot.forecast.is_empty());
    }

    #[test]
    fn missing_temperature_is_malformed() {
        assert!(serde_json::from_str::<CurrentResponse>(r#"{"name": "X", "main": {}}"#).is_err());
    }
}
