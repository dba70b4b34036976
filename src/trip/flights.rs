use super::types::{ContextSource, FlightOption};
use super::FlightSource;
use crate::config::FlightsConfig;
use crate::error::{Error, Result};
use crate::http::HttpClient;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use tracing::{debug, info};

#[derive(Deserialize)]
struct FlightsResponse {
    #[serde(default)]
    data: Vec<FlightRecord>,
    error: Option<ApiError>,
}

/// AviationStack reports some failures (bad key, quota) inside a 200 body.
#[derive(Deserialize)]
struct ApiError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct FlightRecord {
    airline: Option<Named>,
    flight: Option<FlightId>,
    departure: Option<Endpoint>,
    arrival: Option<Endpoint>,
}

#[derive(Deserialize)]
struct Named {
    name: Option<String>,
}

#[derive(Deserialize)]
struct FlightId {
    number: Option<String>,
    iata: Option<String>,
}

/// `scheduled` is airport-local wall-clock time despite its `+00:00` suffix;
/// `timezone` names the airport's real zone.
#[derive(Deserialize)]
struct Endpoint {
    scheduled: Option<DateTime<FixedOffset>>,
    timezone: Option<String>,
}

impl Endpoint {
    /// The scheduled instant in UTC, when the airport zone is known.
    fn scheduled_utc(&self) -> Option<DateTime<Utc>> {
        let local = self.scheduled?.naive_local();
        let tz: Tz = self.timezone.as_deref()?.parse().ok()?;
        tz.from_local_datetime(&local)
            .earliest()
            .map(|t| t.with_timezone(&Utc))
    }
}

/// Scheduled flights between two airports, from AviationStack.
pub struct FlightClient {
    api_key: String,
    base_url: String,
    max_results: usize,
    http: HttpClient,
}

impl FlightClient {
    pub fn new(config: &FlightsConfig, http: HttpClient) -> Self {
        Self {
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_results: config.max_results,
            http,
        }
    }

    async fn search_inner(&self, origin: &str, destination: &str) -> Result<Vec<FlightOption>> {
        let dep = airport_code(origin);
        let arr = airport_code(destination);
        let limit = self.max_results.to_string();
        debug!(dep = %dep, arr = %arr, "searching flights");

        let resp: FlightsResponse = self
            .http
            .get_json(
                &format!("{}/flights", self.base_url),
                &[
                    ("access_key", self.api_key.as_str()),
                    ("dep_iata", dep.as_str()),
                    ("arr_iata", arr.as_str()),
                    ("limit", limit.as_str()),
                ],
            )
            .await?;

        if let Some(err) = resp.error {
            return Err(Error::api(
                "api.aviationstack.com",
                format!(
                    "{}: {}",
                    err.code.as_deref().unwrap_or("error"),
                    err.message.as_deref().unwrap_or("no message")
                ),
            ));
        }

        Ok(resp
            .data
            .into_iter()
            .take(self.max_results)
            .map(into_option)
            .collect())
    }
}

#[async_trait]
impl FlightSource for FlightClient {
    async fn search(&self, origin: &str, destination: &str) -> Result<Vec<FlightOption>> {
        let flights = self
            .search_inner(origin, destination)
            .await
            .map_err(|e| Error::external(ContextSource::Flights, e))?;
        info!(origin, destination, count = flights.len(), "collected flight options");
        Ok(flights)
    }
}

fn into_option(record: FlightRecord) -> FlightOption {
    let departure = record.departure.as_ref().and_then(Endpoint::scheduled_utc);
    let arrival = record.arrival.as_ref().and_then(Endpoint::scheduled_utc);
    let flight_number = record
        .flight
        .and_then(|f| f.iata.or(f.number))
        .unwrap_or_else(|| "Unknown".into());

    FlightOption {
        carrier: record
            .airline
            .and_then(|a| a.name)
            .unwrap_or_else(|| "Unknown Airline".into()),
        flight_number,
        // AviationStack publishes schedules, not fares.
        price: None,
        departure,
        arrival,
        // Without both airport zones the local times cannot be compared.
        duration: departure.zip(arrival).and_then(|(d, a)| format_duration(a - d)),
    }
}

fn format_duration(span: chrono::Duration) -> Option<String> {
    let minutes = span.num_minutes();
    if minutes <= 0 {
        return None;
    }
    Some(format!("{}h {:02}m", minutes / 60, minutes % 60))
}

/// IATA code for a city. Unknown cities fall back to their first three letters.
pub fn airport_code(city: &str) -> String {
    let key = city.trim().to_lowercase();
    let known = match key.as_str() {
        "tokyo" => Some("HND"),
        "osaka" | "kyoto" => Some("KIX"),
        "delhi" => Some("DEL"),
        "mumbai" => Some("BOM"),
        "udaipur" => Some("UDR"),
        "london" => Some("LHR"),
        "paris" => Some("CDG"),
        "new york" => Some("JFK"),
        "singapore" => Some("SIN"),
        "bangkok" => Some("BKK"),
        _ => None,
    };
    match known {
        Some(code) => code.to_string(),
        None => city.trim().chars().take(3).collect::<String>().to_uppercase(),
    }
}
