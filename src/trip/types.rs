use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const MAX_TRIP_DAYS: u32 = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Self::January,
        Self::February,
        Self::March,
        Self::April,
        Self::May,
        Self::June,
        Self::July,
        Self::August,
        Self::September,
        Self::October,
        Self::November,
        Self::December,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::January => "January",
            Self::February => "February",
            Self::March => "March",
            Self::April => "April",
            Self::May => "May",
            Self::June => "June",
            Self::July => "July",
            Self::August => "August",
            Self::September => "September",
            Self::October => "October",
            Self::November => "November",
            Self::December => "December",
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Month {
    type Err = Error;

    /// Accepts full names and three-letter abbreviations, any case.
    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|m| {
                let name = m.name().to_ascii_lowercase();
                name == needle || (needle.len() == 3 && name.starts_with(&needle))
            })
            .ok_or_else(|| Error::invalid_request(format!("unknown month '{s}'")))
    }
}

/// User-submitted trip parameters. Validated on construction, immutable after.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripRequest {
    destination: String,
    origin: String,
    days: u32,
    month: Month,
}

impl TripRequest {
    pub fn new(
        destination: impl Into<String>,
        days: u32,
        month: Month,
        origin: impl Into<String>,
    ) -> Result<Self> {
        let destination = destination.into().trim().to_string();
        let origin = origin.into().trim().to_string();
        if destination.is_empty() {
            return Err(Error::invalid_request("destination must not be empty"));
        }
        if origin.is_empty() {
            return Err(Error::invalid_request("origin must not be empty"));
        }
        if days == 0 || days > MAX_TRIP_DAYS {
            return Err(Error::invalid_request(format!(
                "days must be between 1 and {MAX_TRIP_DAYS}, got {days}"
            )));
        }
        Ok(Self {
            destination,
            origin,
            days,
            month,
        })
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    pub fn month(&self) -> Month {
        self.month
    }
}

/// Which context provider a piece of data (or a failure) came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextSource {
    Weather,
    Hotels,
    Flights,
}

impl ContextSource {
    pub fn service_name(self) -> &'static str {
        match self {
            Self::Weather => "OpenWeatherMap",
            Self::Hotels => "OpenStreetMap",
            Self::Flights => "AviationStack",
        }
    }
}

impl fmt::Display for ContextSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Weather => write!(f, "weather"),
            Self::Hotels => write!(f, "hotel"),
            Self::Flights => write!(f, "flight"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: u8,
    pub wind_speed_ms: f64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub time: DateTime<Utc>,
    pub temperature_c: f64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// City name as resolved by the provider.
    pub location: String,
    pub current: CurrentConditions,
    pub forecast: Vec<ForecastPoint>,
    pub travel_month: Month,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub street: Option<String>,
    pub city: String,
    pub country: Option<String>,
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = [
            self.street.as_deref(),
            Some(self.city.as_str()),
            self.country.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect();
        f.write_str(&parts.join(", "))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotelOption {
    pub name: String,
    pub price_indicator: Option<String>,
    /// Star rating, when the listing carries one.
    pub rating: Option<f32>,
    pub address: Address,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl HotelOption {
    pub fn map_url(&self) -> String {
        format!(
            "https://www.openstreetmap.org/?mlat={lat}&mlon={lon}#map=16/{lat}/{lon}",
            lat = self.latitude,
            lon = self.longitude
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightOption {
    pub carrier: String,
    pub flight_number: String,
    pub price: Option<String>,
    pub departure: Option<DateTime<Utc>>,
    pub arrival: Option<DateTime<Utc>>,
    /// Human-readable scheduled duration, e.g. "7h 05m".
    pub duration: Option<String>,
}

/// Final output of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripPlan {
    pub request: TripRequest,
    pub destination_summary: String,
    pub weather: Option<WeatherSnapshot>,
    pub hotels: Vec<HotelOption>,
    pub flights: Vec<FlightOption>,
    pub itinerary: String,
    /// Sources that failed and were left empty (degrade policy only).
    #[serde(default)]
    pub degraded: Vec<ContextSource>,
    pub generated_at: DateTime<Utc>,
}

impl TripPlan {
    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_parses_names_and_abbreviations() {
        assert_eq!("June".parse::<Month>().unwrap(), Month::June);
        assert_eq!("june".parse::<Month>().unwrap(), Month::June);
        assert_eq!("SEP".parse::<Month>().unwrap(), Month::September);
        assert_eq!(" december ".parse::<Month>().unwrap(), Month::December);
        assert!("Ju".parse::<Month>().is_err());
        assert!("Smarch".parse::<Month>().is_err());
    }

    #[test]
    fn request_trims_and_validates() {
        let req = TripRequest::new("  Paris ", 5, Month::June, "London").unwrap();
        assert_eq!(req.destination(), "Paris");
        assert_eq!(req.days(), 5);

        assert!(TripRequest::new("", 3, Month::May, "London").is_err());
        assert!(TripRequest::new("Paris", 0, Month::May, "London").is_err());
        assert!(TripRequest::new("Paris", MAX_TRIP_DAYS + 1, Month::May, "London").is_err());
        assert!(TripRequest::new("Paris", 3, Month::May, "   ").is_err());
        assert!(TripRequest::new("Paris", MAX_TRIP_DAYS, Month::May, "London").is_ok());
    }

    #[test]
    fn address_skips_missing_parts() {
        let address = Address {
            street: None,
            city: "Paris".into(),
            country: Some("FR".into()),
        };
        assert_eq!(address.to_string(), "Paris, FR");
    }

    #[test]
    fn context_source_display_is_lowercase() {
        assert_eq!(ContextSource::Weather.to_string(), "weather");
        assert_eq!(ContextSource::Flights.service_name(), "AviationStack");
    }
}
