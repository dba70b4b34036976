use super::types::{Address, ContextSource, HotelOption};
use super::HotelSource;
use crate::config::HotelsConfig;
use crate::error::{Error, Result};
use crate::http::HttpClient;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, info};

#[derive(Deserialize)]
struct Place {
    lat: String,
    lon: String,
}

#[derive(Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<Element>,
}

#[derive(Deserialize)]
struct Element {
    #[serde(rename = "type")]
    kind: String,
    lat: Option<f64>,
    lon: Option<f64>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

/// Hotel listings from OpenStreetMap: Nominatim geocoding, then an Overpass
/// radius query for `tourism=hotel`.
pub struct HotelClient {
    geocode_url: String,
    overpass_url: String,
    radius_m: u32,
    max_results: usize,
    http: HttpClient,
}

impl HotelClient {
    pub fn new(config: &HotelsConfig, http: HttpClient) -> Self {
        Self {
            geocode_url: config.geocode_url.trim_end_matches('/').to_string(),
            overpass_url: config.overpass_url.clone(),
            radius_m: config.radius_m,
            max_results: config.max_results,
            http,
        }
    }

    async fn locate(&self, city: &str) -> Result<Option<(f64, f64)>> {
        debug!(city, "geocoding city");
        let places: Vec<Place> = self
            .http
            .get_json(
                &format!("{}/search", self.geocode_url),
                &[("q", city), ("format", "json"), ("limit", "1")],
            )
            .await?;

        match places.first() {
            Some(place) => {
                let lat = place
                    .lat
                    .parse()
                    .map_err(|e| Error::parse(format!("latitude '{}': {e}", place.lat)))?;
                let lon = place
                    .lon
                    .parse()
                    .map_err(|e| Error::parse(format!("longitude '{}': {e}", place.lon)))?;
                Ok(Some((lat, lon)))
            }
            None => Ok(None),
        }
    }

    async fn search_inner(&self, city: &str) -> Result<Vec<HotelOption>> {
        let Some((lat, lon)) = self.locate(city).await? else {
            info!(city, "city not found by geocoder, no hotels");
            return Ok(Vec::new());
        };

        let query = overpass_query(lat, lon, self.radius_m);
        debug!(city, lat, lon, radius_m = self.radius_m, "querying Overpass");
        let resp: OverpassResponse = self
            .http
            .post_form_json(&self.overpass_url, &[("data", query.as_str())])
            .await?;

        Ok(collect_hotels(resp, city, self.max_results))
    }
}

#[async_trait]
impl HotelSource for HotelClient {
    async fn search(&self, city: &str) -> Result<Vec<HotelOption>> {
        let hotels = self
            .search_inner(city)
            .await
            .map_err(|e| Error::external(ContextSource::Hotels, e))?;
        info!(city, count = hotels.len(), "collected hotel listings");
        Ok(hotels)
    }
}

fn overpass_query(lat: f64, lon: f64, radius_m: u32) -> String {
    format!(
        r#"[out:json][timeout:25];
(
  node["tourism"="hotel"](around:{radius_m},{lat},{lon});
  way["tourism"="hotel"](around:{radius_m},{lat},{lon});
  relation["tourism"="hotel"](around:{radius_m},{lat},{lon});
);
out body;"#
    )
}

/// Only hotel-tagged nodes carry their own coordinates; ways, relations and
/// untagged geometry vertices are skipped.
fn collect_hotels(resp: OverpassResponse, city: &str, max_results: usize) -> Vec<HotelOption> {
    resp.elements
        .into_iter()
        .filter(|e| e.kind == "node")
        .filter(|e| e.tags.get("tourism").map(String::as_str) == Some("hotel"))
        .filter_map(|mut e| {
            let (latitude, longitude) = (e.lat?, e.lon?);
            let mut tag = |key: &str| e.tags.remove(key).filter(|v| !v.trim().is_empty());
            Some(HotelOption {
                name: tag("name").unwrap_or_else(|| "Unnamed Hotel".into()),
                price_indicator: tag("price"),
                rating: tag("stars").and_then(|s| parse_stars(&s)),
                address: Address {
                    street: tag("addr:street"),
                    city: tag("addr:city").unwrap_or_else(|| city.to_string()),
                    country: tag("addr:country"),
                },
                phone: tag("phone"),
                website: tag("website"),
                latitude,
                longitude,
            })
        })
        .take(max_results)
        .collect()
}

/// OSM `stars` values look like "4", "3.5" or "4S" (superior).
fn parse_stars(raw: &str) -> Option<f32> {
    let numeric: String = raw
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    numeric.parse().ok().filter(|s: &f32| (0.0..=7.0).contains(s))
}
