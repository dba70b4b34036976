use crate::error::{Error, Result};
use crate::trip::{ContextSource, FlightOption, HotelOption, TripPlan};
use askama::Template;

#[derive(Template)]
#[template(path = "trip_plan.html")]
struct TripPlanPage {
    destination: String,
    origin: String,
    days: u32,
    month: String,
    generated_at: String,
    summary: String,
    weather: Option<WeatherView>,
    weather_note: String,
    itinerary: Vec<String>,
    hotels: Vec<HotelView>,
    hotels_note: String,
    flights: Vec<FlightView>,
    flights_note: String,
    degraded: Vec<String>,
}

#[allow(dead_code)] // fields used by Askama template
struct WeatherView {
    location: String,
    temperature: String,
    feels_like: String,
    description: String,
    humidity: u8,
    wind: String,
    forecast: Vec<ForecastView>,
}

#[allow(dead_code)] // fields used by Askama template
struct ForecastView {
    time: String,
    temperature: String,
    description: String,
}

#[allow(dead_code)] // fields used by Askama template
struct HotelView {
    name: String,
    address: String,
    rating: String,
    price: String,
    phone: String,
    website: String,
    map_url: String,
}

#[allow(dead_code)] // fields used by Askama template
struct FlightView {
    carrier: String,
    flight_number: String,
    departure: String,
    arrival: String,
    duration: String,
    price: String,
}

fn hotel_to_view(h: &HotelOption) -> HotelView {
    HotelView {
        name: h.name.clone(),
        address: h.address.to_string(),
        rating: h
            .rating
            .map(|r| format!("{r} stars"))
            .unwrap_or_default(),
        price: h.price_indicator.clone().unwrap_or_default(),
        phone: h.phone.clone().unwrap_or_default(),
        website: h
            .website
            .as_deref()
            .filter(|w| is_web_link(w))
            .map(str::to_string)
            .unwrap_or_default(),
        map_url: h.map_url(),
    }
}

/// OSM `website` tags are free text; only http(s) links become anchors.
fn is_web_link(url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();
    lower.starts_with("https://") || lower.starts_with("http://")
}

fn flight_to_view(f: &FlightOption) -> FlightView {
    let when = |t: Option<chrono::DateTime<chrono::Utc>>| {
        t.map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
            .unwrap_or_else(|| "Unknown".into())
    };
    FlightView {
        carrier: f.carrier.clone(),
        flight_number: f.flight_number.clone(),
        departure: when(f.departure),
        arrival: when(f.arrival),
        duration: f.duration.clone().unwrap_or_default(),
        price: f.price.clone().unwrap_or_default(),
    }
}

/// Warning line shown in place of an empty section.
fn section_note(plan: &TripPlan, source: ContextSource, empty: bool) -> String {
    if plan.degraded.contains(&source) {
        format!(
            "Could not reach {} for {source} data; this section is missing.",
            source.service_name()
        )
    } else if empty {
        match source {
            ContextSource::Weather => "No weather data available.".into(),
            ContextSource::Hotels => {
                "Could not find hotel listings. Please check hotel booking websites directly."
                    .into()
            }
            ContextSource::Flights => {
                "No scheduled flights found. Please check airline websites directly.".into()
            }
        }
    } else {
        String::new()
    }
}

pub fn render_trip_plan(plan: &TripPlan) -> Result<String> {
    let weather = plan.weather.as_ref().map(|w| WeatherView {
        location: w.location.clone(),
        temperature: format!("{:.1}°C", w.current.temperature_c),
        feels_like: format!("{:.1}°C", w.current.feels_like_c),
        description: w.current.description.clone(),
        humidity: w.current.humidity_pct,
        wind: format!("{:.1} m/s", w.current.wind_speed_ms),
        forecast: w
            .forecast
            .iter()
            .map(|p| ForecastView {
                time: p.time.format("%a %d %b %H:%M UTC").to_string(),
                temperature: format!("{:.1}°C", p.temperature_c),
                description: p.description.clone(),
            })
            .collect(),
    });

    let itinerary: Vec<String> = plan
        .itinerary
        .lines()
        .map(str::trim_end)
        .filter(|l| !l.trim().is_empty())
        .map(String::from)
        .collect();

    let page = TripPlanPage {
        destination: plan.request.destination().to_string(),
        origin: plan.request.origin().to_string(),
        days: plan.request.days(),
        month: plan.request.month().to_string(),
        generated_at: plan.generated_at.format("%Y-%m-%d %H:%M UTC").to_string(),
        summary: plan.destination_summary.clone(),
        weather_note: section_note(plan, ContextSource::Weather, weather.is_none()),
        weather,
        itinerary,
        hotels: plan.hotels.iter().map(hotel_to_view).collect(),
        hotels_note: section_note(plan, ContextSource::Hotels, plan.hotels.is_empty()),
        flights: plan.flights.iter().map(flight_to_view).collect(),
        flights_note: section_note(plan, ContextSource::Flights, plan.flights.is_empty()),
        degraded: plan
            .degraded
            .iter()
            .map(|s| format!("{s} ({})", s.service_name()))
            .collect(),
    };

    page.render()
        .map_err(|e| Error::Template(format!("template render: {e}")))
}
