use super::types::{ContextSource, FlightOption, HotelOption, TripRequest, WeatherSnapshot};
use crate::error::{Error, Result};
use crate::llm::TextGenerator;
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::info;

const SYSTEM_PROMPT: &str = r#"You are a knowledgeable travel advisor. Provide detailed information about the destination, including:
1. A paragraph about the city's cultural and historical significance
2. Major attractions and must-visit places
3. Local cuisine recommendations
4. Best areas to stay
5. Transportation tips
6. Cultural etiquette and customs
7. A day-by-day itinerary covering every day of the trip

Start the response with the cultural and historical paragraph on its own, followed by a blank line.
Use the weather, hotel and flight data supplied by the user where it is relevant (pack for the forecast, suggest the listed hotels, fit the first and last day around the flight times).
Never invent hotels or flights that are not in the supplied data.
Format the response in a clear, organized manner."#;

/// Everything the composer needs besides the request itself.
#[derive(Debug, Default)]
pub struct TripContext {
    pub weather: Option<WeatherSnapshot>,
    pub hotels: Vec<HotelOption>,
    pub flights: Vec<FlightOption>,
    pub degraded: Vec<ContextSource>,
}

pub struct ItineraryComposer {
    llm: Arc<dyn TextGenerator>,
}

impl ItineraryComposer {
    pub fn new(llm: Arc<dyn TextGenerator>) -> Self {
        Self { llm }
    }

    /// Returns the generated text untouched; only emptiness is checked.
    pub async fn compose(&self, request: &TripRequest, context: &TripContext) -> Result<String> {
        let prompt = build_prompt(request, context);
        info!(
            destination = request.destination(),
            prompt_chars = prompt.len(),
            "composing itinerary"
        );

        let text = self.llm.generate(SYSTEM_PROMPT, &prompt).await?;
        if text.trim().is_empty() {
            return Err(Error::LlmResponse("empty itinerary".into()));
        }
        Ok(text)
    }
}

pub fn build_prompt(request: &TripRequest, context: &TripContext) -> String {
    let mut p = format!(
        "Create a {}-day trip plan for {} in {}. The traveller departs from {}.\n",
        request.days(),
        request.destination(),
        request.month(),
        request.origin()
    );

    p.push_str("\n## Weather\n");
    match &context.weather {
        Some(w) => {
            let c = &w.current;
            let _ = writeln!(
                p,
                "Current conditions in {}: {:.1}°C (feels like {:.1}°C), {}, humidity {}%, wind {:.1} m/s.",
                w.location,
                c.temperature_c,
                c.feels_like_c,
                c.description,
                c.humidity_pct,
                c.wind_speed_ms
            );
            if !w.forecast.is_empty() {
                p.push_str("Short-range forecast:\n");
                for point in &w.forecast {
                    let _ = writeln!(
                        p,
                        "- {}: {:.1}°C, {}",
                        point.time.format("%a %H:%M UTC"),
                        point.temperature_c,
                        point.description
                    );
                }
            }
            let _ = writeln!(
                p,
                "These are present conditions; adjust expectations for a trip in {}.",
                w.travel_month
            );
        }
        None => p.push_str(unavailable(context, ContextSource::Weather)),
    }

    p.push_str("\n## Hotels\n");
    if context.hotels.is_empty() {
        p.push_str(unavailable(context, ContextSource::Hotels));
    }
    for h in &context.hotels {
        let _ = write!(p, "- {} ({})", h.name, h.address);
        if let Some(stars) = h.rating {
            let _ = write!(p, ", {stars} stars");
        }
        if let Some(price) = &h.price_indicator {
            let _ = write!(p, ", price {price}");
        }
        p.push('\n');
    }

    p.push_str("\n## Flights\n");
    if context.flights.is_empty() {
        p.push_str(unavailable(context, ContextSource::Flights));
    }
    for f in &context.flights {
        let _ = write!(p, "- {} {}", f.carrier, f.flight_number);
        if let (Some(dep), Some(arr)) = (f.departure, f.arrival) {
            let _ = write!(
                p,
                ", departs {} arrives {}",
                dep.format("%Y-%m-%d %H:%M UTC"),
                arr.format("%Y-%m-%d %H:%M UTC")
            );
        }
        if let Some(duration) = &f.duration {
            let _ = write!(p, " ({duration})");
        }
        p.push('\n');
    }

    p
}

fn unavailable(context: &TripContext, source: ContextSource) -> &'static str {
    if context.degraded.contains(&source) {
        "Data unavailable: the provider could not be reached.\n"
    } else {
        match source {
            ContextSource::Weather => "No weather data.\n",
            ContextSource::Hotels => "No hotel listings were found.\n",
            ContextSource::Flights => "No scheduled flights were found.\n",
        }
    }
}

/// First paragraph of the generated text, with markdown heading markers removed.
pub fn destination_summary(text: &str) -> String {
    text.split("\n\n")
        .map(|para| {
            para.lines()
                .map(|l| l.trim().trim_start_matches('#').trim())
                .filter(|l| !l.is_empty())
                .collect::<Vec<_>>()
        })
        .find(|lines| lines.iter().any(|l| l.len() > 40) || lines.len() > 1)
        .map(|lines| lines.join(" "))
        .unwrap_or_else(|| text.trim().to_string())
}
