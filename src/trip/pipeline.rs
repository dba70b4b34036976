use super::composer::{ItineraryComposer, TripContext, destination_summary};
use super::types::{ContextSource, TripPlan, TripRequest};
use super::{FlightSource, HotelSource, WeatherSource};
use crate::config::ContextPolicy;
use crate::error::{Error, Result};
use chrono::Utc;
use std::fmt;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    FetchingContext,
    Composing,
    Done,
    Failed,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::FetchingContext => write!(f, "fetching-context"),
            Self::Composing => write!(f, "composing"),
            Self::Done => write!(f, "done"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Result of one run plus every state it passed through, `Idle` first.
#[derive(Debug)]
pub struct PlanOutcome {
    pub history: Vec<PipelineState>,
    pub result: Result<TripPlan>,
}

impl PlanOutcome {
    pub fn state(&self) -> PipelineState {
        self.history.last().copied().unwrap_or(PipelineState::Idle)
    }
}

struct Transitions {
    history: Vec<PipelineState>,
}

impl Transitions {
    fn new() -> Self {
        Self {
            history: vec![PipelineState::Idle],
        }
    }

    fn advance(&mut self, next: PipelineState) {
        let from = self.history.last().copied().unwrap_or(PipelineState::Idle);
        info!(%from, to = %next, "pipeline transition");
        self.history.push(next);
    }

    fn finish(mut self, result: Result<TripPlan>) -> PlanOutcome {
        match &result {
            Ok(_) => self.advance(PipelineState::Done),
            Err(e) => {
                warn!(error = %e, "trip planning failed");
                self.advance(PipelineState::Failed);
            }
        }
        PlanOutcome {
            history: self.history,
            result,
        }
    }
}

/// Fetches weather, hotels and flights, then hands them to the composer.
/// Holds no per-request state; one instance serves any number of requests.
pub struct PlannerPipeline {
    weather: Box<dyn WeatherSource>,
    hotels: Box<dyn HotelSource>,
    flights: Box<dyn FlightSource>,
    composer: ItineraryComposer,
    policy: ContextPolicy,
}

impl PlannerPipeline {
    pub fn new(
        weather: Box<dyn WeatherSource>,
        hotels: Box<dyn HotelSource>,
        flights: Box<dyn FlightSource>,
        composer: ItineraryComposer,
    ) -> Self {
        Self {
            weather,
            hotels,
            flights,
            composer,
            policy: ContextPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ContextPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub async fn plan(&self, request: &TripRequest) -> Result<TripPlan> {
        self.execute(request).await.result
    }

    pub async fn execute(&self, request: &TripRequest) -> PlanOutcome {
        let mut transitions = Transitions::new();
        info!(
            destination = request.destination(),
            origin = request.origin(),
            days = request.days(),
            month = %request.month(),
            policy = ?self.policy,
            "planning trip"
        );

        transitions.advance(PipelineState::FetchingContext);
        let context = match self.fetch_context(request).await {
            Ok(context) => context,
            Err(e) => return transitions.finish(Err(e)),
        };

        transitions.advance(PipelineState::Composing);
        let result = self.composer.compose(request, &context).await.map(|itinerary| TripPlan {
            request: request.clone(),
            destination_summary: destination_summary(&itinerary),
            weather: context.weather,
            hotels: context.hotels,
            flights: context.flights,
            itinerary,
            degraded: context.degraded,
            generated_at: Utc::now(),
        });
        transitions.finish(result)
    }

    /// The three fetches are independent and run concurrently. Returns only
    /// once all of them have resolved (or, under fail-fast, one has failed).
    async fn fetch_context(&self, request: &TripRequest) -> Result<TripContext> {
        let weather = self.weather.fetch(request.destination(), request.month());
        let hotels = self.hotels.search(request.destination());
        let flights = self.flights.search(request.origin(), request.destination());

        match self.policy {
            ContextPolicy::FailFast => {
                let (weather, hotels, flights) = tokio::try_join!(weather, hotels, flights)?;
                Ok(TripContext {
                    weather: Some(weather),
                    hotels,
                    flights,
                    degraded: Vec::new(),
                })
            }
            ContextPolicy::Degrade => {
                let (weather, hotels, flights) = tokio::join!(weather, hotels, flights);
                let mut degraded = Vec::new();
                let weather = settle(weather, ContextSource::Weather, &mut degraded);
                let hotels = settle(hotels, ContextSource::Hotels, &mut degraded);
                let flights = settle(flights, ContextSource::Flights, &mut degraded);
                Ok(TripContext {
                    weather,
                    hotels: hotels.unwrap_or_default(),
                    flights: flights.unwrap_or_default(),
                    degraded,
                })
            }
        }
    }
}

fn settle<T>(
    result: Result<T>,
    source: ContextSource,
    degraded: &mut Vec<ContextSource>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(%source, error = %e, "context source failed, continuing without it");
            degraded.push(source);
            None
        }
    }
}

/// Plain message for the user naming what failed.
pub fn failure_message(error: &Error) -> String {
    match error {
        Error::ExternalService {
            provider, message, ..
        } => format!(
            "Could not plan the trip: {provider} data from {} is unavailable ({message}).",
            provider.service_name()
        ),
        Error::LlmService(_) => format!("The itinerary service is unavailable. {error}"),
        Error::LlmResponse(_) => format!("The itinerary service returned no usable plan. {error}"),
        other => other.to_string(),
    }
}
