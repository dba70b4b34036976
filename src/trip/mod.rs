// Trip-planning pipeline: context fetch (weather, hotels, flights) → itinerary composition.

pub mod composer;
pub mod flights;
pub mod hotels;
pub mod pipeline;
pub mod types;
pub mod weather;

use crate::error::Result;
use async_trait::async_trait;

pub use composer::ItineraryComposer;
pub use flights::FlightClient;
pub use hotels::HotelClient;
pub use pipeline::{PipelineState, PlanOutcome, PlannerPipeline};
pub use types::{
    Address, ContextSource, CurrentConditions, FlightOption, ForecastPoint, HotelOption, Month,
    TripPlan, TripRequest, WeatherSnapshot,
};
pub use weather::WeatherClient;

#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn fetch(&self, city: &str, month: Month) -> Result<WeatherSnapshot>;
}

/// An empty result is a valid answer, not an error.
#[async_trait]
pub trait HotelSource: Send + Sync {
    async fn search(&self, city: &str) -> Result<Vec<HotelOption>>;
}

/// An empty result is a valid answer, not an error.
#[async_trait]
pub trait FlightSource: Send + Sync {
    async fn search(&self, origin: &str, destination: &str) -> Result<Vec<FlightOption>>;
}
