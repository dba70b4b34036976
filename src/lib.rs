pub mod config;
pub mod error;
pub mod http;
pub mod llm;
pub mod output;
pub mod trip;

use config::{Config, LlmConfig};
use error::Result;
use http::HttpClient;
use llm::LlmClient;
use std::sync::Arc;
use tracing::info;
use trip::{FlightClient, HotelClient, ItineraryComposer, PlannerPipeline, WeatherClient};

/// CLI override for LLM provider/model.
pub struct LlmOverride {
    pub provider: Option<llm::Provider>,
    pub model: Option<String>,
}

/// Apply a CLI override on top of the `[llm]` section. Switching provider
/// drops the configured endpoint and key variable, which belong to the old one.
pub fn resolve_llm_config(config: &LlmConfig, llm_override: Option<&LlmOverride>) -> LlmConfig {
    let mut resolved = config.clone();
    let Some(o) = llm_override else {
        return resolved;
    };
    if let Some(provider) = &o.provider {
        resolved.provider = provider.clone();
        resolved.base_url = None;
        resolved.api_key_env = None;
        resolved.model = provider.default_model().into();
    }
    if let Some(model) = &o.model {
        resolved.model = model.clone();
    }
    resolved
}

/// Wire the real provider clients from configuration.
pub fn build_pipeline(
    config: &Config,
    llm_override: Option<&LlmOverride>,
) -> Result<PlannerPipeline> {
    let http = HttpClient::new(&config.http.user_agent, config.http.timeout())?;
    let llm = LlmClient::from_config(&resolve_llm_config(&config.llm, llm_override), http.clone());
    info!(provider = ?llm.provider(), model = llm.model(), "itinerary model selected");

    Ok(PlannerPipeline::new(
        Box::new(WeatherClient::new(&config.weather, http.clone())),
        Box::new(HotelClient::new(&config.hotels, http.clone())),
        Box::new(FlightClient::new(&config.flights, http)),
        ItineraryComposer::new(Arc::new(llm)),
    )
    .with_policy(config.pipeline.on_context_failure))
}

#[cfg(test)]
mod tests {
    use super::*;
    use llm::Provider;

    #[test]
    fn provider_override_resets_endpoint() {
        let config = LlmConfig {
            base_url: Some("http://localhost:8080/v1".into()),
            api_key_env: Some("MY_KEY".into()),
            ..LlmConfig::default()
        };
        let o = LlmOverride {
            provider: Some(Provider::Anthropic),
            model: None,
        };
        let resolved = resolve_llm_config(&config, Some(&o));
        assert!(matches!(resolved.provider, Provider::Anthropic));
        assert!(resolved.base_url.is_none());
        assert!(resolved.api_key_env.is_none());
        assert_eq!(resolved.model, Provider::Anthropic.default_model());
    }

    #[test]
    fn model_override_keeps_provider() {
        let o = LlmOverride {
            provider: None,
            model: Some("llama-3.3-70b-versatile".into()),
        };
        let resolved = resolve_llm_config(&LlmConfig::default(), Some(&o));
        assert!(matches!(resolved.provider, Provider::Groq));
        assert_eq!(resolved.model, "llama-3.3-70b-versatile");
    }

    #[test]
    fn no_override_is_identity() {
        let resolved = resolve_llm_config(&LlmConfig::default(), None);
        assert_eq!(resolved.model, "llama-3.1-8b-instant");
    }
}
