use crate::config::LlmConfig;
use crate::error::{Error, Result};
use crate::http::HttpClient;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Prompt in, text out. The pipeline only ever talks to this.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, system: &str, prompt: &str) -> Result<String>;
}

/// LLM provider; determines API format and endpoint.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Groq,
    Anthropic,
    OpenRouter,
    /// Any OpenAI-compatible API (together.ai, local ollama, etc.)
    #[serde(rename = "openai")]
    OpenAi,
}

impl Provider {
    fn default_base_url(&self) -> &'static str {
        match self {
            Self::Groq => "https://api.groq.com/openai/v1",
            Self::Anthropic => "https://api.anthropic.com/v1",
            Self::OpenRouter => "https://openrouter.ai/api/v1",
            Self::OpenAi => "http://localhost:11434/v1",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::Groq => "llama-3.1-8b-instant",
            Self::Anthropic => "claude-3-5-haiku-latest",
            Self::OpenRouter => "meta-llama/llama-3.1-8b-instruct",
            Self::OpenAi => "llama3.1",
        }
    }

    fn default_api_key_env(&self) -> &'static str {
        match self {
            Self::Groq => "GROQ_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
            Self::OpenRouter => "OPENROUTER_API_KEY",
            Self::OpenAi => "OPENAI_API_KEY",
        }
    }
}

impl std::str::FromStr for Provider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "groq" => Ok(Self::Groq),
            "anthropic" => Ok(Self::Anthropic),
            "openrouter" => Ok(Self::OpenRouter),
            "openai" => Ok(Self::OpenAi),
            other => Err(Error::config(format!("unknown LLM provider '{other}'"))),
        }
    }
}

pub struct LlmClient {
    provider: Provider,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    base_url: String,
    http: HttpClient,
}

// -- Anthropic format --

#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<Msg<'a>>,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicBlock>,
}

#[derive(Deserialize)]
struct AnthropicBlock {
    text: Option<String>,
}

// -- OpenAI-compatible format (Groq, OpenRouter, ollama) --

#[derive(Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Msg<'a>>,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Deserialize)]
struct OpenAiMessage {
    #[serde(default)]
    content: Option<String>,
}

// -- Shared --

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}

impl LlmClient {
    pub fn new(
        provider: Provider,
        api_key: String,
        model: String,
        base_url: Option<String>,
        http: HttpClient,
    ) -> Self {
        let base_url = base_url.unwrap_or_else(|| provider.default_base_url().into());
        Self {
            provider,
            api_key,
            model,
            max_tokens: 2048,
            temperature: 0.7,
            base_url,
            http,
        }
    }

    /// Build from config, reading the API key from the configured env var.
    pub fn from_config(config: &LlmConfig, http: HttpClient) -> Self {
        let env_var = config
            .api_key_env
            .clone()
            .unwrap_or_else(|| config.provider.default_api_key_env().into());
        let api_key = std::env::var(&env_var).unwrap_or_default();
        if api_key.is_empty() {
            warn!(env_var = %env_var, "LLM API key is empty; requests will likely be rejected");
        }
        Self::new(
            config.provider.clone(),
            api_key,
            config.model.clone(),
            config.base_url.clone(),
            http,
        )
        .with_sampling(config.max_tokens, config.temperature)
    }

    pub fn with_sampling(mut self, max_tokens: u32, temperature: f32) -> Self {
        self.max_tokens = max_tokens;
        self.temperature = temperature;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider(&self) -> &Provider {
        &self.provider
    }

    async fn complete_anthropic(&self, system: &str, user_message: &str) -> Result<String> {
        let request = AnthropicRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            system,
            messages: vec![Msg {
                role: "user",
                content: user_message,
            }],
        };

        let body = serde_json::to_string(&request)
            .map_err(|e| Error::parse(format!("serialize request: {e}")))?;

        let url = format!("{}/messages", self.base_url);
        let response_text = self
            .http
            .post_json_raw(
                &url,
                &body,
                &[
                    ("x-api-key", &self.api_key),
                    ("anthropic-version", "2023-06-01"),
                ],
            )
            .await
            .map_err(|e| {
                warn!("Anthropic API error: {e}");
                Error::LlmService(format!("Anthropic: {e}"))
            })?;

        let resp: AnthropicResponse = serde_json::from_str(&response_text)
            .map_err(|e| Error::LlmResponse(format!("parse Anthropic response: {e}")))?;

        Ok(resp
            .content
            .into_iter()
            .filter_map(|b| b.text)
            .collect::<Vec<_>>()
            .join("\n"))
    }

    async fn complete_openai(&self, system: &str, user_message: &str) -> Result<String> {
        let request = OpenAiRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            messages: vec![
                Msg {
                    role: "system",
                    content: system,
                },
                Msg {
                    role: "user",
                    content: user_message,
                },
            ],
        };

        let body = serde_json::to_string(&request)
            .map_err(|e| Error::parse(format!("serialize request: {e}")))?;

        let url = format!("{}/chat/completions", self.base_url);
        let response_text = self
            .http
            .post_json_raw(
                &url,
                &body,
                &[("Authorization", &format!("Bearer {}", self.api_key))],
            )
            .await
            .map_err(|e| {
                warn!("LLM API error: {e}");
                Error::LlmService(format!("{:?}: {e}", self.provider))
            })?;

        let resp: OpenAiResponse = serde_json::from_str(&response_text)
            .map_err(|e| Error::LlmResponse(format!("parse LLM response: {e}")))?;

        resp.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::LlmResponse("no choices in LLM response".into()))
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn generate(&self, system: &str, prompt: &str) -> Result<String> {
        debug!(provider = ?self.provider, model = %self.model, "sending LLM request");

        let text = match self.provider {
            Provider::Anthropic => self.complete_anthropic(system, prompt).await?,
            Provider::Groq | Provider::OpenRouter | Provider::OpenAi => {
                self.complete_openai(system, prompt).await?
            }
        };

        if text.trim().is_empty() {
            return Err(Error::LlmResponse("empty completion".into()));
        }
        Ok(text)
    }
}
