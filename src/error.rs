use crate::trip::ContextSource;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({platform}): {message}")]
    Api {
        platform: String,
        message: String,
        status_code: Option<u16>,
    },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Rate limited by {platform}")]
    RateLimit {
        platform: String,
        retry_after_secs: Option<u64>,
    },

    #[error("Template error: {0}")]
    Template(String),

    #[error("Invalid trip request: {0}")]
    InvalidRequest(String),

    /// A weather, hotel or flight provider failed.
    #[error("{provider} provider ({}) failed: {message}", .provider.service_name())]
    ExternalService {
        provider: ContextSource,
        message: String,
        status_code: Option<u16>,
    },

    #[error("LLM service error: {0}")]
    LlmService(String),

    #[error("LLM returned unusable output: {0}")]
    LlmResponse(String),
}

impl Error {
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    pub fn api(platform: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            platform: platform.into(),
            message: message.into(),
            status_code: None,
        }
    }

    pub fn api_with_status(
        platform: impl Into<String>,
        message: impl Into<String>,
        status_code: u16,
    ) -> Self {
        Self::Api {
            platform: platform.into(),
            message: message.into(),
            status_code: Some(status_code),
        }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Attribute a lower-level failure to one of the context providers.
    pub fn external(provider: ContextSource, cause: Error) -> Self {
        match cause {
            already @ Self::ExternalService { .. } => already,
            Self::Api {
                message,
                status_code,
                ..
            } => Self::ExternalService {
                provider,
                message: match status_code {
                    Some(code) => format!("HTTP {code}: {}", truncate(&message, 200)),
                    None => message,
                },
                status_code,
            },
            Self::RateLimit {
                retry_after_secs, ..
            } => Self::ExternalService {
                provider,
                message: match retry_after_secs {
                    Some(secs) => format!("rate limited, retry after {secs}s"),
                    None => "rate limited".into(),
                },
                status_code: Some(429),
            },
            other => Self::ExternalService {
                provider,
                message: other.to_string(),
                status_code: None,
            },
        }
    }

    /// The provider that failed, when this is a context-fetch failure.
    pub fn failed_provider(&self) -> Option<ContextSource> {
        match self {
            Self::ExternalService { provider, .. } => Some(*provider),
            _ => None,
        }
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn external_keeps_status_from_api_error() {
        let err = Error::external(
            ContextSource::Weather,
            Error::api_with_status("api.openweathermap.org", "boom", 500),
        );
        match &err {
            Error::ExternalService {
                provider,
                status_code,
                ..
            } => {
                assert_eq!(*provider, ContextSource::Weather);
                assert_eq!(*status_code, Some(500));
            }
            other => panic!("unexpected {other:?}"),
        }
        let msg = err.to_string();
        assert!(msg.contains("weather"), "{msg}");
        assert!(msg.contains("OpenWeatherMap"), "{msg}");
        assert!(msg.contains("HTTP 500"), "{msg}");
    }

    #[test]
    fn external_does_not_rewrap() {
        let inner = Error::external(ContextSource::Flights, Error::parse("bad json"));
        let outer = Error::external(ContextSource::Hotels, inner);
        assert_eq!(outer.failed_provider(), Some(ContextSource::Flights));
    }

    #[test]
    fn rate_limit_maps_to_429() {
        let err = Error::external(
            ContextSource::Hotels,
            Error::RateLimit {
                platform: "overpass-api.de".into(),
                retry_after_secs: Some(10),
            },
        );
        assert!(matches!(
            err,
            Error::ExternalService {
                status_code: Some(429),
                ..
            }
        ));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("hi", 10), "hi");
    }
}
