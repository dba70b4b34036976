use crate::error::{Error, Result};
use reqwest::{Client, RequestBuilder, StatusCode, header};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

/// Thin wrapper over `reqwest::Client`. One attempt per call: failures are
/// surfaced to the caller as-is.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| Error::http(e.to_string()))?;

        Ok(Self { client })
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let body = self.send(self.client.get(url).query(query)).await?;
        parse_json(&body)
    }

    pub async fn post_form_json<T: DeserializeOwned>(
        &self,
        url: &str,
        form: &[(&str, &str)],
    ) -> Result<T> {
        let body = self.send(self.client.post(url).form(form)).await?;
        parse_json(&body)
    }

    pub async fn post_json_raw(
        &self,
        url: &str,
        body: &str,
        headers: &[(&str, &str)],
    ) -> Result<String> {
        let mut req = self
            .client
            .post(url)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.to_string());
        for (k, v) in headers {
            req = req.header(*k, *v);
        }
        self.send(req).await
    }

    async fn send(&self, req: RequestBuilder) -> Result<String> {
        match req.send().await {
            Ok(resp) => self.handle_response(resp).await,
            Err(e) => {
                if e.is_timeout() || e.is_connect() {
                    warn!(error = %e, "request failed before a response arrived");
                }
                Err(Error::http(e.to_string()))
            }
        }
    }

    async fn handle_response(&self, resp: reqwest::Response) -> Result<String> {
        let status = resp.status();
        let url = resp.url().to_string();
        debug!(%status, domain = %extract_domain(&url), "response received");

        match status {
            s if s.is_success() => resp.text().await.map_err(|e| Error::http(e.to_string())),
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = resp
                    .headers()
                    .get(header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok());
                Err(Error::RateLimit {
                    platform: extract_domain(&url),
                    retry_after_secs: retry_after,
                })
            }
            _ => {
                let body = resp.text().await.unwrap_or_default();
                Err(Error::api_with_status(
                    extract_domain(&url),
                    body,
                    status.as_u16(),
                ))
            }
        }
    }
}

fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| Error::parse(format!("JSON parse: {e}")))
}

fn extract_domain(url: &str) -> String {
    url.split("//")
        .nth(1)
        .and_then(|s| s.split('/').next())
        .unwrap_or("unknown")
        .to_string()
}
