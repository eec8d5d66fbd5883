use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use super::transport::{error_detail, request_error};
use crate::application::TextGenerator;
use crate::domain::{DomainError, GenerationOptions, RenderedPrompt};

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 11434;
pub const DEFAULT_MODEL: &str = "llama2";
const CHAT_PATH: &str = "/api/chat";
const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(serde::Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: Vec<ApiMessage<'a>>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<ApiOptions>,
}

#[derive(serde::Serialize)]
struct ApiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(serde::Serialize)]
struct ApiOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct ApiResponse {
    message: Option<ResponseMessage>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

/// HTTP client for a locally running Ollama server (`/api/chat`, non-streamed).
///
/// Before each request the client sends a lightweight `HEAD /` probe with a
/// 2-second timeout. If the server isn't reachable the call fails immediately
/// with `UpstreamUnavailable` instead of waiting for the full request timeout.
pub struct OllamaClient {
    client: reqwest::Client,
    /// Short timeout, discards the response body.
    probe_client: reqwest::Client,
    model: String,
    /// Full endpoint URL (base + CHAT_PATH).
    url: String,
    /// Base URL used for the probe (e.g. `http://localhost:11434/`).
    base_url: String,
}

impl OllamaClient {
    pub fn new(model: impl Into<String>, base_url: impl Into<String>, timeout: Duration) -> Self {
        let base: String = base_url.into();
        let trimmed = base.trim_end_matches('/');
        let url = format!("{trimmed}{CHAT_PATH}");
        let base_url = format!("{trimmed}/");
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            probe_client: reqwest::Client::builder()
                .connect_timeout(PROBE_TIMEOUT)
                .timeout(PROBE_TIMEOUT)
                .build()
                .unwrap_or_default(),
            model: model.into(),
            url,
            base_url,
        }
    }

    /// `host` may already carry a scheme (`http://gpu-box`); otherwise
    /// plain HTTP is assumed.
    pub fn base_url_for(host: &str, port: u16) -> String {
        let host = host.trim_end_matches('/');
        if host.starts_with("http://") || host.starts_with("https://") {
            format!("{host}:{port}")
        } else {
            format!("http://{host}:{port}")
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl TextGenerator for OllamaClient {
    async fn generate(
        &self,
        prompt: &RenderedPrompt,
        options: &GenerationOptions,
    ) -> Result<String, DomainError> {
        // Any HTTP response, even 4xx/5xx, means the server is up.
        match self.probe_client.head(&self.base_url).send().await {
            Err(e) if e.is_connect() || e.is_timeout() => {
                return Err(DomainError::unavailable(format!(
                    "OllamaClient: server not reachable at {}: {e}",
                    self.base_url.trim_end_matches('/')
                )));
            }
            _ => {}
        }

        let model = options.model.as_deref().unwrap_or(&self.model);
        let request = ApiRequest {
            model,
            messages: prompt
                .messages()
                .iter()
                .map(|m| ApiMessage {
                    role: m.role().as_str(),
                    content: m.content(),
                })
                .collect(),
            stream: false,
            options: options.temperature.map(|temperature| ApiOptions { temperature }),
        };

        debug!("OllamaClient: POST {} (model={})", self.url, model);

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| request_error("OllamaClient", &self.url, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = error_detail(&body);
            warn!("OllamaClient: server returned {status}: {detail}");
            return Err(DomainError::upstream(format!(
                "OllamaClient: server returned {status}: {detail}"
            )));
        }

        let api_response: ApiResponse = response.json().await.map_err(|e| {
            DomainError::upstream(format!("OllamaClient: failed to parse response: {e}"))
        })?;

        api_response
            .message
            .map(|m| m.content)
            .ok_or_else(|| DomainError::upstream("OllamaClient: response contained no message"))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_for_adds_scheme_when_missing() {
        assert_eq!(
            OllamaClient::base_url_for("localhost", 11434),
            "http://localhost:11434"
        );
        assert_eq!(
            OllamaClient::base_url_for("https://gpu-box/", 443),
            "https://gpu-box:443"
        );
    }

    #[test]
    fn test_chat_url() {
        let client = OllamaClient::new(DEFAULT_MODEL, "http://localhost:11434/", Duration::from_secs(1));
        assert_eq!(client.url(), "http://localhost:11434/api/chat");
    }

    #[test]
    fn test_request_disables_streaming() {
        let request = ApiRequest {
            model: "llama2",
            messages: vec![],
            stream: false,
            options: Some(ApiOptions { temperature: 0.2 }),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["stream"], false);
        assert!((json["options"]["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
    }
}
