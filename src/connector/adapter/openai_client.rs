use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, warn};

use super::transport::{error_detail, request_error};
use crate::application::TextGenerator;
use crate::domain::{DomainError, GenerationOptions, RenderedPrompt};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const COMPLETIONS_PATH: &str = "/v1/chat/completions";

#[derive(serde::Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: Vec<ApiMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(serde::Serialize)]
struct ApiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// HTTP client for the OpenAI Chat Completions API (and compatible hosted
/// endpoints).
///
/// Requires a bearer credential. A missing key or a 401/403 answer is an
/// `Authentication` error; any other non-success status is `Upstream`.
pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    /// Full endpoint URL (base + COMPLETIONS_PATH).
    url: String,
}

impl OpenAiClient {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let base: String = base_url.into();
        let url = format!("{}{}", base.trim_end_matches('/'), COMPLETIONS_PATH);
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            model: model.into(),
            url,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn generate(
        &self,
        prompt: &RenderedPrompt,
        options: &GenerationOptions,
    ) -> Result<String, DomainError> {
        if self.api_key.trim().is_empty() {
            return Err(DomainError::authentication(
                "OpenAiClient: no API key configured",
            ));
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
            temperature: options.temperature,
        };

        debug!("OpenAiClient: POST {} (model={})", self.url, model);

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| request_error("OpenAiClient", &self.url, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = error_detail(&body);
            warn!("OpenAiClient: API returned {status}: {detail}");
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => DomainError::authentication(
                    format!("OpenAiClient: credential rejected ({status}): {detail}"),
                ),
                _ => DomainError::upstream(format!("OpenAiClient: API returned {status}: {detail}")),
            });
        }

        let api_response: ApiResponse = response.json().await.map_err(|e| {
            DomainError::upstream(format!("OpenAiClient: failed to parse response: {e}"))
        })?;

        api_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.unwrap_or_default())
            .ok_or_else(|| DomainError::upstream("OpenAiClient: response contained no choices"))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_base_without_double_slash() {
        let client = OpenAiClient::new("k", DEFAULT_MODEL, "http://localhost:9999/", Duration::from_secs(1));
        assert_eq!(client.url(), "http://localhost:9999/v1/chat/completions");
    }

    #[test]
    fn test_request_serialization_omits_unset_temperature() {
        let request = ApiRequest {
            model: "gpt-3.5-turbo",
            messages: vec![ApiMessage {
                role: "user",
                content: "hi",
            }],
            temperature: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("temperature").is_none());
        assert_eq!(json["messages"][0]["role"], "user");
    }
}
