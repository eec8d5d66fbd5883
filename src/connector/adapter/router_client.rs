use std::time::Duration;

use tracing::debug;

use super::transport::{error_detail, request_error};
use crate::connector::http::dto::{BackendsResponse, QueryRequest, QueryResponse};
use crate::domain::{BackendInfo, DomainError, GenerationResult};

/// Client for a running `chainroute serve` instance.
pub struct HttpRouterClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRouterClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base: String = base_url.into();
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            base_url: base.trim_end_matches('/').to_string(),
        }
    }

    pub async fn query(
        &self,
        query: &str,
        target: &str,
        temperature: Option<f32>,
    ) -> Result<Vec<GenerationResult>, DomainError> {
        let url = format!("{}/query", self.base_url);
        let request = QueryRequest {
            query: query.to_string(),
            target: target.to_string(),
            temperature,
        };

        debug!("HttpRouterClient: POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| request_error("HttpRouterClient", &url, e))?;

        let body: QueryResponse = Self::decode(response).await?;
        Ok(body.results)
    }

    pub async fn backends(&self) -> Result<Vec<BackendInfo>, DomainError> {
        let url = format!("{}/backends", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| request_error("HttpRouterClient", &url, e))?;

        let body: BackendsResponse = Self::decode(response).await?;
        Ok(body.backends)
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, DomainError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = error_detail(&body);
            return Err(DomainError::upstream(format!(
                "server returned {status}: {detail}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| DomainError::upstream(format!("HttpRouterClient: failed to parse response: {e}")))
    }
}
