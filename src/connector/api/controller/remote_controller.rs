use anyhow::Result;

use crate::HttpRouterClient;

use super::{format_backends, format_results};

/// Runs `ask` and `backends` against a running `chainroute serve`.
pub struct RemoteController {
    client: HttpRouterClient,
}

impl RemoteController {
    pub fn new(client: HttpRouterClient) -> Self {
        Self { client }
    }

    pub async fn ask(
        &self,
        query: String,
        target: String,
        temperature: Option<f32>,
    ) -> Result<String> {
        let results = self.client.query(&query, &target, temperature).await?;
        Ok(format_results(&results))
    }

    pub async fn list(&self) -> Result<String> {
        let backends = self.client.backends().await?;
        Ok(format_backends(&backends))
    }
}
