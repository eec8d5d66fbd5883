use async_trait::async_trait;

use crate::domain::{DomainError, GenerationOptions, RenderedPrompt};

/// Sends a rendered chat prompt to one text-generation provider and returns
/// the full completion text.
///
/// Implementors encapsulate transport, serialization, and vendor-specific API
/// details. Failures are reported as execution-class [`DomainError`]s
/// (`Authentication`, `Upstream`, `UpstreamUnavailable`, `Timeout`); turning
/// them into a failed result is left to the caller.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        prompt: &RenderedPrompt,
        options: &GenerationOptions,
    ) -> Result<String, DomainError>;

    /// Model used when the options do not name one.
    fn model_name(&self) -> &str;
}
