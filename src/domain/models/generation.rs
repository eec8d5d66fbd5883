use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Per-call knobs understood by every backend. Unset fields fall back to the
/// adapter's configured defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl GenerationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Fields set in `overrides` win.
    pub fn merged_with(&self, overrides: &GenerationOptions) -> GenerationOptions {
        GenerationOptions {
            temperature: overrides.temperature.or(self.temperature),
            model: overrides.model.clone().or_else(|| self.model.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    text: String,
    backend_name: String,
    succeeded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error_message: Option<String>,
    #[serde(default)]
    latency_ms: u64,
}

impl GenerationResult {
    pub fn success(backend_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            backend_name: backend_name.into(),
            succeeded: true,
            error_message: None,
            latency_ms: 0,
        }
    }

    pub fn failure(backend_name: impl Into<String>, error: &DomainError) -> Self {
        Self {
            text: String::new(),
            backend_name: backend_name.into(),
            succeeded: false,
            error_message: Some(error.to_string()),
            latency_ms: 0,
        }
    }

    pub fn with_latency_ms(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn backend_name(&self) -> &str {
        &self.backend_name
    }

    pub fn succeeded(&self) -> bool {
        self.succeeded
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn latency_ms(&self) -> u64 {
        self.latency_ms
    }
}
