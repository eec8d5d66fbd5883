use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::application::TextGenerator;
use crate::domain::{
    BackendInfo, BackendKind, DomainError, GenerationOptions, GenerationResult, RenderedPrompt,
};

pub const DEFAULT_BACKEND_TIMEOUT: Duration = Duration::from_secs(30);

/// A named backend: the generator plus its default options and bounded wait.
#[derive(Clone)]
pub struct BackendDescriptor {
    name: String,
    kind: BackendKind,
    generator: Arc<dyn TextGenerator>,
    options: GenerationOptions,
    timeout: Duration,
}

impl BackendDescriptor {
    pub fn new(
        name: impl Into<String>,
        kind: BackendKind,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            generator,
            options: GenerationOptions::default(),
            timeout: DEFAULT_BACKEND_TIMEOUT,
        }
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> BackendKind {
        self.kind
    }

    pub fn options(&self) -> &GenerationOptions {
        &self.options
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn info(&self) -> BackendInfo {
        BackendInfo {
            name: self.name.clone(),
            kind: self.kind,
            model: self
                .options
                .model
                .clone()
                .unwrap_or_else(|| self.generator.model_name().to_string()),
        }
    }

    /// Runs one generation and never fails: execution errors, including the
    /// bounded wait expiring, come back as a failed [`GenerationResult`].
    pub async fn invoke(
        &self,
        prompt: &RenderedPrompt,
        overrides: &GenerationOptions,
    ) -> GenerationResult {
        let options = self.options.merged_with(overrides);
        let start = Instant::now();

        let outcome =
            match tokio::time::timeout(self.timeout, self.generator.generate(prompt, &options))
                .await
            {
                Ok(outcome) => outcome,
                Err(_) => Err(DomainError::timeout(format!(
                    "no response from '{}' within {}s",
                    self.name,
                    self.timeout.as_secs_f64()
                ))),
            };

        let latency_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(text) => {
                debug!(
                    "Backend '{}' answered in {}ms ({} chars)",
                    self.name,
                    latency_ms,
                    text.len()
                );
                GenerationResult::success(&self.name, text).with_latency_ms(latency_ms)
            }
            Err(e) => {
                warn!("Backend '{}' failed after {}ms: {}", self.name, latency_ms, e);
                GenerationResult::failure(&self.name, &e).with_latency_ms(latency_ms)
            }
        }
    }
}

impl fmt::Debug for BackendDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("model", &self.generator.model_name())
            .field("options", &self.options)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Backends by unique name, iterated in name order.
///
/// Filled once at startup and then shared behind an `Arc`; lookups need no
/// locking because nothing mutates it afterwards.
#[derive(Debug, Default, Clone)]
pub struct BackendRegistry {
    backends: BTreeMap<String, BackendDescriptor>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, descriptor: BackendDescriptor) -> Result<(), DomainError> {
        if self.backends.contains_key(descriptor.name()) {
            return Err(DomainError::DuplicateBackend(descriptor.name().to_string()));
        }
        debug!(
            "Registered {} backend '{}'",
            descriptor.kind(),
            descriptor.name()
        );
        self.backends.insert(descriptor.name().to_string(), descriptor);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&BackendDescriptor, DomainError> {
        self.backends
            .get(name)
            .ok_or_else(|| DomainError::UnknownBackend(name.to_string()))
    }

    /// Registered spelling of `name`. An exact match wins; otherwise the
    /// lookup ignores ASCII case, so `OpenAI` finds `openai`.
    pub fn resolve_name(&self, name: &str) -> Result<&str, DomainError> {
        if let Some((key, _)) = self.backends.get_key_value(name) {
            return Ok(key);
        }
        self.backends
            .keys()
            .find(|key| key.eq_ignore_ascii_case(name))
            .map(String::as_str)
            .ok_or_else(|| DomainError::UnknownBackend(name.to_string()))
    }

    /// Sorted by name.
    pub fn list_names(&self) -> Vec<String> {
        self.backends.keys().cloned().collect()
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &BackendDescriptor> {
        self.backends.values()
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}
