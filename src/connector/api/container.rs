use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use crate::application::{BackendDescriptor, BackendRegistry, TextGenerator};
use crate::domain::{BackendKind, GenerationOptions, PromptTemplate};
use crate::{ListBackendsUseCase, OllamaClient, OpenAiClient, RouteQueryUseCase, StaticGenerator};

pub use super::config::ContainerConfig;

/// Owns the backend registry and the shared prompt templates. Built once at
/// startup; use cases borrow from it per request.
pub struct Container {
    registry: Arc<BackendRegistry>,
    template: Arc<PromptTemplate>,
    invoke_template: Arc<PromptTemplate>,
}

impl Container {
    pub fn new(config: ContainerConfig) -> Result<Self> {
        config.validate()?;

        let timeout = config.timeout();
        let mut registry = BackendRegistry::new();

        if config.hosted.enabled {
            let hosted = &config.hosted;
            let generator: Arc<dyn TextGenerator> = if config.mock_backends {
                debug!("Using mock generator for '{}'", hosted.name);
                Arc::new(StaticGenerator::echoing().with_model(hosted.model.clone()))
            } else {
                debug!("Registering OpenAI backend '{}' ({})", hosted.name, hosted.model);
                Arc::new(OpenAiClient::new(
                    hosted.api_key.clone().unwrap_or_default(),
                    hosted.model.clone(),
                    hosted.base_url.clone(),
                    timeout,
                ))
            };

            registry.register(
                BackendDescriptor::new(hosted.name.clone(), BackendKind::Hosted, generator)
                    .with_options(backend_options(&hosted.model, hosted.temperature))
                    .with_timeout(timeout),
            )?;
        }

        if config.local.enabled {
            let local = &config.local;
            let generator: Arc<dyn TextGenerator> = if config.mock_backends {
                debug!("Using mock generator for '{}'", local.name);
                Arc::new(StaticGenerator::echoing().with_model(local.model.clone()))
            } else {
                debug!(
                    "Registering Ollama backend '{}' at {} ({})",
                    local.name,
                    local.base_url(),
                    local.model
                );
                Arc::new(OllamaClient::new(local.model.clone(), local.base_url(), timeout))
            };

            registry.register(
                BackendDescriptor::new(local.name.clone(), BackendKind::Local, generator)
                    .with_options(backend_options(&local.model, local.temperature))
                    .with_timeout(timeout),
            )?;
        }

        Self::with_registry(config, registry)
    }

    /// Uses a pre-built registry instead of the configured backends.
    pub fn with_registry(config: ContainerConfig, registry: BackendRegistry) -> Result<Self> {
        let template = PromptTemplate::chatbot(&config.system_prompt)?;
        let invoke_template = PromptTemplate::from_template(&config.invoke_template)?;
        debug!(
            "Container ready with {} backend(s): {}",
            registry.len(),
            registry.list_names().join(", ")
        );

        Ok(Self {
            registry: Arc::new(registry),
            template: Arc::new(template),
            invoke_template: Arc::new(invoke_template),
        })
    }

    pub fn route_use_case(&self) -> RouteQueryUseCase {
        RouteQueryUseCase::new(self.registry.clone(), self.template.clone())
    }

    /// Router over the single-message invoke template (`{topic}` by default).
    pub fn invoke_use_case(&self) -> RouteQueryUseCase {
        RouteQueryUseCase::new(self.registry.clone(), self.invoke_template.clone())
    }

    pub fn list_backends_use_case(&self) -> ListBackendsUseCase {
        ListBackendsUseCase::new(self.registry.clone())
    }

    pub fn registry(&self) -> &BackendRegistry {
        &self.registry
    }
}

fn backend_options(model: &str, temperature: Option<f32>) -> GenerationOptions {
    let options = GenerationOptions::new().with_model(model);
    match temperature {
        Some(t) => options.with_temperature(t),
        None => options,
    }
}
