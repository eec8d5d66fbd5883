use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use futures_util::future::join_all;
use tracing::{debug, info};

use crate::application::{BackendDescriptor, BackendRegistry};
use crate::domain::{
    DomainError, GenerationOptions, GenerationResult, PromptTemplate, Targets,
    DEFAULT_QUERY_VARIABLE,
};

/// Fans one query out to the selected backends.
///
/// The pipeline is resolve → render → invoke: unknown backend names and
/// missing template variables abort the whole call before anything is sent,
/// while per-backend failures come back as failed results next to the
/// successful ones. Backends are invoked concurrently and results keep the
/// order of the resolved targets.
pub struct RouteQueryUseCase {
    registry: Arc<BackendRegistry>,
    template: Arc<PromptTemplate>,
    query_variable: String,
    options: GenerationOptions,
}

impl RouteQueryUseCase {
    pub fn new(registry: Arc<BackendRegistry>, template: Arc<PromptTemplate>) -> Self {
        Self {
            registry,
            template,
            query_variable: DEFAULT_QUERY_VARIABLE.to_string(),
            options: GenerationOptions::default(),
        }
    }

    /// Placeholder that receives the raw query text.
    pub fn with_query_variable(mut self, name: impl Into<String>) -> Self {
        self.query_variable = name.into();
        self
    }

    /// Request-level overrides applied on top of each backend's defaults.
    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    pub async fn execute(
        &self,
        query: &str,
        targets: &Targets,
    ) -> Result<Vec<GenerationResult>, DomainError> {
        let mut variables = HashMap::with_capacity(1);
        variables.insert(self.query_variable.clone(), query.to_string());
        self.execute_with_variables(&variables, targets).await
    }

    pub async fn execute_with_variables(
        &self,
        variables: &HashMap<String, String>,
        targets: &Targets,
    ) -> Result<Vec<GenerationResult>, DomainError> {
        let descriptors = self.resolve(targets)?;
        let prompt = self.template.render(variables)?;

        let names: Vec<&str> = descriptors.iter().map(|d| d.name()).collect();
        info!("Routing query to {} backend(s): {}", names.len(), names.join(", "));
        debug!("Rendered prompt: {:?}", prompt);

        let start_time = Instant::now();

        let results = join_all(
            descriptors
                .iter()
                .map(|descriptor| descriptor.invoke(&prompt, &self.options)),
        )
        .await;

        let failed = results.iter().filter(|r| !r.succeeded()).count();
        info!(
            "Collected {} result(s) in {:.2}s ({} failed)",
            results.len(),
            start_time.elapsed().as_secs_f64(),
            failed
        );

        Ok(results)
    }

    fn resolve(&self, targets: &Targets) -> Result<Vec<&BackendDescriptor>, DomainError> {
        let names = match targets {
            Targets::All => self.registry.list_names(),
            Targets::Named(names) => names.clone(),
        };

        if names.is_empty() {
            return Err(DomainError::invalid_input(if targets.is_all() {
                "no backends registered"
            } else {
                "no target backends given"
            }));
        }

        names.iter().map(|name| self.registry.get(name)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::StaticGenerator;
    use crate::domain::{BackendKind, Role};
    use std::time::Duration;

    fn registry(entries: Vec<(&str, StaticGenerator)>) -> Arc<BackendRegistry> {
        let mut registry = BackendRegistry::new();
        for (name, generator) in entries {
            registry
                .register(BackendDescriptor::new(
                    name,
                    BackendKind::Local,
                    Arc::new(generator),
                ))
                .unwrap();
        }
        Arc::new(registry)
    }

    fn template() -> Arc<PromptTemplate> {
        Arc::new(
            PromptTemplate::from_messages([
                (Role::System, "You are a helpful assistant."),
                (Role::User, "{question}"),
            ])
            .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_all_returns_results_in_name_order() {
        let use_case = RouteQueryUseCase::new(
            registry(vec![
                ("zeta", StaticGenerator::replying("z")),
                ("alpha", StaticGenerator::replying("a")),
                ("mid", StaticGenerator::replying("m")),
            ]),
            template(),
        );

        let results = use_case.execute("q", &Targets::All).await.unwrap();
        let names: Vec<_> = results.iter().map(|r| r.backend_name()).collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
    }

    #[tokio::test]
    async fn test_named_targets_keep_request_order_not_completion_order() {
        let use_case = RouteQueryUseCase::new(
            registry(vec![
                (
                    "slow",
                    StaticGenerator::replying("slow").with_delay(Duration::from_millis(80)),
                ),
                ("fast", StaticGenerator::replying("fast")),
            ]),
            template(),
        );

        let results = use_case
            .execute("q", &Targets::named(["slow", "fast"]))
            .await
            .unwrap();
        assert_eq!(results[0].text(), "slow");
        assert_eq!(results[1].text(), "fast");
    }

    #[tokio::test]
    async fn test_unknown_backend_fails_fast() {
        let use_case = RouteQueryUseCase::new(
            registry(vec![("ollama", StaticGenerator::replying("Paris."))]),
            template(),
        );

        let err = use_case
            .execute("hi", &Targets::named(["ollama", "unknown-backend"]))
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::UnknownBackend("unknown-backend".to_string()));
    }

    #[tokio::test]
    async fn test_missing_variable_aborts_before_invoking() {
        let use_case = RouteQueryUseCase::new(
            registry(vec![("ollama", StaticGenerator::replying("x"))]),
            Arc::new(PromptTemplate::from_template("{topic}").unwrap()),
        );

        let err = use_case.execute("hi", &Targets::All).await.unwrap_err();
        assert_eq!(err, DomainError::MissingVariable("topic".to_string()));

        let ok = use_case
            .with_query_variable("topic")
            .execute("hi", &Targets::All)
            .await
            .unwrap();
        assert_eq!(ok.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_registry_with_all_is_invalid() {
        let use_case = RouteQueryUseCase::new(registry(vec![]), template());
        let err = use_case.execute("hi", &Targets::All).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_empty_query_is_sent_verbatim() {
        let generator = Arc::new(StaticGenerator::echoing());
        let mut registry = BackendRegistry::new();
        registry
            .register(BackendDescriptor::new("echo", BackendKind::Local, generator))
            .unwrap();

        let use_case = RouteQueryUseCase::new(Arc::new(registry), template());
        let results = use_case.execute("", &Targets::All).await.unwrap();

        assert!(results[0].succeeded());
        assert_eq!(results[0].text(), "");
    }

    #[tokio::test]
    async fn test_request_options_reach_the_backend() {
        let generator = Arc::new(StaticGenerator::replying("ok"));
        let mut registry = BackendRegistry::new();
        registry
            .register(
                BackendDescriptor::new("local", BackendKind::Local, generator.clone())
                    .with_options(GenerationOptions::new().with_model("llama2")),
            )
            .unwrap();

        let use_case = RouteQueryUseCase::new(Arc::new(registry), template())
            .with_options(GenerationOptions::new().with_temperature(0.5));
        use_case.execute("q", &Targets::All).await.unwrap();

        let seen = generator.last_options().unwrap();
        assert_eq!(seen.temperature, Some(0.5));
        assert_eq!(seen.model.as_deref(), Some("llama2"));
    }
}
