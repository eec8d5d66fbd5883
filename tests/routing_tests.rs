//! End-to-end routing through the registry with in-process backends.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chainroute::{
    BackendDescriptor, BackendKind, BackendRegistry, DomainError, PromptTemplate, Role,
    RouteQueryUseCase, StaticGenerator, Targets,
};

fn capital_template() -> Arc<PromptTemplate> {
    Arc::new(
        PromptTemplate::from_messages([
            (Role::System, "You are a helpful assistant."),
            (Role::User, "{question}"),
        ])
        .expect("valid template"),
    )
}

fn register(registry: &mut BackendRegistry, name: &str, kind: BackendKind, generator: StaticGenerator) {
    registry
        .register(BackendDescriptor::new(name, kind, Arc::new(generator)))
        .expect("unique name");
}

fn capital_registry() -> BackendRegistry {
    let mut registry = BackendRegistry::new();
    register(
        &mut registry,
        "openai",
        BackendKind::Hosted,
        StaticGenerator::replying("Paris is the capital of France."),
    );
    register(
        &mut registry,
        "ollama",
        BackendKind::Local,
        StaticGenerator::replying("Paris."),
    );
    registry
}

#[tokio::test]
async fn test_route_all_returns_results_in_name_order() {
    let use_case = RouteQueryUseCase::new(Arc::new(capital_registry()), capital_template());

    let results = use_case
        .execute("What is the capital of France?", &Targets::All)
        .await
        .expect("route succeeds");

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].backend_name(), "ollama");
    assert_eq!(results[0].text(), "Paris.");
    assert!(results[0].succeeded());
    assert_eq!(results[1].backend_name(), "openai");
    assert_eq!(results[1].text(), "Paris is the capital of France.");
    assert!(results[1].succeeded());
}

#[tokio::test]
async fn test_unknown_backend_fails_whole_call() {
    let use_case = RouteQueryUseCase::new(Arc::new(capital_registry()), capital_template());

    let err = use_case
        .execute("hi", &Targets::single("unknown-backend"))
        .await
        .expect_err("unknown name is rejected");

    assert_eq!(err, DomainError::UnknownBackend("unknown-backend".to_string()));
}

#[tokio::test]
async fn test_one_failure_does_not_suppress_success() {
    let mut registry = BackendRegistry::new();
    register(
        &mut registry,
        "failing",
        BackendKind::Hosted,
        StaticGenerator::failing(DomainError::upstream("HTTP 500")),
    );
    register(
        &mut registry,
        "succeeding",
        BackendKind::Local,
        StaticGenerator::replying("ok"),
    );
    let use_case = RouteQueryUseCase::new(Arc::new(registry), capital_template());

    let targets: Targets = "failing,succeeding".parse().unwrap();
    let results = use_case.execute("hi", &targets).await.unwrap();

    assert_eq!(results.len(), 2);
    assert!(!results[0].succeeded());
    assert!(!results[0].error_message().unwrap_or_default().is_empty());
    assert!(results[1].succeeded());
    assert_eq!(results[1].text(), "ok");
}

#[tokio::test]
async fn test_backends_run_concurrently() {
    let mut registry = BackendRegistry::new();
    for name in ["a", "b", "c"] {
        register(
            &mut registry,
            name,
            BackendKind::Local,
            StaticGenerator::replying(name).with_delay(Duration::from_millis(200)),
        );
    }
    let use_case = RouteQueryUseCase::new(Arc::new(registry), capital_template());

    let start = Instant::now();
    let results = use_case.execute("hi", &Targets::All).await.unwrap();
    let elapsed = start.elapsed();

    assert_eq!(results.len(), 3);
    assert!(
        elapsed < Duration::from_millis(550),
        "expected concurrent execution, took {elapsed:?}"
    );
}

#[tokio::test]
async fn test_timeout_is_isolated_to_one_backend() {
    let mut registry = BackendRegistry::new();
    registry
        .register(
            BackendDescriptor::new(
                "slow",
                BackendKind::Hosted,
                Arc::new(StaticGenerator::replying("late").with_delay(Duration::from_secs(5))),
            )
            .with_timeout(Duration::from_millis(50)),
        )
        .unwrap();
    register(&mut registry, "fast", BackendKind::Local, StaticGenerator::replying("quick"));
    let use_case = RouteQueryUseCase::new(Arc::new(registry), capital_template());

    let results = use_case.execute("hi", &Targets::All).await.unwrap();

    assert_eq!(results[0].backend_name(), "fast");
    assert!(results[0].succeeded());
    assert_eq!(results[1].backend_name(), "slow");
    assert!(!results[1].succeeded());
    assert!(results[1].error_message().unwrap_or_default().contains("Timed out"));
}
