pub mod application;
pub mod cli;
pub mod connector;
pub mod domain;

pub use application::{
    BackendDescriptor, BackendRegistry, ListBackendsUseCase, RouteQueryUseCase, TextGenerator,
};

pub use cli::Commands;

pub use connector::{
    route_remote, Container, ContainerConfig, HttpRouterClient, OllamaClient, OpenAiClient,
    Router, StaticGenerator,
};

pub use domain::{
    BackendInfo, BackendKind, DomainError, GenerationOptions, GenerationResult, PromptTemplate,
    RenderedPrompt, Role, Targets,
};
