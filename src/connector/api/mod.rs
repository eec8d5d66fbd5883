mod config;
pub mod container;
pub mod controller;
pub mod router;

pub use config::{
    request_tracing_enabled, HostedBackendConfig, LocalBackendConfig, DEFAULT_TIMEOUT_SECS,
    HOSTED_BACKEND_NAME, LOCAL_BACKEND_NAME,
};
pub use container::{Container, ContainerConfig};
pub use router::{route_remote, Router};
