//! # Connector Layer
//!
//! External integrations implementing application interfaces:
//! - Backends (OpenAI-compatible hosted API, local Ollama, static mock)
//! - HTTP server and client for the query endpoint
//! - CLI wiring (container, config, controllers)

pub mod adapter;
pub mod api;
pub mod http;

pub use adapter::*;
pub use api::{route_remote, Container, ContainerConfig, Router};
