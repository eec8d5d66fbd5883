//! # Application Layer
//!
//! Backend registry, routing use cases and the interfaces connectors implement.

mod backend_registry;
pub mod interfaces;
pub mod use_cases;

pub use backend_registry::*;
pub use interfaces::*;
pub use use_cases::*;
