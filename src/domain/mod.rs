//! # Domain Layer
//!
//! Prompt, generation and backend models plus the error taxonomy.
//! This layer is independent of external frameworks and infrastructure.

mod error;
pub mod models;

pub use error::*;
pub use models::*;
