//! HTTP surface: `/query`, `/backends`, `/{backend}/invoke`, `/health`.

pub mod dto;
mod error;
mod server;

pub use error::ApiError;
pub use server::{create_router, serve, AppState};
