mod list_backends;
mod route_query;

pub use list_backends::*;
pub use route_query::*;
