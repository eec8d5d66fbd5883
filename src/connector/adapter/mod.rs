mod ollama_client;
mod openai_client;
mod router_client;
mod static_generator;
mod transport;

pub use ollama_client::OllamaClient;
pub use openai_client::OpenAiClient;
pub use router_client::HttpRouterClient;
pub use static_generator::StaticGenerator;

pub mod ollama {
    pub use super::ollama_client::{DEFAULT_HOST, DEFAULT_MODEL, DEFAULT_PORT};
}

pub mod openai {
    pub use super::openai_client::{DEFAULT_BASE_URL, DEFAULT_MODEL};
}
