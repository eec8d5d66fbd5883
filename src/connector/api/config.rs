use std::time::Duration;

use crate::connector::adapter::{ollama, openai};
use crate::domain::{DomainError, DEFAULT_INVOKE_TEMPLATE, DEFAULT_SYSTEM_PROMPT};

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const HOSTED_BACKEND_NAME: &str = "openai";
pub const LOCAL_BACKEND_NAME: &str = "ollama";

#[derive(Debug, Clone)]
pub struct HostedBackendConfig {
    pub enabled: bool,
    pub name: String,
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone)]
pub struct LocalBackendConfig {
    pub enabled: bool,
    pub name: String,
    pub host: String,
    pub port: u16,
    pub model: String,
    pub temperature: Option<f32>,
}

impl LocalBackendConfig {
    pub fn base_url(&self) -> String {
        crate::OllamaClient::base_url_for(&self.host, self.port)
    }
}

/// Startup configuration, read once and handed to the [`super::Container`].
///
/// | Variable                    | Default                   |
/// |-----------------------------|---------------------------|
/// | `OPENAI_API_KEY`            | required for the hosted backend |
/// | `OPENAI_BASE_URL`           | `https://api.openai.com`  |
/// | `OPENAI_MODEL`              | `gpt-3.5-turbo`           |
/// | `OPENAI_TEMPERATURE`        | `0`                       |
/// | `OLLAMA_HOST` / `OLLAMA_PORT` | `localhost` / `11434`   |
/// | `OLLAMA_MODEL`              | `llama2`                  |
/// | `OLLAMA_TEMPERATURE`        | unset (server default)    |
/// | `CHAINROUTE_TIMEOUT_SECS`   | `30`                      |
/// | `CHAINROUTE_SYSTEM_PROMPT`  | built-in assistant prompt |
/// | `CHAINROUTE_INVOKE_TEMPLATE` | `{topic}`                |
/// | `CHAINROUTE_DISABLE_HOSTED` / `CHAINROUTE_DISABLE_LOCAL` | `false` |
/// | `CHAINROUTE_TRACING` (or `LANGCHAIN_TRACING_V2`) | `false` |
#[derive(Debug, Clone)]
pub struct ContainerConfig {
    pub mock_backends: bool,
    pub hosted: HostedBackendConfig,
    pub local: LocalBackendConfig,
    pub timeout_secs: u64,
    pub system_prompt: String,
    /// User message template for `POST /{backend}/invoke`.
    pub invoke_template: String,
    /// Logs rendered prompts and per-backend detail.
    pub request_tracing: bool,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl ContainerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let hosted = HostedBackendConfig {
            enabled: !parse_flag(get("CHAINROUTE_DISABLE_HOSTED")),
            name: HOSTED_BACKEND_NAME.to_string(),
            api_key: get("OPENAI_API_KEY"),
            base_url: get("OPENAI_BASE_URL").unwrap_or_else(|| openai::DEFAULT_BASE_URL.to_string()),
            model: get("OPENAI_MODEL").unwrap_or_else(|| openai::DEFAULT_MODEL.to_string()),
            temperature: Some(parse_or("OPENAI_TEMPERATURE", get("OPENAI_TEMPERATURE"), 0.0)),
        };

        let local = LocalBackendConfig {
            enabled: !parse_flag(get("CHAINROUTE_DISABLE_LOCAL")),
            name: LOCAL_BACKEND_NAME.to_string(),
            host: get("OLLAMA_HOST").unwrap_or_else(|| ollama::DEFAULT_HOST.to_string()),
            port: parse_or("OLLAMA_PORT", get("OLLAMA_PORT"), ollama::DEFAULT_PORT),
            model: get("OLLAMA_MODEL").unwrap_or_else(|| ollama::DEFAULT_MODEL.to_string()),
            temperature: parse_opt("OLLAMA_TEMPERATURE", get("OLLAMA_TEMPERATURE")),
        };

        Self {
            mock_backends: false,
            hosted,
            local,
            timeout_secs: parse_or(
                "CHAINROUTE_TIMEOUT_SECS",
                get("CHAINROUTE_TIMEOUT_SECS"),
                DEFAULT_TIMEOUT_SECS,
            ),
            system_prompt: get("CHAINROUTE_SYSTEM_PROMPT")
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            invoke_template: get("CHAINROUTE_INVOKE_TEMPLATE")
                .unwrap_or_else(|| DEFAULT_INVOKE_TEMPLATE.to_string()),
            request_tracing: request_tracing_enabled(&get),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Fails fast on settings that would make every request fail.
    pub fn validate(&self) -> Result<(), DomainError> {
        if !self.hosted.enabled && !self.local.enabled {
            return Err(DomainError::configuration(
                "both the hosted and the local backend are disabled",
            ));
        }

        if self.timeout_secs == 0 {
            return Err(DomainError::configuration(
                "CHAINROUTE_TIMEOUT_SECS must be greater than zero",
            ));
        }

        if self.hosted.enabled && !self.mock_backends && self.hosted.api_key.is_none() {
            return Err(DomainError::configuration(
                "OPENAI_API_KEY environment variable is not set",
            ));
        }

        Ok(())
    }
}

/// Whether `CHAINROUTE_TRACING` or `LANGCHAIN_TRACING_V2` asks for detailed
/// request logs. Reads nothing else, so it can run before logging is set up.
pub fn request_tracing_enabled<F>(lookup: F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    parse_flag(lookup("CHAINROUTE_TRACING")) || parse_flag(lookup("LANGCHAIN_TRACING_V2"))
}

fn parse_flag(value: Option<String>) -> bool {
    value.is_some_and(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}

fn parse_or<T: std::str::FromStr>(var: &str, value: Option<String>, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match value {
        Some(val) => match val.trim().parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        None => default,
    }
}

fn parse_opt<T: std::str::FromStr>(var: &str, value: Option<String>) -> Option<T>
where
    T::Err: std::fmt::Display,
{
    let val = value?;
    match val.trim().parse() {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::warn!("Invalid value '{}' for {}: {}. Ignoring.", val, var, e);
            None
        }
    }
}
