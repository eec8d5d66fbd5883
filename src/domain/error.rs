use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Missing template variable: {0}")]
    MissingVariable(String),

    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    #[error("Backend already registered: {0}")]
    DuplicateBackend(String),

    #[error("Unknown backend: {0}")]
    UnknownBackend(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn missing_variable(name: impl Into<String>) -> Self {
        Self::MissingVariable(name.into())
    }

    pub fn invalid_template(msg: impl Into<String>) -> Self {
        Self::InvalidTemplate(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn authentication(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::UpstreamUnavailable(msg.into())
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Request-validation errors abort a whole routing call.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingVariable(_)
                | Self::InvalidTemplate(_)
                | Self::DuplicateBackend(_)
                | Self::UnknownBackend(_)
                | Self::InvalidInput(_)
                | Self::Configuration(_)
        )
    }

    /// Execution errors are scoped to a single backend invocation and end up
    /// as a failed [`crate::GenerationResult`] instead of propagating.
    pub fn is_execution(&self) -> bool {
        matches!(
            self,
            Self::Authentication(_)
                | Self::Upstream(_)
                | Self::UpstreamUnavailable(_)
                | Self::Timeout(_)
        )
    }
}
