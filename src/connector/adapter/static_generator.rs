use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::application::TextGenerator;
use crate::domain::{DomainError, GenerationOptions, RenderedPrompt, Role};

enum Reply {
    Text(String),
    Echo,
    Error(DomainError),
}

/// In-process generator with a canned answer. Backs `--mock` mode and tests.
pub struct StaticGenerator {
    reply: Reply,
    delay: Option<Duration>,
    model: String,
    last_options: Mutex<Option<GenerationOptions>>,
}

impl StaticGenerator {
    fn with_reply(reply: Reply) -> Self {
        Self {
            reply,
            delay: None,
            model: "static".to_string(),
            last_options: Mutex::new(None),
        }
    }

    pub fn replying(text: impl Into<String>) -> Self {
        Self::with_reply(Reply::Text(text.into()))
    }

    /// Answers with the content of the last user message.
    pub fn echoing() -> Self {
        Self::with_reply(Reply::Echo)
    }

    pub fn failing(error: DomainError) -> Self {
        Self::with_reply(Reply::Error(error))
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Options passed to the most recent `generate` call.
    pub fn last_options(&self) -> Option<GenerationOptions> {
        self.last_options.lock().ok().and_then(|guard| guard.clone())
    }
}

#[async_trait]
impl TextGenerator for StaticGenerator {
    async fn generate(
        &self,
        prompt: &RenderedPrompt,
        options: &GenerationOptions,
    ) -> Result<String, DomainError> {
        if let Ok(mut guard) = self.last_options.lock() {
            *guard = Some(options.clone());
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.reply {
            Reply::Text(text) => Ok(text.clone()),
            Reply::Echo => Ok(prompt
                .messages()
                .iter()
                .rev()
                .find(|m| m.role() == Role::User)
                .map(|m| m.content().to_string())
                .unwrap_or_default()),
            Reply::Error(e) => Err(e.clone()),
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
