use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful assistant. Please respond to the user queries";
pub const DEFAULT_USER_TEMPLATE: &str = "Question:{question}";
pub const DEFAULT_QUERY_VARIABLE: &str = "question";
/// Single user message, as used by the per-backend invoke routes.
pub const DEFAULT_INVOKE_TEMPLATE: &str = "{topic}";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "system" => Ok(Role::System),
            "user" | "human" => Ok(Role::User),
            "assistant" | "ai" => Ok(Role::Assistant),
            other => Err(DomainError::invalid_template(format!(
                "unknown message role '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Placeholder(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateMessage {
    role: Role,
    segments: Vec<Segment>,
}

impl TemplateMessage {
    pub fn role(&self) -> Role {
        self.role
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

/// A chat prompt made of role-tagged message bodies.
///
/// Bodies use `{name}` for placeholders and `{{` / `}}` for literal braces.
/// Rendering substitutes values verbatim and fails when any placeholder has
/// no value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    messages: Vec<TemplateMessage>,
}

impl PromptTemplate {
    pub fn from_messages<I, S>(messages: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = (Role, S)>,
        S: AsRef<str>,
    {
        let messages = messages
            .into_iter()
            .map(|(role, body)| {
                Ok(TemplateMessage {
                    role,
                    segments: parse_body(body.as_ref())?,
                })
            })
            .collect::<Result<Vec<_>, DomainError>>()?;

        if messages.is_empty() {
            return Err(DomainError::invalid_template(
                "a template needs at least one message",
            ));
        }

        Ok(Self { messages })
    }

    /// Single user message, e.g. `"{topic}"`.
    pub fn from_template(body: &str) -> Result<Self, DomainError> {
        Self::from_messages([(Role::User, body)])
    }

    /// System instruction followed by `Question:{question}`.
    pub fn chatbot(system_prompt: &str) -> Result<Self, DomainError> {
        Self::from_messages([
            (Role::System, system_prompt),
            (Role::User, DEFAULT_USER_TEMPLATE),
        ])
    }

    pub fn messages(&self) -> &[TemplateMessage] {
        &self.messages
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Distinct placeholder names in order of first use.
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for segment in self.messages.iter().flat_map(|m| m.segments.iter()) {
            if let Segment::Placeholder(name) = segment {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        }
        names
    }

    pub fn render(&self, variables: &HashMap<String, String>) -> Result<RenderedPrompt, DomainError> {
        if let Some(missing) = self
            .placeholders()
            .into_iter()
            .find(|name| !variables.contains_key(*name))
        {
            return Err(DomainError::missing_variable(missing));
        }

        let messages = self
            .messages
            .iter()
            .map(|message| {
                let content = message
                    .segments
                    .iter()
                    .map(|segment| match segment {
                        Segment::Literal(text) => text.as_str(),
                        Segment::Placeholder(name) => variables[name].as_str(),
                    })
                    .collect::<String>();
                RenderedMessage {
                    role: message.role,
                    content,
                }
            })
            .collect();

        Ok(RenderedPrompt { messages })
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            messages: vec![
                TemplateMessage {
                    role: Role::System,
                    segments: vec![Segment::Literal(DEFAULT_SYSTEM_PROMPT.to_string())],
                },
                TemplateMessage {
                    role: Role::User,
                    segments: vec![
                        Segment::Literal("Question:".to_string()),
                        Segment::Placeholder(DEFAULT_QUERY_VARIABLE.to_string()),
                    ],
                },
            ],
        }
    }
}

fn parse_body(body: &str) -> Result<Vec<Segment>, DomainError> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                literal.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                literal.push('}');
            }
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(c) => name.push(c),
                        None => {
                            return Err(DomainError::invalid_template(format!(
                                "unclosed placeholder in {body:?}"
                            )))
                        }
                    }
                }
                if !is_valid_name(&name) {
                    return Err(DomainError::invalid_template(format!(
                        "invalid placeholder name {name:?}"
                    )));
                }
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Placeholder(name));
            }
            '}' => {
                return Err(DomainError::invalid_template(format!(
                    "unmatched '}}' in {body:?}"
                )))
            }
            c => literal.push(c),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }

    Ok(segments)
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_')
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedMessage {
    role: Role,
    content: String,
}

impl RenderedMessage {
    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Fully substituted message sequence, ready to send to a backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedPrompt {
    messages: Vec<RenderedMessage>,
}

impl RenderedPrompt {
    pub fn messages(&self) -> &[RenderedMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_render_substitutes_placeholders() {
        let template = PromptTemplate::from_messages([
            (Role::System, "You are a helpful assistant."),
            (Role::User, "{question}"),
        ])
        .unwrap();

        let rendered = template
            .render(&vars(&[("question", "What is the capital of France?")]))
            .unwrap();

        assert_eq!(rendered.len(), template.message_count());
        assert_eq!(rendered.messages()[0].role(), Role::System);
        assert_eq!(rendered.messages()[0].content(), "You are a helpful assistant.");
        assert_eq!(rendered.messages()[1].role(), Role::User);
        assert_eq!(
            rendered.messages()[1].content(),
            "What is the capital of France?"
        );
    }

    #[test]
    fn test_missing_variable_is_reported_by_name() {
        let template = PromptTemplate::from_template("{topic} in {style}").unwrap();
        let err = template.render(&vars(&[("topic", "rust")])).unwrap_err();
        assert_eq!(err, DomainError::MissingVariable("style".to_string()));
    }

    #[test]
    fn test_extra_variables_are_ignored() {
        let template = PromptTemplate::default();
        let rendered = template
            .render(&vars(&[("question", "hi"), ("unused", "x")]))
            .unwrap();
        assert_eq!(rendered.messages()[1].content(), "Question:hi");
    }

    #[test]
    fn test_values_are_not_escaped_or_truncated() {
        let template = PromptTemplate::from_template("<{value}>").unwrap();
        let value = "{not a placeholder} & <b>".repeat(100);
        let rendered = template.render(&vars(&[("value", &value)])).unwrap();
        assert_eq!(rendered.messages()[0].content(), format!("<{value}>"));
    }

    #[test]
    fn test_escaped_braces_are_literal() {
        let template = PromptTemplate::from_template("json: {{\"q\": \"{q}\"}}").unwrap();
        assert_eq!(template.placeholders(), vec!["q"]);
        let rendered = template.render(&vars(&[("q", "x")])).unwrap();
        assert_eq!(rendered.messages()[0].content(), "json: {\"q\": \"x\"}");
    }

    #[test]
    fn test_malformed_bodies_are_rejected() {
        for body in ["{unclosed", "stray }", "{}", "{two words}"] {
            let err = PromptTemplate::from_template(body).unwrap_err();
            assert!(
                matches!(err, DomainError::InvalidTemplate(_)),
                "expected InvalidTemplate for {body:?}, got {err:?}"
            );
        }
    }

    #[test]
    fn test_empty_template_is_rejected() {
        let empty: Vec<(Role, &str)> = Vec::new();
        assert!(PromptTemplate::from_messages(empty).is_err());
    }

    #[test]
    fn test_render_is_idempotent() {
        let template = PromptTemplate::default();
        let variables = vars(&[("question", "same")]);
        assert_eq!(
            template.render(&variables).unwrap(),
            template.render(&variables).unwrap()
        );
    }

    #[test]
    fn test_default_matches_chatbot_constructor() {
        assert_eq!(
            PromptTemplate::default(),
            PromptTemplate::chatbot(DEFAULT_SYSTEM_PROMPT).unwrap()
        );
    }

    #[test]
    fn test_placeholders_are_distinct_in_first_use_order() {
        let template = PromptTemplate::from_messages([
            (Role::System, "{b} {a}"),
            (Role::User, "{a} {c} {b}"),
        ])
        .unwrap();
        assert_eq!(template.placeholders(), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_role_aliases() {
        assert_eq!("human".parse::<Role>().unwrap(), Role::User);
        assert_eq!("AI".parse::<Role>().unwrap(), Role::Assistant);
        assert_eq!("system".parse::<Role>().unwrap(), Role::System);
        assert!("narrator".parse::<Role>().is_err());
    }
}
