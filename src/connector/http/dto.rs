//! Wire types shared by the HTTP server and [`crate::HttpRouterClient`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::{BackendInfo, GenerationResult, ALL_TARGETS};

fn default_target() -> String {
    ALL_TARGETS.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    /// Backend name, comma separated names, or `"all"`.
    #[serde(default = "default_target")]
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub results: Vec<GenerationResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendsResponse {
    pub backends: Vec<BackendInfo>,
}

/// LangServe-style `{"input": {...}}` body for `POST /{backend}/invoke`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvokeRequest {
    pub input: HashMap<String, serde_json::Value>,
}

impl InvokeRequest {
    /// Template variables; non-string values are passed as their JSON text.
    pub fn variables(&self) -> HashMap<String, String> {
        self.input
            .iter()
            .map(|(key, value)| {
                let text = match value {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (key.clone(), text)
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvokeResponse {
    pub output: String,
    pub metadata: InvokeMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvokeMetadata {
    pub backend_name: String,
    pub latency_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_request_target_defaults_to_all() {
        let request: QueryRequest = serde_json::from_str(r#"{"query": "hi"}"#).unwrap();
        assert_eq!(request.target, "all");
        assert!(request.temperature.is_none());
    }

    #[test]
    fn test_invoke_variables_stringify_non_strings() {
        let request: InvokeRequest =
            serde_json::from_str(r#"{"input": {"topic": "rust", "count": 3}}"#).unwrap();
        let vars = request.variables();
        assert_eq!(vars["topic"], "rust");
        assert_eq!(vars["count"], "3");
    }
}
