use anyhow::Result;

use crate::domain::BackendInfo;

use super::super::Container;

pub struct BackendsController<'a> {
    container: &'a Container,
}

impl<'a> BackendsController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn list(&self) -> Result<String> {
        let backends = self.container.list_backends_use_case().execute();
        Ok(format_backends(&backends))
    }
}

pub fn format_backends(backends: &[BackendInfo]) -> String {
    if backends.is_empty() {
        return "No backends registered.".to_string();
    }

    let mut output = "Registered backends:\n\n".to_string();
    for backend in backends {
        output.push_str(&format!(
            "  {:<12} {:<8} {}\n",
            backend.name,
            backend.kind.as_str(),
            backend.model
        ));
    }
    output
}
