use anyhow::Result;

use crate::domain::{GenerationOptions, GenerationResult, Targets};

use super::super::Container;

pub struct AskController<'a> {
    container: &'a Container,
}

impl<'a> AskController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn ask(
        &self,
        query: String,
        target: String,
        temperature: Option<f32>,
    ) -> Result<String> {
        let targets: Targets = target.parse()?;

        let mut use_case = self.container.route_use_case();
        if let Some(temperature) = temperature {
            use_case = use_case.with_options(GenerationOptions::new().with_temperature(temperature));
        }

        let results = use_case.execute(&query, &targets).await?;
        Ok(format_results(&results))
    }
}

/// One block per backend, in result order. A failed backend shows its error
/// in place of an answer; the other blocks are unaffected.
pub fn format_results(results: &[GenerationResult]) -> String {
    if results.is_empty() {
        return "No backends answered.".to_string();
    }

    let blocks: Vec<String> = results
        .iter()
        .map(|result| {
            let header = format!("== {} ({} ms) ==", result.backend_name(), result.latency_ms());
            if result.succeeded() {
                format!("{}\n{}", header, result.text().trim_end())
            } else {
                format!(
                    "{}\n[error] {}",
                    header,
                    result.error_message().unwrap_or("unknown failure")
                )
            }
        })
        .collect();

    blocks.join("\n\n")
}
