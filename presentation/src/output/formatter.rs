//! Output formatter trait

use crate::controller::Outcome;

/// Renders controller outcomes for the terminal
pub trait OutputFormatter {
    /// Render the body of an outcome (empty for bodiless successes)
    fn format(&self, outcome: &Outcome) -> String;

    /// Render a list of provider model names
    fn format_models(&self, provider: &str, models: &[String]) -> String;
}

/// Pretty-printed JSON of the outcome body
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format(&self, outcome: &Outcome) -> String {
        match &outcome.body {
            Some(body) => serde_json::to_string_pretty(body).unwrap_or_else(|_| "{}".to_string()),
            None => String::new(),
        }
    }

    fn format_models(&self, provider: &str, models: &[String]) -> String {
        serde_json::to_string_pretty(&serde_json::json!({
            "provider": provider,
            "models": models,
        }))
        .unwrap_or_else(|_| "{}".to_string())
    }
}
