use crate::mapper::MapOutcome;
use serde_json::{Map, Value};

/// Formats mapping outcomes into human-readable summaries.
pub struct OutcomeFormatter;

impl OutcomeFormatter {
    /// Renders the request line, each section, and any undeclared fields.
    pub fn format_outcome(outcome: &MapOutcome) -> String {
        let request = &outcome.format_param;
        let mut lines = vec![format!(
            "{} {}{}",
            request.method, request.domain, request.path
        )];

        for (title, section) in [
            ("headers", &request.headers),
            ("query", &request.query_params),
            ("body", &request.body),
        ] {
            lines.push(Self::format_section(title, section));
        }

        if outcome.extras.is_empty() {
            lines.push("no undeclared fields".to_string());
        } else {
            lines.push(format!("undeclared fields ({}):", outcome.extras.len()));
            lines.extend(outcome.extras.iter().map(|path| format!("  - {}", path)));
        }
        lines.join("\n")
    }

    fn format_section(title: &str, section: &Map<String, Value>) -> String {
        if section.is_empty() {
            return format!("{}: (none)", title);
        }
        let fields = section
            .iter()
            .map(|(k, v)| format!("{}={}", k, Self::format_value(v)))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}: {}", title, fields)
    }

    /// Strings are quoted so an empty string stays visible next to `null`.
    fn format_value(value: &Value) -> String {
        match value {
            Value::Array(items) => format!("[{} item(s)]", items.len()),
            Value::Object(fields) => format!("{{{} field(s)}}", fields.len()),
            scalar => scalar.to_string(),
        }
    }
}
