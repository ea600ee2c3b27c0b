//! Output formatting for CLI

use serde::Serialize;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            _ => OutputFormat::Text,
        }
    }
}

/// Pretty JSON for machine consumers
pub fn to_json<T: Serialize>(data: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(data)?)
}

/// Render `data` as JSON, or with `text` for human output
pub fn emit<T: Serialize>(
    data: &T,
    format: OutputFormat,
    text: impl FnOnce(&T) -> String,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", to_json(data)?),
        OutputFormat::Text => println!("{}", text(data)),
    }
    Ok(())
}
