//! Formatted output helpers for CLI commands.

use berth_compose::ProjectModel;
use clap::ValueEnum;

/// Serialization format of printed models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// YAML, the compose file format.
    Yaml,
    /// Pretty-printed JSON.
    Json,
}

/// Serializes the resolved model in `format`, ending with a newline.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render(model: &ProjectModel, format: Format) -> anyhow::Result<String> {
    let mut text = match format {
        Format::Yaml => serde_yaml::to_string(model)?,
        Format::Json => serde_json::to_string_pretty(model)?,
    };
    if !text.ends_with('\n') {
        text.push('\n');
    }
    Ok(text)
}
