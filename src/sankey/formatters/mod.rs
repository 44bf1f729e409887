mod json;
mod readable;
mod sankeymatic;
mod table;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::Result;

use super::diagram::SankeyDiagram;

pub use json::format_json;
pub use readable::format_readable;
pub use sankeymatic::{format_sankeymatic, SankeymaticOptions, DEFAULT_SANKEYMATIC_URL};
pub use table::format_table;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Sankeymatic,
    Json,
    #[default]
    Readable,
    Table,
}

/// Render a diagram in the requested format.
pub fn render(
    diagram: &SankeyDiagram,
    format: OutputFormat,
    sankeymatic: &SankeymaticOptions,
) -> Result<String> {
    match format {
        OutputFormat::Json => format_json(diagram),
        OutputFormat::Readable => Ok(format_readable(diagram)),
        OutputFormat::Sankeymatic => format_sankeymatic(diagram, sankeymatic),
        OutputFormat::Table => Ok(format_table(diagram)),
    }
}

/// The generation timestamp in local time, or the raw value if it does not parse.
fn generated_local(generated_at: &str) -> String {
    DateTime::parse_from_rfc3339(generated_at)
        .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|_| generated_at.to_string())
}
