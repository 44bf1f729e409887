use crate::error::Result;
use crate::sankey::diagram::SankeyDiagram;

/// Pretty-printed JSON of the whole diagram.
pub fn format_json(diagram: &SankeyDiagram) -> Result<String> {
    Ok(serde_json::to_string_pretty(diagram)?)
}
