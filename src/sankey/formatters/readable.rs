use std::fmt::Write;

use crate::sankey::diagram::SankeyDiagram;

use super::generated_local;

/// Plain listing of nodes and flows.
pub fn format_readable(diagram: &SankeyDiagram) -> String {
    let meta = &diagram.metadata;
    let mut out = String::new();
    let _ = writeln!(out, "Firefly III Sankey Diagram");
    let _ = writeln!(out, "============================");
    let _ = writeln!(out, "Period: {} to {}", meta.start_date, meta.end_date);
    let _ = writeln!(out, "Generated: {}", generated_local(&meta.generated_at));
    let _ = writeln!(out, "Currency: {}", meta.currency);
    let _ = writeln!(out);

    let _ = writeln!(out, "Nodes ({}):", diagram.nodes.len());
    for node in &diagram.nodes {
        let _ = writeln!(out, "  [{}] {} ({})", node.id, node.name, node.node_type);
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Flows ({}):", diagram.links.len());
    for (source, link, target) in diagram.resolved_links() {
        let _ = writeln!(
            out,
            "  {} → {}: {:.2} {}",
            source.name, target.name, link.value, link.currency
        );
    }
    out
}
