use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use crate::fmt::amount;
use crate::sankey::diagram::SankeyDiagram;

/// Flows as a terminal table, largest first.
pub fn format_table(diagram: &SankeyDiagram) -> String {
    let meta = &diagram.metadata;
    let mut table = Table::new();
    table.set_header(vec!["From", "To", "Amount", "Currency"]);

    for (source, link, target) in diagram.resolved_links() {
        table.add_row(vec![
            Cell::new(format!("{} ({})", source.name, source.node_type)),
            Cell::new(format!("{} ({})", target.name, target.node_type)),
            Cell::new(amount(link.value)).set_alignment(CellAlignment::Right),
            Cell::new(&link.currency),
        ]);
    }

    let title = format!("Flows {} to {}", meta.start_date, meta.end_date);
    format!(
        "{}\n{table}\n{} nodes, {} flows ({})",
        title.bold(),
        diagram.nodes.len(),
        diagram.links.len(),
        meta.currency
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sankey::formatters::fixtures::full_chain;

    #[test]
    fn test_table_rows() {
        colored::control::set_override(false);
        let out = format_table(&full_chain());
        assert!(out.starts_with("Flows 2024-01-01 to 2024-01-31"));
        assert!(out.contains("Salary (revenue)"));
        assert!(out.contains("Supermarket (expense)"));
        assert!(out.contains("3,000.00"));
        assert!(out.contains("6 nodes, 5 flows (USD)"));
    }
}
