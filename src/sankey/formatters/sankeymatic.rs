use crate::error::Result;
#[cfg(not(feature = "url"))]
use crate::error::FlowError;
use crate::sankey::diagram::{NodeType, SankeyDiagram, SankeyLink, SankeyNode};

use super::generated_local;

pub const DEFAULT_SANKEYMATIC_URL: &str = "https://sankeymatic.com";

const URL_RULE: &str =
    "// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

#[derive(Debug, Clone, PartialEq)]
pub struct SankeymaticOptions {
    /// Append a direct link carrying the compressed diagram.
    pub include_url: bool,
    pub base_url: String,
}

impl Default for SankeymaticOptions {
    fn default() -> Self {
        Self {
            include_url: true,
            base_url: DEFAULT_SANKEYMATIC_URL.to_string(),
        }
    }
}

/// Output sections, in the order they are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    IncomeToCategories,
    IncomeToAssets,
    AssetsToBudgets,
    BudgetsToCategories,
    AssetsToCategories,
    CategoriesToExpenses,
    BudgetsToExpenses,
    AssetsToExpenses,
    Other,
}

impl Section {
    const ORDER: [Section; 9] = [
        Section::IncomeToCategories,
        Section::IncomeToAssets,
        Section::AssetsToBudgets,
        Section::BudgetsToCategories,
        Section::AssetsToCategories,
        Section::CategoriesToExpenses,
        Section::BudgetsToExpenses,
        Section::AssetsToExpenses,
        Section::Other,
    ];

    fn title(self) -> &'static str {
        match self {
            Self::IncomeToCategories => "Income Accounts -> Income Categories",
            Self::IncomeToAssets => "Income -> Assets",
            Self::AssetsToBudgets => "Assets -> Budgets",
            Self::BudgetsToCategories => "Budgets -> Expense Categories",
            Self::AssetsToCategories => "Assets -> Expense Categories (no budget)",
            Self::CategoriesToExpenses => "Expense Categories -> Expense Accounts",
            Self::BudgetsToExpenses => "Budgets -> Expense Accounts (no category)",
            Self::AssetsToExpenses => "Assets -> Expense Accounts (no budget or category)",
            Self::Other => "Other Flows (Transfers, etc.)",
        }
    }

    fn of(source: &SankeyNode, target: &SankeyNode) -> Self {
        use NodeType::*;
        match (source.node_type, target.node_type) {
            (Revenue, Category) => Self::IncomeToCategories,
            (Category | Revenue, Asset) => Self::IncomeToAssets,
            (Asset, Budget) => Self::AssetsToBudgets,
            (Asset, Category) => Self::AssetsToCategories,
            (Asset, Expense) => Self::AssetsToExpenses,
            (Budget, Category) => Self::BudgetsToCategories,
            (Budget, Expense) => Self::BudgetsToExpenses,
            (Category, Expense) => Self::CategoriesToExpenses,
            _ => Self::Other,
        }
    }

    /// Order of a flow within its section. Income categories feed assets
    /// before revenue accounts that bypass a category.
    fn rank(source: &SankeyNode) -> u8 {
        match source.node_type {
            NodeType::Revenue => 1,
            _ => 0,
        }
    }
}

fn flow_line(source: &SankeyNode, link: &SankeyLink, target: &SankeyNode) -> String {
    format!("{} [{:.2}] {}", source.name, link.value, target.name)
}

fn clean_base(base_url: &str) -> &str {
    let base = if base_url.is_empty() { DEFAULT_SANKEYMATIC_URL } else { base_url };
    base.strip_suffix('/').unwrap_or(base)
}

/// Build link for the SankeyMatic editor with `diagram_text` preloaded.
#[cfg(feature = "url")]
pub fn sankeymatic_url(diagram_text: &str, base_url: &str) -> Result<String> {
    let compressed = lz_str::compress_to_encoded_uri_component(diagram_text);
    Ok(format!("{}/build/?i={compressed}", clean_base(base_url)))
}

#[cfg(not(feature = "url"))]
pub fn sankeymatic_url(_diagram_text: &str, _base_url: &str) -> Result<String> {
    Err(FlowError::Other(
        "SankeyMatic links require the 'url' feature; rebuild with `--features url` or pass --no-url"
            .into(),
    ))
}

/// SankeyMatic input text, grouped into commented sections.
pub fn format_sankeymatic(diagram: &SankeyDiagram, opts: &SankeymaticOptions) -> Result<String> {
    let meta = &diagram.metadata;
    let base = clean_base(&opts.base_url);

    let mut out = format!(
        "// Firefly III Sankey Diagram\n\
         // Period: {} to {}\n\
         // Generated: {}\n\
         // Currency: {}\n\
         // Paste this into {base}/build/\n\n",
        meta.start_date,
        meta.end_date,
        generated_local(&meta.generated_at),
        meta.currency,
    );

    let resolved: Vec<_> = diagram
        .resolved_links()
        .map(|(source, link, target)| {
            let section = Section::of(source, target);
            let rank = if section == Section::IncomeToAssets { Section::rank(source) } else { 0 };
            (section, rank, flow_line(source, link, target))
        })
        .collect();

    let mut sections = Vec::new();
    for section in Section::ORDER {
        let mut flows: Vec<(u8, &str)> = resolved
            .iter()
            .filter(|(s, _, _)| *s == section)
            .map(|(_, rank, line)| (*rank, line.as_str()))
            .collect();
        flows.sort_by_key(|(rank, _)| *rank);
        let lines: Vec<&str> = flows.into_iter().map(|(_, line)| line).collect();
        if !lines.is_empty() {
            sections.push(format!("// {}\n{}\n", section.title(), lines.join("\n")));
        }
    }
    out.push_str(&sections.join("\n"));

    if opts.include_url {
        let body: Vec<&str> = out
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with("//"))
            .collect();
        let url = sankeymatic_url(&body.join("\n"), base)?;
        out.push_str(&format!(
            "\n{URL_RULE}\n// 🔗 Direct Link (click to open in SankeyMatic):\n// {url}\n"
        ));
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sankey::formatters::fixtures::{diagram, full_chain, link, node};

    fn no_url() -> SankeymaticOptions {
        SankeymaticOptions { include_url: false, ..SankeymaticOptions::default() }
    }

    fn single(source: (&str, NodeType), target: (&str, NodeType), value: f64) -> String {
        let d = diagram(
            vec![node(0, source.0, source.1), node(1, target.0, target.1)],
            vec![link(0, 1, value)],
        );
        format_sankeymatic(&d, &no_url()).unwrap()
    }

    #[test]
    fn test_header() {
        let out = format_sankeymatic(&full_chain(), &no_url()).unwrap();
        assert!(out.starts_with("// Firefly III Sankey Diagram\n"));
        assert!(out.contains("// Period: 2024-01-01 to 2024-01-31"));
        assert!(out.contains("// Generated:"));
        assert!(out.contains("// Currency: USD"));
        assert!(out.contains("// Paste this into https://sankeymatic.com/build/"));
    }

    #[test]
    fn test_flow_lines() {
        let out = format_sankeymatic(&full_chain(), &no_url()).unwrap();
        assert!(out.contains("Salary [3000.00] Income Category"));
        assert!(out.contains("Income Category [3000.00] All Funds"));
        assert!(out.contains("All Funds [1000.00] Monthly Budget"));
        assert!(out.contains("Monthly Budget [1000.00] Expense Category"));
        assert!(out.contains("Expense Category [1000.00] Supermarket"));
    }

    #[test]
    fn test_section_order() {
        let out = format_sankeymatic(&full_chain(), &no_url()).unwrap();
        let titles = [
            "// Income Accounts -> Income Categories",
            "// Income -> Assets",
            "// Assets -> Budgets",
            "// Budgets -> Expense Categories",
            "// Expense Categories -> Expense Accounts",
        ];
        let positions: Vec<usize> = titles.iter().map(|t| out.find(t).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(!out.contains("// Other Flows"));
    }

    #[test]
    fn test_income_categories_precede_revenue_into_assets() {
        let d = diagram(
            vec![
                node(0, "Employer", NodeType::Revenue),
                node(1, "All Funds", NodeType::Asset),
                node(2, "Salary", NodeType::Category),
            ],
            vec![link(0, 1, 4000.0), link(2, 1, 2000.0)],
        );
        let out = format_sankeymatic(&d, &no_url()).unwrap();
        let category = out.find("Salary [2000.00] All Funds").unwrap();
        let revenue = out.find("Employer [4000.00] All Funds").unwrap();
        assert!(out.find("// Income -> Assets").unwrap() < category);
        assert!(category < revenue);
    }

    #[test]
    fn test_sections_by_node_type() {
        use NodeType::*;
        let cases = [
            (("Job", Revenue), ("Wages", Category), "// Income Accounts -> Income Categories"),
            (("Income Cat", Category), ("All Funds", Asset), "// Income -> Assets"),
            (("Salary", Revenue), ("All Funds", Asset), "// Income -> Assets"),
            (("All Funds", Asset), ("Groceries Budget", Budget), "// Assets -> Budgets"),
            (("Food Budget", Budget), ("Restaurants", Category), "// Budgets -> Expense Categories"),
            (("All Funds", Asset), ("Misc", Category), "// Assets -> Expense Categories (no budget)"),
            (("Food", Category), ("Store", Expense), "// Expense Categories -> Expense Accounts"),
            (
                ("Bills Budget", Budget),
                ("Electric Company", Expense),
                "// Budgets -> Expense Accounts (no category)",
            ),
            (
                ("All Funds", Asset),
                ("Cash Expense", Expense),
                "// Assets -> Expense Accounts (no budget or category)",
            ),
            (("Checking (+)", Asset), ("Savings (-)", Asset), "// Other Flows (Transfers, etc.)"),
        ];
        for (source, target, title) in cases {
            let out = single(source, target, 50.0);
            assert!(out.contains(title), "{} -> {} missing {title}", source.0, target.0);
            assert!(out.contains(&format!("{} [50.00] {}", source.0, target.0)));
        }
    }

    #[test]
    fn test_skips_dangling_links() {
        let d = diagram(vec![node(0, "All Funds", NodeType::Asset)], vec![link(0, 3, 10.0)]);
        let out = format_sankeymatic(&d, &no_url()).unwrap();
        assert!(!out.contains("[10.00]"));
    }

    #[test]
    fn test_custom_base_url_trailing_slash() {
        let opts = SankeymaticOptions { include_url: false, base_url: "http://localhost:8080/".to_string() };
        let out = format_sankeymatic(&full_chain(), &opts).unwrap();
        assert!(out.contains("// Paste this into http://localhost:8080/build/"));
    }

    #[cfg(feature = "url")]
    #[test]
    fn test_direct_link() {
        let out = format_sankeymatic(&full_chain(), &SankeymaticOptions::default()).unwrap();
        assert!(out.contains("// 🔗 Direct Link (click to open in SankeyMatic):"));
        assert!(out.contains("// https://sankeymatic.com/build/?i="));
        assert!(out.trim_end().lines().last().unwrap().starts_with("// https://"));
    }

    #[cfg(feature = "url")]
    #[test]
    fn test_url_payload_decompresses_to_flow_lines() {
        let url = sankeymatic_url("A [1.00] B\nB [1.00] C", "https://example.com/").unwrap();
        let payload = url.strip_prefix("https://example.com/build/?i=").unwrap();
        let text = lz_str::decompress_from_encoded_uri_component(payload)
            .and_then(|w| String::from_utf16(&w).ok())
            .unwrap();
        assert_eq!(text, "A [1.00] B\nB [1.00] C");
    }

    #[cfg(not(feature = "url"))]
    #[test]
    fn test_link_requires_feature() {
        assert!(format_sankeymatic(&full_chain(), &SankeymaticOptions::default()).is_err());
    }
}
