use std::collections::{HashMap, HashSet};

use crate::error::Result;
use crate::models::TransactionSplit;

use super::diagram::{node_lookup, renumber, NodeType, SankeyLink, SankeyNode};
use super::options::SankeyOptions;

fn listed(list: &[String], name: &str) -> bool {
    list.iter().any(|n| n == name)
}

/// Whether a split is dropped before graph construction.
pub fn should_exclude(split: &TransactionSplit, options: &SankeyOptions) -> bool {
    if listed(&options.exclude_accounts, &split.source_name)
        || listed(&options.exclude_accounts, &split.destination_name)
    {
        return true;
    }

    if let Some(category) = &split.category_name {
        if listed(&options.exclude_categories, category) {
            return true;
        }
    }

    if let Some(budget) = &split.budget_name {
        if listed(&options.exclude_budgets, budget) {
            return true;
        }
    }

    if !options.include_tags.is_empty()
        && !split.tags.iter().any(|t| listed(&options.include_tags, t))
    {
        return true;
    }

    split.tags.iter().any(|t| listed(&options.exclude_tags, t))
}

/// A split that survived exclusion and the per-split floor, with its parsed value.
#[derive(Debug, Clone, Copy)]
pub struct Qualified<'a> {
    pub split: &'a TransactionSplit,
    pub value: f64,
}

/// Splits that take part in a build, in input order.
///
/// Excluded splits are dropped before their amount is read, so a malformed
/// amount only fails the build when the split would otherwise be drawn.
pub fn qualifying<'a>(
    splits: &'a [TransactionSplit],
    options: &SankeyOptions,
) -> Result<Vec<Qualified<'a>>> {
    let mut out = Vec::with_capacity(splits.len());
    let mut excluded = 0usize;
    let mut below_floor = 0usize;
    for split in splits {
        if should_exclude(split, options) {
            excluded += 1;
            continue;
        }
        let value = split.value()?;
        if options.min_amount_transaction.is_some_and(|min| value < min) {
            below_floor += 1;
            continue;
        }
        out.push(Qualified { split, value });
    }
    tracing::debug!(
        "{} of {} splits qualify ({excluded} excluded, {below_floor} below floor)",
        out.len(),
        splits.len()
    );
    Ok(out)
}

/// Drop revenue and expense accounts whose total flow is below `min_amount`,
/// then drop orphaned nodes and renumber.
///
/// Revenue accounts are measured by outgoing value, expense accounts by incoming
/// value. Totals add raw values across currencies. Category, budget and asset
/// nodes are never removed directly.
pub fn filter_accounts_by_amount(
    nodes: Vec<SankeyNode>,
    links: Vec<SankeyLink>,
    min_amount: f64,
) -> (Vec<SankeyNode>, Vec<SankeyLink>) {
    let to_remove: HashSet<usize> = {
        let lookup = node_lookup(&nodes);
        let mut totals: HashMap<usize, f64> = HashMap::new();

        for link in &links {
            let (Some(source), Some(target)) = (lookup.get(&link.source), lookup.get(&link.target))
            else {
                continue;
            };
            if source.node_type == NodeType::Revenue {
                *totals.entry(link.source).or_default() += link.value;
            }
            if target.node_type == NodeType::Expense {
                *totals.entry(link.target).or_default() += link.value;
            }
        }

        totals
            .into_iter()
            .filter(|(_, total)| *total < min_amount)
            .map(|(id, _)| id)
            .collect()
    };

    let known: HashSet<usize> = nodes.iter().map(|n| n.id).collect();
    let before = links.len();
    let links: Vec<SankeyLink> = links
        .into_iter()
        .filter(|l| known.contains(&l.source) && known.contains(&l.target))
        .collect();
    if links.len() < before {
        tracing::warn!("threshold filter skipped {} dangling links", before - links.len());
    }

    let links: Vec<SankeyLink> = links
        .into_iter()
        .filter(|l| !to_remove.contains(&l.source) && !to_remove.contains(&l.target))
        .collect();

    let referenced: HashSet<usize> = links.iter().flat_map(|l| [l.source, l.target]).collect();
    tracing::debug!(
        "threshold filter removed {} accounts below {min_amount}",
        to_remove.len()
    );

    renumber(nodes, links, |n| referenced.contains(&n.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SplitType;

    fn split() -> TransactionSplit {
        TransactionSplit {
            split_type: SplitType::Withdrawal,
            date: None,
            amount: "100.00".to_string(),
            source_name: "Checking".to_string(),
            destination_name: "Store".to_string(),
            category_name: Some("Food".to_string()),
            budget_name: Some("Groceries".to_string()),
            tags: vec![],
            currency_code: "USD".to_string(),
        }
    }

    fn with_tags(tags: &[&str]) -> TransactionSplit {
        TransactionSplit {
            tags: tags.iter().map(|t| t.to_string()).collect(),
            ..split()
        }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn node(id: usize, name: &str, node_type: NodeType) -> SankeyNode {
        SankeyNode { id, name: name.to_string(), node_type }
    }

    fn link(source: usize, target: usize, value: f64) -> SankeyLink {
        SankeyLink { source, target, value, currency: "USD".to_string() }
    }

    #[test]
    fn test_no_options_keeps_split() {
        assert!(!should_exclude(&split(), &SankeyOptions::default()));
    }

    #[test]
    fn test_exclude_by_source_or_destination_account() {
        let mut opts = SankeyOptions::default();
        opts.exclude_accounts = names(&["Checking"]);
        assert!(should_exclude(&split(), &opts));
        opts.exclude_accounts = names(&["Store"]);
        assert!(should_exclude(&split(), &opts));
        opts.exclude_accounts = names(&["Savings"]);
        assert!(!should_exclude(&split(), &opts));
    }

    #[test]
    fn test_exclude_by_category_and_budget() {
        let mut opts = SankeyOptions::default();
        opts.exclude_categories = names(&["Food"]);
        assert!(should_exclude(&split(), &opts));

        let uncategorized = TransactionSplit { category_name: None, ..split() };
        assert!(!should_exclude(&uncategorized, &opts));

        let mut opts = SankeyOptions::default();
        opts.exclude_budgets = names(&["Groceries"]);
        assert!(should_exclude(&split(), &opts));
        let unbudgeted = TransactionSplit { budget_name: None, ..split() };
        assert!(!should_exclude(&unbudgeted, &opts));
    }

    #[test]
    fn test_include_tags() {
        let mut opts = SankeyOptions::default();
        opts.include_tags = names(&["vacation", "travel"]);
        assert!(!should_exclude(&with_tags(&["vacation", "beach"]), &opts));
        assert!(should_exclude(&with_tags(&["business"]), &opts));
        assert!(should_exclude(&with_tags(&[]), &opts));
    }

    #[test]
    fn test_exclude_tags() {
        let mut opts = SankeyOptions::default();
        opts.exclude_tags = names(&["internal", "reimbursement"]);
        assert!(should_exclude(&with_tags(&["internal", "transfer"]), &opts));
        assert!(!should_exclude(&with_tags(&["vacation"]), &opts));
        assert!(!should_exclude(&with_tags(&[]), &opts));
    }

    #[test]
    fn test_include_and_exclude_tags_combine() {
        let mut opts = SankeyOptions::default();
        opts.include_tags = names(&["business"]);
        opts.exclude_tags = names(&["reimbursed"]);
        assert!(!should_exclude(&with_tags(&["business", "travel"]), &opts));
        assert!(should_exclude(&with_tags(&["business", "reimbursed"]), &opts));
    }

    #[test]
    fn test_empty_tag_lists_are_inactive() {
        let opts = SankeyOptions::default();
        assert!(!should_exclude(&with_tags(&["some-tag"]), &opts));
    }

    #[test]
    fn test_qualifying_applies_exclusions_and_floor() {
        let splits = vec![
            TransactionSplit { amount: "5.00".to_string(), ..split() },
            TransactionSplit { amount: "-100.00".to_string(), ..split() },
            TransactionSplit { category_name: Some("Rent".to_string()), ..split() },
        ];
        let mut opts = SankeyOptions::default();
        opts.exclude_categories = names(&["Rent"]);
        opts.min_amount_transaction = Some(10.0);

        let q = qualifying(&splits, &opts).unwrap();
        assert_eq!(q.len(), 1);
        assert_eq!(q[0].value, 100.0);
    }

    #[test]
    fn test_qualifying_rejects_bad_amount_but_not_when_excluded() {
        let bad = TransactionSplit { amount: "twelve".to_string(), ..split() };
        let splits = vec![bad];
        let err = qualifying(&splits, &SankeyOptions::default()).unwrap_err();
        assert!(err.to_string().contains("twelve"));

        let mut opts = SankeyOptions::default();
        opts.exclude_accounts = names(&["Store"]);
        assert!(qualifying(&splits, &opts).unwrap().is_empty());
    }

    #[test]
    fn test_filter_removes_small_revenue_and_renumbers() {
        let nodes = vec![
            node(0, "Employer", NodeType::Revenue),
            node(1, "Side Gig", NodeType::Revenue),
            node(2, "All Funds", NodeType::Asset),
        ];
        let links = vec![link(0, 2, 200.0), link(1, 2, 50.0)];

        let (nodes, links) = filter_accounts_by_amount(nodes, links, 100.0);
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].name, "Employer");
        assert_eq!(nodes[1].name, "All Funds");
        assert_eq!((nodes[0].id, nodes[1].id), (0, 1));
        assert_eq!(links.len(), 1);
        assert_eq!((links[0].source, links[0].target), (0, 1));
        assert_eq!(links[0].value, 200.0);
    }

    #[test]
    fn test_filter_removes_small_expense() {
        let nodes = vec![
            node(0, "All Funds", NodeType::Asset),
            node(1, "Landlord", NodeType::Expense),
            node(2, "Kiosk", NodeType::Expense),
        ];
        let links = vec![link(0, 1, 900.0), link(0, 2, 4.5)];
        let (nodes, links) = filter_accounts_by_amount(nodes, links, 10.0);
        assert!(nodes.iter().all(|n| n.name != "Kiosk"));
        assert_eq!(links.len(), 1);
    }

    #[test]
    fn test_filter_sums_flows_and_keeps_non_accounts() {
        let nodes = vec![
            node(0, "All Funds", NodeType::Asset),
            node(1, "Tiny Budget", NodeType::Budget),
            node(2, "Tiny Category", NodeType::Category),
            node(3, "Store", NodeType::Expense),
        ];
        // Store receives 60 + 60 across two links, which clears the floor.
        let links = vec![link(0, 1, 1.0), link(1, 2, 1.0), link(2, 3, 60.0), link(0, 3, 60.0)];
        let (nodes, links) = filter_accounts_by_amount(nodes, links, 100.0);
        assert_eq!(nodes.len(), 4);
        assert_eq!(links.len(), 4);
    }

    #[test]
    fn test_filter_preserves_link_fields_and_currency_mix() {
        let nodes = vec![node(0, "Employer", NodeType::Revenue), node(1, "All Funds", NodeType::Asset)];
        let links = vec![
            link(0, 1, 60.0),
            SankeyLink { currency: "EUR".to_string(), ..link(0, 1, 60.0) },
        ];
        // 60 USD + 60 EUR are summed as raw numbers.
        let (nodes, links) = filter_accounts_by_amount(nodes, links, 100.0);
        assert_eq!(nodes.len(), 2);
        assert_eq!(links[1].currency, "EUR");
    }

    #[test]
    fn test_filter_skips_dangling_links() {
        let nodes = vec![node(0, "Employer", NodeType::Revenue), node(1, "All Funds", NodeType::Asset)];
        let links = vec![link(0, 1, 500.0), link(0, 9, 500.0)];
        let (nodes, links) = filter_accounts_by_amount(nodes, links, 100.0);
        assert_eq!(nodes.len(), 2);
        assert_eq!(links.len(), 1);
    }

    #[test]
    fn test_filter_empty() {
        let (nodes, links) = filter_accounts_by_amount(vec![], vec![], 100.0);
        assert!(nodes.is_empty());
        assert!(links.is_empty());
    }
}
