use std::collections::{HashMap, HashSet};

use super::diagram::{node_lookup, renumber, round2, sort_links, NodeType, SankeyLink, SankeyNode};
use super::options::active_threshold;

pub const OTHER_ACCOUNTS_IN: &str = "[OTHER ACCOUNTS] (+)";
pub const OTHER_ACCOUNTS_OUT: &str = "[OTHER ACCOUNTS] (-)";
pub const OTHER_CATEGORIES_IN: &str = "[OTHER CATEGORIES] (+)";
pub const OTHER_CATEGORIES_OUT: &str = "[OTHER CATEGORIES] (-)";

const OTHER_NODES: [(&str, NodeType); 4] = [
    (OTHER_ACCOUNTS_IN, NodeType::Revenue),
    (OTHER_ACCOUNTS_OUT, NodeType::Expense),
    (OTHER_CATEGORIES_IN, NodeType::Category),
    (OTHER_CATEGORIES_OUT, NodeType::Category),
];

/// Index into `OTHER_NODES` that a grouped node folds into.
fn other_slot(node: &SankeyNode) -> Option<usize> {
    match node.node_type {
        NodeType::Revenue => Some(0),
        NodeType::Expense => Some(1),
        NodeType::Category if node.name.ends_with("(+)") => Some(2),
        NodeType::Category => Some(3),
        NodeType::Asset | NodeType::Budget => None,
    }
}

/// Total flow per account and category node. Revenue accounts count outgoing
/// value, expense accounts incoming, categories both directions. Currencies are
/// summed as raw numbers.
fn node_totals(nodes: &[SankeyNode], links: &[SankeyLink]) -> HashMap<usize, f64> {
    let lookup = node_lookup(nodes);
    let mut totals: HashMap<usize, f64> = HashMap::new();
    for link in links {
        let (Some(source), Some(target)) = (lookup.get(&link.source), lookup.get(&link.target)) else {
            continue;
        };
        if matches!(source.node_type, NodeType::Revenue | NodeType::Category) {
            *totals.entry(link.source).or_default() += link.value;
        }
        if matches!(target.node_type, NodeType::Expense | NodeType::Category) {
            *totals.entry(link.target).or_default() += link.value;
        }
    }
    totals
}

/// Fold accounts and categories below their thresholds into `[OTHER ...]`
/// nodes, re-aggregating the affected links.
///
/// When nothing falls below a threshold the nodes keep their order and are
/// only renumbered densely, dropping dangling links.
pub fn group_small_nodes(
    nodes: Vec<SankeyNode>,
    links: Vec<SankeyLink>,
    min_account_amount: Option<f64>,
    min_category_amount: Option<f64>,
) -> (Vec<SankeyNode>, Vec<SankeyLink>) {
    let min_account = active_threshold(min_account_amount);
    let min_category = active_threshold(min_category_amount);

    let to_group: HashSet<usize> = {
        let lookup = node_lookup(&nodes);
        node_totals(&nodes, &links)
            .into_iter()
            .filter(|(id, total)| {
                let Some(node) = lookup.get(id) else {
                    return false;
                };
                let floor = if node.node_type.is_account() {
                    min_account
                } else if node.node_type == NodeType::Category {
                    min_category
                } else {
                    None
                };
                floor.is_some_and(|min| *total < min)
            })
            .map(|(id, _)| id)
            .collect()
    };

    if to_group.is_empty() {
        let before = links.len();
        let (nodes, links) = renumber(nodes, links, |_| true);
        if links.len() < before {
            tracing::warn!("grouping skipped {} dangling links", before - links.len());
        }
        return (nodes, links);
    }

    // The synthetic nodes take ids 0..4 up front; unused ones are dropped below.
    let mut grouped: Vec<SankeyNode> = OTHER_NODES
        .iter()
        .enumerate()
        .map(|(id, (name, node_type))| SankeyNode {
            id,
            name: name.to_string(),
            node_type: *node_type,
        })
        .collect();
    let mut used = [false; OTHER_NODES.len()];
    let mut id_map: HashMap<usize, usize> = HashMap::new();

    for node in nodes {
        let slot = if to_group.contains(&node.id) { other_slot(&node) } else { None };
        match slot {
            Some(slot) => {
                id_map.insert(node.id, slot);
                used[slot] = true;
            }
            None => {
                let new_id = grouped.len();
                id_map.insert(node.id, new_id);
                grouped.push(SankeyNode { id: new_id, ..node });
            }
        }
    }

    let mut order: Vec<(usize, usize, String)> = Vec::new();
    let mut sums: HashMap<(usize, usize, String), f64> = HashMap::new();
    let mut dangling = 0usize;
    for link in links {
        let (Some(&source), Some(&target)) = (id_map.get(&link.source), id_map.get(&link.target))
        else {
            dangling += 1;
            continue;
        };
        let key = (source, target, link.currency);
        match sums.get_mut(&key) {
            Some(sum) => *sum += link.value,
            None => {
                sums.insert(key.clone(), link.value);
                order.push(key);
            }
        }
    }
    if dangling > 0 {
        tracing::warn!("grouping skipped {dangling} dangling links");
    }

    let aggregated: Vec<SankeyLink> = order
        .into_iter()
        .map(|key| {
            let value = sums.get(&key).copied().unwrap_or_default();
            let (source, target, currency) = key;
            SankeyLink {
                source,
                target,
                value: round2(value),
                currency,
            }
        })
        .collect();

    tracing::debug!(
        "grouped {} nodes into {} [OTHER] nodes",
        to_group.len(),
        used.iter().filter(|u| **u).count()
    );

    let (nodes, mut links) = renumber(grouped, aggregated, |n| {
        n.id >= OTHER_NODES.len() || used[n.id]
    });
    sort_links(&mut links);
    (nodes, links)
}
