use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Revenue,
    Asset,
    Expense,
    Category,
    Budget,
}

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Revenue => "revenue",
            Self::Asset => "asset",
            Self::Expense => "expense",
            Self::Category => "category",
            Self::Budget => "budget",
        }
    }

    pub fn is_account(&self) -> bool {
        matches!(self, Self::Revenue | Self::Expense)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SankeyNode {
    pub id: usize,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SankeyLink {
    pub source: usize,
    pub target: usize,
    pub value: f64,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub start_date: String,
    pub end_date: String,
    pub generated_at: String,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SankeyDiagram {
    pub nodes: Vec<SankeyNode>,
    pub links: Vec<SankeyLink>,
    pub metadata: Metadata,
}

impl SankeyDiagram {
    /// Look up a node by id without assuming ids match positions.
    pub fn node(&self, id: usize) -> Option<&SankeyNode> {
        self.nodes
            .get(id)
            .filter(|n| n.id == id)
            .or_else(|| self.nodes.iter().find(|n| n.id == id))
    }

    /// Links paired with their endpoint nodes; links with a missing endpoint are skipped.
    pub fn resolved_links(&self) -> impl Iterator<Item = (&SankeyNode, &SankeyLink, &SankeyNode)> {
        self.links.iter().filter_map(move |link| {
            let source = self.node(link.source)?;
            let target = self.node(link.target)?;
            Some((source, link, target))
        })
    }
}

/// Round to 2 decimal places, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Descending by value. `sort_by` is stable, so equal values keep their order.
pub fn sort_links(links: &mut [SankeyLink]) {
    links.sort_by(|a, b| b.value.total_cmp(&a.value));
}

pub(crate) fn node_lookup(nodes: &[SankeyNode]) -> HashMap<usize, &SankeyNode> {
    nodes.iter().map(|n| (n.id, n)).collect()
}

/// Keep only `keep`-approved nodes, renumber them densely in their current
/// order, and remap link endpoints. Links whose endpoints did not survive are dropped.
pub(crate) fn renumber(
    nodes: Vec<SankeyNode>,
    links: Vec<SankeyLink>,
    keep: impl Fn(&SankeyNode) -> bool,
) -> (Vec<SankeyNode>, Vec<SankeyLink>) {
    let mut id_map = HashMap::new();
    let mut kept = Vec::with_capacity(nodes.len());
    for node in nodes.into_iter().filter(|n| keep(n)) {
        let new_id = kept.len();
        id_map.insert(node.id, new_id);
        kept.push(SankeyNode { id: new_id, ..node });
    }

    let links = links
        .into_iter()
        .filter_map(|link| {
            let source = *id_map.get(&link.source)?;
            let target = *id_map.get(&link.target)?;
            Some(SankeyLink { source, target, ..link })
        })
        .collect();

    (kept, links)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: usize, name: &str, node_type: NodeType) -> SankeyNode {
        SankeyNode { id, name: name.to_string(), node_type }
    }

    fn link(source: usize, target: usize, value: f64) -> SankeyLink {
        SankeyLink { source, target, value, currency: "USD".to_string() }
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(66.666), 66.67);
        assert_eq!(round2(33.333), 33.33);
        assert_eq!(round2(123.456), 123.46);
        assert_eq!(round2(100.0), 100.0);
        assert_eq!(round2(0.0), 0.0);
    }

    #[test]
    fn test_sort_links_is_stable() {
        let mut links = vec![link(0, 1, 10.0), link(1, 2, 50.0), link(2, 3, 10.0), link(3, 4, 50.0)];
        sort_links(&mut links);
        let order: Vec<_> = links.iter().map(|l| l.source).collect();
        assert_eq!(order, vec![1, 3, 0, 2]);
    }

    #[test]
    fn test_renumber_drops_and_remaps() {
        let nodes = vec![
            node(0, "A", NodeType::Revenue),
            node(1, "B", NodeType::Category),
            node(2, "C", NodeType::Asset),
        ];
        let links = vec![link(0, 1, 5.0), link(1, 2, 5.0)];
        let (nodes, links) = renumber(nodes, links, |n| n.name != "A");
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].name, "B");
        assert!(nodes.iter().enumerate().all(|(i, n)| n.id == i));
        assert_eq!(links.len(), 1);
        assert_eq!((links[0].source, links[0].target), (0, 1));
    }

    #[test]
    fn test_resolved_links_skips_dangling() {
        let diagram = SankeyDiagram {
            nodes: vec![node(0, "A", NodeType::Revenue), node(1, "B", NodeType::Asset)],
            links: vec![link(0, 1, 5.0), link(0, 7, 3.0)],
            metadata: Metadata {
                start_date: "2024-01-01".into(),
                end_date: "2024-01-31".into(),
                generated_at: "2024-01-31T12:00:00Z".into(),
                currency: "USD".into(),
            },
        };
        assert_eq!(diagram.resolved_links().count(), 1);
        assert!(diagram.node(7).is_none());
    }

    #[test]
    fn test_serialized_shape() {
        let n = node(3, "Food", NodeType::Category);
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["type"], "category");
        assert_eq!(json["id"], 3);

        let meta = Metadata {
            start_date: "a".into(),
            end_date: "b".into(),
            generated_at: "c".into(),
            currency: "EUR".into(),
        };
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["startDate"], "a");
        assert_eq!(json["generatedAt"], "c");
    }
}
