use std::collections::HashMap;

use crate::models::{SplitType, TransactionSplit};

use super::diagram::{round2, sort_links, NodeType, SankeyLink, SankeyNode};
use super::duplicates::{DuplicateNames, NO_BUDGET, NO_CATEGORY};
use super::filters::Qualified;
use super::options::SankeyOptions;

pub const ALL_FUNDS: &str = "All Funds";

/// A position in the chain of nodes a split's value passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// "All Funds", or the split's own asset account in per-asset mode.
    Funds,
    Budget,
    Category,
    /// The revenue (deposit) or expense (withdrawal) account.
    Account,
}

/// Chain for a withdrawal, keyed by (budget, category, account) visibility.
pub fn withdrawal_chain(budget: bool, category: bool, account: bool) -> &'static [Stage] {
    use Stage::*;
    match (budget, category, account) {
        (true, true, true) => &[Funds, Budget, Category, Account],
        (true, true, false) => &[Funds, Budget, Category],
        (true, false, true) => &[Funds, Budget, Account],
        (false, true, true) => &[Funds, Category, Account],
        (false, true, false) => &[Funds, Category],
        (true, false, false) => &[Funds, Budget],
        // A flow cannot end on the funds node.
        (false, false, _) => &[Funds, Account],
    }
}

/// Chain for a deposit, keyed by (category, account) visibility.
pub fn deposit_chain(category: bool, account: bool) -> &'static [Stage] {
    use Stage::*;
    match (category, account) {
        (true, true) => &[Account, Category, Funds],
        (true, false) => &[Category, Funds],
        // Without a category the account anchors the flow.
        (false, _) => &[Account, Funds],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Polarity {
    /// Money arriving: deposits, and the receiving side of transfers.
    In,
    /// Money leaving: withdrawals, and the sending side of transfers.
    Out,
}

impl Polarity {
    fn suffixed(self, name: &str) -> String {
        match self {
            Self::In => format!("{name} (+)"),
            Self::Out => format!("{name} (-)"),
        }
    }
}

#[derive(Debug)]
struct Flow {
    source: usize,
    target: usize,
    currency: String,
    value: f64,
}

/// Accumulates nodes and flows for one build. Not shared between builds.
pub struct FlowGraphBuilder<'a> {
    options: &'a SankeyOptions,
    duplicates: &'a DuplicateNames,
    nodes: Vec<SankeyNode>,
    node_ids: HashMap<(NodeType, String), usize>,
    flows: Vec<Flow>,
    flow_ids: HashMap<(usize, usize, String), usize>,
    skipped_transfers: usize,
}

impl<'a> FlowGraphBuilder<'a> {
    pub fn new(options: &'a SankeyOptions, duplicates: &'a DuplicateNames) -> Self {
        Self {
            options,
            duplicates,
            nodes: Vec::new(),
            node_ids: HashMap::new(),
            flows: Vec::new(),
            flow_ids: HashMap::new(),
            skipped_transfers: 0,
        }
    }

    pub fn add(&mut self, q: &Qualified<'_>) {
        let split = q.split;
        let path = match split.split_type {
            SplitType::Withdrawal => self.withdrawal_path(split),
            SplitType::Deposit => self.deposit_path(split),
            SplitType::Transfer if self.options.with_assets => vec![
                self.node(NodeType::Asset, Polarity::In.suffixed(&split.source_name)),
                self.node(NodeType::Asset, Polarity::Out.suffixed(&split.destination_name)),
            ],
            SplitType::Transfer => {
                self.skipped_transfers += 1;
                return;
            }
        };

        for pair in path.windows(2) {
            self.add_flow(pair[0], pair[1], &split.currency_code, q.value);
        }
    }

    /// Emit nodes and rounded links, largest first.
    pub fn finish(self) -> (Vec<SankeyNode>, Vec<SankeyLink>) {
        if self.skipped_transfers > 0 {
            tracing::debug!(
                "skipped {} transfers (per-asset breakdown disabled)",
                self.skipped_transfers
            );
        }
        let mut links: Vec<SankeyLink> = self
            .flows
            .into_iter()
            .map(|f| SankeyLink {
                source: f.source,
                target: f.target,
                value: round2(f.value),
                currency: f.currency,
            })
            .collect();
        sort_links(&mut links);
        (self.nodes, links)
    }

    fn withdrawal_path(&mut self, split: &TransactionSplit) -> Vec<usize> {
        let chain = withdrawal_chain(
            self.options.include_budgets,
            self.options.include_categories,
            self.options.with_accounts,
        );
        chain
            .iter()
            .map(|stage| match stage {
                Stage::Funds => self.funds_node(&split.source_name, Polarity::Out),
                Stage::Budget => {
                    let name = split.budget_name.as_deref().unwrap_or(NO_BUDGET).to_string();
                    self.node(NodeType::Budget, name)
                }
                Stage::Category => {
                    let name = self.category_name(split, Polarity::Out);
                    self.node(NodeType::Category, name)
                }
                Stage::Account => {
                    let name = self.account_name(&split.destination_name, Polarity::Out);
                    self.node(NodeType::Expense, name)
                }
            })
            .collect()
    }

    fn deposit_path(&mut self, split: &TransactionSplit) -> Vec<usize> {
        let chain = deposit_chain(self.options.include_categories, self.options.with_accounts);
        // Budgets only apply to spending.
        chain
            .iter()
            .filter_map(|stage| match stage {
                Stage::Funds => Some(self.funds_node(&split.destination_name, Polarity::In)),
                Stage::Category => {
                    let name = self.category_name(split, Polarity::In);
                    Some(self.node(NodeType::Category, name))
                }
                Stage::Account => {
                    let name = self.account_name(&split.source_name, Polarity::In);
                    Some(self.node(NodeType::Revenue, name))
                }
                Stage::Budget => None,
            })
            .collect()
    }

    fn funds_node(&mut self, asset_account: &str, polarity: Polarity) -> usize {
        if self.options.with_assets {
            self.node(NodeType::Asset, polarity.suffixed(asset_account))
        } else {
            self.node(NodeType::Asset, ALL_FUNDS.to_string())
        }
    }

    fn category_name(&self, split: &TransactionSplit, polarity: Polarity) -> String {
        let name = split.category_name.as_deref().unwrap_or(NO_CATEGORY);
        if self.duplicates.is_duplicate_category(name) {
            polarity.suffixed(name)
        } else {
            name.to_string()
        }
    }

    fn account_name(&self, name: &str, polarity: Polarity) -> String {
        if self.duplicates.is_duplicate_account(name) {
            polarity.suffixed(name)
        } else {
            name.to_string()
        }
    }

    fn node(&mut self, node_type: NodeType, name: String) -> usize {
        let key = (node_type, name);
        if let Some(&id) = self.node_ids.get(&key) {
            return id;
        }
        let id = self.nodes.len();
        self.nodes.push(SankeyNode {
            id,
            name: key.1.clone(),
            node_type,
        });
        self.node_ids.insert(key, id);
        id
    }

    fn add_flow(&mut self, source: usize, target: usize, currency: &str, value: f64) {
        let key = (source, target, currency.to_string());
        if let Some(&i) = self.flow_ids.get(&key) {
            self.flows[i].value += value;
            return;
        }
        self.flow_ids.insert(key, self.flows.len());
        self.flows.push(Flow {
            source,
            target,
            currency: currency.to_string(),
            value,
        });
    }
}
