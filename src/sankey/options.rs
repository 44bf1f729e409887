use serde::{Deserialize, Serialize};

/// Fully resolved settings for one diagram build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SankeyOptions {
    pub start_date: String,
    pub end_date: String,
    /// Show individual revenue/expense accounts as start/end nodes.
    pub with_accounts: bool,
    /// Split "All Funds" into per-account asset nodes and draw transfers.
    pub with_assets: bool,
    pub include_categories: bool,
    pub include_budgets: bool,
    pub exclude_accounts: Vec<String>,
    pub exclude_categories: Vec<String>,
    pub exclude_budgets: Vec<String>,
    pub include_tags: Vec<String>,
    pub exclude_tags: Vec<String>,
    /// Per-split floor; smaller splits are ignored entirely.
    pub min_amount_transaction: Option<f64>,
    /// Per-account floor for the threshold filter.
    pub min_amount_account: Option<f64>,
    pub min_account_grouping_amount: Option<f64>,
    pub min_category_grouping_amount: Option<f64>,
}

impl Default for SankeyOptions {
    fn default() -> Self {
        Self {
            start_date: String::new(),
            end_date: String::new(),
            with_accounts: false,
            with_assets: false,
            include_categories: true,
            include_budgets: true,
            exclude_accounts: Vec::new(),
            exclude_categories: Vec::new(),
            exclude_budgets: Vec::new(),
            include_tags: Vec::new(),
            exclude_tags: Vec::new(),
            min_amount_transaction: None,
            min_amount_account: None,
            min_account_grouping_amount: None,
            min_category_grouping_amount: None,
        }
    }
}

impl SankeyOptions {
    pub fn for_period(start_date: impl Into<String>, end_date: impl Into<String>) -> Self {
        Self {
            start_date: start_date.into(),
            end_date: end_date.into(),
            ..Self::default()
        }
    }
}

/// A threshold counts only when it is set and positive.
pub(crate) fn active_threshold(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v > 0.0)
}
