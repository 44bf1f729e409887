use std::collections::BTreeSet;

use crate::error::Result;
use crate::models::{SplitType, TransactionSplit};

use super::filters::{qualifying, Qualified};
use super::options::SankeyOptions;

/// Placeholder category for splits without one. Always carries a polarity suffix.
pub const NO_CATEGORY: &str = "[NO CATEGORY]";
pub const NO_BUDGET: &str = "[NO BUDGET]";

/// Names reused across roles, discovered before the graph is built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DuplicateNames {
    /// Used both as a deposit source and a withdrawal destination.
    pub accounts: BTreeSet<String>,
    /// Used on both deposits and withdrawals.
    pub categories: BTreeSet<String>,
    /// Account names also used as a category or budget.
    pub account_conflicts: BTreeSet<String>,
    /// Category names also used as an account or budget.
    pub category_conflicts: BTreeSet<String>,
    /// Budget names also used as an account or category.
    pub budget_conflicts: BTreeSet<String>,
}

impl DuplicateNames {
    /// Collect role sets from qualifying splits. Transfers define no revenue or
    /// expense role and are skipped.
    pub fn from_splits<'a>(splits: impl IntoIterator<Item = &'a TransactionSplit>) -> Self {
        let mut revenue_accounts = BTreeSet::new();
        let mut expense_accounts = BTreeSet::new();
        let mut revenue_categories = BTreeSet::new();
        let mut expense_categories = BTreeSet::new();
        let mut budgets = BTreeSet::new();

        for split in splits {
            match split.split_type {
                SplitType::Deposit => {
                    revenue_accounts.insert(split.source_name.clone());
                    if let Some(c) = &split.category_name {
                        revenue_categories.insert(c.clone());
                    }
                }
                SplitType::Withdrawal => {
                    expense_accounts.insert(split.destination_name.clone());
                    if let Some(c) = &split.category_name {
                        expense_categories.insert(c.clone());
                    }
                    if let Some(b) = &split.budget_name {
                        budgets.insert(b.clone());
                    }
                }
                SplitType::Transfer => {}
            }
        }

        let accounts: BTreeSet<String> =
            revenue_accounts.intersection(&expense_accounts).cloned().collect();
        let categories: BTreeSet<String> =
            revenue_categories.intersection(&expense_categories).cloned().collect();

        let all_accounts: BTreeSet<String> =
            revenue_accounts.union(&expense_accounts).cloned().collect();
        let all_categories: BTreeSet<String> =
            revenue_categories.union(&expense_categories).cloned().collect();

        let account_conflicts = all_accounts
            .iter()
            .filter(|n| budgets.contains(*n) || all_categories.contains(*n))
            .cloned()
            .collect();
        let category_conflicts = all_categories
            .iter()
            .filter(|n| all_accounts.contains(*n) || budgets.contains(*n))
            .cloned()
            .collect();
        let budget_conflicts = budgets
            .iter()
            .filter(|n| all_accounts.contains(*n) || all_categories.contains(*n))
            .cloned()
            .collect();

        let names = Self {
            accounts,
            categories,
            account_conflicts,
            category_conflicts,
            budget_conflicts,
        };
        tracing::debug!(
            "duplicates: {} accounts, {} categories; conflicts: {} accounts, {} categories, {} budgets",
            names.accounts.len(),
            names.categories.len(),
            names.account_conflicts.len(),
            names.category_conflicts.len(),
            names.budget_conflicts.len()
        );
        names
    }

    pub(crate) fn from_qualified(splits: &[Qualified<'_>]) -> Self {
        Self::from_splits(splits.iter().map(|q| q.split))
    }

    pub fn is_duplicate_account(&self, name: &str) -> bool {
        self.accounts.contains(name)
    }

    /// The no-category placeholder always counts as a duplicate.
    pub fn is_duplicate_category(&self, name: &str) -> bool {
        name == NO_CATEGORY || self.categories.contains(name)
    }

    pub fn has_conflicts(&self) -> bool {
        !(self.account_conflicts.is_empty()
            && self.category_conflicts.is_empty()
            && self.budget_conflicts.is_empty())
    }
}

/// Resolve duplicates over the same split set a build with `options` would draw.
pub fn identify_duplicates(
    splits: &[TransactionSplit],
    options: &SankeyOptions,
) -> Result<DuplicateNames> {
    let qualified = qualifying(splits, options)?;
    Ok(DuplicateNames::from_qualified(&qualified))
}

/// Most frequent currency code by split count; the first one seen wins ties.
/// Falls back to USD for an empty list.
pub fn most_common_currency(splits: &[TransactionSplit]) -> String {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for split in splits {
        match counts.iter().position(|(code, _)| *code == split.currency_code) {
            Some(i) => counts[i].1 += 1,
            None => counts.push((split.currency_code.as_str(), 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (code, n) in counts {
        if best.map_or(true, |(_, max)| n > max) {
            best = Some((code, n));
        }
    }
    best.map_or_else(|| "USD".to_string(), |(code, _)| code.to_string())
}
