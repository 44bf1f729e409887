use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{FlowError, Result};
use crate::period::DateRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitType {
    Withdrawal,
    Deposit,
    Transfer,
}

/// One leg of an upstream transaction. Only the fields the diagram needs are
/// kept; everything else in the export is ignored on deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionSplit {
    #[serde(rename = "type")]
    pub split_type: SplitType,
    #[serde(default)]
    pub date: Option<String>,
    pub amount: String,
    pub source_name: String,
    pub destination_name: String,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub budget_name: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub currency_code: String,
}

impl TransactionSplit {
    /// Absolute value of the amount string.
    pub fn value(&self) -> Result<f64> {
        parse_amount(&self.amount).map(f64::abs)
    }

    /// Calendar date of the split, if it carries one we can read.
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        let raw = self.date.as_deref()?.trim();
        NaiveDate::parse_from_str(raw.get(..10)?, "%Y-%m-%d").ok()
    }

    /// Inclusive date-range check. Undated splits are always in range.
    pub fn within(&self, range: &DateRange) -> bool {
        self.calendar_date().map_or(true, |d| range.contains(d))
    }
}

pub fn parse_amount(raw: &str) -> Result<f64> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| FlowError::InvalidAmount(raw.to_string()))?;
    if !value.is_finite() {
        return Err(FlowError::InvalidAmount(raw.to_string()));
    }
    Ok(value)
}

// ---------------------------------------------------------------------------
// Upstream export shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct TransactionAttributes {
    pub transactions: Vec<TransactionSplit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Transaction {
    pub attributes: TransactionAttributes,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransactionListResponse {
    pub data: Vec<Transaction>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TransactionFile {
    Response(TransactionListResponse),
    Groups(Vec<Transaction>),
    Splits(Vec<TransactionSplit>),
}

impl TransactionFile {
    fn into_splits(self) -> Vec<TransactionSplit> {
        let groups = match self {
            Self::Splits(splits) => return splits,
            Self::Response(resp) => resp.data,
            Self::Groups(groups) => groups,
        };
        groups
            .into_iter()
            .flat_map(|t| t.attributes.transactions)
            .collect()
    }
}

pub fn parse_splits(json: &str) -> Result<Vec<TransactionSplit>> {
    let file: TransactionFile = serde_json::from_str(json).map_err(|e| {
        FlowError::Other(format!(
            "Unrecognized transaction file (expected a transaction list response, \
             an array of transactions, or an array of splits): {e}"
        ))
    })?;
    Ok(file.into_splits())
}

/// Load splits from a JSON file, or from stdin when `path` is `-`.
pub fn load_splits(path: &Path) -> Result<Vec<TransactionSplit>> {
    let content = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)?
    };
    let splits = parse_splits(&content)?;
    tracing::debug!("loaded {} splits from {}", splits.len(), path.display());
    Ok(splits)
}
