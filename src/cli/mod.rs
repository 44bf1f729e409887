pub mod config;
pub mod duplicates;
pub mod generate;

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use clap::{ArgAction, Args, Parser, Subcommand};
use colored::Colorize;

use crate::error::Result;
use crate::models::{load_splits, TransactionSplit};
use crate::period::{current_month, parse_period, DateRange};
use crate::sankey::formatters::OutputFormat;
use crate::sankey::SankeyOptions;
use crate::settings::Settings;

#[derive(Parser)]
#[command(
    name = "fireflow",
    version,
    about = "Sankey flow diagrams from Firefly III transaction exports."
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build a Sankey diagram from a transaction export.
    Generate(GenerateArgs),
    /// List names reused across roles that get (+)/(-) suffixes or conflict.
    Duplicates {
        /// Transaction export (JSON), or - for stdin
        file: PathBuf,
        #[command(flatten)]
        dates: DateArgs,
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Show or create the settings file.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective settings.
    Show,
    /// Write a settings file with defaults.
    Init {
        /// Overwrite an existing settings file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args)]
pub struct GenerateArgs {
    /// Transaction export (JSON), or - for stdin
    pub file: PathBuf,
    #[command(flatten)]
    pub dates: DateArgs,
    #[command(flatten)]
    pub filters: FilterArgs,
    /// Output format (default from settings, else readable)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,
    /// Write to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Omit the SankeyMatic direct link
    #[arg(long = "no-url")]
    pub no_url: bool,
    /// SankeyMatic base URL, for self-hosted instances
    #[arg(long = "sankeymatic-url")]
    pub sankeymatic_url: Option<String>,
}

#[derive(Args)]
pub struct DateArgs {
    /// Period: YYYY, YYYY-MM, YYYY-QN or YYYY-MM-DD
    #[arg(short, long, conflicts_with_all = ["start", "end"])]
    pub period: Option<String>,
    /// Start date: YYYY-MM-DD (default: first day of this month)
    #[arg(short, long)]
    pub start: Option<String>,
    /// End date: YYYY-MM-DD (default: last day of this month)
    #[arg(short, long)]
    pub end: Option<String>,
}

impl DateArgs {
    pub fn resolve(&self, today: NaiveDate) -> Result<DateRange> {
        if let Some(period) = &self.period {
            return parse_period(period);
        }
        let month = current_month(today)?;
        let start = self.start.clone().unwrap_or_else(|| month.start.to_string());
        let end = self.end.clone().unwrap_or_else(|| month.end.to_string());
        DateRange::from_strs(&start, &end)
    }
}

#[derive(Args, Default)]
pub struct FilterArgs {
    /// Show individual revenue and expense accounts
    #[arg(long = "with-accounts")]
    pub with_accounts: bool,
    /// Break "All Funds" into asset accounts and draw transfers
    #[arg(long = "with-assets")]
    pub with_assets: bool,
    /// Leave categories out of the chain
    #[arg(long = "no-categories")]
    pub no_categories: bool,
    /// Leave budgets out of the chain
    #[arg(long = "no-budgets")]
    pub no_budgets: bool,
    /// Comma-separated account names to leave out
    #[arg(long = "exclude-accounts", value_delimiter = ',')]
    pub exclude_accounts: Vec<String>,
    #[arg(long = "exclude-categories", value_delimiter = ',')]
    pub exclude_categories: Vec<String>,
    #[arg(long = "exclude-budgets", value_delimiter = ',')]
    pub exclude_budgets: Vec<String>,
    /// Only splits carrying at least one of these tags
    #[arg(long = "include-tags", value_delimiter = ',')]
    pub include_tags: Vec<String>,
    #[arg(long = "exclude-tags", value_delimiter = ',')]
    pub exclude_tags: Vec<String>,
    /// Ignore splits smaller than this
    #[arg(long = "min-amount-transaction")]
    pub min_amount_transaction: Option<f64>,
    /// Drop revenue/expense accounts whose total is below this
    #[arg(long = "min-amount-account")]
    pub min_amount_account: Option<f64>,
    /// Fold accounts below this into [OTHER ACCOUNTS]
    #[arg(long = "min-account-grouping")]
    pub min_account_grouping: Option<f64>,
    /// Fold categories below this into [OTHER CATEGORIES]
    #[arg(long = "min-category-grouping")]
    pub min_category_grouping: Option<f64>,
}

fn merged(from_settings: &[String], from_cli: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for name in from_settings.iter().chain(from_cli) {
        let name = name.trim();
        if !name.is_empty() && !out.iter().any(|n| n == name) {
            out.push(name.to_string());
        }
    }
    out
}

impl FilterArgs {
    /// Engine options for `range`, with exclusion lists from settings merged in.
    pub fn to_options(&self, range: &DateRange, settings: &Settings) -> SankeyOptions {
        SankeyOptions {
            start_date: range.start.to_string(),
            end_date: range.end.to_string(),
            with_accounts: self.with_accounts,
            with_assets: self.with_assets,
            include_categories: !self.no_categories,
            include_budgets: !self.no_budgets,
            exclude_accounts: merged(&settings.exclude_accounts, &self.exclude_accounts),
            exclude_categories: merged(&settings.exclude_categories, &self.exclude_categories),
            exclude_budgets: merged(&settings.exclude_budgets, &self.exclude_budgets),
            include_tags: merged(&[], &self.include_tags),
            exclude_tags: merged(&settings.exclude_tags, &self.exclude_tags),
            min_amount_transaction: self.min_amount_transaction,
            min_amount_account: self.min_amount_account,
            min_account_grouping_amount: self.min_account_grouping,
            min_category_grouping_amount: self.min_category_grouping,
        }
    }
}

pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Load splits from `file` and keep those dated inside `range`.
pub(crate) fn load_in_range(file: &Path, range: &DateRange) -> Result<Vec<TransactionSplit>> {
    let mut splits = load_splits(file)?;
    let total = splits.len();
    splits.retain(|s| s.within(range));
    eprintln!(
        "{} Loaded {} splits ({} in {range})",
        "✓".green(),
        total,
        splits.len()
    );
    Ok(splits)
}
