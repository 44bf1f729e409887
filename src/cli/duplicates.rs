use std::collections::BTreeSet;
use std::path::Path;

use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::sankey::{identify_duplicates, DuplicateNames};
use crate::settings::load_settings;

use super::{load_in_range, today, DateArgs, FilterArgs};

pub fn run(file: &Path, dates: &DateArgs, filters: &FilterArgs) -> Result<()> {
    let settings = load_settings();
    let range = dates.resolve(today())?;
    let options = filters.to_options(&range, &settings);
    let splits = load_in_range(file, &range)?;
    let names = identify_duplicates(&splits, &options)?;
    println!("{}", format_duplicates(&names));
    Ok(())
}

fn joined(names: &BTreeSet<String>) -> String {
    if names.is_empty() {
        "-".to_string()
    } else {
        names.iter().cloned().collect::<Vec<_>>().join(", ")
    }
}

pub fn format_duplicates(names: &DuplicateNames) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Kind", "Count", "Names"]);
    let rows = [
        ("Accounts (revenue + expense)", &names.accounts),
        ("Categories (income + expense)", &names.categories),
        ("Account conflicts", &names.account_conflicts),
        ("Category conflicts", &names.category_conflicts),
        ("Budget conflicts", &names.budget_conflicts),
    ];
    for (kind, set) in rows {
        table.add_row(vec![
            Cell::new(kind),
            Cell::new(set.len()),
            Cell::new(joined(set)),
        ]);
    }

    let footer = if names.has_conflicts() {
        "Names shared between accounts, categories and budgets are drawn as separate nodes."
            .yellow()
            .to_string()
    } else {
        "No cross-type conflicts.".green().to_string()
    };
    format!("Duplicate names\n{table}\n{footer}")
}
