pub mod builder;
pub mod diagram;
pub mod duplicates;
pub mod filters;
pub mod formatters;
pub mod groups;
pub mod options;

use chrono::{SecondsFormat, Utc};

use crate::error::Result;
use crate::models::TransactionSplit;

pub use builder::FlowGraphBuilder;
pub use diagram::{Metadata, SankeyDiagram};
pub use duplicates::{identify_duplicates, most_common_currency, DuplicateNames};
pub use filters::{filter_accounts_by_amount, qualifying};
pub use groups::group_small_nodes;
pub use options::SankeyOptions;

use options::active_threshold;

/// Build a diagram from splits in input order.
///
/// Runs exclusion, duplicate resolution, graph construction, small-node
/// grouping and the account threshold filter. Each post-pass only runs when
/// its threshold is positive.
pub fn generate(splits: &[TransactionSplit], options: &SankeyOptions) -> Result<SankeyDiagram> {
    let qualified = qualifying(splits, options)?;
    let duplicates = DuplicateNames::from_qualified(&qualified);

    let mut builder = FlowGraphBuilder::new(options, &duplicates);
    for q in &qualified {
        builder.add(q);
    }
    let (mut nodes, mut links) = builder.finish();
    tracing::debug!("built {} nodes and {} links", nodes.len(), links.len());

    if active_threshold(options.min_account_grouping_amount).is_some()
        || active_threshold(options.min_category_grouping_amount).is_some()
    {
        (nodes, links) = group_small_nodes(
            nodes,
            links,
            options.min_account_grouping_amount,
            options.min_category_grouping_amount,
        );
    }

    if let Some(min) = active_threshold(options.min_amount_account) {
        (nodes, links) = filter_accounts_by_amount(nodes, links, min);
    }

    Ok(SankeyDiagram {
        nodes,
        links,
        metadata: Metadata {
            start_date: options.start_date.clone(),
            end_date: options.end_date.clone(),
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            currency: most_common_currency(splits),
        },
    })
}
