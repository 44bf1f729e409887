use colored::Colorize;

use crate::error::Result;
use crate::sankey::formatters::{render, SankeymaticOptions};
use crate::sankey::generate;
use crate::settings::load_settings;

use super::{load_in_range, today, GenerateArgs};

pub fn run(args: GenerateArgs) -> Result<()> {
    let settings = load_settings();
    let range = args.dates.resolve(today())?;
    let options = args.filters.to_options(&range, &settings);
    tracing::debug!(?options, "resolved options");

    let splits = load_in_range(&args.file, &range)?;
    let diagram = generate(&splits, &options)?;
    eprintln!(
        "{} Built {} nodes and {} flows",
        "✓".green(),
        diagram.nodes.len(),
        diagram.links.len()
    );

    let format = args.format.unwrap_or(settings.format);
    let sankeymatic = SankeymaticOptions {
        include_url: !args.no_url,
        base_url: args.sankeymatic_url.unwrap_or(settings.sankeymatic_url),
    };
    let rendered = render(&diagram, format, &sankeymatic)?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, &rendered)?;
            eprintln!("{} Wrote {}", "✓".green(), path.display());
        }
        None => print!("{rendered}"),
    }
    Ok(())
}
