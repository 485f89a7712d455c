use crate::commands::{load_config, yt_dlp_client};
use crate::core::channel_search;
use crate::ui::{self, table::Align, Table};
use anyhow::{Context, Result};
use std::path::Path;
use std::process::ExitCode;

pub fn execute(matches: &clap::ArgMatches, config_path: &Path) -> Result<ExitCode> {
    let term = matches
        .get_many::<String>("term")
        .context("Search term is required")?
        .cloned()
        .collect::<Vec<_>>()
        .join(" ");
    let limit = *matches
        .get_one::<usize>("limit")
        .context("Limit argument is required")?;

    let config = load_config(config_path)?;
    let yt_dlp = yt_dlp_client(&config)?;

    ui::info("Searching..");
    let results = channel_search(&yt_dlp, &term, limit)
        .with_context(|| format!("Channel search for '{}' failed", term))?;

    if results.is_empty() {
        ui::warn(&format!("No channels found for '{}'", term));
        return Ok(ExitCode::SUCCESS);
    }

    let mut table = Table::new()
        .column("Channel", Align::Left)
        .column("URL", Align::Left)
        .dim_column("ID");
    for result in results {
        table.add_row([result.name, result.url, result.id]);
    }
    table.print();

    Ok(ExitCode::SUCCESS)
}
