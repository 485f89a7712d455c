use crate::commands::load_config;
use crate::core::{validation, FilenameScanner};
use crate::ui::{format_downloads, format_size, table::Align, Table};
use anyhow::Result;
use colored::Colorize;
use std::collections::BTreeSet;
use std::path::Path;
use std::process::ExitCode;

pub fn execute(config_path: &Path) -> Result<ExitCode> {
    let config = load_config(config_path)?;
    let root = config.output_root();
    let scanner = FilenameScanner::new();

    if config.channels().is_empty() {
        println!(
            "{}",
            "No channels tracked. Use 'yt-archiver add --id <ID> --name <NAME>' to add one.".yellow()
        );
        return Ok(ExitCode::SUCCESS);
    }

    let mut table = Table::new()
        .column("Channel", Align::Left)
        .column("Downloads", Align::Right)
        .column("Size", Align::Right);

    for channel in config.channels() {
        if let Err(e) = validation::validate_channel_name(&channel.name) {
            log::warn!("Not scanning channel '{}': {}", channel.id, e);
            table.add_row([channel.name.clone(), "-".to_string(), "-".to_string()]);
            continue;
        }

        let videos = match scanner.scan_files(&root, &channel.name) {
            Ok(videos) => videos,
            Err(e) => {
                log::debug!("Cannot list {:?}: {}", channel.directory(&root), e);
                Vec::new()
            }
        };

        let count = videos.iter().map(|v| &v.id).collect::<BTreeSet<_>>().len();
        let size: u64 = videos.iter().map(|v| v.size).sum();

        table.add_row([
            channel.name.clone(),
            format_downloads(count, channel.keep),
            format_size(size),
        ]);
    }

    table.print();
    Ok(ExitCode::SUCCESS)
}
