use crate::commands::{load_config, yt_dlp_client};
use crate::core::{
    ChannelOutcome, ChannelReport, CommandDownloader, FilenameScanner, SyncDriver, SyncEvent,
    SyncOptions, SyncReport,
};
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;
use std::process::ExitCode;
use std::sync::atomic::Ordering;

pub fn execute(matches: &clap::ArgMatches, config_path: &Path) -> Result<ExitCode> {
    let config = load_config(config_path)?;

    let mut options = SyncOptions::from(&config.sync);
    options.dry_run = matches.get_flag("dry-run");
    if let Some(jobs) = matches.get_one::<usize>("jobs") {
        options.jobs = (*jobs).max(1);
    }

    if config.channels().is_empty() {
        println!("{}", "No channels to sync.".yellow());
        return Ok(ExitCode::SUCCESS);
    }

    let yt_dlp = yt_dlp_client(&config)?;
    let downloader =
        CommandDownloader::from_config(&config).with_yt_dlp(Some(yt_dlp.path().to_path_buf()));

    if options.dry_run {
        println!(
            "{}",
            "DRY RUN MODE - Nothing will be downloaded or deleted"
                .yellow()
                .bold()
        );
        println!();
    }

    let driver = SyncDriver::new(
        &config.output_root(),
        Box::new(yt_dlp),
        Box::new(downloader),
        Box::new(FilenameScanner::new()),
    )
    .with_options(options)
    .with_observer(print_event);

    let cancel_flag = driver.cancel_flag();
    ctrlc::set_handler(move || {
        println!();
        println!("{}", "Cancellation requested...".yellow().bold());
        println!(
            "{}",
            "Finishing the current operation, then stopping.".dimmed()
        );
        cancel_flag.store(true, Ordering::Relaxed);
    })
    .context("Failed to set Ctrl+C handler")?;

    let report = driver.sync_all(config.channels());
    print_summary(&report);

    Ok(ExitCode::SUCCESS)
}

fn print_event(event: &SyncEvent<'_>) {
    match event {
        SyncEvent::ChannelStarted(channel) => {
            println!("{} {}", "Syncing channel:".cyan(), channel.name.cyan().bold());
        }
        SyncEvent::Fetching(channel, video_id) => {
            println!("  {} {} {}", "↓".green(), video_id, format!("({})", channel.name).dimmed());
        }
        SyncEvent::Purging(channel, video_id) => {
            println!("  {} {} {}", "✗".red(), video_id, format!("({})", channel.name).dimmed());
        }
        SyncEvent::ChannelFinished(report) => print_channel(report),
    }
}

fn print_channel(report: &ChannelReport) {
    let name = &report.channel.name;
    match &report.outcome {
        ChannelOutcome::LookupFailed(reason) | ChannelOutcome::Rejected(reason) => {
            println!("  {} {}", "Skipped:".red().bold(), reason.red());
        }
        ChannelOutcome::Planned => {
            let plan = &report.plan;
            for id in &plan.to_fetch {
                println!("  {} {}", "would fetch".green(), id);
            }
            if report.purge_withheld {
                println!(
                    "  {}",
                    "remote window empty, purge withheld".yellow()
                );
            } else {
                for id in &plan.to_purge {
                    println!("  {} {}", "would purge".red(), id);
                }
            }
        }
        ChannelOutcome::Synced | ChannelOutcome::Cancelled => {
            if report.plan.is_empty() {
                println!("  {}", format!("{} is up to date", name).dimmed());
            }
            if !report.fetch_failed.is_empty() {
                println!(
                    "  {} {}",
                    "Failed downloads:".yellow(),
                    join(&report.fetch_failed)
                );
            }
            if !report.purge_failed.is_empty() {
                println!(
                    "  {} {}",
                    "Incomplete deletions:".yellow(),
                    join(&report.purge_failed)
                );
            }
            if report.purge_withheld {
                println!(
                    "  {}",
                    "Remote window empty; local files kept".yellow()
                );
            }
        }
    }
}

fn join<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_summary(report: &SyncReport) {
    let fetched: usize = report.channels.iter().map(|r| r.fetched.len()).sum();
    let fetch_failed: usize = report.channels.iter().map(|r| r.fetch_failed.len()).sum();
    let purged: usize = report.channels.iter().map(|r| r.purged.len()).sum();
    let files: usize = report.channels.iter().map(|r| r.files_deleted).sum();

    println!();
    println!("{}", "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━".cyan());
    println!(
        "{} {}",
        "Channels synced:".white().bold(),
        format!("{}/{}", report.synced(), report.channels.len()).yellow()
    );
    println!(
        "{} {}  {} {}",
        "Downloaded:".white(),
        fetched.to_string().green(),
        "Failed:".white(),
        fetch_failed.to_string().red()
    );
    println!(
        "{} {} {}",
        "Purged:".white(),
        purged.to_string().green(),
        format!("({} file(s))", files).dimmed()
    );
    if report.failed() > 0 {
        println!(
            "{}",
            format!("{} channel(s) reported problems", report.failed()).yellow()
        );
    }
    if report.cancelled {
        println!("{}", "Sync cancelled before completion.".yellow().bold());
    }
}
