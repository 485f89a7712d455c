use anyhow::Result;
use colored::Colorize;
use std::process::ExitCode;

use yt_archiver::cli::build_cli;
use yt_archiver::commands;
use yt_archiver::core::config::expand_tilde;

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let matches = build_cli().get_matches();

    yt_archiver::init_logging(matches.get_flag("verbose"));

    let config_path = matches
        .get_one::<String>("config")
        .map(|p| expand_tilde(p))
        .ok_or_else(|| anyhow::anyhow!("Config path is required"))?;

    match matches.subcommand() {
        Some(("search", sub_matches)) => commands::search::execute(sub_matches, &config_path),
        Some(("add", sub_matches)) => commands::add::execute(sub_matches, &config_path),
        Some(("status", _)) => commands::status::execute(&config_path),
        Some(("sync", sub_matches)) => commands::sync::execute(sub_matches, &config_path),
        Some(("install-yt-dlp", _)) => commands::install::execute(),
        Some(("completions", sub_matches)) => {
            let mut cli = build_cli();
            commands::completions::execute(sub_matches, &mut cli)
        }
        _ => {
            println!("Use 'yt-archiver --help' for more information.");
            Ok(ExitCode::SUCCESS)
        }
    }
}
