use crate::core::yt_dlp;
use crate::ui;
use anyhow::{Context, Result};
use colored::Colorize;
use std::process::ExitCode;

pub fn execute() -> Result<ExitCode> {
    ui::info("Checking latest yt-dlp release...");

    let (version, path) = yt_dlp::install().context("Failed to install yt-dlp")?;

    ui::success(&format!("yt-dlp {} installed", version));
    println!("  {}", path.display().to_string().dimmed());

    if let Ok(on_path) = which::which("yt-dlp") {
        println!(
            "  {}",
            format!("Note: {} on PATH takes precedence", on_path.display()).dimmed()
        );
    }

    Ok(ExitCode::SUCCESS)
}
