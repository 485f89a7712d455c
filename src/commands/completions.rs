use anyhow::{Context, Result};
use clap::{ArgMatches, Command};
use clap_complete::{generate, Shell};
use std::io;
use std::process::ExitCode;

/// Generate shell completions for the specified shell
pub fn execute(matches: &ArgMatches, cli: &mut Command) -> Result<ExitCode> {
    let shell = *matches
        .get_one::<Shell>("shell")
        .context("Shell argument is required")?;

    generate(shell, cli, "yt-archiver", &mut io::stdout());
    Ok(ExitCode::SUCCESS)
}
