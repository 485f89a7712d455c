use crate::core::{AddOutcome, Channel, ChannelStore};
use crate::error::ArchiverError;
use crate::ui;
use anyhow::{Context, Result};
use colored::Colorize;
use std::num::NonZeroUsize;
use std::path::Path;
use std::process::ExitCode;

pub fn execute(matches: &clap::ArgMatches, config_path: &Path) -> Result<ExitCode> {
    let id = matches
        .get_one::<String>("id")
        .context("Channel ID is required")?;
    let name = matches
        .get_one::<String>("name")
        .context("Channel name is required")?;
    let keep = matches.get_one::<NonZeroUsize>("keep").copied();

    let mut store = ChannelStore::open(config_path)
        .with_context(|| format!("Failed to load configuration from {:?}", config_path))?;

    let sharing = store.channels_named(name);
    let channel = Channel::new(name.as_str(), id.as_str(), keep);
    match store.add_channel(channel)? {
        AddOutcome::Added => {
            store
                .commit()
                .with_context(|| format!("Failed to save configuration to {:?}", config_path))?;
            ui::success(&format!("Added channel '{}' ({})", name, id));
            for other in &sharing {
                ui::warn(&format!(
                    "Directory '{}' is also used by {}; each sync will purge the other's videos",
                    name, other.id
                ));
            }
            if let Some(keep) = keep {
                println!("  {}", format!("Keeping the newest {} video(s)", keep).dimmed());
            }
            Ok(ExitCode::SUCCESS)
        }
        AddOutcome::Duplicate(existing) => {
            ui::error(&ArchiverError::DuplicateChannel(existing.id.clone()).to_string());
            println!("  {}", format!("Tracked as '{}'", existing.name).dimmed());
            Ok(ExitCode::from(1))
        }
    }
}
