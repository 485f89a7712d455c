// Command-line definition

use crate::core::config::DEFAULT_CONFIG_PATH;
use clap::{Arg, ArgAction, Command};
use clap_complete::Shell;
use std::num::NonZeroUsize;

pub fn build_cli() -> Command {
    Command::new("yt-archiver")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Mirror the newest uploads of YouTube channels to local storage")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("PATH")
                .help("Configuration file")
                .default_value(DEFAULT_CONFIG_PATH)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable debug logging")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("search")
                .about("Channel search")
                .arg(
                    Arg::new("term")
                        .help("Search term")
                        .required(true)
                        .num_args(1..),
                )
                .arg(
                    Arg::new("limit")
                        .short('l')
                        .long("limit")
                        .help("Maximum number of channels to show")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("5"),
                ),
        )
        .subcommand(
            Command::new("add")
                .about("Add a channel")
                .arg(
                    Arg::new("id")
                        .short('i')
                        .long("id")
                        .value_name("ID")
                        .help("Channel ID, as shown by 'search'")
                        .required(true),
                )
                .arg(
                    Arg::new("name")
                        .short('n')
                        .long("name")
                        .value_name("NAME")
                        .help("Local directory name for the channel")
                        .required(true),
                )
                .arg(
                    Arg::new("keep")
                        .short('k')
                        .long("keep")
                        .value_name("N")
                        .help("Only keep the newest N videos")
                        .value_parser(clap::value_parser!(NonZeroUsize)),
                ),
        )
        .subcommand(Command::new("status").about("Archive status"))
        .subcommand(
            Command::new("sync")
                .about("Sync channels")
                .arg(
                    Arg::new("dry-run")
                        .long("dry-run")
                        .help("Show what would be downloaded and deleted without doing it")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("jobs")
                        .short('j')
                        .long("jobs")
                        .value_name("N")
                        .help("Number of channels to sync concurrently")
                        .value_parser(clap::value_parser!(usize)),
                ),
        )
        .subcommand(
            Command::new("install-yt-dlp")
                .about("Download the latest yt-dlp release into the managed location"),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completion scripts")
                .arg(
                    Arg::new("shell")
                        .help("Target shell")
                        .required(true)
                        .value_parser(clap::value_parser!(Shell)),
                ),
        )
}
