//! Command-line entry point for modforge.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd;

use cmd::{MergeArg, TestArgs};

/// modforge - build and test orchestration for Gothic-engine mods
#[derive(Parser)]
#[command(name = "modforge")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Path to the mod configuration file
  #[arg(short, long, global = true, default_value = "modforge.yml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Run a staged engine test session
  Test {
    /// Two-pass session that rebuilds the compiled asset databases
    #[arg(long)]
    full: bool,

    /// World to load instead of the configured default
    #[arg(short, long)]
    world: Option<String>,

    /// What to merge into the engine work tree before launching
    #[arg(long, value_enum, default_value_t = MergeArg::All)]
    merge: MergeArg,

    /// Run the engine windowed
    #[arg(long)]
    windowed: bool,

    /// Enable the engine's developer mode
    #[arg(long)]
    dev_mode: bool,

    /// Skip music and sound playback
    #[arg(long)]
    no_audio: bool,

    /// Skip the game menu
    #[arg(long)]
    no_menu: bool,

    /// Do not regenerate the dialogue output units
    #[arg(long)]
    no_update_subtitles: bool,

    /// In-game clock to start at, e.g. 8:00
    #[arg(long)]
    time: Option<String>,
  },

  /// Resolve and print the mod's script compilation order
  Scripts {
    /// Print the list as JSON
    #[arg(long)]
    json: bool,
  },

  /// Show the configured engine and mod layout
  Info,
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let default_filter = if cli.verbose { "debug" } else { "info" };
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
    )
    .without_time()
    .init();

  match cli.command {
    Commands::Test {
      full,
      world,
      merge,
      windowed,
      dev_mode,
      no_audio,
      no_menu,
      no_update_subtitles,
      time,
    } => cmd::cmd_test(
      &cli.config,
      TestArgs {
        full,
        world,
        merge,
        windowed,
        dev_mode,
        no_audio,
        no_menu,
        no_update_subtitles,
        time,
      },
    ),
    Commands::Scripts { json } => cmd::cmd_scripts(&cli.config, json),
    Commands::Info => cmd::cmd_info(&cli.config),
  }
}
