//! Implementation of the `modforge info` command.

use std::path::Path;

use anyhow::{Context, Result};

use modforge_lib::config::Config;

/// Print the configured engine and mod layout.
pub fn cmd_info(config_path: &Path) -> Result<()> {
  let config = Config::load(config_path).context("Failed to load config")?;
  let dirs = config.dirs();

  println!("Game:");
  println!("  Root:       {}", dirs.root().display());
  println!("  Executable: {}", dirs.executable(config.game.version).display());
  println!("  Data:       {}", dirs.data().display());
  println!("  Work data:  {}", dirs.work_data().display());
  println!();
  println!("Mod:");
  println!("  Scripts:       {}", config.mod_files.scripts.display());
  println!("  Default world: {}", config.mod_files.default_world);
  println!("  Asset dirs:    {}", config.mod_files.assets.len());
  println!("  Hooks:         {}", config.hooks.len());

  Ok(())
}
