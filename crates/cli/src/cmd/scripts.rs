//! Implementation of the `modforge scripts` command.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use modforge_lib::config::Config;
use modforge_lib::scripts::resolve_script_list;

/// Resolve the mod's script list and print it in compilation order.
pub fn cmd_scripts(config_path: &Path, json: bool) -> Result<()> {
  let config = Config::load(config_path).context("Failed to load config")?;
  let root = config.dirs().work_data().join(&config.mod_files.scripts);

  let scripts = resolve_script_list(&root).context("Failed to resolve script list")?;

  if json {
    let paths: Vec<String> = scripts.iter().map(|p| p.display().to_string()).collect();
    println!("{}", serde_json::to_string_pretty(&paths)?);
  } else {
    for script in &scripts {
      println!("{}", script.display());
    }
  }

  info!(count = scripts.len(), "script list resolved");
  Ok(())
}
