//! Mod configuration.
//!
//! A mod ships a small YAML file describing where the engine lives, which
//! asset directories make up the mod, and which hooks should fire around the
//! lifecycle events of a test session:
//!
//! ```yaml
//! game:
//!   directory: /opt/gothic2
//!   version: gothic2
//! mod:
//!   assets:
//!     - /home/me/mymod/assets
//!   scripts: Scripts/Content/Gothic.src
//!   default_world: NEWWORLD.ZEN
//! test:
//!   engine_timeout_secs: 3600
//! hooks:
//!   - scope: full-test
//!     stage: pre
//!     event: assets-merge
//!     command: ./prepare.sh
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::session::hooks::HookDef;

/// Errors that can occur loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse config: {0}")]
  Parse(#[from] serde_yaml::Error),

  #[error("invalid config: {0}")]
  Validation(String),
}

/// The complete mod configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
  pub game: GameConfig,
  #[serde(rename = "mod")]
  pub mod_files: ModConfig,
  #[serde(default)]
  pub test: TestConfig,
  #[serde(default)]
  pub hooks: Vec<HookDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
  /// Engine installation root.
  pub directory: PathBuf,
  pub version: GameVersion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameVersion {
  Gothic1,
  Gothic2,
}

impl GameVersion {
  /// Engine binary name inside the `System` directory.
  pub fn executable_name(self) -> &'static str {
    match self {
      GameVersion::Gothic1 => "GOTHIC.EXE",
      GameVersion::Gothic2 => "GOTHIC2.EXE",
    }
  }

  /// Whether the installation ships the addon world container.
  pub fn has_addon_worlds(self) -> bool {
    matches!(self, GameVersion::Gothic2)
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModConfig {
  /// Asset directories layered over the engine work tree.
  pub assets: Vec<PathBuf>,
  /// Root include file of the mod's scripts, relative to the work data dir.
  pub scripts: PathBuf,
  /// World loaded when the test verb names none.
  pub default_world: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestConfig {
  /// Upper bound on a single engine pass. The engine has no watchdog of its
  /// own; without this a hung process would hang the whole session.
  pub engine_timeout_secs: Option<u64>,
}

impl TestConfig {
  pub fn engine_timeout(&self) -> Option<Duration> {
    self.engine_timeout_secs.map(Duration::from_secs)
  }
}

impl Config {
  /// Load and validate a configuration file.
  pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
      path: path.to_path_buf(),
      source,
    })?;

    let config: Config = serde_yaml::from_str(&text)?;
    config.validate()?;

    debug!(path = %path.display(), "config loaded");
    Ok(config)
  }

  fn validate(&self) -> Result<(), ConfigError> {
    if !self.game.directory.is_dir() {
      return Err(ConfigError::Validation(format!(
        "game directory does not exist: {}",
        self.game.directory.display()
      )));
    }
    if self.mod_files.assets.is_empty() {
      return Err(ConfigError::Validation(
        "at least one asset directory is required".to_string(),
      ));
    }
    if self.mod_files.default_world.trim().is_empty() {
      return Err(ConfigError::Validation("default_world must not be empty".to_string()));
    }
    Ok(())
  }

  pub fn dirs(&self) -> GameDirs {
    GameDirs::new(&self.game.directory)
  }
}

/// Fixed locations inside an engine installation.
#[derive(Debug, Clone)]
pub struct GameDirs {
  root: PathBuf,
}

impl GameDirs {
  pub fn new(root: &Path) -> Self {
    GameDirs {
      root: root.to_path_buf(),
    }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Archive directory.
  pub fn data(&self) -> PathBuf {
    self.root.join("Data")
  }

  /// Engine binaries.
  pub fn system(&self) -> PathBuf {
    self.root.join("System")
  }

  /// Unpacked working data layered over the archives.
  pub fn work_data(&self) -> PathBuf {
    self.root.join("_work").join("Data")
  }

  /// Compiled script databases (`MENU.DAT`, `MUSIC.DAT`, ...).
  pub fn compiled_scripts(&self) -> PathBuf {
    self.work_data().join("Scripts").join("_compiled")
  }

  /// Loose world files.
  pub fn worlds(&self) -> PathBuf {
    self.work_data().join("Worlds")
  }

  pub fn executable(&self, version: GameVersion) -> PathBuf {
    self.system().join(version.executable_name())
  }
}
