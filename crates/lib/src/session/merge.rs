//! Asset merging.
//!
//! A mod keeps its sources outside the installation; before a test the
//! selected parts are layered over the engine's `_work/Data` tree so the
//! engine picks them up ahead of the archives.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Which parts of the mod to merge before the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMode {
  None,
  Scripts,
  #[default]
  All,
}

impl MergeMode {
  pub fn includes_scripts(self) -> bool {
    matches!(self, MergeMode::Scripts | MergeMode::All)
  }
}

#[derive(Debug, Error)]
pub enum MergeError {
  #[error("failed to copy {path}: {source}")]
  Copy {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// Performs the content merge for a given mode.
#[async_trait]
pub trait AssetMerger: Send + Sync {
  async fn merge(&self, mode: MergeMode) -> Result<(), MergeError>;
}

/// Production merger copying asset directories over the work tree.
pub struct OverlayMerger {
  asset_dirs: Vec<PathBuf>,
  work_data: PathBuf,
}

impl OverlayMerger {
  pub fn new(asset_dirs: Vec<PathBuf>, work_data: PathBuf) -> Self {
    OverlayMerger {
      asset_dirs,
      work_data,
    }
  }

  fn copy_tree(&self, from: &Path, to: &Path) -> Result<usize, MergeError> {
    let mut copied = 0;

    for entry in WalkDir::new(from).into_iter().filter_map(Result::ok) {
      if !entry.file_type().is_file() {
        continue;
      }

      let Ok(relative) = entry.path().strip_prefix(from) else {
        continue;
      };
      let target = to.join(relative);

      let copy_err = |source| MergeError::Copy {
        path: entry.path().to_path_buf(),
        source,
      };

      if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent).map_err(copy_err)?;
      }
      std::fs::copy(entry.path(), &target).map_err(copy_err)?;
      copied += 1;
    }

    Ok(copied)
  }
}

#[async_trait]
impl AssetMerger for OverlayMerger {
  async fn merge(&self, mode: MergeMode) -> Result<(), MergeError> {
    if mode == MergeMode::None {
      return Ok(());
    }

    for asset_dir in &self.asset_dirs {
      let (source, target) = match mode {
        MergeMode::Scripts => (asset_dir.join("Scripts"), self.work_data.join("Scripts")),
        _ => (asset_dir.clone(), self.work_data.clone()),
      };

      if !source.is_dir() {
        debug!(dir = %source.display(), "merge source missing, skipping");
        continue;
      }

      let copied = self.copy_tree(&source, &target)?;
      info!(from = %source.display(), files = copied, "assets merged");
    }

    Ok(())
  }
}
