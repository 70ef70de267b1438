//! Archive toggling for forced asset recompilation.
//!
//! Disabling renames an archive from `.vdf` to `.disabled` so the engine
//! treats its assets as absent and regenerates the compiled databases on the
//! next launch; enabling renames it back. Only archives carrying the
//! animation group entry are toggled. The disabled set is journaled to disk
//! before any rename so a crashed run leaves a record of what to restore.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::consts::{ANIMS_ENTRY, ARCHIVE_EXT, DISABLED_EXT, TOGGLE_JOURNAL};

use super::{VdfsCatalog, VdfsError};

/// Errors that can occur while toggling archives.
#[derive(Debug, Error)]
pub enum ToggleError {
  #[error(transparent)]
  Vdfs(#[from] VdfsError),

  #[error("failed to rename {path}: {source}")]
  Rename {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to list {path}: {source}")]
  List {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to access toggle journal {path}: {source}")]
  Journal {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// Disable every archive in `data_dir` whose catalog contains the animation
/// group entry.
///
/// Returns the original `.vdf` paths of the archives that were renamed, in
/// the order they were disabled. The same list is journaled to disk before
/// the first rename; [`enable_archives`] removes the journal once the set is
/// fully restored.
pub fn disable_archives(
  data_dir: &Path,
  catalog: &dyn VdfsCatalog,
) -> Result<Vec<PathBuf>, ToggleError> {
  let mut candidates: Vec<PathBuf> = std::fs::read_dir(data_dir)
    .map_err(|source| ToggleError::List {
      path: data_dir.to_path_buf(),
      source,
    })?
    .filter_map(|entry| entry.ok().map(|e| e.path()))
    .filter(|path| {
      path.is_file()
        && path
          .extension()
          .is_some_and(|ext| ext.eq_ignore_ascii_case(ARCHIVE_EXT))
    })
    .collect();
  candidates.sort();

  let mut to_disable = Vec::new();
  for archive in &candidates {
    let has_anims = catalog
      .entries(archive)?
      .iter()
      .any(|entry| entry.name.eq_ignore_ascii_case(ANIMS_ENTRY));

    if has_anims {
      to_disable.push(archive.clone());
    }
  }

  if to_disable.is_empty() {
    debug!(dir = %data_dir.display(), "no archives carry animation data");
    return Ok(Vec::new());
  }

  write_journal(data_dir, &to_disable)?;

  for archive in &to_disable {
    let disabled = archive.with_extension(DISABLED_EXT);
    std::fs::rename(archive, &disabled).map_err(|source| ToggleError::Rename {
      path: archive.clone(),
      source,
    })?;
    info!(archive = %archive.display(), "archive disabled");
  }

  Ok(to_disable)
}

/// Restore every archive recorded in `disabled` to its original extension.
///
/// The list always fully drains: a failed rename is remembered but does not
/// stop the remaining restores, so no archive is silently dropped from the
/// bookkeeping. The first failure (if any) is returned after the drain. The
/// journal is removed only when every restore succeeded.
pub fn enable_archives(data_dir: &Path, disabled: &mut Vec<PathBuf>) -> Result<(), ToggleError> {
  let mut first_error = None;

  for archive in disabled.drain(..) {
    let from = archive.with_extension(DISABLED_EXT);
    match std::fs::rename(&from, &archive) {
      Ok(()) => info!(archive = %archive.display(), "archive restored"),
      Err(source) => {
        warn!(archive = %archive.display(), error = %source, "failed to restore archive");
        first_error.get_or_insert(ToggleError::Rename {
          path: from,
          source,
        });
      }
    }
  }

  match first_error {
    Some(err) => Err(err),
    None => {
      let _ = std::fs::remove_file(data_dir.join(TOGGLE_JOURNAL));
      Ok(())
    }
  }
}

/// Restore archives recorded by a previous run that never reached its enable
/// phase. Returns the paths that were restored.
pub fn recover_archives(data_dir: &Path) -> Result<Vec<PathBuf>, ToggleError> {
  let journal = data_dir.join(TOGGLE_JOURNAL);
  if !journal.is_file() {
    return Ok(Vec::new());
  }

  let text = std::fs::read_to_string(&journal).map_err(|source| ToggleError::Journal {
    path: journal.clone(),
    source,
  })?;

  let mut recorded: Vec<PathBuf> = text
    .lines()
    .filter(|line| !line.is_empty())
    .map(PathBuf::from)
    .collect();

  info!(count = recorded.len(), "recovering archives from journal");

  let mut restored = recorded.clone();
  enable_archives(data_dir, &mut recorded)?;
  restored.retain(|path| path.is_file());
  Ok(restored)
}

fn write_journal(data_dir: &Path, paths: &[PathBuf]) -> Result<(), ToggleError> {
  let journal = data_dir.join(TOGGLE_JOURNAL);
  let mut text = String::new();
  for path in paths {
    text.push_str(&path.to_string_lossy());
    text.push('\n');
  }
  std::fs::write(&journal, text).map_err(|source| ToggleError::Journal {
    path: journal,
    source,
  })
}
