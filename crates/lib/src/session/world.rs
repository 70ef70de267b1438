//! World validation.
//!
//! Before anything external launches, the session verifies that the world it
//! is about to load actually exists somewhere: in the installation's world
//! containers or as a loose file under one of the mod's asset directories.

use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::config::{GameDirs, GameVersion};
use crate::consts::{WORLD_EXT, WORLDS_ADDON_ARCHIVE, WORLDS_ARCHIVE};
use crate::vdfs::VdfsCatalog;

use super::SessionError;

/// Validate that `world` names a known world file.
///
/// Candidates are the `.zen` entries of the fixed world containers (the
/// addon container only for installations that ship it) plus any `.zen`
/// files under each asset directory's `Worlds` subtree. Comparison is by
/// file name only, case-insensitive. Missing containers are fatal before the
/// world is even looked up.
pub fn validate_world(
  dirs: &GameDirs,
  version: GameVersion,
  asset_dirs: &[PathBuf],
  world: &str,
  catalog: &dyn VdfsCatalog,
) -> Result<(), SessionError> {
  let mut candidates = Vec::new();

  collect_container(dirs, WORLDS_ARCHIVE, catalog, &mut candidates)?;
  if version.has_addon_worlds() {
    collect_container(dirs, WORLDS_ADDON_ARCHIVE, catalog, &mut candidates)?;
  }

  for asset_dir in asset_dirs {
    collect_loose_worlds(&asset_dir.join("Worlds"), &mut candidates);
  }

  debug!(world, candidates = candidates.len(), "validating world");

  let wanted = file_name_of(world);
  let found = candidates
    .iter()
    .any(|candidate| file_name_of(candidate).eq_ignore_ascii_case(&wanted));

  if found {
    Ok(())
  } else {
    Err(SessionError::WorldNotFound {
      world: world.to_string(),
    })
  }
}

fn collect_container(
  dirs: &GameDirs,
  name: &str,
  catalog: &dyn VdfsCatalog,
  candidates: &mut Vec<String>,
) -> Result<(), SessionError> {
  let archive = dirs.data().join(name);
  if !archive.is_file() {
    return Err(SessionError::RequiredArchiveMissing {
      name: name.to_string(),
    });
  }

  let zen_suffix = format!(".{WORLD_EXT}");
  for entry in catalog.entries(&archive)? {
    if !entry.is_dir && entry.name.to_ascii_lowercase().ends_with(&zen_suffix) {
      candidates.push(entry.name);
    }
  }
  Ok(())
}

fn collect_loose_worlds(worlds_dir: &Path, candidates: &mut Vec<String>) {
  if !worlds_dir.is_dir() {
    return;
  }

  for entry in WalkDir::new(worlds_dir).into_iter().filter_map(Result::ok) {
    if entry.file_type().is_file()
      && entry
        .path()
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(WORLD_EXT))
    {
      candidates.push(entry.path().to_string_lossy().into_owned());
    }
  }
}

/// Final path component of a world reference written with either separator.
fn file_name_of(reference: &str) -> String {
  reference
    .rsplit(['/', '\\'])
    .next()
    .unwrap_or(reference)
    .to_string()
}
