//! Read-only access to VDFS archives.
//!
//! The session never writes archive contents; it only lists entry names (to
//! find animation data and world files) and renames whole archive files to
//! toggle them off. The catalog is a trait so tests can stand in fixed entry
//! lists without crafting real containers.

mod reader;
mod toggle;

use std::path::{Path, PathBuf};

use thiserror::Error;

pub use reader::DiskCatalog;
pub use toggle::{ToggleError, disable_archives, enable_archives, recover_archives};

/// One named entry of an archive. Consulted, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VdfsEntry {
  /// Entry name as stored, trailing padding stripped.
  pub name: String,
  /// Whether the entry is a directory group rather than a file.
  pub is_dir: bool,
}

impl VdfsEntry {
  pub fn file(name: impl Into<String>) -> Self {
    VdfsEntry {
      name: name.into(),
      is_dir: false,
    }
  }

  pub fn dir(name: impl Into<String>) -> Self {
    VdfsEntry {
      name: name.into(),
      is_dir: true,
    }
  }
}

/// Errors that can occur reading an archive catalog.
#[derive(Debug, Error)]
pub enum VdfsError {
  #[error("failed to read archive {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("{path} is not a VDFS v2 archive")]
  BadSignature { path: PathBuf },

  #[error("archive {path} is truncated")]
  Truncated { path: PathBuf },
}

/// Lists the entries of an archive.
pub trait VdfsCatalog: Send + Sync {
  fn entries(&self, archive: &Path) -> Result<Vec<VdfsEntry>, VdfsError>;
}
