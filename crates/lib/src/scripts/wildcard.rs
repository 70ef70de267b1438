//! Prefix-wildcard expansion for script references.

use std::io;
use std::path::{Path, PathBuf};

/// A wildcard reference, split into the directory to search, the required
/// filename prefix and the required extension.
///
/// Derived from a path whose filename embeds `*` immediately before the
/// extension, e.g. `Story/Dialoge/DIA_*.d`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WildcardPattern {
  directory: PathBuf,
  prefix: String,
  extension: String,
}

impl WildcardPattern {
  /// Split `path` into a pattern, or `None` if its filename carries no
  /// wildcard marker.
  pub fn parse(path: &Path) -> Option<Self> {
    let name = path.file_name()?.to_str()?;
    let stem = name.strip_suffix(&format!(".{}", extension_of(path)?))?;
    let prefix = stem.strip_suffix('*')?;

    if prefix.contains('*') {
      return None;
    }

    Some(WildcardPattern {
      directory: path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf(),
      prefix: prefix.to_string(),
      extension: extension_of(path)?.to_ascii_lowercase(),
    })
  }

  /// Expand the pattern against its directory.
  ///
  /// Matching is case-insensitive on both prefix and extension. The result
  /// is sorted by lowercased filename so expansion order never depends on
  /// filesystem enumeration order. Zero matches yield an empty list, not an
  /// error; the caller decides whether that is fatal.
  pub fn expand(&self) -> io::Result<Vec<PathBuf>> {
    let mut matches = Vec::new();

    for entry in std::fs::read_dir(&self.directory)? {
      let entry = entry?;
      if !entry.file_type()?.is_file() {
        continue;
      }

      let path = entry.path();
      let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        continue;
      };

      let extension_matches = extension_of(&path)
        .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.extension));

      if extension_matches && starts_with_ignore_case(name, &self.prefix) {
        matches.push(path);
      }
    }

    matches.sort_by_key(|p| {
      p.file_name()
        .map(|n| n.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
    });

    Ok(matches)
  }

  /// Directory the pattern searches.
  pub fn directory(&self) -> &Path {
    &self.directory
  }

  /// Required filename prefix.
  pub fn prefix(&self) -> &str {
    &self.prefix
  }
}

/// Extension of `path` as a `&str`, if it has one.
pub(crate) fn extension_of(path: &Path) -> Option<&str> {
  path.extension().and_then(|e| e.to_str())
}

// Slicing by byte length must stay on a char boundary; filenames are not
// guaranteed to be ASCII.
fn starts_with_ignore_case(name: &str, prefix: &str) -> bool {
  name
    .get(..prefix.len())
    .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}
