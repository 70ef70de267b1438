//! Recursive `.src` include-file resolution.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, trace};

use crate::consts::{INCLUDE_EXT, SCRIPT_EXT};

use super::wildcard::{WildcardPattern, extension_of};

/// Errors that can occur while resolving a script list.
#[derive(Debug, Error)]
pub enum ResolveError {
  /// A direct or wildcard reference matched no file on disk. Carries the
  /// raw line text and its 1-based line number in the include file.
  #[error("no files match '{reference}' ({file}:{line})")]
  MissingReference {
    reference: String,
    file: PathBuf,
    line: usize,
  },

  /// An include file references itself, directly or transitively.
  #[error("include cycle detected at {0}")]
  IncludeCycle(PathBuf),

  /// Reading an include file or listing a directory failed.
  #[error("failed to read {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// Resolve a root include file into a flat list of absolute script paths.
///
/// References resolve relative to the include file they appear in. Include
/// files recurse depth-first; wildcard expansions are inserted at the point
/// of reference. The output contains each path at most once, keeping the
/// position of its first occurrence.
pub fn resolve_script_list(root: &Path) -> Result<Vec<PathBuf>, ResolveError> {
  let mut out = Vec::new();
  let mut seen = HashSet::new();
  let mut ancestry = Vec::new();

  resolve_into(root, &mut ancestry, &mut seen, &mut out)?;

  debug!(root = %root.display(), scripts = out.len(), "script list resolved");
  Ok(out)
}

/// Strip a `//` line comment, returning the remaining text.
///
/// This is the whole preprocessing contract for include files: comments run
/// to end of line, blank results are skipped by the caller.
pub fn strip_comments(line: &str) -> &str {
  match line.find("//") {
    Some(pos) => &line[..pos],
    None => line,
  }
}

fn resolve_into(
  file: &Path,
  ancestry: &mut Vec<PathBuf>,
  seen: &mut HashSet<PathBuf>,
  out: &mut Vec<PathBuf>,
) -> Result<(), ResolveError> {
  let canonical = std::fs::canonicalize(file).map_err(|source| ResolveError::Io {
    path: file.to_path_buf(),
    source,
  })?;

  if ancestry.contains(&canonical) {
    return Err(ResolveError::IncludeCycle(canonical));
  }
  ancestry.push(canonical.clone());

  let base = canonical
    .parent()
    .map(Path::to_path_buf)
    .unwrap_or_else(|| PathBuf::from("."));

  let text = std::fs::read_to_string(&canonical).map_err(|source| ResolveError::Io {
    path: canonical.clone(),
    source,
  })?;

  for (index, raw) in text.lines().enumerate() {
    let line = strip_comments(raw).trim();
    if line.is_empty() {
      continue;
    }

    let number = index + 1;
    let reference = base.join(normalize_separators(line));
    trace!(reference = %reference.display(), line = number, "resolving reference");

    match extension_of(&reference).map(str::to_ascii_lowercase).as_deref() {
      Some(INCLUDE_EXT) => {
        resolve_into(&reference, ancestry, seen, out)?;
      }
      Some(SCRIPT_EXT) => match WildcardPattern::parse(&reference) {
        Some(pattern) => {
          let matches = pattern.expand().map_err(|source| ResolveError::Io {
            path: pattern.directory().to_path_buf(),
            source,
          })?;

          if matches.is_empty() {
            return Err(missing(line, &canonical, number));
          }
          for path in matches {
            append(path, seen, out);
          }
        }
        None => {
          if !reference.is_file() {
            return Err(missing(line, &canonical, number));
          }
          append(reference, seen, out);
        }
      },
      // Anything that is neither a script nor an include file is ignored.
      _ => {}
    }
  }

  ancestry.pop();
  Ok(())
}

fn missing(reference: &str, file: &Path, line: usize) -> ResolveError {
  ResolveError::MissingReference {
    reference: reference.to_string(),
    file: file.to_path_buf(),
    line,
  }
}

fn append(path: PathBuf, seen: &mut HashSet<PathBuf>, out: &mut Vec<PathBuf>) {
  if seen.insert(path.clone()) {
    out.push(path);
  }
}

/// Include files written on Windows use backslash separators.
fn normalize_separators(line: &str) -> PathBuf {
  if cfg!(windows) {
    PathBuf::from(line)
  } else {
    PathBuf::from(line.replace('\\', "/"))
  }
}
