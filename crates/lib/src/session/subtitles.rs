//! Output-unit (subtitle) regeneration.
//!
//! Dialogue scripts declare their spoken lines as `AI_Output` calls whose
//! trailing comment carries the subtitle text:
//!
//! ```text
//! AI_Output(self, other, "DIA_Diego_Hello_15_00"); //Hey, new face!
//! ```
//!
//! The updater resolves the mod's script list and rewrites the output-units
//! file from every such line it finds.

use std::fmt::Write as _;
use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info};

use crate::scripts::{ResolveError, resolve_script_list};

#[derive(Debug, Error)]
pub enum SubtitleError {
  #[error(transparent)]
  Resolve(#[from] ResolveError),

  #[error("failed to access {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// Regenerates the output-units file. Returns the number of units written.
#[async_trait]
pub trait SubtitleUpdater: Send + Sync {
  async fn update(&self) -> Result<usize, SubtitleError>;
}

/// One extracted dialogue line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputUnit {
  pub name: String,
  pub subtitle: String,
}

/// Production updater scanning the resolved script list.
pub struct OutputUnitsWriter {
  root_src: PathBuf,
  output: PathBuf,
}

impl OutputUnitsWriter {
  pub fn new(root_src: PathBuf, output: PathBuf) -> Self {
    OutputUnitsWriter { root_src, output }
  }
}

#[async_trait]
impl SubtitleUpdater for OutputUnitsWriter {
  async fn update(&self) -> Result<usize, SubtitleError> {
    let scripts = resolve_script_list(&self.root_src)?;

    let mut units = Vec::new();
    for script in &scripts {
      let text = std::fs::read_to_string(script).map_err(|source| SubtitleError::Io {
        path: script.clone(),
        source,
      })?;

      for line in text.lines() {
        if let Some(unit) = parse_output_line(line) {
          units.push(unit);
        }
      }
    }

    debug!(scripts = scripts.len(), units = units.len(), "output units collected");

    let mut rendered = format!("// generated output units: {}\n", units.len());
    for unit in &units {
      let _ = writeln!(rendered, "{}\t{}", unit.name, unit.subtitle);
    }

    std::fs::write(&self.output, rendered).map_err(|source| SubtitleError::Io {
      path: self.output.clone(),
      source,
    })?;

    info!(path = %self.output.display(), units = units.len(), "output units written");
    Ok(units.len())
  }
}

/// Extract an output unit from one script line, if it declares one.
///
/// The unit name is the third `AI_Output` argument (a string literal); the
/// subtitle is whatever follows the `//` after the call.
pub fn parse_output_line(line: &str) -> Option<OutputUnit> {
  let trimmed = line.trim_start();
  let call_start = find_ignore_case(trimmed, "AI_Output")?;
  let rest = &trimmed[call_start..];

  let open_quote = rest.find('"')?;
  let after_open = &rest[open_quote + 1..];
  let close_quote = after_open.find('"')?;
  let name = &after_open[..close_quote];

  let after_call = &after_open[close_quote + 1..];
  let comment = after_call.find("//")?;
  let subtitle = after_call[comment + 2..].trim();

  if name.is_empty() || subtitle.is_empty() {
    return None;
  }

  Some(OutputUnit {
    name: name.to_string(),
    subtitle: subtitle.to_string(),
  })
}

fn find_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
  haystack
    .to_ascii_lowercase()
    .find(&needle.to_ascii_lowercase())
}
