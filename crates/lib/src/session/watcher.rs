//! Compiled-output file watching.
//!
//! The watcher observes the compiled-scripts directory on its own thread and
//! forwards rewrite events to a registered sink. The sink must never block
//! or touch the filesystem; it only signals the orchestrating task, which
//! owns the process handle.

use std::path::Path;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use thiserror::Error;
use tracing::debug;

/// Callback invoked with the path of a rewritten file.
pub type WatchSink = Box<dyn Fn(&Path) + Send + Sync>;

#[derive(Debug, Error)]
pub enum WatchError {
  #[error("failed to watch {path}: {source}")]
  Watch {
    path: String,
    #[source]
    source: notify::Error,
  },
}

/// Start/stop watcher over one directory.
pub trait CompileWatcher: Send + Sync {
  fn start(&mut self, dir: &Path, sink: WatchSink) -> Result<(), WatchError>;
  fn stop(&mut self);
}

/// Production watcher backed by the platform notification API.
#[derive(Default)]
pub struct FsCompileWatcher {
  inner: Option<RecommendedWatcher>,
}

impl FsCompileWatcher {
  pub fn new() -> Self {
    FsCompileWatcher { inner: None }
  }
}

impl CompileWatcher for FsCompileWatcher {
  fn start(&mut self, dir: &Path, sink: WatchSink) -> Result<(), WatchError> {
    let watch_err = |source| WatchError::Watch {
      path: dir.display().to_string(),
      source,
    };

    let mut watcher = notify::recommended_watcher(move |result: Result<Event, notify::Error>| {
      let Ok(event) = result else { return };
      // Engine compilation rewrites files in place; both modify and create
      // events count as a rewrite.
      if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
        for path in &event.paths {
          sink(path);
        }
      }
    })
    .map_err(watch_err)?;

    watcher
      .watch(dir, RecursiveMode::NonRecursive)
      .map_err(watch_err)?;

    debug!(dir = %dir.display(), "compile watcher started");
    self.inner = Some(watcher);
    Ok(())
  }

  fn stop(&mut self) {
    if self.inner.take().is_some() {
      debug!("compile watcher stopped");
    }
  }
}
