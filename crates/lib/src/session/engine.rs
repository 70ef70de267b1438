//! Engine process launching.
//!
//! Exactly one engine process is active at a time. The launcher hands back a
//! handle supporting an awaited exit and forced termination; the session
//! owns the handle and is the only place that kills it.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info};

/// Errors from launching or driving the engine process.
#[derive(Debug, Error)]
pub enum EngineError {
  #[error("failed to launch engine {executable}: {source}")]
  Launch {
    executable: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to wait for engine: {0}")]
  Wait(#[source] std::io::Error),

  #[error("failed to terminate engine: {0}")]
  Kill(#[source] std::io::Error),
}

/// A running engine process.
#[async_trait]
pub trait EngineProcess: Send {
  /// Block until the process exits, returning its exit code if any.
  async fn wait(&mut self) -> Result<Option<i32>, EngineError>;

  /// Force-terminate the process.
  async fn kill(&mut self) -> Result<(), EngineError>;
}

/// Starts the engine with an argument list.
#[async_trait]
pub trait EngineLauncher: Send + Sync {
  async fn launch(&self, args: &[String]) -> Result<Box<dyn EngineProcess>, EngineError>;
}

/// Production launcher running the engine binary from its system directory.
pub struct GothicLauncher {
  executable: PathBuf,
  working_dir: PathBuf,
}

impl GothicLauncher {
  pub fn new(executable: PathBuf, working_dir: PathBuf) -> Self {
    GothicLauncher {
      executable,
      working_dir,
    }
  }
}

#[async_trait]
impl EngineLauncher for GothicLauncher {
  async fn launch(&self, args: &[String]) -> Result<Box<dyn EngineProcess>, EngineError> {
    info!(executable = %self.executable.display(), ?args, "launching engine");

    let child = tokio::process::Command::new(&self.executable)
      .args(args)
      .current_dir(&self.working_dir)
      .spawn()
      .map_err(|source| EngineError::Launch {
        executable: self.executable.clone(),
        source,
      })?;

    Ok(Box::new(ChildProcess { child }))
  }
}

struct ChildProcess {
  child: tokio::process::Child,
}

#[async_trait]
impl EngineProcess for ChildProcess {
  async fn wait(&mut self) -> Result<Option<i32>, EngineError> {
    let status = self.child.wait().await.map_err(EngineError::Wait)?;
    debug!(code = ?status.code(), "engine exited");
    Ok(status.code())
  }

  async fn kill(&mut self) -> Result<(), EngineError> {
    self.child.kill().await.map_err(EngineError::Kill)
  }
}

/// Launcher helper for the common case: binary and working directory both
/// live in the installation's `System` directory.
pub fn system_launcher(system_dir: &Path, executable: PathBuf) -> GothicLauncher {
  GothicLauncher::new(executable, system_dir.to_path_buf())
}
