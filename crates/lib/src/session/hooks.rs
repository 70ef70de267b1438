//! Lifecycle hook dispatch.
//!
//! Hooks are externally configured shell commands bound to a scope, a stage
//! and a lifecycle event. Every event fans out over three scopes: the
//! mode-independent `Common` scope, the session-type `Test` scope, and one
//! mode-specific scope. A failing hook aborts the session.

use std::process::Stdio;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use super::TestMode;

/// Registration scope of a hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HookScope {
  Common,
  Test,
  FullTest,
  QuickTest,
}

/// Whether the hook runs before or after its event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HookStage {
  Pre,
  Post,
}

/// Lifecycle event a hook is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HookEvent {
  AssetsMerge,
  SubtitlesUpdate,
}

/// One configured hook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookDef {
  pub scope: HookScope,
  pub stage: HookStage,
  pub event: HookEvent,
  pub command: String,
}

/// Errors a hook dispatch can produce. Always fatal to the session.
#[derive(Debug, Error)]
pub enum HookError {
  #[error("hook '{command}' failed to start: {source}")]
  Spawn {
    command: String,
    #[source]
    source: std::io::Error,
  },

  #[error("hook '{command}' exited with {code:?}")]
  CommandFailed { command: String, code: Option<i32> },
}

/// Runs the hooks registered for a `(scope, stage, event)` triple.
#[async_trait]
pub trait HookDispatcher: Send + Sync {
  async fn dispatch(
    &self,
    scope: HookScope,
    stage: HookStage,
    event: HookEvent,
  ) -> Result<(), HookError>;
}

/// The fixed fan-out table: scopes dispatched for every event, in order,
/// computed once at session start.
pub fn scopes_for(mode: TestMode) -> [HookScope; 3] {
  match mode {
    TestMode::Full => [HookScope::Common, HookScope::Test, HookScope::FullTest],
    TestMode::Quick => [HookScope::Common, HookScope::Test, HookScope::QuickTest],
  }
}

/// Production dispatcher running configured shell commands.
pub struct ShellHooks {
  hooks: Vec<HookDef>,
}

impl ShellHooks {
  pub fn new(hooks: Vec<HookDef>) -> Self {
    ShellHooks { hooks }
  }
}

#[async_trait]
impl HookDispatcher for ShellHooks {
  async fn dispatch(
    &self,
    scope: HookScope,
    stage: HookStage,
    event: HookEvent,
  ) -> Result<(), HookError> {
    let matching = self
      .hooks
      .iter()
      .filter(|h| h.scope == scope && h.stage == stage && h.event == event);

    for hook in matching {
      info!(command = %hook.command, ?scope, ?stage, ?event, "running hook");
      run_shell(&hook.command).await?;
    }

    Ok(())
  }
}

async fn run_shell(command: &str) -> Result<(), HookError> {
  let (shell, flag) = shell_invocation();

  let status = tokio::process::Command::new(shell)
    .arg(flag)
    .arg(command)
    .stdin(Stdio::null())
    .status()
    .await
    .map_err(|source| HookError::Spawn {
      command: command.to_string(),
      source,
    })?;

  if !status.success() {
    return Err(HookError::CommandFailed {
      command: command.to_string(),
      code: status.code(),
    });
  }

  debug!(command = %command, "hook finished");
  Ok(())
}

#[cfg(unix)]
fn shell_invocation() -> (&'static str, &'static str) {
  ("/bin/sh", "-c")
}

#[cfg(windows)]
fn shell_invocation() -> (&'static str, &'static str) {
  ("cmd.exe", "/C")
}
