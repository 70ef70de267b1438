//! The staged test session.
//!
//! A session validates the requested world, optionally merges assets and
//! regenerates subtitles (each bracketed by PRE/POST hooks), then launches
//! the engine. A Quick session is a single launch. A Full session first
//! toggles off every archive carrying animation data so the engine rebuilds
//! its asset databases, runs a bulk-conversion pass, restores the archives
//! and runs a normal pass.
//!
//! The first Full pass exists only to regenerate asset databases: once the
//! compiled menu data is rewritten, whatever the engine does next is wasted
//! work, so a watcher on the compiled-scripts directory interrupts the pass
//! at that point. The watcher callback runs on its own thread and shares
//! exactly two things with the session: the compiled flag (atomic) and the
//! cancellation signal. Killing the process stays with the task that owns
//! the handle.

pub mod args;
pub mod engine;
pub mod hooks;
pub mod merge;
pub mod subtitles;
pub mod watcher;
mod world;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tokio::sync::Notify;
use tracing::{info, warn};

use crate::config::Config;
use crate::consts::MENU_DAT;
use crate::vdfs::{ToggleError, VdfsCatalog, VdfsError, disable_archives, enable_archives};

use args::{ArgsContext, engine_args};
use engine::{EngineError, EngineLauncher, EngineProcess};
use hooks::{HookDispatcher, HookError, HookEvent, HookScope, HookStage, scopes_for};
use merge::{AssetMerger, MergeError, MergeMode};
use subtitles::{SubtitleError, SubtitleUpdater};
use watcher::{CompileWatcher, WatchError};

pub use world::validate_world;

/// The two staged test strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestMode {
  Quick,
  Full,
}

/// Per-run options, typically from the command line.
#[derive(Debug, Clone)]
pub struct SessionOptions {
  pub mode: TestMode,
  /// World to load; the configured default when absent.
  pub world: Option<String>,
  pub merge: MergeMode,
  pub windowed: bool,
  pub dev_mode: bool,
  pub no_audio: bool,
  pub no_menu: bool,
  pub skip_subtitles: bool,
  pub in_game_time: Option<String>,
}

impl SessionOptions {
  pub fn new(mode: TestMode) -> Self {
    SessionOptions {
      mode,
      world: None,
      merge: MergeMode::None,
      windowed: false,
      dev_mode: false,
      no_audio: false,
      no_menu: false,
      skip_subtitles: false,
      in_game_time: None,
    }
  }
}

/// External collaborators a session drives.
pub struct SessionDeps {
  pub catalog: Arc<dyn VdfsCatalog>,
  pub launcher: Arc<dyn EngineLauncher>,
  pub watcher: Box<dyn CompileWatcher>,
  pub hooks: Arc<dyn HookDispatcher>,
  pub merger: Arc<dyn AssetMerger>,
  pub subtitles: Arc<dyn SubtitleUpdater>,
}

/// Summary of a finished session.
#[derive(Debug)]
pub struct SessionReport {
  pub world: String,
  pub passes: usize,
  pub archives_toggled: usize,
  pub first_pass_interrupted: bool,
}

/// Errors that end a session. None of these are retried.
#[derive(Debug, Error)]
pub enum SessionError {
  #[error("required archive {name} is missing, reinstall the game")]
  RequiredArchiveMissing { name: String },

  #[error("world file not found: {world}")]
  WorldNotFound { world: String },

  #[error("engine pass exceeded {secs}s")]
  EngineTimeout { secs: u64 },

  #[error("failed to prepare {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error(transparent)]
  Vdfs(#[from] VdfsError),

  #[error(transparent)]
  Toggle(#[from] ToggleError),

  #[error(transparent)]
  Hook(#[from] HookError),

  #[error(transparent)]
  Engine(#[from] EngineError),

  #[error(transparent)]
  Watch(#[from] WatchError),

  #[error(transparent)]
  Merge(#[from] MergeError),

  #[error(transparent)]
  Subtitles(#[from] SubtitleError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PassOutcome {
  Completed,
  Interrupted,
}

/// The orchestrator. Owns all mutable session state.
pub struct TestSession {
  config: Config,
  options: SessionOptions,
  scopes: [HookScope; 3],
  assets_compiled: Arc<AtomicBool>,
  disabled_archives: Vec<PathBuf>,
}

impl TestSession {
  pub fn new(config: Config, options: SessionOptions) -> Self {
    let scopes = scopes_for(options.mode);
    TestSession {
      config,
      options,
      scopes,
      assets_compiled: Arc::new(AtomicBool::new(false)),
      disabled_archives: Vec::new(),
    }
  }

  /// Drive the session to completion.
  pub async fn run(mut self, deps: &mut SessionDeps) -> Result<SessionReport, SessionError> {
    let dirs = self.config.dirs();
    let world = self
      .options
      .world
      .clone()
      .unwrap_or_else(|| self.config.mod_files.default_world.clone());

    info!(mode = ?self.options.mode, world, "starting test session");

    // Fail fast: nothing external has launched yet.
    validate_world(
      &dirs,
      self.config.game.version,
      &self.config.mod_files.assets,
      &world,
      deps.catalog.as_ref(),
    )?;

    if self.options.merge != MergeMode::None {
      self.run_hooks(deps, HookStage::Pre, HookEvent::AssetsMerge).await?;
      deps.merger.merge(self.options.merge).await?;
      self.run_hooks(deps, HookStage::Post, HookEvent::AssetsMerge).await?;
    }

    if self.options.merge.includes_scripts() && !self.options.skip_subtitles {
      self.run_hooks(deps, HookStage::Pre, HookEvent::SubtitlesUpdate).await?;
      deps.subtitles.update().await?;
      self.run_hooks(deps, HookStage::Post, HookEvent::SubtitlesUpdate).await?;
    }

    if self.options.mode == TestMode::Full {
      self.disabled_archives = disable_archives(&dirs.data(), deps.catalog.as_ref())?;
    }
    let archives_toggled = self.disabled_archives.len();

    let compiled_dir = dirs.compiled_scripts();
    std::fs::create_dir_all(&compiled_dir).map_err(|source| SessionError::Io {
      path: compiled_dir.clone(),
      source,
    })?;

    // Cancellation signal shared with the watcher thread. The callback only
    // flags; the kill happens here, on the task owning the handle.
    let cancel = Arc::new(Notify::new());
    {
      let assets_compiled = Arc::clone(&self.assets_compiled);
      let cancel = Arc::clone(&cancel);
      let armed = self.options.mode == TestMode::Full;
      deps.watcher.start(
        &compiled_dir,
        Box::new(move |path| {
          let is_menu = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.eq_ignore_ascii_case(MENU_DAT));
          if is_menu && armed && !assets_compiled.load(Ordering::SeqCst) {
            cancel.notify_one();
          }
        }),
      )?;
    }

    let outcome = self
      .run_passes(deps, &dirs.data(), &world, &compiled_dir, &cancel)
      .await;

    deps.watcher.stop();

    // A failed pass must not leave archives disabled for the rest of the
    // run; whatever this restore cannot fix stays in the on-disk journal.
    if !self.disabled_archives.is_empty() {
      if let Err(restore) = enable_archives(&dirs.data(), &mut self.disabled_archives) {
        warn!(error = %restore, "failed to restore archives after aborted session");
      }
    }

    let (passes, first_pass_interrupted) = outcome?;
    info!(passes, archives_toggled, "test session finished");

    Ok(SessionReport {
      world,
      passes,
      archives_toggled,
      first_pass_interrupted,
    })
  }

  async fn run_passes(
    &mut self,
    deps: &SessionDeps,
    data_dir: &Path,
    world: &str,
    compiled_dir: &Path,
    cancel: &Notify,
  ) -> Result<(usize, bool), SessionError> {
    let first_args = engine_args(&self.args_context(world, true, compiled_dir));
    let outcome = self.run_pass(deps, &first_args, Some(cancel)).await?;
    self.assets_compiled.store(true, Ordering::SeqCst);

    let first_pass_interrupted = outcome == PassOutcome::Interrupted;
    if first_pass_interrupted {
      info!("first pass interrupted after asset compilation");
    }

    let mut passes = 1;
    if self.options.mode == TestMode::Full {
      enable_archives(data_dir, &mut self.disabled_archives)?;

      let second_args = engine_args(&self.args_context(world, false, compiled_dir));
      self.run_pass(deps, &second_args, None).await?;
      passes = 2;
    }

    Ok((passes, first_pass_interrupted))
  }

  async fn run_hooks(
    &self,
    deps: &SessionDeps,
    stage: HookStage,
    event: HookEvent,
  ) -> Result<(), SessionError> {
    for scope in self.scopes {
      deps.hooks.dispatch(scope, stage, event).await?;
    }
    Ok(())
  }

  async fn run_pass(
    &self,
    deps: &SessionDeps,
    args: &[String],
    cancel: Option<&Notify>,
  ) -> Result<PassOutcome, SessionError> {
    let mut proc = deps.launcher.launch(args).await?;

    match self.config.test.engine_timeout() {
      Some(limit) => match tokio::time::timeout(limit, wait_or_cancel(proc.as_mut(), cancel)).await
      {
        Ok(outcome) => Ok(outcome?),
        Err(_) => {
          warn!(secs = limit.as_secs(), "engine pass timed out, terminating");
          let _ = proc.kill().await;
          Err(SessionError::EngineTimeout {
            secs: limit.as_secs(),
          })
        }
      },
      None => Ok(wait_or_cancel(proc.as_mut(), cancel).await?),
    }
  }

  fn args_context<'a>(
    &'a self,
    world: &'a str,
    first_pass: bool,
    compiled_dir: &'a std::path::Path,
  ) -> ArgsContext<'a> {
    ArgsContext {
      mode: self.options.mode,
      first_pass,
      world,
      windowed: self.options.windowed,
      dev_mode: self.options.dev_mode,
      no_audio: self.options.no_audio,
      no_menu: self.options.no_menu,
      in_game_time: self.options.in_game_time.as_deref(),
      compiled_scripts_dir: compiled_dir,
    }
  }
}

/// Await process exit, or kill it when the cancellation signal fires first.
/// The kill happens at most once per pass; passes without a signal never
/// cancel.
async fn wait_or_cancel(
  proc: &mut dyn EngineProcess,
  cancel: Option<&Notify>,
) -> Result<PassOutcome, EngineError> {
  let cancelled = match cancel {
    Some(cancel) => {
      tokio::select! {
        res = proc.wait() => {
          res?;
          false
        }
        _ = cancel.notified() => true,
      }
    }
    None => {
      proc.wait().await?;
      false
    }
  };

  if cancelled {
    proc.kill().await?;
    Ok(PassOutcome::Interrupted)
  } else {
    Ok(PassOutcome::Completed)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::{GameConfig, GameDirs, GameVersion, ModConfig, TestConfig};
  use crate::consts::{ANIMS_ENTRY, WORLDS_ARCHIVE};
  use crate::vdfs::VdfsEntry;
  use async_trait::async_trait;
  use std::collections::HashMap;
  use std::path::Path;
  use std::sync::Mutex;
  use std::sync::atomic::AtomicUsize;
  use super::watcher::WatchSink;
  use tempfile::TempDir;

  struct FixedCatalog(HashMap<PathBuf, Vec<VdfsEntry>>);

  impl VdfsCatalog for FixedCatalog {
    fn entries(&self, archive: &Path) -> Result<Vec<VdfsEntry>, VdfsError> {
      Ok(self.0.get(archive).cloned().unwrap_or_default())
    }
  }

  #[derive(Default)]
  struct RecordingHooks {
    calls: Mutex<Vec<(HookScope, HookStage, HookEvent)>>,
    fail: bool,
  }

  #[async_trait]
  impl HookDispatcher for RecordingHooks {
    async fn dispatch(
      &self,
      scope: HookScope,
      stage: HookStage,
      event: HookEvent,
    ) -> Result<(), HookError> {
      self.calls.lock().unwrap().push((scope, stage, event));
      if self.fail {
        return Err(HookError::CommandFailed {
          command: "hook".to_string(),
          code: Some(1),
        });
      }
      Ok(())
    }
  }

  #[derive(Default)]
  struct RecordingMerger {
    calls: Mutex<Vec<MergeMode>>,
  }

  #[async_trait]
  impl AssetMerger for RecordingMerger {
    async fn merge(&self, mode: MergeMode) -> Result<(), MergeError> {
      self.calls.lock().unwrap().push(mode);
      Ok(())
    }
  }

  #[derive(Default)]
  struct RecordingSubtitles {
    updates: AtomicUsize,
  }

  #[async_trait]
  impl SubtitleUpdater for RecordingSubtitles {
    async fn update(&self) -> Result<usize, SubtitleError> {
      self.updates.fetch_add(1, Ordering::SeqCst);
      Ok(0)
    }
  }

  /// Watcher whose sink the test fires by hand.
  #[derive(Clone, Default)]
  struct ManualWatcher {
    sink: Arc<Mutex<Option<WatchSink>>>,
  }

  impl ManualWatcher {
    fn fire(&self, path: &Path) {
      if let Some(sink) = self.sink.lock().unwrap().as_ref() {
        sink(path);
      }
    }

    fn started(&self) -> bool {
      self.sink.lock().unwrap().is_some()
    }
  }

  impl CompileWatcher for ManualWatcher {
    fn start(&mut self, _dir: &Path, sink: WatchSink) -> Result<(), WatchError> {
      *self.sink.lock().unwrap() = Some(sink);
      Ok(())
    }

    fn stop(&mut self) {
      // Keep the sink registered so tests can assert late events are inert.
    }
  }

  struct FakeLauncher {
    calls: Arc<Mutex<Vec<Vec<String>>>>,
    kill_count: Arc<AtomicUsize>,
    hang_first: bool,
  }

  impl FakeLauncher {
    fn new(hang_first: bool) -> Self {
      FakeLauncher {
        calls: Arc::new(Mutex::new(Vec::new())),
        kill_count: Arc::new(AtomicUsize::new(0)),
        hang_first,
      }
    }
  }

  #[async_trait]
  impl EngineLauncher for FakeLauncher {
    async fn launch(&self, args: &[String]) -> Result<Box<dyn EngineProcess>, EngineError> {
      let count = {
        let mut calls = self.calls.lock().unwrap();
        calls.push(args.to_vec());
        calls.len()
      };

      if self.hang_first && count == 1 {
        Ok(Box::new(HangingProcess {
          exited: Arc::new(Notify::new()),
          kill_count: Arc::clone(&self.kill_count),
        }))
      } else {
        Ok(Box::new(ExitedProcess))
      }
    }
  }

  struct ExitedProcess;

  #[async_trait]
  impl EngineProcess for ExitedProcess {
    async fn wait(&mut self) -> Result<Option<i32>, EngineError> {
      Ok(Some(0))
    }

    async fn kill(&mut self) -> Result<(), EngineError> {
      Ok(())
    }
  }

  struct HangingProcess {
    exited: Arc<Notify>,
    kill_count: Arc<AtomicUsize>,
  }

  #[async_trait]
  impl EngineProcess for HangingProcess {
    async fn wait(&mut self) -> Result<Option<i32>, EngineError> {
      self.exited.notified().await;
      Ok(None)
    }

    async fn kill(&mut self) -> Result<(), EngineError> {
      self.kill_count.fetch_add(1, Ordering::SeqCst);
      self.exited.notify_one();
      Ok(())
    }
  }

  struct Fixture {
    _game: TempDir,
    config: Config,
    catalog: HashMap<PathBuf, Vec<VdfsEntry>>,
  }

  fn fixture() -> Fixture {
    let game = TempDir::new().unwrap();
    let dirs = GameDirs::new(game.path());
    std::fs::create_dir_all(dirs.data()).unwrap();

    let worlds = dirs.data().join(WORLDS_ARCHIVE);
    std::fs::write(&worlds, b"").unwrap();
    let mut catalog = HashMap::new();
    catalog.insert(worlds, vec![VdfsEntry::file("WORLD.ZEN")]);

    let config = Config {
      game: GameConfig {
        directory: game.path().to_path_buf(),
        version: GameVersion::Gothic1,
      },
      mod_files: ModConfig {
        assets: vec![game.path().to_path_buf()],
        scripts: PathBuf::from("Scripts/Gothic.src"),
        default_world: "WORLD.ZEN".to_string(),
      },
      test: TestConfig::default(),
      hooks: Vec::new(),
    };

    Fixture {
      _game: game,
      config,
      catalog,
    }
  }

  /// Add an archive the catalog reports as carrying animation data.
  fn add_anims_archive(fixture: &mut Fixture, name: &str) -> PathBuf {
    let path = fixture.config.dirs().data().join(name);
    std::fs::write(&path, b"").unwrap();
    fixture
      .catalog
      .insert(path.clone(), vec![VdfsEntry::dir(ANIMS_ENTRY)]);
    path
  }

  struct Handles {
    hooks: Arc<RecordingHooks>,
    merger: Arc<RecordingMerger>,
    subtitles: Arc<RecordingSubtitles>,
    launcher_calls: Arc<Mutex<Vec<Vec<String>>>>,
    kill_count: Arc<AtomicUsize>,
    watcher: ManualWatcher,
  }

  fn deps(fixture: &Fixture, hang_first: bool, fail_hooks: bool) -> (SessionDeps, Handles) {
    let hooks = Arc::new(RecordingHooks {
      calls: Mutex::new(Vec::new()),
      fail: fail_hooks,
    });
    let merger = Arc::new(RecordingMerger::default());
    let subtitles = Arc::new(RecordingSubtitles::default());
    let launcher = Arc::new(FakeLauncher::new(hang_first));
    let watcher = ManualWatcher::default();

    let handles = Handles {
      hooks: Arc::clone(&hooks),
      merger: Arc::clone(&merger),
      subtitles: Arc::clone(&subtitles),
      launcher_calls: Arc::clone(&launcher.calls),
      kill_count: Arc::clone(&launcher.kill_count),
      watcher: watcher.clone(),
    };

    let deps = SessionDeps {
      catalog: Arc::new(FixedCatalog(fixture.catalog.clone())),
      launcher,
      watcher: Box::new(watcher),
      hooks,
      merger,
      subtitles,
    };

    (deps, handles)
  }

  #[tokio::test]
  async fn quick_mode_runs_a_single_normal_pass() {
    let fixture = fixture();
    let (mut deps, handles) = deps(&fixture, false, false);

    let session = TestSession::new(fixture.config.clone(), SessionOptions::new(TestMode::Quick));
    let report = session.run(&mut deps).await.unwrap();

    assert_eq!(report.passes, 1);
    assert_eq!(report.archives_toggled, 0);
    assert!(!report.first_pass_interrupted);
    assert_eq!(report.world, "WORLD.ZEN");

    let calls = handles.launcher_calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].contains(&"-3d:WORLD.ZEN".to_string()));
    assert!(!calls[0].contains(&"-zconvertall".to_string()));
  }

  #[tokio::test]
  async fn full_mode_toggles_archives_and_runs_two_passes() {
    let mut fixture = fixture();
    let anims = add_anims_archive(&mut fixture, "anims.vdf");
    let (mut deps, handles) = deps(&fixture, false, false);

    let session = TestSession::new(fixture.config.clone(), SessionOptions::new(TestMode::Full));
    let report = session.run(&mut deps).await.unwrap();

    assert_eq!(report.passes, 2);
    assert_eq!(report.archives_toggled, 1);
    // Restored to its original extension after the first pass.
    assert!(anims.is_file());

    let calls = handles.launcher_calls.lock().unwrap();
    assert_eq!(calls.len(), 2);
    assert!(calls[0].contains(&"-zconvertall".to_string()));
    assert!(calls[0].contains(&"-3d:none".to_string()));
    assert!(calls[1].contains(&"-3d:WORLD.ZEN".to_string()));
    assert!(!calls[1].contains(&"-zconvertall".to_string()));
  }

  #[tokio::test]
  async fn hooks_fan_out_in_scope_order_around_merge_and_subtitles() {
    let fixture = fixture();
    let (mut deps, handles) = deps(&fixture, false, false);

    let mut options = SessionOptions::new(TestMode::Quick);
    options.merge = MergeMode::All;
    let session = TestSession::new(fixture.config.clone(), options);
    session.run(&mut deps).await.unwrap();

    let calls = handles.hooks.calls.lock().unwrap();
    let expected_scopes = [HookScope::Common, HookScope::Test, HookScope::QuickTest];

    // PRE merge, POST merge, PRE subtitles, POST subtitles, three scopes each.
    assert_eq!(calls.len(), 12);
    for (i, (scope, stage, event)) in calls.iter().enumerate() {
      assert_eq!(*scope, expected_scopes[i % 3]);
      let (want_stage, want_event) = match i / 3 {
        0 => (HookStage::Pre, HookEvent::AssetsMerge),
        1 => (HookStage::Post, HookEvent::AssetsMerge),
        2 => (HookStage::Pre, HookEvent::SubtitlesUpdate),
        _ => (HookStage::Post, HookEvent::SubtitlesUpdate),
      };
      assert_eq!(*stage, want_stage);
      assert_eq!(*event, want_event);
    }

    assert_eq!(*handles.merger.calls.lock().unwrap(), vec![MergeMode::All]);
    assert_eq!(handles.subtitles.updates.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn skip_subtitles_flag_suppresses_the_stage() {
    let fixture = fixture();
    let (mut deps, handles) = deps(&fixture, false, false);

    let mut options = SessionOptions::new(TestMode::Quick);
    options.merge = MergeMode::Scripts;
    options.skip_subtitles = true;
    let session = TestSession::new(fixture.config.clone(), options);
    session.run(&mut deps).await.unwrap();

    assert_eq!(handles.subtitles.updates.load(Ordering::SeqCst), 0);
    // Only the merge events fired.
    assert_eq!(handles.hooks.calls.lock().unwrap().len(), 6);
  }

  #[tokio::test]
  async fn hook_failure_aborts_before_the_merge_runs() {
    let fixture = fixture();
    let (mut deps, handles) = deps(&fixture, false, true);

    let mut options = SessionOptions::new(TestMode::Quick);
    options.merge = MergeMode::All;
    let session = TestSession::new(fixture.config.clone(), options);

    let err = session.run(&mut deps).await.unwrap_err();
    assert!(matches!(err, SessionError::Hook(_)));
    assert!(handles.merger.calls.lock().unwrap().is_empty());
    assert!(handles.launcher_calls.lock().unwrap().is_empty());
  }

  #[tokio::test]
  async fn unknown_world_aborts_before_anything_launches() {
    let fixture = fixture();
    let (mut deps, handles) = deps(&fixture, false, false);

    let mut options = SessionOptions::new(TestMode::Full);
    options.world = Some("GHOST.ZEN".to_string());
    let session = TestSession::new(fixture.config.clone(), options);

    let err = session.run(&mut deps).await.unwrap_err();
    assert!(matches!(err, SessionError::WorldNotFound { .. }));
    assert!(handles.launcher_calls.lock().unwrap().is_empty());
  }

  #[tokio::test]
  async fn menu_rewrite_interrupts_the_first_full_pass_exactly_once() {
    let mut fixture = fixture();
    add_anims_archive(&mut fixture, "anims.vdf");
    let (mut deps, handles) = deps(&fixture, true, false);

    let config = fixture.config.clone();
    let menu = config.dirs().compiled_scripts().join(MENU_DAT);
    let session = TestSession::new(config, SessionOptions::new(TestMode::Full));
    let run = tokio::spawn(async move { session.run(&mut deps).await });

    // Wait for the first pass to be underway.
    for _ in 0..1000 {
      if handles.watcher.started() && handles.launcher_calls.lock().unwrap().len() == 1 {
        break;
      }
      tokio::task::yield_now().await;
    }

    // Two rewrites in a row; only one kill may result.
    handles.watcher.fire(&menu);
    handles.watcher.fire(&menu);

    let report = run.await.unwrap().unwrap();
    assert!(report.first_pass_interrupted);
    assert_eq!(report.passes, 2);
    assert_eq!(handles.kill_count.load(Ordering::SeqCst), 1);

    // The session is over and assets are compiled; late events are inert.
    handles.watcher.fire(&menu);
    assert_eq!(handles.kill_count.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn menu_rewrite_never_interrupts_a_quick_pass() {
    let fixture = fixture();
    let (mut deps, handles) = deps(&fixture, false, false);

    let menu = fixture.config.dirs().compiled_scripts().join(MENU_DAT);
    let session = TestSession::new(fixture.config.clone(), SessionOptions::new(TestMode::Quick));
    let report = session.run(&mut deps).await.unwrap();

    handles.watcher.fire(&menu);
    assert_eq!(handles.kill_count.load(Ordering::SeqCst), 0);
    assert!(!report.first_pass_interrupted);
  }

  #[tokio::test]
  async fn failed_pass_still_restores_archives() {
    let mut fixture = fixture();
    fixture.config.test = TestConfig {
      engine_timeout_secs: Some(0),
    };
    let anims = add_anims_archive(&mut fixture, "anims.vdf");
    let (mut deps, _handles) = deps(&fixture, true, false);

    let session = TestSession::new(fixture.config.clone(), SessionOptions::new(TestMode::Full));
    let err = session.run(&mut deps).await.unwrap_err();

    assert!(matches!(err, SessionError::EngineTimeout { .. }));
    // The archive went back to .vdf within the same run.
    assert!(anims.is_file());
  }

  #[tokio::test]
  async fn hung_engine_times_out() {
    let mut fixture = fixture();
    fixture.config.test = TestConfig {
      engine_timeout_secs: Some(0),
    };
    let (mut deps, handles) = deps(&fixture, true, false);

    let session = TestSession::new(fixture.config.clone(), SessionOptions::new(TestMode::Quick));
    let err = session.run(&mut deps).await.unwrap_err();

    assert!(matches!(err, SessionError::EngineTimeout { .. }));
    assert_eq!(handles.kill_count.load(Ordering::SeqCst), 1);
  }
}
