//! Engine argument construction.
//!
//! A pure function of session state and configuration. The first pass of a
//! Full session runs the engine in bulk-conversion mode (`-zconvertall` and
//! friends, no world); every other pass loads the selected world.

use std::path::Path;

use crate::consts::{MUSIC_DAT, SFX_DAT};

use super::TestMode;

/// Inputs to argument construction.
#[derive(Debug, Clone)]
pub struct ArgsContext<'a> {
  pub mode: TestMode,
  pub first_pass: bool,
  pub world: &'a str,
  pub windowed: bool,
  pub dev_mode: bool,
  pub no_audio: bool,
  pub no_menu: bool,
  pub in_game_time: Option<&'a str>,
  pub compiled_scripts_dir: &'a Path,
}

impl ArgsContext<'_> {
  fn bulk_conversion(&self) -> bool {
    self.mode == TestMode::Full && self.first_pass
  }
}

/// Build the engine parameter list for one pass.
pub fn engine_args(ctx: &ArgsContext<'_>) -> Vec<String> {
  let mut args = Vec::new();

  args.push(flag("zreparse"));

  if ctx.windowed || ctx.bulk_conversion() {
    args.push(flag("zwindow"));
  }

  if let Some(time) = ctx.in_game_time {
    args.push(keyed("time", time));
  }

  args.push(keyed("vdfs", "physicalfirst"));

  if ctx.dev_mode {
    args.push(flag("devmode"));
  }

  if ctx.bulk_conversion() {
    args.push(keyed("3d", "none"));
    args.push(flag("zconvertall"));
    args.push(flag("ztexconvert"));
    args.push(flag("nomenu"));
    args.push(flag("zautoconvertdata"));
  } else {
    args.push(keyed("3d", ctx.world));
  }

  if ctx.no_audio {
    if ctx.compiled_scripts_dir.join(MUSIC_DAT).is_file() {
      args.push(flag("znomusic"));
    }
    if ctx.compiled_scripts_dir.join(SFX_DAT).is_file() {
      args.push(flag("znosound"));
    }
  }

  if ctx.no_menu {
    args.push(flag("nomenu"));
  }

  args
}

fn flag(name: &str) -> String {
  format!("-{name}")
}

fn keyed(name: &str, value: &str) -> String {
  format!("-{name}:{value}")
}
