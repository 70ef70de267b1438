//! modforge-lib: Core types and logic for modforge
//!
//! This crate implements build/test orchestration for Gothic-engine mods:
//! - `scripts`: resolution of `.src` include files into a flat script list
//! - `vdfs`: read-only archive catalogs and archive enable/disable toggling
//! - `session`: the staged test session that drives the engine process
//! - `config`: the declarative YAML mod configuration

pub mod config;
pub mod consts;
pub mod scripts;
pub mod session;
pub mod vdfs;
