//! Shared engine construction for the CLI commands.
//!
//! Every subcommand builds the engine the same way: resolve the root folder
//! from the `--root` flag or the persisted host configuration, then construct
//! the engine with a console sink. The engine is created explicitly here and
//! handed to each command; there is no ambient global instance.

use crate::core::{ConsoleSink, Result, SyncConfig, SyncEngine};
use std::path::PathBuf;
use std::sync::Arc;

pub fn build_engine(root_override: Option<PathBuf>) -> Result<SyncEngine> {
    let root = match root_override {
        Some(root) => root,
        None => SyncConfig::load_or_create()?.root,
    };
    SyncEngine::new(root, Arc::new(ConsoleSink))
}
