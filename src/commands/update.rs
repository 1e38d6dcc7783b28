use crate::commands::init::build_engine;
use crate::core::Result;
use std::path::PathBuf;

pub fn execute_update(root: Option<PathBuf>, name: &str) -> Result<()> {
    let engine = build_engine(root)?;
    engine.update(name)
}
