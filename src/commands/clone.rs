use crate::commands::init::build_engine;
use crate::core::Result;
use std::path::PathBuf;

pub fn execute_clone(root: Option<PathBuf>, url: &str) -> Result<()> {
    let engine = build_engine(root)?;
    engine.clone_checkout(url)
}
