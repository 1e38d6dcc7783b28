use crate::commands::init::build_engine;
use crate::core::Result;
use std::path::PathBuf;

pub fn execute_switch(root: Option<PathBuf>, name: &str, branch: &str) -> Result<()> {
    let engine = build_engine(root)?;
    engine.switch_branch(name, branch)
}
