use crate::commands::init::build_engine;
use crate::core::Result;
use colored::*;
use std::io::{self, Write};
use std::path::PathBuf;

pub fn execute_delete(root: Option<PathBuf>, name: &str, yes: bool) -> Result<()> {
    let engine = build_engine(root)?;

    if !yes && !confirm_delete(name) {
        println!("\nDelete aborted.\n");
        return Ok(());
    }

    engine.delete(name)
}

fn confirm_delete(name: &str) -> bool {
    print!(
        "{} ",
        format!("Permanently delete checkout '{name}'? [y/N]:").blue()
    );
    io::stdout().flush().ok();

    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return false;
    }
    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}
