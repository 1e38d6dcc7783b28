use crate::commands::init::build_engine;
use crate::core::{RefreshOutcome, Result, SyncConfig};
use colored::*;
use std::io::{self, Write};
use std::path::PathBuf;

pub fn execute_refresh(root: Option<PathBuf>, yes: bool) -> Result<()> {
    let uses_config_root = root.is_none();
    let engine = build_engine(root)?;

    let confirm_restart = || {
        if yes {
            return true;
        }
        print!(
            "{} ",
            "A refresh is already running. Cancel it and restart? [y/N]:".blue()
        );
        io::stdout().flush().ok();

        let mut input = String::new();
        if io::stdin().read_line(&mut input).is_err() {
            return false;
        }
        matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
    };

    let outcome = engine.refresh_all(confirm_restart, |done, total| {
        println!(
            "  {}{}{}{}{} refreshed",
            "[".bright_black(),
            done.to_string().white(),
            "/".bright_black(),
            total.to_string().white(),
            "]".bright_black()
        );
    })?;

    match outcome {
        RefreshOutcome::Completed { completed, total } => {
            println!(
                "\n{} Refreshed {completed} of {total} checkouts\n",
                "✓".green()
            );
            if uses_config_root {
                let mut config = SyncConfig::load_or_create()?;
                config.mark_refreshed(chrono::Utc::now())?;
            }
        }
        RefreshOutcome::Cancelled { completed, total } => {
            println!(
                "\nRefresh cancelled after {completed} of {total} checkouts\n"
            );
        }
        RefreshOutcome::Declined => {
            println!("\nLeft the running refresh alone.\n");
        }
    }

    Ok(())
}
