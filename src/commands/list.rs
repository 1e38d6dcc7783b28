use crate::commands::init::build_engine;
use crate::core::Result;
use colored::*;
use std::path::PathBuf;

pub fn execute_list(root: Option<PathBuf>) -> Result<()> {
    let engine = build_engine(root)?;
    engine.inspect_all();

    let records = engine.list_checkouts();
    if records.is_empty() {
        println!("\n{}\n", "No tracked checkouts found.".white());
        return Ok(());
    }

    println!("\n{}:\n", "Tracked checkouts".white());
    for record in &records {
        let divergence = if record.behind_ahead.is_empty() {
            String::new()
        } else {
            format!(" {}{}{}", "(".bright_black(), record.behind_ahead.white(), ")".bright_black())
        };
        let commit = if record.current_commit.is_empty() {
            "-".bright_black().to_string()
        } else {
            record.current_commit.blue().to_string()
        };
        println!(
            "  {} {} {}{}",
            record.name.white(),
            commit,
            record.current_branch.green(),
            divergence
        );
        if record.uncommitted_change_count > 0 {
            println!(
                "    {} {} uncommitted changes",
                "!".yellow(),
                record.uncommitted_change_count
            );
        }
    }

    let manual = engine.list_manual_checkouts();
    if !manual.is_empty() {
        println!("\n{}:\n", "Manual checkouts (not synchronized)".white());
        for name in manual {
            println!("  {}", name.bright_black());
        }
    }
    println!();

    Ok(())
}
