use anyhow::Result;
use argroute::RouteKind;
use colored::Colorize;
use std::path::Path;

use crate::config::Manifest;

pub fn execute(manifest: &Path) -> Result<()> {
    let entries = Manifest::load(manifest)?.build_table()?.help_entries();
    if entries.is_empty() {
        println!("{}", "No routes defined".yellow());
        return Ok(());
    }

    let width = entries.iter().map(|e| e.usage.len()).max().unwrap_or(0);

    for entry in &entries {
        let kind = match entry.kind {
            RouteKind::Unspecified => "",
            RouteKind::Query => "query",
            RouteKind::Command => "command",
            RouteKind::IdempotentCommand => "idempotent",
        };
        println!(
            "  {}  {}  {}",
            format!("{:<width$}", entry.usage, width = width).cyan().bold(),
            entry.description.as_deref().unwrap_or_default(),
            kind.dimmed()
        );
        for alias in &entry.aliases {
            println!("    {} {}", "alias:".dimmed(), alias);
        }
    }

    Ok(())
}
