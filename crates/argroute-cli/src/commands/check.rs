use anyhow::Result;
use colored::Colorize;
use std::path::Path;
use std::process::ExitCode;

use crate::config::Manifest;

pub fn execute(manifest: &Path, strict: bool) -> Result<ExitCode> {
    let table = Manifest::load(manifest)?.build_table()?;
    let diagnostics = table.validate();

    println!(
        "{} {} route(s) compiled from {}",
        "✓".green().bold(),
        table.len(),
        manifest.display()
    );

    if diagnostics.is_empty() {
        return Ok(ExitCode::SUCCESS);
    }

    for diagnostic in &diagnostics {
        println!("{} {}", "warning:".yellow().bold(), diagnostic);
    }

    if strict {
        eprintln!(
            "{}",
            format!("{} overlap warning(s)", diagnostics.len())
                .red()
                .bold()
        );
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}
