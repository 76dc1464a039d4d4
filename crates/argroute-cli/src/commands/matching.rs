use anyhow::Result;
use argroute::MatchResult;
use colored::Colorize;
use std::path::Path;
use std::process::ExitCode;

use crate::config::Manifest;

/// Exit code when no route accepts the arguments
const NO_MATCH: u8 = 1;
/// Exit code when the selected route rejects a value
const CONVERSION_FAILED: u8 = 2;

pub fn execute(manifest: &Path, args: &[String]) -> Result<ExitCode> {
    let table = Manifest::load(manifest)?.build_table()?;

    let route_match = match table.match_args(args) {
        Ok(MatchResult::Matched(m)) => m,
        Ok(MatchResult::NoMatch) => {
            eprintln!("{} {}", "no match:".red().bold(), args.join(" "));
            return Ok(ExitCode::from(NO_MATCH));
        }
        Err(err) => {
            eprintln!("{} {}", "error:".red().bold(), err);
            return Ok(ExitCode::from(CONVERSION_FAILED));
        }
    };

    println!("{} {}", "matched".green().bold(), route_match.pattern());
    if let Some(canonical) = &route_match.route.alias_of {
        println!("  {} {}", "alias of".dimmed(), canonical);
    }

    let mut names: Vec<_> = route_match.values.keys().collect();
    names.sort();
    for name in names {
        let marker = if route_match.is_present(name) { "*" } else { " " };
        println!(
            " {}{} = {}",
            marker.green(),
            name.cyan(),
            route_match.values[name]
        );
    }

    Ok(ExitCode::SUCCESS)
}
