mod commands;
mod config;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;

#[derive(Parser)]
#[command(name = "argroute")]
#[command(version, about = "Compile, check and try out command-line route manifests", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile every route and report overlapping ones
    Check {
        /// Route manifest (TOML)
        manifest: PathBuf,

        /// Fail when routes overlap
        #[arg(long)]
        strict: bool,
    },

    /// Match an argument vector against the manifest
    Match {
        /// Route manifest (TOML)
        manifest: PathBuf,

        /// Arguments to match, after `--`
        #[arg(last = true)]
        args: Vec<String>,
    },

    /// Print the help listing
    List {
        /// Route manifest (TOML)
        manifest: PathBuf,
    },
}

fn log_level(verbose: u8) -> Level {
    match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn init_logging(verbose: u8) {
    tracing_subscriber::fmt()
        .with_max_level(log_level(verbose))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<ExitCode> {
    // Parse CLI arguments
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Execute command
    match cli.command {
        Commands::Check { manifest, strict } => commands::check::execute(&manifest, strict),
        Commands::Match { manifest, args } => commands::matching::execute(&manifest, &args),
        Commands::List { manifest } => {
            commands::list::execute(&manifest)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_flag_levels() {
        assert_eq!(log_level(0), Level::WARN);
        assert_eq!(log_level(1), Level::DEBUG);
        assert_eq!(log_level(2), Level::TRACE);
        assert_eq!(log_level(5), Level::TRACE);
    }

    #[test]
    fn test_verbose_flag_counts() {
        let cli = Cli::try_parse_from(["argroute", "-vv", "list", "routes.toml"]).unwrap();
        assert_eq!(log_level(cli.verbose), Level::TRACE);

        let cli = Cli::try_parse_from(["argroute", "list", "routes.toml", "-v"]).unwrap();
        assert_eq!(log_level(cli.verbose), Level::DEBUG);
    }
}
