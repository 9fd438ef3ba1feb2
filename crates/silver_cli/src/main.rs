//! Command-line front end for outline documents.
//!
//! # Responsibility
//! - Inspect, validate and reformat `.silver` files without a UI.
//! - Map flags and environment variables onto core logging setup.
//!
//! # Invariants
//! - Failures print one line to stderr and exit with status 1.
//! - `fmt` rewrites the file atomically; a failed decode leaves it untouched.

use clap::{Parser, Subcommand};
use log::info;
use silver_core::{
    core_version, default_log_level, init_logging, read_tree, write_tree, BulletTree,
    LoggingConfig,
};
use std::error::Error;
use std::path::PathBuf;
use std::process;

const INDENT: &str = "  ";

/// Outline document tool.
#[derive(Parser, Debug)]
#[command(name = "silver")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log level for file logging (trace|debug|info|warn|error)
    #[arg(long, global = true, env = "SILVER_LOG_LEVEL")]
    log_level: Option<String>,

    /// Absolute directory for rolling log files; logging is off without it
    #[arg(long, global = true, env = "SILVER_LOG_DIR")]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the outline, indented two spaces per level
    Show {
        /// Document file
        file: PathBuf,
    },
    /// Decode and validate a document, then print its shape
    Check {
        /// Document file
        file: PathBuf,
    },
    /// Rewrite a document in canonical form
    Fmt {
        /// Document file
        file: PathBuf,
    },
    /// Print the core library version
    Version,
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    setup_logging(cli.log_level.as_deref(), cli.log_dir.as_deref())?;

    match cli.command {
        Command::Show { file } => {
            let tree = read_tree(&file)?;
            for line in render_outline(&tree) {
                println!("{line}");
            }
        }
        Command::Check { file } => {
            let tree = read_tree(&file)?;
            tree.validate()?;
            println!("bullets={} max_depth={}", tree.len(), max_depth(&tree));
        }
        Command::Fmt { file } => {
            let tree = read_tree(&file)?;
            write_tree(&file, &tree)?;
            info!("event=cli_fmt module=cli status=ok bullets={}", tree.len());
        }
        Command::Version => println!("silver_core version={}", core_version()),
    }
    Ok(())
}

fn setup_logging(level: Option<&str>, log_dir: Option<&str>) -> Result<(), Box<dyn Error>> {
    let Some(log_dir) = log_dir else {
        return Ok(());
    };
    let level = level.map_or_else(|| default_log_level().to_string(), str::to_string);
    init_logging(&LoggingConfig::new(&level, log_dir)?)?;
    Ok(())
}

fn render_outline(tree: &BulletTree) -> Vec<String> {
    tree.iter()
        .map(|item| format!("{}- {}", INDENT.repeat(item.level), item.bullet.content()))
        .collect()
}

/// Number of levels in use; 0 for an empty tree.
fn max_depth(tree: &BulletTree) -> usize {
    tree.iter().map(|item| item.level + 1).max().unwrap_or(0)
}
