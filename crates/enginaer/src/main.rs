//! enginaer CLI - static site generator for Markdown pages.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;
mod files;

#[derive(Parser)]
#[command(name = "enginaer")]
#[command(about = "Static site generator for Markdown pages with front matter")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to enginaer.toml config file
    #[arg(short, long, default_value = config::CONFIG_FILE, global = true)]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Add a site option, e.g. --define env=production
    #[arg(short = 'D', long = "define", value_name = "KEY=VALUE", value_parser = config::parse_define, global = true)]
    defines: Vec<(String, String)>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter site in the current directory
    Init {
        /// Overwrite existing files
        #[arg(short, long)]
        yes: bool,
    },

    /// Build the static site
    Build {
        /// Output directory (defaults to config or "dist")
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    match cli.command {
        Commands::Init { yes } => {
            commands::init::run(yes)?;
        }
        Commands::Build { output } => {
            commands::build::run(&cli.config, output, &cli.defines)?;
        }
    }

    Ok(())
}
