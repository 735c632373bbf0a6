use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// QueryGuard - Lint SQL scripts against security and governance policies
#[derive(Parser, Debug)]
#[command(name = "queryguard")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// SQL file or directory to lint
    #[arg(required_unless_present = "list_rules")]
    pub path: Option<PathBuf>,

    /// Path to a TOML settings file
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Comma separated rule id prefixes to enable
    #[arg(long)]
    pub select: Option<String>,

    /// Comma separated rule id prefixes to disable
    #[arg(long)]
    pub ignore: Option<String>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub output: Option<Format>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// List available rules and exit
    #[arg(long)]
    pub list_rules: bool
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Format {
    Text,
    Json,
    Yaml
}
