mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

pub use commands::*;

#[derive(Parser)]
#[command(name = "repo-map")]
#[command(about = "Repository symbol map and usage analysis using ast-grep")]
#[command(version)]
#[command(after_long_help = r#"
EXAMPLES:
    # Build the map for the current directory
    repo-map map

    # Who imports formatDate from src/utils.js
    repo-map usages src/utils.js formatDate

    # Files importing a module
    repo-map dependents src/utils.js

    # Exports of files nothing imports
    repo-map unused --languages typescript

    # Import cycles as text
    repo-map cycles --format text

    # Supported languages and their extensions
    repo-map languages
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Repository root
    #[arg(long, global = true, default_value = ".")]
    pub root: PathBuf,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Languages or aliases to map (comma-separated); all detected by default
    #[arg(long, global = true, value_delimiter = ',')]
    pub languages: Vec<String>,

    /// Maximum files per language
    #[arg(long, global = true)]
    pub max_files: Option<usize>,

    /// Give up building after this many seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Path to the ast-grep binary
    #[arg(long, global = true)]
    pub matcher: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the repo map and print its status
    Map,

    /// Files importing a symbol from a file
    Usages {
        /// File defining the symbol, relative to the root
        file: String,

        /// Symbol name
        symbol: String,
    },

    /// Files importing a file
    Dependents {
        /// File relative to the root
        file: String,
    },

    /// Exports of non-entry-point files that nothing imports
    Unused,

    /// Base classes, services and factories unused outside their directory
    Orphans,

    /// File-level import graph
    Graph,

    /// Import cycles
    Cycles,

    /// Supported languages
    Languages,
}
