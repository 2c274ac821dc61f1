//! Command-line interface definitions.
//!
//! Defines all CLI arguments using clap.

use clap::Parser;
use std::path::PathBuf;

/// Assemble static pages from blueprints and components
#[derive(Parser, Debug, Clone, Default)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Project root directory; other paths are relative to it
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Source directory holding `blueprints/` and `components/`
    #[arg(short, long)]
    pub source: Option<PathBuf>,

    /// Output directory path
    #[arg(short = 't', long = "target")]
    pub output: Option<PathBuf>,

    /// Config file name (default: site.toml)
    #[arg(short = 'C', long, default_value = "site.toml")]
    pub config: PathBuf,

    /// Remove the output directory before building
    #[arg(long)]
    pub clean: bool,

    /// Minify the html content
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub minify: Option<bool>,

    /// Only print errors
    #[arg(short, long)]
    pub quiet: bool,
}
