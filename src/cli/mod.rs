//! CLI command definitions for aitag-settings
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum FormatArg {
    /// Human-readable markdown (default)
    #[default]
    Markdown,
    /// Machine-readable JSON
    Json,
}

/// Resolve AI tagging settings from tag_settings.csv
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Directory holding tag_settings.csv (overrides config)
    #[arg(long, global = true, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Directory holding the bundled template (overrides config)
    #[arg(long, global = true, value_name = "DIR")]
    pub install_dir: Option<PathBuf>,

    /// Host SQLite database with plugin settings (overrides config)
    #[arg(long, global = true, value_name = "FILE")]
    pub settings_db: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    /// Output format
    #[arg(long, value_enum, default_value_t = FormatArg::Markdown, global = true)]
    pub format: FormatArg,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print resolved settings for one or more tags
    Resolve(ResolveArgs),

    /// List per-tag overrides
    Overrides,

    /// Show the global baseline, tag suffix and source file
    Show,

    /// Strictly validate the tag settings file
    Validate(ValidateArgs),
}

/// Arguments for the resolve subcommand
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Tag names to resolve
    #[arg(required = true, value_name = "TAG")]
    pub tags: Vec<String>,
}

/// Arguments for the validate subcommand
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// File to validate (default: the configured tag_settings.csv)
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_resolve() {
        let cli = Cli::try_parse_from(["aitag-settings", "resolve", "Blonde", "Redhead"]).unwrap();
        match cli.command {
            Command::Resolve(args) => assert_eq!(args.tags, vec!["Blonde", "Redhead"]),
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(cli.format, FormatArg::Markdown);
        assert_eq!(cli.log, "2");
    }

    #[test]
    fn test_resolve_requires_tag() {
        assert!(Cli::try_parse_from(["aitag-settings", "resolve"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "aitag-settings",
            "show",
            "--format",
            "json",
            "--config-dir",
            "/srv/aitag",
        ])
        .unwrap();
        assert_eq!(cli.format, FormatArg::Json);
        assert_eq!(cli.config_dir, Some(PathBuf::from("/srv/aitag")));
    }

    #[test]
    fn test_validate_optional_file() {
        let cli = Cli::try_parse_from(["aitag-settings", "validate", "custom.csv"]).unwrap();
        match cli.command {
            Command::Validate(args) => assert_eq!(args.file, Some(PathBuf::from("custom.csv"))),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
