//! aitag-settings
//!
//! Command-line front end for inspecting how AI tagging settings resolve
//! from `tag_settings.csv`.

use aitag_settings::cli::{Cli, Command, FormatArg};
use aitag_settings::config::{AppConfig, ConfigLoader};
use aitag_settings::format::{
    OutputFormat, configuration_json, format_configuration_markdown, format_overrides_markdown,
    format_settings_markdown,
};
use aitag_settings::tags::{ParseMode, TagConfigStore, parse_tag_file};
use anyhow::{Result, bail};
use clap::Parser;
use serde_json::{Value, json};
use std::fs::OpenOptions;
use std::path::Path;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// `--verbose` forces debug; otherwise `RUST_LOG` applies, defaulting to info.
fn log_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

fn init_logging(cli: &Cli) -> Result<()> {
    match cli.log.as_str() {
        "0" | "off" => {
            // No logging
        }
        "1" | "stdout" => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(log_filter(cli.verbose))
                .with_writer(std::io::stdout)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        "2" | "stderr" => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(log_filter(cli.verbose))
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        filename => {
            // Log to file (append mode)
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(filename)?;
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(log_filter(cli.verbose))
                .with_writer(file)
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }
    Ok(())
}

/// Load runtime config and apply CLI path overrides.
fn load_app_config(cli: &Cli) -> Result<AppConfig> {
    // SAFETY: set at startup before any other threads are spawned
    if let Some(config_path) = &cli.config {
        unsafe {
            std::env::set_var("AITAG_CONFIG_PATH", config_path);
        }
    }
    let mut loader = ConfigLoader::load()?;
    if let Some(path) = loader.config_path() {
        debug!(path = %path.display(), "Using config file");
    }

    let config = loader.config_mut();
    if let Some(dir) = &cli.config_dir {
        config.tags.config_dir = Some(dir.clone());
    }
    if let Some(dir) = &cli.install_dir {
        config.tags.install_dir = Some(dir.clone());
    }
    if let Some(db_path) = &cli.settings_db {
        config.settings.db_path = Some(db_path.clone());
    }
    Ok(loader.into_config())
}

fn print(format: OutputFormat, markdown: String, value: Value) -> Result<()> {
    match format {
        OutputFormat::Markdown => print!("{}", markdown),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&value)?),
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let app_config = load_app_config(&cli)?;
    let paths = app_config.tag_paths();
    let settings = app_config.settings_source();
    let format = match cli.format {
        FormatArg::Markdown => OutputFormat::Markdown,
        FormatArg::Json => OutputFormat::Json,
    };

    match cli.command {
        Command::Validate(args) => {
            let file = args.file.unwrap_or_else(|| paths.config_path());
            validate_file(&file, format)
        }
        Command::Resolve(args) => {
            let config = TagConfigStore::from_paths(paths, settings).get();
            let resolved: Vec<_> = args.tags.iter().map(|tag| config.resolve(tag)).collect();
            let markdown = resolved
                .iter()
                .map(format_settings_markdown)
                .collect::<Vec<_>>()
                .join("\n");
            print(format, markdown, serde_json::to_value(&resolved)?)
        }
        Command::Overrides => {
            let config = TagConfigStore::from_paths(paths, settings).get();
            let overrides: serde_json::Map<String, Value> = config
                .iter_overrides()
                .map(|(key, ov)| -> Result<(String, Value)> {
                    Ok((key.to_string(), serde_json::to_value(ov)?))
                })
                .collect::<Result<_>>()?;
            print(
                format,
                format_overrides_markdown(config.iter_overrides()),
                Value::Object(overrides),
            )
        }
        Command::Show => {
            let config = TagConfigStore::from_paths(paths, settings).get();
            print(
                format,
                format_configuration_markdown(&config),
                configuration_json(&config)?,
            )
        }
    }
}

fn validate_file(file: &Path, format: OutputFormat) -> Result<()> {
    match parse_tag_file(file, ParseMode::Strict) {
        Ok(table) => {
            info!(path = %file.display(), "Tag settings file is valid");
            print(
                format,
                format!(
                    "{} is valid ({} overrides)\n",
                    file.display(),
                    table.overrides.len()
                ),
                json!({ "valid": true, "path": file, "overrides": table.overrides.len() }),
            )
        }
        Err(e) => bail!("{}: {}", file.display(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_filter_is_debug() {
        assert_eq!(log_filter(true).to_string(), "debug");
    }
}
