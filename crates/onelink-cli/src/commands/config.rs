//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use onelink_core::Config;

use crate::output::{Output, OutputFormat};

const VALID_KEYS: &str =
    "data_dir, preview_endpoint, favicon_endpoint, preview_timeout_secs, export_dir, log_file";

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "preview_endpoint": config.preview_endpoint,
                    "favicon_endpoint": config.favicon_endpoint,
                    "preview_timeout_secs": config.preview_timeout_secs,
                    "export_dir": config.export_dir,
                    "log_file": config.log_file
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.data_dir.display());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  data_dir:             {}", config.data_dir.display());
            println!("  preview_endpoint:     {}", config.preview_endpoint);
            println!("  favicon_endpoint:     {}", config.favicon_endpoint);
            println!("  preview_timeout_secs: {}", config.preview_timeout_secs);
            println!("  export_dir:           {}", display_optional(&config.export_dir));
            println!("  log_file:             {}", display_optional(&config.log_file));
            println!();
            println!("State file:  {}", config.state_path().display());
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    apply_setting(&mut config, &key, &value)?;

    // Save to the CLI-specified path or default
    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

fn apply_setting(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "data_dir" => {
            config.data_dir = value.into();
        }
        "preview_endpoint" => {
            url::Url::parse(value).context("preview_endpoint must be an absolute URL")?;
            config.preview_endpoint = value.to_string();
        }
        "favicon_endpoint" => {
            url::Url::parse(value).context("favicon_endpoint must be an absolute URL")?;
            config.favicon_endpoint = value.to_string();
        }
        "preview_timeout_secs" => {
            config.preview_timeout_secs = value
                .parse()
                .context("Invalid value for preview_timeout_secs. Use a whole number of seconds.")?;
        }
        "export_dir" => {
            config.export_dir = optional_path(value);
        }
        "log_file" => {
            config.log_file = optional_path(value);
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\nValid keys: {}",
                key,
                VALID_KEYS
            );
        }
    }
    Ok(())
}

fn optional_path(value: &str) -> Option<PathBuf> {
    if value.is_empty() || value == "none" {
        None
    } else {
        Some(value.into())
    }
}

fn display_optional(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(not set)".to_string())
}
