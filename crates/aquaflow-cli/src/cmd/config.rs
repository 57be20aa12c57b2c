use crate::output::print_json;
use anyhow::Context;
use aquaflow_core::config::{ServiceConfig, WarnLevel};
use std::path::Path;

#[derive(clap::Subcommand)]
pub enum ConfigSubcommand {
    /// Show the effective configuration
    Show,

    /// Validate the config for common mistakes
    Validate,
}

pub fn run(root: &Path, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Show => show(root, json),
        ConfigSubcommand::Validate => validate(root, json),
    }
}

fn show(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = ServiceConfig::load(root).context("failed to load config")?;

    if json {
        print_json(&config)?;
        return Ok(());
    }

    println!("Service:  {} ({})", config.service.name, config.service.city);
    println!(
        "Delivery: pincode prefix '{}', {} digits; phone {} digits",
        config.delivery.pincode_prefix, config.delivery.pincode_len, config.delivery.phone_len
    );
    println!(
        "Limits:   {} orders / {}s; {} auth attempts / {}s",
        config.limits.order_limit,
        config.limits.order_window_ms / 1000,
        config.limits.auth_limit,
        config.limits.auth_window_ms / 1000
    );
    Ok(())
}

fn validate(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = ServiceConfig::load(root).context("failed to load config")?;
    let warnings = config.validate();

    if json {
        print_json(&serde_json::json!({ "warnings": warnings }))?;
    } else if warnings.is_empty() {
        println!("Config is valid. No warnings.");
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    let has_errors = warnings.iter().any(|w| w.level == WarnLevel::Error);
    if has_errors {
        anyhow::bail!("config validation found errors");
    }

    Ok(())
}
