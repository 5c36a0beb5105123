//! `pagetree-config`: runtime configuration for the pagetree bot.
//!
//! Provides:
//! - Typed YAML schema with camelCase keys
//! - `${ENV_VAR}` substitution
//! - Token and admin list files
//! - Default values and validation
//! - Redaction for safe logging

pub mod defaults;
pub mod env;
pub mod io;
pub mod redact;
pub mod schema;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use env::{collect_referenced_vars, resolve_env_vars, resolve_env_vars_with, MissingEnvVarError};
pub use io::{config_file_path, load_config, read_admins_file, read_token_file};
pub use redact::redact;
pub use schema::PageTreeConfig;
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;

/// Load a config file, substitute env vars, apply defaults, pull in the
/// credential files and validate.
///
/// Validation errors fail the load; warnings are only logged.
pub async fn load_and_prepare(path: &Path) -> Result<PageTreeConfig> {
    let (config, report) = prepare_config(path).await?;
    report.log();
    report.into_result()?;
    Ok(config)
}

/// Same pipeline as [`load_and_prepare`] but hands the validation report back
/// unlogged, for callers that install the subscriber from the loaded config.
pub async fn prepare_config(path: &Path) -> Result<(PageTreeConfig, ValidationReport)> {
    let raw_config = load_config(path).await?;

    let value: Value =
        serde_json::to_value(&raw_config).context("Failed to serialize config for processing")?;
    let value = resolve_env_vars(&value).context("Failed to resolve env vars in config")?;
    let config: PageTreeConfig =
        serde_json::from_value(value).context("Failed to deserialize config after processing")?;

    let config = apply_all_defaults(config);
    let config = resolve_credential_files(config, path.parent()).await?;

    let report = validate(&config);
    Ok((config, report))
}

/// Relative credential paths resolve against the config file's directory.
async fn resolve_credential_files(
    mut config: PageTreeConfig,
    base: Option<&Path>,
) -> Result<PageTreeConfig> {
    let base = base.unwrap_or_else(|| Path::new(""));

    if let Some(telegram) = config.telegram.as_mut() {
        if telegram.token.as_deref().map_or(true, |t| t.trim().is_empty()) {
            if let Some(file) = &telegram.token_file {
                telegram.token = Some(read_token_file(&base.join(file)).await?);
            }
        }
    }

    if let Some(file) = &config.admins_file {
        for admin in read_admins_file(&base.join(file)).await? {
            if !config.admins.contains(&admin) {
                config.admins.push(admin);
            }
        }
    }

    Ok(config)
}
