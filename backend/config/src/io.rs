//! Config file discovery and loading, plus the plain-text credential files.

use crate::schema::PageTreeConfig;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

const CONFIG_FILE_NAME: &str = "pagetree.yaml";

/// Resolve the config file.
/// Priority: `PAGETREE_CONFIG` env > `./pagetree.yaml` > `<config dir>/pagetree/pagetree.yaml`
pub fn config_file_path() -> PathBuf {
    if let Ok(path) = std::env::var("PAGETREE_CONFIG") {
        return PathBuf::from(path);
    }
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    dirs::config_dir()
        .map(|dir| dir.join("pagetree").join(CONFIG_FILE_NAME))
        .unwrap_or(local)
}

/// Load and parse the config from disk.
///
/// Returns `Ok(Default::default())` if the file doesn't exist.
pub async fn load_config(path: &Path) -> Result<PageTreeConfig> {
    if !fs::try_exists(path).await.unwrap_or(false) {
        debug!(path = %path.display(), "Config file does not exist; using defaults");
        return Ok(PageTreeConfig::default());
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    // An empty document parses as null rather than an empty mapping.
    if raw.trim().is_empty() {
        return Ok(PageTreeConfig::default());
    }

    let config: PageTreeConfig = serde_yaml::from_str(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;

    info!(path = %path.display(), "Loaded config");
    Ok(config)
}

/// First line of the token file, trimmed.
pub async fn read_token_file(path: &Path) -> Result<String> {
    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read token file: {}", path.display()))?;
    Ok(raw.lines().next().unwrap_or_default().trim().to_string())
}

/// One username per line; blank lines are skipped.
pub async fn read_admins_file(path: &Path) -> Result<Vec<String>> {
    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read admins file: {}", path.display()))?;
    Ok(raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}
