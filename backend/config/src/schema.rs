//! pagetree runtime configuration schema, typed for serde YAML deserialization.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::defaults::{
    DEFAULT_LOG_DIR, DEFAULT_LOG_LEVEL, DEFAULT_SEPARATOR, DEFAULT_STABLE_DIR, DEFAULT_WORKING_DIR,
};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageTreeConfig {
    /// Telegram credentials
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telegram: Option<TelegramConfig>,

    /// Usernames allowed to trigger a reload
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub admins: Vec<String>,

    /// Plain-text allow-list, one username per line, merged into `admins`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admins_file: Option<PathBuf>,

    /// Snapshot directories and command naming
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commands: Option<CommandsConfig>,

    /// Logging configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelegramConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// File whose first line is the bot token; used when `token` is unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stable_dir: Option<PathBuf>,
    /// Joins ancestor tokens into a command string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separator: Option<String>,
    /// Treat an upload captioned `reload` as the reload command
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reload_on_caption: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Accessors
// ---------------------------------------------------------------------------

impl PageTreeConfig {
    pub fn token(&self) -> Option<&str> {
        self.telegram
            .as_ref()
            .and_then(|t| t.token.as_deref())
            .filter(|t| !t.trim().is_empty())
    }

    pub fn working_dir(&self) -> &Path {
        self.commands
            .as_ref()
            .and_then(|c| c.working_dir.as_deref())
            .unwrap_or_else(|| Path::new(DEFAULT_WORKING_DIR))
    }

    pub fn stable_dir(&self) -> &Path {
        self.commands
            .as_ref()
            .and_then(|c| c.stable_dir.as_deref())
            .unwrap_or_else(|| Path::new(DEFAULT_STABLE_DIR))
    }

    pub fn separator(&self) -> &str {
        self.commands
            .as_ref()
            .and_then(|c| c.separator.as_deref())
            .unwrap_or(DEFAULT_SEPARATOR)
    }

    pub fn reload_on_caption(&self) -> bool {
        self.commands
            .as_ref()
            .and_then(|c| c.reload_on_caption)
            .unwrap_or(true)
    }

    pub fn log_level(&self) -> &str {
        self.logging
            .as_ref()
            .and_then(|l| l.level.as_deref())
            .unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_dir(&self) -> &Path {
        self.logging
            .as_ref()
            .and_then(|l| l.dir.as_deref())
            .unwrap_or_else(|| Path::new(DEFAULT_LOG_DIR))
    }
}
