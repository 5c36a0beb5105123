//! Config defaults: fills unset fields of a freshly loaded config.

use std::path::PathBuf;

use crate::schema::{CommandsConfig, LoggingConfig, PageTreeConfig};

pub const DEFAULT_WORKING_DIR: &str = "commands";
pub const DEFAULT_STABLE_DIR: &str = "last_stable_commands";

/// Telegram command tokens allow only `[A-Za-z0-9_]`, so `_` is the only
/// punctuation that survives as a path separator.
pub const DEFAULT_SEPARATOR: &str = "_";

pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_LOG_DIR: &str = "logs";

pub fn apply_all_defaults(config: PageTreeConfig) -> PageTreeConfig {
    let config = apply_command_defaults(config);
    apply_logging_defaults(config)
}

fn apply_command_defaults(mut config: PageTreeConfig) -> PageTreeConfig {
    let commands = config.commands.get_or_insert_with(CommandsConfig::default);
    if commands.working_dir.is_none() {
        commands.working_dir = Some(PathBuf::from(DEFAULT_WORKING_DIR));
    }
    if commands.stable_dir.is_none() {
        commands.stable_dir = Some(PathBuf::from(DEFAULT_STABLE_DIR));
    }
    if commands.separator.is_none() {
        commands.separator = Some(DEFAULT_SEPARATOR.to_string());
    }
    if commands.reload_on_caption.is_none() {
        commands.reload_on_caption = Some(true);
    }
    config
}

fn apply_logging_defaults(mut config: PageTreeConfig) -> PageTreeConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    if logging.level.is_none() {
        logging.level = Some(DEFAULT_LOG_LEVEL.to_string());
    }
    if logging.dir.is_none() {
        logging.dir = Some(PathBuf::from(DEFAULT_LOG_DIR));
    }
    config
}
