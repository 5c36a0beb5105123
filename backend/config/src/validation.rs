//! Config validation: collects every error and warning in one pass.

use std::path::{Component, Path, PathBuf};

use crate::schema::PageTreeConfig;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Emit every warning and error through `tracing`.
    pub fn log(&self) {
        for warning in &self.warnings {
            tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
        }
        for error in &self.errors {
            tracing::error!(path = %error.path, message = %error.message, "Config error");
        }
    }

    /// First error, if any.
    pub fn into_result(self) -> Result<(), ConfigValidationError> {
        match self.errors.into_iter().next() {
            Some(first) => Err(first),
            None => Ok(()),
        }
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

pub fn validate(config: &PageTreeConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_telegram(config, &mut report);
    validate_admins(config, &mut report);
    validate_commands(config, &mut report);
    report
}

fn validate_telegram(config: &PageTreeConfig, report: &mut ValidationReport) {
    if config.token().is_none() {
        report.warn("telegram.token", "No bot token configured; the bot cannot be served");
    }
}

fn validate_admins(config: &PageTreeConfig, report: &mut ValidationReport) {
    if config.admins.is_empty() {
        report.warn("admins", "No admins configured; /reload will ignore everyone");
    }
    for (i, admin) in config.admins.iter().enumerate() {
        if admin.trim().is_empty() {
            report.error(format!("admins[{i}]"), "Admin username cannot be empty");
        }
    }
}

fn validate_commands(config: &PageTreeConfig, report: &mut ValidationReport) {
    let separator = config.separator();
    if separator.is_empty() {
        report.error("commands.separator", "Separator cannot be empty");
    } else if !separator.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        report.warn(
            "commands.separator",
            format!("Telegram command names cannot contain {separator:?}"),
        );
    }

    let working = lexical(config.working_dir());
    let stable = lexical(config.stable_dir());
    if working == stable {
        report.error(
            "commands.stableDir",
            "Stable dir must differ from the working dir",
        );
    } else if stable.starts_with(&working) || working.starts_with(&stable) {
        report.error(
            "commands.stableDir",
            "Stable dir and working dir must not be nested in one another",
        );
    }
}

/// `path` without `.` components, so `./commands` and `commands` compare equal.
fn lexical(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::apply_all_defaults;
    use crate::schema::{CommandsConfig, TelegramConfig};
    use std::path::PathBuf;

    fn base() -> PageTreeConfig {
        apply_all_defaults(PageTreeConfig {
            telegram: Some(TelegramConfig {
                token: Some("123:abc".into()),
                token_file: None,
            }),
            admins: vec!["root".into()],
            ..Default::default()
        })
    }

    #[test]
    fn defaults_with_token_and_admin_are_clean() {
        let report = validate(&base());
        assert!(report.is_valid());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn same_working_and_stable_dir_is_error() {
        let mut cfg = base();
        cfg.commands = Some(CommandsConfig {
            working_dir: Some(PathBuf::from("commands")),
            stable_dir: Some(PathBuf::from("commands")),
            ..Default::default()
        });
        let report = validate(&cfg);
        assert!(!report.is_valid());
        assert_eq!(report.errors[0].path, "commands.stableDir");
    }

    #[test]
    fn stable_dir_inside_working_dir_is_error() {
        for (working, stable) in [("commands", "commands/stable"), ("./data", "data/commands")] {
            let mut cfg = base();
            cfg.commands = Some(CommandsConfig {
                working_dir: Some(PathBuf::from(working)),
                stable_dir: Some(PathBuf::from(stable)),
                ..Default::default()
            });
            let report = validate(&cfg);
            assert!(!report.is_valid(), "{working} / {stable}");
            assert!(report.errors[0].message.contains("nested"));
        }
    }

    #[test]
    fn sibling_dirs_with_shared_prefix_are_fine() {
        let mut cfg = base();
        cfg.commands = Some(CommandsConfig {
            working_dir: Some(PathBuf::from("commands")),
            stable_dir: Some(PathBuf::from("commands_stable")),
            ..Default::default()
        });
        assert!(validate(&cfg).is_valid());
    }

    #[test]
    fn dotted_separator_warns() {
        let mut cfg = base();
        cfg.commands.as_mut().unwrap().separator = Some(".".into());
        let report = validate(&cfg);
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn empty_separator_is_error() {
        let mut cfg = base();
        cfg.commands.as_mut().unwrap().separator = Some(String::new());
        assert!(!validate(&cfg).is_valid());
    }

    #[test]
    fn missing_token_and_admins_warn() {
        let cfg = apply_all_defaults(PageTreeConfig::default());
        let report = validate(&cfg);
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 2);
    }
}
