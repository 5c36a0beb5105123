//! Reload Event Logger
//!
//! One structured record per reload transition, under the `reload_events` target.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::redact::redact_sensitive_data;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ReloadEvent {
    Started { target: String },
    ArchiveApplied { files: usize },
    Committed { target: String, commands: usize },
    RolledBack { reason: String },
    Fatal { reason: String },
}

#[derive(Debug, Serialize)]
pub struct ReloadLogEntry {
    /// Sender that triggered the reload, or `startup`.
    pub trigger: String,
    pub timestamp: DateTime<Utc>,
    pub event: ReloadEvent,
}

pub struct ReloadEventLogger;

impl ReloadEventLogger {
    pub fn entry(trigger: &str, mut event: ReloadEvent) -> ReloadLogEntry {
        match &mut event {
            ReloadEvent::RolledBack { reason } | ReloadEvent::Fatal { reason } => {
                *reason = redact_sensitive_data(reason);
            }
            ReloadEvent::Started { .. }
            | ReloadEvent::ArchiveApplied { .. }
            | ReloadEvent::Committed { .. } => {}
        }

        ReloadLogEntry {
            trigger: trigger.into(),
            timestamp: Utc::now(),
            event,
        }
    }

    pub fn log_event(trigger: &str, event: ReloadEvent) {
        let entry = Self::entry(trigger, event);
        match serde_json::to_string(&entry) {
            Ok(json) => info!(target: "reload_events", entry = %json, "Reload event"),
            Err(_) => info!(target: "reload_events", entry = ?entry, "Reload event"),
        }
    }
}
