//! Structured logging for pagetree.
//!
//! Console plus rolling NDJSON file output, a structured reload-event log,
//! and scrubbing of bot tokens before anything reaches the log.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{ReloadEvent, ReloadEventLogger, ReloadLogEntry};
pub use logger::init_logger;
pub use redact::redact_sensitive_data;
