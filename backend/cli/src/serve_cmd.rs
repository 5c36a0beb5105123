//! `pagetree serve`: load the commands and run the Telegram bot.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Result};
use pagetree_channels::{ChannelAdapter, TelegramAdapter};
use pagetree_commands::{BotService, ReloadOutcome, SnapshotStore};
use pagetree_config::{config_file_path, prepare_config, redact};
use pagetree_core::RequestHandler;
use tracing::{debug, info, warn};

pub async fn run(config_path: Option<&Path>) -> Result<()> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(config_file_path);
    let (config, report) = prepare_config(&path).await?;

    let _log_guard = pagetree_logging::init_logger(config.log_dir(), config.log_level());
    report.log();
    report.into_result()?;
    debug!(config = %redact(&serde_json::to_value(&config)?), "Prepared config");
    info!(
        config = %path.display(),
        working = %config.working_dir().display(),
        stable = %config.stable_dir().display(),
        "Starting pagetree"
    );

    let Some(token) = config.token().map(String::from) else {
        bail!("No Telegram bot token configured (telegram.token or telegram.tokenFile)");
    };

    let store = SnapshotStore::new(config.working_dir(), config.stable_dir());
    let service = BotService::new(store, config.separator(), config.admins.clone());

    match service.start().await? {
        ReloadOutcome::RolledBack { failure } => {
            warn!(error = %failure, "Working commands failed at startup, serving the stable snapshot")
        }
        outcome => info!(?outcome, "Commands loaded"),
    }

    let adapter = TelegramAdapter::new(token, config.reload_on_caption());
    info!(adapter = adapter.name(), "Listening for messages");
    let handler: Arc<dyn RequestHandler> = Arc::new(service);
    adapter.start(handler).await
}
