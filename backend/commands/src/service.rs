//! Bot service: the one object the transport talks to.

use std::sync::Arc;

use async_trait::async_trait;
use pagetree_core::{BotError, InboundRequest, Reply, RequestHandler};
use tracing::{debug, error, info};

use crate::reload::{ReloadCoordinator, ReloadOutcome};
use crate::snapshot::SnapshotStore;

pub const BUSY_MESSAGE: &str =
    "The bot is reloading its configuration, please retry in a moment.";

pub struct BotService {
    coordinator: Arc<ReloadCoordinator>,
}

impl BotService {
    pub fn new(
        store: SnapshotStore,
        separator: impl Into<String>,
        admins: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            coordinator: ReloadCoordinator::new(store, separator, admins),
        }
    }

    pub fn coordinator(&self) -> &Arc<ReloadCoordinator> {
        &self.coordinator
    }

    /// Initial load: the stable snapshot when one exists on disk, the working
    /// snapshot otherwise.
    pub async fn start(&self) -> Result<ReloadOutcome, BotError> {
        let use_stable = self.coordinator.store().stable_exists();
        info!(use_stable, "Loading commands");
        self.coordinator.reload(use_stable, None).await
    }

    pub async fn command_strings(&self) -> Vec<String> {
        self.coordinator.registry().read().await.command_strings()
    }
}

#[async_trait]
impl RequestHandler for BotService {
    async fn handle(&self, request: InboundRequest) -> Option<Reply> {
        let handler = match self.coordinator.registry().try_read() {
            Ok(registry) => registry.find(&request.command),
            Err(_) => {
                debug!(command = %request.command, "Registry busy, reload in progress");
                return Some(Reply::plain(BUSY_MESSAGE));
            }
        };
        let Some(handler) = handler else {
            debug!(command = %request.command, "No handler registered");
            return None;
        };

        info!(command = %request.command, sender = %request.sender, "Dispatching");
        match handler.handle(&request).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(command = %request.command, error = %e, "Command failed");
                None
            }
        }
    }
}
