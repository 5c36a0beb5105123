//! Reload coordinator: clear, build, dry-run, then commit or roll back.
//!
//! One reload runs at a time. It holds the registry write lock from the
//! first `clear()` until the fixed commands are installed, so no inbound
//! command ever resolves against a half-built registry. A failure on the
//! working snapshot falls back to the stable snapshot exactly once; a
//! failure on the stable snapshot is fatal.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use pagetree_core::{BotError, InboundRequest, HELP_COMMAND};
use pagetree_logging::{ReloadEvent, ReloadEventLogger};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use crate::archive::{extract_archive, is_zip_mime};
use crate::dispatch::CommandHandler;
use crate::handlers::{HelpCommand, ReloadCommand, ShowPageCommand};
use crate::hierarchy::{build_hierarchy, subdirs};
use crate::page::{read_page_from_dir, HELP_DESCR_FILE, HELP_PIC_FILE};
use crate::registry::CommandRegistry;
use crate::snapshot::{SnapshotKind, SnapshotStore};

/// Sender identity used for offline dry runs.
pub const CHECK_SENDER: &str = "pagetree-check";

// ---------------------------------------------------------------------------
// Failures and outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureStage {
    /// Building the subtree of one top-level directory.
    Build { subdir: String },
    /// Dry-running a registered command.
    Validate { command: String },
    /// Installing `help` and `reload`.
    Install,
}

/// Why one reload attempt against one snapshot failed.
#[derive(Debug)]
pub struct AttemptFailure {
    pub stage: FailureStage,
    pub source: BotError,
}

impl AttemptFailure {
    fn build(subdir: impl Into<String>, source: BotError) -> Self {
        Self {
            stage: FailureStage::Build {
                subdir: subdir.into(),
            },
            source,
        }
    }

    fn validate(command: &str, source: BotError) -> Self {
        Self {
            stage: FailureStage::Validate {
                command: command.to_string(),
            },
            source: BotError::ValidationFailure {
                command: command.to_string(),
                message: source.to_string(),
            },
        }
    }

    fn install(source: BotError) -> Self {
        Self {
            stage: FailureStage::Install,
            source,
        }
    }

    /// Short summary for the requester; the full error goes to the log.
    pub fn user_message(&self) -> String {
        match &self.stage {
            FailureStage::Build { subdir } => format!(
                "Error while trying to load new command configuration from dir {subdir}."
            ),
            FailureStage::Validate { command } => {
                format!("Error while trying to run command {command}.")
            }
            FailureStage::Install => {
                "Error while trying to install the help and reload commands.".to_string()
            }
        }
    }
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.user_message(), self.source)
    }
}

#[derive(Debug)]
pub enum ReloadOutcome {
    /// Trigger came from a sender outside the admin list.
    Ignored,
    /// The attached file was not a zip archive; nothing was reloaded.
    RejectedAttachment { reason: String },
    /// The zip could not be applied; the working dir is unchanged and nothing
    /// was reloaded.
    ArchiveFailed { reason: String },
    /// The requested snapshot is live.
    Committed {
        target: SnapshotKind,
        commands: usize,
    },
    /// The working snapshot failed and the stable snapshot is live again.
    RolledBack { failure: AttemptFailure },
}

// ---------------------------------------------------------------------------
// Coordinator
// ---------------------------------------------------------------------------

pub struct ReloadCoordinator {
    store: SnapshotStore,
    separator: String,
    admins: Arc<HashSet<String>>,
    registry: RwLock<CommandRegistry>,
    reload_lock: Mutex<()>,
}

impl ReloadCoordinator {
    pub fn new(
        store: SnapshotStore,
        separator: impl Into<String>,
        admins: impl IntoIterator<Item = String>,
    ) -> Arc<Self> {
        Arc::new(Self {
            store,
            separator: separator.into(),
            admins: Arc::new(admins.into_iter().collect()),
            registry: RwLock::new(CommandRegistry::new()),
            reload_lock: Mutex::new(()),
        })
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    pub fn registry(&self) -> &RwLock<CommandRegistry> {
        &self.registry
    }

    pub fn is_admin(&self, sender: &str) -> bool {
        self.admins.contains(sender)
    }

    /// Rebuild the live command set from the working or stable snapshot.
    ///
    /// `request` is the triggering message; `None` means the startup load,
    /// which skips the admin check and the dry run.
    pub async fn reload(
        self: &Arc<Self>,
        use_stable: bool,
        request: Option<&InboundRequest>,
    ) -> Result<ReloadOutcome, BotError> {
        if let Some(req) = request {
            if !self.is_admin(&req.sender) {
                debug!(sender = %req.sender, "Ignoring reload from non-admin");
                return Ok(ReloadOutcome::Ignored);
            }
        }

        let _reloading = self.reload_lock.lock().await;
        let trigger = request.map(|r| r.sender.as_str()).unwrap_or("startup");

        if let Some(attachment) = request.and_then(|r| r.attachment.as_ref()) {
            info!(mime = %attachment.mime_type, "Received config archive");
            if !is_zip_mime(&attachment.mime_type) {
                warn!(mime = %attachment.mime_type, "Rejecting non-zip attachment");
                return Ok(ReloadOutcome::RejectedAttachment {
                    reason: format!("got {}", attachment.mime_type),
                });
            }
            match extract_archive(attachment.bytes.clone(), self.store.working()).await {
                Ok(files) => {
                    ReloadEventLogger::log_event(trigger, ReloadEvent::ArchiveApplied { files })
                }
                Err(e) => {
                    warn!(error = %e, "Could not unpack config archive");
                    return Ok(ReloadOutcome::ArchiveFailed {
                        reason: e.to_string(),
                    });
                }
            }
        }

        let mut registry = self.registry.write().await;
        let mut target = if use_stable {
            SnapshotKind::Stable
        } else {
            SnapshotKind::Working
        };
        let mut rollback_cause: Option<AttemptFailure> = None;

        loop {
            ReloadEventLogger::log_event(
                trigger,
                ReloadEvent::Started {
                    target: target.to_string(),
                },
            );

            if target == SnapshotKind::Stable && !self.store.stable_exists() {
                let err = BotError::MissingStableSnapshot(self.store.stable().to_path_buf());
                self.fail_closed(&mut registry, request.is_some());
                ReloadEventLogger::log_event(
                    trigger,
                    ReloadEvent::Fatal {
                        reason: err.to_string(),
                    },
                );
                return Err(err);
            }

            match self.attempt(&mut registry, target, request).await {
                Ok(commands) => {
                    // The new set is already live; a failed copy only leaves the old stable.
                    if target == SnapshotKind::Working {
                        if let Err(e) = self.store.persist_stable().await {
                            error!(error = %e, "Could not persist the stable snapshot");
                        }
                    }
                    ReloadEventLogger::log_event(
                        trigger,
                        ReloadEvent::Committed {
                            target: target.to_string(),
                            commands,
                        },
                    );
                    return Ok(match rollback_cause {
                        Some(failure) => ReloadOutcome::RolledBack { failure },
                        None => ReloadOutcome::Committed { target, commands },
                    });
                }
                Err(failure) => {
                    error!(
                        snapshot = %target,
                        error = %failure.source,
                        "{}",
                        failure.user_message()
                    );
                    if target == SnapshotKind::Working {
                        ReloadEventLogger::log_event(
                            trigger,
                            ReloadEvent::RolledBack {
                                reason: failure.to_string(),
                            },
                        );
                        info!("Trying to load last stable command configuration...");
                        rollback_cause = Some(failure);
                        target = SnapshotKind::Stable;
                        continue;
                    }

                    self.fail_closed(&mut registry, request.is_some());
                    ReloadEventLogger::log_event(
                        trigger,
                        ReloadEvent::Fatal {
                            reason: failure.to_string(),
                        },
                    );
                    return Err(BotError::StableSnapshotBroken(failure.to_string()));
                }
            }
        }
    }

    /// One pass against one snapshot: steps clear through install.
    async fn attempt(
        self: &Arc<Self>,
        registry: &mut CommandRegistry,
        target: SnapshotKind,
        request: Option<&InboundRequest>,
    ) -> Result<usize, AttemptFailure> {
        let root = self.store.path(target);
        info!(snapshot = %target, root = %root.display(), "Clearing old handlers");
        registry.clear();

        info!("Processing command dirs...");
        populate(registry, root, &self.separator).await?;

        if let Some(req) = request {
            info!("Running commands to check their correctness...");
            dry_run(registry, req).await?;
        }

        let reload: Arc<dyn CommandHandler> = Arc::new(ReloadCommand::new(
            Arc::downgrade(self),
            Arc::clone(&self.admins),
        ));
        let mut entries = registry.list().to_vec();
        entries.push(Arc::clone(&reload));
        let help = help_command(root, entries).await?;
        if let Some(req) = request {
            dry_run_one(help.as_ref(), req).await?;
        }

        registry.add(help).map_err(AttemptFailure::install)?;
        registry.add(reload).map_err(AttemptFailure::install)?;
        info!(commands = registry.len(), "Done processing command dirs");
        Ok(registry.len())
    }

    /// Leave only `reload` behind so an admin can still upload a fix.
    fn fail_closed(self: &Arc<Self>, registry: &mut CommandRegistry, triggered: bool) {
        error!("No loadable configuration left, keeping only the reload command");
        registry.clear();
        if triggered {
            let reload = Arc::new(ReloadCommand::new(
                Arc::downgrade(self),
                Arc::clone(&self.admins),
            ));
            if let Err(e) = registry.add(reload) {
                error!(error = %e, "Could not register the reload command");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Building blocks shared with the offline check
// ---------------------------------------------------------------------------

/// Build every top-level directory of `root` and register the nodes.
pub async fn populate(
    registry: &mut CommandRegistry,
    root: &Path,
    separator: &str,
) -> Result<(), AttemptFailure> {
    let dirs = subdirs(root)
        .await
        .map_err(|source| AttemptFailure::build(root.display().to_string(), source))?;

    for dir in dirs {
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let nodes = build_hierarchy(&dir, separator, Vec::new())
            .await
            .map_err(|source| AttemptFailure::build(&name, source))?;
        debug!(subdir = %name, commands = nodes.len(), "Built command subtree");
        for node in nodes {
            registry
                .add(Arc::new(ShowPageCommand::new(node)))
                .map_err(|source| AttemptFailure::build(&name, source))?;
        }
    }
    Ok(())
}

/// Invoke every registered handler against `request`, discarding replies.
pub async fn dry_run(
    registry: &CommandRegistry,
    request: &InboundRequest,
) -> Result<(), AttemptFailure> {
    for handler in registry.list() {
        dry_run_one(handler.as_ref(), request).await?;
    }
    Ok(())
}

async fn dry_run_one(
    handler: &dyn CommandHandler,
    request: &InboundRequest,
) -> Result<(), AttemptFailure> {
    handler
        .handle(request)
        .await
        .map(|_| ())
        .map_err(|source| AttemptFailure::validate(handler.command_string(), source))
}

async fn help_command(
    root: &Path,
    entries: Vec<Arc<dyn CommandHandler>>,
) -> Result<Arc<dyn CommandHandler>, AttemptFailure> {
    let page = read_page_from_dir(root, HELP_DESCR_FILE, HELP_PIC_FILE)
        .await
        .map_err(AttemptFailure::install)?;
    Ok(Arc::new(HelpCommand::new(page, entries)))
}

/// Build and dry-run a snapshot without touching any live registry.
pub async fn check_snapshot(root: &Path, separator: &str) -> Result<CommandRegistry, AttemptFailure> {
    let mut registry = CommandRegistry::new();
    populate(&mut registry, root, separator).await?;

    let probe = InboundRequest::new(CHECK_SENDER, HELP_COMMAND);
    dry_run(&registry, &probe).await?;

    let help = help_command(root, registry.list().to_vec()).await?;
    dry_run_one(help.as_ref(), &probe).await?;
    registry.add(help).map_err(AttemptFailure::install)?;
    Ok(registry)
}
