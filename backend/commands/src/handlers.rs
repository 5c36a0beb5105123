/// Command handlers: the page command built from a snapshot directory and
/// the two synthetic commands every configuration carries.
use std::collections::HashSet;
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use pagetree_core::{BotError, InboundRequest, Reply, HELP_COMMAND, RELOAD_COMMAND};
use tracing::{error, info};

use crate::dispatch::CommandHandler;
use crate::reload::{ReloadCoordinator, ReloadOutcome};
use crate::render::{check_length, expand_children};
use crate::types::{CommandNode, HelpInfo, PageDescription};

// ---------------------------------------------------------------------------
// Page
// ---------------------------------------------------------------------------

/// Shows one page of the hierarchy, listing its direct children.
pub struct ShowPageCommand {
    node: CommandNode,
}

impl ShowPageCommand {
    pub fn new(node: CommandNode) -> Self {
        Self { node }
    }

    pub fn node(&self) -> &CommandNode {
        &self.node
    }
}

#[async_trait]
impl CommandHandler for ShowPageCommand {
    fn command_string(&self) -> &str {
        &self.node.command_string
    }

    fn help_info(&self) -> Option<HelpInfo> {
        Some(self.node.help_info())
    }

    fn is_visible_in_help(&self, _sender: &str) -> bool {
        self.node.visible_at_top_level()
    }

    async fn handle(&self, _request: &InboundRequest) -> Result<Option<Reply>, BotError> {
        let page = &self.node.page;
        let text = expand_children(&page.text, &self.node.children);
        check_length(&self.node.command_string, &text, page.photo.is_some())?;
        Ok(Some(Reply::markdown(text, page.photo.clone())))
    }
}

// ---------------------------------------------------------------------------
// /help
// ---------------------------------------------------------------------------

/// Root help page listing every command visible to the sender.
pub struct HelpCommand {
    page: PageDescription,
    entries: Vec<Arc<dyn CommandHandler>>,
}

impl HelpCommand {
    pub fn new(page: PageDescription, entries: Vec<Arc<dyn CommandHandler>>) -> Self {
        Self { page, entries }
    }

    pub fn visible_entries(&self, sender: &str) -> Vec<HelpInfo> {
        self.entries
            .iter()
            .filter(|h| h.is_visible_in_help(sender))
            .filter_map(|h| h.help_info())
            .collect()
    }
}

#[async_trait]
impl CommandHandler for HelpCommand {
    fn command_string(&self) -> &str {
        HELP_COMMAND
    }

    fn help_info(&self) -> Option<HelpInfo> {
        Some(HelpInfo {
            command_string: HELP_COMMAND.into(),
            description: self.page.short_text.clone(),
        })
    }

    async fn handle(&self, request: &InboundRequest) -> Result<Option<Reply>, BotError> {
        let text = expand_children(&self.page.text, &self.visible_entries(&request.sender));
        check_length(HELP_COMMAND, &text, self.page.photo.is_some())?;
        Ok(Some(Reply::markdown(text, self.page.photo.clone())))
    }
}

// ---------------------------------------------------------------------------
// /reload
// ---------------------------------------------------------------------------

const RELOAD_DESCRIPTION: &str = "reload configuration from the commands dir\\. \
If the message carries a zip archive captioned 'reload', the archive is unpacked \
over the commands dir before reloading";

/// Rebuilds the command set from the working snapshot.
pub struct ReloadCommand {
    coordinator: Weak<ReloadCoordinator>,
    admins: Arc<HashSet<String>>,
}

impl ReloadCommand {
    pub fn new(coordinator: Weak<ReloadCoordinator>, admins: Arc<HashSet<String>>) -> Self {
        Self { coordinator, admins }
    }
}

#[async_trait]
impl CommandHandler for ReloadCommand {
    fn command_string(&self) -> &str {
        RELOAD_COMMAND
    }

    fn help_info(&self) -> Option<HelpInfo> {
        Some(HelpInfo {
            command_string: RELOAD_COMMAND.into(),
            description: RELOAD_DESCRIPTION.into(),
        })
    }

    fn is_visible_in_help(&self, sender: &str) -> bool {
        self.admins.contains(sender)
    }

    async fn handle(&self, request: &InboundRequest) -> Result<Option<Reply>, BotError> {
        let Some(coordinator) = self.coordinator.upgrade() else {
            return Err(BotError::Other(anyhow::anyhow!(
                "reload coordinator is no longer running"
            )));
        };

        match coordinator.reload(false, Some(request)).await {
            Ok(outcome) => Ok(reply_for(&outcome)),
            Err(e) => {
                error!(error = %e, "Reload left the bot without a usable configuration");
                Ok(Some(Reply::plain(format!(
                    "Failed to restore the stable configuration: {e}. \
                     Only /reload is available until a valid configuration is uploaded."
                ))))
            }
        }
    }
}

fn reply_for(outcome: &ReloadOutcome) -> Option<Reply> {
    match outcome {
        ReloadOutcome::Ignored => None,
        ReloadOutcome::RejectedAttachment { reason } => Some(Reply::plain(format!(
            "Error, expected archive with commands ({reason})"
        ))),
        ReloadOutcome::ArchiveFailed { reason } => Some(Reply::plain(format!(
            "Could not apply the uploaded archive ({reason}). \
             The commands dir was left unchanged and nothing was reloaded."
        ))),
        ReloadOutcome::Committed { commands, .. } => {
            info!(commands, "Reload committed");
            Some(Reply::plain(format!(
                "Configuration reloaded, {commands} commands registered."
            )))
        }
        ReloadOutcome::RolledBack { failure } => Some(Reply::plain(format!(
            "{} See logs for info. Previous stable configuration restored.",
            failure.user_message()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::MAX_TEXT_LEN;

    fn node(command_string: &str, parent_path: &[&str], children: Vec<HelpInfo>) -> CommandNode {
        let token = command_string.rsplit('_').next().unwrap_or(command_string);
        CommandNode {
            command_string: command_string.into(),
            page: PageDescription {
                command: token.into(),
                short_text: format!("{token} summary"),
                text: format!("{token} body"),
                photo: None,
            },
            parent_path: parent_path.iter().map(|s| s.to_string()).collect(),
            children,
        }
    }

    fn help_page() -> PageDescription {
        PageDescription {
            command: "help".into(),
            short_text: "Help".into(),
            text: "Available:\nCOMMANDSLIST".into(),
            photo: None,
        }
    }

    #[tokio::test]
    async fn page_lists_children() {
        let child = node("food_soup", &["food"], vec![]);
        let parent = node("food", &[], vec![child.help_info()]);
        let reply = ShowPageCommand::new(parent)
            .handle(&InboundRequest::new("alice", "food"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reply.text, "food body\n•/food\\_soup : soup summary");
        assert!(reply.markdown);
    }

    #[tokio::test]
    async fn oversized_page_fails() {
        let mut big = node("big", &[], vec![]);
        big.page.text = "x".repeat(MAX_TEXT_LEN + 1);
        let err = ShowPageCommand::new(big)
            .handle(&InboundRequest::new("alice", "big"))
            .await
            .unwrap_err();
        assert!(matches!(err, BotError::PageTooLong { .. }));
    }

    #[tokio::test]
    async fn help_lists_top_level_pages_only() {
        let weather: Arc<dyn CommandHandler> =
            Arc::new(ShowPageCommand::new(node("weather", &[], vec![])));
        let nested: Arc<dyn CommandHandler> =
            Arc::new(ShowPageCommand::new(node("weather_today", &["weather"], vec![])));
        let help = HelpCommand::new(help_page(), vec![weather, nested]);

        let reply = help
            .handle(&InboundRequest::new("alice", "help"))
            .await
            .unwrap()
            .unwrap();
        assert!(reply.text.contains("/weather : weather summary"));
        assert!(!reply.text.contains("today"));
    }

    #[tokio::test]
    async fn reload_entry_is_shown_to_admins_only() {
        let admins = Arc::new(HashSet::from(["root".to_string()]));
        let reload: Arc<dyn CommandHandler> = Arc::new(ReloadCommand::new(Weak::new(), admins));
        let help = HelpCommand::new(help_page(), vec![reload]);

        assert_eq!(help.visible_entries("root").len(), 1);
        assert!(help.visible_entries("guest").is_empty());
    }

    #[tokio::test]
    async fn reload_without_coordinator_errors() {
        let cmd = ReloadCommand::new(Weak::new(), Arc::new(HashSet::new()));
        assert!(cmd.handle(&InboundRequest::new("root", "reload")).await.is_err());
    }
}
