/// Command handler trait shared by page commands and the synthetic
/// `help`/`reload` commands.
use async_trait::async_trait;
use pagetree_core::{BotError, InboundRequest, Reply};

use crate::types::HelpInfo;

#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Exact string an inbound command token must equal to reach this handler.
    fn command_string(&self) -> &str;

    /// Summary used when this command is listed by `help`.
    fn help_info(&self) -> Option<HelpInfo>;

    /// Whether `help` lists this command for the given sender.
    fn is_visible_in_help(&self, _sender: &str) -> bool {
        true
    }

    /// Produce the reply for `request`. `Ok(None)` means stay silent.
    ///
    /// Must not send anything itself: the reload dry run calls this for
    /// every page and discards the result.
    async fn handle(&self, request: &InboundRequest) -> Result<Option<Reply>, BotError>;
}
