use async_trait::async_trait;
use pagetree_core::RequestHandler;
use std::sync::Arc;

pub mod telegram;

pub use telegram::TelegramAdapter;

/// All channel adapters implement this trait.
#[async_trait]
pub trait ChannelAdapter: Send + Sync {
    /// Human-readable adapter name for logging.
    fn name(&self) -> &str;

    /// Run the adapter's receive loop, passing every recognised command to
    /// `handler` and delivering whatever reply it produces. Returns on shutdown.
    async fn start(&self, handler: Arc<dyn RequestHandler>) -> anyhow::Result<()>;
}
