use async_trait::async_trait;

use crate::request::{InboundRequest, Reply};

/// Seam between a chat transport and the command engine.
///
/// The transport turns each inbound message into an [`InboundRequest`] and
/// delivers whatever reply comes back. `None` means stay silent.
#[async_trait]
pub trait RequestHandler: Send + Sync + 'static {
    async fn handle(&self, request: InboundRequest) -> Option<Reply>;
}
