use std::sync::Arc;

/// Raw image bytes shared between a page and every reply rendered from it.
pub type Photo = Arc<[u8]>;

/// A file attached to an inbound message, already downloaded by the transport.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub mime_type: String,
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

/// One inbound message as seen by the command engine.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    /// Sender identity checked against the admin allow-list (Telegram username).
    pub sender: String,
    pub chat_id: i64,
    /// Command token without the leading slash, matched exactly.
    pub command: String,
    pub attachment: Option<Attachment>,
}

impl InboundRequest {
    pub fn new(sender: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            chat_id: 0,
            command: command.into(),
            attachment: None,
        }
    }

    pub fn in_chat(mut self, chat_id: i64) -> Self {
        self.chat_id = chat_id;
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }
}

/// Outbound reply handed to the transport for delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub text: String,
    pub photo: Option<Photo>,
    /// Text is MarkdownV2 authored content rather than a plain status line.
    pub markdown: bool,
}

impl Reply {
    pub fn markdown(text: impl Into<String>, photo: Option<Photo>) -> Self {
        Self {
            text: text.into(),
            photo,
            markdown: true,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            photo: None,
            markdown: false,
        }
    }
}
