use crate::ChannelAdapter;
use async_trait::async_trait;
use pagetree_commands::{detect_command, is_reload_caption};
use pagetree_core::{Attachment, InboundRequest, RELOAD_COMMAND, Reply, RequestHandler};
use std::sync::Arc;
use teloxide::net::Download;
use teloxide::payloads::{SendMessageSetters, SendPhotoSetters};
use teloxide::prelude::*;
use teloxide::types::{Document, InputFile, ParseMode};
use tracing::{debug, error, info, warn};

/// Fallback when Telegram does not report a document's MIME type.
const UNKNOWN_MIME: &str = "application/octet-stream";

#[derive(Clone, Copy)]
struct AdapterSettings {
    reload_on_caption: bool,
}

pub struct TelegramAdapter {
    bot: Bot,
    settings: AdapterSettings,
}

impl TelegramAdapter {
    pub fn new(token: String, reload_on_caption: bool) -> Self {
        Self {
            bot: Bot::new(token),
            settings: AdapterSettings { reload_on_caption },
        }
    }
}

#[async_trait]
impl ChannelAdapter for TelegramAdapter {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn start(&self, handler: Arc<dyn RequestHandler>) -> anyhow::Result<()> {
        info!("Starting Telegram adapter");

        let bot = self.bot.clone();
        let settings = self.settings;

        let endpoint = Update::filter_message().endpoint(
            |bot: Bot, msg: Message, handler: Arc<dyn RequestHandler>, settings: AdapterSettings| async move {
                on_message(bot, msg, handler, settings).await;
                respond(())
            },
        );

        Dispatcher::builder(bot, endpoint)
            .dependencies(dptree::deps![handler, settings])
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        Ok(())
    }
}

async fn on_message(bot: Bot, msg: Message, handler: Arc<dyn RequestHandler>, settings: AdapterSettings) {
    let Some(command) = command_for(msg.text(), msg.caption(), settings.reload_on_caption) else {
        return;
    };

    let sender = msg
        .from
        .as_ref()
        .map(|user| user.username.clone().unwrap_or_else(|| user.id.to_string()))
        .unwrap_or_default();
    debug!(chat_id = msg.chat.id.0, sender = %sender, command = %command, "Telegram command");

    let mut request = InboundRequest::new(sender, command).in_chat(msg.chat.id.0);

    // Only a reload consumes an upload; other commands never pay for the download.
    if request.command == RELOAD_COMMAND {
        if let Some(doc) = msg.document() {
            match download_document(&bot, doc).await {
                Ok(attachment) => request = request.with_attachment(attachment),
                Err(e) => {
                    error!(error = %e, "Failed to download Telegram document");
                    return;
                }
            }
        }
    }

    if let Some(reply) = handler.handle(request).await {
        if let Err(e) = send_reply(&bot, msg.chat.id, reply).await {
            error!(chat_id = msg.chat.id.0, error = %e, "Failed to send Telegram reply");
        }
    }
}

/// Command token carried by a message: its text, or its caption when the
/// message is an upload. A bare `reload` caption counts when enabled.
fn command_for(text: Option<&str>, caption: Option<&str>, reload_on_caption: bool) -> Option<String> {
    if let Some(text) = text {
        return detect_command(text).map(String::from);
    }
    let caption = caption?;
    if reload_on_caption && is_reload_caption(caption) {
        return Some(RELOAD_COMMAND.to_string());
    }
    detect_command(caption).map(String::from)
}

async fn download_document(bot: &Bot, doc: &Document) -> anyhow::Result<Attachment> {
    let file = bot.get_file(doc.file.id.clone()).await?;
    let mut bytes = Vec::new();
    bot.download_file(&file.path, &mut bytes).await?;

    let mime_type = doc
        .mime_type
        .as_ref()
        .map(|m| m.essence_str().to_string())
        .unwrap_or_else(|| {
            warn!("Telegram document has no MIME type");
            UNKNOWN_MIME.to_string()
        });

    Ok(Attachment {
        mime_type,
        file_name: doc.file_name.clone(),
        bytes,
    })
}

async fn send_reply(bot: &Bot, chat_id: ChatId, reply: Reply) -> anyhow::Result<()> {
    match reply.photo {
        Some(photo) => {
            let mut request = bot
                .send_photo(chat_id, InputFile::memory(photo.to_vec()))
                .caption(reply.text);
            if reply.markdown {
                request = request.parse_mode(ParseMode::MarkdownV2);
            }
            request.await?;
        }
        None => {
            let mut request = bot.send_message(chat_id, reply.text);
            if reply.markdown {
                request = request.parse_mode(ParseMode::MarkdownV2);
            }
            request.await?;
        }
    }
    Ok(())
}
