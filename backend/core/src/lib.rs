pub mod error;
pub mod request;
pub mod traits;

pub use error::BotError;
pub use request::{Attachment, InboundRequest, Photo, Reply};
pub use traits::RequestHandler;

/// Synthetic command listing every top-level page.
pub const HELP_COMMAND: &str = "help";

/// Synthetic command that rebuilds the command set from disk.
pub const RELOAD_COMMAND: &str = "reload";
