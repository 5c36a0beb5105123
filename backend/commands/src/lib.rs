pub mod archive;
pub mod detection;
pub mod dispatch;
pub mod handlers;
pub mod hierarchy;
pub mod page;
pub mod registry;
pub mod reload;
pub mod render;
pub mod service;
pub mod snapshot;
pub mod types;

pub use detection::{detect_command, is_reload_caption};
pub use dispatch::CommandHandler;
pub use handlers::{HelpCommand, ReloadCommand, ShowPageCommand};
pub use hierarchy::build_hierarchy;
pub use page::read_page_from_dir;
pub use registry::CommandRegistry;
pub use reload::{check_snapshot, AttemptFailure, FailureStage, ReloadCoordinator, ReloadOutcome};
pub use service::BotService;
pub use snapshot::{SnapshotKind, SnapshotStore};
pub use types::{CommandNode, HelpInfo, PageDescription};
