/// Page and command-node types.
///
/// A page is the parsed content of one snapshot directory; a node is that
/// page placed in the hierarchy with its full command string.
use pagetree_core::Photo;

/// One content unit read from a snapshot directory.
#[derive(Debug, Clone, PartialEq)]
pub struct PageDescription {
    /// Token for this level, unique among siblings only.
    pub command: String,
    /// One-line summary shown when the page is listed by its parent.
    pub short_text: String,
    /// Body sent when the command is invoked.
    pub text: String,
    pub photo: Option<Photo>,
}

/// `(command string, description)` pair used to render help listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpInfo {
    pub command_string: String,
    pub description: String,
}

/// One registrable command produced by the hierarchy builder.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandNode {
    /// Ancestor tokens and this node's token joined by the separator.
    pub command_string: String,
    pub page: PageDescription,
    /// Ancestor command tokens, empty at the hierarchy root.
    pub parent_path: Vec<String>,
    /// Help summaries of direct children only.
    pub children: Vec<HelpInfo>,
}

impl CommandNode {
    pub fn visible_at_top_level(&self) -> bool {
        self.parent_path.is_empty()
    }

    pub fn help_info(&self) -> HelpInfo {
        HelpInfo {
            command_string: self.command_string.clone(),
            description: self.page.short_text.clone(),
        }
    }

    pub fn depth(&self) -> usize {
        self.parent_path.len()
    }
}
