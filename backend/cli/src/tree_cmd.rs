//! `pagetree tree`: print the command hierarchy of a snapshot directory.

use std::path::Path;

use anyhow::Result;
use pagetree_commands::build_hierarchy;
use pagetree_commands::hierarchy::subdirs;

use crate::terminal_output::{supports_color, tree_line};

pub async fn run(dir: &Path, separator: &str) -> Result<()> {
    let color = supports_color();
    for subdir in subdirs(dir).await? {
        for node in build_hierarchy(&subdir, separator, Vec::new()).await? {
            println!(
                "{}",
                tree_line(node.depth(), &node.command_string, &node.page.short_text, color)
            );
        }
    }
    Ok(())
}
