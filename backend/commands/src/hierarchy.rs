//! Hierarchy builder: one [`CommandNode`] per directory of a snapshot subtree.

use std::path::{Path, PathBuf};

use futures::future::{BoxFuture, FutureExt};
use pagetree_core::BotError;
use tokio::fs;
use tracing::debug;

use crate::page::{read_page_from_dir, DESCR_FILE, PIC_FILE};
use crate::types::CommandNode;

/// Build the subtree rooted at `root` as a flat pre-order listing.
///
/// The first node is `root` itself. Children are built before their parent
/// so the parent can carry their help summaries. Any error aborts the whole
/// subtree.
pub fn build_hierarchy<'a>(
    root: &'a Path,
    separator: &'a str,
    ancestors: Vec<String>,
) -> BoxFuture<'a, Result<Vec<CommandNode>, BotError>> {
    async move {
        let page = read_page_from_dir(root, DESCR_FILE, PIC_FILE).await?;

        let mut lineage = ancestors.clone();
        lineage.push(page.command.clone());

        let mut subtrees = Vec::new();
        for dir in subdirs(root).await? {
            subtrees.push(build_hierarchy(&dir, separator, lineage.clone()).await?);
        }

        let children = subtrees
            .iter()
            .filter_map(|subtree| subtree.first())
            .map(CommandNode::help_info)
            .collect();

        let node = CommandNode {
            command_string: lineage.join(separator),
            page,
            parent_path: ancestors,
            children,
        };

        let mut nodes = vec![node];
        nodes.extend(subtrees.into_iter().flatten());
        Ok(nodes)
    }
    .boxed()
}

/// Immediate subdirectories of `dir`, sorted by name. Hidden entries are skipped.
pub async fn subdirs(dir: &Path) -> Result<Vec<PathBuf>, BotError> {
    let mut entries = fs::read_dir(dir).await.map_err(|e| BotError::io(dir, e))?;
    let mut dirs = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(|e| BotError::io(dir, e))? {
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        // Follows symlinks; a dangling link is not a directory.
        let path = entry.path();
        match fs::metadata(&path).await {
            Ok(meta) if meta.is_dir() => dirs.push(path),
            Ok(_) => {}
            Err(e) => debug!(path = %path.display(), error = %e, "Skipping unreadable entry"),
        }
    }
    dirs.sort();
    Ok(dirs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn page(dir: &Path, command: &str, short: &str) {
        fs::create_dir_all(dir).await.unwrap();
        fs::write(
            dir.join(DESCR_FILE),
            format!("{command}\n\n\n{short}\n\n\nAbout {command}"),
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn leaf_directory_yields_single_node() {
        let tmp = TempDir::new().unwrap();
        page(tmp.path(), "weather", "Check weather").await;

        let nodes = build_hierarchy(tmp.path(), "_", Vec::new()).await.unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].command_string, "weather");
        assert!(nodes[0].visible_at_top_level());
        assert!(nodes[0].children.is_empty());
    }

    #[tokio::test]
    async fn nested_directories_get_qualified_names_in_pre_order() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("food");
        page(&root, "food", "Food").await;
        page(&root.join("b_pizza"), "pizza", "Pizza").await;
        page(&root.join("a_soup"), "soup", "Soup").await;
        page(&root.join("a_soup").join("cold"), "gazpacho", "Cold soup").await;

        let nodes = build_hierarchy(&root, "_", Vec::new()).await.unwrap();
        let names: Vec<_> = nodes.iter().map(|n| n.command_string.as_str()).collect();
        assert_eq!(names, vec!["food", "food_soup", "food_soup_gazpacho", "food_pizza"]);

        let gazpacho = &nodes[2];
        assert_eq!(gazpacho.parent_path, vec!["food".to_string(), "soup".to_string()]);
        assert!(!gazpacho.visible_at_top_level());
    }

    #[tokio::test]
    async fn children_lists_only_direct_descendants() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("food");
        page(&root, "food", "Food").await;
        page(&root.join("soup"), "soup", "Soup").await;
        page(&root.join("soup").join("cold"), "gazpacho", "Cold soup").await;

        let nodes = build_hierarchy(&root, ".", Vec::new()).await.unwrap();
        assert_eq!(nodes[0].children.len(), 1);
        assert_eq!(nodes[0].children[0].command_string, "food.soup");
        assert_eq!(nodes[0].children[0].description, "Soup");
        assert_eq!(nodes[1].children[0].command_string, "food.soup.gazpacho");
    }

    #[tokio::test]
    async fn malformed_descendant_fails_whole_subtree() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("food");
        page(&root, "food", "Food").await;
        let bad = root.join("soup").join("cold");
        fs::create_dir_all(&bad).await.unwrap();
        page(&root.join("soup"), "soup", "Soup").await;
        fs::write(bad.join(DESCR_FILE), "gazpacho\n\n\nonly two").await.unwrap();

        let err = build_hierarchy(&root, "_", Vec::new()).await.unwrap_err();
        assert!(matches!(err, BotError::MalformedPage { .. }));
    }

    #[tokio::test]
    async fn hidden_directories_are_ignored() {
        let tmp = TempDir::new().unwrap();
        page(tmp.path(), "root", "Root").await;
        fs::create_dir_all(tmp.path().join(".git")).await.unwrap();

        let nodes = build_hierarchy(tmp.path(), "_", Vec::new()).await.unwrap();
        assert_eq!(nodes.len(), 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn symlinked_subdirectories_are_followed() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("food");
        page(&root, "food", "Food").await;
        let shared = tmp.path().join("shared_soup");
        page(&shared, "soup", "Soup").await;
        std::os::unix::fs::symlink(&shared, root.join("soup")).unwrap();
        std::os::unix::fs::symlink(tmp.path().join("missing"), root.join("dangling")).unwrap();

        let nodes = build_hierarchy(&root, "_", Vec::new()).await.unwrap();
        let names: Vec<_> = nodes.iter().map(|n| n.command_string.as_str()).collect();
        assert_eq!(names, vec!["food", "food_soup"]);
    }
}
