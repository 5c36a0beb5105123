//! `pagetree check`: build and dry-run a snapshot directory offline.

use std::path::Path;

use anyhow::{bail, Result};
use pagetree_commands::check_snapshot;

use crate::terminal_output::{note_error, note_success};

pub async fn run(dir: &Path, separator: &str) -> Result<()> {
    match check_snapshot(dir, separator).await {
        Ok(registry) => {
            for command in registry.command_strings() {
                println!("/{command}");
            }
            note_success(&format!(
                "{} is valid, {} commands",
                dir.display(),
                registry.len()
            ));
            Ok(())
        }
        Err(failure) => {
            note_error(&failure.user_message());
            bail!("{failure}");
        }
    }
}
