//! Page description reader: one snapshot directory into one [`PageDescription`].

use std::path::Path;
use std::sync::Arc;

use pagetree_core::BotError;
use tokio::fs;
use tracing::debug;

use crate::types::PageDescription;

pub const DESCR_FILE: &str = "descr.md";
pub const PIC_FILE: &str = "pic.jpg";
pub const HELP_DESCR_FILE: &str = "help_message.md";
pub const HELP_PIC_FILE: &str = "help_pic.jpg";

/// Separator between the three fields of a description file.
pub const FIELD_SEPARATOR: &str = "\n\n\n";

/// Read `descr_name` (and optionally `image_name`) from `dir`.
pub async fn read_page_from_dir(
    dir: &Path,
    descr_name: &str,
    image_name: &str,
) -> Result<PageDescription, BotError> {
    let descr_path = dir.join(descr_name);
    let raw = fs::read_to_string(&descr_path)
        .await
        .map_err(|e| BotError::io(&descr_path, e))?;

    let (command, short_text, text) = split_fields(&raw)
        .map_err(|reason| BotError::malformed(&descr_path, reason))?;

    let photo_path = dir.join(image_name);
    let photo = if fs::metadata(&photo_path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
    {
        let bytes = fs::read(&photo_path)
            .await
            .map_err(|e| BotError::io(&photo_path, e))?;
        Some(Arc::from(bytes))
    } else {
        None
    };

    debug!(dir = %dir.display(), command = %command, has_photo = photo.is_some(), "Read page");
    Ok(PageDescription {
        command,
        short_text,
        text,
        photo,
    })
}

/// Split a description file into command token, short text and full text.
fn split_fields(raw: &str) -> Result<(String, String, String), String> {
    let normalized = raw.replace("\r\n", "\n");
    let parts: Vec<&str> = normalized.split(FIELD_SEPARATOR).collect();
    if parts.len() != 3 {
        return Err(format!(
            "expected command, short description and text separated by two blank lines, found {} field(s)",
            parts.len()
        ));
    }

    let command = parts[0].trim();
    if command.is_empty() || command.contains(char::is_whitespace) {
        return Err(format!("invalid command token {:?}", parts[0]));
    }

    Ok((
        command.to_string(),
        parts[1].trim().to_string(),
        parts[2].to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn write(dir: &Path, name: &str, contents: &[u8]) {
        fs::write(dir.join(name), contents).await.unwrap();
    }

    #[tokio::test]
    async fn reads_three_fields_without_photo() {
        let tmp = TempDir::new().unwrap();
        write(
            tmp.path(),
            DESCR_FILE,
            b"weather\n\n\nCheck weather\n\n\nEnter a city name.",
        )
        .await;

        let page = read_page_from_dir(tmp.path(), DESCR_FILE, PIC_FILE).await.unwrap();
        assert_eq!(page.command, "weather");
        assert_eq!(page.short_text, "Check weather");
        assert_eq!(page.text, "Enter a city name.");
        assert!(page.photo.is_none());
    }

    #[tokio::test]
    async fn attaches_photo_when_present() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), HELP_DESCR_FILE, b"help\n\n\nHelp\n\n\nHi there").await;
        write(tmp.path(), HELP_PIC_FILE, &[0xff, 0xd8, 0xff]).await;

        let page = read_page_from_dir(tmp.path(), HELP_DESCR_FILE, HELP_PIC_FILE)
            .await
            .unwrap();
        assert_eq!(page.photo.as_deref(), Some(&[0xff, 0xd8, 0xff][..]));
    }

    #[tokio::test]
    async fn two_fields_is_malformed() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), DESCR_FILE, b"weather\n\n\nCheck weather\nEnter a city.").await;

        let err = read_page_from_dir(tmp.path(), DESCR_FILE, PIC_FILE)
            .await
            .unwrap_err();
        match err {
            BotError::MalformedPage { reason, .. } => assert!(reason.contains("found 2")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn missing_description_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let err = read_page_from_dir(tmp.path(), DESCR_FILE, PIC_FILE)
            .await
            .unwrap_err();
        assert!(matches!(err, BotError::Io { .. }));
    }

    #[test]
    fn windows_line_endings_are_accepted() {
        let (cmd, short, text) = split_fields("news\r\n\r\n\r\nLatest\r\n\r\n\r\nBody").unwrap();
        assert_eq!((cmd.as_str(), short.as_str(), text.as_str()), ("news", "Latest", "Body"));
    }

    #[test]
    fn empty_token_is_rejected() {
        assert!(split_fields("\n\n\nshort\n\n\ntext").is_err());
    }
}
