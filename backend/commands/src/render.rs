//! Reply text rendering: child listings, MarkdownV2 escaping, length limits.

use pagetree_core::BotError;

use crate::types::HelpInfo;

/// Placeholder in a page body replaced by the rendered list of its children.
pub const COMMANDS_LIST: &str = "COMMANDSLIST";

/// Telegram limit for a plain message.
pub const MAX_TEXT_LEN: usize = 4096;

/// Telegram limit for a photo caption.
pub const MAX_CAPTION_LEN: usize = 1024;

const UNORDERED_BULLET: &str = "•";

/// Characters that must be backslash-escaped in MarkdownV2.
const MARKDOWN_V2_SPECIAL: &[char] = &[
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
];

pub fn escape_markdown_v2(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if MARKDOWN_V2_SPECIAL.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

pub fn render_list(items: &[String], ordered: bool) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            if ordered {
                format!("{}.{item}", i + 1)
            } else {
                format!("{UNORDERED_BULLET}{item}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `/cmd : description` entries, with the command name escaped.
pub fn help_entries(infos: &[HelpInfo]) -> Vec<String> {
    infos
        .iter()
        .map(|info| {
            format!(
                "/{} : {}",
                escape_markdown_v2(&info.command_string),
                info.description
            )
        })
        .collect()
}

/// Expand [`COMMANDS_LIST`] in `text` with the listing of `children`.
///
/// With no children the placeholder is dropped. With children and no
/// placeholder the listing is appended on a new line.
pub fn expand_children(text: &str, children: &[HelpInfo]) -> String {
    if children.is_empty() {
        return text.replace(COMMANDS_LIST, "");
    }
    let listing = render_list(&help_entries(children), false);
    if text.contains(COMMANDS_LIST) {
        text.replace(COMMANDS_LIST, &listing)
    } else {
        format!("{text}\n{listing}")
    }
}

pub fn check_length(command: &str, text: &str, has_photo: bool) -> Result<(), BotError> {
    let limit = if has_photo { MAX_CAPTION_LEN } else { MAX_TEXT_LEN };
    let len = text.chars().count();
    if len > limit {
        return Err(BotError::PageTooLong {
            command: command.to_string(),
            len,
            limit,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(cmd: &str, descr: &str) -> HelpInfo {
        HelpInfo {
            command_string: cmd.into(),
            description: descr.into(),
        }
    }

    #[test]
    fn escapes_separator_in_command_names() {
        let entries = help_entries(&[info("weather_today", "Today")]);
        assert_eq!(entries, vec!["/weather\\_today : Today".to_string()]);
    }

    #[test]
    fn replaces_placeholder_in_place() {
        let text = expand_children("Pick one:\nCOMMANDSLIST\nBye", &[info("a_b", "B")]);
        assert_eq!(text, "Pick one:\n•/a\\_b : B\nBye");
    }

    #[test]
    fn appends_listing_without_placeholder() {
        let text = expand_children("Intro", &[info("x", "X"), info("y", "Y")]);
        assert_eq!(text, "Intro\n•/x : X\n•/y : Y");
    }

    #[test]
    fn childless_page_drops_placeholder() {
        assert_eq!(expand_children("Body COMMANDSLIST", &[]), "Body ");
    }

    #[test]
    fn ordered_list_is_numbered() {
        let items = vec!["one".to_string(), "two".to_string()];
        assert_eq!(render_list(&items, true), "1.one\n2.two");
    }

    #[test]
    fn caption_limit_is_stricter_than_text_limit() {
        let text = "a".repeat(MAX_CAPTION_LEN + 1);
        assert!(check_length("p", &text, false).is_ok());
        assert!(matches!(
            check_length("p", &text, true),
            Err(BotError::PageTooLong { limit: MAX_CAPTION_LEN, .. })
        ));
    }
}
