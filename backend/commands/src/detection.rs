/// Slash command detection: pull the command token out of inbound text.
use pagetree_core::RELOAD_COMMAND;

/// Return the token of a `/command` message, without the slash or a
/// trailing `@botname`. Plain text yields `None`.
pub fn detect_command(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    let rest = trimmed.strip_prefix('/')?;

    let word = rest.split(char::is_whitespace).next().unwrap_or("");
    let token = word.split_once('@').map(|(t, _)| t).unwrap_or(word);

    (!token.is_empty()).then_some(token)
}

/// A caption of `reload` or `/reload` on a file upload triggers a reload.
pub fn is_reload_caption(caption: &str) -> bool {
    let caption = caption.trim();
    caption == RELOAD_COMMAND || detect_command(caption) == Some(RELOAD_COMMAND)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_command() {
        assert_eq!(detect_command("/weather"), Some("weather"));
    }

    #[test]
    fn strips_bot_mention_and_arguments() {
        assert_eq!(detect_command("  /food_soup@page_bot extra words"), Some("food_soup"));
    }

    #[test]
    fn plain_text_is_not_a_command() {
        assert_eq!(detect_command("weather please"), None);
        assert_eq!(detect_command("/"), None);
        assert_eq!(detect_command("/@bot"), None);
    }

    #[test]
    fn reload_captions() {
        assert!(is_reload_caption("reload"));
        assert!(is_reload_caption(" /reload "));
        assert!(!is_reload_caption("please reload"));
    }
}
