//! Terminal output helpers for the offline subcommands.

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";

/// Check if the terminal supports color output.
pub fn supports_color() -> bool {
    std::env::var("NO_COLOR").is_err()
        && (std::env::var("COLORTERM").is_ok()
            || std::env::var("TERM").map(|t| t != "dumb").unwrap_or(false))
}

pub fn note_error(msg: &str) {
    if supports_color() {
        eprintln!("{RED}{BOLD}✗{RESET} {msg}");
    } else {
        eprintln!("ERROR: {msg}");
    }
}

pub fn note_success(msg: &str) {
    if supports_color() {
        println!("{GREEN}{BOLD}✓{RESET} {msg}");
    } else {
        println!("OK: {msg}");
    }
}

/// One line of the command tree: `/command : summary`, indented by depth.
pub fn tree_line(depth: usize, command: &str, summary: &str, color: bool) -> String {
    let indent = "  ".repeat(depth);
    if color {
        format!("{indent}{BOLD}/{command}{RESET} {DIM}: {summary}{RESET}")
    } else {
        format!("{indent}/{command} : {summary}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_line_indents_by_depth() {
        assert_eq!(tree_line(0, "food", "Food", false), "/food : Food");
        assert_eq!(
            tree_line(2, "food_soup_tomato", "Tomato", false),
            "    /food_soup_tomato : Tomato"
        );
    }

    #[test]
    fn colored_tree_line_keeps_text() {
        let line = tree_line(1, "food_soup", "Soups", true);
        assert!(line.starts_with("  "));
        assert!(line.contains("/food_soup"));
        assert!(line.contains("Soups"));
    }
}
