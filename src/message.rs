//! Line protocol definitions
//!
//! Plain newline-delimited text in both directions. Inbound lines are
//! classified into `Input`; outbound lines are produced by `Style`,
//! which optionally wraps them in ANSI colour sequences for terminals.

use chrono::Local;

/// Command that ends the session (matched case-insensitively)
pub const QUIT_COMMAND: &str = "/quit";

/// Text sent to connections turned away by the admission ceiling
pub const SERVER_FULL: &str = "Maximum number of clients reached. Please try again later.";

/// Timestamp layout used in chat lines
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const RESET: &str = "\x1b[0m";
const GREEN_BOLD: &str = "\x1b[32;1m";
const RED_BOLD: &str = "\x1b[31;1m";
const CYAN: &str = "\x1b[36m";
const MAGENTA_BOLD_UNDERLINE: &str = "\x1b[35;1;4m";

/// Client → Server line, classified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input<'a> {
    /// `/quit` in any casing
    Quit,
    /// Empty or whitespace-only line, ignored
    Blank,
    /// Anything else is chat content, kept verbatim
    Chat(&'a str),
}

impl<'a> Input<'a> {
    /// Classify one inbound line
    pub fn parse(line: &'a str) -> Self {
        if line.eq_ignore_ascii_case(QUIT_COMMAND) {
            Input::Quit
        } else if line.trim().is_empty() {
            Input::Blank
        } else {
            Input::Chat(line)
        }
    }
}

/// Server → Client line styling
///
/// Colour codes are cosmetic; the `Plain` style produces the same text
/// without them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Style {
    /// Bare text
    Plain,
    /// ANSI-coloured text for terminal clients
    #[default]
    Decorated,
}

impl Style {
    fn paint(self, colour: &str, text: String) -> String {
        match self {
            Style::Plain => text,
            Style::Decorated => format!("{colour}{text}{RESET}"),
        }
    }

    /// `<username> has joined the chat`
    pub fn join_notice(self, username: &str) -> String {
        self.paint(GREEN_BOLD, format!("{username} has joined the chat"))
    }

    /// `<username> has left the chat`
    pub fn leave_notice(self, username: &str) -> String {
        self.paint(RED_BOLD, format!("{username} has left the chat"))
    }

    /// `[<timestamp>][<username>]: <content>`
    pub fn chat_line(self, timestamp: &str, username: &str, content: &str) -> String {
        self.paint(CYAN, format!("[{timestamp}][{username}]: {content}"))
    }

    /// Prompt written before the username is read (no trailing newline)
    pub fn username_prompt(self) -> String {
        self.paint(MAGENTA_BOLD_UNDERLINE, "[ENTER YOUR USERNAME]:".to_string()) + " "
    }

    /// Error shown when an empty username was submitted
    pub fn empty_username(self) -> String {
        self.paint(RED_BOLD, "[ERROR]: Username cannot be empty".to_string())
    }
}

/// Current local time formatted for chat lines
pub fn timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_quit_any_case() {
        assert_eq!(Input::parse("/quit"), Input::Quit);
        assert_eq!(Input::parse("/QUIT"), Input::Quit);
        assert_eq!(Input::parse("/Quit"), Input::Quit);
    }

    #[test]
    fn test_input_quit_exact_match_only() {
        assert_eq!(Input::parse("/quit now"), Input::Chat("/quit now"));
        assert_eq!(Input::parse("quit"), Input::Chat("quit"));
    }

    #[test]
    fn test_input_blank() {
        assert_eq!(Input::parse(""), Input::Blank);
        assert_eq!(Input::parse("   "), Input::Blank);
        assert_eq!(Input::parse("\t \t"), Input::Blank);
    }

    #[test]
    fn test_input_chat_verbatim() {
        assert_eq!(Input::parse("  hello  "), Input::Chat("  hello  "));
    }

    #[test]
    fn test_plain_notices() {
        assert_eq!(Style::Plain.join_notice("Alice"), "Alice has joined the chat");
        assert_eq!(Style::Plain.leave_notice("Alice"), "Alice has left the chat");
    }

    #[test]
    fn test_plain_chat_line() {
        let line = Style::Plain.chat_line("2024-01-02 03:04:05", "Alice", "hello");
        assert_eq!(line, "[2024-01-02 03:04:05][Alice]: hello");
    }

    #[test]
    fn test_decorated_wraps_in_ansi() {
        let line = Style::Decorated.join_notice("Alice");
        assert!(line.starts_with(GREEN_BOLD));
        assert!(line.ends_with(RESET));
        assert!(line.contains("Alice has joined the chat"));
    }

    #[test]
    fn test_username_prompt_has_no_newline() {
        let prompt = Style::Plain.username_prompt();
        assert_eq!(prompt, "[ENTER YOUR USERNAME]: ");
        assert!(!Style::Decorated.username_prompt().contains('\n'));
    }

    #[test]
    fn test_timestamp_layout() {
        let ts = timestamp();
        assert!(chrono::NaiveDateTime::parse_from_str(&ts, TIMESTAMP_FORMAT).is_ok());
    }
}
