//! Welcome banner
//!
//! Lines sent to every new connection before the username prompt. The
//! banner file is plain text with an optional `[orange]...[/orange]`
//! highlight markup.

use std::path::Path;

use tracing::warn;

use crate::message::Style;

const ORANGE_OPEN: &str = "[orange]";
const ORANGE_CLOSE: &str = "[/orange]";

/// Bold white on black, the banner's base colours
const BANNER_BASE: &str = "\x1b[40m\x1b[1;37m";
const ORANGE: &str = "\x1b[38;5;208m";
const BANNER_RESUME: &str = "\x1b[0m\x1b[40;1;37m";
const RESET: &str = "\x1b[0m";

/// Render one banner line
pub fn render_line(line: &str, style: Style) -> String {
    match style {
        Style::Plain => line.replace(ORANGE_OPEN, "").replace(ORANGE_CLOSE, ""),
        Style::Decorated => {
            let body = line
                .replace(ORANGE_OPEN, ORANGE)
                .replace(ORANGE_CLOSE, BANNER_RESUME);
            format!("{BANNER_BASE}{body}{RESET}")
        }
    }
}

/// Load and render the banner file
///
/// A missing or unreadable file yields an empty banner.
pub async fn load(path: &Path, style: Style) -> Vec<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => text.lines().map(|line| render_line(line, style)).collect(),
        Err(e) => {
            warn!("Failed to read welcome banner {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_render_plain_strips_markup() {
        let line = render_line("Welcome to [orange]LineChat[/orange]!", Style::Plain);
        assert_eq!(line, "Welcome to LineChat!");
    }

    #[test]
    fn test_render_decorated() {
        let line = render_line("[orange]hi[/orange]", Style::Decorated);
        assert_eq!(
            line,
            format!("{BANNER_BASE}{ORANGE}hi{BANNER_RESUME}{RESET}")
        );
    }

    #[tokio::test]
    async fn test_load_banner_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "line one").unwrap();
        writeln!(file, "[orange]line two[/orange]").unwrap();

        let lines = load(file.path(), Style::Plain).await;
        assert_eq!(lines, vec!["line one", "line two"]);
    }

    #[tokio::test]
    async fn test_load_missing_banner() {
        let dir = tempfile::tempdir().unwrap();
        let lines = load(&dir.path().join("missing.txt"), Style::Decorated).await;
        assert!(lines.is_empty());
    }
}
