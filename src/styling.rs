//! Consolidated styling module for terminal output.
//!
//! Uses the anstyle ecosystem: anstream for auto-detecting color support,
//! anstyle for composable styling, and semantic style constants for
//! domain-specific use.
//!
//! ## stdout vs stderr principle
//!
//! - **stdout**: status/diff output the user asked for (status, pull, push, diff)
//! - **stderr**: progress/success/error messages and anything printed alongside it

use anstyle::{AnsiColor, Color, Style};
use unicode_width::UnicodeWidthStr;

pub use anstream::{eprint, eprintln, print, println, stderr, stdout};
pub use anstyle::Style as AnstyleStyle;

// ============================================================================
// Semantic style constants
// ============================================================================

/// Error style (red) - use as `{ERROR}text{ERROR:#}`
pub const ERROR: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Red)));

/// Bold error style, for inlining an identifier inside an error message.
pub const ERROR_BOLD: Style = Style::new()
    .fg_color(Some(Color::Ansi(AnsiColor::Red)))
    .bold();

pub const WARNING: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Yellow)));
pub const HINT: Style = Style::new().dimmed();

pub const ADDITION: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green)));
pub const DELETION: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Red)));
pub const RENAME: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Cyan)));

pub const CYAN: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Cyan)));
pub const GREEN: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green)));
pub const GREEN_BOLD: Style = Style::new()
    .fg_color(Some(Color::Ansi(AnsiColor::Green)))
    .bold();

pub const PROGRESS_EMOJI: &str = "🔄";
pub const SUCCESS_EMOJI: &str = "✅";
pub const ERROR_EMOJI: &str = "❌";
pub const WARNING_EMOJI: &str = "🟡";
pub const HINT_EMOJI: &str = "💡";

pub fn progress_message(msg: impl std::fmt::Display) -> String {
    format!("{PROGRESS_EMOJI} {CYAN}{msg}{CYAN:#}")
}

pub fn success_message(msg: impl std::fmt::Display) -> String {
    format!("{SUCCESS_EMOJI} {GREEN}{msg}{GREEN:#}")
}

pub fn info_message(msg: impl std::fmt::Display) -> String {
    format!("{HINT_EMOJI} {HINT}{msg}{HINT:#}")
}

pub fn warning_message(msg: impl std::fmt::Display) -> String {
    format!("{WARNING_EMOJI} {WARNING}{msg}{WARNING:#}")
}

// ============================================================================
// Styled output types
// ============================================================================

/// A piece of text with an optional style.
#[derive(Clone, Debug)]
pub struct StyledString {
    pub text: String,
    pub style: Option<Style>,
}

impl StyledString {
    pub fn new(text: impl Into<String>, style: Option<Style>) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    pub fn raw(text: impl Into<String>) -> Self {
        Self::new(text, None)
    }

    pub fn styled(text: impl Into<String>, style: Style) -> Self {
        Self::new(text, Some(style))
    }

    pub fn width(&self) -> usize {
        self.text.width()
    }

    pub fn render(&self) -> String {
        if let Some(style) = &self.style {
            format!("{}{}{}", style.render(), self.text, style.render_reset())
        } else {
            self.text.clone()
        }
    }
}

/// A line composed of multiple styled strings.
#[derive(Clone, Debug, Default)]
pub struct StyledLine {
    pub segments: Vec<StyledString>,
}

impl StyledLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_raw(&mut self, text: impl Into<String>) {
        self.segments.push(StyledString::raw(text));
    }

    pub fn push_styled(&mut self, text: impl Into<String>, style: Style) {
        self.segments.push(StyledString::styled(text, style));
    }

    pub fn push(&mut self, segment: StyledString) {
        self.segments.push(segment);
    }

    pub fn width(&self) -> usize {
        self.segments.iter().map(|s| s.width()).sum()
    }

    pub fn render(&self) -> String {
        self.segments.iter().map(|s| s.render()).collect()
    }
}

// ============================================================================
// Gutter formatting
// ============================================================================

const DEFAULT_TERMINAL_WIDTH: usize = 80;

fn get_terminal_width() -> usize {
    if let Ok(cols) = std::env::var("COLUMNS")
        && let Ok(width) = cols.parse::<usize>()
    {
        return width;
    }

    terminal_size::terminal_size()
        .map(|(terminal_size::Width(w), _)| w as usize)
        .unwrap_or(DEFAULT_TERMINAL_WIDTH)
}

fn wrap_text_at_width(text: &str, max_width: usize) -> Vec<String> {
    if max_width == 0 {
        return vec![text.to_string()];
    }

    if text.width() <= max_width {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut current_width = 0;

    for word in text.split_whitespace() {
        let word_width = word.width();

        if current_line.is_empty() {
            current_line = word.to_string();
            current_width = word_width;
        } else {
            let new_width = current_width + 1 + word_width;
            if new_width <= max_width {
                current_line.push(' ');
                current_line.push_str(word);
                current_width = new_width;
            } else {
                lines.push(current_line);
                current_line = word.to_string();
                current_width = word_width;
            }
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}

/// Formats text with a gutter (background-colored single space) on each line,
/// word-wrapped at terminal width. Used to quote remote command output and
/// multi-line diff bodies.
pub fn format_with_gutter(content: &str, left_margin: &str, max_width: Option<usize>) -> String {
    let gutter = Style::new().bg_color(Some(Color::Ansi(AnsiColor::Black)));
    let mut output = String::new();

    let term_width = max_width.unwrap_or_else(get_terminal_width);
    let left_margin_width = left_margin.width();
    let available_width = term_width.saturating_sub(3 + left_margin_width);

    for line in content.lines() {
        for wrapped_line in wrap_text_at_width(line, available_width) {
            output.push_str(&format!(
                "{left_margin}{gutter} {gutter:#}  {wrapped_line}\n"
            ));
        }
    }

    output
}

/// Render a single `ItemStatus` line the way `status`/`pull`/`push` print diffs:
/// `  modified: path`, `+ created: path`, `- deleted: path`, `~ path -> path (sim)`.
pub fn format_status_line(kind: &str, path: &str, detail: Option<&str>) -> String {
    let (prefix, style) = match kind {
        "created" => ("+", ADDITION),
        "deleted" => ("-", DELETION),
        "renamed" => ("~", RENAME),
        _ => (" ", Style::new()),
    };

    let mut line = StyledLine::new();
    line.push_styled(format!("{prefix} {kind}:"), style);
    line.push_raw(format!(" {path}"));
    if let Some(detail) = detail {
        line.push_styled(format!(" {detail}"), HINT);
    }
    line.render()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn styled_string_renders_without_style_as_plain_text() {
        let s = StyledString::raw("hello");
        assert_eq!(s.render(), "hello");
    }

    #[test]
    fn styled_line_width_sums_segments() {
        let mut line = StyledLine::new();
        line.push_raw("ab");
        line.push_styled("cde", ERROR);
        assert_eq!(line.width(), 5);
    }

    #[test]
    fn wrap_text_splits_on_word_boundaries() {
        let wrapped = wrap_text_at_width("one two three", 7);
        assert_eq!(wrapped, vec!["one two".to_string(), "three".to_string()]);
    }

    #[test]
    fn wrap_text_keeps_short_lines_intact() {
        assert_eq!(wrap_text_at_width("short", 80), vec!["short".to_string()]);
    }

    #[test]
    fn format_status_line_prefixes_created_with_plus() {
        let line = format_status_line("created", "a.ts", None);
        assert!(line.contains("+ created:"));
        assert!(line.contains("a.ts"));
    }

    #[test]
    fn format_status_line_includes_rename_detail() {
        let line = format_status_line("renamed", "api/greet.ts", Some("from api/hello.ts, 100%"));
        assert!(line.contains("~ renamed:"));
        assert!(line.contains("api/greet.ts"));
        assert!(line.contains("api/hello.ts"));
    }
}
