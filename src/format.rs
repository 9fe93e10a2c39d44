//! Response formatting.
//!
//! Model answers use a small markdown subset: `**bold**`, `*italic*` and
//! line breaks.  The [`Formatter`] rewrites that subset into display markup
//! for one of several targets.  Substitution order is fixed: bold first,
//! then italic, then every leftover `*` becomes a space, then line breaks.

use std::sync::LazyLock;

use regex::Regex;

static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("bold pattern is valid"));
static ITALIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*([^*\n]+?)\*").expect("italic pattern is valid"));

const ANSI_BOLD: &str = "\x1b[1m";
const ANSI_ITALIC: &str = "\x1b[3m";
const ANSI_RESET: &str = "\x1b[0m";

/// Target markup for formatted answers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MarkupStyle {
    /// `<b>`, `<i>` and `<br>` tags.
    #[default]
    Html,
    /// ANSI SGR sequences for a terminal.
    Ansi,
    /// Markers removed, line breaks kept.
    Plain,
}

impl MarkupStyle {
    fn bold(&self) -> (&'static str, &'static str) {
        match self {
            MarkupStyle::Html => ("<b>", "</b>"),
            MarkupStyle::Ansi => (ANSI_BOLD, ANSI_RESET),
            MarkupStyle::Plain => ("", ""),
        }
    }

    fn italic(&self) -> (&'static str, &'static str) {
        match self {
            MarkupStyle::Html => ("<i>", "</i>"),
            MarkupStyle::Ansi => (ANSI_ITALIC, ANSI_RESET),
            MarkupStyle::Plain => ("", ""),
        }
    }

    fn line_break(&self) -> &'static str {
        match self {
            MarkupStyle::Html => "<br>",
            MarkupStyle::Ansi | MarkupStyle::Plain => "\n",
        }
    }
}

/// Converts model answers into display markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Formatter {
    style: MarkupStyle,
    escape: bool,
}

impl Formatter {
    /// Creates a formatter for `style`.
    ///
    /// HTML output escapes `&`, `<` and `>` in the model text so that an
    /// answer cannot inject markup of its own.
    pub fn new(style: MarkupStyle) -> Self {
        Self {
            style,
            escape: true,
        }
    }

    /// Creates a formatter that passes model text through unescaped.
    pub fn trusted(style: MarkupStyle) -> Self {
        Self {
            style,
            escape: false,
        }
    }

    /// Returns the target markup style.
    pub fn style(&self) -> MarkupStyle {
        self.style
    }

    /// Formats `raw` for display.
    pub fn format(&self, raw: &str) -> String {
        let escaped;
        let raw = if self.escape && self.style == MarkupStyle::Html {
            escaped = escape_html(raw);
            escaped.as_str()
        } else {
            raw
        };

        let (open, close) = self.style.bold();
        let text = BOLD.replace_all(raw, format!("{open}${{1}}{close}").as_str());
        let (open, close) = self.style.italic();
        let text = ITALIC.replace_all(&text, format!("{open}${{1}}{close}").as_str());
        let text = text.replace('*', " ");
        match self.style.line_break() {
            "\n" => text,
            line_break => text.replace('\n', line_break),
        }
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new(MarkupStyle::default())
    }
}

/// Formats `raw` as HTML markup.  The model text is not escaped.
pub fn format(raw: &str) -> String {
    Formatter::trusted(MarkupStyle::Html).format(raw)
}

/// Formats `raw` as HTML markup, escaping `&`, `<` and `>` in the model
/// text first.
pub fn format_escaped(raw: &str) -> String {
    Formatter::new(MarkupStyle::Html).format(raw)
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}
