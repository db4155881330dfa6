//! Markdown to HTML conversion for message bubbles.
//!
//! Two converters are provided:
//!
//! - [`MarkdownMode::Basic`] escapes the text and then applies a fixed set of pattern
//!   substitutions: fenced code blocks, inline code spans, bold emphasis, line breaks.
//! - [`MarkdownMode::Full`] delegates to `pulldown-cmark` and sanitizes its event stream so
//!   that raw HTML is shown as text and script-capable link targets are neutralized.
//!
//! Both produce HTML that is safe to insert into a message list.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, html};
use regex::Regex;

use crate::Error;

static FENCED_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```([A-Za-z0-9_+.#-]*)[ \t]*\n?(.*?)```").expect("fenced code pattern")
});
static INLINE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`\n]+)`").expect("inline code pattern"));
static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("bold pattern"));

/// How message text is turned into HTML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarkdownMode {
    /// Pattern substitution for code blocks, inline code and bold.
    Basic,
    /// CommonMark via `pulldown-cmark`, sanitized.
    #[default]
    Full,
}

impl MarkdownMode {
    /// Convert `text` to HTML using this mode.
    pub fn to_html(&self, text: &str) -> String {
        match self {
            MarkdownMode::Basic => render_basic(text),
            MarkdownMode::Full => render_full(text),
        }
    }
}

impl fmt::Display for MarkdownMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkdownMode::Basic => write!(f, "basic"),
            MarkdownMode::Full => write!(f, "full"),
        }
    }
}

impl FromStr for MarkdownMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(MarkdownMode::Basic),
            "full" => Ok(MarkdownMode::Full),
            other => Err(Error::validation(
                format!("unknown markdown mode '{other}', expected basic or full"),
                Some("markdown".to_string()),
            )),
        }
    }
}

/// Escape the five HTML-significant characters.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Pattern-substitution converter.
pub fn render_basic(text: &str) -> String {
    let mut html = String::with_capacity(text.len() + 32);
    let mut last = 0;
    for caps in FENCED_CODE.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        html.push_str(&render_inline(&text[last..whole.start()]));
        let lang = caps.get(1).map_or("", |m| m.as_str());
        let code = caps.get(2).map_or("", |m| m.as_str());
        if lang.is_empty() {
            html.push_str("<pre><code>");
        } else {
            html.push_str(&format!(
                "<pre><code class=\"language-{}\">",
                escape_html(lang)
            ));
        }
        html.push_str(&escape_html(code));
        html.push_str("</code></pre>");
        last = whole.end();
    }
    html.push_str(&render_inline(&text[last..]));
    html
}

/// Inline code, bold and line breaks over a segment with no fenced code.
fn render_inline(segment: &str) -> String {
    let escaped = escape_html(segment);
    let mut html = String::with_capacity(escaped.len());
    let mut last = 0;
    for caps in INLINE_CODE.captures_iter(&escaped) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        html.push_str(&render_emphasis(&escaped[last..whole.start()]));
        html.push_str("<code>");
        html.push_str(caps.get(1).map_or("", |m| m.as_str()));
        html.push_str("</code>");
        last = whole.end();
    }
    html.push_str(&render_emphasis(&escaped[last..]));
    html
}

fn render_emphasis(escaped: &str) -> String {
    BOLD.replace_all(escaped, "<strong>$1</strong>").replace('\n', "<br>")
}

/// CommonMark converter with sanitization.
pub fn render_full(text: &str) -> String {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_STRIKETHROUGH);
    opts.insert(Options::ENABLE_TABLES);
    opts.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(text, opts).map(|event| match event {
        // Raw HTML is displayed, never interpreted
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: sanitize_url(dest_url, false),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: sanitize_url(dest_url, true),
            title,
            id,
        }),
        other => other,
    });

    let mut html_output = String::with_capacity(text.len() + 32);
    html::push_html(&mut html_output, parser);
    html_output
}

/// Replace link targets that can run script with `#`.
fn sanitize_url(url: CowStr<'_>, image: bool) -> CowStr<'_> {
    // Browsers ignore embedded whitespace and control characters in schemes.
    let normalized: String = url
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .take(32)
        .collect::<String>()
        .to_ascii_lowercase();
    let allowed_data = image
        && normalized.starts_with("data:image/")
        && !normalized.starts_with("data:image/svg");
    if normalized.starts_with("javascript:")
        || normalized.starts_with("vbscript:")
        || (normalized.starts_with("data:") && !allowed_data)
    {
        CowStr::Borrowed("#")
    } else {
        url
    }
}
