//! Chat renderer: message → safe HTML fragment.
//!
//! Pure view logic with no state of its own. Front-ends decide where the
//! fragment goes and how the log scrolls.

use proto::{Message, Role};

use crate::markup::{self, BlockKind, Inline};

/// CSS class carried by every message element.
pub const MESSAGE_CLASS: &str = "message";

/// CSS class of the transient "typing" placeholder.
pub const TYPING_CLASS: &str = "typing-indicator";

/// Text shown inside the typing placeholder.
pub const TYPING_TEXT: &str = "...";

/// Role-specific CSS class (`user-message` / `bot-message`).
pub fn role_class(role: Role) -> &'static str {
    match role {
        Role::User => "user-message",
        Role::Bot => "bot-message",
    }
}

/// Message ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    /// Author of the message.
    pub role: Role,
    /// Escaped HTML fragment.
    pub html: String,
}

impl RenderedMessage {
    /// Space-separated class list for the message element.
    pub fn class_list(&self) -> String {
        format!("{MESSAGE_CLASS} {}", role_class(self.role))
    }
}

/// Converts messages to HTML, with or without markup interpretation.
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    markup: bool,
}

impl Default for Renderer {
    fn default() -> Self {
        Self { markup: true }
    }
}

impl Renderer {
    /// Creates a renderer; `markup = false` renders text literally.
    pub fn new(markup: bool) -> Self {
        Self { markup }
    }

    /// Whether markup is interpreted.
    pub fn markup_enabled(&self) -> bool {
        self.markup
    }

    /// Renders one message.
    pub fn render(&self, message: &Message) -> RenderedMessage {
        let html = if self.markup {
            markup_to_html(&message.text)
        } else {
            literal_html(&message.text)
        };
        RenderedMessage {
            role: message.role,
            html,
        }
    }
}

/// Escapes text and keeps line breaks, without interpreting markup.
pub fn literal_html(text: &str) -> String {
    text.lines().map(escape).collect::<Vec<_>>().join("<br>")
}

/// Renders lightweight markup to HTML.
pub fn markup_to_html(text: &str) -> String {
    let mut html = String::new();
    let mut paragraph: Vec<String> = Vec::new();
    let mut bullets: Vec<String> = Vec::new();

    for block in markup::parse(text) {
        if block.kind != BlockKind::Bullet {
            flush_bullets(&mut html, &mut bullets);
        }
        if block.kind != BlockKind::Paragraph {
            flush_paragraph(&mut html, &mut paragraph);
        }
        let inner = inlines_to_html(&block.inlines);
        match block.kind {
            BlockKind::Paragraph => paragraph.push(inner),
            BlockKind::Bullet => bullets.push(inner),
            BlockKind::Heading => {
                html.push_str("<p><strong>");
                html.push_str(&inner);
                html.push_str("</strong></p>");
            }
            BlockKind::Blank => {}
        }
    }
    flush_bullets(&mut html, &mut bullets);
    flush_paragraph(&mut html, &mut paragraph);
    html
}

fn flush_paragraph(html: &mut String, lines: &mut Vec<String>) {
    if lines.is_empty() {
        return;
    }
    html.push_str("<p>");
    html.push_str(&lines.join("<br>"));
    html.push_str("</p>");
    lines.clear();
}

fn flush_bullets(html: &mut String, items: &mut Vec<String>) {
    if items.is_empty() {
        return;
    }
    html.push_str("<ul>");
    for item in items.drain(..) {
        html.push_str("<li>");
        html.push_str(&item);
        html.push_str("</li>");
    }
    html.push_str("</ul>");
}

fn inlines_to_html(inlines: &[Inline]) -> String {
    let mut out = String::new();
    for inline in inlines {
        match inline {
            Inline::Text(t) => out.push_str(&escape(t)),
            Inline::Bold(inner) => {
                out.push_str(&format!("<strong>{}</strong>", inlines_to_html(inner)))
            }
            Inline::Italic(inner) => out.push_str(&format!("<em>{}</em>", inlines_to_html(inner))),
            Inline::Code(t) => out.push_str(&format!("<code>{}</code>", escape(t))),
            Inline::Link { label, url } => match safe_url(url) {
                Some(url) => out.push_str(&format!(
                    r#"<a href="{}" target="_blank" rel="noopener noreferrer">{}</a>"#,
                    escape(url),
                    escape(label)
                )),
                None => out.push_str(&escape(label)),
            },
        }
    }
    out
}

/// Accepts only `http`, `https` and `mailto` targets.
pub fn safe_url(url: &str) -> Option<&str> {
    let lower = url.to_ascii_lowercase();
    ["https://", "http://", "mailto:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
        .then_some(url)
}

/// HTML-escapes text for element content and quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
