//! Chat log widget: user and bot messages, with markup styling for bot replies.

use chat::KeyValueStore;
use chat::markup::{self, BlockKind, Inline};
use chat::render::TYPING_TEXT;
use proto::Message;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use super::app::TuiApp;
use super::theme::THEME;

const USER_LABEL: &str = "You: ";
const BOT_LABEL: &str = "Bot: ";
/// Continuation indent; matches the label width.
const INDENT: &str = "     ";

/// Renders the log of the displayed session, bottom-anchored.
pub fn render<S: KeyValueStore>(app: &TuiApp<S>, frame: &mut Frame<'_>, area: Rect) {
    let view = app.chat.view();
    let mut lines: Vec<Line<'static>> = Vec::new();

    for message in &view.log {
        lines.push(Line::from(""));
        lines.extend(message_lines(message, app.markup));
    }
    if view.typing {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            label(BOT_LABEL, THEME.bot_label),
            Span::styled(
                TYPING_TEXT,
                Style::default()
                    .fg(THEME.typing)
                    .add_modifier(Modifier::SLOW_BLINK),
            ),
        ]));
    }

    let title = app
        .chat
        .registry()
        .active()
        .map(|s| format!(" {} ", s.title))
        .unwrap_or_else(|| " New chat ".to_string());

    let inner_width = area.width.saturating_sub(2);
    let content_height = wrapped_height(&lines, inner_width);
    let visible_height = area.height.saturating_sub(2);
    let max_scroll = content_height.saturating_sub(visible_height);
    let scroll = max_scroll.saturating_sub(app.history_scroll);

    let history = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(THEME.border))
                .title(Span::styled(title, Style::default().fg(THEME.fg_dim))),
        )
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));

    frame.render_widget(history, area);
}

fn label(text: &'static str, color: ratatui::style::Color) -> Span<'static> {
    Span::styled(
        text,
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )
}

/// Converts one message into styled lines. User text is always literal.
fn message_lines(message: &Message, markup_enabled: bool) -> Vec<Line<'static>> {
    let (prefix, color) = if message.is_user() {
        (USER_LABEL, THEME.user_label)
    } else {
        (BOT_LABEL, THEME.bot_label)
    };

    let mut body: Vec<Vec<Span<'static>>> = if message.is_user() || !markup_enabled {
        message
            .text
            .lines()
            .map(|l| vec![Span::raw(l.to_string())])
            .collect()
    } else {
        markup::parse(&message.text)
            .into_iter()
            .map(|block| block_spans(block.kind, block.inlines))
            .collect()
    };
    if body.is_empty() {
        body.push(Vec::new());
    }

    body.into_iter()
        .enumerate()
        .map(|(i, spans)| {
            let lead = if i == 0 {
                label(prefix, color)
            } else {
                Span::raw(INDENT)
            };
            let mut line = vec![lead];
            line.extend(spans);
            Line::from(line)
        })
        .collect()
}

fn block_spans(kind: BlockKind, inlines: Vec<Inline>) -> Vec<Span<'static>> {
    let base = match kind {
        BlockKind::Heading => Style::default()
            .fg(THEME.heading)
            .add_modifier(Modifier::BOLD),
        _ => Style::default().fg(THEME.fg),
    };
    let mut spans = Vec::new();
    if kind == BlockKind::Bullet {
        spans.push(Span::styled("• ", Style::default().fg(THEME.fg_dim)));
    }
    push_inlines(&mut spans, inlines, base);
    spans
}

fn push_inlines(spans: &mut Vec<Span<'static>>, inlines: Vec<Inline>, style: Style) {
    for inline in inlines {
        match inline {
            Inline::Text(t) => spans.push(Span::styled(t, style)),
            Inline::Bold(inner) => push_inlines(spans, inner, style.add_modifier(Modifier::BOLD)),
            Inline::Italic(inner) => {
                push_inlines(spans, inner, style.add_modifier(Modifier::ITALIC))
            }
            Inline::Code(t) => spans.push(Span::styled(t, Style::default().fg(THEME.code))),
            Inline::Link { label, url } => {
                spans.push(Span::styled(
                    label,
                    style.fg(THEME.link).add_modifier(Modifier::UNDERLINED),
                ));
                spans.push(Span::styled(
                    format!(" <{url}>"),
                    Style::default().fg(THEME.fg_muted),
                ));
            }
        }
    }
}

/// Rows the lines occupy once wrapped to `width` columns.
fn wrapped_height(lines: &[Line<'_>], width: u16) -> u16 {
    if width == 0 {
        return 0;
    }
    let width = usize::from(width);
    let rows: usize = lines
        .iter()
        .map(|line| line.width().div_ceil(width).max(1))
        .sum();
    u16::try_from(rows).unwrap_or(u16::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn user_text_is_never_styled() {
        let lines = message_lines(&Message::user("**not bold**"), true);
        assert_eq!(plain(&lines[0]), "You: **not bold**");
    }

    #[test]
    fn bot_markup_is_styled_when_enabled() {
        let lines = message_lines(&Message::bot("**Tip**: use `roll`"), true);
        let bold = lines[0]
            .spans
            .iter()
            .find(|s| s.content == "Tip")
            .expect("bold span");
        assert!(bold.style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(plain(&lines[0]), "Bot: Tip: use roll");
    }

    #[test]
    fn bot_markup_is_literal_when_disabled() {
        let lines = message_lines(&Message::bot("**Tip**"), false);
        assert_eq!(plain(&lines[0]), "Bot: **Tip**");
    }

    #[test]
    fn links_show_their_target() {
        let lines = message_lines(&Message::bot("[wiki](https://w.io/a)"), true);
        assert_eq!(plain(&lines[0]), "Bot: wiki <https://w.io/a>");
    }

    #[test]
    fn bold_link_keeps_bold_and_target() {
        let lines = message_lines(&Message::bot("**[map](https://w.io/m)**"), true);
        let label = lines[0]
            .spans
            .iter()
            .find(|s| s.content == "map")
            .expect("link span");
        assert!(label.style.add_modifier.contains(Modifier::BOLD));
        assert!(label.style.add_modifier.contains(Modifier::UNDERLINED));
        assert_eq!(plain(&lines[0]), "Bot: map <https://w.io/m>");
    }

    #[test]
    fn continuation_lines_are_indented() {
        let lines = message_lines(&Message::bot("one\n- two"), true);
        assert_eq!(lines.len(), 2);
        assert_eq!(plain(&lines[1]), "     • two");
    }

    #[test]
    fn wrapped_height_counts_wrapped_rows() {
        let lines = vec![Line::from("a".repeat(25)), Line::from("")];
        assert_eq!(wrapped_height(&lines, 10), 4);
        assert_eq!(wrapped_height(&lines, 0), 0);
    }
}
