//! Session sidebar widget: lists chat sessions with relative timestamps.

use chat::KeyValueStore;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use super::action::Focus;
use super::app::TuiApp;
use super::theme::THEME;

/// Fixed sidebar width in terminal columns.
const SIDEBAR_WIDTH: u16 = 30;

/// Returns the fixed sidebar width in columns.
pub fn sidebar_width() -> u16 {
    SIDEBAR_WIDTH
}

/// Renders the session list with active/hover highlighting and relative timestamps.
pub fn render<S: KeyValueStore>(app: &TuiApp<S>, frame: &mut Frame<'_>, area: Rect) {
    let entries = &app.chat.view().sidebar;
    let focused = app.focus == Focus::Sidebar;
    let focus_hint = if focused {
        Span::styled(" ◉", Style::default().fg(THEME.sidebar_active_indicator))
    } else {
        Span::styled(" [Tab]", Style::default().fg(THEME.fg_muted))
    };
    let header = Line::from(vec![
        Span::styled(
            " Chats ",
            Style::default()
                .fg(THEME.sidebar_active_indicator)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("({})", entries.len()),
            Style::default().fg(THEME.fg_muted),
        ),
        focus_hint,
    ]);

    let border_style = if focused {
        Style::default().fg(THEME.border_focused)
    } else {
        Style::default().fg(THEME.border)
    };
    let block = Block::default()
        .borders(Borders::LEFT | Borders::TOP | Borders::BOTTOM)
        .border_style(border_style)
        .title(header);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if entries.is_empty() {
        let empty_msg = Paragraph::new(vec![
            Line::from(Span::styled(
                " No chats yet",
                Style::default().fg(THEME.fg_muted),
            )),
            Line::from(Span::styled(
                " Send a message to start",
                Style::default().fg(THEME.fg_muted),
            )),
        ]);
        frame.render_widget(empty_msg, inner);
        return;
    }

    let mut lines: Vec<Line<'_>> = Vec::new();
    let max_name_width = inner.width.saturating_sub(2) as usize;

    for (idx, entry) in entries.iter().enumerate() {
        let is_hovered = Some(idx) == app.sidebar_hover;

        let indicator = if entry.active {
            Span::styled("▌", Style::default().fg(THEME.sidebar_active_indicator))
        } else if is_hovered {
            Span::styled(
                "▌",
                Style::default().fg(if focused {
                    THEME.sidebar_active_indicator
                } else {
                    THEME.sidebar_hover
                }),
            )
        } else {
            Span::raw(" ")
        };

        let name = truncate_str(&entry.title, max_name_width.saturating_sub(2));
        let name_style = if entry.active {
            Style::default().fg(THEME.fg).add_modifier(Modifier::BOLD)
        } else if is_hovered {
            Style::default().fg(THEME.fg)
        } else {
            Style::default().fg(THEME.sidebar_text)
        };

        lines.push(Line::from(vec![
            indicator,
            Span::styled(format!(" {name}"), name_style),
        ]));

        let time_style = if entry.active {
            Style::default().fg(THEME.sidebar_time)
        } else {
            Style::default().fg(THEME.fg_muted)
        };
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(format_relative_time(&entry.created_at), time_style),
        ]));

        if idx < entries.len() - 1 {
            lines.push(Line::from(Span::styled(
                "─".repeat(max_name_width),
                Style::default().fg(THEME.sidebar_divider),
            )));
        }
    }

    // Keep the hovered row visible: three lines per entry.
    let hover_row = app.sidebar_hover.unwrap_or(0) as u16 * 3;
    let content_height = lines.len() as u16;
    let visible_height = inner.height;
    let max_scroll = content_height.saturating_sub(visible_height);
    let follow = (hover_row + 2).saturating_sub(visible_height);
    let scroll = app.sidebar_scroll.max(follow).min(max_scroll);

    let list = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));

    frame.render_widget(list, inner);
}

/// Truncates a string to `max_len` characters, appending `…` if shortened.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if max_len == 0 {
        return String::new();
    }
    if s.is_empty() {
        return "(new session)".to_string();
    }
    let first_line = s.lines().next().unwrap_or(s);
    if first_line.chars().count() <= max_len {
        first_line.to_string()
    } else {
        let truncated: String = first_line.chars().take(max_len.saturating_sub(1)).collect();
        format!("{truncated}…")
    }
}

/// Formats a UTC timestamp as a human-readable relative time (e.g. "5m ago").
pub fn format_relative_time(dt: &chrono::DateTime<chrono::Utc>) -> String {
    let now = chrono::Utc::now();
    let diff = now.signed_duration_since(*dt);

    if diff.num_seconds() < 60 {
        "just now".to_string()
    } else if diff.num_minutes() < 60 {
        format!("{}m ago", diff.num_minutes())
    } else if diff.num_hours() < 24 {
        format!("{}h ago", diff.num_hours())
    } else if diff.num_days() < 7 {
        format!("{}d ago", diff.num_days())
    } else {
        dt.format("%b %d").to_string()
    }
}
