//! Game carousel strip: one card per game, the selected card highlighted.

use chat::{Carousel, KeyValueStore};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::action::Focus;
use super::app::TuiApp;
use super::theme::THEME;

const CARD_GAP: &str = "  ";

/// Renders the carousel strip with prev/next arrows.
pub fn render<S: KeyValueStore>(app: &TuiApp<S>, frame: &mut Frame<'_>, area: Rect) {
    let carousel = app.chat.carousel();
    let focused = app.focus == Focus::Carousel;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused {
            THEME.border_focused
        } else {
            THEME.border
        }))
        .title(Span::styled(" Games ", Style::default().fg(THEME.fg_dim)));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if carousel.cards().is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                format!(" Asking about {}", carousel.context()),
                Style::default().fg(THEME.fg_muted),
            )),
            inner,
        );
        return;
    }

    let (spans, current_col) = card_spans(carousel);
    let arrow = |enabled: bool, glyph: &'static str| {
        Span::styled(
            glyph,
            Style::default().fg(if enabled {
                THEME.card_arrow
            } else {
                THEME.fg_muted
            }),
        )
    };

    let strip_width = inner.width.saturating_sub(4);
    let scroll_x = current_col.saturating_sub(strip_width / 3);

    let [left, strip, right] = ratatui::layout::Layout::horizontal([
        ratatui::layout::Constraint::Length(2),
        ratatui::layout::Constraint::Min(0),
        ratatui::layout::Constraint::Length(2),
    ])
    .areas(inner);

    frame.render_widget(Paragraph::new(arrow(carousel.can_previous(), "◀ ")), left);
    frame.render_widget(Paragraph::new(Line::from(spans)).scroll((0, scroll_x)), strip);
    frame.render_widget(Paragraph::new(arrow(carousel.can_next(), " ▶")), right);
}

/// Builds the card spans and the column where the selected card starts.
fn card_spans(carousel: &Carousel) -> (Vec<Span<'static>>, u16) {
    let mut spans = Vec::new();
    let mut col: usize = 0;
    let mut current_col = 0;
    for (i, card) in carousel.cards().iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(CARD_GAP));
            col += CARD_GAP.len();
        }
        let text = format!(" {} ", card.title);
        if i == carousel.index() {
            current_col = col;
            spans.push(Span::styled(
                text.clone(),
                Style::default()
                    .fg(THEME.card_current)
                    .bg(THEME.card_current_bg)
                    .add_modifier(Modifier::BOLD),
            ));
        } else {
            spans.push(Span::styled(
                text.clone(),
                Style::default().fg(THEME.card_other),
            ));
        }
        col += text.chars().count();
    }
    (spans, u16::try_from(current_col).unwrap_or(u16::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::app::tests::make_app;
    use chat::GameCard;
    use ratatui::{Terminal, backend::TestBackend};

    #[test]
    fn selected_card_start_column_tracks_index() {
        let mut carousel = Carousel::new(vec![GameCard::new("Aa"), GameCard::new("Bbb")]);
        assert_eq!(card_spans(&carousel).1, 0);
        carousel.next();
        // " Aa " + gap
        assert_eq!(card_spans(&carousel).1, 6);
    }

    #[test]
    fn selected_card_is_highlighted() {
        let carousel = Carousel::new(vec![GameCard::new("Aa"), GameCard::new("Bbb")]);
        let (spans, _) = card_spans(&carousel);
        assert_eq!(spans[0].style.bg, Some(THEME.card_current_bg));
        assert_eq!(spans[2].style.bg, None);
    }

    #[test]
    fn render_strip_narrow_and_wide() {
        let app = make_app();
        for width in [12, 80] {
            let backend = TestBackend::new(width, 3);
            let mut terminal = Terminal::new(backend).unwrap();
            terminal
                .draw(|frame| render(&app, frame, frame.area()))
                .unwrap();
        }
    }
}
