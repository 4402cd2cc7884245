//! Status bar widget: relay endpoint, request spinner, key hints, and version.

use chat::KeyValueStore;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use super::action::Focus;
use super::app::TuiApp;
use super::theme::THEME;

/// Braille-pattern spinner frames for the status bar animation.
const SPINNER: &[char] = &['⣾', '⣽', '⣻', '⢿', '⡿', '⣟', '⣯', '⣷'];

const VERSION: &str = concat!("v", env!("CARGO_PKG_VERSION"));

/// Key hints for the focused panel.
fn hints(focus: Focus) -> &'static str {
    match focus {
        Focus::Input => "  Enter:send  ↑↓:scroll  Ctrl+←→:game  Tab:chats  Ctrl+C:quit",
        Focus::Sidebar => "  ↑↓:navigate  Enter:open  n:new  Tab:games  Esc:back",
        Focus::Carousel => "  ←→:game  Enter:done  Tab:input  Esc:back",
    }
}

/// Renders the one-line status bar.
pub fn render<S: KeyValueStore>(app: &TuiApp<S>, frame: &mut Frame<'_>, area: Rect) {
    let context = app.chat.carousel().context().to_string();
    let mut spans = vec![
        Span::styled(
            format!(" {context} "),
            Style::default().fg(THEME.fg).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("⇄ {} ", app.relay_label),
            Style::default().fg(THEME.status_relay),
        ),
    ];

    if app.is_pending() {
        let spinner = SPINNER[(app.spinner_tick as usize) % SPINNER.len()];
        spans.push(Span::styled(
            format!(" {spinner} Waiting for the AI... "),
            Style::default().fg(THEME.status_spinner),
        ));
    } else if let Some(failure) = &app.chat.view().save_failure {
        spans.push(Span::styled(
            format!(" ⚠ Not saved: {failure} "),
            Style::default().fg(THEME.warning),
        ));
    } else {
        spans.push(Span::styled(
            hints(app.focus),
            Style::default().fg(THEME.status_hint),
        ));
    }

    // Split to right-align the version
    let chunks = Layout::horizontal([Constraint::Min(0), Constraint::Length(10)]).split(area);

    frame.render_widget(Paragraph::new(Line::from(spans)), chunks[0]);

    let version_text = Line::from(Span::styled(
        format!("{VERSION}  "),
        Style::default().fg(THEME.fg_muted),
    ));
    frame.render_widget(
        Paragraph::new(version_text).alignment(ratatui::layout::Alignment::Right),
        chunks[1],
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::action::Action;
    use crate::tui::app::tests::make_app;
    use chat::MemoryStore;
    use ratatui::{Terminal, backend::TestBackend};

    fn render_status(app: &TuiApp<MemoryStore>) -> String {
        let backend = TestBackend::new(120, 1);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| render(app, frame, frame.area()))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn spinner_constant_has_eight_frames() {
        assert_eq!(SPINNER.len(), 8);
    }

    #[test]
    fn idle_shows_game_and_input_hints() {
        let app = make_app();
        let line = render_status(&app);
        assert!(line.contains("Elden Ring"));
        assert!(line.contains("Enter:send"));
        assert!(line.contains(VERSION));
    }

    #[test]
    fn sidebar_focus_shows_sidebar_hints() {
        let mut app = make_app();
        app.update(Action::CycleFocus);
        assert!(render_status(&app).contains("n:new"));
    }

    #[test]
    fn pending_shows_spinner() {
        let mut app = make_app();
        app.input = "hi".into();
        app.cursor_pos = 2;
        app.update(Action::SubmitInput);
        app.spinner_tick = 9;
        let line = render_status(&app);
        assert!(line.contains("Waiting for the AI"));
        assert!(line.contains(SPINNER[1]));
    }

    #[test]
    fn save_failure_is_reported() {
        let mut app = make_app();
        app.chat.view_mut().save_failure = Some("quota exceeded".into());
        assert!(render_status(&app).contains("Not saved: quota exceeded"));
    }
}
