//! TUI application state, key mapping, and layout.

use chat::{ChatController, Command, FileStore, KeyValueStore, TranscriptView};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Position, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use tracing::debug;

use super::action::{Action, Focus};
use super::theme::THEME;
use super::{carousel, chat as chat_widget, sidebar, status};

/// Full state for the terminal chat.
pub struct TuiApp<S = FileStore> {
    /// Chat core; its [`TranscriptView`] is the render model for the log.
    pub chat: ChatController<S, TranscriptView>,
    /// Text typed in the input box, not yet submitted.
    pub input: String,
    /// Cursor position within `input` (byte offset).
    pub cursor_pos: usize,
    /// Panel receiving navigation keys.
    pub focus: Focus,
    /// Hovered sidebar row.
    pub sidebar_hover: Option<usize>,
    /// Sidebar scroll offset.
    pub sidebar_scroll: u16,
    /// Lines scrolled up from the bottom of the log.
    pub history_scroll: u16,
    /// Spinner animation tick counter.
    pub spinner_tick: u8,
    /// Whether the user requested exit.
    pub should_quit: bool,
    /// Interpret markup in bot replies.
    pub markup: bool,
    /// Relay endpoint shown in the status bar.
    pub relay_label: String,
}

impl<S: KeyValueStore> TuiApp<S> {
    /// Wraps a controller and performs the first draw into its view.
    pub fn new(
        mut chat: ChatController<S, TranscriptView>,
        markup: bool,
        relay_label: impl Into<String>,
    ) -> Self {
        chat.render_all();
        Self {
            chat,
            input: String::new(),
            cursor_pos: 0,
            focus: Focus::Input,
            sidebar_hover: None,
            sidebar_scroll: 0,
            history_scroll: 0,
            spinner_tick: 0,
            should_quit: false,
            markup,
            relay_label: relay_label.into(),
        }
    }

    /// Whether a relay request is in flight.
    pub fn is_pending(&self) -> bool {
        self.chat.is_pending()
    }

    /// Take the current input and reset it.
    pub fn take_input(&mut self) -> String {
        self.cursor_pos = 0;
        std::mem::take(&mut self.input)
    }

    // ── Input handling ───────────────────────────────────────

    /// Maps a key press to an action for the current focus.
    pub fn map_key(&self, key: KeyEvent) -> Option<Action> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => return Some(Action::Quit),
            KeyCode::Char('n') if ctrl => return Some(Action::NewSession),
            KeyCode::Left if ctrl => return Some(Action::CarouselPrevious),
            KeyCode::Right if ctrl => return Some(Action::CarouselNext),
            KeyCode::Tab => return Some(Action::CycleFocus),
            KeyCode::Esc if self.focus == Focus::Input => return Some(Action::Quit),
            KeyCode::Esc => return Some(Action::FocusInput),
            KeyCode::PageUp => return Some(Action::ScrollUp(10)),
            KeyCode::PageDown => return Some(Action::ScrollDown(10)),
            _ => {}
        }

        match self.focus {
            Focus::Input => match key.code {
                KeyCode::Enter => Some(Action::SubmitInput),
                KeyCode::Backspace => Some(Action::DeleteChar),
                KeyCode::Left => Some(Action::MoveCursorLeft),
                KeyCode::Right => Some(Action::MoveCursorRight),
                KeyCode::Up => Some(Action::ScrollUp(1)),
                KeyCode::Down => Some(Action::ScrollDown(1)),
                KeyCode::Char(c) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
                    Some(Action::InsertChar(c))
                }
                _ => None,
            },
            Focus::Sidebar => match key.code {
                KeyCode::Up => Some(Action::SidebarMove(-1)),
                KeyCode::Down => Some(Action::SidebarMove(1)),
                KeyCode::Enter => Some(Action::SelectSidebarSession),
                KeyCode::Char('n') => Some(Action::NewSession),
                _ => None,
            },
            Focus::Carousel => match key.code {
                KeyCode::Left => Some(Action::CarouselPrevious),
                KeyCode::Right => Some(Action::CarouselNext),
                KeyCode::Enter => Some(Action::FocusInput),
                _ => None,
            },
        }
    }

    /// Handles a key press; returns the side effect to run.
    pub fn handle_key(&mut self, key: KeyEvent) -> Command {
        match self.map_key(key) {
            Some(action) => self.update(action),
            None => Command::None,
        }
    }

    /// Applies one action. The only place TUI state changes.
    pub fn update(&mut self, action: Action) -> Command {
        match action {
            Action::InsertChar(c) => {
                if !self.is_pending() {
                    self.input.insert(self.cursor_pos, c);
                    self.cursor_pos += c.len_utf8();
                }
            }
            Action::DeleteChar => {
                if self.cursor_pos > 0 && !self.is_pending() {
                    let prev = self.input[..self.cursor_pos]
                        .char_indices()
                        .last()
                        .map(|(i, _)| i)
                        .unwrap_or(0);
                    self.input.drain(prev..self.cursor_pos);
                    self.cursor_pos = prev;
                }
            }
            Action::MoveCursorLeft => {
                if self.cursor_pos > 0 {
                    self.cursor_pos = self.input[..self.cursor_pos]
                        .char_indices()
                        .last()
                        .map(|(i, _)| i)
                        .unwrap_or(0);
                }
            }
            Action::MoveCursorRight => {
                if self.cursor_pos < self.input.len() {
                    self.cursor_pos = self.input[self.cursor_pos..]
                        .char_indices()
                        .nth(1)
                        .map(|(i, _)| self.cursor_pos + i)
                        .unwrap_or(self.input.len());
                }
            }
            Action::SubmitInput => {
                if self.is_pending() || self.input.trim().is_empty() {
                    return Command::None;
                }
                let text = self.take_input();
                debug!(chars = text.len(), "Input submitted");
                self.history_scroll = 0;
                return self.chat.update(chat::Action::Submit(text));
            }
            Action::ScrollUp(n) => {
                self.history_scroll = self.history_scroll.saturating_add(n);
            }
            Action::ScrollDown(n) => {
                self.history_scroll = self.history_scroll.saturating_sub(n);
            }
            Action::CycleFocus => {
                self.focus = self.focus.next();
                if self.focus == Focus::Sidebar && self.sidebar_hover.is_none() {
                    self.sidebar_hover = self.active_sidebar_index().or(
                        (!self.chat.view().sidebar.is_empty()).then_some(0),
                    );
                }
            }
            Action::FocusInput => self.focus = Focus::Input,
            Action::SidebarMove(delta) => {
                let len = self.chat.view().sidebar.len();
                if len > 0 {
                    let current = self.sidebar_hover.unwrap_or(0) as i64;
                    let next = (current + i64::from(delta)).clamp(0, len as i64 - 1);
                    self.sidebar_hover = Some(next as usize);
                }
            }
            Action::SelectSidebarSession => {
                let id = self
                    .sidebar_hover
                    .and_then(|i| self.chat.view().sidebar.get(i))
                    .map(|entry| entry.id.clone());
                if let Some(id) = id {
                    self.chat.update(chat::Action::SelectSession(id));
                    self.history_scroll = 0;
                    self.focus = Focus::Input;
                }
            }
            Action::NewSession => {
                self.chat.update(chat::Action::NewSession);
                self.history_scroll = 0;
                self.sidebar_hover = None;
                self.focus = Focus::Input;
            }
            Action::CarouselNext => {
                self.chat.update(chat::Action::CarouselNext);
            }
            Action::CarouselPrevious => {
                self.chat.update(chat::Action::CarouselPrevious);
            }
            Action::RelayCompleted(result) => {
                self.chat.update(chat::Action::RelayCompleted(result));
                self.history_scroll = 0;
            }
            Action::Tick => {
                self.spinner_tick = self.spinner_tick.wrapping_add(1);
            }
            Action::Quit => self.should_quit = true,
        }
        Command::None
    }

    fn active_sidebar_index(&self) -> Option<usize> {
        self.chat.view().sidebar.iter().position(|e| e.active)
    }

    // ── Rendering ────────────────────────────────────────────

    /// Render the entire TUI into the given frame.
    pub fn render(&self, frame: &mut Frame<'_>) {
        // Layout: carousel(3) | body(fill) | status(1) | input(3)
        let rows = Layout::vertical([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

        carousel::render(self, frame, rows[0]);

        let body = Layout::horizontal([
            Constraint::Length(sidebar::sidebar_width()),
            Constraint::Min(0),
        ])
        .split(rows[1]);
        sidebar::render(self, frame, body[0]);
        chat_widget::render(self, frame, body[1]);

        status::render(self, frame, rows[2]);
        self.render_input(frame, rows[3]);
    }

    fn render_input(&self, frame: &mut Frame<'_>, area: Rect) {
        let focused = self.focus == Focus::Input;
        let border = if focused && !self.is_pending() {
            THEME.border_focused
        } else {
            THEME.border
        };
        let content = if self.is_pending() {
            Line::from(Span::styled(
                "Waiting for reply...",
                Style::default().fg(THEME.fg_muted),
            ))
        } else if self.input.is_empty() {
            Line::from(Span::styled(
                "Ask about the selected game...",
                Style::default().fg(THEME.fg_muted),
            ))
        } else {
            Line::from(Span::styled(self.input.as_str(), Style::default().fg(THEME.fg)))
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border));
        frame.render_widget(Paragraph::new(content).block(block), area);

        if focused && !self.is_pending() {
            let cursor_cols = self.input[..self.cursor_pos].chars().count() as u16;
            frame.set_cursor_position(Position {
                x: area.x + 1 + cursor_cols.min(area.width.saturating_sub(3)),
                y: area.y + 1,
            });
        }
    }
}
