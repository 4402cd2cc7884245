//! Elm Architecture (TEA) action type for the terminal front-end.
//!
//! Key presses become [`Action`] values; `TuiApp::update()` applies them
//! and returns a [`chat::Command`] for the event loop to execute.

use proto::RelayError;

/// Which panel receives navigation keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// The message input (default).
    Input,
    /// The session sidebar.
    Sidebar,
    /// The game carousel strip.
    Carousel,
}

impl Focus {
    /// Next panel in Tab order.
    pub fn next(self) -> Self {
        match self {
            Focus::Input => Focus::Sidebar,
            Focus::Sidebar => Focus::Carousel,
            Focus::Carousel => Focus::Input,
        }
    }
}

/// Every state mutation in the TUI.
#[derive(Debug)]
pub enum Action {
    // ── Input ────────────────────────────────────────────────
    /// Insert a character at the cursor.
    InsertChar(char),
    /// Delete the character before the cursor.
    DeleteChar,
    /// Move the input cursor one character left.
    MoveCursorLeft,
    /// Move the input cursor one character right.
    MoveCursorRight,
    /// Submit the current input.
    SubmitInput,

    // ── Navigation ───────────────────────────────────────────
    /// Scroll the log up by `n` lines.
    ScrollUp(u16),
    /// Scroll the log down by `n` lines.
    ScrollDown(u16),
    /// Move keyboard focus to the next panel.
    CycleFocus,
    /// Return focus to the input.
    FocusInput,

    // ── Sidebar ──────────────────────────────────────────────
    /// Move the sidebar hover by `delta` rows.
    SidebarMove(i16),
    /// Open the hovered session.
    SelectSidebarSession,
    /// Start a new session.
    NewSession,

    // ── Carousel ─────────────────────────────────────────────
    /// Next game card.
    CarouselNext,
    /// Previous game card.
    CarouselPrevious,

    // ── Relay / system ───────────────────────────────────────
    /// The spawned relay request finished.
    RelayCompleted(Result<String, RelayError>),
    /// Periodic spinner tick.
    Tick,
    /// Request application quit.
    Quit,
}
