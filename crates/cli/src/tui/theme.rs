//! Centralized TUI theme built on ratatui's Tailwind CSS palette.

use ratatui::style::Color;
use ratatui::style::palette::tailwind;

/// The application theme. All visual tokens in one place.
pub struct Theme {
    // ── Base ──
    /// Primary foreground/text color.
    pub fg: Color,
    /// Dimmed foreground for less prominent text.
    pub fg_dim: Color,
    /// Muted foreground for minimal-emphasis elements.
    pub fg_muted: Color,
    /// Default border color for panels.
    pub border: Color,
    /// Border color for the focused panel.
    pub border_focused: Color,

    // ── Semantic ──
    /// Warning indicators (save failures).
    pub warning: Color,

    // ── Chat roles ──
    /// Label color for user messages.
    pub user_label: Color,
    /// Label color for bot messages.
    pub bot_label: Color,
    /// Inline code spans.
    pub code: Color,
    /// Link labels.
    pub link: Color,
    /// Heading lines.
    pub heading: Color,
    /// Typing placeholder.
    pub typing: Color,

    // ── Status bar ──
    /// Relay endpoint label.
    pub status_relay: Color,
    /// Spinner animation.
    pub status_spinner: Color,
    /// Keybinding hints.
    pub status_hint: Color,

    // ── Sidebar ──
    /// Indicator mark for the active session entry.
    pub sidebar_active_indicator: Color,
    /// Hover highlight for sidebar entries.
    pub sidebar_hover: Color,
    /// Session title text.
    pub sidebar_text: Color,
    /// Relative timestamp.
    pub sidebar_time: Color,
    /// Divider between entries.
    pub sidebar_divider: Color,

    // ── Carousel ──
    /// Selected card text.
    pub card_current: Color,
    /// Selected card background.
    pub card_current_bg: Color,
    /// Unselected card text.
    pub card_other: Color,
    /// Enabled prev/next arrow.
    pub card_arrow: Color,
}

impl Theme {
    /// The default dark theme using Tailwind palette.
    pub const fn default_dark() -> Self {
        Self {
            fg: tailwind::SLATE.c100,
            fg_dim: tailwind::SLATE.c400,
            fg_muted: tailwind::SLATE.c500,
            border: tailwind::SLATE.c700,
            border_focused: tailwind::VIOLET.c400,

            warning: tailwind::AMBER.c500,

            user_label: tailwind::CYAN.c400,
            bot_label: tailwind::VIOLET.c400,
            code: tailwind::AMBER.c300,
            link: tailwind::SKY.c400,
            heading: tailwind::VIOLET.c300,
            typing: tailwind::SLATE.c500,

            status_relay: tailwind::SKY.c400,
            status_spinner: tailwind::AMBER.c400,
            status_hint: tailwind::SLATE.c500,

            sidebar_active_indicator: tailwind::CYAN.c400,
            sidebar_hover: tailwind::SLATE.c600,
            sidebar_text: tailwind::SLATE.c300,
            sidebar_time: tailwind::SLATE.c500,
            sidebar_divider: tailwind::SLATE.c800,

            card_current: tailwind::SLATE.c950,
            card_current_bg: tailwind::VIOLET.c400,
            card_other: tailwind::SLATE.c400,
            card_arrow: tailwind::VIOLET.c300,
        }
    }
}

/// Global theme instance.
pub const THEME: Theme = Theme::default_dark();
