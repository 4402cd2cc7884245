//! Game carousel: a clamped index over an ordered list of cards.
//!
//! The selected card decides which game the assistant is scoped to.
//! Nothing here is persisted; a reload starts at index 0.

use proto::GENERAL_GAME_CONTEXT;
use serde::{Deserialize, Serialize};
use tracing::info;

/// One selectable card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameCard {
    /// Text shown on the card.
    pub title: String,
    /// Game-name attribute used as chat context. `None` falls back to
    /// the general sentinel.
    #[serde(default)]
    pub game: Option<String>,
}

impl GameCard {
    /// Card whose game attribute equals its title.
    pub fn new(title: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            game: Some(title.clone()),
            title,
        }
    }

    /// Card with no game attribute.
    pub fn untagged(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            game: None,
        }
    }
}

/// Context forwarded with every relay request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameContext {
    /// No card is selected (empty carousel).
    NoSelection,
    /// A card is selected and names this game.
    Selected(String),
}

impl GameContext {
    /// Context string sent to the relay.
    pub fn as_str(&self) -> &str {
        match self {
            GameContext::NoSelection => GENERAL_GAME_CONTEXT,
            GameContext::Selected(game) => game,
        }
    }
}

impl std::fmt::Display for GameContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Carousel state machine.
#[derive(Debug, Clone)]
pub struct Carousel {
    cards: Vec<GameCard>,
    index: usize,
    context: GameContext,
}

impl Carousel {
    /// Builds a carousel positioned on the first card.
    pub fn new(cards: Vec<GameCard>) -> Self {
        let mut carousel = Self {
            cards,
            index: 0,
            context: GameContext::NoSelection,
        };
        carousel.context = carousel.context_at(0);
        carousel
    }

    /// All cards in display order.
    pub fn cards(&self) -> &[GameCard] {
        &self.cards
    }

    /// Index of the selected card (0 when empty).
    pub fn index(&self) -> usize {
        self.index
    }

    /// The selected card, if any.
    pub fn current(&self) -> Option<&GameCard> {
        self.cards.get(self.index)
    }

    /// Current chat context.
    pub fn context(&self) -> &GameContext {
        &self.context
    }

    /// Whether `previous` would move.
    pub fn can_previous(&self) -> bool {
        self.index > 0
    }

    /// Whether `next` would move.
    pub fn can_next(&self) -> bool {
        self.index + 1 < self.cards.len()
    }

    /// Moves one card right. No-op on the last card. Returns whether it moved.
    pub fn next(&mut self) -> bool {
        if !self.can_next() {
            return false;
        }
        self.move_to(self.index + 1);
        true
    }

    /// Moves one card left. No-op on the first card. Returns whether it moved.
    pub fn previous(&mut self) -> bool {
        if !self.can_previous() {
            return false;
        }
        self.move_to(self.index - 1);
        true
    }

    /// Jumps to card `index` (card click). Out-of-range indices are ignored.
    pub fn select_index(&mut self, index: usize) -> bool {
        if index >= self.cards.len() {
            return false;
        }
        self.move_to(index);
        true
    }

    fn move_to(&mut self, index: usize) {
        self.index = index;
        self.context = self.context_at(index);
        info!("Chat context set to: {}", self.context);
    }

    fn context_at(&self, index: usize) -> GameContext {
        match self.cards.get(index) {
            None => GameContext::NoSelection,
            Some(card) => GameContext::Selected(
                card.game
                    .as_deref()
                    .map(str::trim)
                    .filter(|g| !g.is_empty())
                    .unwrap_or(GENERAL_GAME_CONTEXT)
                    .to_string(),
            ),
        }
    }
}
