//! Pure slider geometry and card parsing, kept free of DOM types.

use chat::GameCard;

/// Horizontal translate (px) that centres card `index` in the container.
pub fn slider_offset(container_width: f64, card_width: f64, gap: f64, index: usize) -> f64 {
    let card_center = index as f64 * (card_width + gap) + card_width / 2.0;
    container_width / 2.0 - card_center
}

/// Parses a computed CSS `gap` value such as `"16px"`. `normal` and
/// anything unparsable count as zero.
pub fn parse_gap(value: &str) -> f64 {
    // Two-value gaps ("row column") use the column gap.
    let column = value.split_whitespace().last().unwrap_or("");
    column
        .trim_end_matches("px")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Builds a card from the attributes of one slider child.
///
/// Title preference: `data-title`, then visible text, then the game name,
/// then a positional label.
pub fn card_from_parts(
    data_title: Option<String>,
    text: Option<String>,
    game: Option<String>,
    index: usize,
) -> GameCard {
    let non_empty = |s: Option<String>| s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
    let game = non_empty(game);
    let title = non_empty(data_title)
        .or_else(|| non_empty(text))
        .or_else(|| game.clone())
        .unwrap_or_else(|| format!("Game {}", index + 1));
    GameCard { title, game }
}
