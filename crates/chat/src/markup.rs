//! Lightweight markup parsing for chat text.
//!
//! Handles the subset assistants actually emit in short answers: bold,
//! italics, inline code, links, `#` headings and `-`/`*` bullets. Anything
//! unrecognised stays literal text. The parse tree is rendered to HTML by
//! [`crate::render`] and to terminal styles by the CLI.

/// Inline run of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    /// Plain text.
    Text(String),
    /// `**bold**` or `__bold__`; may contain links, code or italics.
    Bold(Vec<Inline>),
    /// `*italic*` or `_italic_`.
    Italic(Vec<Inline>),
    /// `` `code` ``.
    Code(String),
    /// `[label](url)`.
    Link { label: String, url: String },
}

/// Line-level structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// Ordinary text line.
    Paragraph,
    /// Line starting with one or more `#`.
    Heading,
    /// Line starting with `- ` or `* `.
    Bullet,
    /// Empty line; separates paragraphs.
    Blank,
}

/// One source line after parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Line kind.
    pub kind: BlockKind,
    /// Inline content (empty for [`BlockKind::Blank`]).
    pub inlines: Vec<Inline>,
}

/// Parses `text` line by line.
pub fn parse(text: &str) -> Vec<Block> {
    text.lines().map(parse_line).collect()
}

fn parse_line(line: &str) -> Block {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Block {
            kind: BlockKind::Blank,
            inlines: Vec::new(),
        };
    }
    if trimmed.starts_with('#') {
        let rest = trimmed.trim_start_matches('#');
        if rest.is_empty() || rest.starts_with(' ') {
            return Block {
                kind: BlockKind::Heading,
                inlines: parse_inline(rest.trim()),
            };
        }
    }
    if let Some(rest) = trimmed
        .strip_prefix("- ")
        .or_else(|| trimmed.strip_prefix("* "))
    {
        return Block {
            kind: BlockKind::Bullet,
            inlines: parse_inline(rest.trim_start()),
        };
    }
    Block {
        kind: BlockKind::Paragraph,
        inlines: parse_inline(trimmed),
    }
}

/// Parses inline markup within a single line.
pub fn parse_inline(text: &str) -> Vec<Inline> {
    let chars: Vec<char> = text.chars().collect();
    let mut out = Vec::new();
    let mut plain = String::new();
    let mut i = 0;

    while i < chars.len() {
        if let Some((inline, next)) = match_at(&chars, i) {
            if !plain.is_empty() {
                out.push(Inline::Text(std::mem::take(&mut plain)));
            }
            out.push(inline);
            i = next;
        } else {
            plain.push(chars[i]);
            i += 1;
        }
    }
    if !plain.is_empty() {
        out.push(Inline::Text(plain));
    }
    out
}

/// Tries every construct at position `i`; returns the inline and the
/// index just past it.
fn match_at(chars: &[char], i: usize) -> Option<(Inline, usize)> {
    match chars[i] {
        '*' | '_' => match_emphasis(chars, i),
        '`' => {
            let close = find(chars, i + 1, &['`'])?;
            (close > i + 1).then(|| (Inline::Code(collect(chars, i + 1, close)), close + 1))
        }
        '[' => match_link(chars, i),
        _ => None,
    }
}

fn match_emphasis(chars: &[char], i: usize) -> Option<(Inline, usize)> {
    let marker = chars[i];
    // `_` inside a word (snake_case) is literal.
    if marker == '_' && i > 0 && chars[i - 1].is_alphanumeric() {
        return None;
    }

    let double = chars.get(i + 1) == Some(&marker);
    let start = if double { i + 2 } else { i + 1 };
    if chars.get(start).is_none_or(|c| c.is_whitespace()) {
        return None;
    }

    let pair = [marker, marker];
    let delimiter: &[char] = if double { &pair } else { &pair[..1] };
    let mut from = start;
    loop {
        let close = find(chars, from, delimiter)?;
        let after = close + delimiter.len();
        let closes_word =
            marker != '_' || chars.get(after).is_none_or(|c| !c.is_alphanumeric());
        // A single `*` must not be the first half of a `**`.
        let single_ok = double || chars.get(after) != Some(&marker);
        if close > start && !chars[close - 1].is_whitespace() && closes_word && single_ok {
            let inner = parse_inline(&collect(chars, start, close));
            let inline = if double {
                Inline::Bold(inner)
            } else {
                Inline::Italic(inner)
            };
            return Some((inline, after));
        }
        from = close + 1;
    }
}

fn match_link(chars: &[char], i: usize) -> Option<(Inline, usize)> {
    let label_end = find(chars, i + 1, &[']'])?;
    if chars.get(label_end + 1) != Some(&'(') {
        return None;
    }
    let label = collect(chars, i + 1, label_end);
    if label.trim().is_empty() || label.contains('[') {
        return None;
    }

    // The target ends at the `)` balancing the opening one.
    let url_start = label_end + 2;
    let mut depth = 0usize;
    let mut url_end = None;
    for (offset, c) in chars[url_start..].iter().enumerate() {
        match c {
            '(' => depth += 1,
            ')' if depth == 0 => {
                url_end = Some(url_start + offset);
                break;
            }
            ')' => depth -= 1,
            c if c.is_whitespace() => return None,
            _ => {}
        }
    }
    let url_end = url_end?;
    let url = collect(chars, url_start, url_end);
    if url.is_empty() {
        return None;
    }
    Some((Inline::Link { label, url }, url_end + 1))
}

fn find(chars: &[char], from: usize, pattern: &[char]) -> Option<usize> {
    if pattern.is_empty() || from >= chars.len() {
        return None;
    }
    chars[from..]
        .windows(pattern.len())
        .position(|w| w == pattern)
        .map(|p| p + from)
}

fn collect(chars: &[char], start: usize, end: usize) -> String {
    chars[start..end].iter().collect()
}
