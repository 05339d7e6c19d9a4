//! Line grouping for positioned tokens.
//!
//! Tokens are clustered into lines by vertical position. Each line is
//! anchored at the `top` of the first token that opened it, and a token
//! joins the first line (in creation order) whose anchor lies within the
//! tolerance. Anchors never move, so a line can accumulate tokens that sit
//! further than the tolerance from some of its other members.

use crate::source::Token;

/// Default vertical tolerance for line membership, in layout units.
pub const DEFAULT_LINE_TOLERANCE: f32 = 3.0;

/// A line of tokens sharing an approximate vertical position.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    anchor: f32,
    tokens: Vec<Token>,
}

impl Line {
    /// Vertical position of the token that opened this line.
    pub fn anchor(&self) -> f32 {
        self.anchor
    }

    /// Tokens ordered by left edge.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Leftmost token.
    pub fn first(&self) -> &Token {
        &self.tokens[0]
    }

    /// Rightmost token.
    pub fn last(&self) -> &Token {
        &self.tokens[self.tokens.len() - 1]
    }

    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Always false for lines built by [`group_lines`].
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Token texts joined by single spaces, trimmed.
    pub fn text(&self) -> String {
        self.tokens
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string()
    }
}

/// Group a page's tokens into lines.
///
/// Lines are returned in ascending anchor order with tokens sorted by
/// left edge. Both sorts are stable.
pub fn group_lines(tokens: Vec<Token>, tolerance: f32) -> Vec<Line> {
    let mut lines: Vec<Line> = Vec::new();

    for token in tokens {
        match lines
            .iter_mut()
            .find(|line| (token.top - line.anchor).abs() <= tolerance)
        {
            Some(line) => line.tokens.push(token),
            None => lines.push(Line {
                anchor: token.top,
                tokens: vec![token],
            }),
        }
    }

    lines.sort_by(|a, b| a.anchor.total_cmp(&b.anchor));
    for line in &mut lines {
        line.tokens.sort_by(|a, b| a.x0.total_cmp(&b.x0));
    }

    lines
}

/// Render lines as plain text, one line per row.
pub fn lines_to_text(lines: &[Line]) -> String {
    lines
        .iter()
        .map(Line::text)
        .collect::<Vec<_>>()
        .join("\n")
}
