//! Font profile: body size, heading sizes and dominant colors.

use crate::config::OutlineOptions;
use crate::model::HeadingLevel;
use crate::source::{Color, Token};

/// Per-document typography summary used to calibrate heading detection.
#[derive(Debug, Clone, PartialEq)]
pub struct FontProfile {
    /// Most frequent font size (ties go to the size seen first)
    pub body_size: f32,

    /// Distinct sizes above the body size, largest first, at most three
    pub heading_sizes: Vec<f32>,

    /// Most frequent fill colors, most frequent first
    pub common_colors: Vec<Color>,
}

impl FontProfile {
    /// Build a profile from sampled tokens.
    ///
    /// Returns `None` when the sample holds no font sizes.
    pub fn from_tokens<'a, I>(tokens: I, options: &OutlineOptions) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Token>,
    {
        let mut sizes = Vec::new();
        let mut colors = Vec::new();
        for token in tokens {
            if token.font_size.is_finite() {
                sizes.push(token.font_size);
            }
            if let Some(color) = &token.color {
                colors.push(color.clone());
            }
        }

        let size_counts = most_common(sizes);
        let body_size = size_counts.first()?.0;

        let mut larger: Vec<f32> = size_counts
            .iter()
            .map(|(size, _)| *size)
            .filter(|size| *size > body_size)
            .collect();
        larger.sort_by(|a, b| b.total_cmp(a));
        larger.truncate(options.heading_levels.min(3));

        let common_colors = most_common(colors)
            .into_iter()
            .take(options.common_colors)
            .map(|(color, _)| color)
            .collect();

        Some(Self {
            body_size,
            heading_sizes: larger,
            common_colors,
        })
    }

    /// The largest heading size, if any size exceeds the body size.
    pub fn largest_heading_size(&self) -> Option<f32> {
        self.heading_sizes.first().copied()
    }

    /// Level mapped to an exact heading size.
    pub fn level_for_size(&self, size: f32) -> Option<HeadingLevel> {
        self.heading_sizes
            .iter()
            .position(|s| *s == size)
            .and_then(HeadingLevel::from_rank)
    }

    /// Whether a color is among the common colors.
    pub fn is_common_color(&self, color: &Color) -> bool {
        self.common_colors.contains(color)
    }
}

/// Distinct values with their counts, most frequent first. Values with equal
/// counts keep first-seen order.
fn most_common<T: PartialEq>(values: Vec<T>) -> Vec<(T, usize)> {
    let mut counts: Vec<(T, usize)> = Vec::new();
    for value in values {
        match counts.iter_mut().find(|(v, _)| *v == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((value, 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}
