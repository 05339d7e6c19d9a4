//! Multi-signal heading scoring.
//!
//! Every line is scored by summing independent typographic and textual
//! signals. The weights are empirical; they live in [`ScoreWeights`] so they
//! can be tuned without touching the decision logic.

use regex::Regex;

use super::profile::FontProfile;
use crate::config::OutlineOptions;
use crate::layout::Line;
use crate::model::{Heading, HeadingLevel};

/// Weight of each heading signal.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreWeights {
    /// Font size equals the 1st, 2nd or 3rd heading size
    pub font_tiers: [f32; 3],
    /// Font name carries a bold/black/demi marker
    pub bold: f32,
    /// Fill color is set and not one of the common colors
    pub distinctive_color: f32,
    /// Line starts near the left margin
    pub left_indent: f32,
    /// Gap above the line is large relative to the page average
    pub isolation: f32,
    /// Short line in all capitals
    pub all_caps: f32,
    /// Title-cased line not starting with an article
    pub title_case: f32,
    /// Starts with a section number such as `2.1`
    pub numbered: f32,
    /// Few tokens and already strong
    pub short_and_strong: f32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            font_tiers: [3.0, 2.0, 1.0],
            bold: 2.0,
            distinctive_color: 1.0,
            left_indent: 1.0,
            isolation: 1.0,
            all_caps: 1.5,
            title_case: 1.0,
            numbered: 2.0,
            short_and_strong: 1.0,
        }
    }
}

/// Scores lines against a document's font profile.
pub struct HeadingScorer<'a> {
    profile: &'a FontProfile,
    options: &'a OutlineOptions,
    numbered: Regex,
}

impl<'a> HeadingScorer<'a> {
    /// Create a scorer for one document.
    pub fn new(profile: &'a FontProfile, options: &'a OutlineOptions) -> Self {
        Self {
            profile,
            options,
            numbered: Regex::new(r"^\d+(\.\d+)*\s+[A-Za-z]").unwrap(),
        }
    }

    /// Heading candidates of one page, in line order.
    pub fn score_page(&self, lines: &[Line], page_number: u32) -> Vec<Heading> {
        let avg_gap = average_gap(lines, self.options.default_gap);
        let mut headings = Vec::new();

        for (i, line) in lines.iter().enumerate() {
            let text = line.text();
            let chars = text.chars().count();
            if chars < self.options.min_line_chars || chars >= self.options.max_line_chars {
                continue;
            }

            let gap_above = match i {
                0 => 0.0,
                _ => line.first().top - lines[i - 1].last().bottom,
            };

            let score = self.score_line(line, &text, gap_above, avg_gap);
            if score >= self.options.threshold {
                let first = line.first();
                let level = self.level_for(first.font_size, first.is_bold());
                log::debug!(
                    "Page {}: heading {} (score {:.1}): {}",
                    page_number,
                    level,
                    score,
                    text
                );
                headings.push(Heading::new(level, text, page_number));
            }
        }

        headings
    }

    /// Sum of the signals a line exhibits. Style signals read the line's
    /// first token.
    pub fn score_line(&self, line: &Line, text: &str, gap_above: f32, avg_gap: f32) -> f32 {
        let weights = &self.options.weights;
        let first = line.first();
        let mut score = 0.0;

        if let Some(rank) = self
            .profile
            .heading_sizes
            .iter()
            .position(|s| *s == first.font_size)
        {
            score += weights.font_tiers.get(rank).copied().unwrap_or(0.0);
        }

        if first.is_bold() {
            score += weights.bold;
        }

        if let Some(color) = &first.color {
            if !self.profile.is_common_color(color) {
                score += weights.distinctive_color;
            }
        }

        if first.x0 < self.options.max_indent {
            score += weights.left_indent;
        }

        if gap_above > avg_gap * self.options.isolation_factor {
            score += weights.isolation;
        }

        if is_upper(text) && text.chars().count() < self.options.caps_max_chars {
            score += weights.all_caps;
        } else if is_title(text) && !starts_with_article(text) {
            score += weights.title_case;
        }

        if self.numbered.is_match(text) {
            score += weights.numbered;
        }

        if line.len() <= self.options.short_line_tokens
            && score >= self.options.short_line_min_score
        {
            score += weights.short_and_strong;
        }

        score
    }

    /// Level of an accepted line: the mapped level of its size, else H1/H2/H3
    /// by comparison with the heading sizes for bold text above body size,
    /// else H3.
    pub fn level_for(&self, font_size: f32, bold: bool) -> HeadingLevel {
        if let Some(level) = self.profile.level_for_size(font_size) {
            return level;
        }

        if font_size > self.profile.body_size && bold {
            let sizes = &self.profile.heading_sizes;
            if sizes.first().map_or(true, |s| font_size >= *s) {
                return HeadingLevel::H1;
            }
            if sizes.get(1).is_some_and(|s| font_size >= *s) {
                return HeadingLevel::H2;
            }
        }

        HeadingLevel::H3
    }
}

/// Mean of the positive vertical gaps between consecutive lines, or
/// `default` when there are none.
pub fn average_gap(lines: &[Line], default: f32) -> f32 {
    let gaps: Vec<f32> = lines
        .windows(2)
        .map(|w| w[1].first().top - w[0].last().bottom)
        .filter(|gap| *gap > 0.0)
        .collect();

    if gaps.is_empty() {
        return default;
    }
    gaps.iter().sum::<f32>() / gaps.len() as f32
}

/// At least one cased character and no lowercase ones.
fn is_upper(text: &str) -> bool {
    let mut cased = false;
    for c in text.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            cased = true;
        }
    }
    cased
}

/// Every cased run starts with an uppercase character followed only by
/// lowercase ones, and there is at least one cased character.
fn is_title(text: &str) -> bool {
    let mut cased = false;
    let mut previous_cased = false;
    for c in text.chars() {
        if c.is_uppercase() {
            if previous_cased {
                return false;
            }
            previous_cased = true;
            cased = true;
        } else if c.is_lowercase() {
            if !previous_cased {
                return false;
            }
            previous_cased = true;
            cased = true;
        } else {
            previous_cased = false;
        }
    }
    cased
}

fn starts_with_article(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.starts_with("the ") || lower.starts_with("a ")
}
