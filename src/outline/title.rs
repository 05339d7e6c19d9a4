//! Title detection.

use super::profile::FontProfile;
use crate::config::OutlineOptions;
use crate::layout::Line;

/// Text of the first line on the leading pages set in the largest heading
/// size and shorter than the title limit. Empty when there is none.
pub fn detect_title(pages: &[Vec<Line>], profile: &FontProfile, options: &OutlineOptions) -> String {
    let Some(largest) = profile.largest_heading_size() else {
        return String::new();
    };

    pages
        .iter()
        .take(options.title_pages)
        .flatten()
        .find_map(|line| {
            let text = line.text();
            (line.first().font_size == largest
                && text.chars().count() < options.max_title_chars)
                .then_some(text)
        })
        .unwrap_or_default()
}
