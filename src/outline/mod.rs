//! Outline inference from typography.
//!
//! The outline of a document is derived in four steps:
//!
//! ```text
//! tokens -> FontProfile (first pages) -> title (first pages)
//!        -> lines -> HeadingScorer (every page) -> OutlineBuilder
//! ```
//!
//! Documents without any observable font size yield an empty outline.

mod profile;
mod scorer;
mod title;

pub use profile::FontProfile;
pub use scorer::{average_gap, HeadingScorer, ScoreWeights};
pub use title::detect_title;

use crate::config::OutlineOptions;
use crate::error::Result;
use crate::layout::group_lines;
use crate::model::{Heading, Outline};
use crate::source::PageSource;

/// Extract the title and heading outline of a document.
pub fn extract_outline<S: PageSource + ?Sized>(
    source: &S,
    options: &OutlineOptions,
) -> Result<Outline> {
    let mut pages = Vec::with_capacity(source.page_count());
    for page_index in 0..source.page_count() {
        pages.push(source.page_tokens(page_index)?);
    }

    let sample = pages.iter().take(options.profile_pages).flatten();
    let Some(profile) = FontProfile::from_tokens(sample, options) else {
        log::debug!("No font sizes observed; outline is empty");
        return Ok(Outline::new());
    };
    log::debug!(
        "Font profile: body {:.1}, headings {:?}, {} common colors",
        profile.body_size,
        profile.heading_sizes,
        profile.common_colors.len()
    );

    let pages: Vec<_> = pages
        .into_iter()
        .map(|tokens| group_lines(tokens, options.line_tolerance))
        .collect();

    let title = detect_title(&pages, &profile, options);

    let scorer = HeadingScorer::new(&profile, options);
    let mut builder = OutlineBuilder::new();
    for (page_index, lines) in pages.iter().enumerate() {
        for heading in scorer.score_page(lines, page_index as u32 + 1) {
            builder.push(heading);
        }
    }

    Ok(builder.build(title))
}

/// Collects heading candidates in reading order, dropping repeats.
#[derive(Debug, Default)]
pub struct OutlineBuilder {
    headings: Vec<Heading>,
}

impl OutlineBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a candidate unless it repeats the last accepted heading.
    ///
    /// A candidate repeats the previous heading when, ignoring case, the two
    /// texts are equal or one is a prefix of the other. Returns whether the
    /// candidate was kept.
    pub fn push(&mut self, heading: Heading) -> bool {
        if let Some(previous) = self.headings.last() {
            if is_repeat(&previous.text, &heading.text) {
                log::trace!("Skipping repeated heading: {}", heading.text);
                return false;
            }
        }
        self.headings.push(heading);
        true
    }

    /// Finish the outline.
    pub fn build(self, title: String) -> Outline {
        Outline {
            title,
            headings: self.headings,
        }
    }
}

fn is_repeat(previous: &str, next: &str) -> bool {
    let previous = previous.to_lowercase();
    let next = next.to_lowercase();
    next.starts_with(&previous) || previous.starts_with(&next)
}
