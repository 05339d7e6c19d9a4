//! Reconstructed section text.

use serde::{Deserialize, Serialize};

/// The body text attributed to one heading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Identifier of the originating document (its file name)
    pub document: String,

    /// Page of the originating heading (1-indexed)
    pub page_number: u32,

    /// Heading text
    pub section_title: String,

    /// Section body, starting with the heading line
    pub full_text: String,

    /// Keyword relevance; zero until ranked
    pub relevance_score: f64,
}

impl Section {
    /// Create an unscored section.
    pub fn new(
        document: impl Into<String>,
        page_number: u32,
        section_title: impl Into<String>,
        full_text: impl Into<String>,
    ) -> Self {
        Self {
            document: document.into(),
            page_number,
            section_title: section_title.into(),
            full_text: full_text.into(),
            relevance_score: 0.0,
        }
    }
}
