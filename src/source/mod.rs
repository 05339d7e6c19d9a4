//! Positioned text tokens and the sources that produce them.
//!
//! Everything downstream of this module works on [`Token`]s: the words of a
//! page with their bounding box, font and fill color. A [`PageSource`] yields
//! them page by page; [`PdfSource`] decodes real PDF files and
//! [`MemorySource`] serves tokens that were produced elsewhere.

mod pdf;

use std::path::Path;

use crate::error::{Error, Result};

pub use pdf::{PdfLoader, PdfSource};

/// A fill color as its raw color-space components (gray, RGB or CMYK).
#[derive(Debug, Clone, PartialEq)]
pub struct Color(pub Vec<f32>);

impl Color {
    /// Gray color.
    pub fn gray(g: f32) -> Self {
        Self(vec![g])
    }

    /// RGB color.
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self(vec![r, g, b])
    }

    /// Color components.
    pub fn components(&self) -> &[f32] {
        &self.0
    }
}

/// A word on a page with its position and style.
///
/// Coordinates are top-down: `top` grows towards the bottom of the page.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The word text
    pub text: String,
    /// Distance from the top of the page to the top of the glyphs
    pub top: f32,
    /// Distance from the top of the page to the bottom of the glyphs
    pub bottom: f32,
    /// Left edge
    pub x0: f32,
    /// Font size in points
    pub font_size: f32,
    /// Font name (e.g., "Helvetica-Bold")
    pub font_name: String,
    /// Non-stroking (fill) color, if one was set
    pub color: Option<Color>,
}

impl Token {
    /// Create a token whose bottom edge is derived from the font size.
    pub fn new(text: impl Into<String>, x0: f32, top: f32, font_size: f32) -> Self {
        Self {
            text: text.into(),
            top,
            bottom: top + font_size,
            x0,
            font_size,
            font_name: String::new(),
            color: None,
        }
    }

    /// Set the font name.
    pub fn with_font(mut self, font_name: impl Into<String>) -> Self {
        self.font_name = font_name.into();
        self
    }

    /// Set the fill color.
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    /// Whether the font name carries a bold, black or demi weight marker.
    pub fn is_bold(&self) -> bool {
        let name = self.font_name.to_lowercase();
        name.contains("bold") || name.contains("black") || name.contains("demi")
    }
}

/// Page-by-page access to a document's tokens.
pub trait PageSource {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Tokens of a page (0-indexed) in content-stream order.
    fn page_tokens(&self, page_index: usize) -> Result<Vec<Token>>;
}

/// Opens documents by path.
///
/// Each call yields a fresh source; dropping it releases the document.
pub trait SourceLoader: Sync {
    /// The concrete source type.
    type Source: PageSource;

    /// Open the document at `path`.
    fn open(&self, path: &Path) -> Result<Self::Source>;
}

/// A document held in memory as pre-built pages of tokens.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pages: Vec<Vec<Token>>,
}

impl MemorySource {
    /// Create a source from pages of tokens.
    pub fn new(pages: Vec<Vec<Token>>) -> Self {
        Self { pages }
    }
}

impl PageSource for MemorySource {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_tokens(&self, page_index: usize) -> Result<Vec<Token>> {
        self.pages
            .get(page_index)
            .cloned()
            .ok_or(Error::PageOutOfRange(page_index + 1, self.pages.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_bold_detection() {
        assert!(Token::new("A", 0.0, 0.0, 12.0)
            .with_font("Helvetica-Bold")
            .is_bold());
        assert!(Token::new("A", 0.0, 0.0, 12.0)
            .with_font("Arial-BlackItalic")
            .is_bold());
        assert!(Token::new("A", 0.0, 0.0, 12.0)
            .with_font("Futura-DemiBold")
            .is_bold());
        assert!(!Token::new("A", 0.0, 0.0, 12.0)
            .with_font("Helvetica-Oblique")
            .is_bold());
    }

    #[test]
    fn test_memory_source_page_out_of_range() {
        let source = MemorySource::new(vec![vec![Token::new("Hi", 0.0, 0.0, 12.0)]]);
        assert_eq!(source.page_count(), 1);
        assert!(source.page_tokens(0).is_ok());
        assert!(matches!(
            source.page_tokens(1),
            Err(Error::PageOutOfRange(2, 1))
        ));
    }
}
