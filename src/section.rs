//! Section text reconstruction.
//!
//! The body of a heading runs from the heading's line to the next heading.
//! Page boundaries are used where the next heading cannot be located
//! precisely:
//!
//! - The start page contributes its lines from the first line containing
//!   the heading text.
//! - Pages strictly between the start page and the next heading's page
//!   contribute their full text.
//! - When the next heading's text is found in a token of its page, that
//!   page contributes the tokens above it as a single line. If it is on the
//!   start page itself (below the heading line), the start page stops there.
//! - When it is not found, the section ends with the page before the next
//!   heading's page, or with the last page of the document if both headings
//!   share a page.
//! - The last heading runs to the end of the document.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::layout::{group_lines, lines_to_text, Line};
use crate::model::{Heading, Outline, Section};
use crate::source::PageSource;

/// Reconstruct the body text of every heading in `outline`.
pub fn extract_sections<S: PageSource + ?Sized>(
    source: &S,
    document: &str,
    outline: &Outline,
    line_tolerance: f32,
) -> Result<Vec<Section>> {
    let mut pages = PageCache::new(source, line_tolerance);
    let mut sections = Vec::with_capacity(outline.len());

    for (i, heading) in outline.headings.iter().enumerate() {
        let next = outline.headings.get(i + 1);
        let full_text = section_text(&mut pages, heading, next)?;
        sections.push(Section::new(
            document,
            heading.page,
            heading.text.clone(),
            full_text,
        ));
    }

    Ok(sections)
}

/// Where the next heading was found.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Cutoff {
    page: usize,
    top: f32,
}

fn section_text<S: PageSource + ?Sized>(
    pages: &mut PageCache<'_, S>,
    heading: &Heading,
    next: Option<&Heading>,
) -> Result<String> {
    let start = pages.index_of(heading.page)?;
    let last = pages.count() - 1;

    let mut end = last;
    let mut cutoff = None;
    if let Some(next) = next {
        let next_page = pages.index_of(next.page)?;
        let position = locate(pages.lines(next_page)?, &next.text).map(|top| Cutoff {
            page: next_page,
            top,
        });
        if next_page > start {
            end = next_page - 1;
            cutoff = position;
        } else if let Some(position) = position {
            if position.top > heading_line_top(pages.lines(start)?, &heading.text) {
                end = start;
                cutoff = Some(position);
            }
        }
    }
    log::trace!(
        "Section '{}': pages {}..={}, cutoff {:?}",
        heading.text,
        start + 1,
        end + 1,
        cutoff
    );

    let mut fragments = Vec::new();
    for page in start..=end {
        let lines = pages.lines(page)?;
        if page == start {
            let limit = cutoff.filter(|c| c.page == start).map(|c| c.top);
            fragments.extend(lines_from_heading(lines, &heading.text, limit));
        } else {
            fragments.push(lines_to_text(lines));
        }
    }

    if let Some(cutoff) = cutoff.filter(|c| c.page > end) {
        let above: Vec<&str> = pages
            .lines(cutoff.page)?
            .iter()
            .flat_map(Line::tokens)
            .filter(|t| t.top < cutoff.top)
            .map(|t| t.text.as_str())
            .collect();
        fragments.push(above.join(" "));
    }

    Ok(fragments.join("\n").trim().to_string())
}

/// Top of the first token (reading order) whose text contains `text`,
/// ignoring case.
fn locate(lines: &[Line], text: &str) -> Option<f32> {
    let needle = text.to_lowercase();
    lines
        .iter()
        .flat_map(Line::tokens)
        .find(|t| t.text.to_lowercase().contains(&needle))
        .map(|t| t.top)
}

/// Anchor of the first line containing the heading text, or negative
/// infinity when the heading line is not on the page.
fn heading_line_top(lines: &[Line], heading: &str) -> f32 {
    let needle = heading.to_lowercase();
    lines
        .iter()
        .find(|l| l.text().to_lowercase().contains(&needle))
        .map_or(f32::NEG_INFINITY, Line::anchor)
}

/// Lines from the first one containing the heading text onwards. With a
/// limit, following lines must be anchored above it.
fn lines_from_heading(lines: &[Line], heading: &str, limit: Option<f32>) -> Vec<String> {
    let needle = heading.to_lowercase();
    let Some(start) = lines
        .iter()
        .position(|l| l.text().to_lowercase().contains(&needle))
    else {
        return Vec::new();
    };

    let mut out = vec![lines[start].text()];
    out.extend(
        lines[start + 1..]
            .iter()
            .take_while(|l| limit.map_or(true, |top| l.anchor() < top))
            .map(Line::text),
    );
    out
}

/// Grouped lines per page, read from the source at most once.
struct PageCache<'a, S: ?Sized> {
    source: &'a S,
    line_tolerance: f32,
    pages: HashMap<usize, Vec<Line>>,
}

impl<'a, S: PageSource + ?Sized> PageCache<'a, S> {
    fn new(source: &'a S, line_tolerance: f32) -> Self {
        Self {
            source,
            line_tolerance,
            pages: HashMap::new(),
        }
    }

    fn count(&self) -> usize {
        self.source.page_count()
    }

    /// 0-based index of a 1-based page number.
    fn index_of(&self, page_number: u32) -> Result<usize> {
        let count = self.count();
        match page_number as usize {
            n if n >= 1 && n <= count => Ok(n - 1),
            n => Err(Error::PageOutOfRange(n, count)),
        }
    }

    fn lines(&mut self, page: usize) -> Result<&[Line]> {
        if !self.pages.contains_key(&page) {
            let tokens = self.source.page_tokens(page)?;
            self.pages
                .insert(page, group_lines(tokens, self.line_tolerance));
        }
        Ok(&self.pages[&page])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::DEFAULT_LINE_TOLERANCE;
    use crate::model::HeadingLevel;
    use crate::source::{MemorySource, Token};

    /// A page with one token per row, 20 units apart.
    fn page(rows: &[&str]) -> Vec<Token> {
        rows.iter()
            .enumerate()
            .flat_map(|(row, text)| {
                let top = 50.0 + row as f32 * 20.0;
                text.split_whitespace()
                    .enumerate()
                    .map(move |(col, word)| Token::new(word, 50.0 + col as f32 * 60.0, top, 12.0))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    fn outline(headings: &[(&str, u32)]) -> Outline {
        Outline {
            title: String::new(),
            headings: headings
                .iter()
                .map(|(text, page)| Heading::new(HeadingLevel::H1, *text, *page))
                .collect(),
        }
    }

    fn extract(source: &MemorySource, outline: &Outline) -> Vec<Section> {
        extract_sections(source, "doc.pdf", outline, DEFAULT_LINE_TOLERANCE).unwrap()
    }

    #[test]
    fn test_last_heading_runs_to_end() {
        let source = MemorySource::new(vec![
            page(&["preface", "Overview", "first body"]),
            page(&["second body"]),
        ]);
        let sections = extract(&source, &outline(&[("Overview", 1)]));

        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].document, "doc.pdf");
        assert_eq!(sections[0].page_number, 1);
        assert_eq!(sections[0].section_title, "Overview");
        assert_eq!(sections[0].full_text, "Overview\nfirst body\nsecond body");
        assert_eq!(sections[0].relevance_score, 0.0);
    }

    #[test]
    fn test_same_page_cutoff() {
        let source = MemorySource::new(vec![
            page(&["Overview", "alpha", "Methods", "beta"]),
            page(&["gamma"]),
        ]);
        let sections = extract(&source, &outline(&[("Overview", 1), ("Methods", 1)]));

        assert_eq!(sections[0].full_text, "Overview\nalpha");
        assert_eq!(sections[1].full_text, "Methods\nbeta\ngamma");
    }

    #[test]
    fn test_later_page_cutoff_keeps_text_above_next_heading() {
        let source = MemorySource::new(vec![
            page(&["Overview", "alpha"]),
            page(&["middle page"]),
            page(&["carry over", "Methods", "beta"]),
        ]);
        let sections = extract(&source, &outline(&[("Overview", 1), ("Methods", 3)]));

        assert_eq!(
            sections[0].full_text,
            "Overview\nalpha\nmiddle page\ncarry over"
        );
        assert_eq!(sections[1].full_text, "Methods\nbeta");
    }

    #[test]
    fn test_unlocated_next_heading_uses_page_boundaries() {
        // Multi-word headings are never contained in a single token.
        let source = MemorySource::new(vec![
            page(&["Overview", "alpha"]),
            page(&["beta"]),
            page(&["carry", "Next Steps", "gamma"]),
        ]);
        let sections = extract(
            &source,
            &outline(&[("Overview", 1), ("Next Steps", 3)]),
        );

        assert_eq!(sections[0].full_text, "Overview\nalpha\nbeta");
        assert_eq!(sections[1].full_text, "Next Steps\ngamma");
    }

    #[test]
    fn test_unlocated_next_heading_on_same_page_runs_to_end() {
        let source = MemorySource::new(vec![
            page(&["Overview", "alpha", "Next Steps", "beta"]),
            page(&["gamma"]),
        ]);
        let sections = extract(
            &source,
            &outline(&[("Overview", 1), ("Next Steps", 1)]),
        );

        assert_eq!(
            sections[0].full_text,
            "Overview\nalpha\nNext Steps\nbeta\ngamma"
        );
    }

    #[test]
    fn test_heading_line_missing_from_start_page() {
        let source = MemorySource::new(vec![page(&["alpha"]), page(&["beta"])]);
        let sections = extract(&source, &outline(&[("Ghost", 1)]));
        assert_eq!(sections[0].full_text, "beta");
    }

    #[test]
    fn test_heading_page_out_of_range() {
        let source = MemorySource::new(vec![page(&["alpha"])]);
        let result = extract_sections(
            &source,
            "doc.pdf",
            &outline(&[("alpha", 2)]),
            DEFAULT_LINE_TOLERANCE,
        );
        assert!(matches!(result, Err(Error::PageOutOfRange(2, 1))));
    }
}
