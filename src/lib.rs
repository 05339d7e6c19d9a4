//! # docrank
//!
//! Persona-driven section ranking for PDF collections.
//!
//! Given a set of PDF documents, a persona description and a
//! job-to-be-done, this library infers each document's heading outline from
//! its typography, reconstructs the text under every heading, scores the
//! sections against keywords of the persona and job, and produces a JSON
//! report of the most relevant sections.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docrank::{pipeline, Config, Outcome};
//!
//! fn main() -> docrank::Result<()> {
//!     let config = Config::new("input", "output");
//!
//!     match pipeline::run(&config)? {
//!         Outcome::Completed(report) => {
//!             println!("{} sections ranked", report.extracted_sections.len());
//!         }
//!         Outcome::NoDocuments => println!("nothing to analyse"),
//!         Outcome::MissingDescriptions => println!("persona or job missing"),
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Outline inference**: title and H1-H3 headings from font size, weight,
//!   color, position and text shape
//! - **Section text**: body text between consecutive headings, across pages
//! - **Relevance ranking**: keyword presence scoring with length adjustment
//! - **Pluggable sources**: PDF decoding through lopdf, or pre-built tokens
//! - **Parallel processing**: optional Rayon fan-out over documents

pub mod config;
pub mod error;
pub mod layout;
pub mod model;
pub mod outline;
pub mod pipeline;
pub mod rank;
pub mod render;
pub mod section;
pub mod source;

// Re-export commonly used types
pub use config::{Config, DeploymentLayout, OutlineOptions, RankOptions};
pub use error::{Error, Result};
pub use model::{
    Heading, HeadingLevel, Outline, RankedSection, Report, ReportMetadata, Section, SubSection,
};
pub use outline::{extract_outline, ScoreWeights};
pub use pipeline::Outcome;
pub use rank::{rank_sections, Keywords, Ranking};
pub use render::{to_json, JsonFormat};
pub use section::extract_sections;
pub use source::{MemorySource, PageSource, PdfLoader, PdfSource, SourceLoader, Token};

use std::path::Path;

/// Extract the title and outline of a PDF file.
///
/// # Example
///
/// ```no_run
/// use docrank::extract_outline_from_file;
///
/// let outline = extract_outline_from_file("document.pdf").unwrap();
/// for heading in outline.iter() {
///     println!("{} {} (p.{})", heading.level, heading.text, heading.page);
/// }
/// ```
pub fn extract_outline_from_file<P: AsRef<Path>>(path: P) -> Result<Outline> {
    extract_outline_with_options(path, &OutlineOptions::default())
}

/// Extract the outline of a PDF file with custom options.
pub fn extract_outline_with_options<P: AsRef<Path>>(
    path: P,
    options: &OutlineOptions,
) -> Result<Outline> {
    let source = PdfSource::open(path)?;
    extract_outline(&source, options)
}

/// Extract the sections of a PDF file under its detected outline.
///
/// The file is opened once for the outline and again for the section text.
/// Sections carry the file name as document identifier and a zero score.
pub fn extract_sections_from_file<P: AsRef<Path>>(path: P) -> Result<Vec<Section>> {
    pipeline::process_document(&PdfLoader, path.as_ref(), &OutlineOptions::default())
}
