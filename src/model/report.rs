//! The final relevance report.

use serde::{Deserialize, Serialize};

/// Report written once per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Run inputs and timestamp
    pub metadata: ReportMetadata,

    /// Ranked sections, best first
    pub extracted_sections: Vec<RankedSection>,

    /// Excerpts of the ranked sections, same order
    pub sub_section_analysis: Vec<SubSection>,
}

/// Inputs of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// File names of all processed documents
    pub input_documents: Vec<String>,

    /// Persona description
    pub persona: String,

    /// Job-to-be-done description
    pub job_to_be_done: String,

    /// Local time the report was assembled (ISO-8601)
    pub processing_timestamp: String,
}

/// A section retained by the ranker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedSection {
    pub document: String,
    pub page_number: u32,
    pub section_title: String,
    /// 1-based rank, contiguous
    pub importance_rank: u32,
}

/// A short excerpt of a ranked section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubSection {
    pub document: String,
    pub page_number: u32,
    pub refined_text: String,
}
