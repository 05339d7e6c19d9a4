//! End-to-end analysis run.
//!
//! A run discovers the PDF documents of the input directory, reads the
//! persona and job descriptions, builds each document's outline and sections,
//! ranks all sections together and writes one report.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::config::{Config, OutlineOptions};
use crate::error::Result;
use crate::model::{Report, ReportMetadata, Section};
use crate::outline::extract_outline;
use crate::rank::{rank_sections, Keywords};
use crate::render::{to_json, JsonFormat};
use crate::section::extract_sections;
use crate::source::{PdfLoader, SourceLoader};

/// How a run ended.
///
/// Runs that find nothing to analyse end without a report; they are not
/// errors.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The report was assembled and written.
    Completed(Report),
    /// The input directory holds no PDF documents.
    NoDocuments,
    /// The persona or job description is absent or empty.
    MissingDescriptions,
}

impl Outcome {
    /// The report, if one was written.
    pub fn report(&self) -> Option<&Report> {
        match self {
            Outcome::Completed(report) => Some(report),
            _ => None,
        }
    }
}

/// Run the analysis on PDF files.
pub fn run(config: &Config) -> Result<Outcome> {
    run_with(config, &PdfLoader)
}

/// Run the analysis, opening documents with `loader`.
pub fn run_with<L: SourceLoader>(config: &Config, loader: &L) -> Result<Outcome> {
    config.validate()?;

    let documents = match &config.documents {
        Some(documents) => documents.clone(),
        None => discover_documents(&config.input_dir)?,
    };
    if documents.is_empty() {
        log::info!(
            "No PDF documents found in {}",
            config.input_dir.display()
        );
        return Ok(Outcome::NoDocuments);
    }

    let persona = read_description(&config.persona_path)?;
    let job = read_description(&config.job_path)?;
    if persona.is_empty() || job.is_empty() {
        log::error!("Persona or job-to-be-done description is missing or empty");
        return Ok(Outcome::MissingDescriptions);
    }

    log::info!("Starting analysis for {} documents", documents.len());
    let sections = if config.parallel {
        documents
            .par_iter()
            .map(|path| process_document(loader, path, &config.outline))
            .collect::<Result<Vec<_>>>()?
    } else {
        documents
            .iter()
            .map(|path| process_document(loader, path, &config.outline))
            .collect::<Result<Vec<_>>>()?
    };
    let sections: Vec<Section> = sections.into_iter().flatten().collect();
    log::debug!("{} sections extracted", sections.len());

    let keywords = Keywords::extract(&persona, &job, &config.rank);
    log::debug!("{} keywords: {:?}", keywords.len(), keywords);
    let ranking = rank_sections(sections, &keywords, &config.rank);

    let report = Report {
        metadata: ReportMetadata {
            input_documents: documents.iter().map(|p| document_name(p)).collect(),
            persona,
            job_to_be_done: job,
            processing_timestamp: chrono::Local::now()
                .format("%Y-%m-%dT%H:%M:%S%.6f")
                .to_string(),
        },
        extracted_sections: ranking.sections,
        sub_section_analysis: ranking.excerpts,
    };

    write_report(&report, &config.output_path)?;
    log::info!("Report written to {}", config.output_path.display());

    Ok(Outcome::Completed(report))
}

/// PDF files of `dir`, sorted by file name.
pub fn discover_documents(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut documents = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        log::debug!("Input entry: {}", entry.file_name().to_string_lossy());

        let path = entry.path();
        let is_pdf = entry
            .file_name()
            .to_string_lossy()
            .to_lowercase()
            .ends_with(".pdf");
        if is_pdf && path.is_file() {
            documents.push(path);
        }
    }
    documents.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(documents)
}

/// Trimmed content of a description file; empty when the file is absent.
pub fn read_description(path: &Path) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(text.trim().to_string()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("{} not found", path.display());
            Ok(String::new())
        }
        Err(e) => Err(e.into()),
    }
}

/// Write the report as indented JSON, creating the parent directory.
pub fn write_report(report: &Report, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, to_json(report, JsonFormat::Pretty)?)?;
    Ok(())
}

/// Sections of one document: an outline pass then a section pass, each
/// with its own source opened through `loader`.
///
/// Sections carry the file name as document identifier and a zero score.
pub fn process_document<L: SourceLoader>(
    loader: &L,
    path: &Path,
    options: &OutlineOptions,
) -> Result<Vec<Section>> {
    let name = document_name(path);
    log::info!("Processing {}", name);

    let outline = {
        let source = loader.open(path)?;
        extract_outline(&source, options)?
    };
    log::debug!(
        "{}: title '{}', {} headings",
        name,
        outline.title,
        outline.len()
    );

    let source = loader.open(path)?;
    extract_sections(&source, &name, &outline, options.line_tolerance)
}

fn document_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
