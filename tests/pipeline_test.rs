//! Integration tests for the end-to-end analysis run.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Mutex;

use docrank::error::{Error, Result};
use docrank::pipeline::{process_document, run_with, Outcome};
use docrank::{Config, MemorySource, OutlineOptions, Report, SourceLoader, Token};

/// Serves in-memory documents by file name and records every open.
#[derive(Default)]
struct MockLoader {
    documents: HashMap<String, MemorySource>,
    opened: Mutex<Vec<String>>,
}

impl MockLoader {
    fn with_document(mut self, name: &str, source: MemorySource) -> Self {
        self.documents.insert(name.to_string(), source);
        self
    }

    fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

impl SourceLoader for MockLoader {
    type Source = MemorySource;

    fn open(&self, path: &Path) -> Result<MemorySource> {
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        self.opened.lock().unwrap().push(name.clone());
        self.documents
            .get(&name)
            .cloned()
            .ok_or_else(|| Error::PdfParse(format!("cannot decode {}", name)))
    }
}

/// One page per section: a bold 18pt heading followed by 12pt body lines.
fn guide(sections: &[(&str, &[&str])]) -> MemorySource {
    let pages = sections
        .iter()
        .map(|(heading, body)| {
            let mut tokens = vec![Token::new(*heading, 50.0, 60.0, 18.0).with_font("Arial-Bold")];
            for (row, line) in body.iter().enumerate() {
                let top = 100.0 + row as f32 * 16.0;
                for (col, word) in line.split_whitespace().enumerate() {
                    tokens.push(
                        Token::new(word, 72.0 + col as f32 * 40.0, top, 12.0).with_font("Arial"),
                    );
                }
            }
            tokens
        })
        .collect();
    MemorySource::new(pages)
}

fn loader() -> MockLoader {
    MockLoader::default()
        .with_document(
            "a.pdf",
            guide(&[
                (
                    "Beaches",
                    &[
                        "quiet beaches with warm water",
                        "and hotels nearby for families",
                    ],
                ),
                ("Nightlife", &["bars and clubs stay open", "until early morning"]),
            ]),
        )
        .with_document(
            "b.pdf",
            guide(&[(
                "Museums",
                &["art museums open late on weekends", "across the old town"],
            )]),
        )
}

struct Workspace {
    _dir: tempfile::TempDir,
    config: Config,
}

fn workspace(persona: Option<&str>, job: Option<&str>, documents: &[&str]) -> Workspace {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input");
    fs::create_dir(&input).unwrap();
    for name in documents {
        fs::write(input.join(name), b"%PDF-1.5").unwrap();
    }
    if let Some(persona) = persona {
        fs::write(input.join("persona.txt"), persona).unwrap();
    }
    if let Some(job) = job {
        fs::write(input.join("job_to_be_done.txt"), job).unwrap();
    }

    let config = Config::new(&input, dir.path().join("output"));
    Workspace { _dir: dir, config }
}

fn completed(outcome: Outcome) -> Report {
    match outcome {
        Outcome::Completed(report) => report,
        other => panic!("expected a report, got {:?}", other),
    }
}

#[test]
fn test_run_ranks_across_documents() {
    let ws = workspace(
        Some("Travel Planner\n"),
        Some("Find beaches and hotels for a family trip"),
        &["b.pdf", "a.pdf"],
    );
    let loader = loader();

    let report = completed(run_with(&ws.config, &loader).unwrap());

    assert_eq!(report.metadata.input_documents, vec!["a.pdf", "b.pdf"]);
    assert_eq!(report.metadata.persona, "Travel Planner");
    assert!(!report.metadata.processing_timestamp.is_empty());

    assert_eq!(report.extracted_sections.len(), 1);
    let top = &report.extracted_sections[0];
    assert_eq!(top.document, "a.pdf");
    assert_eq!(top.page_number, 1);
    assert_eq!(top.section_title, "Beaches");
    assert_eq!(top.importance_rank, 1);

    assert_eq!(report.sub_section_analysis.len(), 1);
    assert_eq!(
        report.sub_section_analysis[0].refined_text,
        "Beaches\nquiet beaches with warm water\nand hotels nearby for families"
    );

    // Two passes per document.
    let opened = loader.opened();
    assert_eq!(opened, vec!["a.pdf", "a.pdf", "b.pdf", "b.pdf"]);

    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&ws.config.output_path).unwrap()).unwrap();
    assert_eq!(written["extracted_sections"][0]["section_title"], "Beaches");
    assert_eq!(written["metadata"]["job_to_be_done"], report.metadata.job_to_be_done);
}

#[test]
fn test_run_is_repeatable_and_parallel_safe() {
    let ws = workspace(
        Some("Night owl"),
        Some("Late museums and clubs open until morning"),
        &["a.pdf", "b.pdf"],
    );

    let first = completed(run_with(&ws.config, &loader()).unwrap());
    let parallel = ws.config.clone().with_parallel(true);
    let second = completed(run_with(&parallel, &loader()).unwrap());

    assert_eq!(first.extracted_sections, second.extracted_sections);
    assert_eq!(first.sub_section_analysis, second.sub_section_analysis);
    assert_eq!(first.metadata.input_documents, second.metadata.input_documents);

    let ranks: Vec<u32> = first
        .extracted_sections
        .iter()
        .map(|s| s.importance_rank)
        .collect();
    assert_eq!(ranks, (1..=ranks.len() as u32).collect::<Vec<_>>());
    assert!(first
        .extracted_sections
        .iter()
        .any(|s| s.section_title == "Nightlife"));
}

#[test]
fn test_missing_persona_writes_no_report() {
    let ws = workspace(None, Some("Plan a trip"), &["a.pdf"]);
    let loader = loader();

    let outcome = run_with(&ws.config, &loader).unwrap();

    assert_eq!(outcome, Outcome::MissingDescriptions);
    assert!(!ws.config.output_path.exists());
    assert!(loader.opened().is_empty());
}

#[test]
fn test_blank_job_writes_no_report() {
    let ws = workspace(Some("Travel Planner"), Some("  \n"), &["a.pdf"]);
    let outcome = run_with(&ws.config, &loader()).unwrap();
    assert_eq!(outcome, Outcome::MissingDescriptions);
    assert!(!ws.config.output_path.exists());
}

#[test]
fn test_no_documents() {
    let ws = workspace(Some("Travel Planner"), Some("Plan a trip"), &[]);
    let outcome = run_with(&ws.config, &loader()).unwrap();
    assert_eq!(outcome, Outcome::NoDocuments);
    assert!(outcome.report().is_none());
    assert!(!ws.config.output_path.exists());
}

#[test]
fn test_undecodable_document_aborts_run() {
    let ws = workspace(
        Some("Travel Planner"),
        Some("Plan a trip"),
        &["a.pdf", "broken.pdf"],
    );
    let result = run_with(&ws.config, &loader());
    assert!(matches!(result, Err(Error::PdfParse(_))));
    assert!(!ws.config.output_path.exists());
}

#[test]
fn test_explicit_document_list() {
    let ws = workspace(
        Some("Travel Planner"),
        Some("Find beaches"),
        &["a.pdf", "b.pdf"],
    );
    let config = ws
        .config
        .clone()
        .with_documents(vec![ws.config.input_dir.join("b.pdf")]);

    let report = completed(run_with(&config, &loader()).unwrap());
    assert_eq!(report.metadata.input_documents, vec!["b.pdf"]);
    assert!(report.extracted_sections.is_empty());
}

#[test]
fn test_process_document_opens_once_per_pass() {
    let loader = loader();
    let sections =
        process_document(&loader, Path::new("a.pdf"), &OutlineOptions::default()).unwrap();

    let titles: Vec<&str> = sections.iter().map(|s| s.section_title.as_str()).collect();
    assert_eq!(titles, vec!["Beaches", "Nightlife"]);
    assert!(sections.iter().all(|s| s.relevance_score == 0.0));
    assert_eq!(loader.opened(), vec!["a.pdf", "a.pdf"]);
}
