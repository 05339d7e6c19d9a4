//! Run configuration.
//!
//! All paths and heuristic constants used by the pipeline live here and are
//! passed in explicitly. Defaults reproduce the standard deployment: inputs
//! and outputs under `/app` when running in a container, `./input` and
//! `./output` otherwise.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::layout::DEFAULT_LINE_TOLERANCE;
use crate::outline::ScoreWeights;

/// Persona description file name inside the input directory.
pub const PERSONA_FILE: &str = "persona.txt";

/// Job-to-be-done description file name inside the input directory.
pub const JOB_FILE: &str = "job_to_be_done.txt";

/// Report file name inside the output directory.
pub const REPORT_FILE: &str = "challenge1b_results.json";

/// Input and output directories of a deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentLayout {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl DeploymentLayout {
    /// Pick the container layout (`/app/input`, `/app/output`) when both
    /// directories exist, else the working-directory layout.
    pub fn detect() -> Self {
        Self::detect_with(Path::new("/app"), Path::new("."))
    }

    /// Pick `<container_root>/{input,output}` when both exist, else
    /// `<local_root>/{input,output}`.
    pub fn detect_with(container_root: &Path, local_root: &Path) -> Self {
        let container_input = container_root.join("input");
        let container_output = container_root.join("output");
        if container_input.exists() && container_output.exists() {
            log::debug!("Using container layout under {}", container_root.display());
            return Self {
                input_dir: container_input,
                output_dir: container_output,
            };
        }
        Self {
            input_dir: local_root.join("input"),
            output_dir: local_root.join("output"),
        }
    }
}

/// Configuration of a full run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory scanned for `*.pdf` documents
    pub input_dir: PathBuf,

    /// Explicit document list; replaces directory discovery when set
    pub documents: Option<Vec<PathBuf>>,

    /// Persona description file
    pub persona_path: PathBuf,

    /// Job-to-be-done description file
    pub job_path: PathBuf,

    /// Report destination
    pub output_path: PathBuf,

    /// Heading detection settings
    pub outline: OutlineOptions,

    /// Relevance ranking settings
    pub rank: RankOptions,

    /// Process documents in parallel
    pub parallel: bool,
}

impl Config {
    /// Configuration reading from `input_dir` and writing into `output_dir`
    /// with the standard file names.
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        let input_dir = input_dir.into();
        let output_dir = output_dir.into();
        Self {
            persona_path: input_dir.join(PERSONA_FILE),
            job_path: input_dir.join(JOB_FILE),
            output_path: output_dir.join(REPORT_FILE),
            input_dir,
            documents: None,
            outline: OutlineOptions::default(),
            rank: RankOptions::default(),
            parallel: false,
        }
    }

    /// Configuration for a deployment layout.
    pub fn from_layout(layout: &DeploymentLayout) -> Self {
        Self::new(&layout.input_dir, &layout.output_dir)
    }

    /// Configuration for the detected deployment layout.
    pub fn detect() -> Self {
        Self::from_layout(&DeploymentLayout::detect())
    }

    /// Process exactly these documents instead of scanning the input directory.
    pub fn with_documents(mut self, documents: Vec<PathBuf>) -> Self {
        self.documents = Some(documents);
        self
    }

    /// Set the persona description file.
    pub fn with_persona_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.persona_path = path.into();
        self
    }

    /// Set the job-to-be-done description file.
    pub fn with_job_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.job_path = path.into();
        self
    }

    /// Set the report destination.
    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    /// Set heading detection options.
    pub fn with_outline_options(mut self, options: OutlineOptions) -> Self {
        self.outline = options;
        self
    }

    /// Set ranking options.
    pub fn with_rank_options(mut self, options: RankOptions) -> Self {
        self.rank = options;
        self
    }

    /// Enable or disable parallel document processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Check option ranges.
    pub fn validate(&self) -> Result<()> {
        self.outline.validate()?;
        self.rank.validate()
    }
}

/// Heading detection settings.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlineOptions {
    /// Vertical tolerance for line grouping
    pub line_tolerance: f32,

    /// Leading pages sampled for the font profile
    pub profile_pages: usize,

    /// Leading pages searched for the title
    pub title_pages: usize,

    /// Titles must be shorter than this (characters)
    pub max_title_chars: usize,

    /// Lines shorter than this are never headings
    pub min_line_chars: usize,

    /// Lines at least this long are never headings
    pub max_line_chars: usize,

    /// Number of heading sizes kept in the profile (1-3)
    pub heading_levels: usize,

    /// Number of most frequent colors treated as ordinary
    pub common_colors: usize,

    /// Average line gap used when a page has no positive gaps
    pub default_gap: f32,

    /// A gap above this multiple of the page average isolates a line
    pub isolation_factor: f32,

    /// Lines starting left of this edge score the indent signal
    pub max_indent: f32,

    /// All-caps lines must be shorter than this (characters)
    pub caps_max_chars: usize,

    /// Lines with at most this many tokens may score the short-line signal
    pub short_line_tokens: usize,

    /// Running score needed before the short-line signal applies
    pub short_line_min_score: f32,

    /// Minimum total score for a heading
    pub threshold: f32,

    /// Signal weights
    pub weights: ScoreWeights,
}

impl Default for OutlineOptions {
    fn default() -> Self {
        Self {
            line_tolerance: DEFAULT_LINE_TOLERANCE,
            profile_pages: 5,
            title_pages: 2,
            max_title_chars: 100,
            min_line_chars: 3,
            max_line_chars: 100,
            heading_levels: 3,
            common_colors: 5,
            default_gap: 5.0,
            isolation_factor: 1.5,
            max_indent: 70.0,
            caps_max_chars: 50,
            short_line_tokens: 5,
            short_line_min_score: 3.0,
            threshold: 4.0,
            weights: ScoreWeights::default(),
        }
    }
}

impl OutlineOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the acceptance threshold.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the signal weights.
    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Set the line grouping tolerance.
    pub fn with_line_tolerance(mut self, tolerance: f32) -> Self {
        self.line_tolerance = tolerance;
        self
    }

    /// Set the number of pages sampled for the font profile.
    pub fn with_profile_pages(mut self, pages: usize) -> Self {
        self.profile_pages = pages;
        self
    }

    fn validate(&self) -> Result<()> {
        if !(1..=3).contains(&self.heading_levels) {
            return Err(Error::Config(format!(
                "heading_levels must be between 1 and 3, got {}",
                self.heading_levels
            )));
        }
        if self.line_tolerance < 0.0 {
            return Err(Error::Config("line_tolerance must not be negative".into()));
        }
        Ok(())
    }
}

/// Relevance ranking settings.
#[derive(Debug, Clone, PartialEq)]
pub struct RankOptions {
    /// Maximum number of ranked sections
    pub top_n: usize,

    /// Keywords must have at least this many characters
    pub min_keyword_chars: usize,

    /// Texts shorter than this are penalised
    pub short_text_chars: usize,

    /// Score multiplier for short texts
    pub short_text_factor: f64,

    /// Texts longer than this are boosted
    pub long_text_chars: usize,

    /// Score multiplier for long texts
    pub long_text_factor: f64,

    /// Texts longer than this are excerpted to their first line
    pub excerpt_chars: usize,

    /// Appended to excerpted text
    pub ellipsis: String,

    /// Words never used as keywords
    pub stopwords: Vec<String>,
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            top_n: 10,
            min_keyword_chars: 3,
            short_text_chars: 50,
            short_text_factor: 0.5,
            long_text_chars: 500,
            long_text_factor: 1.1,
            excerpt_chars: 200,
            ellipsis: "...".to_string(),
            stopwords: [
                "the", "a", "an", "is", "of", "to", "and", "or", "for", "in", "on", "with", "as",
                "by", "from", "at", "be",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl RankOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of ranked sections.
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    /// Replace the stopword list.
    pub fn with_stopwords<I, S>(mut self, stopwords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stopwords = stopwords.into_iter().map(Into::into).collect();
        self
    }

    fn validate(&self) -> Result<()> {
        if self.min_keyword_chars == 0 {
            return Err(Error::Config("min_keyword_chars must be at least 1".into()));
        }
        Ok(())
    }
}
