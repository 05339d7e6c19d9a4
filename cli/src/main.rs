//! docrank CLI - persona-driven PDF section ranking

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;

use docrank::{
    extract_outline_from_file, pipeline, to_json, Config, DeploymentLayout, JsonFormat, Outcome,
};

/// Characters of the report shown after a run.
const PREVIEW_CHARS: usize = 1000;

#[derive(Parser)]
#[command(name = "docrank")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Rank PDF sections against a persona and job-to-be-done", long_about = None)]
struct Cli {
    /// Input directory with PDF files, persona.txt and job_to_be_done.txt
    #[arg(short, long, value_name = "DIR", env = "DOCRANK_INPUT")]
    input: Option<PathBuf>,

    /// Output directory for the report
    #[arg(short, long, value_name = "DIR", env = "DOCRANK_OUTPUT")]
    output: Option<PathBuf>,

    /// Persona description file (default: <input>/persona.txt)
    #[arg(long, value_name = "FILE")]
    persona: Option<PathBuf>,

    /// Job-to-be-done description file (default: <input>/job_to_be_done.txt)
    #[arg(long, value_name = "FILE")]
    job: Option<PathBuf>,

    /// Process documents in parallel
    #[arg(long)]
    parallel: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the title and heading outline of a PDF as JSON
    Outline {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Outline {
            ref input,
            ref output,
            compact,
        }) => cmd_outline(input, output.as_deref(), compact),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => cmd_analyze(&cli),
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_analyze(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let detected = DeploymentLayout::detect();
    let layout = DeploymentLayout {
        input_dir: cli.input.clone().unwrap_or(detected.input_dir),
        output_dir: cli.output.clone().unwrap_or(detected.output_dir),
    };

    let mut config = Config::from_layout(&layout).with_parallel(cli.parallel);
    if let Some(ref persona) = cli.persona {
        config = config.with_persona_path(persona);
    }
    if let Some(ref job) = cli.job {
        config = config.with_job_path(job);
    }

    println!("{}: {}", "Input".bold(), layout.input_dir.display());
    println!("{}: {}", "Output".bold(), layout.output_dir.display());

    match pipeline::run(&config)? {
        Outcome::Completed(report) => {
            println!(
                "\n{} {} sections from {} documents",
                "Ranked".green().bold(),
                report.extracted_sections.len(),
                report.metadata.input_documents.len()
            );
            println!("{} {}", "Saved to".green(), config.output_path.display());

            let json = to_json(&report, JsonFormat::Pretty)?;
            println!("\n{}", "Preview".cyan().bold());
            println!("{}", "─".repeat(40).dimmed());
            println!("{}", preview(&json, PREVIEW_CHARS));
        }
        Outcome::NoDocuments => {
            println!(
                "{} {}",
                "No PDF files found in".yellow(),
                layout.input_dir.display()
            );
        }
        Outcome::MissingDescriptions => {
            println!(
                "{}",
                "Persona or job-to-be-done description is missing or empty".yellow()
            );
        }
    }

    Ok(())
}

fn cmd_outline(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    log::info!("Extracting outline from {}", input.display());
    let outline = extract_outline_from_file(input)?;
    log::debug!("{} headings found", outline.len());

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };
    let json = to_json(&outline, format)?;

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "docrank".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Persona-driven PDF section ranking");
    println!();
    println!("License: MIT");
}

/// First `max_chars` characters, with an ellipsis when cut.
fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}
