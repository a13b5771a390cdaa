use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use ranksense::scoring::{score_document, section_evidence};
use ranksense::utils::{log_document_empty, log_header, log_newline, CandidateAssessment};
use ranksense::{PlainTextExtractor, SourceDocument, TextExtractor};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Explain how a single resume is scored, section by section.
#[derive(Debug, Parser)]
#[command(name = "score-resume", version, about)]
struct Args {
    /// Resume file (.txt, .md)
    file: PathBuf,

    /// Seed for reproducible scores
    #[arg(long)]
    seed: Option<u64>,

    /// Print the scored profile as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    let document = SourceDocument::read(&args.file)
        .await
        .with_context(|| format!("failed to read {}", args.file.display()))?;

    let text = PlainTextExtractor.extract(&document.filename, &document.bytes);
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let candidate = score_document(&document.filename, &text, 0, &mut rng);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&candidate)?);
        return Ok(());
    }

    if text.is_empty() {
        log_document_empty(&document.filename);
        log_newline();
    }

    log_header("Score resume");
    let evidence = candidate
        .sections
        .iter()
        .map(|s| (s.section.clone(), section_evidence(&text, &s.section)))
        .collect();
    CandidateAssessment::new(candidate, evidence).print();

    Ok(())
}
