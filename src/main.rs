use anyhow::{Context, Result};
use clap::Parser;
use ranksense::settings::settings;
use ranksense::utils::{log_batch_start, log_document_failed, log_document_loaded, log_ranking};
use ranksense::{evaluate_batch, BatchOptions, JobContext, PlainTextExtractor, SourceDocument};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::subscriber::set_global_default;
use tracing::warn;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Score and rank a batch of resumes.
#[derive(Debug, Parser)]
#[command(name = "ranksense", version, about)]
struct Cli {
    /// Resume files to evaluate (.txt, .md)
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Job title the batch is evaluated for
    #[arg(long)]
    job_title: Option<String>,

    /// Job description the batch is evaluated for
    #[arg(long)]
    job_desc: Option<String>,

    /// Seed for reproducible scores
    #[arg(long)]
    seed: Option<u64>,

    /// Print the ranked batch as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Log library diagnostics at debug level
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) -> Result<()> {
    let directive = if verbose {
        "ranksense=debug"
    } else {
        "ranksense=warn"
    };
    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(directive.parse()?))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        );
    set_global_default(subscriber).context("failed to set tracing subscriber")?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let max = settings().batch.max_documents;
    if cli.files.len() > max {
        anyhow::bail!("at most {max} files per batch, got {}", cli.files.len());
    }

    let job = JobContext {
        title: cli.job_title,
        description: cli.job_desc,
    };
    if !cli.json {
        log_batch_start(cli.files.len(), &job);
    }

    let mut documents = Vec::with_capacity(cli.files.len());
    for path in &cli.files {
        match SourceDocument::read(path).await {
            Ok(document) => {
                if !cli.json {
                    log_document_loaded(&document.filename, document.bytes.len());
                }
                documents.push(document);
            }
            Err(e) if cli.json => {
                warn!(path = %path.display(), error = %e, "skipping unreadable file");
            }
            Err(e) => {
                log_document_failed(&path.display().to_string(), &e.to_string());
            }
        }
    }

    let options = BatchOptions { seed: cli.seed };
    let batch = evaluate_batch(job, documents, Arc::new(PlainTextExtractor), options)
        .await
        .context("failed to evaluate batch")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&batch)?);
    } else {
        println!();
        log_ranking(&batch);
    }

    Ok(())
}
