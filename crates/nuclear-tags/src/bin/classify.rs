//! Nuclear AO3 Tag Classifier
//!
//! Classify the relationship and character tags of one work and print the
//! result as JSON.
//!
//! Usage:
//!   cargo run --bin nuclear-classify -- --input work.json
//!   cat work.json | cargo run --bin nuclear-classify -- --pretty
//!   cargo run --bin nuclear-classify -- --input legacy.json --estimate

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use nuclear_core::logging::{
    ADVISORY_COUNT, DEMOTED_COUNT, DURATION_MS, PARTIAL, TAG_COUNT, WORK_ID,
};
use nuclear_tags::{
    Advisory, Classifier, ClassifierConfig, InMemoryTagStore, ProminenceClassificationResult,
    ProminenceEstimator, TagEstimate, TagKind, WorkTag,
};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncReadExt;
use tracing::{error, info, info_span, warn, Instrument};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

const AFTER_HELP: &str = r#"Work document:
  {
    "work_id": "optional uuid",
    "word_count": 12000,
    "chapter_count": 3,
    "tags": [
      {"name": "Harry Potter/Draco Malfoy", "kind": "relationship", "prominence": "primary", "is_user_set": true},
      {"name": "Harry Potter", "kind": "character"}
    ],
    "synonyms": {"Draco": "Draco Malfoy"}
  }

Environment Variables:
  NUCLEAR_PRIMARY_RELATIONSHIP_CAP  Maximum primary relationships per work (default: 2)
  NUCLEAR_BACKGROUND_KEYWORDS       Comma-separated background keywords
  NUCLEAR_GEN_RELATIONSHIPS         Comma-separated gen relationship names
  NUCLEAR_TAG_SPAM_THRESHOLD        Tag count flagged as potential spam (default: 25)
  NUCLEAR_SYNONYM_TIMEOUT_MS        Synonym lookup timeout (default: 500)
  LOG_FORMAT                        "json" or "text" (default: "text")
  LOG_FILE                          Log to a daily-rotated file instead of stderr
  RUST_LOG                          Log filter (default: "nuclear_tags=info,nuclear_classify=info")"#;

#[derive(Parser, Debug)]
#[command(name = "nuclear-classify")]
#[command(author, version, about = "Classify the relationship and character tags of a work")]
#[command(after_help = AFTER_HELP)]
struct Args {
    /// Work document to classify (default: read stdin)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Estimate prominence for tags that have none before classifying
    #[arg(short, long)]
    estimate: bool,

    /// Pretty-print the JSON result
    #[arg(short, long)]
    pretty: bool,
}

/// A work's tags as read from the input document.
#[derive(Debug, Deserialize)]
struct WorkDocument {
    #[serde(default)]
    work_id: Option<Uuid>,
    #[serde(default)]
    word_count: u64,
    #[serde(default)]
    chapter_count: u32,
    tags: Vec<WorkTag>,
    /// Alias name to canonical character name.
    #[serde(default)]
    synonyms: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
struct ClassifyOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    work_id: Option<Uuid>,
    #[serde(flatten)]
    result: ProminenceClassificationResult,
    /// Prominence filled in by `--estimate`, with score and reasons.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    estimates: Vec<TagEstimate>,
    /// Some estimate was not confident enough to apply unreviewed.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    needs_review: bool,
}

/// Keep this alive for the lifetime of the program so file logs are flushed.
type LogGuard = Option<tracing_appender::non_blocking::WorkerGuard>;

fn init_logging() -> LogGuard {
    // Environment variables:
    //   LOG_FORMAT  - "json" or "text" (default: "text")
    //   LOG_FILE    - path to log file (optional, enables file logging)
    //   LOG_ANSI    - "true"/"false" override ANSI colors
    //   RUST_LOG    - standard env filter (default: "nuclear_tags=info,nuclear_classify=info")
    let log_format = env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = env::var("LOG_FILE").ok();
    let log_ansi = env::var("LOG_ANSI").ok().map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "nuclear_tags=info,nuclear_classify=info".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    if let Some(ref path) = log_file {
        let file_dir = std::path::Path::new(path)
            .parent()
            .unwrap_or(std::path::Path::new("."));
        let file_name = std::path::Path::new(path)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("nuclear-classify.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(log_ansi.unwrap_or(false));
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        // stdout carries the result, so console logs go to stderr
        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    }
}

async fn read_input(path: Option<&PathBuf>) -> anyhow::Result<String> {
    match path {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

/// Load the work's character tags and the synonym map into a tag store.
fn build_store(doc: &WorkDocument) -> anyhow::Result<InMemoryTagStore> {
    let store = InMemoryTagStore::new();

    // Synonyms first: a character tag that is also an alias must resolve
    // to its canonical rather than becoming a canonical itself.
    store
        .insert_synonym_map(&doc.synonyms, TagKind::Character)
        .context("invalid synonym map")?;
    for tag in doc.tags.iter().filter(|t| t.kind == TagKind::Character) {
        store.insert_canonical(&tag.name, TagKind::Character);
    }

    Ok(store)
}

async fn run(args: &Args) -> anyhow::Result<ClassifyOutput> {
    let config = ClassifierConfig::from_env().context("invalid classifier configuration")?;

    let raw = read_input(args.input.as_ref()).await?;
    let doc: WorkDocument = serde_json::from_str(&raw).context("invalid work document")?;

    let span = info_span!(
        "classify_work",
        subsystem = "cli",
        work_id = tracing::field::Empty,
        tag_count = tracing::field::Empty,
        demoted = tracing::field::Empty,
        advisories = tracing::field::Empty,
        partial = tracing::field::Empty,
        duration_ms = tracing::field::Empty,
    );
    if let Some(id) = doc.work_id {
        span.record(WORK_ID, tracing::field::display(id));
    }
    span.record(TAG_COUNT, doc.tags.len());

    let start = Instant::now();
    let store = Arc::new(build_store(&doc)?);

    let (tags, estimates, needs_review) = if args.estimate {
        let estimator = ProminenceEstimator::new(&config)?;
        let backfill = estimator.backfill(&doc.tags, doc.word_count, doc.chapter_count);
        if backfill.needs_review() {
            span.in_scope(|| {
                warn!(
                    estimated = backfill.estimates.len(),
                    "Estimated prominence needs manual review"
                )
            });
        }
        let needs_review = backfill.needs_review();
        (backfill.tags, backfill.estimates, needs_review)
    } else {
        (doc.tags.clone(), Vec::new(), false)
    };

    let classifier = Classifier::new(config, store)?;
    let result = classifier.classify(&tags).instrument(span.clone()).await;

    let demoted = result
        .all_advisories()
        .filter(|a| matches!(a, Advisory::DemotedToSecondary { .. }))
        .count();
    span.record(DEMOTED_COUNT, demoted);
    span.record(ADVISORY_COUNT, result.all_advisories().count());
    span.record(PARTIAL, result.partial);
    span.record(DURATION_MS, start.elapsed().as_millis() as u64);

    span.in_scope(|| {
        info!(
            primary = result.summary.primary_relationship_count,
            secondary = result.summary.secondary_relationship_count,
            micro = result.summary.micro_relationship_count,
            "Classification complete"
        )
    });

    Ok(ClassifyOutput {
        work_id: doc.work_id,
        result,
        estimates,
        needs_review,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let _log_guard = init_logging();

    let args = Args::parse();
    let output = match run(&args).await {
        Ok(output) => output,
        Err(e) => {
            error!(subsystem = "cli", error = %e, "Classification failed");
            return Err(e);
        }
    };

    let json = if args.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{}", json);

    Ok(())
}
