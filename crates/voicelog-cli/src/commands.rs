//! Command handlers for the CLI.
//!
//! Every handler prints a single pretty JSON document to stdout; logs go to
//! stderr so the output can be piped.

use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use voicelog_analytics::{
    build_report, compute_diff, edit_count, log_post, post_performance, similarity, DiffSummary,
    LineOp,
};
use voicelog_core::{load_vocabulary, AppConfig, Corpus, Vocabulary};

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_text(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

pub(crate) fn load_corpus(path: &Path) -> anyhow::Result<Corpus> {
    let raw = read_text(path)?;
    let corpus: Corpus = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse corpus {}", path.display()))?;
    tracing::debug!(
        posts = corpus.posts.len(),
        metrics = corpus.metrics.len(),
        path = %path.display(),
        "loaded corpus"
    );
    Ok(corpus)
}

/// The `--vocabulary` flag wins, then the configured path, then the
/// built-in lists.
pub(crate) fn resolve_vocabulary(
    config: &AppConfig,
    flag: Option<&Path>,
) -> anyhow::Result<Vocabulary> {
    match flag.or(config.vocabulary_path.as_deref()) {
        Some(path) => load_vocabulary(path)
            .with_context(|| format!("failed to load vocabulary {}", path.display())),
        None => {
            tracing::debug!("no vocabulary file configured; using built-in lists");
            Ok(Vocabulary::default())
        }
    }
}

pub(crate) fn run_report(
    config: &AppConfig,
    corpus_path: &Path,
    vocabulary_path: Option<&Path>,
    as_of: Option<DateTime<Utc>>,
) -> anyhow::Result<()> {
    let corpus = load_corpus(corpus_path)?;
    let vocabulary = resolve_vocabulary(config, vocabulary_path)?;
    let as_of = as_of.unwrap_or_else(Utc::now);

    let report = build_report(&corpus, &vocabulary, &config.analytics, as_of)?;
    print_json(&report)
}

pub(crate) fn run_performance(
    config: &AppConfig,
    corpus_path: &Path,
    post_id: Uuid,
) -> anyhow::Result<()> {
    let corpus = load_corpus(corpus_path)?;
    let report = post_performance(&corpus, post_id, &config.analytics)?;
    print_json(&report)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DiffOutput {
    edit_count: u32,
    similarity: f64,
    summary: DiffSummary,
    ops: Vec<LineOp>,
}

pub(crate) fn run_diff(draft_path: &Path, final_path: &Path) -> anyhow::Result<()> {
    let draft = read_text(draft_path)?;
    let final_text = read_text(final_path)?;

    let ops = compute_diff(&draft, &final_text)?;
    print_json(&DiffOutput {
        edit_count: edit_count(&draft, &final_text),
        similarity: similarity(&draft, &final_text),
        summary: DiffSummary::from_ops(&ops),
        ops,
    })
}

pub(crate) fn run_log(topic: &str, draft_path: &Path, final_path: &Path) -> anyhow::Result<()> {
    let draft = read_text(draft_path)?;
    let final_text = read_text(final_path)?;
    let post = log_post(topic, &draft, &final_text, Utc::now())?;
    print_json(&post)
}

pub(crate) fn run_vocabulary(config: &AppConfig, flag: Option<&Path>) -> anyhow::Result<()> {
    let vocabulary = resolve_vocabulary(config, flag)?;
    print_json(&vocabulary)
}
