use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "voicelog-cli")]
#[command(about = "Draft-vs-final voice analytics over an exported post corpus")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Build the full analytics report for a corpus export
    Report {
        /// JSON file with `posts` and `metrics` arrays
        #[arg(long)]
        corpus: PathBuf,

        /// Vocabulary YAML; overrides `VOICELOG_VOCABULARY_PATH`
        #[arg(long)]
        vocabulary: Option<PathBuf>,

        /// Anchor instant for time windows (RFC 3339); defaults to now
        #[arg(long)]
        as_of: Option<DateTime<Utc>>,
    },
    /// Rank one post's engagement rates against its baseline
    Performance {
        #[arg(long)]
        corpus: PathBuf,

        /// Id of the post to rank
        #[arg(long)]
        post: Uuid,
    },
    /// Diff a draft file against a final file
    Diff {
        #[arg(long)]
        draft: PathBuf,

        #[arg(long = "final")]
        final_text: PathBuf,
    },
    /// Build a post record from a draft/final pair, as the logging form does
    Log {
        #[arg(long, default_value = "")]
        topic: String,

        #[arg(long)]
        draft: PathBuf,

        #[arg(long = "final")]
        final_text: PathBuf,
    },
    /// Print the vocabulary the analytics would use
    Vocabulary {
        #[arg(long)]
        vocabulary: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let config = voicelog_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Report {
            corpus,
            vocabulary,
            as_of,
        }) => commands::run_report(&config, &corpus, vocabulary.as_deref(), as_of)?,
        Some(Commands::Performance { corpus, post }) => {
            commands::run_performance(&config, &corpus, post)?;
        }
        Some(Commands::Diff { draft, final_text }) => commands::run_diff(&draft, &final_text)?,
        Some(Commands::Log {
            topic,
            draft,
            final_text,
        }) => commands::run_log(&topic, &draft, &final_text)?,
        Some(Commands::Vocabulary { vocabulary }) => {
            commands::run_vocabulary(&config, vocabulary.as_deref())?;
        }
        None => println!("voicelog-cli: pass --help for available commands"),
    }

    Ok(())
}
