//! Command line arguments.
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Recommend movies and shows with similar genres and plots
#[derive(Parser, Debug)]
#[command(name = "reelmatch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file (defaults to ./reelmatch.toml when present)
    #[arg(long, global = true, env = "REELMATCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Catalogue file or directory, overriding data.source
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,

    /// Use the built-in sample catalogue
    #[arg(long, global = true, conflicts_with = "data")]
    pub sample: bool,

    /// Similarity strategy: auto, full_matrix or on_demand
    #[arg(long, global = true)]
    pub strategy: Option<String>,

    /// Debug logging for reelmatch crates
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Titles most similar to the given title or id
    Recommend {
        title_or_id: String,

        /// Number of results (defaults to ranking.default_k)
        #[arg(short = 'k')]
        k: Option<usize>,

        /// Attach overview and poster from the external service
        #[arg(long)]
        enrich: bool,

        #[arg(long)]
        json: bool,
    },

    /// The external service's own recommendations for a title
    External {
        title_or_id: String,

        #[arg(short = 'k')]
        k: Option<usize>,

        #[arg(long)]
        json: bool,
    },

    /// Corpus and index statistics
    Info,

    /// List titles in position order
    Titles {
        #[arg(long)]
        limit: Option<usize>,
    },
}
