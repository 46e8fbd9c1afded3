//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tabletop")]
#[command(about = "Resolve a board-game list to catalog ids and enrich it", long_about = None)]
pub(crate) struct Cli {
    /// Settings file (default: ./tabletop.toml, then the user config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Only show warnings and errors (suppress normal output)
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Enable verbose/debug logging (timestamps + debug-level messages)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Write log output to a file (no colors)
    #[arg(long, global = true)]
    pub logfile: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// The input list.
#[derive(Args, Clone, Default)]
pub(crate) struct ListArgs {
    /// Plain-text game list, one entry per line
    #[arg(long)]
    pub list: Option<PathBuf>,
}

/// The resolution store.
#[derive(Args, Clone, Default)]
pub(crate) struct StoreArgs {
    /// Resolution store CSV (the manual-review file)
    #[arg(long)]
    pub store: Option<PathBuf>,
}

/// The enrichment cache and its images.
#[derive(Args, Clone, Default)]
pub(crate) struct CacheArgs {
    /// Enrichment cache CSV
    #[arg(long)]
    pub cache: Option<PathBuf>,

    /// Directory for downloaded images
    #[arg(long)]
    pub images: Option<PathBuf>,
}

/// The offline ranking dataset.
#[derive(Args, Clone, Default)]
pub(crate) struct RankingsArgs {
    /// Ranking dataset CSV used for local matching and fallback ranks
    #[arg(long)]
    pub rankings: Option<PathBuf>,
}

/// The collection output.
#[derive(Args, Clone, Default)]
pub(crate) struct OutputArgs {
    /// Collection JSON to write
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Options of the resolution pass.
#[derive(Args, Clone, Default)]
pub(crate) struct ResolveFlags {
    /// Don't use the remote search (direct links and local index only)
    #[arg(long)]
    pub offline: bool,
}

/// Options of the enrichment pass.
#[derive(Args, Clone, Default)]
pub(crate) struct EnrichFlags {
    /// Fetch details again for games already in the cache
    #[arg(long)]
    pub refresh: bool,

    /// Don't download images
    #[arg(long)]
    pub no_images: bool,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Resolve list entries to catalog ids and update the store
    Resolve {
        #[command(flatten)]
        list: ListArgs,

        #[command(flatten)]
        store: StoreArgs,

        #[command(flatten)]
        rankings: RankingsArgs,

        #[command(flatten)]
        flags: ResolveFlags,

        /// Maximum entries to look up this run
        #[arg(short, long)]
        limit: Option<usize>,

        /// Write a run report to this file
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Fetch details and images for resolved games
    Enrich {
        #[command(flatten)]
        store: StoreArgs,

        #[command(flatten)]
        cache: CacheArgs,

        #[command(flatten)]
        rankings: RankingsArgs,

        #[command(flatten)]
        flags: EnrichFlags,

        /// Maximum games to fetch this run
        #[arg(short, long)]
        limit: Option<usize>,

        /// Write a run report to this file
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Resolve, enrich and emit in one go
    Build {
        #[command(flatten)]
        list: ListArgs,

        #[command(flatten)]
        store: StoreArgs,

        #[command(flatten)]
        cache: CacheArgs,

        #[command(flatten)]
        rankings: RankingsArgs,

        #[command(flatten)]
        output: OutputArgs,

        #[command(flatten)]
        resolve: ResolveFlags,

        #[command(flatten)]
        enrich: EnrichFlags,

        /// Maximum lookups and fetches this run (each pass)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Write a run report to this file
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Write the assembled collection as JSON
    Emit {
        #[command(flatten)]
        store: StoreArgs,

        #[command(flatten)]
        cache: CacheArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// List store rows that need manual attention
    Review {
        #[command(flatten)]
        store: StoreArgs,

        /// Show every row, not only the ones needing review
        #[arg(short, long)]
        all: bool,
    },

    /// Show statistics for the assembled collection
    Stats {
        #[command(flatten)]
        store: StoreArgs,

        #[command(flatten)]
        cache: CacheArgs,

        /// How many top-ranked games to list
        #[arg(long, default_value_t = 10)]
        top: usize,
    },

    /// Manage the settings file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Show the effective settings and where they came from
    Show,

    /// Print the settings file path
    Path,

    /// Write a settings file with the defaults
    Init,
}
