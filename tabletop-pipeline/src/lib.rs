//! Resolution and enrichment of a board-game list.
//!
//! This crate owns the pipeline: resolving list entries to catalog ids,
//! reconciling them with the hand-edited resolution store, enriching ids
//! from the remote database into a resumable cache, and assembling the
//! final collection.

pub mod atomic;
pub mod cache;
pub mod collection;
pub mod enrich;
pub mod error;
pub mod input;
pub mod progress;
pub mod reconcile;
pub mod report;
pub mod resolve;
pub mod store;

pub use cache::EnrichmentCache;
pub use collection::{
    CollectionEmitter, CollectionStats, JsonEmitter, RATING_BUCKETS, assemble_collection,
};
pub use enrich::{EnrichAction, EnrichOptions, EnrichStats, Enricher, build_game, plan_action};
pub use error::PipelineError;
pub use input::read_list;
pub use progress::{LogProgress, PipelineProgress, SilentProgress};
pub use reconcile::{ResolutionPass, ResolveStats, merge_unresolved, pair_entries, run_resolution};
pub use report::{RunEntry, RunLog, RunSummary};
pub use resolve::{Candidate, MatchThresholds, ResolveOutcome, Resolver, ResolverOptions};
pub use store::{STORE_COLUMNS, load_store, load_store_lines, store_to_bytes, write_store};
