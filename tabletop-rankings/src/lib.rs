//! Offline ranking data for board games.
//!
//! Parses the bulk ranking CSV export and builds an in-memory index for
//! fuzzy name lookups without touching the network.

pub mod error;
pub mod index;
pub mod ranks;

pub use error::RankingsError;
pub use index::{IndexMatch, RankingIndex};
pub use ranks::{RankedGame, parse_ranks_csv, parse_ranks_file};
