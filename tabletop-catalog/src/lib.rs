//! Board game collection data model, list parsing, and name matching.
//!
//! This crate defines the records that flow through the pipeline (list
//! entries, resolution records, enriched games) without any I/O. Consumers
//! use these types directly for persistence, display, or matching.

pub mod list_parser;
pub mod normalize;
pub mod types;

pub use list_parser::{CatalogUrl, parse_catalog_url, parse_line, parse_list};
pub use normalize::{normalize_name, similarity};
pub use types::*;
