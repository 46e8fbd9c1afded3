use std::path::Path;

use tabletop_catalog::{ListEntry, parse_list};

use crate::error::PipelineError;

/// Read and parse the input list. Failing to read it is fatal.
pub fn read_list(path: &Path) -> Result<Vec<ListEntry>, PipelineError> {
    let text = std::fs::read_to_string(path).map_err(|e| PipelineError::input_list(path, e))?;
    let entries = parse_list(&text);
    log::debug!("Parsed {} entries from {}", entries.len(), path.display());
    Ok(entries)
}
