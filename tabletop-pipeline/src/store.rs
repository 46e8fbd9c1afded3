//! The resolution store: a human-editable CSV of resolution records.
//!
//! ```text
//! input,custom_name,source_link,catalog_id,matched_name,confidence,status,match_method
//! Catan,,,13,CATAN,High,Found,LocalIndexMatch
//! ```
//!
//! Reading is lenient because people edit this file by hand: blank or
//! unrecognized cells fall back to their defaults with a warning instead of
//! rejecting the row.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tabletop_catalog::{Confidence, MatchMethod, ResolutionRecord, ResolutionStatus};

use crate::atomic::write_atomic;
use crate::error::PipelineError;

pub const STORE_COLUMNS: [&str; 8] = [
    "input",
    "custom_name",
    "source_link",
    "catalog_id",
    "matched_name",
    "confidence",
    "status",
    "match_method",
];

/// One store row as text, before interpretation.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct StoreRow {
    input: String,
    custom_name: String,
    source_link: String,
    catalog_id: String,
    matched_name: String,
    confidence: String,
    status: String,
    match_method: String,
}

impl StoreRow {
    fn is_blank(&self) -> bool {
        self.input.is_empty()
            && self.custom_name.is_empty()
            && self.source_link.is_empty()
            && self.catalog_id.is_empty()
    }

    fn into_record(self, line: u64) -> ResolutionRecord {
        ResolutionRecord {
            catalog_id: parse_catalog_id(&self.catalog_id, line),
            confidence: parse_cell(&self.confidence, "confidence", line),
            status: parse_cell(&self.status, "status", line),
            match_method: parse_cell(&self.match_method, "match_method", line),
            input: self.input,
            custom_name: non_empty(self.custom_name),
            source_link: non_empty(self.source_link),
            matched_name: non_empty(self.matched_name),
        }
    }

    fn from_record(record: &ResolutionRecord) -> Self {
        Self {
            input: record.input.clone(),
            custom_name: record.custom_name.clone().unwrap_or_default(),
            source_link: record.source_link.clone().unwrap_or_default(),
            catalog_id: record.catalog_id.map(|id| id.to_string()).unwrap_or_default(),
            matched_name: record.matched_name.clone().unwrap_or_default(),
            confidence: record.confidence.to_string(),
            status: record.status.to_string(),
            match_method: record.match_method.to_string(),
        }
    }
}

/// Load the store. A missing file is an empty store.
pub fn load_store(path: &Path) -> Result<Vec<ResolutionRecord>, PipelineError> {
    let rows = load_store_lines(path)?;
    Ok(rows.into_iter().map(|(_, record)| record).collect())
}

/// Load the store, pairing each record with the file line its row starts
/// on. Skipped rows leave gaps in the numbering.
pub fn load_store_lines(path: &Path) -> Result<Vec<(u64, ResolutionRecord)>, PipelineError> {
    if !path.exists() {
        log::debug!("No store at {}, starting empty", path.display());
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    if !headers.iter().any(|h| h == "input" || h == "catalog_id") {
        return Err(PipelineError::invalid_store(
            path,
            "header row must name at least 'input' or 'catalog_id'",
        ));
    }

    let mut records = Vec::new();
    for result in reader.records() {
        let parsed = result.and_then(|raw| {
            let line = raw.position().map_or(0, |p| p.line());
            raw.deserialize::<StoreRow>(Some(&headers)).map(|row| (line, row))
        });
        match parsed {
            Ok((_, row)) if row.is_blank() => {}
            Ok((line, row)) => records.push((line, row.into_record(line))),
            Err(e) => {
                let line = e.position().map_or(0, |p| p.line());
                log::warn!("Skipping malformed store row at line {line}: {e}");
            }
        }
    }

    log::debug!("Loaded {} stored records from {}", records.len(), path.display());
    Ok(records)
}

/// Serialize records to CSV text, header first.
pub fn store_to_bytes(records: &[ResolutionRecord]) -> Result<Vec<u8>, PipelineError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(STORE_COLUMNS)?;
    for record in records {
        writer.serialize(StoreRow::from_record(record))?;
    }
    writer.into_inner().map_err(|e| PipelineError::Io(e.into_error()))
}

/// Write the whole store atomically.
pub fn write_store(path: &Path, records: &[ResolutionRecord]) -> Result<(), PipelineError> {
    let bytes = store_to_bytes(records)?;
    write_atomic(path, &bytes).map_err(|e| PipelineError::persist(path, e))?;
    log::debug!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

/// Ids typed into spreadsheets sometimes come back as "13.0".
fn parse_catalog_id(cell: &str, line: u64) -> Option<u32> {
    if cell.is_empty() {
        return None;
    }
    let id = cell.parse::<u32>().ok().or_else(|| {
        cell.parse::<f64>()
            .ok()
            .filter(|v| v.fract() == 0.0 && *v >= 1.0 && *v <= f64::from(u32::MAX))
            .map(|v| v as u32)
    });
    match id {
        Some(0) | None => {
            log::warn!("Store row {line}: ignoring invalid catalog_id '{cell}'");
            None
        }
        id => id,
    }
}

fn parse_cell<T>(cell: &str, column: &str, line: u64) -> T
where
    T: std::str::FromStr + Default,
{
    if cell.is_empty() {
        return T::default();
    }
    cell.parse().unwrap_or_else(|_| {
        log::warn!("Store row {line}: unknown {column} '{cell}', using default");
        T::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_id_cells() {
        assert_eq!(parse_catalog_id("13", 2), Some(13));
        assert_eq!(parse_catalog_id("13.0", 2), Some(13));
        assert_eq!(parse_catalog_id("", 2), None);
        assert_eq!(parse_catalog_id("0", 2), None);
        assert_eq!(parse_catalog_id("abc", 2), None);
        assert_eq!(parse_catalog_id("13.5", 2), None);
    }

    #[test]
    fn enum_cells_fall_back_to_defaults() {
        assert_eq!(parse_cell::<Confidence>("", "confidence", 2), Confidence::None);
        assert_eq!(parse_cell::<Confidence>("high", "confidence", 2), Confidence::High);
        assert_eq!(
            parse_cell::<ResolutionStatus>("done?", "status", 2),
            ResolutionStatus::ManualReviewNeeded
        );
        assert_eq!(parse_cell::<MatchMethod>("", "match_method", 2), MatchMethod::Unresolved);
    }

    #[test]
    fn empty_store_still_has_header() {
        let bytes = store_to_bytes(&[]).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap().trim_end(),
            STORE_COLUMNS.join(",")
        );
    }
}
