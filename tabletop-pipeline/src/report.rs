use std::path::Path;

use tabletop_catalog::{Confidence, MatchMethod};

/// A single entry in the run log.
#[derive(Debug, Clone)]
pub enum RunEntry {
    Resolved {
        input: String,
        catalog_id: u32,
        name: Option<String>,
        confidence: Confidence,
        method: MatchMethod,
    },
    /// A stored row that already had an id and was left untouched.
    Preserved {
        input: String,
        catalog_id: u32,
    },
    Unresolved {
        input: String,
        alternatives: Vec<String>,
        error: Option<String>,
    },
    /// A line with nothing to match on.
    NotFound {
        input: String,
    },
    Enriched {
        catalog_id: u32,
        name: String,
        image: bool,
    },
    ImageOnly {
        catalog_id: u32,
        name: String,
    },
    Skipped {
        catalog_id: u32,
        name: String,
    },
    Failed {
        catalog_id: u32,
        name: String,
        message: String,
    },
}

/// Counts per outcome.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub resolved: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub preserved: usize,
    pub unresolved: usize,
    pub not_found: usize,
    pub enriched: usize,
    pub images: usize,
    pub image_only: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Collects per-entry outcomes of a run and writes them as a text report.
#[derive(Debug, Default)]
pub struct RunLog {
    entries: Vec<RunEntry>,
}

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entry: RunEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[RunEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn summary(&self) -> RunSummary {
        let mut summary = RunSummary::default();
        for entry in &self.entries {
            match entry {
                RunEntry::Resolved { confidence, .. } => {
                    summary.resolved += 1;
                    match confidence {
                        Confidence::High => summary.high += 1,
                        Confidence::Medium => summary.medium += 1,
                        Confidence::Low | Confidence::None => summary.low += 1,
                    }
                }
                RunEntry::Preserved { .. } => summary.preserved += 1,
                RunEntry::Unresolved { .. } => summary.unresolved += 1,
                RunEntry::NotFound { .. } => summary.not_found += 1,
                RunEntry::Enriched { image, .. } => {
                    summary.enriched += 1;
                    if *image {
                        summary.images += 1;
                    }
                }
                RunEntry::ImageOnly { .. } => {
                    summary.image_only += 1;
                    summary.images += 1;
                }
                RunEntry::Skipped { .. } => summary.skipped += 1,
                RunEntry::Failed { .. } => summary.failed += 1,
            }
        }
        summary
    }

    /// Write the log to a file.
    pub fn write_to_file(&self, path: &Path) -> std::io::Result<()> {
        use std::io::Write;

        let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
        let summary = self.summary();

        writeln!(file, "=== Tabletop Run Log ===")?;
        writeln!(
            file,
            "Date: {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        )?;
        writeln!(file)?;
        writeln!(file, "--- Summary ---")?;
        writeln!(
            file,
            "Resolved: {} (high: {}, medium: {}, low: {})",
            summary.resolved, summary.high, summary.medium, summary.low
        )?;
        writeln!(file, "Preserved: {}", summary.preserved)?;
        writeln!(file, "Unresolved: {}", summary.unresolved)?;
        writeln!(file, "Not found: {}", summary.not_found)?;
        writeln!(
            file,
            "Enriched: {} (image only: {}, skipped: {})",
            summary.enriched, summary.image_only, summary.skipped
        )?;
        writeln!(file, "Images downloaded: {}", summary.images)?;
        writeln!(file, "Failed: {}", summary.failed)?;
        writeln!(file)?;
        writeln!(file, "--- Details ---")?;
        writeln!(file)?;

        for entry in &self.entries {
            match entry {
                RunEntry::Resolved {
                    input,
                    catalog_id,
                    name,
                    confidence,
                    method,
                } => {
                    writeln!(
                        file,
                        "[OK] {} -> {} \"{}\" ({}, {})",
                        input,
                        catalog_id,
                        name.as_deref().unwrap_or("?"),
                        confidence,
                        method
                    )?;
                }
                RunEntry::Preserved { input, catalog_id } => {
                    writeln!(file, "[KEPT] {} -> {}", input, catalog_id)?;
                }
                RunEntry::Unresolved {
                    input,
                    alternatives,
                    error,
                } => {
                    writeln!(file, "[REVIEW] {}", input)?;
                    if let Some(e) = error {
                        writeln!(file, "     Error: {}", e)?;
                    }
                    for alt in alternatives {
                        writeln!(file, "     Candidate: {}", alt)?;
                    }
                }
                RunEntry::NotFound { input } => {
                    writeln!(file, "[NOT FOUND] {}", input)?;
                }
                RunEntry::Enriched {
                    catalog_id,
                    name,
                    image,
                } => {
                    let suffix = if *image { " +image" } else { "" };
                    writeln!(file, "[ENRICHED] {} \"{}\"{}", catalog_id, name, suffix)?;
                }
                RunEntry::ImageOnly { catalog_id, name } => {
                    writeln!(file, "[IMAGE] {} \"{}\"", catalog_id, name)?;
                }
                RunEntry::Skipped { catalog_id, name } => {
                    writeln!(file, "[CACHED] {} \"{}\"", catalog_id, name)?;
                }
                RunEntry::Failed {
                    catalog_id,
                    name,
                    message,
                } => {
                    writeln!(file, "[ERROR] {} \"{}\": {}", catalog_id, name, message)?;
                }
            }
        }

        file.flush()
    }
}
