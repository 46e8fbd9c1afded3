//! Reconciliation of a resolution pass with the persisted store.
//!
//! Stored rows are the manual-review surface. A stored row that already has
//! a `catalog_id` is kept verbatim and never looked up again; a stored row
//! without one is re-resolved, keeping whatever the user typed into
//! `custom_name` and `source_link`.

use std::collections::HashMap;

use tabletop_catalog::{ListEntry, ResolutionRecord, ResolutionStatus};

use crate::progress::PipelineProgress;
use crate::report::{RunEntry, RunLog};
use crate::resolve::{ResolveOutcome, Resolver};

/// Statistics from a resolution pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ResolveStats {
    pub entries: usize,
    pub preserved: usize,
    pub resolved: usize,
    pub unresolved: usize,
    pub not_found: usize,
    /// Stored rows no input line pairs with, appended at the end.
    pub orphaned: usize,
    /// Entries left unresolved because the lookup limit was reached.
    pub deferred: usize,
}

/// Result of a resolution pass: the reconciled table, in output order.
#[derive(Debug, Clone)]
pub struct ResolutionPass {
    pub records: Vec<ResolutionRecord>,
    pub stats: ResolveStats,
}

/// Pair each entry with at most one stored row.
///
/// Pairing is by identical `input` first, then by identical `source_link`.
/// Each stored row is used once, in order, so duplicate lines pair with
/// duplicate rows.
pub fn pair_entries(entries: &[ListEntry], prior: &[ResolutionRecord]) -> Vec<Option<usize>> {
    let mut by_input: HashMap<&str, Vec<usize>> = HashMap::new();
    let mut by_link: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, record) in prior.iter().enumerate() {
        if !record.input.is_empty() {
            by_input.entry(record.input.as_str()).or_default().push(i);
        }
        if let Some(link) = record.source_link.as_deref() {
            by_link.entry(link).or_default().push(i);
        }
    }

    fn take(candidates: Option<&Vec<usize>>, used: &mut [bool]) -> Option<usize> {
        let found = candidates?.iter().copied().find(|i| !used[*i])?;
        used[found] = true;
        Some(found)
    }

    let mut used = vec![false; prior.len()];

    let mut pairs = vec![None; entries.len()];
    for (slot, entry) in pairs.iter_mut().zip(entries) {
        *slot = take(by_input.get(entry.line.as_str()), &mut used);
    }
    for (slot, entry) in pairs.iter_mut().zip(entries) {
        if slot.is_none()
            && let Some(url) = entry.explicit_url.as_deref()
        {
            *slot = take(by_link.get(url), &mut used);
        }
    }
    pairs
}

/// Fill a stored row that had no id with a fresh resolution.
///
/// The fresh id, name and classification replace the stored ones; a stored
/// `custom_name` or `source_link` wins over the derived one.
pub fn merge_unresolved(prior: &ResolutionRecord, fresh: ResolutionRecord) -> ResolutionRecord {
    ResolutionRecord {
        custom_name: prior.custom_name.clone().or(fresh.custom_name),
        source_link: prior.source_link.clone().or(fresh.source_link),
        ..fresh
    }
}

/// Resolve every entry and reconcile the results with the stored rows.
///
/// `limit` caps how many entries may be looked up; entries past it keep
/// their stored row (or an unresolved one) and are picked up next run.
pub fn run_resolution(
    entries: &[ListEntry],
    prior: &[ResolutionRecord],
    resolver: &Resolver<'_>,
    limit: Option<usize>,
    progress: &dyn PipelineProgress,
    log: &mut RunLog,
) -> ResolutionPass {
    let mut stats = ResolveStats {
        entries: entries.len(),
        ..Default::default()
    };
    let pairs = pair_entries(entries, prior);
    let mut records = Vec::with_capacity(entries.len() + prior.len());
    let mut budget = limit;

    progress.on_phase(&format!("Resolving {} entries", entries.len()));

    for (i, (entry, paired)) in entries.iter().zip(&pairs).enumerate() {
        let stored = paired.map(|p| &prior[p]);

        if let Some(stored) = stored
            && let Some(catalog_id) = stored.catalog_id
        {
            stats.preserved += 1;
            log.add(RunEntry::Preserved {
                input: stored.input.clone(),
                catalog_id,
            });
            records.push(stored.clone());
        } else if budget == Some(0) {
            stats.deferred += 1;
            records.push(
                stored
                    .cloned()
                    .unwrap_or_else(|| ResolutionRecord::unresolved(entry)),
            );
        } else {
            budget = budget.map(|b| b - 1);
            let outcome = resolver.resolve(entry);
            note_outcome(&outcome, &mut stats, log);
            let record = match stored {
                Some(stored) => merge_unresolved(stored, outcome.record),
                None => outcome.record,
            };
            records.push(record);
        }

        progress.on_item(i + 1, entries.len(), &entry.raw_text);
    }

    for (i, record) in prior.iter().enumerate() {
        if !pairs.contains(&Some(i)) {
            stats.orphaned += 1;
            records.push(record.clone());
        }
    }
    if stats.orphaned > 0 {
        log::info!(
            "{} stored rows have no matching list line; kept at the end",
            stats.orphaned
        );
    }
    if stats.deferred > 0 {
        log::info!("{} entries left for a later run (limit reached)", stats.deferred);
    }

    progress.on_complete(&format!(
        "Resolved {}, kept {}, needs review {}",
        stats.resolved,
        stats.preserved,
        stats.unresolved + stats.not_found
    ));
    ResolutionPass { records, stats }
}

fn note_outcome(outcome: &ResolveOutcome, stats: &mut ResolveStats, log: &mut RunLog) {
    let record = &outcome.record;
    match (record.catalog_id, record.status) {
        (Some(catalog_id), _) => {
            stats.resolved += 1;
            log.add(RunEntry::Resolved {
                input: record.input.clone(),
                catalog_id,
                name: record.matched_name.clone(),
                confidence: record.confidence,
                method: record.match_method,
            });
        }
        (None, ResolutionStatus::NotFound) => {
            stats.not_found += 1;
            log.add(RunEntry::NotFound {
                input: record.input.clone(),
            });
        }
        (None, _) => {
            stats.unresolved += 1;
            log.add(RunEntry::Unresolved {
                input: record.input.clone(),
                alternatives: outcome.alternatives.iter().map(|c| c.to_string()).collect(),
                error: outcome.error.clone(),
            });
        }
    }
}
