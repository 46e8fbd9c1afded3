//! Resolution of list entries to catalog ids.
//!
//! Strategies are tried in a fixed order and the first success wins:
//!
//! 1. **Direct URL** -- the entry links a catalog page; its id is taken as is
//! 2. **Local index** -- fuzzy match against the offline ranking dataset
//! 3. **Remote search** -- fuzzy match against the remote search results
//!
//! Anything left over is unresolved and goes to manual review.

use std::cmp::Ordering;
use std::fmt;

use tabletop_bgg::GameDatabase;
use tabletop_catalog::{
    Confidence, ListEntry, MatchMethod, ResolutionRecord, ResolutionStatus, normalize_name,
    similarity,
};
use tabletop_rankings::RankingIndex;

/// Strategy order. Each variant has one resolving function.
const STRATEGIES: [MatchMethod; 3] = [
    MatchMethod::DirectUrl,
    MatchMethod::LocalIndexMatch,
    MatchMethod::RemoteSearchMatch,
];

/// Similarity cut-points separating High, Medium and Low confidence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchThresholds {
    pub high: f64,
    pub medium: f64,
    pub low: f64,
}

impl Default for MatchThresholds {
    fn default() -> Self {
        Self {
            high: 0.95,
            medium: 0.80,
            low: 0.55,
        }
    }
}

impl MatchThresholds {
    /// `0 <= low <= medium <= high <= 1`.
    pub fn is_valid(&self) -> bool {
        (0.0..=1.0).contains(&self.low)
            && (0.0..=1.0).contains(&self.high)
            && self.low <= self.medium
            && self.medium <= self.high
    }
}

/// Options for a [`Resolver`].
#[derive(Debug, Clone)]
pub struct ResolverOptions {
    pub thresholds: MatchThresholds,
    /// Runner-up candidates kept for review.
    pub max_alternatives: usize,
    /// Whether the remote search strategy may run.
    pub remote_search: bool,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            thresholds: MatchThresholds::default(),
            max_alternatives: 3,
            remote_search: true,
        }
    }
}

/// A scored catalog game considered for an entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub id: u32,
    pub name: String,
    pub year: Option<i32>,
    pub score: f64,
    pub source: MatchMethod,
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.id, self.name)?;
        if let Some(year) = self.year {
            write!(f, " [{year}]")?;
        }
        write!(f, " ({:.2})", self.score)
    }
}

/// Result of resolving one entry.
#[derive(Debug, Clone)]
pub struct ResolveOutcome {
    pub record: ResolutionRecord,
    /// Runner-up candidates, best first.
    pub alternatives: Vec<Candidate>,
    /// Why a strategy failed, when one did (e.g. a remote timeout).
    pub error: Option<String>,
}

/// What one strategy produced.
enum Attempt {
    Matched {
        best: Candidate,
        confidence: Confidence,
        alternatives: Vec<Candidate>,
    },
    Missed(Vec<Candidate>),
    Failed(String),
    Skipped,
}

/// Turns list entries into resolution records.
pub struct Resolver<'a> {
    index: Option<&'a RankingIndex>,
    remote: Option<&'a dyn GameDatabase>,
    options: ResolverOptions,
}

impl<'a> Resolver<'a> {
    pub fn new(
        index: Option<&'a RankingIndex>,
        remote: Option<&'a dyn GameDatabase>,
        options: ResolverOptions,
    ) -> Self {
        Self {
            index,
            remote,
            options,
        }
    }

    /// Resolve one entry. Always yields exactly one record; failures of
    /// individual strategies degrade the outcome instead of erroring.
    pub fn resolve(&self, entry: &ListEntry) -> ResolveOutcome {
        let mut outcome = ResolveOutcome {
            record: ResolutionRecord::unresolved(entry),
            alternatives: Vec::new(),
            error: None,
        };

        if entry.explicit_id.is_none() && normalize_name(&entry.raw_text).is_empty() {
            log::warn!("Nothing to match in line '{}'", entry.line);
            outcome.record.status = ResolutionStatus::NotFound;
            return outcome;
        }

        let mut missed: Vec<Candidate> = Vec::new();

        for method in STRATEGIES {
            let attempt = match method {
                MatchMethod::DirectUrl => self.direct_url(entry),
                MatchMethod::LocalIndexMatch => self.local_index(entry),
                MatchMethod::RemoteSearchMatch => self.remote_search(entry),
                MatchMethod::Unresolved => Attempt::Skipped,
            };

            match attempt {
                Attempt::Matched {
                    best,
                    confidence,
                    alternatives,
                } => {
                    log::debug!(
                        "'{}' -> {} \"{}\" ({confidence}, {method}, score {:.3})",
                        entry.raw_text,
                        best.id,
                        best.name,
                        best.score
                    );
                    let name = (!best.name.is_empty()).then_some(best.name);
                    outcome.record.resolve(best.id, name, confidence, method);
                    outcome.alternatives = alternatives;
                    return outcome;
                }
                Attempt::Missed(candidates) => missed.extend(candidates),
                Attempt::Failed(message) => {
                    log::warn!("{method} failed for '{}': {message}", entry.raw_text);
                    outcome.error = Some(message);
                }
                Attempt::Skipped => {}
            }
        }

        log::debug!("'{}' unresolved", entry.raw_text);
        missed.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        dedup_by_id(&mut missed);
        missed.truncate(self.options.max_alternatives);
        outcome.alternatives = missed;
        outcome
    }

    fn direct_url(&self, entry: &ListEntry) -> Attempt {
        let Some(id) = entry.explicit_id else {
            return Attempt::Skipped;
        };

        let (name, year) = match self.index.and_then(|index| index.get(id)) {
            Some(game) => (game.name.clone(), game.year),
            None => (entry.raw_text.clone(), None),
        };

        Attempt::Matched {
            best: Candidate {
                id,
                name,
                year,
                score: 1.0,
                source: MatchMethod::DirectUrl,
            },
            confidence: Confidence::High,
            alternatives: Vec::new(),
        }
    }

    fn local_index(&self, entry: &ListEntry) -> Attempt {
        let Some(index) = self.index else {
            return Attempt::Skipped;
        };

        let limit = self.options.max_alternatives + 1;
        let mut candidates: Vec<Candidate> = index
            .best_matches(&entry.raw_text, entry.year_hint, limit)
            .into_iter()
            .map(|m| Candidate {
                id: m.game.id,
                name: m.game.name.clone(),
                year: m.game.year,
                score: m.score,
                source: MatchMethod::LocalIndexMatch,
            })
            .collect();

        let thresholds = &self.options.thresholds;
        let confidence = match candidates.first() {
            Some(best) if best.score >= thresholds.high => Confidence::High,
            Some(best) if best.score >= thresholds.medium => Confidence::Medium,
            _ => return Attempt::Missed(candidates),
        };

        let best = candidates.remove(0);
        Attempt::Matched {
            best,
            confidence,
            alternatives: candidates,
        }
    }

    fn remote_search(&self, entry: &ListEntry) -> Attempt {
        let Some(remote) = self.remote.filter(|_| self.options.remote_search) else {
            return Attempt::Skipped;
        };

        let query = normalize_name(&entry.raw_text);
        let results = match remote.search(&query) {
            Ok(results) => results,
            Err(e) => return Attempt::Failed(e.to_string()),
        };

        let year_agrees = |c: &Candidate| entry.year_hint.is_some() && c.year == entry.year_hint;
        let mut candidates: Vec<Candidate> = results
            .into_iter()
            .map(|r| Candidate {
                score: similarity(&query, &normalize_name(&r.name)),
                id: r.id,
                name: r.name,
                year: r.year,
                source: MatchMethod::RemoteSearchMatch,
            })
            .filter(|c| c.score > 0.0)
            .collect();
        // Stable: equal scores keep the service's order unless a year hint agrees.
        candidates.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| year_agrees(b).cmp(&year_agrees(a)))
        });
        dedup_by_id(&mut candidates);
        candidates.truncate(self.options.max_alternatives + 1);

        let thresholds = &self.options.thresholds;
        // Remote matches are capped at Medium.
        let confidence = match candidates.first() {
            Some(best) if best.score >= thresholds.medium => Confidence::Medium,
            Some(best) if best.score >= thresholds.low => Confidence::Low,
            _ => return Attempt::Missed(candidates),
        };

        let best = candidates.remove(0);
        Attempt::Matched {
            best,
            confidence,
            alternatives: candidates,
        }
    }
}

/// Keep the first (best) candidate per id.
fn dedup_by_id(candidates: &mut Vec<Candidate>) {
    let mut seen = std::collections::HashSet::new();
    candidates.retain(|c| seen.insert(c.id));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_thresholds_are_ordered() {
        assert!(MatchThresholds::default().is_valid());
        let bad = MatchThresholds {
            high: 0.7,
            medium: 0.8,
            low: 0.5,
        };
        assert!(!bad.is_valid());
    }

    #[test]
    fn candidate_display() {
        let c = Candidate {
            id: 13,
            name: "CATAN".into(),
            year: Some(1995),
            score: 0.9123,
            source: MatchMethod::LocalIndexMatch,
        };
        assert_eq!(c.to_string(), "13 CATAN [1995] (0.91)");
    }
}
