//! Ranking index for fast offline name lookups.
//!
//! Builds an in-memory index from parsed ranking rows, keyed by id, by exact
//! normalized name, and by name token. The token index shortlists candidates
//! so fuzzy scoring doesn't have to visit every game in the dataset.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use tabletop_catalog::{normalize_name, similarity};

use crate::error::RankingsError;
use crate::ranks::{RankedGame, parse_ranks_file};

/// Words too common to shortlist candidates by.
const STOP_WORDS: &[&str] = &["the", "of", "and", "a", "an"];

/// A scored candidate from [`RankingIndex::best_matches`].
#[derive(Debug, Clone, Copy)]
pub struct IndexMatch<'a> {
    pub game: &'a RankedGame,
    pub score: f64,
}

/// An index of ranked games for id and fuzzy name lookups.
pub struct RankingIndex {
    games: Vec<RankedGame>,
    normalized: Vec<String>,
    by_id: HashMap<u32, usize>,
    by_name: HashMap<String, Vec<usize>>,
    by_token: HashMap<String, Vec<usize>>,
}

impl RankingIndex {
    /// Build an index from a list of ranked games.
    ///
    /// Duplicate ids keep the first entry.
    pub fn from_games(games: Vec<RankedGame>) -> Self {
        let mut normalized = Vec::with_capacity(games.len());
        let mut by_id = HashMap::with_capacity(games.len());
        let mut by_name: HashMap<String, Vec<usize>> = HashMap::with_capacity(games.len());
        let mut by_token: HashMap<String, Vec<usize>> = HashMap::new();

        for (i, game) in games.iter().enumerate() {
            by_id.entry(game.id).or_insert(i);

            let norm = normalize_name(&game.name);
            for token in index_tokens(&norm) {
                by_token.entry(token.to_string()).or_default().push(i);
            }
            if !norm.is_empty() {
                by_name.entry(norm.clone()).or_default().push(i);
            }
            normalized.push(norm);
        }

        Self {
            games,
            normalized,
            by_id,
            by_name,
            by_token,
        }
    }

    /// Parse a ranking CSV file and index it.
    pub fn load(path: &Path) -> Result<Self, RankingsError> {
        let games = parse_ranks_file(path)?;
        let index = Self::from_games(games);
        log::debug!(
            "Indexed {} ranked games ({} distinct names) from {}",
            index.len(),
            index.name_count(),
            path.display()
        );
        Ok(index)
    }

    /// Look up a game by id.
    pub fn get(&self, id: u32) -> Option<&RankedGame> {
        self.by_id.get(&id).map(|&i| &self.games[i])
    }

    /// The best-scoring games for `query`, at most `limit` of them.
    ///
    /// Sorted by score (highest first), then rank (ranked before unranked,
    /// lower rank first), then agreement with `year_hint`, then id.
    pub fn best_matches(
        &self,
        query: &str,
        year_hint: Option<i32>,
        limit: usize,
    ) -> Vec<IndexMatch<'_>> {
        let query = normalize_name(query);
        if query.is_empty() || limit == 0 {
            return Vec::new();
        }

        let mut matches: Vec<IndexMatch<'_>> = self
            .shortlist(&query)
            .into_iter()
            .map(|i| IndexMatch {
                game: &self.games[i],
                score: similarity(&query, &self.normalized[i]),
            })
            .filter(|m| m.score > 0.0)
            .collect();

        matches.sort_by(|a, b| compare_matches(a, b, year_hint));
        matches.truncate(limit);
        matches
    }

    /// Candidate positions sharing a token with the query. Falls back to
    /// every game when nothing shares a token, so misspelled names still
    /// get scored.
    fn shortlist(&self, query: &str) -> BTreeSet<usize> {
        let mut candidates: BTreeSet<usize> = BTreeSet::new();
        if let Some(ids) = self.by_name.get(query) {
            candidates.extend(ids);
        }

        let mut tokens = index_tokens(query).peekable();
        if tokens.peek().is_none() {
            // All stop words ("The Game"), so index on every token.
            for token in query.split(' ') {
                if let Some(ids) = self.by_token.get(token) {
                    candidates.extend(ids);
                }
            }
        }
        for token in tokens {
            if let Some(ids) = self.by_token.get(token) {
                candidates.extend(ids);
            }
        }

        if candidates.is_empty() {
            candidates.extend(0..self.games.len());
        }
        candidates
    }

    /// Returns the total number of indexed games.
    pub fn len(&self) -> usize {
        self.games.len()
    }

    /// Returns true if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// Returns the number of distinct normalized names.
    pub fn name_count(&self) -> usize {
        self.by_name.len()
    }
}

fn index_tokens(normalized: &str) -> impl Iterator<Item = &str> {
    normalized
        .split(' ')
        .filter(|t| !t.is_empty() && !STOP_WORDS.contains(t))
}

fn compare_matches(a: &IndexMatch<'_>, b: &IndexMatch<'_>, year_hint: Option<i32>) -> Ordering {
    let year_agrees = |m: &IndexMatch<'_>| year_hint.is_some() && m.game.year == year_hint;

    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| compare_rank(a.game.rank, b.game.rank))
        .then_with(|| year_agrees(b).cmp(&year_agrees(a)))
        .then_with(|| a.game.id.cmp(&b.game.id))
}

/// Ranked before unranked, lower rank number first.
fn compare_rank(a: Option<u32>, b: Option<u32>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
#[path = "tests/index_tests.rs"]
mod tests;
