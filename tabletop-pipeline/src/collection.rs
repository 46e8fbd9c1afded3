//! Assembly of the final collection and the emitter that writes it out.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tabletop_catalog::{EnrichedGame, ResolutionRecord};

use crate::atomic::write_atomic;
use crate::cache::EnrichmentCache;
use crate::error::PipelineError;

/// One game per record with a cached id, in store order.
///
/// Duplicate records stay duplicates. The record's custom name and link
/// override the cached ones.
pub fn assemble_collection(
    records: &[ResolutionRecord],
    cache: &EnrichmentCache,
) -> Vec<EnrichedGame> {
    let mut games = Vec::new();
    for record in records {
        let Some(catalog_id) = record.catalog_id else {
            continue;
        };
        let Some(cached) = cache.get(catalog_id) else {
            log::debug!("{catalog_id} ({}) is not enriched yet", record.label());
            continue;
        };

        let mut game = cached.clone();
        game.display_name = record
            .custom_name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| cached.name.clone());
        if record.source_link.is_some() {
            game.source_link = record.source_link.clone();
        }
        if !cache.has_image(cached) {
            game.image_path = None;
        }
        games.push(game);
    }
    games
}

/// Consumer of the assembled collection.
pub trait CollectionEmitter {
    fn emit(&self, games: &[EnrichedGame]) -> Result<(), PipelineError>;
}

/// Writes the collection as a pretty JSON array for a static viewer.
pub struct JsonEmitter {
    path: PathBuf,
    /// Prefix joined to each image file name, relative to the output.
    images_prefix: String,
}

impl JsonEmitter {
    pub fn new(path: impl Into<PathBuf>, images_prefix: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            images_prefix: images_prefix.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn to_bytes(&self, games: &[EnrichedGame]) -> Result<Vec<u8>, PipelineError> {
        let items: Vec<CollectionItem<'_>> = games
            .iter()
            .map(|g| CollectionItem::new(g, &self.images_prefix))
            .collect();
        let mut bytes = serde_json::to_vec_pretty(&items)?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}

impl CollectionEmitter for JsonEmitter {
    fn emit(&self, games: &[EnrichedGame]) -> Result<(), PipelineError> {
        let bytes = self.to_bytes(games)?;
        write_atomic(&self.path, &bytes).map_err(|e| PipelineError::persist(&self.path, e))?;
        log::debug!("Wrote {} games to {}", games.len(), self.path.display());
        Ok(())
    }
}

/// JSON shape of one game: list fields are arrays, the image is a path.
#[derive(Serialize)]
struct CollectionItem<'a> {
    catalog_id: u32,
    display_name: &'a str,
    name: &'a str,
    year: Option<i32>,
    rank: Option<u32>,
    rating: Option<f64>,
    geek_rating: Option<f64>,
    users_rated: Option<u32>,
    min_players: Option<u32>,
    max_players: Option<u32>,
    community_best_players: Option<&'a str>,
    community_recommended_players: Option<&'a str>,
    playing_time_minutes: Option<u32>,
    complexity_weight: Option<f64>,
    is_expansion: bool,
    mechanics: Vec<&'a str>,
    categories: Vec<&'a str>,
    image: Option<String>,
    source_link: Option<&'a str>,
}

impl<'a> CollectionItem<'a> {
    fn new(game: &'a EnrichedGame, images_prefix: &str) -> Self {
        let image = game.image_path.as_deref().map(|file| {
            if images_prefix.is_empty() {
                file.to_string()
            } else {
                format!("{}/{file}", images_prefix.trim_end_matches('/'))
            }
        });
        Self {
            catalog_id: game.catalog_id,
            display_name: &game.display_name,
            name: &game.name,
            year: game.year,
            rank: game.rank,
            rating: game.rating,
            geek_rating: game.geek_rating,
            users_rated: game.users_rated,
            min_players: game.min_players,
            max_players: game.max_players,
            community_best_players: game.community_best_players.as_deref(),
            community_recommended_players: game.community_recommended_players.as_deref(),
            playing_time_minutes: game.playing_time_minutes,
            complexity_weight: game.complexity_weight,
            is_expansion: game.is_expansion,
            mechanics: game.mechanics.iter().map(String::as_str).collect(),
            categories: game.categories.iter().map(String::as_str).collect(),
            image,
            source_link: game.source_link.as_deref(),
        }
    }
}

/// Rating distribution buckets, highest first.
pub const RATING_BUCKETS: [(&str, f64); 5] = [
    ("8.0+", 8.0),
    ("7.5-7.9", 7.5),
    ("7.0-7.4", 7.0),
    ("6.5-6.9", 6.5),
    ("<6.5", f64::NEG_INFINITY),
];

/// Summary figures for an assembled collection.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CollectionStats {
    pub total: usize,
    pub base_games: usize,
    pub expansions: usize,
    pub ranked: usize,
    pub unranked: usize,
    pub best_rank: Option<u32>,
    pub worst_rank: Option<u32>,
    pub mean_rank: Option<f64>,
    pub median_rank: Option<f64>,
    pub mean_rating: Option<f64>,
    /// Counts per [`RATING_BUCKETS`] entry, same order.
    pub rating_buckets: [usize; 5],
    /// `(rank, display name)` of the best-ranked games.
    pub top_ranked: Vec<(u32, String)>,
}

impl CollectionStats {
    pub fn compute(games: &[EnrichedGame], top: usize) -> Self {
        let mut stats = Self {
            total: games.len(),
            ..Default::default()
        };

        let mut ranked: Vec<(u32, &str)> = Vec::new();
        let mut rating_sum = 0.0;
        let mut rated = 0usize;

        for game in games {
            if game.is_expansion {
                stats.expansions += 1;
            } else {
                stats.base_games += 1;
            }
            match game.rank {
                Some(rank) => ranked.push((rank, &game.display_name)),
                None => stats.unranked += 1,
            }
            if let Some(rating) = game.rating {
                rating_sum += rating;
                rated += 1;
                let bucket = RATING_BUCKETS
                    .iter()
                    .position(|(_, floor)| rating >= *floor)
                    .unwrap_or(RATING_BUCKETS.len() - 1);
                stats.rating_buckets[bucket] += 1;
            }
        }

        ranked.sort();
        stats.ranked = ranked.len();
        stats.best_rank = ranked.first().map(|(r, _)| *r);
        stats.worst_rank = ranked.last().map(|(r, _)| *r);
        if !ranked.is_empty() {
            let sum: f64 = ranked.iter().map(|(r, _)| f64::from(*r)).sum();
            stats.mean_rank = Some(sum / ranked.len() as f64);
            let mid = ranked.len() / 2;
            stats.median_rank = Some(if ranked.len() % 2 == 0 {
                (f64::from(ranked[mid - 1].0) + f64::from(ranked[mid].0)) / 2.0
            } else {
                f64::from(ranked[mid].0)
            });
        }
        if rated > 0 {
            stats.mean_rating = Some(rating_sum / rated as f64);
        }
        stats.top_ranked = ranked
            .iter()
            .take(top)
            .map(|(rank, name)| (*rank, name.to_string()))
            .collect();
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(id: u32, rank: Option<u32>, rating: Option<f64>, expansion: bool) -> EnrichedGame {
        EnrichedGame {
            catalog_id: id,
            display_name: format!("Game {id}"),
            name: format!("Game {id}"),
            rank,
            rating,
            is_expansion: expansion,
            ..Default::default()
        }
    }

    #[test]
    fn stats_over_mixed_collection() {
        let games = vec![
            game(1, Some(10), Some(8.2), false),
            game(2, Some(40), Some(7.6), false),
            game(3, None, Some(6.1), true),
            game(4, Some(5), None, false),
        ];
        let stats = CollectionStats::compute(&games, 2);

        assert_eq!(stats.total, 4);
        assert_eq!(stats.base_games, 3);
        assert_eq!(stats.expansions, 1);
        assert_eq!(stats.ranked, 3);
        assert_eq!(stats.unranked, 1);
        assert_eq!(stats.best_rank, Some(5));
        assert_eq!(stats.worst_rank, Some(40));
        assert_eq!(stats.median_rank, Some(10.0));
        assert_eq!(stats.rating_buckets, [1, 1, 0, 0, 1]);
        assert_eq!(
            stats.top_ranked,
            vec![(5, "Game 4".to_string()), (10, "Game 1".to_string())]
        );
        let mean = stats.mean_rating.unwrap();
        assert!((mean - (8.2 + 7.6 + 6.1) / 3.0).abs() < 1e-9);
    }

    #[test]
    fn stats_of_empty_collection() {
        let stats = CollectionStats::compute(&[], 5);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.mean_rank, None);
        assert_eq!(stats.median_rank, None);
        assert!(stats.top_ranked.is_empty());
    }

    #[test]
    fn even_count_median_is_midpoint() {
        let games = vec![game(1, Some(2), None, false), game(2, Some(8), None, false)];
        assert_eq!(CollectionStats::compute(&games, 0).median_rank, Some(5.0));
    }

    #[test]
    fn json_uses_arrays_and_image_prefix() {
        let mut g = game(13, Some(5), Some(7.1), false);
        g.mechanics = ["Trading".to_string(), "Dice Rolling".to_string()].into();
        g.image_path = Some("13.jpg".into());

        let emitter = JsonEmitter::new("collection.json", "images/");
        let text = String::from_utf8(emitter.to_bytes(&[g]).unwrap()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value[0]["mechanics"][0], "Dice Rolling");
        assert_eq!(value[0]["image"], "images/13.jpg");
        assert!(value[0]["categories"].as_array().unwrap().is_empty());
    }
}
