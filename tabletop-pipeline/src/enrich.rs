//! Enrichment of resolved records with remote detail data and images.
//!
//! Ids are processed one at a time in first-appearance order. For each id
//! the engine decides between skipping (already cached), fetching only the
//! missing image, or a full detail fetch. The cache is saved after every id
//! that changed it.

use std::collections::HashSet;

use tabletop_bgg::{GameDatabase, GameDetails};
use tabletop_catalog::{EnrichedGame, ResolutionRecord};
use tabletop_rankings::RankingIndex;

use crate::cache::EnrichmentCache;
use crate::error::PipelineError;
use crate::progress::PipelineProgress;
use crate::report::{RunEntry, RunLog};

/// Catalog page for an id, used when a record has no link of its own.
pub const CATALOG_GAME_URL: &str = "https://boardgamegeek.com/boardgame";

/// Options for an enrichment run.
#[derive(Debug, Clone)]
pub struct EnrichOptions {
    /// Fetch details again even for cached ids.
    pub refresh: bool,
    /// Whether to download images.
    pub download_images: bool,
    /// Maximum ids needing remote work to process this run.
    pub limit: Option<usize>,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self {
            refresh: false,
            download_images: true,
            limit: None,
        }
    }
}

/// Statistics from an enrichment run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EnrichStats {
    pub ids: usize,
    pub enriched: usize,
    pub image_only: usize,
    pub skipped: usize,
    pub images_downloaded: usize,
    pub image_failures: usize,
    pub not_found: usize,
    pub failed: usize,
    /// Ids left for a later run because of the limit.
    pub deferred: usize,
}

/// What to do for one id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichAction {
    /// Cached and complete.
    Skip,
    /// Cached, but the image is missing.
    ImageOnly,
    /// Fetch details (and the image if needed).
    Full,
}

/// Decide what an id needs given the cache state.
pub fn plan_action(
    cache: &EnrichmentCache,
    catalog_id: u32,
    options: &EnrichOptions,
) -> EnrichAction {
    if options.refresh {
        return EnrichAction::Full;
    }
    match cache.get(catalog_id) {
        None => EnrichAction::Full,
        Some(game) => {
            let wants_image = options.download_images && game.image_url.is_some();
            if wants_image && !cache.has_image(game) {
                EnrichAction::ImageOnly
            } else {
                EnrichAction::Skip
            }
        }
    }
}

/// Build the cached record for `record` from a detail fetch, filling gaps
/// from the ranking index.
pub fn build_game(
    record: &ResolutionRecord,
    catalog_id: u32,
    details: GameDetails,
    index: Option<&RankingIndex>,
) -> EnrichedGame {
    let ranked = index.and_then(|i| i.get(catalog_id));

    let name = if details.name.trim().is_empty() {
        ranked
            .map(|r| r.name.clone())
            .or_else(|| record.matched_name.clone())
            .unwrap_or_else(|| record.input.clone())
    } else {
        details.name.clone()
    };
    let display_name = record
        .custom_name
        .clone()
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| name.clone());

    EnrichedGame {
        catalog_id,
        display_name,
        year: details.year.or(ranked.and_then(|r| r.year)),
        rank: details.rank.or(ranked.and_then(|r| r.rank)),
        rating: details.rating,
        geek_rating: details.geek_rating.or(ranked.and_then(|r| r.bayes_average)),
        users_rated: details.users_rated,
        min_players: details.min_players,
        max_players: details.max_players,
        community_best_players: details.best_players(),
        community_recommended_players: details.recommended_players(),
        playing_time_minutes: details.playing_time_minutes,
        complexity_weight: details.complexity_weight,
        is_expansion: details.is_expansion,
        image_url: details.image_url,
        image_path: None,
        source_link: record
            .source_link
            .clone()
            .or_else(|| Some(format!("{CATALOG_GAME_URL}/{catalog_id}"))),
        fetched_at: Some(chrono::Local::now().to_rfc3339()),
        mechanics: details.mechanics,
        categories: details.categories,
        name,
    }
}

/// Runs enrichment against a remote database.
pub struct Enricher<'a> {
    remote: &'a dyn GameDatabase,
    index: Option<&'a RankingIndex>,
    options: EnrichOptions,
}

impl<'a> Enricher<'a> {
    pub fn new(
        remote: &'a dyn GameDatabase,
        index: Option<&'a RankingIndex>,
        options: EnrichOptions,
    ) -> Self {
        Self {
            remote,
            index,
            options,
        }
    }

    /// Enrich every record carrying a catalog id.
    ///
    /// Per-id failures are logged and counted. Only a failed cache or image
    /// write returns `Err`; everything saved before it stays saved.
    pub fn run(
        &self,
        records: &[ResolutionRecord],
        cache: &mut EnrichmentCache,
        progress: &dyn PipelineProgress,
        log: &mut RunLog,
    ) -> Result<EnrichStats, PipelineError> {
        let mut stats = EnrichStats::default();

        let mut seen = HashSet::new();
        let targets: Vec<(u32, &ResolutionRecord)> = records
            .iter()
            .filter_map(|r| r.catalog_id.map(|id| (id, r)))
            .filter(|(id, _)| seen.insert(*id))
            .collect();
        stats.ids = targets.len();

        progress.on_phase(&format!("Enriching {} games", targets.len()));

        let mut budget = self.options.limit;
        for (i, (catalog_id, record)) in targets.iter().enumerate() {
            let catalog_id = *catalog_id;
            let action = plan_action(cache, catalog_id, &self.options);

            if action != EnrichAction::Skip {
                if budget == Some(0) {
                    stats.deferred += 1;
                    continue;
                }
                budget = budget.map(|b| b - 1);
            }

            match action {
                EnrichAction::Skip => {
                    stats.skipped += 1;
                    log.add(RunEntry::Skipped {
                        catalog_id,
                        name: record.label().to_string(),
                    });
                }
                EnrichAction::ImageOnly => {
                    self.image_only(catalog_id, record, cache, &mut stats, log)?
                }
                EnrichAction::Full => self.full(catalog_id, record, cache, &mut stats, log)?,
            }

            progress.on_item(i + 1, targets.len(), record.label());
        }

        if stats.deferred > 0 {
            log::info!("{} games left for a later run (limit reached)", stats.deferred);
        }
        progress.on_complete(&format!(
            "Enriched {}, images only {}, cached {}, failed {}",
            stats.enriched,
            stats.image_only,
            stats.skipped,
            stats.failed + stats.not_found
        ));
        Ok(stats)
    }

    fn image_only(
        &self,
        catalog_id: u32,
        record: &ResolutionRecord,
        cache: &mut EnrichmentCache,
        stats: &mut EnrichStats,
        log: &mut RunLog,
    ) -> Result<(), PipelineError> {
        let Some(mut game) = cache.get(catalog_id).cloned() else {
            return Ok(());
        };

        match self.obtain_image(catalog_id, &game, cache)? {
            Ok(file) => {
                game.image_path = Some(file);
                let name = game.name.clone();
                cache.insert(game);
                cache.save()?;
                stats.image_only += 1;
                stats.images_downloaded += 1;
                log.add(RunEntry::ImageOnly { catalog_id, name });
            }
            Err(message) => {
                stats.image_failures += 1;
                log::warn!("Image for {catalog_id} ({}) failed: {message}", record.label());
                log.add(RunEntry::Failed {
                    catalog_id,
                    name: game.name,
                    message,
                });
            }
        }
        Ok(())
    }

    fn full(
        &self,
        catalog_id: u32,
        record: &ResolutionRecord,
        cache: &mut EnrichmentCache,
        stats: &mut EnrichStats,
        log: &mut RunLog,
    ) -> Result<(), PipelineError> {
        let details = match self.remote.game_details(catalog_id) {
            Ok(details) => details,
            Err(e) => {
                if e.is_not_found() {
                    stats.not_found += 1;
                } else {
                    stats.failed += 1;
                }
                log::warn!("Details for {catalog_id} ({}) failed: {e}", record.label());
                log.add(RunEntry::Failed {
                    catalog_id,
                    name: record.label().to_string(),
                    message: e.to_string(),
                });
                return Ok(());
            }
        };

        let mut game = build_game(record, catalog_id, details, self.index);

        let mut got_image = false;
        if self.options.download_images && game.image_url.is_some() {
            match self.obtain_image(catalog_id, &game, cache)? {
                Ok(file) => {
                    game.image_path = Some(file);
                    got_image = true;
                }
                Err(message) => {
                    stats.image_failures += 1;
                    log::warn!("Image for {catalog_id} ({}) failed: {message}", game.name);
                }
            }
        } else if let Some(previous) = cache.get(catalog_id).filter(|g| cache.has_image(g)) {
            game.image_path = previous.image_path.clone();
        }

        let name = game.name.clone();
        cache.insert(game);
        cache.save()?;

        stats.enriched += 1;
        if got_image {
            stats.images_downloaded += 1;
        }
        log.add(RunEntry::Enriched {
            catalog_id,
            name,
            image: got_image,
        });
        Ok(())
    }

    /// Reuse an `<id>.<ext>` file already on disk, else download the image.
    ///
    /// The outer `Result` is a failed local write; the inner one is a
    /// per-id download failure.
    fn obtain_image(
        &self,
        catalog_id: u32,
        game: &EnrichedGame,
        cache: &EnrichmentCache,
    ) -> Result<Result<String, String>, PipelineError> {
        if let Some(existing) = cache.find_image(catalog_id) {
            log::debug!("Reusing image {existing} for {catalog_id}");
            return Ok(Ok(existing));
        }
        let Some(url) = game.image_url.as_deref() else {
            return Ok(Err("no image URL".to_string()));
        };

        match self.remote.fetch_image(url) {
            Ok(image) => Ok(Ok(cache.store_image(catalog_id, &image)?)),
            Err(e) => Ok(Err(e.to_string())),
        }
    }
}
