use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use tabletop_pipeline::{
    CollectionStats, EnrichmentCache, RATING_BUCKETS, assemble_collection, load_store,
};

use crate::cli_types::{CacheArgs, StoreArgs};
use crate::error::CliError;
use crate::settings::Settings;

use super::{pick, truncate_str};

/// Print statistics for the assembled collection.
pub(crate) fn run_stats(
    settings: &Settings,
    store: StoreArgs,
    cache: CacheArgs,
    top: usize,
) -> Result<(), CliError> {
    let store_path = pick(store.store, &settings.paths.store);
    let cache_path = pick(cache.cache, &settings.paths.cache);
    let images_dir = pick(cache.images, &settings.paths.images);

    let records = load_store(&store_path)?;
    let cache = EnrichmentCache::open(&cache_path, &images_dir)?;
    let games = assemble_collection(&records, &cache);
    let stats = CollectionStats::compute(&games, top);

    log::info!(
        "{}",
        "Collection Statistics".if_supports_color(Stdout, |t| t.bold())
    );
    log::info!("");
    log::info!("  Store rows:    {:>8}", records.len());
    log::info!("  Games:         {:>8}", stats.total);
    log::info!("  Base games:    {:>8}", stats.base_games);
    log::info!("  Expansions:    {:>8}", stats.expansions);
    log::info!("  Ranked:        {:>8}", stats.ranked);
    log::info!("  Unranked:      {:>8}", stats.unranked);

    if let (Some(best), Some(worst)) = (stats.best_rank, stats.worst_rank) {
        log::info!("");
        log::info!("  Best rank:     {:>8}", best);
        log::info!("  Worst rank:    {:>8}", worst);
        if let Some(mean) = stats.mean_rank {
            log::info!("  Mean rank:     {:>8.1}", mean);
        }
        if let Some(median) = stats.median_rank {
            log::info!("  Median rank:   {:>8.1}", median);
        }
    }

    if let Some(mean) = stats.mean_rating {
        log::info!("");
        log::info!("  Mean rating:   {:>8.2}", mean);
        for ((label, _), count) in RATING_BUCKETS.iter().zip(stats.rating_buckets) {
            log::info!("    {:<8} {:>6}", label, count);
        }
    }

    if !stats.top_ranked.is_empty() {
        log::info!("");
        log::info!("{}", "  Top ranked".if_supports_color(Stdout, |t| t.bold()));
        for (rank, name) in &stats.top_ranked {
            log::info!(
                "    {:>6}  {}",
                format!("#{rank}").if_supports_color(Stdout, |t| t.cyan()),
                truncate_str(name, 60)
            );
        }
    }
    Ok(())
}
