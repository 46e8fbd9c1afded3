use std::path::{Path, PathBuf};

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use tabletop_bgg::GameDatabase;
use tabletop_pipeline::{
    EnrichOptions, EnrichStats, Enricher, EnrichmentCache, PipelineProgress, RunLog, load_store,
};
use tabletop_rankings::RankingIndex;

use crate::cli_types::{CacheArgs, EnrichFlags, RankingsArgs, StoreArgs};
use crate::error::CliError;
use crate::progress::BarProgress;
use crate::settings::Settings;

use super::{connect, load_index, pick, write_report};

/// Enrich every resolved id in the store.
pub(crate) fn run_enrich(
    settings: &Settings,
    store: StoreArgs,
    cache: CacheArgs,
    rankings: RankingsArgs,
    flags: EnrichFlags,
    limit: Option<usize>,
    report: Option<PathBuf>,
    quiet: bool,
) -> Result<(), CliError> {
    let store_path = pick(store.store, &settings.paths.store);
    let cache_path = pick(cache.cache, &settings.paths.cache);
    let images_dir = pick(cache.images, &settings.paths.images);
    let index = load_index(rankings.rankings, settings)?;
    let client = connect(settings)?;

    let progress = BarProgress::new(quiet);
    let mut log = RunLog::new();
    let result = enrich_pass(
        &client,
        index.as_ref(),
        &store_path,
        &cache_path,
        &images_dir,
        options(&flags, limit),
        &progress,
        &mut log,
    );
    // The report is worth writing even when a save failed part-way.
    write_report(&log, report.as_deref())?;
    result.map(|_| ())
}

pub(crate) fn options(flags: &EnrichFlags, limit: Option<usize>) -> EnrichOptions {
    EnrichOptions {
        refresh: flags.refresh,
        download_images: !flags.no_images,
        limit,
    }
}

/// One enrichment pass, shared with `build`.
pub(crate) fn enrich_pass(
    remote: &dyn GameDatabase,
    index: Option<&RankingIndex>,
    store_path: &Path,
    cache_path: &Path,
    images_dir: &Path,
    options: EnrichOptions,
    progress: &dyn PipelineProgress,
    log: &mut RunLog,
) -> Result<EnrichStats, CliError> {
    let records = load_store(store_path)?;
    let mut cache = EnrichmentCache::open(cache_path, images_dir)?;
    log::info!(
        "{} cached games in {}",
        cache.len(),
        cache_path.display().if_supports_color(Stdout, |t| t.cyan())
    );

    let enricher = Enricher::new(remote, index, options);
    let stats = enricher.run(&records, &mut cache, progress, log)?;
    print_summary(&stats);
    Ok(stats)
}

fn print_summary(stats: &EnrichStats) {
    log::info!("");
    log::info!(
        "{}",
        "Enrichment complete".if_supports_color(Stdout, |t| t.bold())
    );
    log::info!("  Games:         {:>6}", stats.ids);
    log::info!("  Enriched:      {:>6}", stats.enriched);
    log::info!("  Images only:   {:>6}", stats.image_only);
    log::info!("  Cached:        {:>6}", stats.skipped);
    log::info!("  Images:        {:>6}", stats.images_downloaded);
    if stats.not_found > 0 {
        log::info!("  Not found:     {:>6}", stats.not_found);
    }
    if stats.deferred > 0 {
        log::info!("  Deferred:      {:>6}", stats.deferred);
    }
    let failures = stats.failed + stats.image_failures;
    if failures > 0 {
        log::info!(
            "  {} Errors:      {:>6} (re-run to retry)",
            "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
            failures
        );
    }
}
