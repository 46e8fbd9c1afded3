use std::path::PathBuf;

use tabletop_bgg::GameDatabase;
use tabletop_pipeline::RunLog;

use crate::cli_types::{
    CacheArgs, EnrichFlags, ListArgs, OutputArgs, RankingsArgs, ResolveFlags, StoreArgs,
};
use crate::error::CliError;
use crate::progress::BarProgress;
use crate::settings::Settings;

use super::emit::emit_collection;
use super::enrich::{enrich_pass, options};
use super::resolve::resolve_pass;
use super::{connect, load_index, pick, write_report};

/// `resolve`, then `enrich`, then `emit`, sharing one index and client.
pub(crate) fn run_build(
    settings: &Settings,
    list: ListArgs,
    store: StoreArgs,
    cache: CacheArgs,
    rankings: RankingsArgs,
    output: OutputArgs,
    resolve: ResolveFlags,
    enrich: EnrichFlags,
    limit: Option<usize>,
    report: Option<PathBuf>,
    quiet: bool,
) -> Result<(), CliError> {
    let list_path = pick(list.list, &settings.paths.list);
    let store_path = pick(store.store, &settings.paths.store);
    let cache_path = pick(cache.cache, &settings.paths.cache);
    let images_dir = pick(cache.images, &settings.paths.images);
    let output_path = pick(output.output, &settings.paths.collection);

    let index = load_index(rankings.rankings, settings)?;
    let client = connect(settings)?;
    let search: Option<&dyn GameDatabase> = if resolve.offline {
        None
    } else {
        Some(&client)
    };

    let progress = BarProgress::new(quiet);
    let mut log = RunLog::new();

    resolve_pass(
        settings,
        index.as_ref(),
        search,
        resolve.offline,
        &list_path,
        &store_path,
        limit,
        &progress,
        &mut log,
    )?;

    let enriched = enrich_pass(
        &client,
        index.as_ref(),
        &store_path,
        &cache_path,
        &images_dir,
        options(&enrich, limit),
        &progress,
        &mut log,
    );
    write_report(&log, report.as_deref())?;
    enriched?;

    emit_collection(&store_path, &cache_path, &images_dir, &output_path)
}
