use std::path::{Path, PathBuf};

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use tabletop_bgg::GameDatabase;
use tabletop_catalog::Confidence;
use tabletop_pipeline::{
    PipelineProgress, ResolutionPass, Resolver, RunLog, load_store, read_list, run_resolution,
    write_store,
};
use tabletop_rankings::RankingIndex;

use crate::cli_types::{ListArgs, RankingsArgs, ResolveFlags, StoreArgs};
use crate::error::CliError;
use crate::progress::BarProgress;
use crate::settings::Settings;

use super::{connect, load_index, pick, write_report};

/// Parse the list, resolve, reconcile with the store, and write it.
pub(crate) fn run_resolve(
    settings: &Settings,
    list: ListArgs,
    store: StoreArgs,
    rankings: RankingsArgs,
    flags: ResolveFlags,
    limit: Option<usize>,
    report: Option<PathBuf>,
    quiet: bool,
) -> Result<(), CliError> {
    let list_path = pick(list.list, &settings.paths.list);
    let store_path = pick(store.store, &settings.paths.store);
    let index = load_index(rankings.rankings, settings)?;
    let client = if settings.resolver_options(flags.offline).remote_search {
        Some(connect(settings)?)
    } else {
        None
    };

    let progress = BarProgress::new(quiet);
    let mut log = RunLog::new();
    resolve_pass(
        settings,
        index.as_ref(),
        client.as_ref().map(|c| c as &dyn GameDatabase),
        flags.offline,
        &list_path,
        &store_path,
        limit,
        &progress,
        &mut log,
    )?;
    write_report(&log, report.as_deref())
}

/// One resolution pass, shared with `build`.
pub(crate) fn resolve_pass(
    settings: &Settings,
    index: Option<&RankingIndex>,
    remote: Option<&dyn GameDatabase>,
    offline: bool,
    list_path: &Path,
    store_path: &Path,
    limit: Option<usize>,
    progress: &dyn PipelineProgress,
    log: &mut RunLog,
) -> Result<ResolutionPass, CliError> {
    let entries = read_list(list_path)?;
    let prior = load_store(store_path)?;
    log::info!(
        "{} entries in {}, {} rows in {}",
        entries.len(),
        list_path.display().if_supports_color(Stdout, |t| t.cyan()),
        prior.len(),
        store_path.display().if_supports_color(Stdout, |t| t.cyan()),
    );

    let resolver = Resolver::new(index, remote, settings.resolver_options(offline));
    let pass = run_resolution(&entries, &prior, &resolver, limit, progress, log);
    write_store(store_path, &pass.records)?;

    print_summary(&pass, store_path);
    Ok(pass)
}

fn print_summary(pass: &ResolutionPass, store_path: &Path) {
    let count = |c: Confidence| {
        pass.records
            .iter()
            .filter(|r| r.is_resolved() && r.confidence == c)
            .count()
    };
    let review = pass.records.iter().filter(|r| r.needs_review()).count();

    log::info!("");
    log::info!(
        "{}",
        "Resolution complete".if_supports_color(Stdout, |t| t.bold())
    );
    log::info!("  Entries:       {:>6}", pass.stats.entries);
    log::info!("  Resolved:      {:>6}", pass.stats.resolved);
    log::info!("  Kept:          {:>6}", pass.stats.preserved);
    log::info!(
        "  High/Med/Low:  {:>6} / {} / {}",
        count(Confidence::High),
        count(Confidence::Medium),
        count(Confidence::Low)
    );
    if pass.stats.orphaned > 0 {
        log::info!("  Not in list:   {:>6}", pass.stats.orphaned);
    }
    if pass.stats.deferred > 0 {
        log::info!("  Deferred:      {:>6}", pass.stats.deferred);
    }
    if review > 0 {
        log::info!(
            "  {} {} rows need review: edit catalog_id in {} (see 'tabletop review')",
            "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
            review,
            store_path.display()
        );
    }
}
