pub(crate) mod build;
pub(crate) mod config;
pub(crate) mod emit;
pub(crate) mod enrich;
pub(crate) mod resolve;
pub(crate) mod review;
pub(crate) mod stats;

use std::path::{Path, PathBuf};

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use tabletop_bgg::BggClient;
use tabletop_pipeline::RunLog;
use tabletop_rankings::RankingIndex;

use crate::error::CliError;
use crate::settings::Settings;

/// A flag value if given, else the configured one.
pub(crate) fn pick(flag: Option<PathBuf>, configured: &Path) -> PathBuf {
    flag.unwrap_or_else(|| configured.to_path_buf())
}

/// Load the ranking index from the flag or the settings, if either names one.
pub(crate) fn load_index(
    flag: Option<PathBuf>,
    settings: &Settings,
) -> Result<Option<RankingIndex>, CliError> {
    let Some(path) = flag.or_else(|| settings.paths.rankings.clone()) else {
        log::debug!("No ranking dataset configured; local matching disabled");
        return Ok(None);
    };
    let index = RankingIndex::load(&path)?;
    log::info!(
        "Loaded {} ranked games from {}",
        index.len(),
        path.display().if_supports_color(Stdout, |t| t.cyan())
    );
    Ok(Some(index))
}

pub(crate) fn connect(settings: &Settings) -> Result<BggClient, CliError> {
    let client = BggClient::new(settings.client_config())?;
    log::debug!(
        "Remote database at {} (one call per {} ms)",
        client.config().base_url,
        client.config().min_interval.as_millis()
    );
    Ok(client)
}

pub(crate) fn write_report(log: &RunLog, path: Option<&Path>) -> Result<(), CliError> {
    let Some(path) = path else {
        return Ok(());
    };
    log.write_to_file(path)?;
    log::info!(
        "Report written to {}",
        path.display().if_supports_color(Stdout, |t| t.cyan())
    );
    Ok(())
}

/// Truncate a string to a maximum width in characters, appending "..." if needed.
pub(crate) fn truncate_str(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else if max > 3 {
        let head: String = s.chars().take(max - 3).collect();
        format!("{head}...")
    } else {
        s.chars().take(max).collect()
    }
}
