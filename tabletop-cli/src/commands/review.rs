use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use tabletop_catalog::{Confidence, ResolutionRecord, ResolutionStatus};
use tabletop_pipeline::load_store_lines;

use crate::cli_types::StoreArgs;
use crate::error::CliError;
use crate::settings::Settings;

use super::{pick, truncate_str};

/// List store rows needing attention (or all rows with `--all`).
pub(crate) fn run_review(settings: &Settings, store: StoreArgs, all: bool) -> Result<(), CliError> {
    let store_path = pick(store.store, &settings.paths.store);
    if !store_path.exists() {
        log::warn!("No store at {}", store_path.display());
        log::info!("Run 'tabletop resolve' first.");
        return Ok(());
    }
    let records = load_store_lines(&store_path)?;

    let rows: Vec<(u64, &ResolutionRecord)> = records
        .iter()
        .map(|(line, r)| (*line, r))
        .filter(|(_, r)| all || r.needs_review())
        .collect();

    if rows.is_empty() {
        log::info!(
            "{} Nothing to review in {}",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            store_path.display()
        );
        return Ok(());
    }

    log::info!(
        "{}",
        format!("{:>5}  {:<18} {:<7} {:>8}  {}", "Line", "Status", "Conf.", "Id", "Entry")
            .if_supports_color(Stdout, |t| t.bold())
    );
    for (line, record) in &rows {
        let id = record
            .catalog_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string());
        let text = format!(
            "{:>5}  {:<18} {:<7} {:>8}  {}",
            line,
            record.status.as_str(),
            record.confidence.as_str(),
            id,
            describe(record)
        );
        match (record.status, record.confidence) {
            (ResolutionStatus::Found, Confidence::High | Confidence::Medium) => {
                log::info!("{text}")
            }
            (ResolutionStatus::Found, _) => {
                log::info!("{}", text.if_supports_color(Stdout, |t| t.yellow()))
            }
            _ => log::info!("{}", text.if_supports_color(Stdout, |t| t.red())),
        }
    }

    let pending = rows.iter().filter(|(_, r)| r.needs_review()).count();
    log::info!("");
    log::info!(
        "{} of {} rows need review. Fill in catalog_id in {} and re-run.",
        pending,
        records.len(),
        store_path.display().if_supports_color(Stdout, |t| t.cyan())
    );
    Ok(())
}

fn describe(record: &ResolutionRecord) -> String {
    let mut text = truncate_str(&record.input, 50);
    if let Some(name) = &record.matched_name
        && record.is_resolved()
    {
        text.push_str(&format!(" -> {}", truncate_str(name, 40)));
    }
    if let Some(custom) = &record.custom_name {
        text.push_str(&format!(" [{}]", custom));
    }
    text
}
