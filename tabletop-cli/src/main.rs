//! tabletop CLI
//!
//! Resolves a plain-text board-game list to catalog ids, enriches them from
//! BoardGameGeek, and writes a collection for a static viewer.

mod cli_types;
mod commands;
mod error;
mod logging;
mod progress;
mod settings;

use clap::Parser;

use cli_types::{Cli, Commands, ConfigAction};
use error::CliError;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose, cli.quiet, cli.logfile.as_deref()) {
        eprintln!("error: {e}");
        std::process::exit(2);
    }

    if let Err(e) = run(cli) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let quiet = cli.quiet;
    let explicit = cli.config.as_deref();

    // These two must work even when the current settings don't load.
    match cli.command {
        Commands::Config {
            action: ConfigAction::Path,
        } => return commands::config::run_config_path(explicit),
        Commands::Config {
            action: ConfigAction::Init,
        } => return commands::config::run_config_init(explicit),
        _ => {}
    }

    let (settings, source) = settings::load(explicit)?;

    match cli.command {
        Commands::Resolve {
            list,
            store,
            rankings,
            flags,
            limit,
            report,
        } => commands::resolve::run_resolve(
            &settings, list, store, rankings, flags, limit, report, quiet,
        ),
        Commands::Enrich {
            store,
            cache,
            rankings,
            flags,
            limit,
            report,
        } => commands::enrich::run_enrich(
            &settings, store, cache, rankings, flags, limit, report, quiet,
        ),
        Commands::Build {
            list,
            store,
            cache,
            rankings,
            output,
            resolve,
            enrich,
            limit,
            report,
        } => commands::build::run_build(
            &settings, list, store, cache, rankings, output, resolve, enrich, limit, report,
            quiet,
        ),
        Commands::Emit {
            store,
            cache,
            output,
        } => commands::emit::run_emit(&settings, store, cache, output),
        Commands::Review { store, all } => commands::review::run_review(&settings, store, all),
        Commands::Stats { store, cache, top } => {
            commands::stats::run_stats(&settings, store, cache, top)
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::run_config_show(&settings, &source),
            ConfigAction::Path => commands::config::run_config_path(explicit),
            ConfigAction::Init => commands::config::run_config_init(explicit),
        },
    }
}
