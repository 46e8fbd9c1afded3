//! Logger setup. Normal output goes through `log::info!`, so the level
//! doubles as the console verbosity.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use env_logger::{Builder, Target, WriteStyle};
use log::{Level, LevelFilter};

use crate::error::CliError;

pub(crate) fn init(verbose: bool, quiet: bool, logfile: Option<&Path>) -> Result<(), CliError> {
    let level = if verbose {
        LevelFilter::Debug
    } else if quiet {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    };

    let mut builder = Builder::new();
    builder.filter_level(level);
    if let Ok(spec) = std::env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }

    let to_file = logfile.is_some();
    builder.format(move |buf, record| {
        let message = record.args().to_string();
        let message = if to_file {
            strip_ansi_escapes::strip_str(&message)
        } else {
            message
        };
        if verbose {
            writeln!(
                buf,
                "{} {:<5} {}: {}",
                buf.timestamp_millis(),
                record.level(),
                record.target(),
                message
            )
        } else if record.level() <= Level::Warn {
            writeln!(buf, "{}: {}", record.level().as_str().to_lowercase(), message)
        } else {
            writeln!(buf, "{message}")
        }
    });

    match logfile {
        Some(path) => {
            let file = File::create(path)?;
            builder
                .target(Target::Pipe(Box::new(file)))
                .write_style(WriteStyle::Never);
        }
        None => {
            builder.target(Target::Stdout);
        }
    }

    builder
        .try_init()
        .map_err(|e| CliError::config(format!("cannot install logger: {e}")))
}
