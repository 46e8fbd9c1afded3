use std::path::PathBuf;

use tabletop_bgg::BggError;
use tabletop_pipeline::PipelineError;
use tabletop_rankings::RankingsError;
use thiserror::Error;

/// Errors that end a command with a non-zero exit status.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Settings file could not be parsed
    #[error("Cannot parse settings {}: {source}", path.display())]
    SettingsParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Settings are readable but unusable
    #[error("Config error: {0}")]
    Config(String),

    #[error("{0}")]
    Pipeline(#[from] PipelineError),

    #[error("Ranking data: {0}")]
    Rankings(#[from] RankingsError),

    #[error("Remote database: {0}")]
    Remote(#[from] BggError),
}

impl CliError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
