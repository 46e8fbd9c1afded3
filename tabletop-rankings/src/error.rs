/// Errors that can occur while loading a ranking dataset.
#[derive(Debug, thiserror::Error)]
pub enum RankingsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid ranking dataset: {0}")]
    InvalidDataset(String),
}

impl RankingsError {
    pub fn invalid_dataset(msg: impl Into<String>) -> Self {
        Self::InvalidDataset(msg.into())
    }
}
