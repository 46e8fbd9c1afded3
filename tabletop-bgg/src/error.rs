/// Errors that can occur when talking to the remote game database.
#[derive(Debug, thiserror::Error)]
pub enum BggError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Rate limited by BoardGameGeek API")]
    RateLimit,

    #[error("Game not found in BoardGameGeek database")]
    NotFound,

    #[error("BoardGameGeek rejected the request (HTTP {0}); check the API token")]
    Unauthorized(u16),

    #[error("Server error (HTTP {status}): {message}")]
    ServerError { status: u16, message: String },

    #[error("API error: {0}")]
    Api(String),

    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    XmlAttribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl BggError {
    pub fn api(msg: impl Into<String>) -> Self {
        Self::Api(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this failure means the game doesn't exist, as opposed to the
    /// service being unavailable.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}
