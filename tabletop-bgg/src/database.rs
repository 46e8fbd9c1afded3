use crate::error::BggError;
use crate::types::{GameDetails, ImageData, SearchCandidate};

/// The remote game catalog.
///
/// All three operations are blocking, fallible, and rate limited by the
/// implementation. Callers treat every error as a failure of that one call.
pub trait GameDatabase {
    /// Search by free text. Candidates come back in the service's order.
    fn search(&self, query: &str) -> Result<Vec<SearchCandidate>, BggError>;

    /// Full details for one catalog id.
    fn game_details(&self, id: u32) -> Result<GameDetails, BggError>;

    /// Download an image by URL.
    fn fetch_image(&self, url: &str) -> Result<ImageData, BggError>;
}
