//! The enrichment cache: one CSV row per catalog id plus an images
//! directory holding `<catalog_id>.<ext>` files.
//!
//! The table is rewritten atomically after each enriched id, so an
//! interrupted run keeps everything finished before the interruption.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tabletop_bgg::ImageData;
use tabletop_catalog::EnrichedGame;

use crate::atomic::write_atomic;
use crate::error::PipelineError;

/// Image extensions looked for when relinking a file on disk.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Persisted detail records keyed by catalog id.
pub struct EnrichmentCache {
    path: PathBuf,
    images_dir: PathBuf,
    games: BTreeMap<u32, EnrichedGame>,
}

impl EnrichmentCache {
    /// Open the cache at `path`, with images under `images_dir`. A missing
    /// file is an empty cache. Rows that don't parse are skipped with a
    /// warning.
    pub fn open(path: &Path, images_dir: &Path) -> Result<Self, PipelineError> {
        let mut games = BTreeMap::new();

        if path.exists() {
            let mut reader = csv::ReaderBuilder::new()
                .has_headers(true)
                .flexible(true)
                .trim(csv::Trim::All)
                .from_path(path)?;

            let headers = reader.headers()?.clone();
            for result in reader.records() {
                let parsed = result.and_then(|raw| {
                    let line = raw.position().map_or(0, |p| p.line());
                    raw.deserialize::<EnrichedGame>(Some(&headers)).map(|game| (line, game))
                });
                match parsed {
                    Ok((_, game)) if game.catalog_id != 0 => {
                        games.insert(game.catalog_id, game);
                    }
                    Ok((line, _)) => {
                        log::warn!("Skipping cache row at line {line} without catalog_id")
                    }
                    Err(e) => {
                        let line = e.position().map_or(0, |p| p.line());
                        log::warn!("Skipping malformed cache row at line {line}: {e}");
                    }
                }
            }
            log::debug!("Loaded {} cached games from {}", games.len(), path.display());
        }

        Ok(Self {
            path: path.to_path_buf(),
            images_dir: images_dir.to_path_buf(),
            games,
        })
    }

    pub fn get(&self, catalog_id: u32) -> Option<&EnrichedGame> {
        self.games.get(&catalog_id)
    }

    /// Insert or replace the row for `game.catalog_id`.
    pub fn insert(&mut self, game: EnrichedGame) {
        self.games.insert(game.catalog_id, game);
    }

    /// Cached games in id order.
    pub fn games(&self) -> impl Iterator<Item = &EnrichedGame> {
        self.games.values()
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// Full path of a game's image, if it has one recorded.
    pub fn image_file(&self, game: &EnrichedGame) -> Option<PathBuf> {
        game.image_path.as_ref().map(|name| self.images_dir.join(name))
    }

    /// Whether the game's recorded image exists on disk.
    pub fn has_image(&self, game: &EnrichedGame) -> bool {
        self.image_file(game).is_some_and(|p| p.is_file())
    }

    /// File name of an existing `<id>.<ext>` image, recorded or not.
    pub fn find_image(&self, catalog_id: u32) -> Option<String> {
        IMAGE_EXTENSIONS
            .iter()
            .map(|ext| format!("{catalog_id}.{ext}"))
            .find(|name| self.images_dir.join(name).is_file())
    }

    /// Write an image as `<id>.<ext>` and return its file name.
    pub fn store_image(&self, catalog_id: u32, image: &ImageData) -> Result<String, PipelineError> {
        let name = format!("{catalog_id}.{}", image.extension);
        let path = self.images_dir.join(&name);
        write_atomic(&path, &image.bytes).map_err(|e| PipelineError::persist(&path, e))?;
        Ok(name)
    }

    /// Serialize the whole table to CSV text.
    pub fn to_bytes(&self) -> Result<Vec<u8>, PipelineError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for game in self.games.values() {
            writer.serialize(game)?;
        }
        if self.games.is_empty() {
            writer.serialize(EnrichedGame::default())?;
            return Ok(header_only(writer.into_inner().map_err(|e| e.into_error())?));
        }
        writer.into_inner().map_err(|e| PipelineError::Io(e.into_error()))
    }

    /// Rewrite the cache file atomically.
    pub fn save(&self) -> Result<(), PipelineError> {
        let bytes = self.to_bytes()?;
        write_atomic(&self.path, &bytes).map_err(|e| PipelineError::persist(&self.path, e))
    }
}

/// Keep only the first line (the header) of serialized CSV.
fn header_only(bytes: Vec<u8>) -> Vec<u8> {
    match bytes.iter().position(|b| *b == b'\n') {
        Some(end) => bytes[..=end].to_vec(),
        None => bytes,
    }
}
