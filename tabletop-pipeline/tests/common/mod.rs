#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

use tabletop_bgg::{BggError, GameDatabase, GameDetails, ImageData, SearchCandidate};
use tabletop_rankings::{RankedGame, RankingIndex};

/// In-memory remote database that counts calls and can be told to fail.
#[derive(Default)]
pub struct MockDatabase {
    pub search_results: HashMap<String, Vec<SearchCandidate>>,
    pub details: HashMap<u32, GameDetails>,
    pub failing_ids: HashSet<u32>,
    pub failing_queries: HashSet<String>,
    pub failing_images: HashSet<String>,
    pub searches: Cell<usize>,
    pub detail_calls: Cell<usize>,
    pub image_calls: Cell<usize>,
    pub queries: RefCell<Vec<String>>,
}

impl MockDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_game(mut self, details: GameDetails) -> Self {
        self.details.insert(details.id, details);
        self
    }

    pub fn with_search(mut self, query: &str, results: Vec<SearchCandidate>) -> Self {
        self.search_results.insert(query.to_string(), results);
        self
    }

    pub fn failing_id(mut self, id: u32) -> Self {
        self.failing_ids.insert(id);
        self
    }

    pub fn failing_query(mut self, query: &str) -> Self {
        self.failing_queries.insert(query.to_string());
        self
    }

    pub fn failing_image(mut self, url: &str) -> Self {
        self.failing_images.insert(url.to_string());
        self
    }

    pub fn total_calls(&self) -> usize {
        self.searches.get() + self.detail_calls.get() + self.image_calls.get()
    }
}

impl GameDatabase for MockDatabase {
    fn search(&self, query: &str) -> Result<Vec<SearchCandidate>, BggError> {
        self.searches.set(self.searches.get() + 1);
        self.queries.borrow_mut().push(query.to_string());
        if self.failing_queries.contains(query) {
            return Err(BggError::ServerError {
                status: 503,
                message: "unavailable".into(),
            });
        }
        Ok(self.search_results.get(query).cloned().unwrap_or_default())
    }

    fn game_details(&self, id: u32) -> Result<GameDetails, BggError> {
        self.detail_calls.set(self.detail_calls.get() + 1);
        if self.failing_ids.contains(&id) {
            return Err(BggError::ServerError {
                status: 500,
                message: "boom".into(),
            });
        }
        self.details.get(&id).cloned().ok_or(BggError::NotFound)
    }

    fn fetch_image(&self, url: &str) -> Result<ImageData, BggError> {
        self.image_calls.set(self.image_calls.get() + 1);
        if self.failing_images.contains(url) {
            return Err(BggError::ServerError {
                status: 502,
                message: "bad gateway".into(),
            });
        }
        Ok(ImageData {
            bytes: format!("image:{url}").into_bytes(),
            extension: tabletop_bgg::types::image_extension(url).to_string(),
        })
    }
}

pub fn details(id: u32, name: &str) -> GameDetails {
    GameDetails {
        id,
        name: name.to_string(),
        year: Some(2000),
        min_players: Some(2),
        max_players: Some(4),
        rating: Some(7.5),
        image_url: Some(format!("https://cf.example/pic{id}.jpg")),
        ..Default::default()
    }
}

pub fn candidate(id: u32, name: &str, year: Option<i32>) -> SearchCandidate {
    SearchCandidate {
        id,
        name: name.to_string(),
        year,
    }
}

pub fn ranked(id: u32, name: &str, year: Option<i32>, rank: Option<u32>) -> RankedGame {
    RankedGame {
        id,
        name: name.to_string(),
        year,
        rank,
        bayes_average: None,
        average: None,
        users_rated: None,
        is_expansion: false,
    }
}

pub fn sample_index() -> RankingIndex {
    RankingIndex::from_games(vec![
        ranked(13, "CATAN", Some(1995), Some(5)),
        ranked(27710, "Catan Dice Game", Some(2007), Some(2500)),
        ranked(322708, "Descent: Legends of the Dark", Some(2021), Some(300)),
        ranked(230802, "Azul", Some(2017), Some(60)),
    ])
}
