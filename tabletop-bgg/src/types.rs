use std::collections::BTreeSet;

/// Minimum poll votes before a player count's result is trusted.
const MIN_POLL_VOTES: u32 = 5;

/// One result from a text search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCandidate {
    pub id: u32,
    pub name: String,
    pub year: Option<i32>,
}

/// Votes for one player count in the "suggested number of players" poll.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlayerVotes {
    /// Player count as labelled by the poll ("3", "4+").
    pub num_players: String,
    pub best: u32,
    pub recommended: u32,
    pub not_recommended: u32,
}

impl PlayerVotes {
    pub fn total(&self) -> u32 {
        self.best + self.recommended + self.not_recommended
    }

    /// More than half the voters call this count the best.
    pub fn is_best(&self) -> bool {
        let total = self.total();
        total > MIN_POLL_VOTES && f64::from(self.best) > f64::from(total) * 0.5
    }

    /// Not best, but most voters would still play at this count.
    pub fn is_recommended(&self) -> bool {
        let total = self.total();
        total > MIN_POLL_VOTES
            && !self.is_best()
            && f64::from(self.best + self.recommended) > f64::from(total) * 0.6
    }
}

/// Detail record for one game, as returned by the thing endpoint.
///
/// Numeric fields are `None` when the payload omits them, holds a
/// non-numeric value, or holds the service's "unknown" zero.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GameDetails {
    pub id: u32,
    pub name: String,
    pub year: Option<i32>,
    pub min_players: Option<u32>,
    pub max_players: Option<u32>,
    pub playing_time_minutes: Option<u32>,
    pub rating: Option<f64>,
    pub geek_rating: Option<f64>,
    pub users_rated: Option<u32>,
    pub rank: Option<u32>,
    pub complexity_weight: Option<f64>,
    pub mechanics: BTreeSet<String>,
    pub categories: BTreeSet<String>,
    pub image_url: Option<String>,
    pub is_expansion: bool,
    pub player_poll: Vec<PlayerVotes>,
}

impl GameDetails {
    /// Player counts the community rates best, e.g. `"3, 4"`.
    pub fn best_players(&self) -> Option<String> {
        join_counts(self.player_poll.iter().filter(|v| v.is_best()))
    }

    /// Player counts the community recommends but doesn't rate best.
    pub fn recommended_players(&self) -> Option<String> {
        join_counts(self.player_poll.iter().filter(|v| v.is_recommended()))
    }
}

fn join_counts<'a>(votes: impl Iterator<Item = &'a PlayerVotes>) -> Option<String> {
    let mut counts: Vec<&str> = votes.map(|v| v.num_players.as_str()).collect();
    if counts.is_empty() {
        return None;
    }
    // Numeric order, with labels like "4+" last.
    counts.sort_by_key(|c| c.parse::<u32>().unwrap_or(u32::MAX));
    Some(counts.join(", "))
}

/// A downloaded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub bytes: Vec<u8>,
    /// File extension without the dot, lowercase.
    pub extension: String,
}

/// File extension for an image URL: png, jpg, jpeg, gif or webp, else jpg.
pub fn image_extension(url: &str) -> &'static str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let file = path.rsplit('/').next().unwrap_or(path);
    let ext = file
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "png",
        "jpeg" => "jpeg",
        "gif" => "gif",
        "webp" => "webp",
        _ => "jpg",
    }
}
