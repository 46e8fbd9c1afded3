//! Parsers for BoardGameGeek XML API 2 payloads.
//!
//! Search (`/search`):
//! ```xml
//! <items total="1">
//!   <item type="boardgame" id="13">
//!     <name type="primary" value="CATAN"/>
//!     <yearpublished value="1995"/>
//!   </item>
//! </items>
//! ```
//!
//! Thing (`/thing?stats=1`) carries names, player counts, the suggested
//! player count poll, links, and a `<statistics>` block with ratings and
//! ranks. Unknown elements are ignored and numeric values that don't parse
//! come back as `None`.

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::BggError;
use crate::types::{GameDetails, PlayerVotes, SearchCandidate};

const SUGGESTED_PLAYERS_POLL: &str = "suggested_numplayers";

/// Parse a search response into candidates, in response order.
pub fn parse_search(xml_text: &str) -> Result<Vec<SearchCandidate>, BggError> {
    let mut xml = Reader::from_reader(xml_text.as_bytes());
    xml.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut parser = SearchParser::default();

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) => parser.start(e, false)?,
            Event::Empty(ref e) => parser.start(e, true)?,
            Event::Text(ref e) => parser.error.text(&e.unescape()?),
            Event::End(ref e) => parser.end(e.name().as_ref()),
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if parser.results.is_empty()
        && let Some(message) = parser.error.message
    {
        return Err(BggError::api(message));
    }

    Ok(parser.results)
}

#[derive(Default)]
struct SearchParser {
    results: Vec<SearchCandidate>,
    current: Option<SearchCandidate>,
    has_primary_name: bool,
    error: ErrorText,
}

impl SearchParser {
    fn start(&mut self, e: &BytesStart<'_>, empty: bool) -> Result<(), BggError> {
        let name = e.name();
        match name.as_ref() {
            b"item" => {
                self.current = attr(e, b"id")?
                    .and_then(|v| v.trim().parse::<u32>().ok())
                    .map(|id| SearchCandidate {
                        id,
                        name: String::new(),
                        year: None,
                    });
                self.has_primary_name = false;
                if empty {
                    self.finish_item();
                }
            }
            b"name" => {
                if let Some(candidate) = self.current.as_mut() {
                    let value = attr(e, b"value")?.unwrap_or_default();
                    let primary = attr(e, b"type")?.as_deref() == Some("primary");
                    if primary || (!self.has_primary_name && candidate.name.is_empty()) {
                        candidate.name = value;
                        self.has_primary_name |= primary;
                    }
                }
            }
            b"yearpublished" => {
                if let Some(candidate) = self.current.as_mut() {
                    candidate.year = year_value(attr(e, b"value")?);
                }
            }
            other => self.error.start(other),
        }
        Ok(())
    }

    fn end(&mut self, name: &[u8]) {
        if name == b"item" {
            self.finish_item();
        } else {
            self.error.end();
        }
    }

    fn finish_item(&mut self) {
        if let Some(candidate) = self.current.take()
            && !candidate.name.trim().is_empty()
        {
            self.results.push(candidate);
        }
    }
}

/// Parse a thing response into the details for `id`.
///
/// When the response holds several items the one matching `id` wins, else
/// the first. An empty `<items>` means the id doesn't exist.
pub fn parse_thing(xml_text: &str, id: u32) -> Result<GameDetails, BggError> {
    let mut xml = Reader::from_reader(xml_text.as_bytes());
    xml.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut parser = ThingParser::default();

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) => parser.start(e, false)?,
            Event::Empty(ref e) => parser.start(e, true)?,
            Event::Text(ref e) => parser.text(&e.unescape()?),
            Event::End(ref e) => parser.end(e.name().as_ref()),
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    let ThingParser { items, error, .. } = parser;
    let mut items: Vec<GameDetails> = items.into_iter().map(ItemState::finish).collect();

    if items.is_empty() {
        return match error.message {
            Some(message) if !message.to_ascii_lowercase().contains("not found") => {
                Err(BggError::api(message))
            }
            _ => Err(BggError::NotFound),
        };
    }

    let pos = items.iter().position(|g| g.id == id).unwrap_or(0);
    Ok(items.swap_remove(pos))
}

/// Collects `<error><message>` text from error payloads.
#[derive(Default)]
struct ErrorText {
    in_message: bool,
    message: Option<String>,
}

impl ErrorText {
    fn start(&mut self, name: &[u8]) {
        self.in_message = name == b"message" || name == b"error";
    }

    fn text(&mut self, text: &str) {
        if self.in_message && self.message.is_none() && !text.trim().is_empty() {
            self.message = Some(text.trim().to_string());
        }
    }

    fn end(&mut self) {
        self.in_message = false;
    }
}

/// Raw fields of one `<item>` before fallbacks are applied.
#[derive(Default)]
struct ItemState {
    details: GameDetails,
    has_primary_name: bool,
    playing_time: Option<u32>,
    min_play_time: Option<u32>,
    max_play_time: Option<u32>,
}

impl ItemState {
    fn finish(self) -> GameDetails {
        let mut details = self.details;
        details.playing_time_minutes = self
            .playing_time
            .or(self.max_play_time)
            .or(self.min_play_time);
        details
    }
}

#[derive(Default)]
struct ThingParser {
    items: Vec<ItemState>,
    current: Option<ItemState>,
    in_image: bool,
    in_poll: bool,
    votes: Option<PlayerVotes>,
    error: ErrorText,
}

impl ThingParser {
    fn start(&mut self, e: &BytesStart<'_>, empty: bool) -> Result<(), BggError> {
        let name = e.name();
        let name = name.as_ref();

        if name == b"item" {
            let mut item = ItemState::default();
            item.details.id = attr(e, b"id")?
                .and_then(|v| v.parse().ok())
                .unwrap_or_default();
            item.details.is_expansion = attr(e, b"type")?.as_deref() == Some("boardgameexpansion");
            if empty {
                self.items.push(item);
            } else {
                self.current = Some(item);
            }
            return Ok(());
        }

        let Some(item) = self.current.as_mut() else {
            self.error.start(name);
            return Ok(());
        };
        let details = &mut item.details;

        match name {
            b"name" => {
                let value = attr(e, b"value")?.unwrap_or_default();
                let primary = attr(e, b"type")?.as_deref() == Some("primary");
                if primary || (!item.has_primary_name && details.name.is_empty()) {
                    details.name = value;
                    item.has_primary_name |= primary;
                }
            }
            b"image" => self.in_image = !empty,
            b"yearpublished" => details.year = year_value(attr(e, b"value")?),
            b"minplayers" => details.min_players = count_value(attr(e, b"value")?),
            b"maxplayers" => details.max_players = count_value(attr(e, b"value")?),
            b"playingtime" => item.playing_time = count_value(attr(e, b"value")?),
            b"minplaytime" => item.min_play_time = count_value(attr(e, b"value")?),
            b"maxplaytime" => item.max_play_time = count_value(attr(e, b"value")?),
            b"poll" => {
                self.in_poll = !empty
                    && attr(e, b"name")?.as_deref() == Some(SUGGESTED_PLAYERS_POLL);
            }
            b"results" if self.in_poll => {
                self.votes = attr(e, b"numplayers")?.map(|n| PlayerVotes {
                    num_players: n.trim().to_string(),
                    ..Default::default()
                });
            }
            b"result" => {
                if let Some(votes) = self.votes.as_mut() {
                    let count = attr(e, b"numvotes")?
                        .and_then(|v| v.trim().parse::<u32>().ok())
                        .unwrap_or(0);
                    match attr(e, b"value")?.as_deref() {
                        Some("Best") => votes.best = count,
                        Some("Recommended") => votes.recommended = count,
                        Some("Not Recommended") => votes.not_recommended = count,
                        _ => {}
                    }
                }
            }
            b"link" => {
                let value = attr(e, b"value")?.filter(|v| !v.trim().is_empty());
                if let Some(value) = value {
                    match attr(e, b"type")?.as_deref() {
                        Some("boardgamemechanic") => {
                            details.mechanics.insert(value.trim().to_string());
                        }
                        Some("boardgamecategory") => {
                            details.categories.insert(value.trim().to_string());
                        }
                        _ => {}
                    }
                }
            }
            b"usersrated" => {
                details.users_rated = attr(e, b"value")?.and_then(|v| v.trim().parse().ok());
            }
            b"average" => details.rating = rating_value(attr(e, b"value")?),
            b"bayesaverage" => details.geek_rating = rating_value(attr(e, b"value")?),
            b"averageweight" => details.complexity_weight = rating_value(attr(e, b"value")?),
            b"rank" => {
                if attr(e, b"name")?.as_deref() == Some("boardgame") {
                    details.rank = count_value(attr(e, b"value")?);
                }
            }
            _ => {}
        }

        Ok(())
    }

    fn text(&mut self, text: &str) {
        if self.in_image {
            if let Some(item) = self.current.as_mut() {
                let url = text.trim();
                if !url.is_empty() {
                    item.details.image_url = Some(absolute_url(url));
                }
            }
        } else {
            self.error.text(text);
        }
    }

    fn end(&mut self, name: &[u8]) {
        match name {
            b"item" => {
                if let Some(item) = self.current.take() {
                    self.items.push(item);
                }
            }
            b"image" => self.in_image = false,
            b"poll" => self.in_poll = false,
            b"results" => {
                if let (Some(votes), Some(item)) = (self.votes.take(), self.current.as_mut()) {
                    item.details.player_poll.push(votes);
                }
            }
            _ => self.error.end(),
        }
    }
}

/// Protocol-relative image links (`//cf.geekdo-images.com/...`) get https.
fn absolute_url(url: &str) -> String {
    match url.strip_prefix("//") {
        Some(rest) => format!("https://{rest}"),
        None => url.to_string(),
    }
}

/// Read one attribute, unescaped.
fn attr(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>, BggError> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == key {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// A positive count. Zero is the service's "unknown".
fn count_value(value: Option<String>) -> Option<u32> {
    value?.trim().parse::<u32>().ok().filter(|v| *v > 0)
}

fn year_value(value: Option<String>) -> Option<i32> {
    value?.trim().parse::<i32>().ok().filter(|v| *v != 0)
}

/// A positive finite rating. Zero means no votes yet.
fn rating_value(value: Option<String>) -> Option<f64> {
    value?
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}

#[cfg(test)]
#[path = "tests/xml_tests.rs"]
mod tests;
