use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};

use crate::database::GameDatabase;
use crate::error::BggError;
use crate::types::{GameDetails, ImageData, SearchCandidate, image_extension};
use crate::xml::{parse_search, parse_thing};

pub const DEFAULT_BASE_URL: &str = "https://boardgamegeek.com/xmlapi2";
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(2000);
/// Calls closer together than this get clients banned.
pub const MIN_INTERVAL_FLOOR: Duration = Duration::from_millis(1000);
const SEARCH_TYPES: &str = "boardgame,boardgameexpansion";
const MAX_ERROR_BODY: usize = 200;

/// Connection settings for [`BggClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// Minimum time between the starts of two calls.
    pub min_interval: Duration,
    /// Bound on each HTTP request.
    pub timeout: Duration,
    /// Extra attempts for queued (202), throttled (429) and 5xx responses.
    pub max_retries: u32,
    pub user_agent: String,
    /// Sent as a bearer token when set.
    pub api_token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            min_interval: DEFAULT_MIN_INTERVAL,
            timeout: Duration::from_secs(15),
            max_retries: 2,
            user_agent: concat!("tabletop/", env!("CARGO_PKG_VERSION")).to_string(),
            api_token: None,
        }
    }
}

/// Enforces a minimum delay between calls.
///
/// The first call passes immediately. Each later call sleeps until
/// `interval` has passed since the previous one started.
pub struct RateGate {
    interval: Duration,
    last: Mutex<Option<Instant>>,
}

impl RateGate {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: Mutex::new(None),
        }
    }

    /// Block until the next call may start. Returns how long it slept.
    pub fn wait(&self) -> Duration {
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        let mut slept = Duration::ZERO;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.interval {
                slept = self.interval - elapsed;
                std::thread::sleep(slept);
            }
        }
        *last = Some(Instant::now());
        slept
    }
}

/// Blocking client for the BoardGameGeek XML API 2 with rate limiting and
/// retry of transient responses.
pub struct BggClient {
    http: Client,
    config: ClientConfig,
    gate: RateGate,
}

impl BggClient {
    /// Build a client. An interval below [`MIN_INTERVAL_FLOOR`] is raised to it.
    pub fn new(mut config: ClientConfig) -> Result<Self, BggError> {
        if config.min_interval < MIN_INTERVAL_FLOOR {
            log::warn!(
                "Request interval {}ms is below the {}ms floor; using the floor",
                config.min_interval.as_millis(),
                MIN_INTERVAL_FLOOR.as_millis()
            );
            config.min_interval = MIN_INTERVAL_FLOOR;
        }
        if config.base_url.trim().is_empty() {
            return Err(BggError::config("base URL is empty"));
        }
        config.base_url = config.base_url.trim_end_matches('/').to_string();

        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            http,
            gate: RateGate::new(config.min_interval),
            config,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// GET an API endpoint, retrying queued/throttled/server-error responses
    /// with doubling back-off.
    fn api_get(&self, endpoint: &str, query: &[(&str, String)]) -> Result<String, BggError> {
        let url = format!("{}/{endpoint}", self.config.base_url);
        let mut backoff = self.config.min_interval;
        let mut attempt = 0;

        loop {
            self.gate.wait();

            let mut request = self.http.get(&url).query(query);
            if let Some(token) = &self.config.api_token {
                request = request.bearer_auth(token);
            }
            let resp = request.send()?;
            let status = resp.status();

            if status.is_success() && status != StatusCode::ACCEPTED {
                return Ok(resp.text()?);
            }

            let transient = status == StatusCode::ACCEPTED
                || status == StatusCode::TOO_MANY_REQUESTS
                || status.is_server_error();
            if transient && attempt < self.config.max_retries {
                attempt += 1;
                log::debug!(
                    "HTTP {status} from {endpoint}, retry {attempt}/{} in {}ms",
                    self.config.max_retries,
                    backoff.as_millis()
                );
                std::thread::sleep(backoff);
                backoff *= 2;
                continue;
            }

            return Err(status_error(status, resp));
        }
    }
}

fn status_error(status: StatusCode, resp: Response) -> BggError {
    match status {
        StatusCode::NOT_FOUND => BggError::NotFound,
        StatusCode::TOO_MANY_REQUESTS => BggError::RateLimit,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => BggError::Unauthorized(status.as_u16()),
        StatusCode::ACCEPTED => BggError::ServerError {
            status: status.as_u16(),
            message: "request still queued".to_string(),
        },
        _ => {
            let body = resp.text().unwrap_or_default();
            BggError::ServerError {
                status: status.as_u16(),
                message: body.chars().take(MAX_ERROR_BODY).collect(),
            }
        }
    }
}

impl GameDatabase for BggClient {
    fn search(&self, query: &str) -> Result<Vec<SearchCandidate>, BggError> {
        let body = self.api_get(
            "search",
            &[("query", query.to_string()), ("type", SEARCH_TYPES.to_string())],
        )?;
        let results = parse_search(&body)?;
        log::debug!("Search '{query}' returned {} candidates", results.len());
        Ok(results)
    }

    fn game_details(&self, id: u32) -> Result<GameDetails, BggError> {
        let body = self.api_get("thing", &[("id", id.to_string()), ("stats", "1".to_string())])?;
        parse_thing(&body, id)
    }

    fn fetch_image(&self, url: &str) -> Result<ImageData, BggError> {
        self.gate.wait();

        let resp = self.http.get(url).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(status_error(status, resp));
        }
        let bytes = resp.bytes()?.to_vec();
        if bytes.is_empty() {
            return Err(BggError::api(format!("empty image body from {url}")));
        }

        Ok(ImageData {
            bytes,
            extension: image_extension(url).to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_first_call_passes_immediately() {
        let gate = RateGate::new(Duration::from_millis(200));
        assert_eq!(gate.wait(), Duration::ZERO);
    }

    #[test]
    fn gate_spaces_consecutive_calls() {
        let gate = RateGate::new(Duration::from_millis(50));
        let start = Instant::now();
        gate.wait();
        gate.wait();
        gate.wait();
        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    #[test]
    fn interval_below_floor_is_raised() {
        let client = BggClient::new(ClientConfig {
            min_interval: Duration::from_millis(10),
            ..ClientConfig::default()
        })
        .unwrap();
        assert_eq!(client.config().min_interval, MIN_INTERVAL_FLOOR);
    }

    #[test]
    fn empty_base_url_is_rejected() {
        let result = BggClient::new(ClientConfig {
            base_url: " ".to_string(),
            ..ClientConfig::default()
        });
        assert!(matches!(result, Err(BggError::Config(_))));
    }

    #[test]
    fn trailing_slash_trimmed_from_base_url() {
        let client = BggClient::new(ClientConfig {
            base_url: "https://example.test/xmlapi2/".to_string(),
            ..ClientConfig::default()
        })
        .unwrap();
        assert_eq!(client.config().base_url, "https://example.test/xmlapi2");
    }
}
