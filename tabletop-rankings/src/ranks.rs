//! Bulk ranking dataset (CSV) parser.
//!
//! Parses the ranking export published by BoardGameGeek, one row per game:
//! ```text
//! id,name,yearpublished,rank,bayesaverage,average,usersrated,is_expansion,abstracts_rank,...
//! 13,CATAN,1995,597,6.95,7.10,123456,0,,...
//! ```
//! Columns are located by header name and extra columns are ignored.

use std::path::Path;

use crate::error::RankingsError;

/// One game from the ranking dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedGame {
    pub id: u32,
    pub name: String,
    pub year: Option<i32>,
    /// Overall board game rank. `None` for unranked games.
    pub rank: Option<u32>,
    /// Geek rating (Bayesian average).
    pub bayes_average: Option<f64>,
    pub average: Option<f64>,
    pub users_rated: Option<u32>,
    pub is_expansion: bool,
}

/// Header positions of the columns we read.
struct Columns {
    id: usize,
    name: usize,
    year: Option<usize>,
    rank: Option<usize>,
    bayes_average: Option<usize>,
    average: Option<usize>,
    users_rated: Option<usize>,
    is_expansion: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, RankingsError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().trim_start_matches('\u{feff}').eq_ignore_ascii_case(name))
        };

        Ok(Self {
            id: find("id").ok_or_else(|| RankingsError::invalid_dataset("missing 'id' column"))?,
            name: find("name")
                .ok_or_else(|| RankingsError::invalid_dataset("missing 'name' column"))?,
            year: find("yearpublished"),
            rank: find("rank"),
            bayes_average: find("bayesaverage"),
            average: find("average"),
            users_rated: find("usersrated"),
            is_expansion: find("is_expansion"),
        })
    }
}

/// Parse a ranking CSV file from a path.
pub fn parse_ranks_file(path: &Path) -> Result<Vec<RankedGame>, RankingsError> {
    let contents = std::fs::read_to_string(path)?;
    parse_ranks_csv(&contents)
}

/// Parse ranking CSV content from a string.
///
/// Rows without a usable id or name are skipped with a warning.
pub fn parse_ranks_csv(content: &str) -> Result<Vec<RankedGame>, RankingsError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let columns = Columns::from_headers(reader.headers()?)?;
    let mut games = Vec::new();

    for (row, result) in reader.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                log::warn!("Skipping malformed ranking CSV row: {e}");
                continue;
            }
        };

        let get = |i: Option<usize>| i.and_then(|i| record.get(i)).map(str::trim).unwrap_or("");

        let Some(id) = get(Some(columns.id)).parse::<u32>().ok().filter(|id| *id != 0) else {
            log::warn!("Skipping ranking row {}: invalid id", row + 2);
            continue;
        };
        let name = get(Some(columns.name));
        if name.is_empty() {
            log::warn!("Skipping ranking row {}: empty name for id {id}", row + 2);
            continue;
        }

        games.push(RankedGame {
            id,
            name: name.to_string(),
            year: get(columns.year).parse::<i32>().ok().filter(|y| *y != 0),
            rank: get(columns.rank).parse::<u32>().ok().filter(|r| *r != 0),
            bayes_average: parse_rating(get(columns.bayes_average)),
            average: parse_rating(get(columns.average)),
            users_rated: get(columns.users_rated).parse::<u32>().ok(),
            is_expansion: matches!(get(columns.is_expansion), "1" | "true" | "True"),
        });
    }

    log::debug!("Parsed {} ranked games", games.len());
    Ok(games)
}

/// A rating cell. Zero means "no ratings yet" in the export.
fn parse_rating(cell: &str) -> Option<f64> {
    cell.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}
