//! Data model types for the board game collection.
//!
//! These types represent the pipeline's records at each stage: parsed list
//! entries, resolution records (the human-editable store), and enriched games
//! (the detail cache and the emitted collection).

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ── List entry ──────────────────────────────────────────────────────────────

/// One parsed line of the input list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    /// The trimmed input line. Used as the key that pairs an entry with a
    /// stored resolution row across runs.
    pub line: String,
    /// Candidate text for matching. For URL lines this is the slug, kept for
    /// diagnostics only.
    pub raw_text: String,
    /// A direct catalog link, when the line contained one.
    pub explicit_url: Option<String>,
    /// The id embedded in `explicit_url`.
    pub explicit_id: Option<u32>,
    /// Display override from the text after the first unescaped `#`.
    pub custom_name: Option<String>,
    /// A trailing `(YYYY)` stripped from a free-text name.
    pub year_hint: Option<i32>,
}

// ── Confidence ──────────────────────────────────────────────────────────────

/// Qualitative trust level assigned to a resolved catalog id.
///
/// Ordered from least to most trusted, so `Confidence::Low < Confidence::High`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum Confidence {
    #[default]
    None,
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::None => "None",
            Confidence::Low => "Low",
            Confidence::Medium => "Medium",
            Confidence::High => "High",
        }
    }

    /// All variants, most trusted first.
    pub fn all() -> &'static [Confidence] {
        &[
            Confidence::High,
            Confidence::Medium,
            Confidence::Low,
            Confidence::None,
        ]
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Confidence {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Confidence::High),
            "medium" => Ok(Confidence::Medium),
            "low" => Ok(Confidence::Low),
            "none" => Ok(Confidence::None),
            _ => Err(UnknownVariant::new("confidence", s)),
        }
    }
}

// ── Match method ────────────────────────────────────────────────────────────

/// Which resolution strategy produced a record.
///
/// The variant order is the order strategies are tried in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MatchMethod {
    DirectUrl,
    LocalIndexMatch,
    RemoteSearchMatch,
    #[default]
    Unresolved,
}

impl MatchMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMethod::DirectUrl => "DirectUrl",
            MatchMethod::LocalIndexMatch => "LocalIndexMatch",
            MatchMethod::RemoteSearchMatch => "RemoteSearchMatch",
            MatchMethod::Unresolved => "Unresolved",
        }
    }
}

impl fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchMethod {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "directurl" | "direct_url" => Ok(MatchMethod::DirectUrl),
            "localindexmatch" | "local_index_match" => Ok(MatchMethod::LocalIndexMatch),
            "remotesearchmatch" | "remote_search_match" => Ok(MatchMethod::RemoteSearchMatch),
            "unresolved" => Ok(MatchMethod::Unresolved),
            _ => Err(UnknownVariant::new("match_method", s)),
        }
    }
}

// ── Resolution status ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ResolutionStatus {
    Found,
    NotFound,
    #[default]
    ManualReviewNeeded,
}

impl ResolutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionStatus::Found => "Found",
            ResolutionStatus::NotFound => "NotFound",
            ResolutionStatus::ManualReviewNeeded => "ManualReviewNeeded",
        }
    }
}

impl fmt::Display for ResolutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResolutionStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "found" => Ok(ResolutionStatus::Found),
            "notfound" | "not_found" => Ok(ResolutionStatus::NotFound),
            "manualreviewneeded" | "manual_review_needed" => {
                Ok(ResolutionStatus::ManualReviewNeeded)
            }
            _ => Err(UnknownVariant::new("status", s)),
        }
    }
}

/// A store cell that doesn't name any variant of its column's enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub column: &'static str,
    pub value: String,
}

impl UnknownVariant {
    fn new(column: &'static str, value: &str) -> Self {
        Self {
            column,
            value: value.to_string(),
        }
    }
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} value '{}'", self.column, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

// ── Resolution record ───────────────────────────────────────────────────────

/// One row of the resolution store.
///
/// `catalog_id` and `custom_name` are the manual-override points: once a row
/// carries an id, automated runs leave it alone.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolutionRecord {
    /// The input line this row was derived from.
    pub input: String,
    pub custom_name: Option<String>,
    pub source_link: Option<String>,
    pub catalog_id: Option<u32>,
    /// Catalog name of the matched game. Diagnostic only.
    pub matched_name: Option<String>,
    pub confidence: Confidence,
    pub status: ResolutionStatus,
    pub match_method: MatchMethod,
}

impl ResolutionRecord {
    /// An unresolved record carrying the entry's human-meaningful fields.
    pub fn unresolved(entry: &ListEntry) -> Self {
        Self {
            input: entry.line.clone(),
            custom_name: entry.custom_name.clone(),
            source_link: entry.explicit_url.clone(),
            ..Self::default()
        }
    }

    /// Mark this record as matched to `catalog_id`.
    pub fn resolve(
        &mut self,
        catalog_id: u32,
        matched_name: Option<String>,
        confidence: Confidence,
        method: MatchMethod,
    ) {
        self.catalog_id = Some(catalog_id);
        self.matched_name = matched_name;
        self.confidence = confidence;
        self.match_method = method;
        self.status = ResolutionStatus::Found;
    }

    pub fn is_resolved(&self) -> bool {
        self.catalog_id.is_some()
    }

    /// Whether a human should look at this row.
    pub fn needs_review(&self) -> bool {
        self.catalog_id.is_none()
            || self.status != ResolutionStatus::Found
            || self.confidence <= Confidence::Low
    }

    /// The name to show for this row: custom name, then matched name, then
    /// the raw input.
    pub fn label(&self) -> &str {
        self.custom_name
            .as_deref()
            .or(self.matched_name.as_deref())
            .unwrap_or(&self.input)
    }
}

// ── Enriched game ───────────────────────────────────────────────────────────

/// A resolved game with its detail metadata, as cached and emitted.
///
/// Every numeric field is optional: the remote source may omit any of them
/// and absence is never replaced by a made-up default.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EnrichedGame {
    pub catalog_id: u32,
    /// Custom name when the record has one, else the catalog name.
    pub display_name: String,
    /// Primary catalog name.
    pub name: String,
    pub year: Option<i32>,
    pub rank: Option<u32>,
    /// Average user rating, 0-10.
    pub rating: Option<f64>,
    /// Bayesian average used for ranking, 0-10.
    pub geek_rating: Option<f64>,
    pub users_rated: Option<u32>,
    pub min_players: Option<u32>,
    pub max_players: Option<u32>,
    pub community_best_players: Option<String>,
    pub community_recommended_players: Option<String>,
    pub playing_time_minutes: Option<u32>,
    /// Average weight, 1-5.
    pub complexity_weight: Option<f64>,
    #[serde(default)]
    pub is_expansion: bool,
    #[serde(with = "set_list", default)]
    pub mechanics: BTreeSet<String>,
    #[serde(with = "set_list", default)]
    pub categories: BTreeSet<String>,
    pub image_url: Option<String>,
    /// File name inside the images directory. Present only after a
    /// successful download.
    pub image_path: Option<String>,
    pub source_link: Option<String>,
    /// RFC 3339 time of the detail fetch.
    pub fetched_at: Option<String>,
}

/// Serde adapter storing a string set as one `; `-joined cell.
pub mod set_list {
    use std::collections::BTreeSet;

    use serde::{Deserialize, Deserializer, Serializer};

    pub const SEPARATOR: &str = "; ";

    pub fn serialize<S: Serializer>(set: &BTreeSet<String>, s: S) -> Result<S::Ok, S::Error> {
        let joined: Vec<&str> = set.iter().map(String::as_str).collect();
        s.serialize_str(&joined.join(SEPARATOR))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<BTreeSet<String>, D::Error> {
        let cell = Option::<String>::deserialize(d)?.unwrap_or_default();
        Ok(split(&cell))
    }

    /// Split a joined cell back into its members, dropping empty ones.
    pub fn split(cell: &str) -> BTreeSet<String> {
        cell.split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_orders_by_trust() {
        assert!(Confidence::None < Confidence::Low);
        assert!(Confidence::Low < Confidence::Medium);
        assert!(Confidence::Medium < Confidence::High);
    }

    #[test]
    fn enums_parse_their_display_form() {
        for c in Confidence::all() {
            assert_eq!(c.to_string().parse::<Confidence>().unwrap(), *c);
        }
        assert_eq!(
            "ManualReviewNeeded".parse::<ResolutionStatus>().unwrap(),
            ResolutionStatus::ManualReviewNeeded
        );
        assert_eq!(
            " localindexmatch ".parse::<MatchMethod>().unwrap(),
            MatchMethod::LocalIndexMatch
        );
        assert!("maybe".parse::<Confidence>().is_err());
    }

    #[test]
    fn label_prefers_custom_name() {
        let mut record = ResolutionRecord {
            input: "catan".into(),
            ..Default::default()
        };
        assert_eq!(record.label(), "catan");
        record.matched_name = Some("Catan".into());
        assert_eq!(record.label(), "Catan");
        record.custom_name = Some("Settlers".into());
        assert_eq!(record.label(), "Settlers");
    }

    #[test]
    fn review_flags_low_and_unresolved() {
        let mut record = ResolutionRecord::default();
        assert!(record.needs_review());
        record.resolve(13, None, Confidence::Low, MatchMethod::RemoteSearchMatch);
        assert!(record.needs_review());
        record.confidence = Confidence::Medium;
        assert!(!record.needs_review());
    }

    #[test]
    fn set_list_split_drops_blanks() {
        let set = set_list::split(" Dice Rolling ;; Hand Management; ");
        assert_eq!(set.len(), 2);
        assert!(set.contains("Dice Rolling"));
    }
}
