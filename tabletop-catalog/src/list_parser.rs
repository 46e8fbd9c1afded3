//! Parser for the plain-text game list.
//!
//! Each non-blank line names one game, either as free text or as a catalog
//! link, optionally followed by a display name:
//! ```text
//! 1. Catan (1995)
//! - Tzolk'in
//! https://boardgamegeek.com/boardgame/322708/descent-legends-of-the-dark # Descent
//! Escape Room \#3 # Escape Room Three
//! ```
//!
//! Parsing never fails. A line that makes no sense yields an entry with
//! little information, which resolution then reports as unresolved.

use crate::types::ListEntry;

/// A catalog link recognized in a list line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogUrl {
    /// The link as written, minus query string and fragment.
    pub url: String,
    /// Path segment naming the object type (e.g. "boardgame"). `None` for
    /// short links.
    pub kind: Option<String>,
    pub id: u32,
    pub slug: Option<String>,
}

impl CatalogUrl {
    /// The slug as readable text ("descent-legends" becomes "descent legends").
    pub fn slug_text(&self) -> Option<String> {
        let slug = self.slug.as_deref()?;
        let text = slug.replace(['-', '_', '+'], " ");
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}

/// Parse a whole list, skipping blank, comment, and placeholder lines.
pub fn parse_list(text: &str) -> Vec<ListEntry> {
    text.lines().filter_map(parse_line).collect()
}

/// Parse one line into a [`ListEntry`].
///
/// Returns `None` for lines that carry no entry: blank lines, comments
/// (starting with `#`), and `???` placeholders.
pub fn parse_line(line: &str) -> Option<ListEntry> {
    let line = line.trim().trim_start_matches('\u{feff}');
    if line.is_empty() || line.starts_with('#') || line.chars().all(|c| c == '?') {
        return None;
    }

    let (candidate, custom_name) = split_custom_name(line);

    if let Some((url, remainder)) = find_catalog_url(&candidate) {
        let raw_text = if remainder.is_empty() {
            url.slug_text().unwrap_or_else(|| url.id.to_string())
        } else {
            remainder
        };
        return Some(ListEntry {
            line: line.to_string(),
            raw_text,
            explicit_url: Some(url.url),
            explicit_id: Some(url.id),
            custom_name,
            year_hint: None,
        });
    }

    let name = strip_list_decoration(&candidate);
    let (name, year_hint) = split_year_hint(name);

    Some(ListEntry {
        line: line.to_string(),
        raw_text: name.to_string(),
        explicit_url: None,
        explicit_id: None,
        custom_name,
        year_hint,
    })
}

/// Split on the first unescaped `#`, resolving `\#` escapes on both sides.
fn split_custom_name(line: &str) -> (String, Option<String>) {
    let mut candidate = String::with_capacity(line.len());
    let mut custom = String::new();
    let mut split = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        let target = if split { &mut custom } else { &mut candidate };
        match c {
            '\\' if chars.peek() == Some(&'#') => {
                chars.next();
                target.push('#');
            }
            '#' if !split => split = true,
            _ => target.push(c),
        }
    }

    let custom = Some(custom.trim().to_string()).filter(|s| split && !s.is_empty());
    (candidate.trim().to_string(), custom)
}

/// Find the first token that is a catalog link. Returns the link and the
/// remaining tokens joined by single spaces.
fn find_catalog_url(candidate: &str) -> Option<(CatalogUrl, String)> {
    let tokens: Vec<&str> = candidate.split_whitespace().collect();
    let (pos, url) = tokens
        .iter()
        .enumerate()
        .find_map(|(i, t)| {
            parse_catalog_url(t.trim_matches(['<', '>', '(', ')'])).map(|u| (i, u))
        })?;

    let remainder: Vec<&str> = tokens
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != pos)
        .map(|(_, t)| *t)
        .collect();
    Some((url, remainder.join(" ")))
}

/// Recognize `http(s)://<host>/<kind>/<id>[/<slug>]` and the short form
/// `http(s)://<host>/<id>`.
///
/// ```
/// use tabletop_catalog::parse_catalog_url;
///
/// let url = parse_catalog_url("https://boardgamegeek.com/boardgame/13/catan").unwrap();
/// assert_eq!(url.id, 13);
/// assert_eq!(url.kind.as_deref(), Some("boardgame"));
/// assert_eq!(url.slug.as_deref(), Some("catan"));
///
/// assert!(parse_catalog_url("boardgamegeek.com/boardgame/13").is_none());
/// ```
pub fn parse_catalog_url(token: &str) -> Option<CatalogUrl> {
    let lower = token.to_ascii_lowercase();
    let scheme_len = if lower.starts_with("https://") {
        "https://".len()
    } else if lower.starts_with("http://") {
        "http://".len()
    } else {
        return None;
    };

    let end = token.find(['?', '#']).unwrap_or(token.len());
    let url = token[..end].trim_end_matches('/');
    let mut segments = url[scheme_len..].split('/').filter(|s| !s.is_empty());

    segments.next()?;
    let path: Vec<&str> = segments.collect();

    let (kind, id, slug) = match path.as_slice() {
        [kind, id, rest @ ..] if is_kind(kind) => {
            (Some(kind.to_string()), parse_id(id)?, rest.first())
        }
        [id] => (None, parse_id(id)?, None),
        _ => return None,
    };

    Some(CatalogUrl {
        url: url.to_string(),
        kind,
        id,
        slug: slug.map(|s| s.to_string()),
    })
}

fn is_kind(segment: &str) -> bool {
    !segment.is_empty() && segment.chars().all(|c| c.is_ascii_alphabetic())
}

fn parse_id(segment: &str) -> Option<u32> {
    if segment.is_empty() || !segment.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    segment.parse::<u32>().ok().filter(|id| *id != 0)
}

/// Strip a leading bullet (`-`, `*`, `•`) or number (`12.`, `3)`).
fn strip_list_decoration(text: &str) -> &str {
    let text = text.trim();

    for bullet in ['-', '*', '•'] {
        if let Some(rest) = text.strip_prefix(bullet)
            && rest.starts_with(char::is_whitespace)
        {
            return rest.trim_start();
        }
    }

    let digits = text.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &text[digits..];
        if let Some(after) = rest.strip_prefix(['.', ')'])
            && after.starts_with(char::is_whitespace)
        {
            let after = after.trim_start();
            if !after.is_empty() {
                return after;
            }
        }
    }

    text
}

/// Split a trailing `(YYYY)` off a name.
fn split_year_hint(text: &str) -> (&str, Option<i32>) {
    let Some(inner) = text.strip_suffix(')') else {
        return (text, None);
    };
    let Some(open) = inner.rfind('(') else {
        return (text, None);
    };
    let year_text = &inner[open + 1..];
    let name = inner[..open].trim_end();

    if name.is_empty() || year_text.len() != 4 || !year_text.chars().all(|c| c.is_ascii_digit()) {
        return (text, None);
    }
    match year_text.parse::<i32>() {
        Ok(year) if (1000..=2100).contains(&year) => (name, Some(year)),
        _ => (text, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escaped_hash_stays_in_candidate() {
        let (candidate, custom) = split_custom_name(r"Escape Room \#3 # Three");
        assert_eq!(candidate, "Escape Room #3");
        assert_eq!(custom.as_deref(), Some("Three"));
    }

    #[test]
    fn empty_custom_name_is_none() {
        let (candidate, custom) = split_custom_name("Catan #   ");
        assert_eq!(candidate, "Catan");
        assert_eq!(custom, None);
    }

    #[test]
    fn decoration_keeps_numeric_titles() {
        assert_eq!(strip_list_decoration("7 Wonders"), "7 Wonders");
        assert_eq!(strip_list_decoration("1. 7 Wonders"), "7 Wonders");
        assert_eq!(strip_list_decoration("12) Azul"), "Azul");
        assert_eq!(strip_list_decoration("- Azul"), "Azul");
        assert_eq!(strip_list_decoration("-Azul"), "-Azul");
        assert_eq!(strip_list_decoration("1906."), "1906.");
    }

    #[test]
    fn year_hint_requires_four_digits() {
        assert_eq!(split_year_hint("Dune (2019)"), ("Dune", Some(2019)));
        assert_eq!(split_year_hint("Dune (Imperium)"), ("Dune (Imperium)", None));
        assert_eq!(split_year_hint("(1995)"), ("(1995)", None));
        assert_eq!(split_year_hint("Tiny (95)"), ("Tiny (95)", None));
    }

    #[test]
    fn url_ids_must_be_positive_integers() {
        assert!(parse_catalog_url("https://boardgamegeek.com/boardgame/0/x").is_none());
        assert!(parse_catalog_url("https://boardgamegeek.com/boardgame/abc/x").is_none());
        assert!(parse_catalog_url("https://boardgamegeek.com/boardgame").is_none());
    }
}
