use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;

use crate::model::iso_timestamp;

static ISO_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}[Tt]").unwrap());
static DATE_ONLY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());
static URL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)https?://[^\s)]+").unwrap());
static SCORE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^score\s*=\s*([0-9]*\.?[0-9]+)$").unwrap());
static TAGS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^tags\s*=\s*(.+)$").unwrap());
static SUMMARY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^summary\s*=\s*(.+)$").unwrap());
static INLINE_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[tag:([^\]]+)\]").unwrap());
static WEB_CITATION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[web:(\d+)\]").unwrap());

/// Normalize a loosely written date to a canonical UTC instant.
///
/// Accepts `YYYY-MM-DDT…` instants (RFC 3339, or zone-less read as UTC) and
/// date-only `YYYY-MM-DD` (midnight UTC). Anything else, including impossible
/// calendar dates, yields `None`.
pub fn normalize_date(raw: &str) -> Option<String> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if ISO_PREFIX_RE.is_match(s) {
        let upper = s.to_ascii_uppercase();
        if let Ok(dt) = DateTime::parse_from_rfc3339(&upper) {
            return Some(iso_timestamp(dt.with_timezone(&Utc)));
        }
        return NaiveDateTime::parse_from_str(&upper, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(&upper, "%Y-%m-%dT%H:%M"))
            .ok()
            .map(|naive| iso_timestamp(naive.and_utc()));
    }

    if DATE_ONLY_RE.is_match(s) {
        return NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| iso_timestamp(naive.and_utc()));
    }

    None
}

/// First `http(s)://` run in `s`, stopping at whitespace or `)`.
pub fn extract_url(s: &str) -> Option<String> {
    URL_RE.find(s).map(|m| m.as_str().to_string())
}

pub fn parse_score(field: &str) -> Option<f64> {
    SCORE_RE
        .captures(field.trim())
        .and_then(|c| c[1].parse::<f64>().ok())
}

/// `tags=a, b,,c` → `["a", "b", "c"]`. `None` when the field is not a tags field.
pub fn parse_tags(field: &str) -> Option<Vec<String>> {
    TAGS_RE.captures(field.trim()).map(|c| {
        c[1].split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    })
}

pub fn parse_summary(field: &str) -> Option<String> {
    SUMMARY_RE
        .captures(field.trim())
        .map(|c| c[1].trim().to_string())
}

/// `[tag:xxx]` markers anywhere in free text, deduplicated in first-seen order.
pub fn inline_tags(text: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for caps in INLINE_TAG_RE.captures_iter(text) {
        let tag = caps[1].trim();
        if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}

/// `[web:12]` → `web:12`.
pub fn web_citation(text: &str) -> Option<String> {
    WEB_CITATION_RE
        .captures(text)
        .map(|c| format!("web:{}", &c[1]))
}

pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_only_is_midnight_utc() {
        assert_eq!(
            normalize_date("2026-01-31").as_deref(),
            Some("2026-01-31T00:00:00.000Z")
        );
    }

    #[test]
    fn instant_is_reserialized() {
        assert_eq!(
            normalize_date("2026-01-31T08:00:00Z").as_deref(),
            Some("2026-01-31T08:00:00.000Z")
        );
        assert_eq!(
            normalize_date("2026-01-31t08:00:00z").as_deref(),
            Some("2026-01-31T08:00:00.000Z")
        );
    }

    #[test]
    fn offsets_convert_to_utc() {
        assert_eq!(
            normalize_date("2026-01-31T09:30:00+09:00").as_deref(),
            Some("2026-01-31T00:30:00.000Z")
        );
    }

    #[test]
    fn zoneless_instant_reads_as_utc() {
        assert_eq!(
            normalize_date("2026-01-31T08:15:00").as_deref(),
            Some("2026-01-31T08:15:00.000Z")
        );
    }

    #[test]
    fn garbage_dates_are_none() {
        assert_eq!(normalize_date("not-a-date"), None);
        assert_eq!(normalize_date("2026-02-30"), None);
        assert_eq!(normalize_date("2026-13-01T00:00:00Z"), None);
        assert_eq!(normalize_date(""), None);
        assert_eq!(normalize_date("31/01/2026"), None);
    }

    #[test]
    fn url_stops_at_paren_and_space() {
        assert_eq!(
            extract_url("see (https://x.test/a) now").as_deref(),
            Some("https://x.test/a")
        );
        assert_eq!(
            extract_url("HTTP://X.test/b c").as_deref(),
            Some("HTTP://X.test/b")
        );
        assert_eq!(extract_url("no link here"), None);
    }

    #[test]
    fn score_field() {
        assert_eq!(parse_score("score=0.83"), Some(0.83));
        assert_eq!(parse_score("SCORE = 7"), Some(7.0));
        assert_eq!(parse_score("score=.5"), Some(0.5));
        assert_eq!(parse_score("score=high"), None);
        assert_eq!(parse_score("scored=1"), None);
    }

    #[test]
    fn tags_field() {
        assert_eq!(
            parse_tags("tags=regulation, usa,,"),
            Some(vec!["regulation".to_string(), "usa".to_string()])
        );
        assert_eq!(parse_tags("summary=x"), None);
    }

    #[test]
    fn summary_field() {
        assert_eq!(parse_summary("summary=  one liner ").as_deref(), Some("one liner"));
        assert_eq!(parse_summary("summary="), None);
    }

    #[test]
    fn inline_tags_dedup_in_order() {
        let tags = inline_tags("a [tag:fda] b [tag: recall ] c [tag:fda]");
        assert_eq!(tags, vec!["fda", "recall"]);
        assert!(inline_tags("nothing").is_empty());
    }

    #[test]
    fn web_citation_label() {
        assert_eq!(web_citation("first line [web:12]").as_deref(), Some("web:12"));
        assert_eq!(web_citation("[web:x]"), None);
    }
}
