use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde_json::Map;
use tracing::info;

use crate::model::{iso_timestamp, Category, NewsDocument, NormalizedItem};
use crate::parser::fields::collapse_whitespace;

static KOREAN_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4})년\s*(\d{2})월\s*(\d{2})일").unwrap());

const DIGEST_SOURCE: &str = "Daily_Bridge";
const DIGEST_TAG: &str = "daily_bridge";
const DIGEST_SCORE: f64 = 0.95;
const DIGEST_BULLETS: usize = 3;
const SUMMARY_MAX_CHARS: usize = 180;

/// `2026년 02월 10일` → `2026-02-10`.
pub fn bridge_date(markdown: &str) -> Option<String> {
    KOREAN_DATE_RE
        .captures(markdown)
        .map(|c| format!("{}-{}-{}", &c[1], &c[2], &c[3]))
}

pub fn digest_id(date: &str) -> String {
    format!("daily_bridge_{date}")
}

/// One news record standing in for a whole Daily Bridge: its first three
/// `*` lines, clipped to 180 characters. The id is keyed by date, so folding
/// the same day twice is a no-op.
pub fn digest_item(
    markdown: &str,
    category: Category,
    fallback_date: &str,
    now: DateTime<Utc>,
) -> NormalizedItem {
    let date = bridge_date(markdown).unwrap_or_else(|| fallback_date.to_string());

    let bullets: Vec<&str> = markdown
        .lines()
        .map(str::trim)
        .filter(|l| l.starts_with('*'))
        .map(|l| l.trim_start_matches(['*', ' ']).trim())
        .take(DIGEST_BULLETS)
        .collect();

    let joined = bullets.join(" ");
    let summary = if joined.trim().is_empty() {
        collapse_whitespace(markdown)
    } else {
        collapse_whitespace(&joined)
    };

    NormalizedItem {
        id: digest_id(&date),
        category,
        title: format!("Daily Bridge {date}"),
        source: DIGEST_SOURCE.to_string(),
        url: None,
        published_at: Some(iso_timestamp(now)),
        summary: truncate(&summary, SUMMARY_MAX_CHARS),
        highlights: Vec::new(),
        tags: vec![DIGEST_TAG.to_string()],
        score: Some(DIGEST_SCORE),
        extra: Map::new(),
    }
}

/// Prepend `item` unless a record with its id already exists.
pub fn fold_into(doc: &mut NewsDocument, item: NormalizedItem, now: DateTime<Utc>) -> bool {
    if doc.items.iter().any(|existing| existing.id == item.id) {
        info!(id = %item.id, "digest already present");
        return false;
    }
    doc.items.insert(0, item);
    doc.generated_at = iso_timestamp(now);
    true
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
