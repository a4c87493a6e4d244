use serde_json::{Map, Value};
use tracing::debug;

use super::assemble::ItemDraft;
use super::category;
use super::dedup::dedup;
use super::fields::normalize_date;
use crate::error::{IngestError, Result};
use crate::model::NormalizedItem;

/// Normalize JSON input: a bare array, or an object holding an `items` or
/// `results` array. Any other shape yields no records.
pub fn normalize_json(raw: &str) -> Result<Vec<NormalizedItem>> {
    let data: Value = serde_json::from_str(raw).map_err(IngestError::MalformedInput)?;

    let records: &[Value] = match &data {
        Value::Array(arr) => arr.as_slice(),
        Value::Object(obj) => obj
            .get("items")
            .and_then(Value::as_array)
            .or_else(|| obj.get("results").and_then(Value::as_array))
            .map(Vec::as_slice)
            .unwrap_or(&[]),
        _ => &[],
    };

    let items = records
        .iter()
        .filter_map(Value::as_object)
        .filter_map(normalize_record)
        .collect();
    Ok(dedup(items))
}

fn normalize_record(obj: &Map<String, Value>) -> Option<NormalizedItem> {
    let label = first_text(obj, &["category", "section", "topic"]);
    let Some(category) = label.as_deref().and_then(category::resolve) else {
        debug!(label = ?label, "dropping JSON record without resolvable category");
        return None;
    };

    let draft = ItemDraft {
        title: first_text(obj, &["title", "headline"]).unwrap_or_default(),
        source: first_text(obj, &["source", "publisher"]).unwrap_or_default(),
        url: first_text(obj, &["url"])
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty()),
        published_at: first_text(obj, &["published_at", "published", "date"])
            .and_then(|d| normalize_date(&d)),
        summary: first_text(obj, &["summary"])
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
        highlights: string_list(obj.get("highlights")),
        tags: string_list(obj.get("tags")),
        score: obj
            .get("score")
            .and_then(Value::as_f64)
            .or_else(|| obj.get("relevance").and_then(Value::as_f64)),
    };

    draft.finish(category)
}

/// First key holding a non-empty scalar, rendered as text.
fn first_text(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| match obj.get(*k)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    })
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(arr)) => arr
            .iter()
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;

    #[test]
    fn alternate_field_names() {
        let raw = r#"[{
            "headline": " GPU prices fall ",
            "publisher": "Wire",
            "url": "https://x.test/gpu",
            "published": "2026-01-31",
            "relevance": 0.7,
            "topic": "AI & GPU roundup",
            "summary": " short ",
            "highlights": ["h1", 2],
            "tags": ["gpu"]
        }]"#;
        let items = normalize_json(raw).unwrap();
        assert_eq!(items.len(), 1);
        let it = &items[0];
        assert_eq!(it.category, Category::ComputerAi);
        assert_eq!(it.title, "GPU prices fall");
        assert_eq!(it.source, "Wire");
        assert_eq!(it.published_at.as_deref(), Some("2026-01-31T00:00:00.000Z"));
        assert_eq!(it.score, Some(0.7));
        assert_eq!(it.summary, "short");
        assert_eq!(it.highlights, vec!["h1", "2"]);
        assert_eq!(it.tags, vec!["gpu"]);
    }

    #[test]
    fn items_and_results_wrappers() {
        let items = normalize_json(r#"{"items":[{"title":"A","category":"global_biz"}]}"#).unwrap();
        assert_eq!(items.len(), 1);
        let results =
            normalize_json(r#"{"results":[{"title":"B","section":"listeria_free"}]}"#).unwrap();
        assert_eq!(results[0].category, Category::ListeriaFree);
        assert!(normalize_json(r#"{"other":1}"#).unwrap().is_empty());
        assert!(normalize_json("42").unwrap().is_empty());
    }

    #[test]
    fn records_missing_category_or_title_are_dropped() {
        let raw = r#"[
            {"title":"no category"},
            {"title":"bad","category":"unknown topic"},
            {"title":"  ","category":"global_biz"},
            "not an object",
            {"title":"kept","category":"global_biz"}
        ]"#;
        let items = normalize_json(raw).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "kept");
    }

    #[test]
    fn empty_category_falls_through_to_section() {
        let items = normalize_json(r#"[{"title":"A","category":"","section":"hifi"}]"#).unwrap();
        assert_eq!(items[0].category, Category::HighEndAudio);
    }

    #[test]
    fn bad_dates_and_string_scores_become_none() {
        let items = normalize_json(
            r#"[{"title":"A","category":"global_biz","date":"yesterday","score":"0.9"}]"#,
        )
        .unwrap();
        assert_eq!(items[0].published_at, None);
        assert_eq!(items[0].score, None);
        assert_eq!(items[0].url, None);
    }

    #[test]
    fn duplicates_collapse() {
        let raw = r#"[
            {"title":"A","category":"global_biz","url":"https://x.test"},
            {"title":"a","category":"GLOBAL_BIZ","url":"https://X.test","summary":"later"}
        ]"#;
        let items = normalize_json(raw).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].summary, "");
    }

    #[test]
    fn malformed_json_is_fatal() {
        assert!(matches!(
            normalize_json("{not json"),
            Err(IngestError::MalformedInput(_))
        ));
    }
}
