use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

pub const BRIDGE_SCHEMA_VERSION: &str = "1.0";
pub const BRIDGE_KIND: &str = "daily_bridge";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    ListeriaFree,
    CulturedMeat,
    HighEndAudio,
    ComputerAi,
    GlobalBiz,
}

impl Category {
    /// Dashboard order.
    pub const ALL: [Category; 5] = [
        Category::ListeriaFree,
        Category::CulturedMeat,
        Category::HighEndAudio,
        Category::ComputerAi,
        Category::GlobalBiz,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Category::ListeriaFree => "listeria_free",
            Category::CulturedMeat => "cultured_meat",
            Category::HighEndAudio => "high_end_audio",
            Category::ComputerAi => "computer_ai",
            Category::GlobalBiz => "global_biz",
        }
    }

    /// Exact, case-insensitive key lookup.
    pub fn from_key(key: &str) -> Option<Category> {
        let key = key.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.key().eq_ignore_ascii_case(key))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedItem {
    pub id: String,
    pub category: Category,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub source: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub score: Option<f64>,
    /// Fields written by other tools (`mode`, `decision`, ...), kept as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NormalizedItem {
    /// Marked as a decision item by the enrichment step.
    pub fn is_decision(&self) -> bool {
        self.extra.get("mode").and_then(Value::as_str) == Some("decision")
    }

    /// Numeric `decision.<key>`, 0 when absent or not a number.
    pub fn decision_value(&self, key: &str) -> f64 {
        match self.extra.get("decision").and_then(|d| d.get(key)) {
            Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
            _ => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsDocument {
    pub generated_at: String,
    #[serde(default)]
    pub items: Vec<NormalizedItem>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NewsDocument {
    pub fn new(items: Vec<NormalizedItem>, generated_at: DateTime<Utc>) -> Self {
        Self {
            generated_at: iso_timestamp(generated_at),
            items,
            extra: Map::new(),
        }
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(de)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBridgeDocument {
    pub schema_version: String,
    pub kind: String,
    pub date: String,
    pub generated_at: String,
    pub language: String,
    pub owner: String,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub tag: String,
    pub title: String,
    pub items: Vec<SectionItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionItem {
    pub title: String,
    pub summary: String,
    pub keywords: Vec<String>,
    pub importance: u8,
    pub source: Option<String>,
    pub url: Option<String>,
}

/// Millisecond-precision UTC instant, e.g. `2026-01-31T08:00:00.000Z`.
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn category_keys_round_trip() {
        for c in Category::ALL {
            assert_eq!(Category::from_key(c.key()), Some(c));
        }
        assert_eq!(Category::from_key(" Computer_AI "), Some(Category::ComputerAi));
        assert_eq!(Category::from_key("computer ai"), None);
    }

    #[test]
    fn category_serializes_as_key() {
        let json = serde_json::to_string(&Category::HighEndAudio).unwrap();
        assert_eq!(json, "\"high_end_audio\"");
    }

    #[test]
    fn unknown_item_fields_survive_a_rewrite() {
        let raw = r#"{"generated_at":"x","note":"kept","items":[{"id":"a","category":"global_biz","title":"T","source":null,"mode":"decision","decision":{"impact_score":9,"confidence":"0.5"}}]}"#;
        let doc: NewsDocument = serde_json::from_str(raw).unwrap();
        let item = &doc.items[0];
        assert_eq!(item.source, "");
        assert!(item.is_decision());
        assert_eq!(item.decision_value("impact_score"), 9.0);
        assert_eq!(item.decision_value("confidence"), 0.5);
        assert_eq!(item.decision_value("missing"), 0.0);

        let out = serde_json::to_value(&doc).unwrap();
        assert_eq!(out["note"], "kept");
        assert_eq!(out["items"][0]["decision"]["impact_score"], 9);
        assert_eq!(out["items"][0]["mode"], "decision");
    }

    #[test]
    fn timestamp_has_millis_and_z() {
        let at = Utc.with_ymd_and_hms(2026, 1, 31, 8, 0, 0).unwrap();
        assert_eq!(iso_timestamp(at), "2026-01-31T08:00:00.000Z");
    }
}
