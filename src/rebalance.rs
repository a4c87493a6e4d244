use std::cmp::Ordering;

use serde_json::Map;
use tracing::debug;

use crate::model::{Category, NormalizedItem};
use crate::settings::CategoryCaps;

/// Kept count per category, in dashboard order.
pub type CategoryCounts = Vec<(Category, usize)>;

/// Group items by category in dashboard order and keep at most the configured
/// cap per category. Inside a group, decision items come first (highest impact,
/// then confidence, then newest), followed by the rest newest first with
/// undated items last.
pub fn rebalance(items: Vec<NormalizedItem>, caps: &CategoryCaps) -> (Vec<NormalizedItem>, CategoryCounts) {
    let total = items.len();
    let mut out = Vec::with_capacity(total);
    let mut counts = Vec::with_capacity(Category::ALL.len());

    for category in Category::ALL {
        let (mut group, mut info): (Vec<NormalizedItem>, Vec<NormalizedItem>) = items
            .iter()
            .filter(|i| i.category == category)
            .cloned()
            .partition(NormalizedItem::is_decision);
        // stable; ties keep input order
        group.sort_by(|a, b| by_decision(b, a));
        info.sort_by(|a, b| published(b).cmp(published(a)));
        group.append(&mut info);
        group.truncate(caps.cap(category));
        counts.push((category, group.len()));
        out.extend(group);
    }

    debug!(before = total, after = out.len(), "rebalanced");
    (out, counts)
}

fn by_decision(a: &NormalizedItem, b: &NormalizedItem) -> Ordering {
    a.decision_value("impact_score")
        .total_cmp(&b.decision_value("impact_score"))
        .then_with(|| a.decision_value("confidence").total_cmp(&b.decision_value("confidence")))
        .then_with(|| published(a).cmp(published(b)))
}

fn published(item: &NormalizedItem) -> &str {
    item.published_at.as_deref().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, category: Category, published_at: Option<&str>) -> NormalizedItem {
        NormalizedItem {
            id: id.into(),
            category,
            title: id.into(),
            source: String::new(),
            url: None,
            published_at: published_at.map(String::from),
            summary: String::new(),
            highlights: Vec::new(),
            tags: Vec::new(),
            score: None,
            extra: Map::new(),
        }
    }

    fn decision(id: &str, impact: f64, published_at: &str) -> NormalizedItem {
        let mut it = item(id, Category::ComputerAi, Some(published_at));
        it.extra.insert("mode".into(), "decision".into());
        it.extra
            .insert("decision".into(), serde_json::json!({ "impact_score": impact }));
        it
    }

    #[test]
    fn orders_by_category_then_recency() {
        let items = vec![
            item("biz-old", Category::GlobalBiz, Some("2026-01-01T00:00:00.000Z")),
            item("ai", Category::ComputerAi, None),
            item("biz-undated", Category::GlobalBiz, None),
            item("biz-new", Category::GlobalBiz, Some("2026-02-01T00:00:00.000Z")),
            item("listeria", Category::ListeriaFree, None),
        ];
        let (out, counts) = rebalance(items, &CategoryCaps::default());
        let ids: Vec<_> = out.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["listeria", "ai", "biz-new", "biz-old", "biz-undated"]);
        assert_eq!(counts[0], (Category::ListeriaFree, 1));
        assert_eq!(counts[1], (Category::CulturedMeat, 0));
        assert_eq!(counts[4], (Category::GlobalBiz, 3));
    }

    #[test]
    fn caps_keep_the_newest() {
        let items: Vec<_> = (1..=9)
            .map(|d| {
                item(
                    &format!("l{d}"),
                    Category::ListeriaFree,
                    Some(&format!("2026-01-0{d}T00:00:00.000Z")),
                )
            })
            .collect();
        let (out, counts) = rebalance(items, &CategoryCaps::default());
        assert_eq!(out.len(), 8);
        assert_eq!(out[0].id, "l9");
        assert_eq!(out[7].id, "l2");
        assert_eq!(counts[0], (Category::ListeriaFree, 8));
    }

    #[test]
    fn six_items_fit_under_the_default_cap() {
        let items: Vec<_> = (1..=6)
            .map(|d| item(&format!("l{d}"), Category::ListeriaFree, Some("2026-01-01")))
            .collect();
        let (out, _) = rebalance(items, &CategoryCaps::default());
        assert_eq!(out.len(), 6);
    }

    #[test]
    fn decision_items_lead_their_category() {
        let items = vec![
            item("fresh", Category::ComputerAi, Some("2026-03-01T00:00:00.000Z")),
            decision("low", 3.0, "2026-02-01T00:00:00.000Z"),
            decision("high", 9.0, "2026-01-01T00:00:00.000Z"),
        ];
        let caps = CategoryCaps {
            computer_ai: 2,
            ..CategoryCaps::default()
        };
        let (out, counts) = rebalance(items, &caps);
        let ids: Vec<_> = out.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["high", "low"]);
        assert_eq!(counts[3], (Category::ComputerAi, 2));
    }

    #[test]
    fn equal_dates_keep_input_order() {
        let items = vec![
            item("a", Category::HighEndAudio, Some("2026-01-01")),
            item("b", Category::HighEndAudio, Some("2026-01-01")),
        ];
        let (out, _) = rebalance(items, &CategoryCaps::default());
        assert_eq!(out[0].id, "a");
        assert_eq!(out[1].id, "b");
    }
}
