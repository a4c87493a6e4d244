use std::collections::HashSet;

use sha1::{Digest, Sha1};
use tracing::debug;

use crate::model::{Category, NormalizedItem};

const SEPARATOR: &str = "||";

/// Record id: SHA-1 hex over `category||title||url||source`, lowercased.
/// Casing never changes identity.
pub fn fingerprint(category: Category, title: &str, url: Option<&str>, source: &str) -> String {
    let base = [category.key(), title, url.unwrap_or(""), source]
        .join(SEPARATOR)
        .to_lowercase();
    let mut hasher = Sha1::new();
    hasher.update(base.as_bytes());
    hex::encode(hasher.finalize())
}

/// Keep the first record for each id, preserving order.
pub fn dedup(items: Vec<NormalizedItem>) -> Vec<NormalizedItem> {
    let before = items.len();
    let mut seen: HashSet<String> = HashSet::new();
    let kept: Vec<NormalizedItem> = items
        .into_iter()
        .filter(|item| !item.id.is_empty() && seen.insert(item.id.clone()))
        .collect();
    if kept.len() < before {
        debug!(dropped = before - kept.len(), "removed duplicate records");
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::assemble::parse_bullet;

    #[test]
    fn fingerprint_is_sha1_of_lowercased_key() {
        assert_eq!(
            fingerprint(
                Category::ListeriaFree,
                "Big Headline",
                Some("https://x.test/a"),
                "ACME News"
            ),
            "462e14a83ce61ac9f363caa0e1e6827b39444287"
        );
        assert_eq!(
            fingerprint(Category::GlobalBiz, "T", None, ""),
            "250e83cb825e1d14b684f009bac0f3869b8aeeb5"
        );
    }

    #[test]
    fn casing_collides() {
        let a = parse_bullet("Big Headline | ACME | https://x.test/a", Category::ComputerAi).unwrap();
        let b = parse_bullet("BIG headline | acme | HTTPS://X.TEST/A", Category::ComputerAi).unwrap();
        assert_eq!(a.id, b.id);
        let kept = dedup(vec![a, b]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].title, "Big Headline");
    }

    #[test]
    fn differing_payload_still_collides() {
        let a = parse_bullet("T | S | https://x.test | summary=one", Category::GlobalBiz).unwrap();
        let b = parse_bullet("T | S | https://x.test | summary=two | score=3", Category::GlobalBiz).unwrap();
        let kept = dedup(vec![a, b]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].summary, "one");
    }

    #[test]
    fn category_separates_identity() {
        let a = parse_bullet("T | S", Category::GlobalBiz).unwrap();
        let b = parse_bullet("T | S", Category::ComputerAi).unwrap();
        assert_eq!(dedup(vec![a, b]).len(), 2);
    }
}
