use crate::model::Category;

/// Keyword sets tried in order; the first category with a hit wins.
const HEURISTICS: &[(Category, &[&str])] = &[
    (Category::ListeriaFree, &["listeria"]),
    (Category::CulturedMeat, &["cultured", "cell", "배양"]),
    (Category::HighEndAudio, &["audio", "hifi", "하이엔드", "jubilee"]),
    (Category::ComputerAi, &["computer", "ai", "openai", "gpu", "blackwell"]),
    (Category::GlobalBiz, &["global", "biz", "efsa", "mafra"]),
];

/// Map a free-text label (heading, JSON `category`/`section`/`topic`) to a
/// category. Substring matching is lossy: "said" resolves to `computer_ai`.
pub fn resolve(label: &str) -> Option<Category> {
    let lower = label.trim().to_lowercase();
    if lower.is_empty() {
        return None;
    }

    if let Some(exact) = Category::from_key(&lower) {
        return Some(exact);
    }

    HEURISTICS
        .iter()
        .find(|(_, needles)| needles.iter().any(|n| lower.contains(n)))
        .map(|(category, _)| *category)
}
