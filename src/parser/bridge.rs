use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::fields::collapse_whitespace;
use super::lines::scan;
use crate::model::{DailyBridgeDocument, Section, SectionItem, BRIDGE_KIND, BRIDGE_SCHEMA_VERSION};

// ## 1장. 농업 동향 (진안/농업)
static CHAPTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^##\s*(\d+)\s*장\.\s*(.+?)(?:\s*\(([^)]+)\))?\s*$").unwrap());
// ## I. [진안/농업] 지역 밀착 및 정책 동향
static SECTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^##\s+([IⅤVXLCDM]+)\.\s+\[([^\]]+)\]\s*(.+?)\s*$").unwrap());
static ITEM_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^###\s+\d+\.\s+(.+?)\s*$").unwrap());
static FIELD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-\s*(원문|영향도|실행 인사이트):\s*(.+?)\s*$").unwrap());
// * **제목:** 내용  /  * **제목**: 내용
static BULLET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\*\s+\*\*(.+?)(?::\*\*|\*\*:)\s*(.+?)\s*$").unwrap());

const KEYWORD_CANDIDATES: &[&str] = &[
    "진안", "진안군", "후계농", "스마트팜", "고추", "수박",
    "넷플릭스", "티빙", "ott", "제로 클릭", "ai 에이전트",
    "krx", "한국거래소", "인수", "데이터센터", "광통신",
    "나스닥", "엔비디아", "환율", "관세", "성장률",
];
const MAX_KEYWORDS: usize = 8;

const URGENCY_TERMS: &[&str] = &[
    "마감", "내일", "임박", "필수", "긴급",
    "deadline", "tomorrow", "imminent", "required", "urgent",
];
const MOMENTUM_TERMS: &[&str] = &["급등", "폭주", "대세", "본격화", "surge", "rush", "mainstream"];
const RISK_TERMS: &[&str] = &[
    "변수", "리스크", "주의", "모니터링",
    "variable", "risk", "caution", "monitoring",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldLabel {
    /// 원문
    Raw,
    /// 영향도
    Impact,
    /// 실행 인사이트
    Insight,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BridgeLine<'a> {
    Blank,
    Chapter { number: &'a str, title: &'a str, tag: Option<&'a str> },
    Section { numeral: &'a str, tag: &'a str, title: &'a str },
    ItemHeader(&'a str),
    Field { label: FieldLabel, value: &'a str, line: &'a str },
    Bullet { headline: &'a str, body: &'a str },
    /// Any other markdown heading.
    Heading,
    Text(&'a str),
}

pub fn classify(line: &str) -> BridgeLine<'_> {
    if line.is_empty() {
        return BridgeLine::Blank;
    }

    if let Some(caps) = CHAPTER_RE.captures(line) {
        if let (Some(number), Some(title)) = (caps.get(1), caps.get(2)) {
            return BridgeLine::Chapter {
                number: number.as_str(),
                title: title.as_str(),
                tag: caps.get(3).map(|m| m.as_str()),
            };
        }
    }

    if let Some(caps) = SECTION_RE.captures(line) {
        if let (Some(numeral), Some(tag), Some(title)) = (caps.get(1), caps.get(2), caps.get(3)) {
            return BridgeLine::Section {
                numeral: numeral.as_str(),
                tag: tag.as_str(),
                title: title.as_str(),
            };
        }
    }

    if let Some(title) = ITEM_HEADER_RE.captures(line).and_then(|c| c.get(1)) {
        return BridgeLine::ItemHeader(title.as_str());
    }

    if let Some(caps) = FIELD_RE.captures(line) {
        if let (Some(label), Some(value)) = (caps.get(1), caps.get(2)) {
            let label = match label.as_str() {
                "원문" => FieldLabel::Raw,
                "영향도" => FieldLabel::Impact,
                _ => FieldLabel::Insight,
            };
            return BridgeLine::Field { label, value: value.as_str(), line };
        }
    }

    if let Some(caps) = BULLET_RE.captures(line) {
        if let (Some(headline), Some(body)) = (caps.get(1), caps.get(2)) {
            return BridgeLine::Bullet {
                headline: headline.as_str(),
                body: body.as_str(),
            };
        }
    }

    if line.starts_with('#') {
        return BridgeLine::Heading;
    }

    BridgeLine::Text(line)
}

/// Item being filled in.
#[derive(Debug, Clone, PartialEq)]
pub enum OpenItem {
    /// `### n. title` followed by labeled field lines.
    Structured {
        title: String,
        raw: String,
        score_text: String,
        insight: String,
    },
    /// `* **headline:** body` plus the prose lines that follow it.
    Legacy { title: String, body: Vec<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum BridgeState {
    NoSection,
    InSection,
    InItem(OpenItem),
}

/// What a transition hands to the document: a finished item for the current
/// section and/or a freshly opened section, in that order.
#[derive(Debug, Default, PartialEq)]
pub struct Emission {
    pub item: Option<SectionItem>,
    pub section: Option<Section>,
}

impl Emission {
    fn flushed(state: BridgeState) -> Self {
        Self {
            item: flush(state),
            section: None,
        }
    }
}

pub fn transition(state: BridgeState, line: BridgeLine<'_>) -> (BridgeState, Emission) {
    match (state, line) {
        (state, BridgeLine::Blank) => (state, Emission::default()),

        (state, BridgeLine::Chapter { number, title, tag }) => {
            let section = Section {
                id: format!("S{number}"),
                tag: tag.unwrap_or(title).trim().to_string(),
                title: title.trim().to_string(),
                items: Vec::new(),
            };
            open_section(state, section)
        }

        (state, BridgeLine::Section { numeral, tag, title }) => {
            let section = Section {
                id: format!("S{numeral}"),
                tag: tag.trim().to_string(),
                title: title.trim().to_string(),
                items: Vec::new(),
            };
            open_section(state, section)
        }

        (BridgeState::NoSection, _) => (BridgeState::NoSection, Emission::default()),

        (state, BridgeLine::ItemHeader(title)) => {
            let open = OpenItem::Structured {
                title: title.trim().to_string(),
                raw: String::new(),
                score_text: String::new(),
                insight: String::new(),
            };
            (BridgeState::InItem(open), Emission::flushed(state))
        }

        (state, BridgeLine::Bullet { headline, body }) => {
            let open = OpenItem::Legacy {
                title: headline.trim().to_string(),
                body: vec![body.trim().to_string()],
            };
            (BridgeState::InItem(open), Emission::flushed(state))
        }

        (
            BridgeState::InItem(OpenItem::Structured { title, mut raw, mut score_text, mut insight }),
            BridgeLine::Field { label, value, .. },
        ) => {
            let value = value.trim().to_string();
            match label {
                FieldLabel::Raw => raw = value,
                FieldLabel::Impact => score_text = value,
                FieldLabel::Insight => insight = value,
            }
            let open = OpenItem::Structured { title, raw, score_text, insight };
            (BridgeState::InItem(open), Emission::default())
        }

        (BridgeState::InItem(OpenItem::Legacy { title, mut body }), BridgeLine::Field { line: text, .. })
        | (BridgeState::InItem(OpenItem::Legacy { title, mut body }), BridgeLine::Text(text)) => {
            body.push(text.to_string());
            (BridgeState::InItem(OpenItem::Legacy { title, body }), Emission::default())
        }

        (state @ BridgeState::InItem(OpenItem::Legacy { .. }), BridgeLine::Heading) => {
            (BridgeState::InSection, Emission::flushed(state))
        }

        (state, _) => (state, Emission::default()),
    }
}

fn open_section(state: BridgeState, section: Section) -> (BridgeState, Emission) {
    debug!(id = %section.id, tag = %section.tag, "opening section");
    let emission = Emission {
        item: flush(state),
        section: Some(section),
    };
    (BridgeState::InSection, emission)
}

/// Close the open item, if any. Items without a title are dropped.
pub fn flush(state: BridgeState) -> Option<SectionItem> {
    let BridgeState::InItem(open) = state else {
        return None;
    };

    let (title, summary, importance_text) = match open {
        OpenItem::Structured { title, raw, score_text, insight } => {
            let joined = [raw, insight]
                .into_iter()
                .filter(|p| !p.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            let importance_text = format!("{score_text} {joined}");
            (title, collapse_whitespace(&joined), importance_text)
        }
        OpenItem::Legacy { title, body } => {
            let summary = collapse_whitespace(&body.join(" "));
            let importance_text = summary.clone();
            (title, summary, importance_text)
        }
    };

    if title.is_empty() {
        return None;
    }

    Some(SectionItem {
        keywords: extract_keywords(&title, &summary),
        importance: guess_importance(&importance_text),
        title,
        summary,
        source: None,
        url: None,
    })
}

/// Candidate terms found in `title + " " + summary`, first-hit order, at most eight.
pub fn extract_keywords(title: &str, summary: &str) -> Vec<String> {
    let text = format!("{title} {summary}").to_lowercase();
    let mut hits: Vec<String> = Vec::new();
    for candidate in KEYWORD_CANDIDATES {
        if hits.len() >= MAX_KEYWORDS {
            break;
        }
        if text.contains(&candidate.to_lowercase()) && !hits.iter().any(|h| h == candidate) {
            hits.push(candidate.to_string());
        }
    }
    hits
}

/// 1–5 urgency score: base 2, +2 urgency, +1 momentum, +1 risk.
pub fn guess_importance(text: &str) -> u8 {
    let lower = text.to_lowercase();
    let hit = |terms: &[&str]| terms.iter().any(|t| lower.contains(t));

    let mut score: i32 = 2;
    if hit(URGENCY_TERMS) {
        score += 2;
    }
    if hit(MOMENTUM_TERMS) {
        score += 1;
    }
    if hit(RISK_TERMS) {
        score += 1;
    }
    score.clamp(1, 5) as u8
}

/// Envelope fields that do not come from the markdown itself.
#[derive(Debug, Clone)]
pub struct BridgeEnvelope {
    pub date: String,
    pub generated_at: String,
    pub language: String,
    pub owner: String,
}

pub fn parse_daily_bridge(markdown: &str, envelope: BridgeEnvelope) -> DailyBridgeDocument {
    let mut sections: Vec<Section> = Vec::new();
    let mut state = BridgeState::NoSection;

    for line in scan(markdown, classify) {
        let (next, emission) = transition(state, line);
        state = next;
        apply(&mut sections, emission);
    }
    apply(
        &mut sections,
        Emission {
            item: flush(state),
            section: None,
        },
    );

    DailyBridgeDocument {
        schema_version: BRIDGE_SCHEMA_VERSION.to_string(),
        kind: BRIDGE_KIND.to_string(),
        date: envelope.date,
        generated_at: envelope.generated_at,
        language: envelope.language,
        owner: envelope.owner,
        sections,
    }
}

fn apply(sections: &mut Vec<Section>, emission: Emission) {
    if let Some(item) = emission.item {
        match sections.last_mut() {
            Some(section) => section.items.push(item),
            None => debug!(title = %item.title, "dropping item outside any section"),
        }
    }
    if let Some(section) = emission.section {
        sections.push(section);
    }
}

// ── Tests ──
