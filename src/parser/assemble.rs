use serde_json::Map;
use tracing::debug;

use super::dedup::fingerprint;
use super::fields::{
    extract_url, inline_tags, normalize_date, parse_score, parse_summary, parse_tags, web_citation,
};
use super::lines::{strip_bullet, strip_bullets, Line};
use super::category;
use crate::model::{Category, NormalizedItem};

/// Field values gathered for one record before its category is attached.
#[derive(Debug, Default)]
pub struct ItemDraft {
    pub title: String,
    pub source: String,
    pub url: Option<String>,
    pub published_at: Option<String>,
    pub summary: String,
    pub highlights: Vec<String>,
    pub tags: Vec<String>,
    pub score: Option<f64>,
}

impl ItemDraft {
    /// Seal the draft into a record. Drafts without a title are dropped.
    pub fn finish(self, category: Category) -> Option<NormalizedItem> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            debug!(%category, "dropping record without title");
            return None;
        }
        let source = self.source.trim().to_string();
        Some(NormalizedItem {
            id: fingerprint(category, &title, self.url.as_deref(), &source),
            category,
            title,
            source,
            url: self.url,
            published_at: self.published_at,
            summary: self.summary,
            highlights: self.highlights,
            tags: self.tags,
            score: self.score,
            extra: Map::new(),
        })
    }
}

/// Numbered item under construction: its bold title and the bullet lines
/// that followed it.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingItem {
    pub title: String,
    pub continuations: Vec<String>,
}

/// Assembler state between two lines of the text dialects.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct NewsState {
    pub category: Option<Category>,
    pub in_numbered_list: bool,
    pub pending: Option<PendingItem>,
}

impl NewsState {
    /// Take the buffered item and turn it into a record under the current category.
    fn flush(&mut self) -> Option<NormalizedItem> {
        let pending = self.pending.take()?;
        match self.category {
            Some(category) => assemble_numbered(pending, category),
            None => {
                debug!(title = %pending.title, "dropping buffered item without category");
                None
            }
        }
    }

    fn enter_heading(&mut self, heading: &str) {
        if let Some(category) = category::resolve(heading) {
            debug!(%category, heading, "entering numbered list");
            self.category = Some(category);
            self.in_numbered_list = true;
        }
    }

    /// End of input.
    pub fn finish(mut self) -> Option<NormalizedItem> {
        self.flush()
    }
}

/// One transition of the text-dialect state machine. Arms are tried top to
/// bottom; the first arm whose guard holds handles the line.
pub fn step(mut state: NewsState, line: &Line<'_>) -> (NewsState, Option<NormalizedItem>) {
    match line {
        Line::Blank => {
            let emitted = state.flush();
            state.in_numbered_list = false;
            (state, emitted)
        }

        Line::CategoryTag(token) => {
            let emitted = state.flush();
            state.category = Category::from_key(token);
            if state.category.is_none() {
                debug!(token = token.as_str(), "unrecognized category tag");
            }
            state.in_numbered_list = false;
            (state, emitted)
        }

        Line::CountedHeading(heading) => {
            let emitted = state.flush();
            state.enter_heading(heading);
            (state, emitted)
        }

        Line::Heading(heading) if state.category.is_none() => {
            let emitted = state.flush();
            state.enter_heading(heading);
            (state, emitted)
        }

        Line::Numbered(title) if state.in_numbered_list && state.category.is_some() => {
            let emitted = state.flush();
            state.pending = Some(PendingItem {
                title: title.trim().to_string(),
                continuations: Vec::new(),
            });
            (state, emitted)
        }

        Line::Bullet(raw) if state.pending.is_some() => {
            if let Some(pending) = state.pending.as_mut() {
                pending.continuations.push(raw.to_string());
            }
            (state, None)
        }

        Line::Bullet(raw) => match state.category {
            Some(category) => {
                let emitted = parse_bullet(strip_bullets(raw), category);
                (state, emitted)
            }
            None => (state, None),
        },

        _ => (state, None),
    }
}

/// Legacy pipe-delimited bullet body:
/// `title | source | url | date | score=… | tags=… | summary=…`.
///
/// Fields after the url are matched against date, score, tags and summary in
/// that order; each slot takes the first field that fits and is never
/// overwritten.
pub fn parse_bullet(body: &str, category: Category) -> Option<NormalizedItem> {
    let parts: Vec<&str> = body
        .split('|')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    let mut draft = ItemDraft {
        title: parts.first().map(|s| s.to_string()).unwrap_or_default(),
        source: parts.get(1).map(|s| s.to_string()).unwrap_or_default(),
        url: parts.get(2).and_then(|p| extract_url(p)),
        ..ItemDraft::default()
    };

    let mut tags: Option<Vec<String>> = None;
    let mut summary: Option<String> = None;

    for field in parts.iter().skip(3) {
        if draft.published_at.is_none() {
            if let Some(date) = normalize_date(field) {
                draft.published_at = Some(date);
                continue;
            }
        }
        if draft.score.is_none() {
            if let Some(score) = parse_score(field) {
                draft.score = Some(score);
                continue;
            }
        }
        if tags.is_none() {
            if let Some(t) = parse_tags(field) {
                tags = Some(t);
                continue;
            }
        }
        if summary.is_none() {
            if let Some(s) = parse_summary(field) {
                summary = Some(s);
            }
        }
    }

    if draft.url.is_none() {
        draft.url = extract_url(body);
    }
    draft.tags = tags.unwrap_or_default();
    draft.summary = summary.unwrap_or_default();

    draft.finish(category)
}

/// Numbered item: first continuation is the summary, the rest are highlights.
pub fn assemble_numbered(pending: PendingItem, category: Category) -> Option<NormalizedItem> {
    let mut draft = ItemDraft {
        title: pending.title,
        ..ItemDraft::default()
    };

    for raw in &pending.continuations {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let content = strip_bullet(line);

        if draft.source.is_empty() {
            if let Some(citation) = web_citation(content) {
                draft.source = citation;
            }
        }
        if draft.url.is_none() {
            draft.url = extract_url(content);
        }

        if draft.summary.is_empty() {
            draft.summary = content.to_string();
        } else {
            draft.highlights.push(content.to_string());
        }
    }

    draft.tags = inline_tags(&draft.summary);
    draft.finish(category)
}
