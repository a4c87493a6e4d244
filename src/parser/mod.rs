pub mod assemble;
pub mod bridge;
pub mod category;
pub mod dedup;
pub mod fields;
pub mod json_input;
pub mod lines;

use std::path::Path;

use crate::error::{IngestError, Result};
use crate::model::{DailyBridgeDocument, NormalizedItem};
use assemble::NewsState;
use bridge::BridgeEnvelope;

pub use json_input::normalize_json;

/// Shorter trimmed input than this is treated as no input at all.
const MIN_BRIDGE_INPUT_CHARS: usize = 10;

/// Text dialects: lines → classes → state machine → records → dedup.
pub fn normalize_text(text: &str) -> Vec<NormalizedItem> {
    let mut state = NewsState::default();
    let mut items = Vec::new();

    for line in lines::classify_lines(text) {
        let (next, emitted) = assemble::step(state, &line);
        state = next;
        items.extend(emitted);
    }
    items.extend(state.finish());

    dedup::dedup(items)
}

/// Pick the dialect from the file name: `.json` is JSON, anything else text.
pub fn normalize_input(raw: &str, path: &Path) -> Result<Vec<NormalizedItem>> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if is_json {
        normalize_json(raw)
    } else {
        Ok(normalize_text(raw))
    }
}

pub fn daily_bridge(markdown: &str, envelope: BridgeEnvelope) -> Result<DailyBridgeDocument> {
    if markdown.trim().chars().count() < MIN_BRIDGE_INPUT_CHARS {
        return Err(IngestError::NoInput);
    }
    Ok(bridge::parse_daily_bridge(markdown, envelope))
}
