use std::sync::LazyLock;

use regex::Regex;

static CATEGORY_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\[CATEGORY:\s*([a-z0-9_]+)\s*\]$").unwrap());
static COUNTED_HEADING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^#+\s*.*\([0-9]+\)\s*$").unwrap());
static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^#+\s+").unwrap());
static NUMBERED_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\.\s*\*\*(.+?)\*\*").unwrap());

/// Pattern class of one trimmed line. Whether a class actually does anything
/// depends on the assembler state; see `assemble::step`.
#[derive(Debug, Clone, PartialEq)]
pub enum Line<'a> {
    Blank,
    /// `[CATEGORY: token]`, token lowercased.
    CategoryTag(String),
    /// Markdown heading ending in a parenthesized count: `## 🦠 Listeria Free (4)`.
    CountedHeading(&'a str),
    Heading(&'a str),
    /// `1. **Title** trailing` — carries the bold title.
    Numbered(&'a str),
    /// Starts with `-` or `•`; the raw trimmed line.
    Bullet(&'a str),
    Other,
}

/// Lazily split `text` into trimmed lines and classify each one.
pub fn scan<'a, T: 'a>(text: &'a str, classify: fn(&'a str) -> T) -> impl Iterator<Item = T> + 'a {
    text.lines().map(str::trim).map(classify)
}

pub fn classify_lines(text: &str) -> impl Iterator<Item = Line<'_>> {
    scan(text, classify)
}

pub fn classify(line: &str) -> Line<'_> {
    if line.is_empty() {
        return Line::Blank;
    }

    // ── [CATEGORY: xxx] ──
    if let Some(caps) = CATEGORY_TAG_RE.captures(line) {
        return Line::CategoryTag(caps[1].to_lowercase());
    }

    // ── Headings: counted first, then any other ──
    if COUNTED_HEADING_RE.is_match(line) {
        return Line::CountedHeading(line);
    }
    if HEADING_RE.is_match(line) {
        return Line::Heading(line);
    }

    // ── Numbered entry with a bold title ──
    if let Some(caps) = NUMBERED_RE.captures(line) {
        if let Some(title) = caps.get(1) {
            return Line::Numbered(title.as_str());
        }
    }

    if is_bullet(line) {
        return Line::Bullet(line);
    }

    Line::Other
}

pub fn is_bullet(line: &str) -> bool {
    line.starts_with('-') || line.starts_with('•')
}

/// Drop every leading bullet glyph and the whitespace after them.
pub fn strip_bullets(line: &str) -> &str {
    line.trim_start_matches(['-', '•']).trim_start()
}

/// Drop a single leading bullet glyph and the whitespace after it.
pub fn strip_bullet(line: &str) -> &str {
    line.strip_prefix('-')
        .or_else(|| line.strip_prefix('•'))
        .unwrap_or(line)
        .trim_start()
}
