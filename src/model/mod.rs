// src/model/mod.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// One styled run of text inside a paragraph.
///
/// Every attribute is independently optional: `None` means the run inherits
/// the document default. Raw OOXML values are kept as-is (`font_size` in
/// half-points, `underline`/`color`/`alignment` as their `w:val` strings) so
/// that what we read is exactly what we can write back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyledRun {
    pub text: String,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    /// Raw `w:u` value, e.g. "single", "double", "none".
    pub underline: Option<String>,
    /// ASCII font family from `w:rFonts`.
    pub font_name: Option<String>,
    /// `w:sz` value in half-points (13 pt == 26).
    pub font_size: Option<u32>,
    /// RGB hex string from `w:color`, e.g. "FF0000".
    pub color: Option<String>,
}

/// Paragraph-level formatting captured from `w:pPr`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParagraphFormat {
    /// `w:jc` value, e.g. "center", "both".
    pub alignment: Option<String>,
    /// `w:spacing w:line` value (240 == single spacing).
    pub line_spacing: Option<u32>,
    /// `w:spacing w:lineRule` value, e.g. "auto", "exact".
    pub line_rule: Option<String>,
    /// `w:spacing w:before` in twips.
    pub space_before: Option<u32>,
    /// `w:spacing w:after` in twips.
    pub space_after: Option<u32>,
}

/// A source paragraph as read from the bank document, before any item
/// grouping has happened.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawBlock {
    pub runs: Vec<StyledRun>,
    pub format: ParagraphFormat,
}

impl RawBlock {
    /// Concatenated text of all runs, the way the paragraph reads.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// A paragraph of styled text belonging to an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    pub runs: Vec<StyledRun>,
    pub format: ParagraphFormat,
}

/// A reference to an image file on disk, taken from an `[IMAGE: <path>]`
/// marker paragraph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageBlock {
    pub path: String,
}

/// One piece of item content, immutable once parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text(TextBlock),
    Image(ImageBlock),
}

/// The classification tags carried by an item's boundary marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemTags {
    pub topic: String,
    pub difficulty: String,
    pub code: String,
}

/// One extracted question: its tags plus ordered content blocks.
///
/// Two items are never considered equal by tag content alone; selection
/// tracks identity by index into the parsed list, not by value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub tags: ItemTags,
    pub blocks: Vec<ContentBlock>,
}

/// One line of the test matrix: a partial tag filter plus a required draw
/// count. `None` keys are wildcards; present keys must match exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuotaCondition {
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    pub count: usize,
}

impl QuotaCondition {
    /// Whether an item's tags satisfy this condition's filter keys.
    pub fn matches(&self, tags: &ItemTags) -> bool {
        self.topic.as_deref().map_or(true, |v| v == tags.topic)
            && self.difficulty.as_deref().map_or(true, |v| v == tags.difficulty)
            && self.code.as_deref().map_or(true, |v| v == tags.code)
    }
}

impl fmt::Display for QuotaCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        if let Some(topic) = &self.topic {
            write!(f, " topic: \"{}\",", topic)?;
        }
        if let Some(difficulty) = &self.difficulty {
            write!(f, " difficulty: \"{}\",", difficulty)?;
        }
        if let Some(code) = &self.code {
            write!(f, " code: \"{}\",", code)?;
        }
        write!(f, " count: {} }}", self.count)
    }
}
