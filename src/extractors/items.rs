// src/extractors/items.rs

// --- Imports ---
use crate::model::{ContentBlock, ImageBlock, Item, ItemTags, RawBlock, TextBlock};
use once_cell::sync::Lazy;
use regex::Regex;

// --- Regex Patterns (Lazy Static) ---
// Any bracket-delimited tag: [Polymer], [B], [P01], ...
static TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]").expect("Failed to compile TAG_RE"));

// Image reference marker: [IMAGE: relative/or/absolute/path.png]
static IMAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[IMAGE:\s*(.*?)\]").expect("Failed to compile IMAGE_RE"));

/// Minimum number of bracket tags that makes a block an item boundary.
/// A boundary looks like `[12][Polymer][B][P01]`: sequence number, topic,
/// difficulty, code. The leading sequence number is parsed but discarded.
const BOUNDARY_TAG_COUNT: usize = 4;

/// Parser state: either looking for the first/next boundary, or collecting
/// content into the item the last boundary opened.
#[derive(Debug)]
enum ParserState {
    Scanning,
    Accumulating(Item),
}

/// Walks the flat paragraph sequence of a question bank and groups it into
/// tagged items.
pub struct ItemExtractor;

impl ItemExtractor {
    pub fn new() -> Self {
        Self {}
    }

    /// Groups raw paragraphs into items.
    ///
    /// Parsing is permissive by design: a block with fewer than four tags is
    /// never a boundary (it is ordinary content), a malformed image marker is
    /// kept as plain text, and anything before the first boundary is dropped
    /// silently.
    pub fn parse(&self, blocks: Vec<RawBlock>) -> Vec<Item> {
        let mut items = Vec::new();
        let mut state = ParserState::Scanning;

        for block in blocks {
            let text = block.text();
            let text = text.trim();
            if text.is_empty() {
                continue;
            }

            let tags: Vec<&str> = TAG_RE
                .captures_iter(text)
                .filter_map(|c| c.get(1).map(|m| m.as_str()))
                .collect();

            if tags.len() >= BOUNDARY_TAG_COUNT {
                // Boundary marker: close out the running item and open a new
                // one. The boundary block's own content belongs to no item.
                if let ParserState::Accumulating(item) =
                    std::mem::replace(&mut state, ParserState::Scanning)
                {
                    items.push(item);
                }
                tracing::debug!(
                    "Boundary found: topic='{}' difficulty='{}' code='{}'",
                    tags[1],
                    tags[2],
                    tags[3]
                );
                state = ParserState::Accumulating(Item {
                    tags: ItemTags {
                        topic: tags[1].to_string(),
                        difficulty: tags[2].to_string(),
                        code: tags[3].to_string(),
                    },
                    blocks: Vec::new(),
                });
                continue;
            }

            let ParserState::Accumulating(current) = &mut state else {
                // Content before the first boundary belongs to no item.
                continue;
            };

            if text.starts_with("[IMAGE:") {
                if let Some(caps) = IMAGE_RE.captures(text) {
                    let path = caps
                        .get(1)
                        .map(|m| m.as_str().trim().to_string())
                        .unwrap_or_default();
                    current.blocks.push(ContentBlock::Image(ImageBlock { path }));
                    continue;
                }
                // No closing bracket: fall through and keep it as text.
            }

            current.blocks.push(ContentBlock::Text(TextBlock {
                runs: block.runs,
                format: block.format,
            }));
        }

        if let ParserState::Accumulating(item) = state {
            items.push(item);
        }

        tracing::info!("Finished reading bank: {} questions extracted", items.len());
        items
    }
}

impl Default for ItemExtractor {
    fn default() -> Self {
        Self::new()
    }
}
