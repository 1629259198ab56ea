//! Property-based tests for hierarchy reconstruction and chunking.
//!
//! These tests verify the invariants every outline and chunk sequence holds:
//! - Depth: every child sits exactly one level below its parent
//! - Ordering: sibling numbers strictly increase in document order
//! - Conservation: chunk texts concatenate to the restored document
//! - Bounds: only one section's own text may exceed `max_chunk_size`
//! - Determinism: same input, same output

use proptest::prelude::*;
use strata::{Chunk, Chunker, ChunkingConfig, HierarchyParser, Outline, SemanticChunker};

// =============================================================================
// Test Generators
// =============================================================================

/// A well-formed indented document together with the outline it encodes.
#[derive(Debug, Clone)]
struct Document {
    text: String,
    /// Canonical number of each heading, in document order.
    numbers: Vec<String>,
    /// The restored rendering: `"<number> <title>"` followed by body lines.
    rendered: String,
}

/// Generate headings as `(depth step, title, body lines)` and lay them out
/// with four columns of indentation per level and `N)` markers.
fn numbered_document() -> impl Strategy<Value = Document> {
    let heading = (
        0u8..6,
        "[A-Z][a-z]{2,10}",
        prop::collection::vec("[a-z]{1,8}( [a-z]{1,8}){0,8}", 0..3),
    );
    prop::collection::vec(heading, 1..30).prop_map(|headings| {
        let mut lines = Vec::new();
        let mut rendered = Vec::new();
        let mut numbers = Vec::new();
        let mut counters: Vec<u32> = Vec::new();

        for (step, title, body) in headings {
            // Stay, climb out, or go one deeper, capped at depth 4.
            let max_depth = (counters.len() + 1).min(4);
            let depth = if counters.is_empty() {
                1
            } else {
                (usize::from(step) % max_depth) + 1
            };
            counters.truncate(depth);
            if counters.len() < depth {
                counters.push(1);
            } else {
                counters[depth - 1] += 1;
            }

            let indent = "    ".repeat(depth - 1);
            let number = counters.iter().map(u32::to_string).collect::<Vec<_>>().join(".");
            lines.push(format!("{indent}{}) {title}", counters[depth - 1]));
            rendered.push(format!("{number} {title}"));
            for line in body {
                lines.push(format!("{indent}    {line}"));
                rendered.push(line);
            }
            numbers.push(number);
        }

        Document {
            text: lines.join("\n"),
            numbers,
            rendered: rendered.join("\n"),
        }
    })
}

/// Loosely structured text: random indentation, stray markers, blank lines.
fn messy_text() -> impl Strategy<Value = String> {
    let line = "[ \t]{0,9}((1?[0-9]|[a-d]|[ivx]{1,3})[.)] |[1-3]\\.[1-3](\\.[1-3])? |- )?[a-z ]{0,24}";
    prop::collection::vec(line, 0..40).prop_map(|lines| lines.join("\n"))
}

fn config() -> impl Strategy<Value = ChunkingConfig> {
    (1usize..5, 10usize..400, any::<bool>(), any::<bool>()).prop_map(|(level, size, lists, merge)| {
        ChunkingConfig::new(level, size)
            .with_preserve_lists(lists)
            .with_merge_siblings(merge)
    })
}

// =============================================================================
// Invariant Helpers
// =============================================================================

/// Every non-root node is one level below its parent.
fn depth_invariant_holds(outline: &Outline) -> bool {
    outline.iter().all(|node| match outline.parent(node) {
        Some(parent) => node.level == parent.level + 1,
        None => node.level == 1,
    })
}

fn last_segment(number: &str) -> u32 {
    number.rsplit('.').next().and_then(|s| s.parse().ok()).unwrap_or(0)
}

/// Sibling numbers increase strictly at their shared depth.
fn siblings_ordered(outline: &Outline) -> bool {
    let roots: Vec<u32> = outline.roots().map(|n| last_segment(&n.number)).collect();
    roots.windows(2).all(|w| w[0] < w[1])
        && outline.iter().all(|node| {
            let children: Vec<u32> = outline.children(node).map(|n| last_segment(&n.number)).collect();
            children.windows(2).all(|w| w[0] < w[1])
        })
}

/// Every number names exactly one section, and lookups find that section.
fn numbers_unique(outline: &Outline) -> bool {
    let mut seen = std::collections::HashSet::new();
    outline.iter().all(|node| {
        seen.insert(node.number.as_str()) && outline.find(&node.number).map(|n| n.id) == Some(node.id)
    })
}

fn joined(chunks: &[Chunk]) -> String {
    chunks.iter().map(|c| c.text.as_str()).collect::<Vec<_>>().join("\n")
}

/// Oversized chunks hold the preamble, a whole leaf, or an internal
/// section's own text. Never a whole subtree.
fn size_bound_holds(outline: &Outline, chunks: &[Chunk], max: usize) -> bool {
    chunks.iter().all(|c| {
        if c.char_length <= max {
            return true;
        }
        match c.covered_sections.as_slice() {
            [] => true,
            [number] => outline
                .find(number)
                .is_some_and(|node| node.is_leaf() || !c.is_complete_section),
            _ => false,
        }
    })
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn restores_generated_numbering(doc in numbered_document()) {
        let outline = HierarchyParser::default().parse(&doc.text);
        let numbers: Vec<String> = outline.iter().map(|n| n.number.clone()).collect();
        prop_assert_eq!(numbers, doc.numbers);
        prop_assert!(outline.diagnostics().is_clean());
        prop_assert_eq!(outline.render(), doc.rendered);
    }

    #[test]
    fn generated_outline_invariants(doc in numbered_document()) {
        let outline = HierarchyParser::default().parse(&doc.text);
        prop_assert!(depth_invariant_holds(&outline));
        prop_assert!(siblings_ordered(&outline));
        prop_assert!(numbers_unique(&outline));
    }

    #[test]
    fn messy_outline_invariants(text in messy_text()) {
        let outline = HierarchyParser::default().parse(&text);
        prop_assert!(depth_invariant_holds(&outline));
        prop_assert!(siblings_ordered(&outline));
        prop_assert!(numbers_unique(&outline));
        prop_assert_eq!(outline.diagnostics().fell_back_to_flat, outline.iter().all(|n| n.kind == strata::SectionKind::Flat) && !outline.is_empty());
    }

    #[test]
    fn chunks_conserve_content(doc in numbered_document(), config in config()) {
        let chunker = SemanticChunker::new(config).unwrap();
        let chunks = chunker.chunk(&doc.text);
        prop_assert_eq!(joined(&chunks), doc.rendered);
    }

    #[test]
    fn messy_chunks_conserve_content(text in messy_text(), config in config()) {
        let parser = HierarchyParser::new(config.clone()).unwrap();
        let outline = parser.parse(&text);
        let chunks = SemanticChunker::new(config).unwrap().chunk_outline(&outline);
        prop_assert_eq!(joined(&chunks), outline.render());
    }

    #[test]
    fn chunks_respect_size_bound(text in messy_text(), config in config()) {
        let max = config.max_chunk_size;
        let outline = HierarchyParser::new(config.clone()).unwrap().parse(&text);
        let chunks = SemanticChunker::new(config).unwrap().chunk_outline(&outline);
        prop_assert!(size_bound_holds(&outline, &chunks, max));
    }

    #[test]
    fn generated_chunks_respect_size_bound(doc in numbered_document(), config in config()) {
        let max = config.max_chunk_size;
        let outline = HierarchyParser::new(config.clone()).unwrap().parse(&doc.text);
        let chunks = SemanticChunker::new(config).unwrap().chunk_outline(&outline);
        prop_assert!(size_bound_holds(&outline, &chunks, max));
    }

    #[test]
    fn split_parts_are_numbered(text in messy_text(), size in 10usize..60) {
        let config = ChunkingConfig::new(1, size).with_preserve_lists(false);
        let chunks = SemanticChunker::new(config).unwrap().chunk(&text);
        let mut i = 0;
        while i < chunks.len() {
            let count = chunks[i].part_count;
            prop_assert!(count >= 1 && i + count <= chunks.len());
            for (part, chunk) in chunks[i..i + count].iter().enumerate() {
                prop_assert_eq!(chunk.part_index, part);
                prop_assert_eq!(chunk.part_count, count);
                prop_assert_eq!(&chunk.covered_sections, &chunks[i].covered_sections);
            }
            i += count;
        }
    }

    #[test]
    fn chunk_ids_are_sequential(doc in numbered_document(), config in config()) {
        let chunks = SemanticChunker::new(config).unwrap().chunk(&doc.text);
        for (i, chunk) in chunks.iter().enumerate() {
            prop_assert_eq!(chunk.id, i);
            prop_assert!(!chunk.is_empty());
        }
    }

    #[test]
    fn chunking_is_deterministic(text in messy_text(), config in config()) {
        let chunker = SemanticChunker::new(config).unwrap();
        prop_assert_eq!(chunker.chunk(&text), chunker.chunk(&text));
    }

    #[test]
    fn sections_by_level_matches_walk(doc in numbered_document(), level in 1usize..6) {
        let parser = HierarchyParser::default();
        let outline = parser.parse(&doc.text);
        let expected: Vec<String> = outline
            .iter()
            .filter(|n| n.level == level)
            .map(|n| n.number.clone())
            .collect();
        let found: Vec<String> = parser
            .sections_by_level(&doc.text, level)
            .into_iter()
            .map(|n| n.number)
            .collect();
        prop_assert_eq!(found, expected);
    }
}
