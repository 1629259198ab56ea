//! Section-aware chunking.
//!
//! ## The Algorithm
//!
//! Given an outline and a target level, walk the tree in pre-order:
//!
//! ```text
//! 1 Requirements            level 1 < target: emit own text, descend
//! ├── 1.1 Storage           level 2 = target: seed
//! │   ├── 1.1.1 Retention       fits? -> one chunk for 1.1 and all below
//! │   └── 1.1.2 Deletion
//! └── 1.2 Access            level 2 = target: seed
//!     ├── 1.2.1 Roles           too big? -> emit "1.2 Access" alone,
//!     └── 1.2.2 Audit              then treat 1.2.1 and 1.2.2 as seeds
//! ```
//!
//! 1. A node at the target level, or a leaf above it, is a *seed*.
//! 2. A seed whose whole subtree fits `max_chunk_size` becomes one chunk.
//! 3. A seed that does not fit emits its own heading and body, then each
//!    child is tried as a seed one level deeper.
//! 4. A leaf that still does not fit is emitted whole. It is an *atomic
//!    section*: splitting it would cut a list or a clause in half. With
//!    `preserve_lists = false` it is split at line boundaries instead.
//! 5. Internal nodes above the target level emit their own heading and body
//!    so that no text is lost.
//!
//! ## Guarantees
//!
//! - Chunks come out in document order; concatenating their text with
//!   newlines reproduces [`Outline::render`] exactly.
//! - Two kinds of chunk may exceed the bound, both holding one section's
//!   text: an oversized leaf emitted whole (step 4), and the own heading and
//!   body of an internal node emitted before descending (step 3). Neither
//!   happens when `preserve_lists = false`, except for a single line longer
//!   than the bound.
//! - Same input, same config, same chunks.
//!
//! ## Merging
//!
//! By default every seed is its own chunk, even when two neighbours would fit
//! together. With `merge_siblings` adjacent complete chunks under the same
//! parent are packed greedily while they stay within the bound.

use unicode_segmentation::UnicodeSegmentation;

use crate::chunk::{Chunk, PathEntry};
use crate::config::ChunkingConfig;
use crate::outline::{Outline, SectionId, SectionKind};
use crate::parser::HierarchyParser;
use crate::{Chunker, Result};

/// Length in user-perceived characters.
pub(crate) fn measure(text: &str) -> usize {
    text.graphemes(true).count()
}

pub(crate) fn count_words(text: &str) -> usize {
    text.unicode_words().count()
}

/// Hierarchical chunker over reconstructed outlines.
///
/// ## Example
///
/// ```rust
/// use strata::{Chunker, ChunkingConfig, SemanticChunker};
///
/// let text = "1) Intro\n\ttext A\n2) Body\n\t1) Sub one\n\t\ttext B\n\t2) Sub two\n3) End";
/// let chunker = SemanticChunker::new(ChunkingConfig::new(2, 1000)).unwrap();
/// let chunks = chunker.chunk(text);
///
/// let covered: Vec<Vec<String>> = chunks.iter().map(|c| c.covered_sections.clone()).collect();
/// assert_eq!(covered, [vec!["1"], vec!["2"], vec!["2.1"], vec!["2.2"], vec!["3"]]);
/// assert_eq!(chunks[2].text, "2.1 Sub one\ntext B");
/// ```
#[derive(Debug, Clone)]
pub struct SemanticChunker {
    config: ChunkingConfig,
    parser: HierarchyParser,
}

impl SemanticChunker {
    /// Create a chunker.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` fails validation.
    pub fn new(config: ChunkingConfig) -> Result<Self> {
        let parser = HierarchyParser::new(config.clone())?;
        Ok(Self { config, parser })
    }

    /// The configuration this chunker was built with.
    #[must_use]
    pub fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    /// The parser [`Chunker::chunk`] runs before chunking.
    #[must_use]
    pub fn parser(&self) -> &HierarchyParser {
        &self.parser
    }

    /// Chunk an already parsed outline.
    #[must_use]
    pub fn chunk_outline(&self, outline: &Outline) -> Vec<Chunk> {
        let mut walk = Walk {
            outline,
            config: &self.config,
            drafts: Vec::new(),
        };

        if !outline.preamble().is_empty() {
            walk.emit_lines(outline.preamble().to_vec(), None, Vec::new(), true);
        }
        for root in outline.roots() {
            walk.visit(root.id);
        }

        let mut drafts = walk.drafts;
        if self.config.merge_siblings {
            drafts = self.merge_siblings(outline, drafts);
        }

        drafts
            .into_iter()
            .enumerate()
            .map(|(id, draft)| self.finish(outline, id, draft))
            .collect()
    }

    fn merge_siblings(&self, outline: &Outline, drafts: Vec<Draft>) -> Vec<Draft> {
        let mut merged: Vec<Draft> = Vec::with_capacity(drafts.len());
        for draft in drafts {
            if let Some(last) = merged.last_mut() {
                let siblings = match (last.seed, draft.seed) {
                    (Some(a), Some(b)) => outline[a].parent == outline[b].parent,
                    _ => false,
                };
                if siblings
                    && last.complete
                    && draft.complete
                    && !self.config.would_overflow(last.length, draft.length + 1)
                {
                    last.text.push('\n');
                    last.text.push_str(&draft.text);
                    last.length += draft.length + 1;
                    last.sections.extend(draft.sections);
                    continue;
                }
            }
            merged.push(draft);
        }
        merged
    }

    fn finish(&self, outline: &Outline, id: usize, draft: Draft) -> Chunk {
        let parent_path = self.config.include_parent_context.then(|| {
            draft
                .seed
                .map(|seed| {
                    outline
                        .ancestors(&outline[seed])
                        .into_iter()
                        .map(|node| PathEntry {
                            number: node.number.clone(),
                            title: node.title.clone(),
                        })
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default()
        });

        let mut chunk = Chunk::new(id, draft.sections, draft.text, self.config.target_level);
        chunk.parent_path = parent_path;
        chunk.is_complete_section = draft.complete;
        chunk.part_index = draft.part_index;
        chunk.part_count = draft.part_count;
        chunk.line_offset = draft.line_offset;
        chunk
    }
}

impl Chunker for SemanticChunker {
    fn chunk(&self, text: &str) -> Vec<Chunk> {
        self.chunk_outline(&self.parser.parse(text))
    }

    fn estimate_chunks(&self, text_len: usize) -> usize {
        (text_len / self.config.max_chunk_size).max(1)
    }
}

/// A chunk before ids and parent paths are assigned.
#[derive(Debug)]
struct Draft {
    text: String,
    length: usize,
    sections: Vec<String>,
    seed: Option<SectionId>,
    complete: bool,
    part_index: usize,
    part_count: usize,
    line_offset: usize,
}

impl Draft {
    fn whole(text: String, length: usize, sections: Vec<String>, seed: Option<SectionId>, complete: bool) -> Self {
        Self {
            text,
            length,
            sections,
            seed,
            complete,
            part_index: 0,
            part_count: 1,
            line_offset: 0,
        }
    }
}

struct Walk<'a> {
    outline: &'a Outline,
    config: &'a ChunkingConfig,
    drafts: Vec<Draft>,
}

impl Walk<'_> {
    fn visit(&mut self, id: SectionId) {
        let outline = self.outline;
        let node = &outline[id];

        if node.level >= self.config.target_level || node.is_leaf() {
            let subtree = outline.subtree(id);
            let lines: Vec<String> = subtree.iter().flat_map(|n| n.own_lines()).collect();
            let text = lines.join("\n");
            let length = measure(&text);

            if self.config.fits(length) {
                let sections = subtree
                    .iter()
                    .filter(|n| n.kind != SectionKind::Placeholder)
                    .map(|n| n.number.clone())
                    .collect();
                self.drafts.push(Draft::whole(text, length, sections, Some(id), true));
                return;
            }
            if node.is_leaf() {
                tracing::debug!(section = %node.number, length, max = self.config.max_chunk_size, "atomic section exceeds chunk size");
                self.emit_lines(lines, Some(id), vec![node.number.clone()], true);
                return;
            }
        }

        self.emit_own(id);
        for &child in &node.children {
            self.visit(child);
        }
    }

    /// A node's heading and body without its descendants.
    fn emit_own(&mut self, id: SectionId) {
        let node = &self.outline[id];
        let number = node.number.clone();
        let lines = node.own_lines();
        if lines.is_empty() {
            return;
        }
        self.emit_lines(lines, Some(id), vec![number], false);
    }

    /// Emit one section's lines, split at line boundaries only when the text
    /// is too long and splitting is allowed.
    fn emit_lines(&mut self, lines: Vec<String>, seed: Option<SectionId>, sections: Vec<String>, complete: bool) {
        let text = lines.join("\n");
        let length = measure(&text);
        if self.config.fits(length) || self.config.preserve_lists {
            self.drafts.push(Draft::whole(text, length, sections, seed, complete));
            return;
        }

        let pieces = self.split(&lines);
        let part_count = pieces.len();
        for (part_index, piece) in pieces.into_iter().enumerate() {
            self.drafts.push(Draft {
                text: piece.text,
                length: piece.length,
                sections: sections.clone(),
                seed,
                complete: complete && part_count == 1,
                part_index,
                part_count,
                line_offset: piece.line_offset,
            });
        }
    }

    /// Greedy line packing. A single line longer than the bound stays whole.
    fn split(&self, lines: &[String]) -> Vec<Piece> {
        let mut pieces = Vec::new();
        let mut start = 0;
        let mut current_len = 0;

        for (i, line) in lines.iter().enumerate() {
            let len = measure(line);
            if i > start && self.config.would_overflow(current_len, len + 1) {
                pieces.push(Piece::new(&lines[start..i], current_len, start));
                start = i;
                current_len = 0;
            }
            current_len += if i == start { len } else { len + 1 };
        }
        if start < lines.len() {
            pieces.push(Piece::new(&lines[start..], current_len, start));
        }
        pieces
    }
}

/// A run of whole lines cut from one section.
struct Piece {
    text: String,
    length: usize,
    line_offset: usize,
}

impl Piece {
    fn new(lines: &[String], length: usize, line_offset: usize) -> Self {
        Self {
            text: lines.join("\n"),
            length,
            line_offset,
        }
    }
}
