//! The Chunk type: a slice of the outline with section metadata.

use serde::Serialize;

/// An ancestor on a chunk's parent path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathEntry {
    /// Canonical number of the ancestor.
    pub number: String,
    /// Heading text of the ancestor. Empty for placeholders.
    pub title: String,
}

/// A contiguous slice of the outline, ready to embed.
///
/// A chunk holds one section with all its descendants, one section's own
/// heading and body, or a piece of an oversized section when splitting is
/// allowed. It never straddles two unrelated sections unless sibling merging
/// was requested.
///
/// ## Text and Length
///
/// `text` is the restored heading followed by body lines, joined with
/// newlines. `char_length` counts user-perceived characters (extended
/// grapheme clusters), the unit `max_chunk_size` is expressed in:
///
/// ```rust
/// use strata::Chunk;
///
/// let chunk = Chunk::new(0, vec!["1".into()], "1 Café", 1);
/// assert_eq!(chunk.char_length, 6);
/// assert!(chunk.len() > chunk.char_length); // bytes
/// ```
///
/// ## Split Sections
///
/// With `preserve_lists = false` an oversized section is cut at line
/// boundaries. Its pieces share `covered_sections` and are told apart by
/// `part_index`, `part_count` and `line_offset`:
///
/// ```text
/// part 0/3  line_offset 0   "3.2 Inventory\n- item one\n- item two"
/// part 1/3  line_offset 3   "- item three\n- item four"
/// part 2/3  line_offset 5   "- item five"
/// ```
///
/// ## Parent Context
///
/// When parent context is enabled, `parent_path` lists the ancestors of the
/// chunk's seed section, root first. It is metadata only and never part of
/// `text`:
///
/// ```text
/// parent_path: [("2", "Requirements"), ("2.3", "Storage")]
/// text:        "2.3.1 Retention\nRecords are kept for five years."
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    /// Zero-based emission index.
    pub id: usize,
    /// Canonical numbers of the sections whose content is included, in
    /// document order. Empty for the preamble chunk.
    pub covered_sections: Vec<String>,
    /// Restored headings and body lines.
    pub text: String,
    /// The target level this chunk was generated for.
    pub level: usize,
    /// Ancestors of the seed section, root first. `None` unless parent
    /// context was requested.
    pub parent_path: Option<Vec<PathEntry>>,
    /// Length of `text` in user-perceived characters.
    pub char_length: usize,
    /// Number of Unicode words in `text`.
    pub word_count: usize,
    /// The chunk holds its seed section together with every descendant.
    pub is_complete_section: bool,
    /// The chunk contains bulleted list items.
    pub contains_lists: bool,
    /// Position of this piece among the pieces its section was split into.
    pub part_index: usize,
    /// Number of pieces the section was split into, 1 when it was not split.
    pub part_count: usize,
    /// Index of this piece's first line within the section's own lines
    /// (heading first).
    pub line_offset: usize,
}

impl Chunk {
    /// Create a chunk, measuring `text`.
    #[must_use]
    pub fn new(id: usize, covered_sections: Vec<String>, text: impl Into<String>, level: usize) -> Self {
        let text = text.into();
        Self {
            id,
            covered_sections,
            char_length: crate::chunker::measure(&text),
            word_count: crate::chunker::count_words(&text),
            contains_lists: text.lines().any(crate::line::is_bullet),
            text,
            level,
            parent_path: None,
            is_complete_section: true,
            part_index: 0,
            part_count: 1,
            line_offset: 0,
        }
    }

    /// The length of this chunk in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Whether this chunk is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Whether this chunk is one piece of a section split at line
    /// boundaries.
    #[must_use]
    pub fn is_part(&self) -> bool {
        self.part_count > 1
    }

    /// The first section covered, if any.
    #[must_use]
    pub fn section_number(&self) -> Option<&str> {
        self.covered_sections.first().map(String::as_str)
    }
}

impl std::fmt::Display for Chunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Chunk {{ id: {}, sections: [{}], level: {}, chars: {} }}",
            self.id,
            self.covered_sections.join(", "),
            self.level,
            self.char_length
        )
    }
}
