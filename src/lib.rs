//! # strata
//!
//! Hierarchy reconstruction and section-aware chunking for numbered documents.
//!
//! ## The Problem
//!
//! Text extracted from regulations, contracts, and specifications keeps its
//! numbering only as indentation and per-level markers. A word processor's
//! automatic list shows `1.2.3`, but the extracted text says:
//!
//! ```text
//! 1) Requirements
//!     1) Storage
//!         1) Retention
//!         2) Deletion
//!     2) Access
//! 2) Definitions
//! ```
//!
//! Splitting this every N characters cuts clauses in half and loses which
//! section a sentence belongs to. Splitting it by section needs the section
//! tree first, and the tree has to be inferred.
//!
//! ## The Pipeline
//!
//! ```text
//! text ──> RawLine ──> NumberRestorer ──> HierarchyParser ──> SemanticChunker
//!          indent,      canonical          Outline             Vec<Chunk>
//!          marker       numbers            (section tree)
//! ```
//!
//! 1. **Line scan**: measure each line's indentation and detect its marker
//!    (`3)`, `b.`, `iv)`, `2.1.4`).
//! 2. **Restoration**: a depth stack turns indentation and markers into
//!    canonical dotted numbers (`"1.1.2"`). Irregularities are repaired
//!    locally and reported, never fatal.
//! 3. **Parsing**: the numbered stream becomes an [`Outline`]. Missing
//!    ancestors are filled with placeholders so every child sits one level
//!    below its parent.
//! 4. **Chunking**: sections at the target level become chunks together with
//!    their descendants, descending further only when a section is too large.
//!
//! ## Quick Start
//!
//! ```rust
//! use strata::{ChunkingConfig, ChunkingPipeline};
//!
//! let text = "1) Requirements\n\t1) Storage\n\t\tKeep records.\n\t2) Access\n2) Definitions";
//!
//! let pipeline = ChunkingPipeline::new(ChunkingConfig::new(2, 1000))?;
//! let doc = pipeline.process(text);
//!
//! assert_eq!(doc.outline.find("1.1").unwrap().title, "Storage");
//! assert_eq!(doc.chunks[1].text, "1.1 Storage\nKeep records.");
//! # Ok::<(), strata::Error>(())
//! ```
//!
//! ## Degrading Gracefully
//!
//! | Input problem | Repair | Reported as |
//! |---------------|--------|-------------|
//! | Inconsistent indentation | Snap to nearest shallower depth | `Diagnostics::malformed` |
//! | Numbering restarts or skips | Keep counting | `Diagnostics::malformed` |
//! | Child without parent heading | Placeholder ancestor | `synthetic_ancestors_inserted` |
//! | No numbering at all | One flat section | `fell_back_to_flat` |
//!
//! Only caller mistakes are errors: an invalid [`ChunkingConfig`] or a
//! lookup of a section that does not exist.
//!
//! ## Features
//!
//! - `parallel` (default): [`ChunkingPipeline::process_batch`] runs
//!   documents on rayon's thread pool.

mod chunk;
mod chunker;
mod config;
mod context;
mod error;
mod line;
mod outline;
mod parser;
mod pipeline;
mod restore;

pub use chunk::{Chunk, PathEntry};
pub use chunker::SemanticChunker;
pub use config::ChunkingConfig;
pub use context::{ContextResolver, SectionContext, SectionRef};
pub use error::{Error, Result};
pub use line::{indent_width, is_bullet, lines_from_text, normalize_whitespace, Marker, MarkerKind, RawLine};
pub use outline::{Diagnostics, Outline, SectionId, SectionKind, SectionNode};
pub use parser::{build_outline, HierarchyParser};
pub use pipeline::{
    generate_semantic_chunks, get_section_context, get_sections_by_level, parse_hierarchy,
    process_with_hierarchical_chunking, BatchReport, CancellationToken, ChunkingPipeline, ProcessedDocument,
};
pub use restore::{MalformedNumbering, NumberRestorer, NumberingIssue, Restoration, RestoredLine};

/// A text chunking strategy.
///
/// ```rust
/// use strata::{Chunk, Chunker, ChunkingConfig, SemanticChunker};
///
/// fn chunk_document(chunker: &dyn Chunker, text: &str) -> Vec<Chunk> {
///     chunker.chunk(text)
/// }
///
/// let chunker = SemanticChunker::new(ChunkingConfig::default()).unwrap();
/// let chunks = chunk_document(&chunker, "1) Scope\nThis applies to all staff.");
/// assert_eq!(chunks.len(), 1);
/// ```
pub trait Chunker: Send + Sync {
    /// Split text into chunks, in document order.
    fn chunk(&self, text: &str) -> Vec<Chunk>;

    /// Estimate the number of chunks for a given text length.
    ///
    /// Useful for pre-allocation. May be approximate.
    fn estimate_chunks(&self, text_len: usize) -> usize {
        // Conservative default
        (text_len / 500).max(1)
    }
}
