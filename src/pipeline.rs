//! Parse once, chunk the same tree.
//!
//! [`ChunkingPipeline`] is the entry point for callers that want both the
//! outline and the chunks. The free functions at the bottom of this module
//! run the same steps with [`ChunkingConfig::default`] adjusted by their
//! arguments.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;

use crate::chunk::Chunk;
use crate::chunker::SemanticChunker;
use crate::config::ChunkingConfig;
use crate::context::SectionContext;
use crate::line::RawLine;
use crate::outline::{Diagnostics, Outline, SectionNode};
use crate::parser::HierarchyParser;
use crate::Result;

/// The outline and chunks of one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessedDocument {
    /// The reconstructed section tree.
    pub outline: Outline,
    /// Chunks in emission order.
    pub chunks: Vec<Chunk>,
    /// Repairs made while reconstructing the outline.
    pub diagnostics: Diagnostics,
}

/// Parses and chunks documents with one configuration.
#[derive(Debug, Clone)]
pub struct ChunkingPipeline {
    chunker: SemanticChunker,
}

impl ChunkingPipeline {
    /// Create a pipeline.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` fails validation.
    pub fn new(config: ChunkingConfig) -> Result<Self> {
        Ok(Self {
            chunker: SemanticChunker::new(config)?,
        })
    }

    /// The configuration this pipeline was built with.
    #[must_use]
    pub fn config(&self) -> &ChunkingConfig {
        self.chunker.config()
    }

    /// Process plain text.
    #[must_use]
    pub fn process(&self, text: &str) -> ProcessedDocument {
        self.finish(self.chunker.parser().parse(text))
    }

    /// Process lines whose indentation a collaborator already measured.
    #[must_use]
    pub fn process_lines(&self, lines: &[RawLine]) -> ProcessedDocument {
        self.finish(self.chunker.parser().parse_lines(lines))
    }

    fn finish(&self, outline: Outline) -> ProcessedDocument {
        let chunks = self.chunker.chunk_outline(&outline);
        let diagnostics = outline.diagnostics().clone();
        let oversized = chunks.iter().filter(|c| !self.config().fits(c.char_length)).count();

        tracing::info!(
            sections = outline.len(),
            depth = outline.depth(),
            chunks = chunks.len(),
            oversized,
            fell_back_to_flat = diagnostics.fell_back_to_flat,
            synthetic_ancestors = diagnostics.synthetic_ancestors_inserted,
            malformed = diagnostics.malformed.len(),
            "processed document"
        );

        ProcessedDocument {
            outline,
            chunks,
            diagnostics,
        }
    }

    /// Process independent documents.
    ///
    /// With the `parallel` feature documents run on rayon's global pool.
    /// Once `cancel` is set no further document starts; documents already
    /// running complete. Slots of documents that never started are `None`.
    pub fn process_batch<T>(&self, documents: &[T], cancel: &CancellationToken) -> BatchReport
    where
        T: AsRef<str> + Sync,
    {
        let run = |text: &T| {
            if cancel.is_cancelled() {
                None
            } else {
                Some(self.process(text.as_ref()))
            }
        };

        #[cfg(feature = "parallel")]
        let documents: Vec<Option<ProcessedDocument>> = {
            use rayon::prelude::*;
            documents.par_iter().map(run).collect()
        };
        #[cfg(not(feature = "parallel"))]
        let documents: Vec<Option<ProcessedDocument>> = documents.iter().map(run).collect();

        let report = BatchReport { documents };
        if report.skipped() > 0 {
            tracing::warn!(
                processed = report.processed(),
                skipped = report.skipped(),
                "batch cancelled"
            );
        }
        report
    }
}

/// Coarse cancellation for batch processing.
///
/// Clones share one flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// A token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop dispatching further documents.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether [`cancel`](Self::cancel) was called on any clone.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Per-document results of a batch, in input order.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// `None` where the document was skipped after cancellation.
    pub documents: Vec<Option<ProcessedDocument>>,
}

impl BatchReport {
    /// Documents that ran.
    #[must_use]
    pub fn processed(&self) -> usize {
        self.documents.iter().filter(|d| d.is_some()).count()
    }

    /// Documents skipped after cancellation.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.documents.len() - self.processed()
    }
}

/// The outline of `text`, parsed with the default configuration.
///
/// Root sections come from [`Outline::roots`]; the rest of the tree is
/// reachable through [`Outline::children`].
#[must_use]
pub fn parse_hierarchy(text: &str) -> Outline {
    HierarchyParser::default().parse(text)
}

/// Chunk `text` at `target_level` with chunks of at most `max_chunk_size`
/// characters.
///
/// # Errors
///
/// Returns a configuration error if either argument is zero.
pub fn generate_semantic_chunks(text: &str, target_level: usize, max_chunk_size: usize) -> Result<Vec<Chunk>> {
    let chunker = SemanticChunker::new(ChunkingConfig::new(target_level, max_chunk_size))?;
    Ok(crate::Chunker::chunk(&chunker, text))
}

/// Context of section `number` in `text`.
///
/// # Errors
///
/// Returns [`crate::Error::SectionNotFound`] if no section has that number.
pub fn get_section_context(text: &str, number: &str) -> Result<SectionContext> {
    HierarchyParser::default().parse(text).section_context(number)
}

/// Sections of `text` at exactly `level`, in document order.
#[must_use]
pub fn get_sections_by_level(text: &str, level: usize) -> Vec<SectionNode> {
    HierarchyParser::default().sections_by_level(text, level)
}

/// Parse and chunk `text` in one pass.
///
/// # Errors
///
/// Returns a configuration error if either argument is zero.
pub fn process_with_hierarchical_chunking(
    text: &str,
    target_level: usize,
    max_chunk_size: usize,
) -> Result<ProcessedDocument> {
    let pipeline = ChunkingPipeline::new(ChunkingConfig::new(target_level, max_chunk_size))?;
    Ok(pipeline.process(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "1) Intro\n\ttext A\n2) Body\n\t1) Sub one\n\t\ttext B\n\t2) Sub two\n3) End";

    #[test]
    fn test_process_reuses_outline() {
        let doc = process_with_hierarchical_chunking(DOC, 2, 1000).unwrap();
        assert_eq!(doc.outline.len(), 5);
        assert_eq!(doc.chunks.len(), 5);
        assert!(doc.diagnostics.is_clean());
        let joined: Vec<&str> = doc.chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(joined.join("\n"), doc.outline.render());
    }

    #[test]
    fn test_process_uses_chunker_parser() {
        let config = ChunkingConfig::new(2, 1000).with_tab_width(2);
        let pipeline = ChunkingPipeline::new(config.clone()).unwrap();
        let chunker = SemanticChunker::new(config).unwrap();
        let doc = pipeline.process(DOC);
        assert_eq!(doc.outline, chunker.parser().parse(DOC));
        assert_eq!(doc.chunks, crate::Chunker::chunk(&chunker, DOC));
        assert_eq!(pipeline.config(), chunker.parser().config());
    }

    #[test]
    fn test_flat_document() {
        let doc = process_with_hierarchical_chunking("plain prose\nmore prose", 3, 1000).unwrap();
        assert!(doc.diagnostics.fell_back_to_flat);
        assert_eq!(doc.chunks.len(), 1);
        assert_eq!(doc.chunks[0].text, "plain prose\nmore prose");
        assert_eq!(doc.chunks[0].covered_sections, ["1"]);
    }

    #[test]
    fn test_invalid_arguments() {
        assert!(generate_semantic_chunks(DOC, 0, 1000).is_err());
        assert!(process_with_hierarchical_chunking(DOC, 1, 0).is_err());
    }

    #[test]
    fn test_free_functions() {
        let outline = parse_hierarchy(DOC);
        let roots: Vec<&str> = outline.roots().map(|n| n.number.as_str()).collect();
        assert_eq!(roots, ["1", "2", "3"]);
        let body = outline.find("2").unwrap();
        let children: Vec<&str> = outline.children(body).map(|n| n.number.as_str()).collect();
        assert_eq!(children, ["2.1", "2.2"]);
        assert_eq!(get_sections_by_level(DOC, 2).len(), 2);
        assert_eq!(get_section_context(DOC, "3").unwrap().title, "End");
        assert!(get_section_context(DOC, "4").is_err());
    }

    #[test]
    fn test_batch_in_order() {
        let pipeline = ChunkingPipeline::new(ChunkingConfig::new(1, 1000)).unwrap();
        let docs = ["1) A", "1) B\n2) C", "no numbering"];
        let report = pipeline.process_batch(&docs, &CancellationToken::new());
        assert_eq!(report.processed(), 3);
        let counts: Vec<usize> = report
            .documents
            .iter()
            .map(|d| d.as_ref().map_or(0, |d| d.chunks.len()))
            .collect();
        assert_eq!(counts, [1, 2, 1]);
    }

    #[test]
    fn test_batch_cancelled_before_start() {
        let pipeline = ChunkingPipeline::new(ChunkingConfig::default()).unwrap();
        let token = CancellationToken::new();
        token.clone().cancel();
        let report = pipeline.process_batch(&["1) A", "1) B"], &token);
        assert_eq!(report.skipped(), 2);
        assert!(report.documents.iter().all(Option::is_none));
    }
}
