//! Outline assembly.
//!
//! Turns the restorer's flat record stream into a [`Outline`]. Canonical
//! numbers encode depth (`"2.1.3"` sits at level 3 under `"2.1"`), so the
//! parser keeps a stack of open sections and, for each heading, pops until
//! the top is one of its ancestors.
//!
//! ## Depth Gaps
//!
//! A heading may arrive without its parent ever being written:
//!
//! ```text
//! 1. Scope
//! 1.1.1 Deep clause         <- no "1.1" heading in the source
//! ```
//!
//! The parser inserts a placeholder `1.1` with an empty title so that every
//! child sits exactly one level below its parent, and counts the insertion in
//! [`Diagnostics::synthetic_ancestors_inserted`].

use crate::config::ChunkingConfig;
use crate::line::{lines_from_text, RawLine};
use crate::outline::{Diagnostics, Outline, SectionId, SectionKind, SectionNode};
use crate::restore::{NumberRestorer, Restoration, RestoredLine};
use crate::Result;

/// Builds section trees from numbered text.
///
/// ## Example
///
/// ```rust
/// use strata::{ChunkingConfig, HierarchyParser};
///
/// let parser = HierarchyParser::new(ChunkingConfig::default()).unwrap();
/// let outline = parser.parse("1) Intro\n\ttext A\n2) Body\n\t1) Sub one\n\t2) Sub two\n3) End");
///
/// let roots: Vec<&str> = outline.roots().map(|n| n.number.as_str()).collect();
/// assert_eq!(roots, ["1", "2", "3"]);
///
/// let body = outline.find("2").unwrap();
/// let children: Vec<&str> = outline.children(body).map(|n| n.number.as_str()).collect();
/// assert_eq!(children, ["2.1", "2.2"]);
/// ```
#[derive(Debug, Clone)]
pub struct HierarchyParser {
    config: ChunkingConfig,
    restorer: NumberRestorer,
}

impl HierarchyParser {
    /// Create a parser.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` fails validation.
    pub fn new(config: ChunkingConfig) -> Result<Self> {
        config.validate()?;
        let restorer = NumberRestorer::new(&config);
        Ok(Self { config, restorer })
    }

    /// The configuration this parser was built with.
    #[must_use]
    pub fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    /// Parse plain text, measuring tabs at the configured width.
    #[must_use]
    pub fn parse(&self, text: &str) -> Outline {
        self.parse_lines(&lines_from_text(text, self.config.tab_width))
    }

    /// Parse lines whose indentation a collaborator already measured.
    #[must_use]
    pub fn parse_lines(&self, lines: &[RawLine]) -> Outline {
        build_outline(self.restorer.restore(lines))
    }

    /// Sections at exactly `level`, in document order.
    ///
    /// Re-parses `text`; use [`Outline::sections_at_level`] when a parsed
    /// outline is already at hand.
    #[must_use]
    pub fn sections_by_level(&self, text: &str, level: usize) -> Vec<SectionNode> {
        self.parse(text).sections_at_level(level).cloned().collect()
    }
}

impl Default for HierarchyParser {
    fn default() -> Self {
        let config = ChunkingConfig::default();
        let restorer = NumberRestorer::new(&config);
        Self { config, restorer }
    }
}

/// Whether `ancestor` is a strict dotted prefix of `number`.
fn is_ancestor(ancestor: &str, number: &str) -> bool {
    number.len() > ancestor.len()
        && number.starts_with(ancestor)
        && number.as_bytes()[ancestor.len()] == b'.'
}

/// Assemble a restorer's output into a tree.
#[must_use]
pub fn build_outline(restoration: Restoration) -> Outline {
    let Restoration {
        lines,
        fell_back_to_flat,
        malformed,
    } = restoration;

    let mut outline = Outline::with_diagnostics(Diagnostics {
        fell_back_to_flat,
        synthetic_ancestors_inserted: 0,
        malformed,
    });

    if fell_back_to_flat {
        if !lines.is_empty() {
            let flat = outline.insert("1".to_string(), 1, String::new(), SectionKind::Flat, None, None);
            for line in lines {
                if let RestoredLine::Body { text, .. } = line {
                    outline.push_body(Some(flat), text);
                }
            }
        }
        return outline;
    }

    let mut stack: Vec<SectionId> = Vec::new();
    let mut synthetic = 0;

    for line in lines {
        match line {
            RestoredLine::Body { text, .. } => outline.push_body(stack.last().copied(), text),
            RestoredLine::Heading {
                number,
                level,
                title,
                line_no,
            } => {
                while let Some(&top) = stack.last() {
                    if is_ancestor(&outline[top].number, &number) {
                        break;
                    }
                    stack.pop();
                }

                // stack[i] sits at level i + 1, so any missing ancestors
                // start right below the current top.
                let segments: Vec<&str> = number.split('.').collect();
                for depth in stack.len() + 1..level {
                    let prefix = segments[..depth].join(".");
                    tracing::debug!(number = %prefix, child = %number, line_no, "inserting placeholder ancestor");
                    let id = outline.insert(
                        prefix,
                        depth,
                        String::new(),
                        SectionKind::Placeholder,
                        stack.last().copied(),
                        None,
                    );
                    stack.push(id);
                    synthetic += 1;
                }

                let id = outline.insert(
                    number,
                    level,
                    title,
                    SectionKind::Numbered,
                    stack.last().copied(),
                    Some(line_no),
                );
                stack.push(id);
            }
        }
    }

    outline.diagnostics_mut().synthetic_ancestors_inserted = synthetic;
    outline
}
