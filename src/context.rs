//! Section lookups.

use serde::Serialize;

use crate::config::ChunkingConfig;
use crate::outline::{Outline, SectionNode};
use crate::parser::HierarchyParser;
use crate::{Error, Result};

/// A `(number, title)` reference to another section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionRef {
    /// Canonical number.
    pub number: String,
    /// Heading text, empty for placeholders.
    pub title: String,
}

impl From<&SectionNode> for SectionRef {
    fn from(node: &SectionNode) -> Self {
        Self {
            number: node.number.clone(),
            title: node.title.clone(),
        }
    }
}

/// A section together with its immediate neighbourhood.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionContext {
    /// Canonical number of the section.
    pub number: String,
    /// Heading text.
    pub title: String,
    /// Depth, 1-based.
    pub level: usize,
    /// Own body lines, descendants excluded.
    pub body: Vec<String>,
    /// The parent, `None` for roots.
    pub parent: Option<SectionRef>,
    /// Immediate children in document order.
    pub children: Vec<SectionRef>,
    /// Other children of the same parent (or other roots), in document order.
    pub siblings: Vec<SectionRef>,
}

impl SectionContext {
    /// The parent's title, empty for roots.
    #[must_use]
    pub fn parent_title(&self) -> &str {
        self.parent.as_ref().map_or("", |p| p.title.as_str())
    }
}

impl Outline {
    /// Context of the section numbered exactly `number`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SectionNotFound`] if no section has that number.
    pub fn section_context(&self, number: &str) -> Result<SectionContext> {
        let node = self
            .find(number)
            .ok_or_else(|| Error::SectionNotFound(number.to_string()))?;

        let parent = self.parent(node);
        let siblings = match parent {
            Some(parent) => self
                .children(parent)
                .filter(|n| n.id != node.id)
                .map(SectionRef::from)
                .collect(),
            None => self
                .roots()
                .filter(|n| n.id != node.id)
                .map(SectionRef::from)
                .collect(),
        };

        Ok(SectionContext {
            number: node.number.clone(),
            title: node.title.clone(),
            level: node.level,
            body: node.body.clone(),
            parent: parent.map(SectionRef::from),
            children: self.children(node).map(SectionRef::from).collect(),
            siblings,
        })
    }
}

/// Answers section lookups against raw text.
///
/// ```rust
/// use strata::{ChunkingConfig, ContextResolver};
///
/// let resolver = ContextResolver::new(ChunkingConfig::default()).unwrap();
/// let text = "1) Intro\n\ttext A\n2) Body\n\t1) Sub one\n\t2) Sub two\n3) End";
///
/// let body = resolver.section_context(text, "2").unwrap();
/// assert_eq!(body.children.len(), 2);
/// assert_eq!(body.parent_title(), "");
///
/// assert!(resolver.section_context(text, "1.1.2").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ContextResolver {
    parser: HierarchyParser,
}

impl ContextResolver {
    /// Create a resolver.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` fails validation.
    pub fn new(config: ChunkingConfig) -> Result<Self> {
        Ok(Self {
            parser: HierarchyParser::new(config)?,
        })
    }

    /// Parse `text` and look up `number`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SectionNotFound`] if no section has that number.
    pub fn section_context(&self, text: &str, number: &str) -> Result<SectionContext> {
        self.parser.parse(text).section_context(number)
    }
}
