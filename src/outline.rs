//! The section tree.
//!
//! Nodes live in one arena, in pre-order. A node owns its children through
//! `children` ids; `parent` is a plain id used only for lookups, so there
//! are no ownership cycles. Because the arena is pre-order, every subtree is
//! a contiguous slice starting at its root.
//!
//! ```text
//! arena:  [1] [1.1] [1.2] [1.2.1] [2] [2.1]
//!          └─────── subtree(1) ──┘ └ subtree(2)
//! ```

use std::collections::HashMap;
use std::ops::Index;

use serde::Serialize;

use crate::restore::MalformedNumbering;

/// Index of a node in its [`Outline`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SectionId(usize);

impl SectionId {
    /// Position in pre-order.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Where a node came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SectionKind {
    /// A numbered heading in the source.
    Numbered,
    /// A synthetic ancestor inserted to close a depth gap.
    Placeholder,
    /// The single node of an input without any numbering.
    Flat,
}

/// A node in the reconstructed outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionNode {
    /// Position in the arena.
    pub id: SectionId,
    /// Canonical dotted number, unique within the outline.
    pub number: String,
    /// Depth, 1-based.
    pub level: usize,
    /// Heading text. Empty for placeholders and the flat node.
    pub title: String,
    /// Content lines up to the next heading, whitespace-normalized.
    pub body: Vec<String>,
    /// Children in document order.
    pub children: Vec<SectionId>,
    /// Parent, `None` for roots.
    pub parent: Option<SectionId>,
    /// Origin of the node.
    pub kind: SectionKind,
    /// Source line of the heading, if it had one.
    pub line_no: Option<usize>,
}

impl SectionNode {
    /// The heading as it appears in restored text: `"2.1 Terms"`.
    ///
    /// `None` for nodes without a heading line in the source.
    #[must_use]
    pub fn heading(&self) -> Option<String> {
        match self.kind {
            SectionKind::Numbered if self.title.is_empty() => Some(self.number.clone()),
            SectionKind::Numbered => Some(format!("{} {}", self.number, self.title)),
            SectionKind::Placeholder | SectionKind::Flat => None,
        }
    }

    /// Heading line (if any) followed by the body lines.
    #[must_use]
    pub fn own_lines(&self) -> Vec<String> {
        self.heading()
            .into_iter()
            .chain(self.body.iter().cloned())
            .collect()
    }

    /// Whether the node has no children.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Whether the node was inserted by the parser.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.kind == SectionKind::Placeholder
    }
}

/// What restoration and parsing had to repair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    /// No numbering was found; the outline is one flat node.
    pub fell_back_to_flat: bool,
    /// Placeholder ancestors inserted to close depth gaps.
    pub synthetic_ancestors_inserted: usize,
    /// Numbering irregularities resolved by the restorer.
    pub malformed: Vec<MalformedNumbering>,
}

impl Diagnostics {
    /// Whether the input needed no repair at all.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        !self.fell_back_to_flat && self.synthetic_ancestors_inserted == 0 && self.malformed.is_empty()
    }
}

/// A parsed document outline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Outline {
    nodes: Vec<SectionNode>,
    roots: Vec<SectionId>,
    preamble: Vec<String>,
    diagnostics: Diagnostics,
    #[serde(skip)]
    index: HashMap<String, SectionId>,
}

impl Outline {
    pub(crate) fn with_diagnostics(diagnostics: Diagnostics) -> Self {
        Self {
            diagnostics,
            ..Self::default()
        }
    }

    pub(crate) fn insert(
        &mut self,
        number: String,
        level: usize,
        title: String,
        kind: SectionKind,
        parent: Option<SectionId>,
        line_no: Option<usize>,
    ) -> SectionId {
        let id = SectionId(self.nodes.len());
        match parent {
            Some(parent) => self.nodes[parent.0].children.push(id),
            None => self.roots.push(id),
        }
        let previous = self.index.insert(number.clone(), id);
        debug_assert!(previous.is_none(), "duplicate section number {number}");
        self.nodes.push(SectionNode {
            id,
            number,
            level,
            title,
            body: Vec::new(),
            children: Vec::new(),
            parent,
            kind,
            line_no,
        });
        id
    }

    pub(crate) fn push_body(&mut self, target: Option<SectionId>, line: String) {
        match target {
            Some(id) => self.nodes[id.0].body.push(line),
            None => self.preamble.push(line),
        }
    }

    pub(crate) fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    /// Top-level sections in document order.
    pub fn roots(&self) -> impl Iterator<Item = &SectionNode> + '_ {
        self.roots.iter().map(|&id| &self.nodes[id.0])
    }

    /// All sections in pre-order (document order).
    pub fn iter(&self) -> std::slice::Iter<'_, SectionNode> {
        self.nodes.iter()
    }

    /// Number of sections, placeholders included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the outline has no sections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Deepest level present, 0 when empty.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.nodes.iter().map(|n| n.level).max().unwrap_or(0)
    }

    /// Body lines that precede the first heading.
    #[must_use]
    pub fn preamble(&self) -> &[String] {
        &self.preamble
    }

    /// Repairs made while building this outline.
    #[must_use]
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Node by id.
    #[must_use]
    pub fn get(&self, id: SectionId) -> Option<&SectionNode> {
        self.nodes.get(id.0)
    }

    /// Node by canonical number.
    #[must_use]
    pub fn find(&self, number: &str) -> Option<&SectionNode> {
        self.index.get(number).map(|&id| &self.nodes[id.0])
    }

    /// Parent of a node.
    #[must_use]
    pub fn parent(&self, node: &SectionNode) -> Option<&SectionNode> {
        node.parent.map(|id| &self.nodes[id.0])
    }

    /// Immediate children of a node, in document order.
    pub fn children<'a>(&'a self, node: &'a SectionNode) -> impl Iterator<Item = &'a SectionNode> + 'a {
        node.children.iter().map(|&id| &self.nodes[id.0])
    }

    /// Ancestors of a node, root first, the node itself excluded.
    #[must_use]
    pub fn ancestors(&self, node: &SectionNode) -> Vec<&SectionNode> {
        let mut path = Vec::with_capacity(node.level.saturating_sub(1));
        let mut current = self.parent(node);
        while let Some(ancestor) = current {
            path.push(ancestor);
            current = self.parent(ancestor);
        }
        path.reverse();
        path
    }

    /// A node and all its descendants, in pre-order.
    #[must_use]
    pub fn subtree(&self, id: SectionId) -> &[SectionNode] {
        let Some(root) = self.nodes.get(id.0) else {
            return &[];
        };
        let rest = &self.nodes[id.0 + 1..];
        let len = rest
            .iter()
            .position(|n| n.level <= root.level)
            .unwrap_or(rest.len());
        &self.nodes[id.0..=id.0 + len]
    }

    /// Sections at exactly `level`, in document order.
    pub fn sections_at_level(&self, level: usize) -> impl Iterator<Item = &SectionNode> + '_ {
        self.nodes.iter().filter(move |n| n.level == level)
    }

    /// The restored document: preamble, then every section's heading and
    /// body in document order, one line each.
    #[must_use]
    pub fn render(&self) -> String {
        self.preamble
            .iter()
            .cloned()
            .chain(self.nodes.iter().flat_map(SectionNode::own_lines))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Index<SectionId> for Outline {
    type Output = SectionNode;

    fn index(&self, id: SectionId) -> &SectionNode {
        &self.nodes[id.0]
    }
}

impl<'a> IntoIterator for &'a Outline {
    type Item = &'a SectionNode;
    type IntoIter = std::slice::Iter<'a, SectionNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
