//! Chunking configuration.
//!
//! ## One Value, Threaded Through
//!
//! Every knob the engine reads lives in [`ChunkingConfig`]. There is no
//! global default state: each parser, chunker and pipeline takes the config
//! it was built with and nothing else.
//!
//! ```text
//! target_level           = 3      depth at which chunk seeds are picked
//! max_chunk_size         = 1000   bound in user-perceived characters
//! preserve_lists         = true   never split an atomic section body
//! include_parent_context = true   attach the ancestor path to each chunk
//! merge_siblings         = false  pack small adjacent siblings together
//! tab_width              = 4      columns a tab advances to
//! indent_step            = 4      extra indent that opens a child level
//! ```
//!
//! ## Indentation
//!
//! Extracted text keeps its leading whitespace verbatim. A space counts one
//! column; a tab advances to the next multiple of `tab_width`. A numbered
//! line opens a child level only when it is indented at least `indent_step`
//! columns deeper than the enclosing item. Smaller offsets are treated as
//! drift in the source and snap back to an existing level.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Configuration for outline reconstruction and chunking.
///
/// # Examples
///
/// ```rust
/// use strata::ChunkingConfig;
///
/// let config = ChunkingConfig::default()
///     .with_target_level(2)
///     .with_max_chunk_size(500);
/// assert!(config.validate().is_ok());
///
/// let bad = ChunkingConfig::default().with_max_chunk_size(0);
/// assert!(bad.validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Depth (1-based) at which chunk seeds are selected.
    pub target_level: usize,
    /// Maximum chunk length in user-perceived characters.
    pub max_chunk_size: usize,
    /// Keep an oversized atomic section in one chunk instead of splitting it
    /// at line boundaries.
    pub preserve_lists: bool,
    /// Populate [`Chunk::parent_path`](crate::Chunk::parent_path).
    pub include_parent_context: bool,
    /// Merge adjacent complete sibling chunks while they fit the bound.
    pub merge_siblings: bool,
    /// Tab stop width in columns.
    pub tab_width: usize,
    /// Minimum extra indentation, in columns, that opens a child level.
    pub indent_step: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            target_level: 3,
            max_chunk_size: 1000,
            preserve_lists: true,
            include_parent_context: true,
            merge_siblings: false,
            tab_width: 4,
            indent_step: 4,
        }
    }
}

impl ChunkingConfig {
    /// Config with the given target level and chunk bound, defaults elsewhere.
    #[must_use]
    pub fn new(target_level: usize, max_chunk_size: usize) -> Self {
        Self {
            target_level,
            max_chunk_size,
            ..Self::default()
        }
    }

    /// Load a config from TOML. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for malformed TOML and a configuration error
    /// if any value fails [`validate`](Self::validate).
    ///
    /// ```rust
    /// use strata::ChunkingConfig;
    ///
    /// let config = ChunkingConfig::from_toml_str("target_level = 2\nmerge_siblings = true").unwrap();
    /// assert_eq!(config.target_level, 2);
    /// assert!(config.merge_siblings);
    /// assert_eq!(config.max_chunk_size, 1000);
    /// ```
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot work with.
    ///
    /// # Errors
    ///
    /// Returns the matching configuration error for a zero `target_level`,
    /// `max_chunk_size`, `tab_width` or `indent_step`.
    pub fn validate(&self) -> Result<()> {
        if self.target_level == 0 {
            return Err(Error::InvalidTargetLevel(self.target_level));
        }
        if self.max_chunk_size == 0 {
            return Err(Error::InvalidChunkSize(self.max_chunk_size));
        }
        if self.tab_width == 0 {
            return Err(Error::InvalidTabWidth(self.tab_width));
        }
        if self.indent_step == 0 {
            return Err(Error::InvalidIndentStep(self.indent_step));
        }
        Ok(())
    }

    /// Set the target level.
    #[must_use]
    pub const fn with_target_level(mut self, level: usize) -> Self {
        self.target_level = level;
        self
    }

    /// Set the maximum chunk size.
    #[must_use]
    pub const fn with_max_chunk_size(mut self, size: usize) -> Self {
        self.max_chunk_size = size;
        self
    }

    /// Set whether oversized atomic sections stay whole.
    #[must_use]
    pub const fn with_preserve_lists(mut self, preserve: bool) -> Self {
        self.preserve_lists = preserve;
        self
    }

    /// Set whether chunks carry their ancestor path.
    #[must_use]
    pub const fn with_parent_context(mut self, include: bool) -> Self {
        self.include_parent_context = include;
        self
    }

    /// Set whether small adjacent siblings are merged.
    #[must_use]
    pub const fn with_merge_siblings(mut self, merge: bool) -> Self {
        self.merge_siblings = merge;
        self
    }

    /// Set the tab stop width.
    #[must_use]
    pub const fn with_tab_width(mut self, width: usize) -> Self {
        self.tab_width = width;
        self
    }

    /// Set the indentation step that opens a child level.
    #[must_use]
    pub const fn with_indent_step(mut self, step: usize) -> Self {
        self.indent_step = step;
        self
    }

    /// Whether a chunk of `size` characters fits the bound.
    #[must_use]
    pub const fn fits(&self, size: usize) -> bool {
        size <= self.max_chunk_size
    }

    /// Whether appending `additional` characters to `current` would exceed
    /// the bound.
    #[must_use]
    pub const fn would_overflow(&self, current: usize, additional: usize) -> bool {
        current.saturating_add(additional) > self.max_chunk_size
    }
}
