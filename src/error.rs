//! Error types for strata.
//!
//! Only caller mistakes are errors. Messy numbering in the input is resolved
//! in place and reported through [`Diagnostics`](crate::Diagnostics).

/// Errors surfaced to the caller.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid target level (must be > 0).
    #[error("invalid target level: {0} (must be > 0)")]
    InvalidTargetLevel(usize),

    /// Invalid chunk size (must be > 0).
    #[error("invalid chunk size: {0} (must be > 0)")]
    InvalidChunkSize(usize),

    /// Invalid tab stop width (must be > 0).
    #[error("invalid tab width: {0} (must be > 0)")]
    InvalidTabWidth(usize),

    /// Invalid indentation step between nesting levels (must be > 0).
    #[error("invalid indent step: {0} (must be > 0)")]
    InvalidIndentStep(usize),

    /// No section with this canonical number exists in the outline.
    #[error("section not found: {0}")]
    SectionNotFound(String),

    /// Configuration text could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}

impl Error {
    /// Whether this error rejects a configuration value.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidTargetLevel(_)
                | Self::InvalidChunkSize(_)
                | Self::InvalidTabWidth(_)
                | Self::InvalidIndentStep(_)
                | Self::Config(_)
        )
    }
}

/// Result type for strata operations.
pub type Result<T> = std::result::Result<T, Error>;
