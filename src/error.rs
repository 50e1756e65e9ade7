//! Error types for the matcher
//!
//! Top-level failures abort a run; per-source failures are captured as a
//! status record and never escape the aggregation loop.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("no pattern given")]
    MissingPattern,

    #[error("no source selected: choose a built-in list, a URL, pasted text or a wordlist file")]
    NoSourceSelected,

    #[error("failed to load {locator}: {status}")]
    SourceLoad { locator: String, status: String },

    #[error("custom source needs either pasted text or a URL")]
    MissingSource,

    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("unclosed character class in pattern '{pattern}'")]
    UnclosedClass { pattern: String },

    #[error("no valid Hebrew words found in {locator}")]
    EmptyWordlist { locator: String },

    #[error("unknown source: {0}")]
    UnknownSource(String),

    #[error("invalid letter constraint: {0}")]
    InvalidLetter(String),

    #[error("a search is already running")]
    Busy,

    #[error("search cancelled")]
    Cancelled,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl SearchError {
    /// Whether this error only concerns a single source and the run may
    /// continue with the remaining ones.
    pub fn is_source_local(&self) -> bool {
        matches!(
            self,
            SearchError::SourceLoad { .. }
                | SearchError::EmptyWordlist { .. }
                | SearchError::MissingSource
                | SearchError::Io(_)
        )
    }
}
