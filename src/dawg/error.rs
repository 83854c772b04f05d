//! Error types for word-graph mutation.

use thiserror::Error;

/// Errors that can occur when mutating a [`DawgSet`](super::set::DawgSet).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DawgError {
    /// The graph has been frozen.
    ///
    /// Freezing converts the graph into its immutable array form and
    /// discards the machinery needed for incremental updates, so
    /// insertion and removal are no longer possible.
    #[error("word graph is frozen; strings can no longer be added or removed")]
    Frozen,
}

/// Errors that can occur while ingesting strings from a fallible source.
///
/// Used by [`DawgSet::try_add_all`](super::set::DawgSet::try_add_all),
/// where each item of the input may itself fail to produce a string. A
/// producer failure is propagated unchanged as [`IngestError::Source`];
/// every string yielded before the failure has already been inserted.
#[derive(Debug, Error)]
pub enum IngestError<E> {
    /// The graph has been frozen; see [`DawgError::Frozen`].
    #[error("word graph is frozen; strings can no longer be added or removed")]
    Frozen,

    /// The string source failed before the iteration finished.
    #[error("string source failed: {0}")]
    Source(E),
}

impl<E> From<DawgError> for IngestError<E> {
    fn from(err: DawgError) -> Self {
        match err {
            DawgError::Frozen => IngestError::Frozen,
        }
    }
}
