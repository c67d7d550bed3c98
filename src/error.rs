//! Error types for pool generation.

use thiserror::Error;

use crate::uniqueness::Collision;

/// Errors that can occur while building or checking word pools.
///
/// All variants are deterministic precondition failures; nothing here is
/// worth retrying with the same inputs.
#[derive(Debug, Error)]
pub enum ListgenError {
    /// The requested session language has no word pool.
    #[error("Language not supported: {0}")]
    LanguageNotSupported(String),

    /// List, pair or list-type parameters don't fit the vocabulary.
    #[error("Configuration mismatch: {message}")]
    ConfigMismatch {
        /// Description of the violated precondition
        message: String,
    },

    /// A vocabulary contained the same word twice.
    #[error("Duplicate word in vocabulary: {0}")]
    DuplicateWord(String),

    /// Pairs repeat across sessions and no remediation was applied.
    #[error("Unresolved collision: {} pair(s) repeat across sessions", .collisions.len())]
    UnresolvedCollision {
        /// Every overlapping row found by the checker
        collisions: Vec<Collision>,
    },
}

impl ListgenError {
    /// Create a ConfigMismatch error.
    pub fn config_mismatch(message: impl Into<String>) -> Self {
        Self::ConfigMismatch {
            message: message.into(),
        }
    }
}

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, ListgenError>;
