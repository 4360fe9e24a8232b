//! Error types for the prefect engine.

use thiserror::Error;

use crate::types::{ChatId, UserId};

/// Top-level error type for all engine operations.
#[derive(Error, Debug)]
pub enum EngineError {
    /// SQLite persistence error.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// A participant was looked up that the roster has never seen.
    #[error("member {user} not found in chat {chat}")]
    MemberNotFound {
        /// The chat the lookup ran against.
        chat: ChatId,
        /// The participant that was not found.
        user: UserId,
    },

    /// An administrator bulk award outside the configured bound.
    #[error("award of {amount} points exceeds the ±{bound} bound")]
    AwardOutOfBounds {
        /// The requested award.
        amount: i64,
        /// The configured per-award cap.
        bound: i64,
    },

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, EngineError>;
