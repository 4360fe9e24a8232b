//! Retention queue for the engine's own transient announcements.
//!
//! Every throwaway message the engine emits is recorded here with a TTL;
//! a sweep runs once per handled inbound activity and deletes whatever has
//! expired. Deletion is best-effort: "already gone" counts as success and
//! nothing is retried.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::store::Store;
use crate::types::{ChatId, MessageId};

/// What kind of transient message a record tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageKind {
    /// An ordinary throwaway announcement.
    Standard,
    /// A snitch announcement carrying the catchable flag.
    Snitch,
}

impl MessageKind {
    /// Stable storage representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Snitch => "snitch",
        }
    }

    /// Parse the storage representation; unknown kinds degrade to Standard.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "snitch" => Self::Snitch,
            _ => Self::Standard,
        }
    }
}

/// Lifecycle state of a recorded message.
///
/// Ordinary announcements stay `Sent` until swept; a snitch starts `Open`
/// and is flipped to `Closed` by the first correct catch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageStatus {
    /// Delivered, nothing special pending.
    Sent,
    /// Waiting for a catch (snitch only).
    Open,
    /// Caught (snitch only).
    Closed,
}

impl MessageStatus {
    /// Stable storage representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }

    /// Parse the storage representation; unknown statuses degrade to Sent.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "open" => Self::Open,
            "closed" => Self::Closed,
            _ => Self::Sent,
        }
    }
}

/// One recorded transient message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceMessage {
    /// The chat the message was sent to.
    pub chat: ChatId,
    /// The platform message id.
    pub message_id: MessageId,
    /// When the message was sent.
    pub created_at: DateTime<Utc>,
    /// Seconds the message is allowed to live.
    pub ttl_seconds: i64,
    /// Announcement kind.
    pub kind: MessageKind,
    /// Lifecycle state.
    pub status: MessageStatus,
}

impl ServiceMessage {
    /// The instant this message becomes eligible for deletion.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.created_at + Duration::seconds(self.ttl_seconds)
    }
}

/// Result of asking the messaging collaborator to delete a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The platform removed the message.
    Deleted,
    /// The message was already gone; treated as success.
    NotFound,
    /// The platform errored; logged, never retried.
    Failed,
}

/// The retention queue, backed by the store.
#[derive(Debug)]
pub struct RetentionQueue<'a> {
    store: &'a Store,
}

impl<'a> RetentionQueue<'a> {
    /// Wrap the store.
    #[must_use]
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Record an ordinary transient message for later deletion.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EngineError::Database`] on SQLite failures.
    pub fn record(
        &self,
        chat: ChatId,
        message_id: MessageId,
        ttl_seconds: i64,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.store.record_message(&ServiceMessage {
            chat,
            message_id,
            created_at: now,
            ttl_seconds,
            kind: MessageKind::Standard,
            status: MessageStatus::Sent,
        })
    }

    /// Delete every expired message of the chat via `delete`.
    ///
    /// The record is removed whether the collaborator reports success,
    /// "not found", or an outright failure — a failure is logged and the
    /// message orphaned rather than retried. Returns how many records were
    /// swept.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EngineError::Database`] on SQLite failures; the
    /// collaborator's own failures never propagate.
    pub fn sweep<F>(&self, chat: ChatId, now: DateTime<Utc>, mut delete: F) -> Result<usize>
    where
        F: FnMut(MessageId) -> DeleteOutcome,
    {
        let expired = self.store.expired_messages(chat, now)?;
        let mut swept = 0;
        for message in expired {
            match delete(message.message_id) {
                DeleteOutcome::Deleted | DeleteOutcome::NotFound => {}
                DeleteOutcome::Failed => {
                    warn!(
                        chat = %chat,
                        message = %message.message_id,
                        "delete failed; dropping retention record anyway"
                    );
                }
            }
            self.store.remove_message(chat, message.message_id)?;
            swept += 1;
        }
        if swept > 0 {
            debug!(chat = %chat, swept, "retention sweep complete");
        }
        Ok(swept)
    }
}
