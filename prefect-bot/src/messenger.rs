//! The chat-platform collaborator abstraction.
//!
//! The engine owns no transport; everything it says rides on whatever
//! implements [`Messenger`]. Implementations are expected to be thin
//! wrappers over a platform client — no retries, no queueing.

use prefect_core::retention::DeleteOutcome;
use prefect_core::types::{ChatId, MemberStatus, MessageId, UserId};
use thiserror::Error;

/// A platform send/lookup failure. The handler degrades rather than
/// retries: failed member lookups become `Unknown`, failed deletes are
/// logged and forgotten.
#[derive(Error, Debug, Clone)]
#[error("transport error: {0}")]
pub struct TransportError(pub String);

/// What the platform knows about one chat member.
#[derive(Debug, Clone)]
pub struct MemberInfo {
    /// Membership standing.
    pub status: MemberStatus,
    /// Name the member should be rendered as.
    pub display_name: String,
}

/// The messaging collaborator consumed by the handler.
///
/// Implemented for `Arc<M>` as well so a transport can be shared between
/// the bot and whatever else needs to observe it.
pub trait Messenger {
    /// Send plain text; returns the new message's id.
    fn send_text(&self, chat: ChatId, text: &str) -> Result<MessageId, TransportError>;

    /// Send a sticker by platform reference; returns the new message's id.
    fn send_sticker(&self, chat: ChatId, sticker: &str) -> Result<MessageId, TransportError>;

    /// Pin a message in the chat.
    fn pin_message(&self, chat: ChatId, message: MessageId) -> Result<(), TransportError>;

    /// Delete a message; "already gone" is a normal outcome, not an error.
    fn delete_message(
        &self,
        chat: ChatId,
        message: MessageId,
    ) -> Result<DeleteOutcome, TransportError>;

    /// Look a member up.
    fn get_member(&self, chat: ChatId, user: UserId) -> Result<MemberInfo, TransportError>;
}

impl<M: Messenger + ?Sized> Messenger for std::sync::Arc<M> {
    fn send_text(&self, chat: ChatId, text: &str) -> Result<MessageId, TransportError> {
        (**self).send_text(chat, text)
    }

    fn send_sticker(&self, chat: ChatId, sticker: &str) -> Result<MessageId, TransportError> {
        (**self).send_sticker(chat, sticker)
    }

    fn pin_message(&self, chat: ChatId, message: MessageId) -> Result<(), TransportError> {
        (**self).pin_message(chat, message)
    }

    fn delete_message(
        &self,
        chat: ChatId,
        message: MessageId,
    ) -> Result<DeleteOutcome, TransportError> {
        (**self).delete_message(chat, message)
    }

    fn get_member(&self, chat: ChatId, user: UserId) -> Result<MemberInfo, TransportError> {
        (**self).get_member(chat, user)
    }
}
