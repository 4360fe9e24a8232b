//! # prefect-bot — chat integration for the prefect engine
//!
//! This crate is the bridge between the platform-agnostic `prefect-core`
//! engine and an actual chat transport:
//!
//! - `messenger` — the collaborator trait a transport implements
//! - `activity` — the per-message handler driving the engine's control flow
//! - `commands` — text parsing for the engine's command surface
//! - `render` — structured engine results phrased for humans
//!
//! The split keeps "decide" and "render and send" apart: core returns
//! structured outcomes, this crate turns them into words and message ids.

pub mod activity;
pub mod commands;
pub mod messenger;
pub mod render;

use thiserror::Error;

pub use activity::{Bot, Inbound, ReplyRef};
pub use messenger::{MemberInfo, Messenger, TransportError};

/// Anything the bot layer can fail with.
#[derive(Error, Debug)]
pub enum BotError {
    /// The engine refused or the store failed.
    #[error(transparent)]
    Engine(#[from] prefect_core::EngineError),
    /// The platform transport failed outright.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, BotError>;
