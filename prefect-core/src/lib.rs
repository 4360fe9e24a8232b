//! # Prefect Core Library
//!
//! Platform-agnostic reputation economy engine for group chats.
//!
//! Every chat runs a term-bounded point ledger with a cast of moving parts:
//!
//! - **Ledger** — per-term, per-user balances with atomic increments
//! - **TermManager** — fixed-length seasons, lazy rollover, winner snapshots
//! - **ModifierRegistry** — time-boxed Boost/Block overlays per house
//! - **RulesEvaluator** — peer reactions composed with the active modifiers
//! - **EventEngine** — counter-driven weighted-random flavor events
//! - **MessageRetentionQueue** — TTL-based cleanup of transient announcements
//!
//! ## Execution model
//!
//! Everything is synchronous and lazily evaluated: expiry of terms,
//! modifiers, and service messages is detected on the next activity that
//! touches the chat, never by a background timer. Activities of one chat are
//! serialized; different chats proceed independently.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod format;
pub mod house;
pub mod ledger;
pub mod modifier;
pub mod retention;
pub mod roster;
pub mod rules;
pub mod store;
pub mod term;
pub mod types;

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{EngineError, Result};
pub use house::House;
pub use types::*;
