//! The engine façade — one handle bundling the store, the configuration,
//! and the per-chat serialization locks.
//!
//! All engine operations run synchronously inside the handling of one
//! inbound activity. Activities of the same chat are serialized through
//! that chat's lock; different chats share nothing but the store, whose own
//! per-operation locking keeps them independent.

use std::path::Path;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;

use crate::config::EngineConfig;
use crate::error::Result;
use crate::event::{EventEngine, SnitchGame};
use crate::ledger::Ledger;
use crate::modifier::ModifierRegistry;
use crate::retention::RetentionQueue;
use crate::roster::Roster;
use crate::rules::RulesEvaluator;
use crate::store::Store;
use crate::term::TermManager;
use crate::types::ChatId;

/// The assembled reputation economy engine.
#[derive(Debug)]
pub struct Engine {
    store: Store,
    config: EngineConfig,
    chat_locks: DashMap<i64, Arc<Mutex<()>>>,
}

impl Engine {
    /// Open (or create) an engine backed by the database at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EngineError::Database`] on SQLite failures.
    pub fn open<P: AsRef<Path>>(path: P, config: EngineConfig) -> Result<Self> {
        Ok(Self {
            store: Store::open(path)?,
            config,
            chat_locks: DashMap::new(),
        })
    }

    /// Open an engine backed by an in-memory database (useful for tests).
    ///
    /// # Errors
    ///
    /// Returns [`crate::EngineError::Database`] on SQLite failures.
    pub fn in_memory(config: EngineConfig) -> Result<Self> {
        Ok(Self {
            store: Store::open_in_memory()?,
            config,
            chat_locks: DashMap::new(),
        })
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// The engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The serialization lock for one chat.
    ///
    /// Callers hold it for the whole handling of an inbound activity;
    /// different chats get different locks and proceed independently.
    #[must_use]
    pub fn chat_lock(&self, chat: ChatId) -> Arc<Mutex<()>> {
        self.chat_locks.entry(chat.0).or_default().clone()
    }

    /// The point ledger.
    #[must_use]
    pub fn ledger(&self) -> Ledger<'_> {
        Ledger::new(&self.store)
    }

    /// The participant roster.
    #[must_use]
    pub fn roster(&self) -> Roster<'_> {
        Roster::new(&self.store)
    }

    /// The term manager.
    #[must_use]
    pub fn terms(&self) -> TermManager<'_> {
        TermManager::new(&self.store)
    }

    /// The modifier registry.
    #[must_use]
    pub fn modifiers(&self) -> ModifierRegistry<'_> {
        ModifierRegistry::new(&self.store)
    }

    /// The rules evaluator.
    #[must_use]
    pub fn rules(&self) -> RulesEvaluator<'_> {
        RulesEvaluator::new(&self.store, self.config.awards.admin_bound)
    }

    /// The random-event engine.
    #[must_use]
    pub fn events(&self) -> EventEngine<'_> {
        EventEngine::new(&self.store, &self.config.events)
    }

    /// The snitch mini-game.
    #[must_use]
    pub fn snitch(&self) -> SnitchGame<'_> {
        SnitchGame::new(&self.store, &self.config.events)
    }

    /// The transient-message retention queue.
    #[must_use]
    pub fn retention(&self) -> RetentionQueue<'_> {
        RetentionQueue::new(&self.store)
    }
}
