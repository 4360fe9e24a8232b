//! Effective-delta rules for peer reactions and administrator awards.
//!
//! The evaluator composes the modifier registry with the ledger: a Boost on
//! the receiver's house doubles a positive peer reaction, a Block swallows
//! it outright. Negative reactions and administrator awards ignore
//! modifiers entirely — the asymmetry is inherited from the rules as they
//! shipped and is left intact deliberately.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{EngineError, Result};
use crate::ledger::Ledger;
use crate::modifier::{ModifierKind, ModifierRegistry};
use crate::store::Store;
use crate::term::TermId;
use crate::types::{ChatId, UserId};

/// Result of a peer ± reaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionOutcome {
    /// A Block on the receiver's house swallowed the point; the ledger is
    /// untouched.
    Blocked,
    /// The reaction landed.
    Applied {
        /// The receiver's new balance.
        new_total: i64,
        /// Whether a Boost doubled the delta.
        boosted: bool,
    },
}

/// Rules evaluation over the ledger and modifier registry.
#[derive(Debug)]
pub struct RulesEvaluator<'a> {
    store: &'a Store,
    admin_bound: i64,
}

impl<'a> RulesEvaluator<'a> {
    /// Wrap the store with the configured administrator award bound.
    #[must_use]
    pub fn new(store: &'a Store, admin_bound: i64) -> Self {
        Self { store, admin_bound }
    }

    /// Apply a peer +1/-1 reaction from `from_user` to `to_user`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::MemberNotFound`] when the receiver has never
    /// been on the roster (nothing is written), or
    /// [`crate::EngineError::Database`] on SQLite failures.
    pub fn evaluate_peer_reaction(
        &self,
        chat: ChatId,
        term: TermId,
        from_user: UserId,
        to_user: UserId,
        sign: i64,
        now: DateTime<Utc>,
    ) -> Result<ReactionOutcome> {
        let sign = sign.signum();
        let receiver = self
            .store
            .member(chat, to_user)?
            .ok_or(EngineError::MemberNotFound {
                chat,
                user: to_user,
            })?;
        let house = receiver.house_or_unaffiliated();

        let registry = ModifierRegistry::new(self.store);
        let modifier = registry.active_modifier(chat, house, now)?;

        if sign > 0 {
            if let Some(m) = &modifier {
                if m.kind == ModifierKind::Block {
                    debug!(chat = %chat, from = %from_user, to = %to_user, "reaction blocked");
                    return Ok(ReactionOutcome::Blocked);
                }
            }
        }

        // Boost doubles positive deltas only; negative reactions always
        // land at face value, Block or not.
        let boosted =
            sign > 0 && modifier.is_some_and(|m| m.kind == ModifierKind::Boost);
        let delta = if boosted { 2 * sign } else { sign };

        let ledger = Ledger::new(self.store);
        let new_total = ledger.apply(chat, term, to_user, delta, now)?;
        Ok(ReactionOutcome::Applied { new_total, boosted })
    }

    /// Administrator bulk award: apply `amount` directly, bypassing
    /// modifiers.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::AwardOutOfBounds`] when `|amount|` exceeds the
    /// configured cap (nothing is written),
    /// [`EngineError::MemberNotFound`] for a receiver the roster has never
    /// seen, or [`crate::EngineError::Database`] on SQLite failures.
    pub fn bulk_award(
        &self,
        chat: ChatId,
        term: TermId,
        to_user: UserId,
        amount: i64,
        now: DateTime<Utc>,
    ) -> Result<i64> {
        if amount.abs() > self.admin_bound {
            return Err(EngineError::AwardOutOfBounds {
                amount,
                bound: self.admin_bound,
            });
        }
        if self.store.member(chat, to_user)?.is_none() {
            return Err(EngineError::MemberNotFound {
                chat,
                user: to_user,
            });
        }
        let ledger = Ledger::new(self.store);
        ledger.apply(chat, term, to_user, amount, now)
    }
}
