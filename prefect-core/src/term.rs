//! Terms — the fixed-length competitive seasons — and their rollover.
//!
//! A chat always has at most one current term. Expiry is detected lazily on
//! the next activity; the rollover summarizes the closing term, overwrites
//! the last-winner snapshot, closes the stale term exactly once (CAS on
//! `is_current`), and opens the next one.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub use crate::types::TermId;

use crate::error::Result;
use crate::house::House;
use crate::ledger::{HouseTotals, Ledger};
use crate::store::Store;
use crate::types::{ChatId, UserId};

/// One competitive period of one chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    /// The chat this term belongs to.
    pub chat: ChatId,
    /// The term's unique id.
    pub term_id: TermId,
    /// When the term began.
    pub start_at: DateTime<Utc>,
    /// When the term is due to end.
    pub end_at: DateTime<Utc>,
    /// Whether this is the chat's live term.
    pub is_current: bool,
}

/// The "last term" snapshot — one row per chat, overwritten at rollover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoricalWinner {
    /// The chat the snapshot belongs to.
    pub chat: ChatId,
    /// The house that took the cup.
    pub winning_house: House,
    /// The winning house's final total.
    pub house_points: i64,
    /// The winning house's champion, if any active member held an entry.
    pub champion_user: Option<UserId>,
    /// The champion's final balance (0 when there was no champion).
    pub champion_points: i64,
}

/// Everything the rollover broadcast needs about the closing term.
#[derive(Debug, Clone)]
pub struct TermSummary {
    /// Final per-house totals.
    pub totals: HouseTotals,
    /// Final champion of every competing house, in declared order.
    pub champions: Vec<(House, Option<(UserId, i64)>)>,
    /// The cup winner, or `None` when nobody scored all term.
    pub winner: Option<HistoricalWinner>,
}

/// Result of asking for the current term.
#[derive(Debug, Clone)]
pub enum TermTransition {
    /// The existing term is still running.
    Current(Term),
    /// The chat's very first term was just created.
    Started(Term),
    /// A stale term was closed and a fresh one opened.
    RolledOver {
        /// The term that just ended.
        closed: Term,
        /// The term that just began.
        new: Term,
        /// Final standings of the closed term, for the broadcast.
        summary: TermSummary,
    },
}

impl TermTransition {
    /// The term that is current after the transition.
    #[must_use]
    pub fn term(&self) -> &Term {
        match self {
            Self::Current(term) | Self::Started(term) => term,
            Self::RolledOver { new, .. } => new,
        }
    }
}

/// Owns term lifecycle per chat, backed by the store.
#[derive(Debug)]
pub struct TermManager<'a> {
    store: &'a Store,
}

impl<'a> TermManager<'a> {
    /// Wrap the store.
    #[must_use]
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Return the chat's current term, creating or rolling it over first if
    /// needed.
    ///
    /// Only one caller can complete a rollover for a given stale term; a
    /// concurrent caller that loses the compare-and-swap simply returns the
    /// fresh term without a summary.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EngineError::Database`] on SQLite failures.
    pub fn ensure_current(
        &self,
        chat: ChatId,
        term_length_days: i64,
        now: DateTime<Utc>,
    ) -> Result<TermTransition> {
        let Some(current) = self.store.current_term(chat)? else {
            let term = self.start_term(chat, term_length_days, now)?;
            info!(chat = %chat, term = %term.term_id, "first term started");
            return Ok(TermTransition::Started(term));
        };

        if now < current.end_at {
            return Ok(TermTransition::Current(current));
        }

        // Stale. Summarize before the swap so the broadcast reflects the
        // closing term even if entries trickle in behind us.
        let summary = self.summarize(chat, current.term_id)?;

        if !self.store.close_term(chat, current.term_id)? {
            // Someone else completed this rollover; hand back whatever term
            // is current now.
            debug!(chat = %chat, "lost rollover race");
            return match self.store.current_term(chat)? {
                Some(term) => Ok(TermTransition::Current(term)),
                None => Ok(TermTransition::Started(
                    self.start_term(chat, term_length_days, now)?,
                )),
            };
        }

        if let Some(winner) = &summary.winner {
            self.store.record_winner(winner)?;
        }

        let new = self.start_term(chat, term_length_days, now)?;
        info!(
            chat = %chat,
            closed = %current.term_id,
            new = %new.term_id,
            winner = summary.winner.map(|w| w.winning_house.display_name()),
            "term rolled over"
        );

        Ok(TermTransition::RolledOver {
            closed: Term {
                is_current: false,
                ..current
            },
            new,
            summary,
        })
    }

    /// Final standings of a term: totals, per-house champions, cup winner.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EngineError::Database`] on SQLite failures.
    pub fn summarize(&self, chat: ChatId, term: TermId) -> Result<TermSummary> {
        let ledger = Ledger::new(self.store);
        let totals = ledger.summarize_by_house(chat, term)?;

        let mut champions = Vec::with_capacity(House::COMPETING.len());
        for house in House::COMPETING {
            champions.push((house, ledger.champion_of(chat, term, house)?));
        }

        let winner = totals.leader().map(|(house, points)| {
            let champion = champions
                .iter()
                .find(|(h, _)| *h == house)
                .and_then(|(_, c)| *c);
            HistoricalWinner {
                chat,
                winning_house: house,
                house_points: points,
                champion_user: champion.map(|(user, _)| user),
                champion_points: champion.map_or(0, |(_, points)| points),
            }
        });

        Ok(TermSummary {
            totals,
            champions,
            winner,
        })
    }

    fn start_term(&self, chat: ChatId, term_length_days: i64, now: DateTime<Utc>) -> Result<Term> {
        let term = Term {
            chat,
            term_id: TermId::new(),
            start_at: now,
            end_at: now + Duration::days(term_length_days),
            is_current: true,
        };
        self.store.insert_term(&term)?;
        Ok(term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::Roster;
    use crate::types::MemberStatus;

    fn chat() -> ChatId {
        ChatId(-3)
    }

    #[test]
    fn first_activity_starts_a_term() {
        let store = Store::open_in_memory().expect("open");
        let manager = TermManager::new(&store);
        let now = Utc::now();

        let transition = manager.ensure_current(chat(), 7, now).expect("ensure");
        let term = match transition {
            TermTransition::Started(term) => term,
            other => panic!("expected Started, got {other:?}"),
        };
        assert_eq!(term.end_at, now + Duration::days(7));
        assert!(term.is_current);
    }

    #[test]
    fn running_term_is_returned_unchanged() {
        let store = Store::open_in_memory().expect("open");
        let manager = TermManager::new(&store);
        let now = Utc::now();

        let started = manager.ensure_current(chat(), 7, now).expect("ensure");
        let again = manager
            .ensure_current(chat(), 7, now + Duration::days(3))
            .expect("ensure");

        match again {
            TermTransition::Current(term) => {
                assert_eq!(term.term_id, started.term().term_id);
            }
            other => panic!("expected Current, got {other:?}"),
        }
    }

    #[test]
    fn expiry_rolls_over_exactly_once() {
        let store = Store::open_in_memory().expect("open");
        let manager = TermManager::new(&store);
        let now = Utc::now();

        let started = manager.ensure_current(chat(), 7, now).expect("ensure");
        let first_id = started.term().term_id;

        let later = now + Duration::days(8);
        let rolled = manager.ensure_current(chat(), 7, later).expect("ensure");
        let new_id = match rolled {
            TermTransition::RolledOver { closed, new, .. } => {
                assert_eq!(closed.term_id, first_id);
                assert!(!closed.is_current);
                new.term_id
            }
            other => panic!("expected RolledOver, got {other:?}"),
        };

        // A second caller at the same instant sees the fresh term, not
        // another rollover.
        let repeat = manager.ensure_current(chat(), 7, later).expect("ensure");
        match repeat {
            TermTransition::Current(term) => assert_eq!(term.term_id, new_id),
            other => panic!("expected Current, got {other:?}"),
        }
    }

    #[test]
    fn rollover_records_the_winner_snapshot() {
        let store = Store::open_in_memory().expect("open");
        let manager = TermManager::new(&store);
        let roster = Roster::new(&store);
        let ledger = Ledger::new(&store);
        let now = Utc::now();

        let term = manager.ensure_current(chat(), 7, now).expect("ensure");
        let term_id = term.term().term_id;

        roster
            .record_activity(chat(), UserId(1), "cedric", MemberStatus::Member, now)
            .expect("record");
        roster
            .assign_house(chat(), UserId(1), House::Hufflepuff)
            .expect("assign");
        ledger.apply(chat(), term_id, UserId(1), 10, now).expect("apply");

        let rolled = manager
            .ensure_current(chat(), 7, now + Duration::days(8))
            .expect("ensure");
        match rolled {
            TermTransition::RolledOver { summary, .. } => {
                let winner = summary.winner.expect("winner");
                assert_eq!(winner.winning_house, House::Hufflepuff);
                assert_eq!(winner.house_points, 10);
                assert_eq!(winner.champion_user, Some(UserId(1)));
            }
            other => panic!("expected RolledOver, got {other:?}"),
        }

        let snapshot = store.last_winner(chat()).expect("get").expect("exists");
        assert_eq!(snapshot.winning_house, House::Hufflepuff);
    }

    #[test]
    fn scoreless_rollover_leaves_no_snapshot() {
        let store = Store::open_in_memory().expect("open");
        let manager = TermManager::new(&store);
        let now = Utc::now();

        manager.ensure_current(chat(), 7, now).expect("ensure");
        let rolled = manager
            .ensure_current(chat(), 7, now + Duration::days(8))
            .expect("ensure");
        match rolled {
            TermTransition::RolledOver { summary, .. } => {
                assert!(summary.winner.is_none());
            }
            other => panic!("expected RolledOver, got {other:?}"),
        }
        assert!(store.last_winner(chat()).expect("get").is_none());
    }

    #[test]
    fn winner_tie_breaks_to_declared_order() {
        let store = Store::open_in_memory().expect("open");
        let manager = TermManager::new(&store);
        let roster = Roster::new(&store);
        let ledger = Ledger::new(&store);
        let now = Utc::now();

        let term = manager.ensure_current(chat(), 7, now).expect("ensure");
        let term_id = term.term().term_id;

        for (user, name, house) in [
            (UserId(1), "blaise", House::Slytherin),
            (UserId(2), "terry", House::Ravenclaw),
        ] {
            roster
                .record_activity(chat(), user, name, MemberStatus::Member, now)
                .expect("record");
            roster.assign_house(chat(), user, house).expect("assign");
            ledger.apply(chat(), term_id, user, 8, now).expect("apply");
        }

        let summary = manager.summarize(chat(), term_id).expect("summary");
        // Slytherin precedes Ravenclaw in the declared order.
        assert_eq!(
            summary.winner.map(|w| w.winning_house),
            Some(House::Slytherin)
        );
    }
}
