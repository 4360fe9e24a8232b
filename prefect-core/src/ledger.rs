//! The per-term point ledger.
//!
//! Balances are scoped entirely to one term of one chat — a rollover starts
//! everyone at an implicit zero. Writes are atomic per (chat, term, user);
//! reads aggregate through the roster so departed members stop counting
//! toward totals and championships.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::Result;
use crate::house::House;
use crate::store::Store;
use crate::types::{ChatId, UserId};
use crate::term::TermId;

/// Per-house aggregation of one term's ledger.
#[derive(Debug, Clone)]
pub struct HouseTotals {
    rows: Vec<(House, i64, usize)>,
    /// Points held by unsorted members — "wasted", never competing.
    pub unaffiliated_points: i64,
}

impl HouseTotals {
    /// Total points of one competing house.
    #[must_use]
    pub fn total_of(&self, house: House) -> i64 {
        self.rows
            .iter()
            .find(|(h, _, _)| *h == house)
            .map_or(0, |(_, points, _)| *points)
    }

    /// How many ledger entries a competing house holds.
    #[must_use]
    pub fn entries_of(&self, house: House) -> usize {
        self.rows
            .iter()
            .find(|(h, _, _)| *h == house)
            .map_or(0, |(_, _, entries)| *entries)
    }

    /// Whether any competing house holds at least one entry.
    #[must_use]
    pub fn has_any_entries(&self) -> bool {
        self.rows.iter().any(|(_, _, entries)| *entries > 0)
    }

    /// Competing houses sorted by total descending; ties fall back to the
    /// declared house precedence.
    #[must_use]
    pub fn ranked_desc(&self) -> Vec<(House, i64)> {
        let mut ranked: Vec<(House, i64)> =
            self.rows.iter().map(|(h, points, _)| (*h, *points)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.precedence().cmp(&b.0.precedence())));
        ranked
    }

    /// The house currently leading the cup, or `None` when no competing
    /// house holds a single entry.
    #[must_use]
    pub fn leader(&self) -> Option<(House, i64)> {
        if !self.has_any_entries() {
            return None;
        }
        self.ranked_desc().into_iter().next()
    }
}

/// The ledger, backed by the store.
#[derive(Debug)]
pub struct Ledger<'a> {
    store: &'a Store,
}

impl<'a> Ledger<'a> {
    /// Wrap the store.
    #[must_use]
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// A user's current balance; 0 without creating an entry.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EngineError::Database`] on SQLite failures.
    pub fn current_points(&self, chat: ChatId, term: TermId, user: UserId) -> Result<i64> {
        self.store.points_of(chat, term, user)
    }

    /// Atomically apply `delta`, creating the entry if absent. Returns the
    /// new total.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EngineError::Database`] on SQLite failures.
    pub fn apply(
        &self,
        chat: ChatId,
        term: TermId,
        user: UserId,
        delta: i64,
        now: DateTime<Utc>,
    ) -> Result<i64> {
        let total = self.store.apply_points(chat, term, user, delta, now)?;
        debug!(chat = %chat, user = %user, delta, total, "ledger applied");
        Ok(total)
    }

    /// Reset one user to zero, returning their prior balance.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EngineError::Database`] on SQLite failures.
    pub fn reset_user(
        &self,
        chat: ChatId,
        term: TermId,
        user: UserId,
        now: DateTime<Utc>,
    ) -> Result<i64> {
        self.store.zero_points(chat, term, user, now)
    }

    /// Aggregate the term's entries per competing house.
    ///
    /// Only entries held by active members count; points of unsorted members
    /// land in `unaffiliated_points`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EngineError::Database`] on SQLite failures.
    pub fn summarize_by_house(&self, chat: ChatId, term: TermId) -> Result<HouseTotals> {
        let standings = self.store.term_standings(chat, term)?;

        let mut rows: Vec<(House, i64, usize)> =
            House::COMPETING.iter().map(|h| (*h, 0, 0)).collect();
        let mut unaffiliated = 0;

        for entry in standings {
            if !entry.status.is_active() {
                continue;
            }
            match entry.house {
                Some(house) if house != House::Unaffiliated => {
                    if let Some(row) = rows.iter_mut().find(|(h, _, _)| *h == house) {
                        row.1 += entry.points;
                        row.2 += 1;
                    }
                }
                _ => unaffiliated += entry.points,
            }
        }

        Ok(HouseTotals {
            rows,
            unaffiliated_points: unaffiliated,
        })
    }

    /// The highest-scoring active member of one house.
    ///
    /// Ties break to the higher balance first, then the lower user id, so
    /// the result is deterministic.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EngineError::Database`] on SQLite failures.
    pub fn champion_of(
        &self,
        chat: ChatId,
        term: TermId,
        house: House,
    ) -> Result<Option<(UserId, i64)>> {
        let standings = self.store.term_standings(chat, term)?;
        Ok(standings
            .into_iter()
            .filter(|e| e.status.is_active() && e.house == Some(house))
            .map(|e| (e.user, e.points))
            .min_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0))))
    }

    /// The single highest-scoring active member across all houses.
    ///
    /// Same tie-break as [`Ledger::champion_of`].
    ///
    /// # Errors
    ///
    /// Returns [`crate::EngineError::Database`] on SQLite failures.
    pub fn top_scorer(&self, chat: ChatId, term: TermId) -> Result<Option<(UserId, i64)>> {
        let standings = self.store.term_standings(chat, term)?;
        Ok(standings
            .into_iter()
            .filter(|e| e.status.is_active())
            .map(|e| (e.user, e.points))
            .min_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::Roster;
    use crate::types::MemberStatus;

    fn chat() -> ChatId {
        ChatId(-77)
    }

    fn setup() -> (Store, TermId, DateTime<Utc>) {
        let store = Store::open_in_memory().expect("open");
        let now = Utc::now();
        let term = crate::term::Term {
            chat: chat(),
            term_id: TermId::new(),
            start_at: now,
            end_at: now + chrono::Duration::days(7),
            is_current: true,
        };
        store.insert_term(&term).expect("insert term");
        (store, term.term_id, now)
    }

    fn enroll(store: &Store, user: UserId, name: &str, house: House, now: DateTime<Utc>) {
        let roster = Roster::new(store);
        roster
            .record_activity(chat(), user, name, MemberStatus::Member, now)
            .expect("record");
        roster.assign_house(chat(), user, house).expect("assign");
    }

    #[test]
    fn apply_then_revert_returns_to_original() {
        let (store, term, now) = setup();
        let ledger = Ledger::new(&store);
        let user = UserId(1);

        let before = ledger.current_points(chat(), term, user).expect("points");
        ledger.apply(chat(), term, user, 1, now).expect("plus");
        ledger.apply(chat(), term, user, -1, now).expect("minus");
        let after = ledger.current_points(chat(), term, user).expect("points");
        assert_eq!(before, after);
    }

    #[test]
    fn summaries_skip_inactive_members() {
        let (store, term, now) = setup();
        let ledger = Ledger::new(&store);

        enroll(&store, UserId(1), "harry", House::Gryffindor, now);
        enroll(&store, UserId(2), "draco", House::Slytherin, now);
        ledger.apply(chat(), term, UserId(1), 5, now).expect("apply");
        ledger.apply(chat(), term, UserId(2), 9, now).expect("apply");

        store
            .set_status(chat(), UserId(2), MemberStatus::Left)
            .expect("leave");

        let totals = ledger.summarize_by_house(chat(), term).expect("summary");
        assert_eq!(totals.total_of(House::Gryffindor), 5);
        assert_eq!(totals.total_of(House::Slytherin), 0);
        assert_eq!(totals.leader(), Some((House::Gryffindor, 5)));
    }

    #[test]
    fn unaffiliated_points_are_wasted() {
        let (store, term, now) = setup();
        let ledger = Ledger::new(&store);

        let roster = Roster::new(&store);
        roster
            .record_activity(chat(), UserId(3), "muggle", MemberStatus::Member, now)
            .expect("record");
        ledger.apply(chat(), term, UserId(3), 4, now).expect("apply");

        let totals = ledger.summarize_by_house(chat(), term).expect("summary");
        assert_eq!(totals.unaffiliated_points, 4);
        assert!(!totals.has_any_entries());
        assert_eq!(totals.leader(), None);
    }

    #[test]
    fn champion_tie_breaks_to_lowest_user_id() {
        let (store, term, now) = setup();
        let ledger = Ledger::new(&store);

        enroll(&store, UserId(10), "fred", House::Gryffindor, now);
        enroll(&store, UserId(4), "george", House::Gryffindor, now);
        ledger.apply(chat(), term, UserId(10), 7, now).expect("apply");
        ledger.apply(chat(), term, UserId(4), 7, now).expect("apply");

        let champion = ledger
            .champion_of(chat(), term, House::Gryffindor)
            .expect("champion");
        assert_eq!(champion, Some((UserId(4), 7)));
    }

    #[test]
    fn ranked_ties_follow_declared_precedence() {
        let (store, term, now) = setup();
        let ledger = Ledger::new(&store);

        enroll(&store, UserId(1), "cedric", House::Hufflepuff, now);
        enroll(&store, UserId(2), "cho", House::Ravenclaw, now);
        ledger.apply(chat(), term, UserId(1), 6, now).expect("apply");
        ledger.apply(chat(), term, UserId(2), 6, now).expect("apply");

        let ranked = ledger
            .summarize_by_house(chat(), term)
            .expect("summary")
            .ranked_desc();
        // Hufflepuff precedes Ravenclaw in the declared order.
        assert_eq!(ranked[0], (House::Hufflepuff, 6));
        assert_eq!(ranked[1], (House::Ravenclaw, 6));
    }

    #[test]
    fn top_scorer_spans_houses() {
        let (store, term, now) = setup();
        let ledger = Ledger::new(&store);

        enroll(&store, UserId(1), "harry", House::Gryffindor, now);
        enroll(&store, UserId(2), "luna", House::Ravenclaw, now);
        ledger.apply(chat(), term, UserId(1), 3, now).expect("apply");
        ledger.apply(chat(), term, UserId(2), 11, now).expect("apply");

        assert_eq!(
            ledger.top_scorer(chat(), term).expect("top"),
            Some((UserId(2), 11))
        );
    }
}
