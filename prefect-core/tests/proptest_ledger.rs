//! Property-based tests for the ledger, counters, and retention queue.
//!
//! These pin the arithmetic invariants the rest of the engine leans on:
//! balances are exact sums, counters count, expiry is a pure comparison.

use chrono::{Duration, Utc};
use proptest::prelude::*;

use prefect_core::ledger::Ledger;
use prefect_core::retention::{DeleteOutcome, RetentionQueue};
use prefect_core::store::Store;
use prefect_core::term::{Term, TermId};
use prefect_core::types::{ChatId, MessageId, UserId};

const CHAT: ChatId = ChatId(-500);

fn store_with_term() -> (Store, TermId) {
    let store = Store::open_in_memory().expect("open");
    let now = Utc::now();
    let term = Term {
        chat: CHAT,
        term_id: TermId::new(),
        start_at: now,
        end_at: now + Duration::days(7),
        is_current: true,
    };
    store.insert_term(&term).expect("insert term");
    (store, term.term_id)
}

proptest! {
    // The balance after any sequence of deltas is exactly their sum.
    #[test]
    fn balance_is_the_sum_of_deltas(deltas in prop::collection::vec(-50i64..=50, 1..40)) {
        let (store, term) = store_with_term();
        let ledger = Ledger::new(&store);
        let now = Utc::now();
        let user = UserId(1);

        let mut expected = 0;
        for delta in &deltas {
            expected += delta;
            let total = ledger.apply(CHAT, term, user, *delta, now).expect("apply");
            prop_assert_eq!(total, expected);
        }
        prop_assert_eq!(
            ledger.current_points(CHAT, term, user).expect("points"),
            expected
        );
    }

    // Applying a delta and its negation always restores the balance.
    #[test]
    fn delta_and_inverse_cancel(seed in -100i64..=100, delta in -20i64..=20) {
        let (store, term) = store_with_term();
        let ledger = Ledger::new(&store);
        let now = Utc::now();
        let user = UserId(7);

        ledger.apply(CHAT, term, user, seed, now).expect("seed");
        ledger.apply(CHAT, term, user, delta, now).expect("apply");
        ledger.apply(CHAT, term, user, -delta, now).expect("revert");
        prop_assert_eq!(
            ledger.current_points(CHAT, term, user).expect("points"),
            seed
        );
    }

    // Balances are independent per user.
    #[test]
    fn users_do_not_interfere(a in -30i64..=30, b in -30i64..=30) {
        let (store, term) = store_with_term();
        let ledger = Ledger::new(&store);
        let now = Utc::now();

        ledger.apply(CHAT, term, UserId(1), a, now).expect("apply a");
        ledger.apply(CHAT, term, UserId(2), b, now).expect("apply b");

        prop_assert_eq!(ledger.current_points(CHAT, term, UserId(1)).expect("a"), a);
        prop_assert_eq!(ledger.current_points(CHAT, term, UserId(2)).expect("b"), b);
    }

    // A counter bumped n times reads n; a reset brings it to 1.
    #[test]
    fn counters_count(n in 1usize..30) {
        let (store, _) = store_with_term();
        for i in 1..=n {
            let value = store.bump_counter(CHAT, "standard").expect("bump");
            prop_assert_eq!(value, i as i64);
        }
        store.reset_counter(CHAT, "standard").expect("reset");
        prop_assert_eq!(store.counter_value(CHAT, "standard").expect("value"), 1);
    }

    // A message is swept at time T exactly when created_at + ttl <= T.
    #[test]
    fn sweep_matches_the_expiry_comparison(ttl in 1i64..600, elapsed in 0i64..1200) {
        let (store, _) = store_with_term();
        let queue = RetentionQueue::new(&store);
        let now = Utc::now();

        queue.record(CHAT, MessageId(1), ttl, now).expect("record");
        let swept = queue
            .sweep(CHAT, now + Duration::seconds(elapsed), |_| DeleteOutcome::Deleted)
            .expect("sweep");

        let should_expire = ttl <= elapsed;
        prop_assert_eq!(swept == 1, should_expire);
    }
}
