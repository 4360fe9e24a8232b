//! The counter-driven weighted-random event engine.
//!
//! Every inbound message advances a per-chat, per-tier persisted counter;
//! when a counter passes its configured frequency it resets to 1 and one
//! outcome of that tier fires. Outcome *selection* is a pure function of a
//! uniform draw over the tier's outcome count — the RNG is injected so
//! tests can pin it — while outcome *execution* mutates the ledger, the
//! modifier registry, or the snitch state and returns a structured
//! [`EventResult`] for the caller to render.
//!
//! Point changes made here go through the ledger directly: Boosts and
//! Blocks never apply to event awards, only to peer reactions.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, info};

use crate::config::EventConfig;
use crate::error::Result;
use crate::house::House;
use crate::ledger::Ledger;
use crate::modifier::{Modifier, ModifierKind, ModifierRegistry};
use crate::retention::{MessageKind, MessageStatus, ServiceMessage};
use crate::store::Store;
use crate::term::TermId;
use crate::types::{ChatId, MessageId, UserId};

/// Severity class of a random event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTier {
    /// Frequent, mild outcomes.
    Standard,
    /// Rare, major outcomes.
    Epic,
}

impl EventTier {
    /// Name of the persisted per-chat counter for this tier.
    #[must_use]
    pub fn counter_name(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Epic => "epic",
        }
    }

    /// How many outcomes the tier can fire.
    #[must_use]
    pub fn outcome_count(self) -> usize {
        match self {
            Self::Standard => StandardOutcome::COUNT,
            Self::Epic => EpicOutcome::COUNT,
        }
    }
}

/// The seven equally-weighted Standard outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardOutcome {
    /// Post a catchable snitch; the first correct reply earns the award.
    AnnounceSnitch,
    /// Deduct 10 from the most recent speaker.
    SpeakerLosesTen,
    /// Award 10 to one uniformly random active member.
    RandomMemberGainsTen,
    /// Deduct 2 from the most recent speaker.
    SpeakerLosesTwo,
    /// Award 2 to the most recent speaker.
    SpeakerGainsTwo,
    /// Deduct 5 from each of three distinct random members.
    TrioLosesFive,
    /// Award 5 to each of three distinct random members.
    TrioGainsFive,
}

impl StandardOutcome {
    /// Number of Standard outcomes.
    pub const COUNT: usize = 7;

    /// Map a uniform draw in `0..COUNT` to an outcome.
    #[must_use]
    pub fn from_index(index: usize) -> Self {
        match index {
            0 => Self::AnnounceSnitch,
            1 => Self::SpeakerLosesTen,
            2 => Self::RandomMemberGainsTen,
            3 => Self::SpeakerLosesTwo,
            4 => Self::SpeakerGainsTwo,
            5 => Self::TrioLosesFive,
            _ => Self::TrioGainsFive,
        }
    }
}

/// The four equally-weighted Epic outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpicOutcome {
    /// Block the most recent speaker's house for the modifier TTL.
    BlockSpeakerHouse,
    /// Boost the most recent speaker's house for the modifier TTL.
    BoostSpeakerHouse,
    /// Reset the term's top scorer to zero.
    ZeroTopScorer,
    /// Flat bonus to the champion of the lowest-totalling house with data.
    UnderdogBonus,
}

impl EpicOutcome {
    /// Number of Epic outcomes.
    pub const COUNT: usize = 4;

    /// Map a uniform draw in `0..COUNT` to an outcome.
    #[must_use]
    pub fn from_index(index: usize) -> Self {
        match index {
            0 => Self::BlockSpeakerHouse,
            1 => Self::BoostSpeakerHouse,
            2 => Self::ZeroTopScorer,
            _ => Self::UnderdogBonus,
        }
    }
}

/// The activity that advanced the counters.
#[derive(Debug, Clone, Copy)]
pub struct EventContext {
    /// The chat being handled.
    pub chat: ChatId,
    /// The chat's current term.
    pub term: TermId,
    /// Sender of the triggering message — the "most recent active speaker".
    pub speaker: UserId,
    /// Wall-clock instant of the activity.
    pub now: DateTime<Utc>,
}

/// Structured result of a fired event, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventResult {
    /// A snitch was released; the caller must announce it and register the
    /// announcement via [`SnitchGame::announced`]. The only outcome that
    /// applies no points immediately.
    SnitchAnnounced {
        /// Points the catcher will receive.
        award: i64,
        /// When the snitch escapes.
        expires_at: DateTime<Utc>,
    },
    /// The most recent speaker lost points.
    SpeakerDeducted {
        /// Who lost them.
        user: UserId,
        /// How many (positive number).
        amount: i64,
        /// Their new balance.
        new_total: i64,
    },
    /// The most recent speaker gained points.
    SpeakerAwarded {
        /// Who gained them.
        user: UserId,
        /// How many.
        amount: i64,
        /// Their new balance.
        new_total: i64,
    },
    /// A random member gained points.
    RandomAwarded {
        /// Who gained them.
        user: UserId,
        /// How many.
        amount: i64,
        /// Their new balance.
        new_total: i64,
    },
    /// Several distinct members lost points each.
    GroupDeducted {
        /// How many each lost (positive number).
        amount: i64,
        /// (user, new balance) per member hit.
        changes: Vec<(UserId, i64)>,
    },
    /// Several distinct members gained points each.
    GroupAwarded {
        /// How many each gained.
        amount: i64,
        /// (user, new balance) per member hit.
        changes: Vec<(UserId, i64)>,
    },
    /// A modifier was installed on a house.
    ModifierInstalled {
        /// The installed overlay.
        modifier: Modifier,
    },
    /// The term's top scorer was reset to zero.
    TopScorerZeroed {
        /// Who was reset.
        user: UserId,
        /// Their balance before the reset — reported here only, never
        /// persisted.
        prior_total: i64,
    },
    /// The lowest-ranked house's champion got the flat bonus.
    UnderdogRewarded {
        /// The house that was trailing.
        house: House,
        /// Its champion.
        champion: UserId,
        /// The bonus paid.
        amount: i64,
        /// The champion's new balance.
        new_total: i64,
    },
    /// The drawn outcome had nothing to act on.
    Nothing,
}

/// The event engine, backed by the store.
#[derive(Debug)]
pub struct EventEngine<'a> {
    store: &'a Store,
    config: &'a EventConfig,
}

impl<'a> EventEngine<'a> {
    /// Wrap the store with the event configuration.
    #[must_use]
    pub fn new(store: &'a Store, config: &'a EventConfig) -> Self {
        Self { store, config }
    }

    /// Advance the tier's counter; fire one outcome when it passes
    /// `frequency`.
    ///
    /// The counter resets to 1, not 0 — the firing message counts as the
    /// first of the next cycle.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EngineError::Database`] on SQLite failures.
    pub fn tick<R: Rng>(
        &self,
        ctx: &EventContext,
        tier: EventTier,
        frequency: i64,
        rng: &mut R,
    ) -> Result<Option<EventResult>> {
        let value = self.store.bump_counter(ctx.chat, tier.counter_name())?;
        if value <= frequency {
            return Ok(None);
        }
        self.store.reset_counter(ctx.chat, tier.counter_name())?;

        let index = rng.gen_range(0..tier.outcome_count());
        debug!(chat = %ctx.chat, tier = tier.counter_name(), index, "event fired");

        let result = match tier {
            EventTier::Standard => {
                self.execute_standard(ctx, StandardOutcome::from_index(index), rng)?
            }
            EventTier::Epic => self.execute_epic(ctx, EpicOutcome::from_index(index))?,
        };
        Ok(Some(result))
    }

    /// Execute one Standard outcome.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EngineError::Database`] on SQLite failures.
    pub fn execute_standard<R: Rng>(
        &self,
        ctx: &EventContext,
        outcome: StandardOutcome,
        rng: &mut R,
    ) -> Result<EventResult> {
        let ledger = Ledger::new(self.store);
        match outcome {
            StandardOutcome::AnnounceSnitch => Ok(EventResult::SnitchAnnounced {
                award: self.config.snitch_award,
                expires_at: ctx.now + Duration::seconds(self.config.snitch_ttl_seconds),
            }),
            StandardOutcome::SpeakerLosesTen => {
                let new_total = ledger.apply(ctx.chat, ctx.term, ctx.speaker, -10, ctx.now)?;
                Ok(EventResult::SpeakerDeducted {
                    user: ctx.speaker,
                    amount: 10,
                    new_total,
                })
            }
            StandardOutcome::RandomMemberGainsTen => {
                let pool = self.store.active_members(ctx.chat)?;
                let Some(member) = pool.choose(rng) else {
                    return Ok(EventResult::Nothing);
                };
                let new_total = ledger.apply(ctx.chat, ctx.term, member.user, 10, ctx.now)?;
                Ok(EventResult::RandomAwarded {
                    user: member.user,
                    amount: 10,
                    new_total,
                })
            }
            StandardOutcome::SpeakerLosesTwo => {
                let new_total = ledger.apply(ctx.chat, ctx.term, ctx.speaker, -2, ctx.now)?;
                Ok(EventResult::SpeakerDeducted {
                    user: ctx.speaker,
                    amount: 2,
                    new_total,
                })
            }
            StandardOutcome::SpeakerGainsTwo => {
                let new_total = ledger.apply(ctx.chat, ctx.term, ctx.speaker, 2, ctx.now)?;
                Ok(EventResult::SpeakerAwarded {
                    user: ctx.speaker,
                    amount: 2,
                    new_total,
                })
            }
            StandardOutcome::TrioLosesFive => {
                let changes = self.touch_trio(ctx, -5, rng)?;
                if changes.is_empty() {
                    return Ok(EventResult::Nothing);
                }
                Ok(EventResult::GroupDeducted { amount: 5, changes })
            }
            StandardOutcome::TrioGainsFive => {
                let changes = self.touch_trio(ctx, 5, rng)?;
                if changes.is_empty() {
                    return Ok(EventResult::Nothing);
                }
                Ok(EventResult::GroupAwarded { amount: 5, changes })
            }
        }
    }

    /// Execute one Epic outcome.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EngineError::Database`] on SQLite failures.
    pub fn execute_epic(&self, ctx: &EventContext, outcome: EpicOutcome) -> Result<EventResult> {
        let ledger = Ledger::new(self.store);
        match outcome {
            EpicOutcome::BlockSpeakerHouse | EpicOutcome::BoostSpeakerHouse => {
                let kind = if outcome == EpicOutcome::BlockSpeakerHouse {
                    ModifierKind::Block
                } else {
                    ModifierKind::Boost
                };
                let house = self
                    .store
                    .member(ctx.chat, ctx.speaker)?
                    .map_or(House::Unaffiliated, |m| m.house_or_unaffiliated());
                let modifier = ModifierRegistry::new(self.store).install(
                    ctx.chat,
                    kind,
                    house,
                    self.config.modifier_ttl_seconds,
                    ctx.now,
                )?;
                Ok(EventResult::ModifierInstalled { modifier })
            }
            EpicOutcome::ZeroTopScorer => {
                let Some((user, prior_total)) = ledger.top_scorer(ctx.chat, ctx.term)? else {
                    return Ok(EventResult::Nothing);
                };
                ledger.reset_user(ctx.chat, ctx.term, user, ctx.now)?;
                info!(chat = %ctx.chat, user = %user, prior_total, "top scorer zeroed");
                Ok(EventResult::TopScorerZeroed { user, prior_total })
            }
            EpicOutcome::UnderdogBonus => {
                let totals = ledger.summarize_by_house(ctx.chat, ctx.term)?;
                let mut candidates: Vec<(House, i64)> = House::COMPETING
                    .iter()
                    .filter(|h| totals.entries_of(**h) > 0)
                    .map(|h| (*h, totals.total_of(*h)))
                    .collect();
                // HouseElf only competes for the bonus when nobody else has
                // any data.
                if candidates.iter().any(|(h, _)| *h != House::HouseElf) {
                    candidates.retain(|(h, _)| *h != House::HouseElf);
                }
                candidates
                    .sort_by(|a, b| a.1.cmp(&b.1).then(a.0.precedence().cmp(&b.0.precedence())));

                let Some((house, _)) = candidates.first().copied() else {
                    return Ok(EventResult::Nothing);
                };
                let Some((champion, _)) = ledger.champion_of(ctx.chat, ctx.term, house)? else {
                    return Ok(EventResult::Nothing);
                };
                let new_total = ledger.apply(
                    ctx.chat,
                    ctx.term,
                    champion,
                    self.config.underdog_bonus,
                    ctx.now,
                )?;
                Ok(EventResult::UnderdogRewarded {
                    house,
                    champion,
                    amount: self.config.underdog_bonus,
                    new_total,
                })
            }
        }
    }

    fn touch_trio<R: Rng>(
        &self,
        ctx: &EventContext,
        delta: i64,
        rng: &mut R,
    ) -> Result<Vec<(UserId, i64)>> {
        let ledger = Ledger::new(self.store);
        let pool = self.store.active_members(ctx.chat)?;
        let picked = pool.choose_multiple(rng, 3);
        let mut changes = Vec::new();
        for member in picked {
            let new_total = ledger.apply(ctx.chat, ctx.term, member.user, delta, ctx.now)?;
            changes.push((member.user, new_total));
        }
        Ok(changes)
    }
}

// ---------------------------------------------------------------------------
// Snitch mini-game
// ---------------------------------------------------------------------------

/// Result of a correct catch phrase arriving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnitchOutcome {
    /// First correct reply while the snitch was open.
    Caught {
        /// Points awarded.
        award: i64,
        /// The catcher's new balance.
        new_total: i64,
    },
    /// Correct phrase, but the snitch was already caught or has escaped.
    TooLate,
}

/// The snitch's persisted state machine: Announced(open) → Caught(closed),
/// or swept away once its TTL elapses. There is no suspended wait anywhere —
/// just a status flag and an expiry comparison on the next matching reply.
#[derive(Debug)]
pub struct SnitchGame<'a> {
    store: &'a Store,
    config: &'a EventConfig,
}

impl<'a> SnitchGame<'a> {
    /// Wrap the store with the event configuration.
    #[must_use]
    pub fn new(store: &'a Store, config: &'a EventConfig) -> Self {
        Self { store, config }
    }

    /// Register the announcement message of a released snitch.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EngineError::Database`] on SQLite failures.
    pub fn announced(
        &self,
        chat: ChatId,
        message_id: MessageId,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.store.record_message(&ServiceMessage {
            chat,
            message_id,
            created_at: now,
            ttl_seconds: self.config.snitch_ttl_seconds,
            kind: MessageKind::Snitch,
            status: MessageStatus::Open,
        })
    }

    /// Check an inbound message against the snitch state machine.
    ///
    /// Returns `None` when the text is not the catch phrase or no snitch has
    /// ever been released (including one already swept away).
    ///
    /// # Errors
    ///
    /// Returns [`crate::EngineError::Database`] on SQLite failures.
    pub fn try_catch(
        &self,
        chat: ChatId,
        term: TermId,
        user: UserId,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<SnitchOutcome>> {
        if !text.trim().eq_ignore_ascii_case(self.config.snitch_phrase.trim()) {
            return Ok(None);
        }

        let Some(snitch) = self.store.latest_snitch(chat)? else {
            return Ok(None);
        };

        let open = snitch.status == MessageStatus::Open && now < snitch.expires_at();
        if !open {
            return Ok(Some(SnitchOutcome::TooLate));
        }

        // CAS on the status flag: exactly one reply can win.
        if !self.store.close_snitch(chat, snitch.message_id)? {
            return Ok(Some(SnitchOutcome::TooLate));
        }

        let ledger = Ledger::new(self.store);
        let new_total = ledger.apply(chat, term, user, self.config.snitch_award, now)?;
        info!(chat = %chat, user = %user, new_total, "snitch caught");
        Ok(Some(SnitchOutcome::Caught {
            award: self.config.snitch_award,
            new_total,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::Roster;
    use crate::term::Term;
    use crate::types::MemberStatus;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn chat() -> ChatId {
        ChatId(-21)
    }

    fn setup() -> (Store, EventConfig, TermId, DateTime<Utc>) {
        let store = Store::open_in_memory().expect("open");
        let now = Utc::now();
        let term = Term {
            chat: chat(),
            term_id: TermId::new(),
            start_at: now,
            end_at: now + Duration::days(7),
            is_current: true,
        };
        store.insert_term(&term).expect("insert term");
        (store, EventConfig::default(), term.term_id, now)
    }

    fn enroll(store: &Store, user: UserId, name: &str, house: House, now: DateTime<Utc>) {
        let roster = Roster::new(store);
        roster
            .record_activity(chat(), user, name, MemberStatus::Member, now)
            .expect("record");
        roster.assign_house(chat(), user, house).expect("assign");
    }

    fn ctx(term: TermId, speaker: UserId, now: DateTime<Utc>) -> EventContext {
        EventContext {
            chat: chat(),
            term,
            speaker,
            now,
        }
    }

    #[test]
    fn tick_fires_exactly_once_per_cycle() {
        let (store, config, term, now) = setup();
        enroll(&store, UserId(1), "harry", House::Gryffindor, now);
        let engine = EventEngine::new(&store, &config);
        let mut rng = StdRng::seed_from_u64(7);
        let context = ctx(term, UserId(1), now);

        let frequency = 5;
        let mut fired = 0;
        for _ in 0..=frequency {
            if engine
                .tick(&context, EventTier::Standard, frequency, &mut rng)
                .expect("tick")
                .is_some()
            {
                fired += 1;
            }
        }
        assert_eq!(fired, 1, "frequency+1 ticks fire exactly one event");
        assert_eq!(
            store.counter_value(chat(), "standard").expect("counter"),
            1,
            "counter resets to 1, not 0"
        );
    }

    #[test]
    fn tiers_keep_separate_counters() {
        let (store, config, term, now) = setup();
        let engine = EventEngine::new(&store, &config);
        let mut rng = StdRng::seed_from_u64(3);
        let context = ctx(term, UserId(1), now);

        for _ in 0..4 {
            engine
                .tick(&context, EventTier::Standard, 100, &mut rng)
                .expect("tick");
        }
        engine
            .tick(&context, EventTier::Epic, 100, &mut rng)
            .expect("tick");

        assert_eq!(store.counter_value(chat(), "standard").expect("v"), 4);
        assert_eq!(store.counter_value(chat(), "epic").expect("v"), 1);
    }

    #[test]
    fn outcome_draws_are_roughly_uniform() {
        // Selection is a pure function of the draw, so the distribution can
        // be checked without executing anything.
        let mut rng = StdRng::seed_from_u64(42);
        let trials = 10_000;

        let mut standard = [0u32; StandardOutcome::COUNT];
        for _ in 0..trials {
            standard[rng.gen_range(0..StandardOutcome::COUNT)] += 1;
        }
        let expected = trials as f64 / StandardOutcome::COUNT as f64;
        for count in standard {
            let deviation = (f64::from(count) - expected).abs() / expected;
            assert!(deviation < 0.15, "standard outcome off by {deviation}");
        }

        let mut epic = [0u32; EpicOutcome::COUNT];
        for _ in 0..trials {
            epic[rng.gen_range(0..EpicOutcome::COUNT)] += 1;
        }
        let expected = trials as f64 / EpicOutcome::COUNT as f64;
        for count in epic {
            let deviation = (f64::from(count) - expected).abs() / expected;
            assert!(deviation < 0.15, "epic outcome off by {deviation}");
        }
    }

    #[test]
    fn speaker_outcomes_hit_the_speaker() {
        let (store, config, term, now) = setup();
        enroll(&store, UserId(1), "harry", House::Gryffindor, now);
        let engine = EventEngine::new(&store, &config);
        let mut rng = StdRng::seed_from_u64(1);
        let context = ctx(term, UserId(1), now);

        let result = engine
            .execute_standard(&context, StandardOutcome::SpeakerLosesTen, &mut rng)
            .expect("execute");
        assert_eq!(
            result,
            EventResult::SpeakerDeducted {
                user: UserId(1),
                amount: 10,
                new_total: -10
            }
        );

        let result = engine
            .execute_standard(&context, StandardOutcome::SpeakerGainsTwo, &mut rng)
            .expect("execute");
        assert_eq!(
            result,
            EventResult::SpeakerAwarded {
                user: UserId(1),
                amount: 2,
                new_total: -8
            }
        );
    }

    #[test]
    fn trio_outcomes_pick_distinct_members() {
        let (store, config, term, now) = setup();
        for (id, name) in [(1, "a"), (2, "b"), (3, "c"), (4, "d"), (5, "e")] {
            enroll(&store, UserId(id), name, House::Hufflepuff, now);
        }
        let engine = EventEngine::new(&store, &config);
        let mut rng = StdRng::seed_from_u64(9);
        let context = ctx(term, UserId(1), now);

        let result = engine
            .execute_standard(&context, StandardOutcome::TrioGainsFive, &mut rng)
            .expect("execute");
        let EventResult::GroupAwarded { amount, changes } = result else {
            panic!("expected GroupAwarded");
        };
        assert_eq!(amount, 5);
        assert_eq!(changes.len(), 3);
        let mut users: Vec<UserId> = changes.iter().map(|(u, _)| *u).collect();
        users.sort();
        users.dedup();
        assert_eq!(users.len(), 3, "sampled without replacement");
    }

    #[test]
    fn empty_pool_is_a_no_op() {
        let (store, config, term, now) = setup();
        let engine = EventEngine::new(&store, &config);
        let mut rng = StdRng::seed_from_u64(2);
        let context = ctx(term, UserId(1), now);

        let result = engine
            .execute_standard(&context, StandardOutcome::RandomMemberGainsTen, &mut rng)
            .expect("execute");
        assert_eq!(result, EventResult::Nothing);
    }

    #[test]
    fn epic_modifier_lands_on_speaker_house() {
        let (store, config, term, now) = setup();
        enroll(&store, UserId(1), "draco", House::Slytherin, now);
        let engine = EventEngine::new(&store, &config);
        let context = ctx(term, UserId(1), now);

        let result = engine
            .execute_epic(&context, EpicOutcome::BlockSpeakerHouse)
            .expect("execute");
        let EventResult::ModifierInstalled { modifier } = result else {
            panic!("expected ModifierInstalled");
        };
        assert_eq!(modifier.kind, ModifierKind::Block);
        assert_eq!(modifier.house, House::Slytherin);
        assert_eq!(
            modifier.expires_at,
            now + Duration::seconds(config.modifier_ttl_seconds)
        );
    }

    #[test]
    fn epic_zeroes_the_top_scorer() {
        let (store, config, term, now) = setup();
        enroll(&store, UserId(1), "harry", House::Gryffindor, now);
        enroll(&store, UserId(2), "luna", House::Ravenclaw, now);
        let ledger = Ledger::new(&store);
        ledger.apply(chat(), term, UserId(1), 3, now).expect("apply");
        ledger.apply(chat(), term, UserId(2), 12, now).expect("apply");

        let engine = EventEngine::new(&store, &config);
        let context = ctx(term, UserId(1), now);
        let result = engine
            .execute_epic(&context, EpicOutcome::ZeroTopScorer)
            .expect("execute");
        assert_eq!(
            result,
            EventResult::TopScorerZeroed {
                user: UserId(2),
                prior_total: 12
            }
        );
        assert_eq!(
            ledger.current_points(chat(), term, UserId(2)).expect("points"),
            0
        );
    }

    #[test]
    fn underdog_bonus_skips_house_elf() {
        let (store, config, term, now) = setup();
        enroll(&store, UserId(1), "harry", House::Gryffindor, now);
        enroll(&store, UserId(2), "dobby", House::HouseElf, now);
        enroll(&store, UserId(3), "cho", House::Ravenclaw, now);
        let ledger = Ledger::new(&store);
        ledger.apply(chat(), term, UserId(1), 20, now).expect("apply");
        ledger.apply(chat(), term, UserId(2), 1, now).expect("apply");
        ledger.apply(chat(), term, UserId(3), 5, now).expect("apply");

        let engine = EventEngine::new(&store, &config);
        let context = ctx(term, UserId(1), now);
        let result = engine
            .execute_epic(&context, EpicOutcome::UnderdogBonus)
            .expect("execute");
        // Ravenclaw trails among non-elf houses with data.
        assert_eq!(
            result,
            EventResult::UnderdogRewarded {
                house: House::Ravenclaw,
                champion: UserId(3),
                amount: config.underdog_bonus,
                new_total: 5 + config.underdog_bonus,
            }
        );
    }

    #[test]
    fn underdog_falls_through_to_house_elf_alone() {
        let (store, config, term, now) = setup();
        enroll(&store, UserId(2), "dobby", House::HouseElf, now);
        let ledger = Ledger::new(&store);
        ledger.apply(chat(), term, UserId(2), 1, now).expect("apply");

        let engine = EventEngine::new(&store, &config);
        let context = ctx(term, UserId(2), now);
        let result = engine
            .execute_epic(&context, EpicOutcome::UnderdogBonus)
            .expect("execute");
        let EventResult::UnderdogRewarded { house, champion, .. } = result else {
            panic!("expected UnderdogRewarded");
        };
        assert_eq!(house, House::HouseElf);
        assert_eq!(champion, UserId(2));
    }

    #[test]
    fn underdog_with_no_data_is_a_no_op() {
        let (store, config, term, now) = setup();
        let engine = EventEngine::new(&store, &config);
        let context = ctx(term, UserId(1), now);
        let result = engine
            .execute_epic(&context, EpicOutcome::UnderdogBonus)
            .expect("execute");
        assert_eq!(result, EventResult::Nothing);
    }

    #[test]
    fn snitch_first_catch_wins_then_too_late() {
        let (store, config, term, now) = setup();
        enroll(&store, UserId(1), "harry", House::Gryffindor, now);
        enroll(&store, UserId(2), "draco", House::Slytherin, now);
        let game = SnitchGame::new(&store, &config);

        game.announced(chat(), MessageId(500), now).expect("announce");

        // Wrong phrase does nothing.
        assert_eq!(
            game.try_catch(chat(), term, UserId(1), "expelliarmus", now)
                .expect("catch"),
            None
        );

        let caught = game
            .try_catch(chat(), term, UserId(1), " Catch The Snitch ", now)
            .expect("catch");
        assert_eq!(
            caught,
            Some(SnitchOutcome::Caught {
                award: config.snitch_award,
                new_total: config.snitch_award
            })
        );

        let late = game
            .try_catch(chat(), term, UserId(2), "catch the snitch", now)
            .expect("catch");
        assert_eq!(late, Some(SnitchOutcome::TooLate));
        assert_eq!(
            Ledger::new(&store)
                .current_points(chat(), term, UserId(2))
                .expect("points"),
            0
        );
    }

    #[test]
    fn escaped_snitch_is_too_late() {
        let (store, config, term, now) = setup();
        enroll(&store, UserId(1), "harry", House::Gryffindor, now);
        let game = SnitchGame::new(&store, &config);

        game.announced(chat(), MessageId(501), now).expect("announce");
        let after_escape = now + Duration::seconds(config.snitch_ttl_seconds + 1);
        let result = game
            .try_catch(chat(), term, UserId(1), "catch the snitch", after_escape)
            .expect("catch");
        assert_eq!(result, Some(SnitchOutcome::TooLate));
    }

    #[test]
    fn no_snitch_ever_means_silence() {
        let (store, config, term, now) = setup();
        let game = SnitchGame::new(&store, &config);
        assert_eq!(
            game.try_catch(chat(), term, UserId(1), "catch the snitch", now)
                .expect("catch"),
            None
        );
    }
}
