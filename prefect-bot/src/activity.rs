//! Inbound activity handling — the full per-message control flow.
//!
//! Order matters: refresh the roster, settle the term (a rollover
//! broadcasts and pins its summary), then route the message, command or
//! passive flow, and finally run one retention sweep. Everything happens
//! synchronously under the chat's serialization lock; different chats
//! proceed independently.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use rand::Rng;
use tracing::warn;

use prefect_core::engine::Engine;
use prefect_core::error::EngineError;
use prefect_core::event::{EventContext, EventResult, EventTier, SnitchOutcome};
use prefect_core::format::{humanize_since, humanize_until};
use prefect_core::house::House;
use prefect_core::retention::DeleteOutcome;
use prefect_core::rules::ReactionOutcome;
use prefect_core::term::{TermId, TermSummary, TermTransition};
use prefect_core::types::{ChatId, MemberStatus, MessageId, UserId};

use crate::commands::{self, Command};
use crate::messenger::Messenger;
use crate::render;
use crate::{BotError, Result};

/// Reply tokens that award a point.
const POSITIVE_REACTIONS: [&str; 4] = ["+", "❤️", "😍", "👍"];
/// Reply tokens that deduct a point.
const NEGATIVE_REACTIONS: [&str; 3] = ["-", "😡", "👎"];

/// An inbound chat message, already normalized by the transport layer.
#[derive(Debug, Clone)]
pub struct Inbound {
    /// The chat the message arrived in.
    pub chat: ChatId,
    /// The message's platform id.
    pub message_id: MessageId,
    /// Who sent it.
    pub sender: UserId,
    /// The sender's display name at send time.
    pub sender_name: String,
    /// The message text.
    pub text: String,
    /// The message this one replies to, if any.
    pub reply_to: Option<ReplyRef>,
    /// Wall-clock instant the message is being handled at.
    pub now: DateTime<Utc>,
}

/// The replied-to message, as much of it as the engine cares about.
#[derive(Debug, Clone, Copy)]
pub struct ReplyRef {
    /// The replied-to message's id.
    pub message_id: MessageId,
    /// Who sent the replied-to message.
    pub sender: UserId,
    /// Whether the replied-to message came from the bot itself.
    pub sender_is_bot: bool,
}

/// The assembled bot: engine, messenger, and an injected RNG for the event
/// engine.
pub struct Bot<M: Messenger, R: Rng> {
    engine: Engine,
    messenger: M,
    rng: Mutex<R>,
}

impl<M: Messenger, R: Rng> Bot<M, R> {
    /// Assemble a bot.
    pub fn new(engine: Engine, messenger: M, rng: R) -> Self {
        Self {
            engine,
            messenger,
            rng: Mutex::new(rng),
        }
    }

    /// The underlying engine (handy for tests and tooling).
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Handle one inbound chat activity end to end.
    pub fn handle_activity(&self, msg: &Inbound) -> Result<()> {
        let lock = self.engine.chat_lock(msg.chat);
        let _guard = lock.lock();

        // Refresh the sender's membership from the platform; failures
        // degrade to Unknown rather than aborting the activity.
        let status = match self.messenger.get_member(msg.chat, msg.sender) {
            Ok(info) => info.status,
            Err(err) => {
                warn!(chat = %msg.chat, user = %msg.sender, %err, "member lookup failed");
                MemberStatus::Unknown
            }
        };
        self.engine
            .roster()
            .record_activity(msg.chat, msg.sender, &msg.sender_name, status, msg.now)?;

        let transition = self.engine.terms().ensure_current(
            msg.chat,
            self.engine.config().term.length_days,
            msg.now,
        )?;
        if let TermTransition::RolledOver { summary, .. } = &transition {
            self.broadcast_rollover(msg.chat, summary)?;
        }
        let term = transition.term().term_id;

        match commands::parse(&msg.text) {
            Some(command) => self.handle_command(msg, term, command)?,
            None => self.handle_plain(msg, term)?,
        }

        // Exactly one sweep per handled activity. Collaborator failures are
        // logged inside the queue and never propagate.
        self.engine.retention().sweep(msg.chat, msg.now, |id| {
            match self.messenger.delete_message(msg.chat, id) {
                Ok(outcome) => outcome,
                Err(err) => {
                    warn!(chat = %msg.chat, message = %id, %err, "delete failed");
                    DeleteOutcome::Failed
                }
            }
        })?;

        Ok(())
    }

    // ------------------------------------------------------------------
    // Passive flow: reactions, the snitch, event ticks
    // ------------------------------------------------------------------

    fn handle_plain(&self, msg: &Inbound, term: TermId) -> Result<()> {
        if let Some(reply) = &msg.reply_to {
            if !reply.sender_is_bot {
                if let Some(sign) = reaction_sign(&msg.text) {
                    self.apply_reaction(msg, term, reply.sender, sign)?;
                }
            }
        }

        if let Some(outcome) =
            self.engine
                .snitch()
                .try_catch(msg.chat, term, msg.sender, &msg.text, msg.now)?
        {
            let text = match outcome {
                SnitchOutcome::Caught { award, new_total } => {
                    render::snitch_caught(&msg.sender_name, award, new_total)
                }
                SnitchOutcome::TooLate => render::snitch_too_late(&msg.sender_name),
            };
            let ttl = self.engine.config().retention.standard_ttl_seconds;
            self.send_transient(msg.chat, &text, ttl, msg.now)?;
        }

        let ctx = EventContext {
            chat: msg.chat,
            term,
            speaker: msg.sender,
            now: msg.now,
        };
        let events = &self.engine.config().events;
        let standard = {
            let mut rng = self.rng.lock();
            self.engine
                .events()
                .tick(&ctx, EventTier::Standard, events.standard_frequency, &mut *rng)?
        };
        if let Some(result) = standard {
            self.announce_event(msg, &result)?;
        }
        let epic = {
            let mut rng = self.rng.lock();
            self.engine
                .events()
                .tick(&ctx, EventTier::Epic, events.epic_frequency, &mut *rng)?
        };
        if let Some(result) = epic {
            self.announce_event(msg, &result)?;
        }

        Ok(())
    }

    fn apply_reaction(
        &self,
        msg: &Inbound,
        term: TermId,
        receiver: UserId,
        sign: i64,
    ) -> Result<()> {
        let retention = &self.engine.config().retention;
        match self.engine.rules().evaluate_peer_reaction(
            msg.chat,
            term,
            msg.sender,
            receiver,
            sign,
            msg.now,
        ) {
            Ok(ReactionOutcome::Applied { new_total, boosted }) => {
                let text = render::reaction_applied(
                    &msg.sender_name,
                    self.house_of(msg.chat, msg.sender),
                    &self.display_name(msg.chat, receiver),
                    self.house_of(msg.chat, receiver),
                    sign,
                    new_total,
                    boosted,
                );
                self.send_transient(msg.chat, &text, retention.standard_ttl_seconds, msg.now)?;
            }
            Ok(ReactionOutcome::Blocked) => {
                let text = render::reaction_blocked(
                    &self.display_name(msg.chat, receiver),
                    self.house_of(msg.chat, receiver),
                );
                self.send_transient(msg.chat, &text, retention.standard_ttl_seconds, msg.now)?;
            }
            Err(EngineError::MemberNotFound { .. }) => {
                let text = render::member_not_found();
                self.send_transient(msg.chat, &text, retention.short_ttl_seconds, msg.now)?;
            }
            Err(err) => return Err(BotError::Engine(err)),
        }
        Ok(())
    }

    fn announce_event(&self, msg: &Inbound, result: &EventResult) -> Result<()> {
        let config = self.engine.config();
        match result {
            EventResult::SnitchAnnounced { award, .. } => {
                let text = render::snitch_announcement(*award, &config.events.snitch_phrase);
                let id = self.messenger.send_text(msg.chat, &text)?;
                // The announcement itself carries the snitch state and its
                // own 48h TTL.
                self.engine.snitch().announced(msg.chat, id, msg.now)?;
            }
            EventResult::Nothing => {}
            other => {
                if let Some(text) =
                    render::event_text(other, |user| self.display_name(msg.chat, user))
                {
                    self.send_transient(
                        msg.chat,
                        &text,
                        config.retention.long_ttl_seconds,
                        msg.now,
                    )?;
                }
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    fn handle_command(&self, msg: &Inbound, term: TermId, command: Command) -> Result<()> {
        let retention = &self.engine.config().retention;
        match command {
            Command::SortList => {
                let members = self.engine.roster().active_members(msg.chat)?;
                let mut groups: Vec<(House, Vec<String>)> = House::COMPETING
                    .iter()
                    .map(|h| (*h, Vec::new()))
                    .chain(std::iter::once((House::Unaffiliated, Vec::new())))
                    .collect();
                for member in members {
                    let house = member.house_or_unaffiliated();
                    if let Some((_, names)) = groups.iter_mut().find(|(h, _)| *h == house) {
                        names.push(member.display_name);
                    }
                }
                // The roster board stays up; it is reference material, not
                // chatter.
                self.messenger
                    .send_text(msg.chat, &render::roster_board(&groups))?;
            }
            Command::SortLookup { name } => {
                match self.engine.roster().member_by_name(msg.chat, &name)? {
                    Some(member) => {
                        let text = render::house_lookup_line(&member.display_name, member.house);
                        self.messenger.send_text(msg.chat, &text)?;
                    }
                    None => {
                        let text = render::member_not_found();
                        self.send_transient(msg.chat, &text, retention.short_ttl_seconds, msg.now)?;
                    }
                }
            }
            Command::SortAssign { name, house_input } => {
                let Some(house) = House::parse(&house_input) else {
                    let text = render::sorting_usage();
                    self.send_transient(msg.chat, &text, retention.short_ttl_seconds, msg.now)?;
                    return Ok(());
                };
                match self.engine.roster().member_by_name(msg.chat, &name)? {
                    Some(member) => {
                        self.engine.roster().assign_house(msg.chat, member.user, house)?;
                        self.messenger.send_text(msg.chat, &render::sorting_verse(house))?;
                    }
                    None => {
                        let text = render::member_not_found();
                        self.send_transient(msg.chat, &text, retention.short_ttl_seconds, msg.now)?;
                    }
                }
            }
            Command::SortUsage => {
                let text = render::sorting_usage();
                self.send_transient(msg.chat, &text, retention.short_ttl_seconds, msg.now)?;
            }
            Command::PointsTotals => {
                self.send_standings(msg, term)?;
            }
            Command::PointsAward { name, amount } => {
                self.bulk_award(msg, term, &name, amount)?;
            }
            Command::PointsUsage => {
                let text = render::points_usage();
                self.send_transient(msg.chat, &text, retention.short_ttl_seconds, msg.now)?;
            }
            Command::Activity { full } => {
                self.send_activity(msg, full)?;
            }
        }
        Ok(())
    }

    fn send_standings(&self, msg: &Inbound, term: TermId) -> Result<()> {
        let retention = &self.engine.config().retention;
        let summary = self.engine.terms().summarize(msg.chat, term)?;
        if !summary.totals.has_any_entries() && summary.totals.unaffiliated_points == 0 {
            let text = render::standings_empty();
            self.send_transient(msg.chat, &text, retention.short_ttl_seconds, msg.now)?;
            return Ok(());
        }

        let champions: Vec<(House, Option<(String, i64)>)> = summary
            .champions
            .iter()
            .map(|(house, champion)| {
                (
                    *house,
                    champion.map(|(user, points)| (self.display_name(msg.chat, user), points)),
                )
            })
            .collect();
        let ends_in = self
            .engine
            .store()
            .current_term(msg.chat)?
            .map_or_else(|| "soon".to_string(), |t| humanize_until(t.end_at, msg.now));

        let text = render::standings_board(
            &summary.totals.ranked_desc(),
            summary.totals.unaffiliated_points,
            &champions,
            &ends_in,
        );
        self.send_transient(msg.chat, &text, retention.standings_ttl_seconds, msg.now)?;
        Ok(())
    }

    fn bulk_award(&self, msg: &Inbound, term: TermId, name: &str, amount: i64) -> Result<()> {
        let retention = &self.engine.config().retention;

        let is_admin = self
            .messenger
            .get_member(msg.chat, msg.sender)
            .map(|info| info.status.is_admin())
            .unwrap_or(false);
        if !is_admin {
            let text = render::admin_only(&msg.sender_name);
            self.send_transient(msg.chat, &text, retention.standard_ttl_seconds, msg.now)?;
            return Ok(());
        }

        let Some(target) = self.engine.roster().member_by_name(msg.chat, name)? else {
            let text = render::member_not_found();
            self.send_transient(msg.chat, &text, retention.short_ttl_seconds, msg.now)?;
            return Ok(());
        };

        match self
            .engine
            .rules()
            .bulk_award(msg.chat, term, target.user, amount, msg.now)
        {
            Ok(new_total) => {
                let text = render::bulk_award_line(
                    &target.display_name,
                    target.house_or_unaffiliated(),
                    amount,
                    new_total,
                );
                self.send_transient(msg.chat, &text, retention.standard_ttl_seconds, msg.now)?;
            }
            Err(EngineError::AwardOutOfBounds { bound, .. }) => {
                let text = render::award_bound_exceeded(bound);
                self.send_transient(msg.chat, &text, retention.standard_ttl_seconds, msg.now)?;
            }
            Err(EngineError::MemberNotFound { .. }) => {
                let text = render::member_not_found();
                self.send_transient(msg.chat, &text, retention.short_ttl_seconds, msg.now)?;
            }
            Err(err) => return Err(BotError::Engine(err)),
        }
        Ok(())
    }

    fn send_activity(&self, msg: &Inbound, full: bool) -> Result<()> {
        let retention = &self.engine.config().retention;
        let members = if full {
            self.engine.roster().active_members(msg.chat)?
        } else {
            self.engine
                .roster()
                .idle_since(msg.chat, msg.now - Duration::days(2))?
        };

        if members.is_empty() && !full {
            let text = render::everyone_active();
            self.send_transient(msg.chat, &text, retention.short_ttl_seconds, msg.now)?;
            return Ok(());
        }

        let lines: Vec<(String, String)> = members
            .into_iter()
            .map(|m| (humanize_since(m.last_seen, msg.now), m.display_name))
            .collect();
        let text = render::activity_board(&lines, full);
        self.send_transient(msg.chat, &text, retention.long_ttl_seconds, msg.now)?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Small helpers
    // ------------------------------------------------------------------

    fn broadcast_rollover(&self, chat: ChatId, summary: &TermSummary) -> Result<()> {
        let winner = summary.winner.map(|w| {
            (
                w.winning_house,
                w.house_points,
                w.champion_user
                    .map(|user| (self.display_name(chat, user), w.champion_points)),
            )
        });
        let text = render::rollover_broadcast(
            winner,
            &summary.totals.ranked_desc(),
            summary.totals.unaffiliated_points,
        );
        let id = self.messenger.send_text(chat, &text)?;
        // The results post is permanent: pinned and never retention-tracked.
        self.messenger.pin_message(chat, id)?;
        Ok(())
    }

    /// Send a transient message and register it for deletion after `ttl`.
    fn send_transient(
        &self,
        chat: ChatId,
        text: &str,
        ttl_seconds: i64,
        now: DateTime<Utc>,
    ) -> Result<MessageId> {
        let id = self.messenger.send_text(chat, text)?;
        self.engine.retention().record(chat, id, ttl_seconds, now)?;
        Ok(id)
    }

    fn display_name(&self, chat: ChatId, user: UserId) -> String {
        match self.engine.roster().member(chat, user) {
            Ok(Some(member)) => member.display_name,
            _ => user.to_string(),
        }
    }

    fn house_of(&self, chat: ChatId, user: UserId) -> House {
        match self.engine.roster().member(chat, user) {
            Ok(Some(member)) => member.house_or_unaffiliated(),
            _ => House::Unaffiliated,
        }
    }
}

/// Map a reply's text to a reaction sign, if it is one of the tokens.
#[must_use]
pub fn reaction_sign(text: &str) -> Option<i64> {
    let token = text.trim();
    if POSITIVE_REACTIONS.contains(&token) {
        Some(1)
    } else if NEGATIVE_REACTIONS.contains(&token) {
        Some(-1)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reaction_tokens_map_to_signs() {
        assert_eq!(reaction_sign("+"), Some(1));
        assert_eq!(reaction_sign(" ❤️ "), Some(1));
        assert_eq!(reaction_sign("👍"), Some(1));
        assert_eq!(reaction_sign("-"), Some(-1));
        assert_eq!(reaction_sign("👎"), Some(-1));
        assert_eq!(reaction_sign("++"), None);
        assert_eq!(reaction_sign("nice"), None);
    }
}
