//! SQLite persistence layer for the prefect engine.
//!
//! All engine state is chat-scoped and relational — seven small tables
//! rather than a blob per chat, because the ledger needs per-row atomic
//! read-modify-write:
//!
//! ```sql
//! terms            (chat_id, term_id, start_at, end_at, is_current)
//! point_entries    (chat_id, term_id, user_id, points, updated_at)
//! roster           (chat_id, user_id, display_name, status, house, last_seen)
//! modifiers        (id, chat_id, kind, house, expires_at)
//! event_counters   (chat_id, counter, value)
//! service_messages (chat_id, message_id, created_at, ttl_seconds, kind, status)
//! last_winners     (chat_id, winning_house, house_points, champion_user, champion_points)
//! ```
//!
//! Timestamps are stored as whole UTC seconds so expiry comparisons can run
//! in SQL. The connection sits behind a mutex; every public method holds it
//! for the whole logical operation, which is what makes the upsert-then-read
//! sequences atomic.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{Connection, OpenFlags, OptionalExtension, params};
use tracing::{debug, info};

use crate::error::Result;
use crate::house::House;
use crate::modifier::{Modifier, ModifierKind};
use crate::retention::{MessageKind, MessageStatus, ServiceMessage};
use crate::roster::RosterEntry;
use crate::term::{HistoricalWinner, Term, TermId};
use crate::types::{ChatId, MemberStatus, MessageId, UserId, ts_from_secs};

/// Handle to an open SQLite database holding all engine state.
pub struct Store {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("db_path", &self.db_path)
            .finish_non_exhaustive()
    }
}

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS terms (
        chat_id    INTEGER NOT NULL,
        term_id    TEXT    NOT NULL,
        start_at   INTEGER NOT NULL,
        end_at     INTEGER NOT NULL,
        is_current INTEGER NOT NULL,
        PRIMARY KEY (chat_id, term_id)
    );
    CREATE TABLE IF NOT EXISTS point_entries (
        chat_id    INTEGER NOT NULL,
        term_id    TEXT    NOT NULL,
        user_id    INTEGER NOT NULL,
        points     INTEGER NOT NULL,
        updated_at INTEGER NOT NULL,
        PRIMARY KEY (chat_id, term_id, user_id)
    );
    CREATE TABLE IF NOT EXISTS roster (
        chat_id      INTEGER NOT NULL,
        user_id      INTEGER NOT NULL,
        display_name TEXT    NOT NULL,
        status       TEXT    NOT NULL,
        house        TEXT,
        last_seen    INTEGER NOT NULL,
        PRIMARY KEY (chat_id, user_id)
    );
    CREATE TABLE IF NOT EXISTS modifiers (
        id         INTEGER PRIMARY KEY AUTOINCREMENT,
        chat_id    INTEGER NOT NULL,
        kind       TEXT    NOT NULL,
        house      TEXT    NOT NULL,
        expires_at INTEGER NOT NULL
    );
    CREATE TABLE IF NOT EXISTS event_counters (
        chat_id INTEGER NOT NULL,
        counter TEXT    NOT NULL,
        value   INTEGER NOT NULL,
        PRIMARY KEY (chat_id, counter)
    );
    CREATE TABLE IF NOT EXISTS service_messages (
        chat_id     INTEGER NOT NULL,
        message_id  INTEGER NOT NULL,
        created_at  INTEGER NOT NULL,
        ttl_seconds INTEGER NOT NULL,
        kind        TEXT    NOT NULL,
        status      TEXT    NOT NULL,
        PRIMARY KEY (chat_id, message_id)
    );
    CREATE TABLE IF NOT EXISTS last_winners (
        chat_id         INTEGER PRIMARY KEY,
        winning_house   TEXT    NOT NULL,
        house_points    INTEGER NOT NULL,
        champion_user   INTEGER,
        champion_points INTEGER NOT NULL
    );
";

impl Store {
    /// Open (or create) an SQLite database at `path`.
    ///
    /// The schema is created if it does not exist; WAL mode is enabled for
    /// concurrent reads from other chats.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EngineError::Database`] on SQLite failures.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db_path = path.as_ref().to_path_buf();
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;

        let conn = Connection::open_with_flags(&db_path, flags)?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        conn.execute_batch("PRAGMA synchronous = NORMAL;")?;
        conn.execute_batch("PRAGMA busy_timeout = 5000;")?;
        conn.execute_batch(SCHEMA)?;

        info!(path = %db_path.display(), "prefect store opened");

        Ok(Self {
            conn: Mutex::new(conn),
            db_path,
        })
    }

    /// Open an in-memory database (useful for tests).
    ///
    /// # Errors
    ///
    /// Returns [`crate::EngineError::Database`] on SQLite failures.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
            db_path: PathBuf::from(":memory:"),
        })
    }

    /// Path to the database file (or `:memory:`).
    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    // ------------------------------------------------------------------
    // Terms
    // ------------------------------------------------------------------

    /// The chat's current term, if one has ever been started.
    pub fn current_term(&self, chat: ChatId) -> Result<Option<Term>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(
            "SELECT term_id, start_at, end_at FROM terms
             WHERE chat_id = ?1 AND is_current = 1",
        )?;
        let row = stmt
            .query_row(params![chat.0], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            })
            .optional()?;

        Ok(row.and_then(|(id, start, end)| {
            let term_id = uuid::Uuid::parse_str(&id).ok()?;
            Some(Term {
                chat,
                term_id: TermId(term_id),
                start_at: ts_from_secs(start),
                end_at: ts_from_secs(end),
                is_current: true,
            })
        }))
    }

    /// Insert a new term row.
    pub fn insert_term(&self, term: &Term) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO terms (chat_id, term_id, start_at, end_at, is_current)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                term.chat.0,
                term.term_id.0.to_string(),
                term.start_at.timestamp(),
                term.end_at.timestamp(),
                i64::from(term.is_current),
            ],
        )?;
        debug!(chat = %term.chat, term = %term.term_id, "term inserted");
        Ok(())
    }

    /// Close a term, compare-and-swap style.
    ///
    /// Returns `true` only for the caller that actually flipped
    /// `is_current`; concurrent rollover attempts on the same stale term
    /// observe `false` and must not roll over again.
    pub fn close_term(&self, chat: ChatId, term: TermId) -> Result<bool> {
        let conn = self.conn.lock();
        let changed = conn.execute(
            "UPDATE terms SET is_current = 0
             WHERE chat_id = ?1 AND term_id = ?2 AND is_current = 1",
            params![chat.0, term.0.to_string()],
        )?;
        Ok(changed > 0)
    }

    // ------------------------------------------------------------------
    // Point entries
    // ------------------------------------------------------------------

    /// Current points for one user, 0 when no entry exists.
    pub fn points_of(&self, chat: ChatId, term: TermId, user: UserId) -> Result<i64> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(
            "SELECT points FROM point_entries
             WHERE chat_id = ?1 AND term_id = ?2 AND user_id = ?3",
        )?;
        let points = stmt
            .query_row(params![chat.0, term.0.to_string(), user.0], |row| {
                row.get::<_, i64>(0)
            })
            .optional()?;
        Ok(points.unwrap_or(0))
    }

    /// Atomically add `delta` to a user's entry, creating it if absent.
    ///
    /// Returns the new total. The upsert and the read-back run under one
    /// connection lock, so concurrent callers on the same key cannot lose
    /// updates.
    pub fn apply_points(
        &self,
        chat: ChatId,
        term: TermId,
        user: UserId,
        delta: i64,
        now: DateTime<Utc>,
    ) -> Result<i64> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO point_entries (chat_id, term_id, user_id, points, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(chat_id, term_id, user_id) DO UPDATE SET
                points = points + excluded.points,
                updated_at = excluded.updated_at",
            params![chat.0, term.0.to_string(), user.0, delta, now.timestamp()],
        )?;
        let mut stmt = conn.prepare_cached(
            "SELECT points FROM point_entries
             WHERE chat_id = ?1 AND term_id = ?2 AND user_id = ?3",
        )?;
        let total = stmt.query_row(params![chat.0, term.0.to_string(), user.0], |row| {
            row.get::<_, i64>(0)
        })?;
        Ok(total)
    }

    /// Reset a user's entry to zero, returning the prior total.
    pub fn zero_points(
        &self,
        chat: ChatId,
        term: TermId,
        user: UserId,
        now: DateTime<Utc>,
    ) -> Result<i64> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(
            "SELECT points FROM point_entries
             WHERE chat_id = ?1 AND term_id = ?2 AND user_id = ?3",
        )?;
        let prior = stmt
            .query_row(params![chat.0, term.0.to_string(), user.0], |row| {
                row.get::<_, i64>(0)
            })
            .optional()?
            .unwrap_or(0);
        conn.execute(
            "UPDATE point_entries SET points = 0, updated_at = ?4
             WHERE chat_id = ?1 AND term_id = ?2 AND user_id = ?3",
            params![chat.0, term.0.to_string(), user.0, now.timestamp()],
        )?;
        Ok(prior)
    }

    /// Every point entry of the term joined with the holder's roster row.
    ///
    /// Users the roster has never seen come back with no house and
    /// [`MemberStatus::Unknown`].
    pub fn term_standings(&self, chat: ChatId, term: TermId) -> Result<Vec<StandingRow>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(
            "SELECT p.user_id, p.points, r.house, r.status
             FROM point_entries p
             LEFT JOIN roster r ON r.chat_id = p.chat_id AND r.user_id = p.user_id
             WHERE p.chat_id = ?1 AND p.term_id = ?2",
        )?;
        let rows = stmt.query_map(params![chat.0, term.0.to_string()], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, Option<String>>(3)?,
            ))
        })?;

        let mut standings = Vec::new();
        for row in rows {
            let (user, points, house, status) = row?;
            standings.push(StandingRow {
                user: UserId(user),
                points,
                house: house.as_deref().and_then(House::parse),
                status: status
                    .as_deref()
                    .map_or(MemberStatus::Unknown, MemberStatus::parse),
            });
        }
        Ok(standings)
    }

    // ------------------------------------------------------------------
    // Roster
    // ------------------------------------------------------------------

    /// Upsert a participant's activity record. House assignment survives
    /// the update.
    pub fn record_activity(
        &self,
        chat: ChatId,
        user: UserId,
        display_name: &str,
        status: MemberStatus,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO roster (chat_id, user_id, display_name, status, house, last_seen)
             VALUES (?1, ?2, ?3, ?4, NULL, ?5)
             ON CONFLICT(chat_id, user_id) DO UPDATE SET
                display_name = excluded.display_name,
                status = excluded.status,
                last_seen = excluded.last_seen",
            params![chat.0, user.0, display_name, status.as_str(), now.timestamp()],
        )?;
        Ok(())
    }

    /// Overwrite a participant's stored membership status.
    pub fn set_status(&self, chat: ChatId, user: UserId, status: MemberStatus) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "UPDATE roster SET status = ?3 WHERE chat_id = ?1 AND user_id = ?2",
            params![chat.0, user.0, status.as_str()],
        )?;
        Ok(())
    }

    /// Assign a participant to a house. Returns `false` when the roster has
    /// never seen them.
    pub fn assign_house(&self, chat: ChatId, user: UserId, house: House) -> Result<bool> {
        let conn = self.conn.lock();
        let changed = conn.execute(
            "UPDATE roster SET house = ?3 WHERE chat_id = ?1 AND user_id = ?2",
            params![chat.0, user.0, house.as_str()],
        )?;
        Ok(changed > 0)
    }

    /// One participant's roster row.
    pub fn member(&self, chat: ChatId, user: UserId) -> Result<Option<RosterEntry>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(
            "SELECT user_id, display_name, status, house, last_seen
             FROM roster WHERE chat_id = ?1 AND user_id = ?2",
        )?;
        let entry = stmt
            .query_row(params![chat.0, user.0], row_to_roster_entry)
            .optional()?;
        Ok(entry)
    }

    /// Look a participant up by display name, case-insensitively.
    pub fn member_by_name(&self, chat: ChatId, name: &str) -> Result<Option<RosterEntry>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(
            "SELECT user_id, display_name, status, house, last_seen
             FROM roster WHERE chat_id = ?1 AND display_name = ?2 COLLATE NOCASE",
        )?;
        let entry = stmt
            .query_row(params![chat.0, name], row_to_roster_entry)
            .optional()?;
        Ok(entry)
    }

    /// Every active participant of the chat, most recently seen first.
    pub fn active_members(&self, chat: ChatId) -> Result<Vec<RosterEntry>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(
            "SELECT user_id, display_name, status, house, last_seen
             FROM roster
             WHERE chat_id = ?1 AND status IN ('member', 'admin', 'creator')
             ORDER BY last_seen DESC, user_id ASC",
        )?;
        let rows = stmt.query_map(params![chat.0], row_to_roster_entry)?;
        let mut members = Vec::new();
        for row in rows {
            members.push(row?);
        }
        Ok(members)
    }

    // ------------------------------------------------------------------
    // Modifiers
    // ------------------------------------------------------------------

    /// Delete every modifier of the chat whose expiry has passed.
    pub fn purge_expired_modifiers(&self, chat: ChatId, now: DateTime<Utc>) -> Result<usize> {
        let conn = self.conn.lock();
        let purged = conn.execute(
            "DELETE FROM modifiers WHERE chat_id = ?1 AND expires_at <= ?2",
            params![chat.0, now.timestamp()],
        )?;
        if purged > 0 {
            debug!(chat = %chat, purged, "expired modifiers purged");
        }
        Ok(purged)
    }

    /// The most recently installed modifier for a house, if any.
    pub fn latest_modifier(&self, chat: ChatId, house: House) -> Result<Option<Modifier>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(
            "SELECT kind, expires_at FROM modifiers
             WHERE chat_id = ?1 AND house = ?2
             ORDER BY id DESC LIMIT 1",
        )?;
        let row = stmt
            .query_row(params![chat.0, house.as_str()], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })
            .optional()?;
        Ok(row.and_then(|(kind, expires)| {
            Some(Modifier {
                chat,
                kind: ModifierKind::parse(&kind)?,
                house,
                expires_at: ts_from_secs(expires),
            })
        }))
    }

    /// Insert a modifier row.
    pub fn insert_modifier(
        &self,
        chat: ChatId,
        kind: ModifierKind,
        house: House,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO modifiers (chat_id, kind, house, expires_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![chat.0, kind.as_str(), house.as_str(), expires_at.timestamp()],
        )?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Event counters
    // ------------------------------------------------------------------

    /// Increment a per-chat counter, returning the post-increment value.
    pub fn bump_counter(&self, chat: ChatId, counter: &str) -> Result<i64> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO event_counters (chat_id, counter, value) VALUES (?1, ?2, 1)
             ON CONFLICT(chat_id, counter) DO UPDATE SET value = value + 1",
            params![chat.0, counter],
        )?;
        let mut stmt = conn.prepare_cached(
            "SELECT value FROM event_counters WHERE chat_id = ?1 AND counter = ?2",
        )?;
        let value = stmt.query_row(params![chat.0, counter], |row| row.get::<_, i64>(0))?;
        Ok(value)
    }

    /// Reset a counter to 1 (not 0 — the firing message counts as the first
    /// of the next cycle).
    pub fn reset_counter(&self, chat: ChatId, counter: &str) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "UPDATE event_counters SET value = 1 WHERE chat_id = ?1 AND counter = ?2",
            params![chat.0, counter],
        )?;
        Ok(())
    }

    /// Current counter value, 0 when the counter has never been bumped.
    pub fn counter_value(&self, chat: ChatId, counter: &str) -> Result<i64> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(
            "SELECT value FROM event_counters WHERE chat_id = ?1 AND counter = ?2",
        )?;
        let value = stmt
            .query_row(params![chat.0, counter], |row| row.get::<_, i64>(0))
            .optional()?;
        Ok(value.unwrap_or(0))
    }

    // ------------------------------------------------------------------
    // Service messages
    // ------------------------------------------------------------------

    /// Record a transient message for later deletion.
    pub fn record_message(&self, message: &ServiceMessage) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT OR REPLACE INTO service_messages
                (chat_id, message_id, created_at, ttl_seconds, kind, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                message.chat.0,
                message.message_id.0,
                message.created_at.timestamp(),
                message.ttl_seconds,
                message.kind.as_str(),
                message.status.as_str(),
            ],
        )?;
        Ok(())
    }

    /// Every recorded message of the chat whose TTL has elapsed.
    pub fn expired_messages(&self, chat: ChatId, now: DateTime<Utc>) -> Result<Vec<ServiceMessage>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(
            "SELECT message_id, created_at, ttl_seconds, kind, status
             FROM service_messages
             WHERE chat_id = ?1 AND created_at + ttl_seconds <= ?2
             ORDER BY message_id ASC",
        )?;
        let rows = stmt.query_map(params![chat.0, now.timestamp()], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut expired = Vec::new();
        for row in rows {
            let (message_id, created, ttl, kind, status) = row?;
            expired.push(ServiceMessage {
                chat,
                message_id: MessageId(message_id),
                created_at: ts_from_secs(created),
                ttl_seconds: ttl,
                kind: MessageKind::parse(&kind),
                status: MessageStatus::parse(&status),
            });
        }
        Ok(expired)
    }

    /// Drop a message record. Returns `false` when it was already gone.
    pub fn remove_message(&self, chat: ChatId, message: MessageId) -> Result<bool> {
        let conn = self.conn.lock();
        let removed = conn.execute(
            "DELETE FROM service_messages WHERE chat_id = ?1 AND message_id = ?2",
            params![chat.0, message.0],
        )?;
        Ok(removed > 0)
    }

    /// The newest snitch record of the chat, whatever its status.
    pub fn latest_snitch(&self, chat: ChatId) -> Result<Option<ServiceMessage>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(
            "SELECT message_id, created_at, ttl_seconds, kind, status
             FROM service_messages
             WHERE chat_id = ?1 AND kind = 'snitch'
             ORDER BY created_at DESC, message_id DESC LIMIT 1",
        )?;
        let row = stmt
            .query_row(params![chat.0], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })
            .optional()?;
        Ok(row.map(|(message_id, created, ttl, kind, status)| ServiceMessage {
            chat,
            message_id: MessageId(message_id),
            created_at: ts_from_secs(created),
            ttl_seconds: ttl,
            kind: MessageKind::parse(&kind),
            status: MessageStatus::parse(&status),
        }))
    }

    /// Flip an open snitch to closed, compare-and-swap style.
    ///
    /// Returns `true` only for the caller that actually closed it.
    pub fn close_snitch(&self, chat: ChatId, message: MessageId) -> Result<bool> {
        let conn = self.conn.lock();
        let changed = conn.execute(
            "UPDATE service_messages SET status = 'closed'
             WHERE chat_id = ?1 AND message_id = ?2 AND status = 'open'",
            params![chat.0, message.0],
        )?;
        Ok(changed > 0)
    }

    // ------------------------------------------------------------------
    // Historical winners
    // ------------------------------------------------------------------

    /// Overwrite the chat's last-term snapshot.
    pub fn record_winner(&self, winner: &HistoricalWinner) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO last_winners
                (chat_id, winning_house, house_points, champion_user, champion_points)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(chat_id) DO UPDATE SET
                winning_house = excluded.winning_house,
                house_points = excluded.house_points,
                champion_user = excluded.champion_user,
                champion_points = excluded.champion_points",
            params![
                winner.chat.0,
                winner.winning_house.as_str(),
                winner.house_points,
                winner.champion_user.map(|u| u.0),
                winner.champion_points,
            ],
        )?;
        Ok(())
    }

    /// The chat's last-term snapshot, if a term has ever completed.
    pub fn last_winner(&self, chat: ChatId) -> Result<Option<HistoricalWinner>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(
            "SELECT winning_house, house_points, champion_user, champion_points
             FROM last_winners WHERE chat_id = ?1",
        )?;
        let row = stmt
            .query_row(params![chat.0], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, Option<i64>>(2)?,
                    row.get::<_, i64>(3)?,
                ))
            })
            .optional()?;
        Ok(row.and_then(|(house, points, champion, champion_points)| {
            Some(HistoricalWinner {
                chat,
                winning_house: House::parse(&house)?,
                house_points: points,
                champion_user: champion.map(UserId),
                champion_points,
            })
        }))
    }
}

/// One ledger entry joined with its holder's roster row.
#[derive(Debug, Clone)]
pub struct StandingRow {
    /// The entry's holder.
    pub user: UserId,
    /// The holder's current term points.
    pub points: i64,
    /// The holder's house, if sorted.
    pub house: Option<House>,
    /// The holder's stored membership status.
    pub status: MemberStatus,
}

fn row_to_roster_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<RosterEntry> {
    Ok(RosterEntry {
        user: UserId(row.get::<_, i64>(0)?),
        display_name: row.get::<_, String>(1)?,
        status: MemberStatus::parse(&row.get::<_, String>(2)?),
        house: row
            .get::<_, Option<String>>(3)?
            .as_deref()
            .and_then(House::parse),
        last_seen: ts_from_secs(row.get::<_, i64>(4)?),
    })
}
