//! Append-only store of every ticket that has ever reached done status,
//! and the fetch-window arithmetic derived from it.

use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use rusqlite::{params, Connection};

use crate::models::LedgerEntry;

const SCHEMA_VERSION: i32 = 1;

/// Overlap subtracted below the window anchor when fetching history.
/// Re-fetched tickets are screened out again by the id diff, so the
/// overlap only costs bandwidth.
pub const LOOKBACK_DAYS: i64 = 14;

/// Storage boundary for the done-ticket ledger. Entries are only ever
/// read in full and appended; nothing updates or deletes them.
pub trait LedgerStore {
    /// All entries, in append order.
    fn load(&self) -> Result<Vec<LedgerEntry>>;

    /// Record a batch of newly done tickets.
    fn append(&mut self, entries: &[LedgerEntry]) -> Result<()>;
}

pub struct SqliteLedger {
    conn: Connection,
}

impl SqliteLedger {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).context("Failed to open ledger database")?;
        let ledger = SqliteLedger { conn };
        ledger.init_schema()?;
        Ok(ledger)
    }

    fn init_schema(&self) -> Result<()> {
        let version: i32 = self
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .unwrap_or(0);

        if version < SCHEMA_VERSION {
            self.conn.execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS done_tickets (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    message_id TEXT NOT NULL,
                    title TEXT NOT NULL,
                    ts TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_done_tickets_message ON done_tickets(message_id);
                "#,
            )?;

            self.conn
                .execute(&format!("PRAGMA user_version = {}", SCHEMA_VERSION), [])?;
        }

        Ok(())
    }
}

impl LedgerStore for SqliteLedger {
    fn load(&self) -> Result<Vec<LedgerEntry>> {
        let mut stmt = self
            .conn
            .prepare("SELECT message_id, title, ts FROM done_tickets ORDER BY id")?;

        let entries = stmt
            .query_map([], |row| {
                Ok(LedgerEntry {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    timestamp: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    fn append(&mut self, entries: &[LedgerEntry]) -> Result<()> {
        let tx = self.conn.transaction()?;
        for entry in entries {
            tx.execute(
                "INSERT INTO done_tickets (message_id, title, ts) VALUES (?1, ?2, ?3)",
                params![entry.id, entry.title, entry.timestamp],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}

/// In-memory stand-in for tests.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    entries: Vec<LedgerEntry>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        MemoryLedger::default()
    }

    pub fn with_entries(entries: Vec<LedgerEntry>) -> Self {
        MemoryLedger { entries }
    }
}

impl LedgerStore for MemoryLedger {
    fn load(&self) -> Result<Vec<LedgerEntry>> {
        Ok(self.entries.clone())
    }

    fn append(&mut self, entries: &[LedgerEntry]) -> Result<()> {
        self.entries.extend_from_slice(entries);
        Ok(())
    }
}

/// Lower bound of the next history fetch: the most recent entry's
/// whole-second timestamp, or the configured first-run date when the
/// ledger is empty, minus the look-back margin.
pub fn fetch_window_start(
    entries: &[LedgerEntry],
    first_init: Option<NaiveDate>,
) -> Result<DateTime<Utc>> {
    let anchor = match entries.last() {
        Some(entry) => {
            let seconds: i64 = entry
                .timestamp
                .split('.')
                .next()
                .unwrap_or(&entry.timestamp)
                .parse()
                .with_context(|| format!("Malformed ledger timestamp '{}'", entry.timestamp))?;

            DateTime::from_timestamp(seconds, 0)
                .with_context(|| format!("Ledger timestamp '{}' out of range", entry.timestamp))?
        }
        None => match first_init {
            Some(date) => date.and_time(NaiveTime::MIN).and_utc(),
            None => bail!("Ledger is empty and no first-init date is configured"),
        },
    };

    Ok(anchor - Duration::days(LOOKBACK_DAYS))
}
