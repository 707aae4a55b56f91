use rusqlite::Connection;
use std::path::PathBuf;
use thiserror::Error;

use crate::models::{AntaryatraRecord, AntaryatraStatus, LedgerEntry, Sankalpa};

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),
    #[error("Failed to create database directory: {0}")]
    DirectoryError(String),
}

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Create a new database connection and initialize the schema
    pub fn new(path: &str) -> Result<Self, DatabaseError> {
        let db_path = PathBuf::from(path);

        // Create parent directory if it doesn't exist
        if let Some(parent) = db_path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| DatabaseError::DirectoryError(e.to_string()))?;
            }
        }

        // Open or create the database
        let conn = Connection::open(&db_path)?;

        let db = Database { conn };
        db.initialize_schema()?;

        Ok(db)
    }

    /// Initialize the database schema (tables and indexes)
    fn initialize_schema(&self) -> Result<(), DatabaseError> {
        // One row per calendar day, keyed by date
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS entries (
                date            TEXT PRIMARY KEY,
                count           INTEGER NOT NULL DEFAULT 0,
                notes           TEXT NOT NULL DEFAULT '',
                updated_at      TEXT NOT NULL
            )",
            [],
        )?;

        // Singleton vow, pinned to a single row
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS sankalpa (
                id              INTEGER PRIMARY KEY CHECK (id = 1),
                text            TEXT NOT NULL,
                context         TEXT NOT NULL DEFAULT '',
                date            TEXT NOT NULL,
                updated_at      TEXT NOT NULL
            )",
            [],
        )?;

        // One reflection record per year
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS antaryatra (
                year            INTEGER PRIMARY KEY,
                status          TEXT NOT NULL,
                text            TEXT NOT NULL DEFAULT '',
                recorded_on     TEXT NOT NULL,
                timezone        TEXT NOT NULL DEFAULT ''
            )",
            [],
        )?;

        Ok(())
    }

    /// Upsert a ledger entry keyed by its date, stamping `updated_at`.
    /// Last write wins.
    pub fn save_entry(&self, date: &str, count: i64, notes: &str) -> Result<(), DatabaseError> {
        let updated_at = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        self.conn.execute(
            "INSERT INTO entries (date, count, notes, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(date) DO UPDATE SET
                 count = excluded.count,
                 notes = excluded.notes,
                 updated_at = excluded.updated_at",
            rusqlite::params![date, count, notes, updated_at],
        )?;
        Ok(())
    }

    fn row_to_entry(row: &rusqlite::Row) -> Result<LedgerEntry, rusqlite::Error> {
        Ok(LedgerEntry {
            date: row.get(0)?,
            count: row.get(1)?,
            notes: row.get(2)?,
            updated_at: row.get(3)?,
            is_empty: false,
        })
    }

    /// Get a single entry by date
    pub fn get_entry(&self, date: &str) -> Result<Option<LedgerEntry>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT date, count, notes, updated_at FROM entries WHERE date = ?1",
        )?;

        match stmt.query_row(rusqlite::params![date], Self::row_to_entry) {
            Ok(entry) => Ok(Some(entry)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DatabaseError::from(e)),
        }
    }

    /// Get all entries ordered by date DESC (newest first)
    pub fn get_all_entries(&self) -> Result<Vec<LedgerEntry>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT date, count, notes, updated_at FROM entries ORDER BY date DESC",
        )?;
        let entries = stmt
            .query_map([], Self::row_to_entry)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    /// Delete an entry by date
    pub fn delete_entry(&self, date: &str) -> Result<(), DatabaseError> {
        self.conn
            .execute("DELETE FROM entries WHERE date = ?1", rusqlite::params![date])?;
        Ok(())
    }

    /// Get the singleton sankalpa, if one has been established
    pub fn get_sankalpa(&self) -> Result<Option<Sankalpa>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT text, context, date, updated_at FROM sankalpa WHERE id = 1",
        )?;

        let result = stmt.query_row([], |row| {
            Ok(Sankalpa {
                text: row.get(0)?,
                context: row.get(1)?,
                date: row.get(2)?,
                updated_at: row.get(3)?,
            })
        });

        match result {
            Ok(sankalpa) => Ok(Some(sankalpa)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DatabaseError::from(e)),
        }
    }

    /// Upsert the singleton sankalpa. Preserving the original establishment
    /// date on a rewrite is the caller's responsibility.
    pub fn save_sankalpa(&self, sankalpa: &Sankalpa) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO sankalpa (id, text, context, date, updated_at)
             VALUES (1, ?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
                 text = excluded.text,
                 context = excluded.context,
                 date = excluded.date,
                 updated_at = excluded.updated_at",
            rusqlite::params![sankalpa.text, sankalpa.context, sankalpa.date, sankalpa.updated_at],
        )?;
        Ok(())
    }

    fn row_to_antaryatra(row: &rusqlite::Row) -> Result<AntaryatraRecord, rusqlite::Error> {
        let status: String = row.get(1)?;
        let status: AntaryatraStatus = status.parse().map_err(|e: String| {
            rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, e.into())
        })?;
        Ok(AntaryatraRecord {
            year: row.get(0)?,
            status,
            text: row.get(2)?,
            recorded_on: row.get(3)?,
            timezone: row.get(4)?,
        })
    }

    /// Get the reflection record for a year, if any
    pub fn get_antaryatra(&self, year: i32) -> Result<Option<AntaryatraRecord>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT year, status, text, recorded_on, timezone FROM antaryatra WHERE year = ?1",
        )?;

        match stmt.query_row(rusqlite::params![year], Self::row_to_antaryatra) {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DatabaseError::from(e)),
        }
    }

    /// Get all reflection records ordered by year DESC
    pub fn get_all_antaryatra(&self) -> Result<Vec<AntaryatraRecord>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT year, status, text, recorded_on, timezone FROM antaryatra ORDER BY year DESC",
        )?;
        let records = stmt
            .query_map([], Self::row_to_antaryatra)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Upsert a reflection record keyed by year. The sealed-once-written
    /// contract is checked by the caller via `antaryatra::can_record`.
    pub fn save_antaryatra(&self, record: &AntaryatraRecord) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO antaryatra (year, status, text, recorded_on, timezone)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(year) DO UPDATE SET
                 status = excluded.status,
                 text = excluded.text,
                 recorded_on = excluded.recorded_on,
                 timezone = excluded.timezone",
            rusqlite::params![
                record.year,
                record.status.as_str(),
                record.text,
                record.recorded_on,
                record.timezone
            ],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn open_db(dir: &TempDir) -> Database {
        let path = dir.path().join("ledger.db");
        Database::new(path.to_str().unwrap()).unwrap()
    }

    #[test]
    fn save_is_an_upsert_keyed_by_date() {
        let dir = TempDir::new().unwrap();
        let db = open_db(&dir);

        db.save_entry("2026-02-27", 108, "").unwrap();
        db.save_entry("2026-02-27", 1080, "second sitting").unwrap();

        let all = db.get_all_entries().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].count, 1080);
        assert_eq!(all[0].notes, "second sitting");
        assert!(!all[0].updated_at.is_empty());
    }

    #[test]
    fn entries_come_back_newest_first() {
        let dir = TempDir::new().unwrap();
        let db = open_db(&dir);

        db.save_entry("2026-01-01", 100, "").unwrap();
        db.save_entry("2026-02-01", 200, "").unwrap();
        db.save_entry("2025-12-31", 300, "").unwrap();

        let dates: Vec<String> = db
            .get_all_entries()
            .unwrap()
            .into_iter()
            .map(|e| e.date)
            .collect();
        assert_eq!(dates, vec!["2026-02-01", "2026-01-01", "2025-12-31"]);
    }

    #[test]
    fn get_and_delete_by_date() {
        let dir = TempDir::new().unwrap();
        let db = open_db(&dir);

        db.save_entry("2026-02-27", 108, "").unwrap();
        assert!(db.get_entry("2026-02-27").unwrap().is_some());
        assert!(db.get_entry("2026-02-26").unwrap().is_none());

        db.delete_entry("2026-02-27").unwrap();
        assert!(db.get_entry("2026-02-27").unwrap().is_none());
    }

    #[test]
    fn sankalpa_is_a_singleton() {
        let dir = TempDir::new().unwrap();
        let db = open_db(&dir);

        assert!(db.get_sankalpa().unwrap().is_none());

        db.save_sankalpa(&Sankalpa::new(
            "daily practice".to_string(),
            String::new(),
            "2026-01-01".to_string(),
        ))
        .unwrap();

        let mut rewritten = db.get_sankalpa().unwrap().unwrap();
        rewritten.text = "renewed vow".to_string();
        rewritten.updated_at = "2026-06-01".to_string();
        db.save_sankalpa(&rewritten).unwrap();

        let stored = db.get_sankalpa().unwrap().unwrap();
        assert_eq!(stored.text, "renewed vow");
        assert_eq!(stored.date, "2026-01-01");
        assert_eq!(stored.updated_at, "2026-06-01");
    }

    #[test]
    fn antaryatra_records_round_trip_by_year() {
        let dir = TempDir::new().unwrap();
        let db = open_db(&dir);

        assert!(db.get_antaryatra(2025).unwrap().is_none());

        db.save_antaryatra(&AntaryatraRecord {
            year: 2025,
            status: AntaryatraStatus::Recorded,
            text: "a year of steadiness".to_string(),
            recorded_on: "2025-12-31".to_string(),
            timezone: "Asia/Kolkata".to_string(),
        })
        .unwrap();
        db.save_antaryatra(&AntaryatraRecord {
            year: 2024,
            status: AntaryatraStatus::Skipped,
            text: String::new(),
            recorded_on: "2025-01-02".to_string(),
            timezone: String::new(),
        })
        .unwrap();

        let record = db.get_antaryatra(2025).unwrap().unwrap();
        assert_eq!(record.status, AntaryatraStatus::Recorded);
        assert_eq!(record.text, "a year of steadiness");

        let years: Vec<i32> = db
            .get_all_antaryatra()
            .unwrap()
            .into_iter()
            .map(|r| r.year)
            .collect();
        assert_eq!(years, vec![2025, 2024]);
    }
}
