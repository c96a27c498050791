use chrono::NaiveDateTime;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{types::Type, Connection, OptionalExtension, Row};

use crate::{
    branch::model::{Branch, NewBranch, Translations},
    error::AppResult,
    timing::{
        day_entry::DayEntry,
        schedule::WeeklySchedule,
        time_of_day::{format_time_of_day, parse_time_of_day},
        weekday::Weekday,
    },
    ISO_FORMAT,
};

pub type ConnectionPool = Pool<SqliteConnectionManager>;

const BRANCH_COLUMNS: &str = "id, name, address, description, is_active, created_at";

pub struct SqliteDatabase {}

impl SqliteDatabase {
    fn with_foreign_keys(manager: SqliteConnectionManager) -> SqliteConnectionManager {
        manager.with_init(|connection| connection.execute_batch("PRAGMA foreign_keys = ON;"))
    }

    /// Pool over a database file, with foreign keys enforced on every connection.
    /// The tables are created if the file does not have them yet.
    pub fn open_file_pool(path: &str) -> AppResult<ConnectionPool> {
        let manager = Self::with_foreign_keys(SqliteConnectionManager::file(path));
        let pool = Pool::builder().build(manager)?;
        {
            let connection = pool.get()?;
            Self::create_tables(&connection)?;
        }
        Ok(pool)
    }

    /// Single-connection in-memory pool; every pooled connection to `:memory:`
    /// would otherwise see its own empty database.
    #[cfg(test)]
    pub fn open_memory_pool() -> ConnectionPool {
        let manager = Self::with_foreign_keys(SqliteConnectionManager::memory());
        let pool = Pool::builder().max_size(1).build(manager).unwrap();
        {
            let connection = pool.get().unwrap();
            Self::create_tables(&connection).unwrap();
        }
        pool
    }

    pub fn create_tables(connection: &Connection) -> rusqlite::Result<()> {
        connection.execute_batch(
            "CREATE TABLE IF NOT EXISTS branches (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                address TEXT NOT NULL DEFAULT '{}',
                description TEXT NOT NULL DEFAULT '{}',
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS branch_working_hours (
                id INTEGER PRIMARY KEY,
                branch_id INTEGER NOT NULL REFERENCES branches(id) ON DELETE CASCADE,
                day_of_week INTEGER NOT NULL CHECK (day_of_week BETWEEN 0 AND 6),
                opens_at TEXT,
                closes_at TEXT,
                is_closed INTEGER NOT NULL DEFAULT 0,
                UNIQUE (branch_id, day_of_week)
            );",
        )
    }

    fn translations_column(row: &Row, index: usize) -> rusqlite::Result<Translations> {
        let text: String = row.get(index)?;
        serde_json::from_str(&text)
            .map_err(|err| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(err)))
    }

    fn branch_from_row(row: &Row) -> rusqlite::Result<Branch> {
        let created_at: String = row.get(5)?;
        let created_at = NaiveDateTime::parse_from_str(&created_at, ISO_FORMAT)
            .map_err(|err| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(err)))?;
        Ok(Branch {
            id: row.get(0)?,
            name: Self::translations_column(row, 1)?,
            address: Self::translations_column(row, 2)?,
            description: Self::translations_column(row, 3)?,
            is_active: row.get(4)?,
            created_at,
        })
    }

    fn to_json(translations: &Translations) -> rusqlite::Result<String> {
        serde_json::to_string(translations)
            .map_err(|err| rusqlite::Error::ToSqlConversionFailure(Box::new(err)))
    }

    /**
    Insert a branch and return its id.
    */
    pub fn insert_branch(
        connection: &Connection,
        branch: &NewBranch,
        created_at: NaiveDateTime,
    ) -> rusqlite::Result<i64> {
        connection.execute(
            "INSERT INTO branches (name, address, description, is_active, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                Self::to_json(&branch.name)?,
                Self::to_json(&branch.address)?,
                Self::to_json(&branch.description)?,
                branch.is_active,
                created_at.format(ISO_FORMAT).to_string(),
            ],
        )?;
        Ok(connection.last_insert_rowid())
    }

    /**
    Get a branch by id, active or not.

    Returns an `Ok(None)` if no branch has that id.
    */
    pub fn query_branch(connection: &Connection, id: i64) -> rusqlite::Result<Option<Branch>> {
        connection
            .query_row(
                &format!("SELECT {} FROM branches WHERE id = ?1", BRANCH_COLUMNS),
                rusqlite::params![id],
                Self::branch_from_row,
            )
            .optional()
    }

    /**
    Get one page of active branches ordered by id.
    */
    pub fn query_active_branches(
        connection: &Connection,
        limit: i64,
        offset: i64,
    ) -> rusqlite::Result<Vec<Branch>> {
        let mut statement = connection.prepare(&format!(
            "SELECT {} FROM branches WHERE is_active = 1 ORDER BY id LIMIT ?1 OFFSET ?2",
            BRANCH_COLUMNS
        ))?;
        let rows = statement.query_map(rusqlite::params![limit, offset], Self::branch_from_row)?;

        let mut data: Vec<Branch> = Vec::new();
        for row in rows {
            data.push(row?);
        }
        Ok(data)
    }

    /**
    Overwrite the stored fields of an existing branch.

    Returns the number of rows touched.
    */
    pub fn update_branch(connection: &Connection, branch: &Branch) -> rusqlite::Result<usize> {
        connection.execute(
            "UPDATE branches SET name = ?1, address = ?2, description = ?3, is_active = ?4
             WHERE id = ?5",
            rusqlite::params![
                Self::to_json(&branch.name)?,
                Self::to_json(&branch.address)?,
                Self::to_json(&branch.description)?,
                branch.is_active,
                branch.id,
            ],
        )
    }

    /**
    Delete a branch. Its working hours go with it.
    */
    pub fn delete_branch(connection: &Connection, id: i64) -> rusqlite::Result<usize> {
        connection.execute("DELETE FROM branches WHERE id = ?1", rusqlite::params![id])
    }

    /**
    Load the weekly schedule of a branch.

    Stored times that do not parse load as missing, which evaluates as closed.
    */
    pub fn query_schedule(connection: &Connection, branch_id: i64) -> rusqlite::Result<WeeklySchedule> {
        let mut statement = connection.prepare(
            "SELECT day_of_week, opens_at, closes_at, is_closed
             FROM branch_working_hours WHERE branch_id = ?1",
        )?;
        let rows = statement.query_map(rusqlite::params![branch_id], |row| {
            let day: u8 = row.get(0)?;
            let weekday = Weekday::from_number(day)
                .ok_or(rusqlite::Error::IntegralValueOutOfRange(0, day as i64))?;
            let opens_at: Option<String> = row.get(1)?;
            let closes_at: Option<String> = row.get(2)?;
            let is_closed: bool = row.get(3)?;
            Ok(DayEntry::new(
                weekday,
                opens_at.as_deref().and_then(parse_time_of_day),
                closes_at.as_deref().and_then(parse_time_of_day),
                is_closed,
            ))
        })?;

        let mut entries: Vec<DayEntry> = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(WeeklySchedule::from_entries(entries))
    }

    /**
    Insert or replace the entry for one weekday of a branch.
    */
    pub fn upsert_day_entry(
        connection: &Connection,
        branch_id: i64,
        entry: &DayEntry,
    ) -> rusqlite::Result<()> {
        connection.execute(
            "INSERT INTO branch_working_hours (branch_id, day_of_week, opens_at, closes_at, is_closed)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (branch_id, day_of_week) DO UPDATE SET
                opens_at = excluded.opens_at,
                closes_at = excluded.closes_at,
                is_closed = excluded.is_closed",
            rusqlite::params![
                branch_id,
                entry.weekday().number(),
                entry.opens_at().map(format_time_of_day),
                entry.closes_at().map(format_time_of_day),
                entry.is_closed(),
            ],
        )?;
        Ok(())
    }

    /**
    Upsert many entries in one transaction; either all are written or none.
    */
    pub fn upsert_many_day_entries(
        connection: &Connection,
        branch_id: i64,
        entries: &[DayEntry],
    ) -> rusqlite::Result<()> {
        let transaction = connection.unchecked_transaction()?;
        for entry in entries {
            Self::upsert_day_entry(&transaction, branch_id, entry)?;
        }
        transaction.commit()
    }
}
