use crate::errors::{AppError, AppResult};
use crate::models::{AppSettings, Habit};
use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::fs;
use std::path::Path;
use std::sync::Mutex;

const SCHEMA_SQL: &str = include_str!("schema.sql");

/// The habit store: two related tables in a file-resident SQLite database.
/// All access goes through one connection behind a mutex; every operation is
/// a single synchronous statement (or statement pair), no batching.
#[derive(Debug)]
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn new(path: &Path) -> AppResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| AppError::Io(err.to_string()))?;
        }
        let conn = Connection::open(path).map_err(AppError::from)?;
        conn.execute_batch(SCHEMA_SQL).map_err(AppError::from)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock_conn(&self) -> AppResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::Internal("database mutex poisoned".to_string()))
    }

    /// Creates a habit and returns the stored record. The id comes from the
    /// SQLite rowid, so ids are monotonic and never reused.
    pub fn create_habit(
        &self,
        name: &str,
        description: Option<&str>,
        created_at: NaiveDate,
    ) -> AppResult<Habit> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("habit name must not be empty".to_string()));
        }
        let description = description
            .map(str::trim)
            .filter(|desc| !desc.is_empty())
            .map(ToString::to_string);

        let conn = self.lock_conn()?;
        conn.execute(
            "INSERT INTO habits (name, description, created_at) VALUES (?1, ?2, ?3)",
            params![name, description, created_at],
        )?;
        let id = conn.last_insert_rowid();
        tracing::info!(habit_id = id, name = %name, "created habit");

        Ok(Habit {
            id,
            name: name.to_string(),
            description,
            created_at,
        })
    }

    /// All habits in insertion order (ascending id).
    pub fn list_habits(&self) -> AppResult<Vec<Habit>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, description, created_at FROM habits ORDER BY id ASC",
        )?;
        let habits = stmt
            .query_map([], parse_habit_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(habits)
    }

    pub fn get_habit(&self, habit_id: i64) -> AppResult<Option<Habit>> {
        let conn = self.lock_conn()?;
        conn.query_row(
            "SELECT id, name, description, created_at FROM habits WHERE id = ?1",
            [habit_id],
            parse_habit_row,
        )
        .optional()
        .map_err(AppError::from)
    }

    /// Upserts the completion entry for `(habit_id, day)` with `done = true`.
    /// Idempotent: a second mark on the same day overwrites the same row,
    /// which `UNIQUE(habit_id, log_date)` guarantees is the only one.
    pub fn mark_done(&self, habit_id: i64, day: NaiveDate) -> AppResult<()> {
        let conn = self.lock_conn()?;
        let exists = conn
            .query_row("SELECT 1 FROM habits WHERE id = ?1", [habit_id], |row| {
                row.get::<_, i64>(0)
            })
            .optional()?
            .is_some();
        if !exists {
            return Err(AppError::NotFound(format!("habit {} does not exist", habit_id)));
        }

        conn.execute(
            "INSERT INTO habit_logs (habit_id, log_date, done)
             VALUES (?1, ?2, 1)
             ON CONFLICT(habit_id, log_date) DO UPDATE SET done = 1",
            params![habit_id, day],
        )?;
        tracing::debug!(habit_id, day = %day, "marked habit done");
        Ok(())
    }

    /// Absence of a row reads as not-done, never as an error.
    pub fn is_done(&self, habit_id: i64, day: NaiveDate) -> AppResult<bool> {
        let conn = self.lock_conn()?;
        let done: Option<i64> = conn
            .query_row(
                "SELECT done FROM habit_logs WHERE habit_id = ?1 AND log_date = ?2",
                params![habit_id, day],
                |row| row.get(0),
            )
            .optional()?;
        Ok(done == Some(1))
    }

    /// Counts done entries whose `log_date` is in the given explicit day set.
    /// The `IN (...)` list is fully parameterized, one placeholder per day.
    pub fn count_done_in_range(&self, habit_id: i64, days: &[NaiveDate]) -> AppResult<i64> {
        if days.is_empty() {
            return Ok(0);
        }

        let placeholders = vec!["?"; days.len()].join(", ");
        let query = format!(
            "SELECT COUNT(*) FROM habit_logs
             WHERE habit_id = ? AND done = 1 AND log_date IN ({})",
            placeholders
        );

        let mut dyn_params: Vec<&dyn rusqlite::ToSql> = Vec::with_capacity(days.len() + 1);
        dyn_params.push(&habit_id);
        for day in days {
            dyn_params.push(day);
        }

        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(&query)?;
        let count: i64 = stmt.query_row(rusqlite::params_from_iter(dyn_params), |row| row.get(0))?;
        Ok(count)
    }

    pub fn count_done_all_time(&self, habit_id: i64) -> AppResult<i64> {
        let conn = self.lock_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM habit_logs WHERE habit_id = ?1 AND done = 1",
            [habit_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn get_settings(&self) -> AppResult<AppSettings> {
        let conn = self.lock_conn()?;
        let raw = conn
            .query_row(
                "SELECT value_json FROM settings WHERE key = 'app'",
                [],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        match raw {
            Some(raw) => Ok(serde_json::from_str::<AppSettings>(&raw).unwrap_or_default()),
            None => Ok(AppSettings::default()),
        }
    }

    /// Merges a partial JSON value into the stored settings and persists the
    /// result, returning the effective settings.
    pub fn update_settings(&self, update: serde_json::Value) -> AppResult<AppSettings> {
        let current = self.get_settings()?;
        let mut merged = serde_json::to_value(current)?;
        merge_json(&mut merged, update);
        let settings: AppSettings = serde_json::from_value(merged)?;

        let conn = self.lock_conn()?;
        conn.execute(
            "INSERT INTO settings (key, value_json, updated_at)
             VALUES ('app', ?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value_json = excluded.value_json, updated_at = excluded.updated_at",
            params![serde_json::to_string(&settings)?, Utc::now().to_rfc3339()],
        )?;

        Ok(settings)
    }
}

fn parse_habit_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Habit> {
    Ok(Habit {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn merge_json(target: &mut serde_json::Value, update: serde_json::Value) {
    match (target, update) {
        (serde_json::Value::Object(target_map), serde_json::Value::Object(update_map)) => {
            for (key, value) in update_map {
                merge_json(target_map.entry(key).or_insert(serde_json::Value::Null), value);
            }
        }
        (target, update) => {
            *target = update;
        }
    }
}
