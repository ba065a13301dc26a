//! SQLite-backed quota store.
//!
//! Tables:
//! - `weekly_quotas`: one row per `(user_id, training_type, source_id)`
//! - `news`: content items with their source and validity flag
//! - `news_training`: training actions, one marker column per training type

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use crate::domain::{
    AuthContext, ContentItem, LegacyDefinition, SourceId, TrainingMarks, TrainingRecord, TrainingType, UserId,
    WeeklyQuota,
};
use crate::error::{Result, RotorError};
use crate::store::QuotaStore;

/// Outcome of a legacy definition import.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: Vec<SkippedDefinition>,
}

/// A definition row that was left out of an import, with the reason.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SkippedDefinition {
    pub name: String,
    pub reason: String,
}

/// Quota store on a single SQLite connection.
///
/// rusqlite::Connection isn't Sync, so access goes through a Mutex.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore").finish_non_exhaustive()
    }
}

impl SqliteStore {
    /// Open or create a database file, creating parent directories as needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)
            .map_err(|e| RotorError::Storage(format!("Failed to open database {}: {}", path.display(), e)))?;
        Self::init_schema(&conn)?;

        info!("Opened quota store at {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS weekly_quotas (
                user_id INTEGER NOT NULL,
                training_type TEXT NOT NULL,
                source_id INTEGER NOT NULL,
                weekly_limit INTEGER NOT NULL,
                CHECK (source_id > 0 AND weekly_limit >= 0),
                PRIMARY KEY (user_id, training_type, source_id)
            );

            CREATE TABLE IF NOT EXISTS news (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                news_source_id INTEGER NOT NULL,
                invalid INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS news_training (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                news_id INTEGER NOT NULL REFERENCES news(id),
                "like" INTEGER,
                category INTEGER,
                time_stamp INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_news_source ON news(news_source_id);
            CREATE INDEX IF NOT EXISTS idx_training_user ON news_training(user_id);
            CREATE INDEX IF NOT EXISTS idx_training_time ON news_training(time_stamp);
            "#,
        )?;
        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| RotorError::Storage(e.to_string()))
    }

    /// Create or replace the limit for a quota's key. Admin only.
    pub fn set_quota(&self, auth: &AuthContext, quota: &WeeklyQuota) -> Result<()> {
        let admin = auth.require_admin()?;
        let conn = self.conn()?;
        Self::upsert_quota(&conn, quota)?;
        info!(
            "User {} set {} quota for user {} source {} to {}",
            admin.user_id, quota.training_type, quota.user_id, quota.source_id, quota.weekly_limit
        );
        Ok(())
    }

    fn upsert_quota(conn: &Connection, quota: &WeeklyQuota) -> Result<()> {
        conn.execute(
            r#"
            INSERT INTO weekly_quotas (user_id, training_type, source_id, weekly_limit)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (user_id, training_type, source_id)
            DO UPDATE SET weekly_limit = excluded.weekly_limit
            "#,
            params![
                quota.user_id.get(),
                quota.training_type.as_str(),
                quota.source_id.get(),
                quota.weekly_limit,
            ],
        )?;
        Ok(())
    }

    /// Delete a quota. Admin only. Returns whether a row existed.
    pub fn remove_quota(
        &self,
        auth: &AuthContext,
        user_id: UserId,
        training_type: TrainingType,
        source_id: SourceId,
    ) -> Result<bool> {
        let admin = auth.require_admin()?;
        let removed = self.conn()?.execute(
            "DELETE FROM weekly_quotas WHERE user_id = ?1 AND training_type = ?2 AND source_id = ?3",
            params![user_id.get(), training_type.as_str(), source_id.get()],
        )?;
        info!(
            "User {} removed {} quota for user {} source {} ({} row(s))",
            admin.user_id, training_type, user_id, source_id, removed
        );
        Ok(removed > 0)
    }

    /// Import legacy definition rows. Admin only.
    ///
    /// Rows that don't decode to a quota are skipped and reported; the rest
    /// are upserted in one transaction, later rows winning on duplicate keys.
    pub fn import_definitions(&self, auth: &AuthContext, rows: &[LegacyDefinition]) -> Result<ImportReport> {
        auth.require_admin()?;

        let mut report = ImportReport::default();
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        for row in rows {
            match row.to_quota() {
                Ok(quota) => {
                    Self::upsert_quota(&tx, &quota)?;
                    report.imported += 1;
                }
                Err(e) => {
                    warn!("Skipping definition '{}': {}", row.name, e);
                    report.skipped.push(SkippedDefinition {
                        name: row.name.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        tx.commit()?;
        info!(
            "Imported {} definition(s), skipped {}",
            report.imported,
            report.skipped.len()
        );
        Ok(report)
    }

    /// Add a content item belonging to `source_id`.
    pub fn add_item(&self, source_id: SourceId, invalid: bool) -> Result<ContentItem> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO news (news_source_id, invalid) VALUES (?1, ?2)",
            params![source_id.get(), invalid as i64],
        )?;
        Ok(ContentItem {
            id: conn.last_insert_rowid(),
            source_id,
            invalid,
        })
    }

    /// Look up a content item by id.
    pub fn get_item(&self, item_id: i64) -> Result<Option<ContentItem>> {
        let row = self
            .conn()?
            .query_row(
                "SELECT news_source_id, invalid FROM news WHERE id = ?1",
                [item_id],
                |row| Ok((row.get::<_, u32>(0)?, row.get::<_, i64>(1)?)),
            )
            .optional()?;

        match row {
            Some((source, invalid)) => Ok(Some(ContentItem {
                id: item_id,
                source_id: SourceId::new(source)?,
                invalid: invalid != 0,
            })),
            None => Ok(None),
        }
    }

    /// Append a training record for `user_id` on `item_id`.
    pub fn record_training(
        &self,
        user_id: UserId,
        item_id: i64,
        marks: &TrainingMarks,
        at: DateTime<Utc>,
    ) -> Result<TrainingRecord> {
        let time_stamp = at.timestamp_millis();
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO news_training (user_id, news_id, "like", category, time_stamp)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![user_id.get(), item_id, marks.like, marks.category, time_stamp],
        )?;

        let record = TrainingRecord {
            id: conn.last_insert_rowid(),
            user_id,
            item_id,
            marks: marks.clone(),
            time_stamp,
        };
        debug!("Recorded training {} for user {} on item {}", record.id, user_id, item_id);
        Ok(record)
    }
}

impl QuotaStore for SqliteStore {
    fn list_quotas(&self, user_id: UserId, training_type: TrainingType) -> Result<Vec<WeeklyQuota>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT source_id, weekly_limit FROM weekly_quotas
            WHERE user_id = ?1 AND training_type = ?2
            ORDER BY source_id
            "#,
        )?;
        let rows = stmt.query_map(params![user_id.get(), training_type.as_str()], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?))
        })?;

        // Rows written before the CHECK constraint existed may still be malformed.
        let mut quotas = Vec::new();
        for row in rows {
            let (source, limit) = row?;
            let source_id = u32::try_from(source).ok().and_then(|raw| SourceId::new(raw).ok());
            let weekly_limit = u32::try_from(limit).ok();
            match (source_id, weekly_limit) {
                (Some(source_id), Some(weekly_limit)) => {
                    quotas.push(WeeklyQuota::new(user_id, training_type, source_id, weekly_limit));
                }
                _ => warn!(
                    "Skipping malformed {} quota for user {}: source {} limit {}",
                    training_type, user_id, source, limit
                ),
            }
        }
        Ok(quotas)
    }

    fn count_completed(
        &self,
        user_id: UserId,
        training_type: TrainingType,
        source_id: SourceId,
        since: Option<DateTime<Utc>>,
    ) -> Result<u64> {
        let sql = format!(
            r#"
            SELECT COUNT(*) FROM news_training t
            JOIN news n ON n.id = t.news_id
            WHERE t.user_id = ?1
              AND t.{} IS NOT NULL
              AND n.news_source_id = ?2
              AND n.invalid = 0
              AND (?3 IS NULL OR t.time_stamp >= ?3)
            "#,
            training_type.marker_column()
        );
        let since_ms = since.map(|at| at.timestamp_millis());

        let count: i64 = self
            .conn()?
            .query_row(&sql, params![user_id.get(), source_id.get(), since_ms], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }
}
