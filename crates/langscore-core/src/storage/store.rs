use crate::model::{JobArgs, ScoreEntry, SubmissionStatus};
use crate::storage::schema::{DDL, TABLES_CHILD_FIRST};
use anyhow::Context;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub struct Store {
    pub conn: Arc<Mutex<Connection>>,
}

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: i64,
    pub email: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub last_login: Option<String>,
}

pub struct StoreStats {
    pub submissions: u64,
    pub models: u64,
    pub scores: u64,
    pub last_submission_id: Option<i64>,
}

impl Store {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let conn = Connection::open(path).context("failed to open sqlite db")?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory sqlite db")?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> anyhow::Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("store connection mutex poisoned"))
    }

    pub fn init_schema(&self) -> anyhow::Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(DDL)?;
        Ok(())
    }

    /// Deletes every row of every table, keeping the schema.
    pub fn clear_schema(&self) -> anyhow::Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        for table in TABLES_CHILD_FIRST {
            tx.execute(&format!("DELETE FROM {}", table), [])
                .with_context(|| format!("clear table {}", table))?;
        }
        tx.commit()?;
        Ok(())
    }

    // users

    pub fn insert_user(&self, user: &UserRow) -> anyhow::Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO users(id, email, is_active, is_staff, is_superuser, last_login)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                user.id,
                user.email,
                user.is_active,
                user.is_staff,
                user.is_superuser,
                user.last_login
            ],
        )
        .context("insert user")?;
        Ok(())
    }

    pub fn user_exists(&self, id: i64) -> anyhow::Result<bool> {
        let conn = self.lock()?;
        let found: Option<i64> = conn
            .query_row("SELECT id FROM users WHERE id = ?1", params![id], |r| r.get(0))
            .optional()?;
        Ok(found.is_some())
    }

    // submissions

    pub fn create_submission(&self, args: &JobArgs, fingerprint: &str) -> anyhow::Result<i64> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO submissions(job_id, user_id, model_type, status, fingerprint, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                args.job_id,
                args.user_id,
                args.model_type.as_str(),
                SubmissionStatus::Running.as_str(),
                fingerprint,
                now_rfc3339()
            ],
        )
        .context("insert submission")?;
        Ok(conn.last_insert_rowid())
    }

    pub fn finalize_submission(&self, id: i64, status: SubmissionStatus) -> anyhow::Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "UPDATE submissions SET status=?1 WHERE id=?2",
            params![status.as_str(), id],
        )?;
        Ok(())
    }

    pub fn submission_status(&self, id: i64) -> anyhow::Result<Option<SubmissionStatus>> {
        let conn = self.lock()?;
        let s: Option<String> = conn
            .query_row(
                "SELECT status FROM submissions WHERE id = ?1",
                params![id],
                |r| r.get(0),
            )
            .optional()?;
        Ok(s.map(|s| SubmissionStatus::parse(&s)))
    }

    // models

    /// Registers a model on first submission; later submissions keep the original owner.
    pub fn upsert_model(
        &self,
        name: &str,
        owner_id: i64,
        submission_id: i64,
        public: bool,
        competition: Option<&str>,
    ) -> anyhow::Result<i64> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO models(name, owner_id, submission_id, public, competition)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(name) DO NOTHING",
            params![name, owner_id, submission_id, public, competition],
        )
        .context("insert model")?;
        let id = conn.query_row(
            "SELECT id FROM models WHERE name = ?1",
            params![name],
            |r| r.get(0),
        )?;
        Ok(id)
    }

    pub fn model_id(&self, name: &str) -> anyhow::Result<Option<i64>> {
        let conn = self.lock()?;
        Ok(conn
            .query_row(
                "SELECT id FROM models WHERE name = ?1",
                params![name],
                |r| r.get(0),
            )
            .optional()?)
    }

    /// Names of every stored model, oldest first.
    pub fn list_model_names(&self) -> anyhow::Result<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT name FROM models ORDER BY id ASC")?;
        let rows = stmt
            .query_map([], |r| r.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    // benchmarks

    pub fn upsert_benchmark(&self, identifier: &str, ceiling: Option<f64>) -> anyhow::Result<i64> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO benchmarks(identifier, ceiling) VALUES (?1, ?2)
             ON CONFLICT(identifier) DO UPDATE SET ceiling=COALESCE(excluded.ceiling, benchmarks.ceiling)",
            params![identifier, ceiling],
        )
        .context("insert benchmark")?;
        let id = conn.query_row(
            "SELECT id FROM benchmarks WHERE identifier = ?1",
            params![identifier],
            |r| r.get(0),
        )?;
        Ok(id)
    }

    // scores

    /// Appends a score row. Rows are never deduplicated.
    pub fn insert_score(
        &self,
        model_id: i64,
        benchmark_id: i64,
        entry: &ScoreEntry,
    ) -> anyhow::Result<i64> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO scores(model_id, benchmark_id, score_raw, score_ceiled, error, comment, start_timestamp, end_timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                model_id,
                benchmark_id,
                entry.score_raw,
                entry.score_ceiled,
                entry.error,
                entry.comment,
                entry.start_timestamp,
                entry.end_timestamp
            ],
        )
        .context("insert score")?;
        Ok(conn.last_insert_rowid())
    }

    pub fn list_scores(&self) -> anyhow::Result<Vec<ScoreEntry>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT m.name, b.identifier, s.score_ceiled, s.score_raw, s.error, s.comment,
                    s.start_timestamp, s.end_timestamp
             FROM scores s
             JOIN models m ON s.model_id = m.id
             JOIN benchmarks b ON s.benchmark_id = b.id
             ORDER BY s.id ASC",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(ScoreEntry {
                    model: row.get(0)?,
                    benchmark: row.get(1)?,
                    score_ceiled: row.get(2)?,
                    score_raw: row.get(3)?,
                    error: row.get(4)?,
                    comment: row.get(5)?,
                    start_timestamp: row.get(6)?,
                    end_timestamp: row.get(7)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn count_rows(&self, table: &str) -> anyhow::Result<i64> {
        let conn = self.lock()?;
        if !TABLES_CHILD_FIRST.contains(&table) {
            anyhow::bail!("Invalid table name for count_rows: {}", table);
        }
        let sql = format!("SELECT COUNT(*) FROM {}", table);
        let n: i64 = conn.query_row(&sql, [], |r| r.get(0))?;
        Ok(n)
    }

    pub fn stats(&self) -> anyhow::Result<StoreStats> {
        let count = |t: &str| self.count_rows(t).map(|n| n as u64);
        let submissions = count("submissions")?;
        let models = count("models")?;
        let scores = count("scores")?;
        let conn = self.lock()?;
        let last_submission_id = conn
            .query_row("SELECT MAX(id) FROM submissions", [], |r| {
                r.get::<_, Option<i64>>(0)
            })?;
        Ok(StoreStats {
            submissions,
            models,
            scores,
            last_submission_id,
        })
    }
}

pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}
