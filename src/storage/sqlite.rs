use crate::matcher::MatchPredicate;
use crate::model::{MatchResult, ReportError};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, Row, params};
use std::path::Path;

/// One stored pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRun {
    pub id: i64,
    pub generated_at: DateTime<Utc>,
    pub predicate: String,
    pub course_count: usize,
}

pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens the database and creates the history tables if needed
    pub fn new(db_path: &Path) -> Result<Self, ReportError> {
        Self::init(Connection::open(db_path)?)
    }

    pub fn open_in_memory() -> Result<Self, ReportError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, ReportError> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS match_runs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                generated_at TEXT NOT NULL,
                predicate TEXT NOT NULL,
                course_count INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS course_matches (
                run_id INTEGER NOT NULL REFERENCES match_runs(id),
                position INTEGER NOT NULL,
                course_name TEXT NOT NULL,
                badge_name TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_course_matches_run ON course_matches(run_id);
            "
        )?;
        Ok(Self { conn })
    }

    /// Stores a run and every (course, badge) pair. Courses without matches
    /// get a single row with a NULL badge so they still show up.
    pub fn save_run(
        &self,
        result: &MatchResult,
        predicate: MatchPredicate,
        generated_at: DateTime<Utc>,
    ) -> Result<i64, ReportError> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO match_runs (generated_at, predicate, course_count) VALUES (?1, ?2, ?3)",
            params![generated_at.to_rfc3339(), predicate.as_str(), result.len() as i64],
        )?;
        let run_id = tx.last_insert_rowid();

        {
            let mut stmt = tx.prepare(
                "INSERT INTO course_matches (run_id, position, course_name, badge_name) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (position, (course, badges)) in result.iter().enumerate() {
                if badges.is_empty() {
                    stmt.execute(params![run_id, position as i64, course, None::<String>])?;
                }
                for badge in badges {
                    stmt.execute(params![run_id, position as i64, course, badge])?;
                }
            }
        }

        tx.commit()?;
        Ok(run_id)
    }

    /// Most recently stored run, if any
    pub fn latest_run(&self) -> Result<Option<StoredRun>, ReportError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, generated_at, predicate, course_count FROM match_runs ORDER BY id DESC LIMIT 1",
        )?;
        let mut rows = stmt.query([])?;
        match rows.next()? {
            Some(row) => Ok(Some(Self::map_run(row)?)),
            None => Ok(None),
        }
    }

    /// Rebuilds the result of a stored run in its original course order
    pub fn load_run(&self, run_id: i64) -> Result<MatchResult, ReportError> {
        let mut stmt = self.conn.prepare(
            "SELECT course_name, badge_name FROM course_matches WHERE run_id = ?1 ORDER BY position ASC, rowid ASC",
        )?;
        let rows = stmt.query_map(params![run_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?))
        })?;

        let mut result = MatchResult::new();
        let mut current: Option<(String, Vec<String>)> = None;
        for row in rows {
            let (course, badge) = row?;
            if let Some((_, badges)) = current.as_mut().filter(|(name, _)| *name == course) {
                badges.extend(badge);
                continue;
            }
            if let Some((name, badges)) = current.take() {
                result.insert(name, badges);
            }
            current = Some((course, badge.into_iter().collect()));
        }
        if let Some((name, badges)) = current {
            result.insert(name, badges);
        }
        Ok(result)
    }

    fn map_run(row: &Row) -> Result<StoredRun, rusqlite::Error> {
        let generated_at_str: String = row.get(1)?;
        let generated_at = DateTime::parse_from_rfc3339(&generated_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e)))?;
        let course_count: i64 = row.get(3)?;

        Ok(StoredRun {
            id: row.get(0)?,
            generated_at,
            predicate: row.get(2)?,
            course_count: course_count as usize,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MatchResult {
        let mut result = MatchResult::new();
        result.insert("Data Science with Python".into(), vec!["Python".into(), "Data".into()]);
        result.insert("Networking".into(), vec![]);
        result.insert("AI Fundamentals".into(), vec!["AI".into()]);
        result
    }

    #[test]
    fn stored_run_round_trips_in_order() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        let result = sample();

        let run_id = storage.save_run(&result, MatchPredicate::NameInName, Utc::now()).unwrap();

        assert_eq!(storage.load_run(run_id).unwrap(), result);
    }

    #[test]
    fn latest_run_reflects_last_save() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        assert!(storage.latest_run().unwrap().is_none());

        storage.save_run(&sample(), MatchPredicate::NameInName, Utc::now()).unwrap();
        let second = storage
            .save_run(&MatchResult::new(), MatchPredicate::Bidirectional, Utc::now())
            .unwrap();

        let latest = storage.latest_run().unwrap().unwrap();
        assert_eq!(latest.id, second);
        assert_eq!(latest.predicate, "bidirectional");
        assert_eq!(latest.course_count, 0);
    }

    #[test]
    fn file_backed_database_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("matches.db");
        {
            let storage = SqliteStorage::new(&path).unwrap();
            storage.save_run(&sample(), MatchPredicate::NameInName, Utc::now()).unwrap();
        }
        let reopened = SqliteStorage::new(&path).unwrap();
        assert_eq!(reopened.latest_run().unwrap().unwrap().course_count, 3);
    }
}
