// Result reporters: where a finished MatchResult ends up
pub mod console;
pub mod json_file;

use crate::config::ReportConfig;
use crate::matcher::MatchPredicate;
use crate::model::{MatchResult, ReportError};
use crate::storage::SqliteStorage;
use chrono::{DateTime, Utc};

pub use console::ConsoleReporter;
pub use json_file::JsonFileReporter;

/// Everything a reporter gets about one finished run.
pub struct RunSummary<'a> {
    pub result: &'a MatchResult,
    pub predicate: MatchPredicate,
    pub generated_at: DateTime<Utc>,
}

pub trait Reporter {
    fn name(&self) -> &'static str;
    fn emit(&self, summary: &RunSummary<'_>) -> Result<(), ReportError>;
}

impl Reporter for SqliteStorage {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn emit(&self, summary: &RunSummary<'_>) -> Result<(), ReportError> {
        self.save_run(summary.result, summary.predicate, summary.generated_at)?;
        Ok(())
    }
}

/// Reporters enabled by `config`. The history database is opened by the
/// caller so the same connection can be read before the run.
pub fn build_reporters(config: &ReportConfig, history: Option<SqliteStorage>) -> Vec<Box<dyn Reporter>> {
    let mut reporters: Vec<Box<dyn Reporter>> = Vec::new();
    if config.console {
        reporters.push(Box::new(ConsoleReporter));
    }
    if let Some(path) = &config.json_path {
        reporters.push(Box::new(JsonFileReporter::new(path.clone())));
    }
    if let Some(storage) = history {
        reporters.push(Box::new(storage));
    }
    reporters
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_connection_is_reused_as_reporter() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("history.db");
        let config = ReportConfig {
            console: false,
            json_path: Some(dir.path().join("matches.json")),
            sqlite_path: Some(db.clone()),
        };
        let history = SqliteStorage::new(&db).unwrap();
        assert!(history.latest_run().unwrap().is_none());

        let reporters = build_reporters(&config, Some(history));
        let names: Vec<_> = reporters.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["json", "sqlite"]);

        let mut result = MatchResult::new();
        result.insert("AI Fundamentals".into(), vec!["AI".into()]);
        let summary = RunSummary {
            result: &result,
            predicate: MatchPredicate::NameInName,
            generated_at: Utc::now(),
        };
        for reporter in &reporters {
            reporter.emit(&summary).unwrap();
        }
        drop(reporters);

        let latest = SqliteStorage::new(&db).unwrap().latest_run().unwrap().unwrap();
        assert_eq!(latest.course_count, 1);
    }

    #[test]
    fn no_history_means_no_sqlite_reporter() {
        let reporters = build_reporters(&ReportConfig::default(), None);
        let names: Vec<_> = reporters.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["console"]);
    }
}
