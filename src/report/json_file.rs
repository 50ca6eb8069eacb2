use crate::matcher::MatchPredicate;
use crate::model::{MatchResult, ReportError};
use crate::report::{Reporter, RunSummary};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

#[derive(Serialize)]
struct Document<'a> {
    generated_at: DateTime<Utc>,
    predicate: MatchPredicate,
    matches: &'a MatchResult,
}

/// Writes the run as pretty-printed JSON, replacing any previous file.
pub struct JsonFileReporter {
    path: PathBuf,
}

impl JsonFileReporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Reporter for JsonFileReporter {
    fn name(&self) -> &'static str {
        "json"
    }

    fn emit(&self, summary: &RunSummary<'_>) -> Result<(), ReportError> {
        let doc = Document {
            generated_at: summary.generated_at,
            predicate: summary.predicate,
            matches: summary.result,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_vec_pretty(&doc)?)?;
        Ok(())
    }
}
