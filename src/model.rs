// Core structs: Course, Badge, MatchResult and the error taxonomy
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

/// Untyped JSON as it comes off the wire or out of a file.
pub type RawDocument = serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub name: String,
    pub description: String,
}

/// Course name -> matched badge names, kept in first-seen course order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchResult {
    entries: Vec<(String, Vec<String>)>,
    index: HashMap<String, usize>,
}

impl MatchResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the list for `course`. A replaced course keeps its
    /// original position. Returns `true` when an earlier entry was overwritten.
    pub fn insert(&mut self, course: String, badges: Vec<String>) -> bool {
        match self.index.get(&course) {
            Some(&pos) => {
                self.entries[pos].1 = badges;
                true
            }
            None => {
                self.index.insert(course.clone(), self.entries.len());
                self.entries.push((course, badges));
                false
            }
        }
    }

    pub fn get(&self, course: &str) -> Option<&[String]> {
        self.index
            .get(course)
            .map(|&pos| self.entries[pos].1.as_slice())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(course, badges)| (course.as_str(), badges.as_slice()))
    }

    pub fn course_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(course, _)| course.as_str())
    }
}

impl Serialize for MatchResult {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (course, badges) in &self.entries {
            map.serialize_entry(course, badges)?;
        }
        map.end()
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("transport error for {url}: {message}")]
    Transport { url: String, message: String },
    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },
    #[error("response from {url} is not valid JSON: {message}")]
    Decode { url: String, message: String },
    #[error("failed to persist {url} to {}: {source}", .path.display())]
    Persist {
        url: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    /// Connection-level and status failures may clear up on their own.
    pub fn is_transient(&self) -> bool {
        matches!(self, FetchError::Transport { .. } | FetchError::HttpStatus { .. })
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("JSON file not found: {}", .path.display())]
    NotFound { path: PathBuf },
    #[error("error decoding JSON from {origin}: {reason}")]
    Malformed { origin: String, reason: String },
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("document is a {found}, expected an array or an object")]
    NotAContainer { found: &'static str },
    #[error("object has none of the expected keys: {}", .expected.join(", "))]
    MissingContainerKey { expected: Vec<&'static str> },
    #[error("'{key}' holds a {found}, expected an array")]
    NotAnArray { key: String, found: &'static str },
    #[error("element {index} is a {found}, expected a record")]
    NotARecord { index: usize, found: &'static str },
}

#[derive(Debug, Error)]
pub enum PipelineFailure {
    #[error("fetching {resource} failed after {attempts} attempt(s): {last}")]
    FetchExhausted {
        resource: String,
        attempts: u32,
        #[source]
        last: FetchError,
    },
    #[error("could not parse {resource}: {reason}")]
    ParseFailure { resource: String, reason: String },
    #[error("{resource} has an invalid shape: {source}")]
    SchemaInvalid {
        resource: String,
        #[source]
        source: SchemaError,
    },
}

impl PipelineFailure {
    pub fn cause(&self) -> &'static str {
        match self {
            PipelineFailure::FetchExhausted { .. } => "FetchExhausted",
            PipelineFailure::ParseFailure { .. } => "ParseFailure",
            PipelineFailure::SchemaInvalid { .. } => "SchemaInvalid",
        }
    }
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}
