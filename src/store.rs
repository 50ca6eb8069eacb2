// Local JSON documents: load from disk or parse bytes already in memory
use crate::diagnostics::Diagnostics;
use crate::model::{LoadError, RawDocument};
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

/// The one place raw bytes become a `RawDocument`.
pub fn decode(bytes: &[u8]) -> serde_json::Result<RawDocument> {
    serde_json::from_slice(bytes)
}

pub struct JsonStore {
    diagnostics: Arc<dyn Diagnostics>,
}

impl JsonStore {
    pub fn new(diagnostics: Arc<dyn Diagnostics>) -> Self {
        Self { diagnostics }
    }

    /// Reads and parses `path`. A missing file and a malformed one are
    /// different errors; `[]` is a perfectly good document.
    pub async fn load(&self, path: &Path) -> Result<RawDocument, LoadError> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                let err = if e.kind() == ErrorKind::NotFound {
                    LoadError::NotFound { path: path.to_path_buf() }
                } else {
                    LoadError::Io { path: path.to_path_buf(), source: e }
                };
                self.diagnostics.warning(&format!("❌ {}", err));
                return Err(err);
            }
        };

        let doc = self.parse(&bytes, &path.display().to_string())?;
        self.diagnostics
            .info(&format!("📂 JSON file loaded successfully: {}", path.display()));
        Ok(doc)
    }

    pub fn parse(&self, bytes: &[u8], origin: &str) -> Result<RawDocument, LoadError> {
        decode(bytes).map_err(|e| {
            let err = LoadError::Malformed {
                origin: origin.to_string(),
                reason: e.to_string(),
            };
            self.diagnostics.warning(&format!("❌ {}", err));
            err
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{Level, MemoryDiagnostics};
    use serde_json::json;

    fn store() -> (JsonStore, Arc<MemoryDiagnostics>) {
        let diagnostics = Arc::new(MemoryDiagnostics::new());
        (JsonStore::new(diagnostics.clone()), diagnostics)
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let (store, diagnostics) = store();
        let dir = tempfile::tempdir().unwrap();

        let err = store.load(&dir.path().join("absent.json")).await.unwrap_err();

        assert!(matches!(err, LoadError::NotFound { .. }));
        assert_eq!(diagnostics.count(Level::Warning), 1);
    }

    #[tokio::test]
    async fn garbage_is_malformed() {
        let (store, _) = store();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("badges.json");
        std::fs::write(&path, "not json").unwrap();

        let err = store.load(&path).await.unwrap_err();

        assert!(matches!(err, LoadError::Malformed { .. }));
    }

    #[tokio::test]
    async fn empty_array_is_a_valid_document() {
        let (store, diagnostics) = store();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("courses.json");
        std::fs::write(&path, "[]").unwrap();

        let doc = store.load(&path).await.unwrap();

        assert_eq!(doc, json!([]));
        assert_eq!(diagnostics.count(Level::Warning), 0);
        assert_eq!(diagnostics.count(Level::Info), 1);
    }

    #[test]
    fn parses_in_memory_bytes() {
        let (store, _) = store();
        let doc = store.parse(br#"{"courses": []}"#, "memory").unwrap();
        assert_eq!(doc, json!({"courses": []}));
    }
}
