use crate::diagnostics::Diagnostics;
use crate::model::{FetchError, RawDocument};
use std::path::Path;

/// A single GET request: absolute URL plus extra headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl FetchRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Retrieves remote resources. Implementations never retry; a failed call is
/// reported once and handed back as a typed error.
#[async_trait::async_trait]
pub trait ResourceFetcher: Send + Sync {
    async fn request(&self, req: &FetchRequest) -> Result<Vec<u8>, FetchError>;

    fn diagnostics(&self) -> &dyn Diagnostics;

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.request(&FetchRequest::get(url)).await
    }

    async fn fetch_json(&self, url: &str) -> Result<RawDocument, FetchError> {
        let bytes = self.fetch(url).await?;
        decode_json(self.diagnostics(), url, &bytes)
    }

    /// Writes the body verbatim to `destination` and returns the byte count.
    async fn fetch_and_persist(&self, url: &str, destination: &Path) -> Result<u64, FetchError> {
        let bytes = self.fetch(url).await?;
        let persist_err = |source| FetchError::Persist {
            url: url.to_string(),
            path: destination.to_path_buf(),
            source,
        };

        if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                let err = persist_err(e);
                self.diagnostics().warning(&format!("❌ {}", err));
                return Err(err);
            }
        }
        if let Err(e) = tokio::fs::write(destination, &bytes).await {
            let err = persist_err(e);
            self.diagnostics().warning(&format!("❌ {}", err));
            return Err(err);
        }

        self.diagnostics().info(&format!(
            "💾 Saved {} bytes from {} to {}",
            bytes.len(),
            url,
            destination.display()
        ));
        Ok(bytes.len() as u64)
    }
}

pub(crate) fn decode_json(
    diagnostics: &dyn Diagnostics,
    url: &str,
    bytes: &[u8],
) -> Result<RawDocument, FetchError> {
    crate::store::decode(bytes).map_err(|e| {
        let err = FetchError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        };
        diagnostics.warning(&format!("❌ {}", err));
        err
    })
}
