// Credly-style badge API client
use crate::fetcher::traits::{FetchRequest, ResourceFetcher, decode_json};
use crate::model::{FetchError, RawDocument};
use std::fmt;
use std::sync::Arc;

const BADGES_ENDPOINT: &str = "badges";

pub struct BadgeServiceClient {
    base_url: String,
    authorization_token: String,
    fetcher: Arc<dyn ResourceFetcher>,
}

impl BadgeServiceClient {
    pub fn new(
        base_url: impl Into<String>,
        authorization_token: impl Into<String>,
        fetcher: Arc<dyn ResourceFetcher>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            authorization_token: authorization_token.into(),
            fetcher,
        }
    }

    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    fn build_request(&self, endpoint: &str) -> FetchRequest {
        FetchRequest::get(self.endpoint_url(endpoint))
            .header("Accept", "application/json")
            .header("Authorization", format!("Bearer {}", self.authorization_token))
            .header("Content-Type", "application/json")
    }

    /// Authenticated GET of `endpoint`, body left undecoded.
    pub async fn get_raw(&self, endpoint: &str) -> Result<Vec<u8>, FetchError> {
        self.fetcher.request(&self.build_request(endpoint)).await
    }

    /// Authenticated GET of `endpoint`, decoded as JSON.
    pub async fn get(&self, endpoint: &str) -> Result<RawDocument, FetchError> {
        let bytes = self.get_raw(endpoint).await?;
        decode_json(self.fetcher.diagnostics(), &self.endpoint_url(endpoint), &bytes)
    }

    /// First page of the organization's badges.
    pub async fn fetch_badges(&self) -> Result<RawDocument, FetchError> {
        self.get(BADGES_ENDPOINT).await
    }

    /// Same request as [`fetch_badges`](Self::fetch_badges), without decoding.
    pub async fn fetch_badges_raw(&self) -> Result<Vec<u8>, FetchError> {
        self.get_raw(BADGES_ENDPOINT).await
    }

    pub fn badges_url(&self) -> String {
        self.endpoint_url(BADGES_ENDPOINT)
    }
}

impl fmt::Debug for BadgeServiceClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BadgeServiceClient")
            .field("base_url", &self.base_url)
            .field("authorization_token", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{Diagnostics, MemoryDiagnostics};
    use serde_json::json;
    use std::sync::Mutex;

    struct CannedFetcher {
        body: &'static str,
        seen: Mutex<Vec<FetchRequest>>,
        diagnostics: MemoryDiagnostics,
    }

    impl CannedFetcher {
        fn new(body: &'static str) -> Arc<Self> {
            Arc::new(Self {
                body,
                seen: Mutex::new(Vec::new()),
                diagnostics: MemoryDiagnostics::new(),
            })
        }
    }

    #[async_trait::async_trait]
    impl ResourceFetcher for CannedFetcher {
        async fn request(&self, req: &FetchRequest) -> Result<Vec<u8>, FetchError> {
            self.seen.lock().unwrap().push(req.clone());
            Ok(self.body.as_bytes().to_vec())
        }

        fn diagnostics(&self) -> &dyn Diagnostics {
            &self.diagnostics
        }
    }

    #[tokio::test]
    async fn fetch_badges_sends_bearer_headers() {
        let fetcher = CannedFetcher::new(r#"[{"name": "AI"}]"#);
        let client = BadgeServiceClient::new("https://sandbox.credly.com/v1/", "tok", fetcher.clone());

        let doc = client.fetch_badges().await.unwrap();

        assert_eq!(doc, json!([{"name": "AI"}]));
        let seen = fetcher.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].url, "https://sandbox.credly.com/v1/badges");
        assert_eq!(
            seen[0].headers,
            vec![
                ("Accept".to_string(), "application/json".to_string()),
                ("Authorization".to_string(), "Bearer tok".to_string()),
                ("Content-Type".to_string(), "application/json".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn raw_badges_are_returned_undecoded() {
        let fetcher = CannedFetcher::new("not json");
        let client = BadgeServiceClient::new("https://sandbox.credly.com/v1", "tok", fetcher.clone());

        let bytes = client.fetch_badges_raw().await.unwrap();

        assert_eq!(bytes, b"not json");
        assert_eq!(client.badges_url(), "https://sandbox.credly.com/v1/badges");
        let seen = fetcher.seen.lock().unwrap();
        assert_eq!(seen[0].url, client.badges_url());
        assert!(seen[0].headers.iter().any(|(k, v)| k == "Authorization" && v == "Bearer tok"));
    }

    #[tokio::test]
    async fn non_json_body_is_reported_not_raised() {
        let fetcher = CannedFetcher::new("not json");
        let client = BadgeServiceClient::new("https://sandbox.credly.com/v1", "tok", fetcher);

        let err = client.get("/badges").await.unwrap_err();

        assert!(matches!(err, FetchError::Decode { .. }));
    }

    #[test]
    fn debug_hides_the_token() {
        let client = BadgeServiceClient::new("https://x", "super-secret", CannedFetcher::new("[]"));
        let printed = format!("{:?}", client);
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("<redacted>"));
    }
}
