use crate::config::HttpConfig;
use crate::diagnostics::Diagnostics;
use crate::fetcher::traits::{FetchRequest, ResourceFetcher};
use crate::model::FetchError;

use reqwest::{Client, Url};
use std::sync::Arc;
use std::time::Duration;

/// Rejects anything that is not an absolute http(s) URL.
pub fn validate_url(url: &str) -> Result<Url, FetchError> {
    let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(FetchError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}

pub struct HttpFetcher {
    client: Client,
    diagnostics: Arc<dyn Diagnostics>,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig, diagnostics: Arc<dyn Diagnostics>) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self { client, diagnostics })
    }
}

#[async_trait::async_trait]
impl ResourceFetcher for HttpFetcher {
    async fn request(&self, req: &FetchRequest) -> Result<Vec<u8>, FetchError> {
        let url = match validate_url(&req.url) {
            Ok(url) => url,
            Err(e) => {
                self.diagnostics.warning(&format!("❌ {}", e));
                return Err(e);
            }
        };

        let mut builder = self.client.get(url);
        for (name, value) in &req.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let transport = |e: reqwest::Error| FetchError::Transport {
            url: req.url.clone(),
            message: e.to_string(),
        };

        let response = match builder.send().await {
            Ok(resp) => resp,
            Err(e) => {
                let err = transport(e);
                self.diagnostics.warning(&format!("❌ {}", err));
                return Err(err);
            }
        };

        let status = response.status();
        if !status.is_success() {
            let err = FetchError::HttpStatus {
                url: req.url.clone(),
                status: status.as_u16(),
            };
            self.diagnostics.warning(&format!("❌ {}", err));
            return Err(err);
        }

        match response.bytes().await {
            Ok(body) => {
                self.diagnostics
                    .info(&format!("✅ GET {} [{}]: {} bytes", req.url, status, body.len()));
                Ok(body.to_vec())
            }
            Err(e) => {
                let err = transport(e);
                self.diagnostics.warning(&format!("❌ {}", err));
                Err(err)
            }
        }
    }

    fn diagnostics(&self) -> &dyn Diagnostics {
        self.diagnostics.as_ref()
    }
}
