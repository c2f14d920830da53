use crate::errors::DashboardError;
use crate::services::http::HttpFetcher;
use reqwest::Url;
use serde_json::Value;
use std::sync::Arc;

/// Avatar lookups against the Keybase user API.
#[derive(Clone)]
pub struct KeybaseClient {
    fetcher: Arc<dyn HttpFetcher>,
    base_url: String,
}

impl KeybaseClient {
    pub fn new(fetcher: Arc<dyn HttpFetcher>, base_url: &str) -> Self {
        Self {
            fetcher,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn lookup_url(&self, identity: &str) -> Result<String, DashboardError> {
        let endpoint = format!("{}/_/api/1.0/user/lookup.json", self.base_url);
        Url::parse_with_params(&endpoint, &[("fields", "pictures"), ("key_suffix", identity)])
            .map(String::from)
            .map_err(|e| DashboardError::Enrichment {
                identity: identity.to_string(),
                reason: e.to_string(),
            })
    }

    /// Primary picture URL for an identity tag. An empty tag is not looked up.
    pub async fn fetch_avatar(&self, identity: &str) -> Result<Option<String>, DashboardError> {
        let identity = identity.trim();
        if identity.is_empty() {
            return Ok(None);
        }

        let url = self.lookup_url(identity)?;
        let body = self
            .fetcher
            .get_json(&url)
            .await
            .map_err(|e| DashboardError::Enrichment {
                identity: identity.to_string(),
                reason: e.to_string(),
            })?;

        Ok(primary_picture(&body))
    }
}

fn primary_picture(body: &Value) -> Option<String> {
    body.pointer("/them/0/pictures/primary/url")
        .and_then(Value::as_str)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
}
