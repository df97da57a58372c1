use std::time::Duration;

use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;

use super::AdapterError;

const USER_AGENT: &str = concat!("jobfeed/", env!("CARGO_PKG_VERSION"));

/// Thin wrapper over a shared `reqwest` client with a request timeout.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, AdapterError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json, application/rss+xml, */*;q=0.8"),
        );
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    /// GET a URL and return the body as text, failing on non-2xx statuses.
    pub async fn get_text(&self, url: &str, query: &[(&str, String)]) -> Result<String, AdapterError> {
        let response = self.client.get(url).query(query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AdapterError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.text().await?)
    }

    /// GET a URL and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, AdapterError> {
        let body = self.get_text(url, query).await?;
        decode_json(&body)
    }
}

/// Decodes a JSON body, tolerating a leading byte-order mark.
pub fn decode_json<T: DeserializeOwned>(body: &str) -> Result<T, AdapterError> {
    let trimmed = body.trim_start_matches('\u{FEFF}').trim();
    serde_json::from_str(trimmed).map_err(|e| AdapterError::Parse(e.to_string()))
}
