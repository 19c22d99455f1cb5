//! Minimal client for OpenAI-compatible JSON APIs
//!
//! Shared by the embedding and chat completion clients: bearer auth, a
//! request timeout and an optional bounded retry on throttling, server
//! errors and transport failures.

use crate::error::{Error, Result};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

pub struct ApiBackendClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    retries: usize,
}

impl ApiBackendClient {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout: Duration,
        retries: usize,
    ) -> Result<Self> {
        Url::parse(base_url)?;

        let client = Client::builder().timeout(timeout).build()?;
        let api_key = api_key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty());
        if api_key.is_none() {
            warn!("No API key configured for {}; sending unauthenticated requests", base_url);
        }

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            retries,
        })
    }

    /// Resolve `path` below the base URL, keeping any base path such as `/v1`
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        let joined = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        Url::parse(&joined).map_err(|e| Error::Config(format!("Invalid API URL {}: {}", joined, e)))
    }

    /// POST a JSON body and decode a JSON response.
    ///
    /// Failures are wrapped with `wrap` so callers keep their own error kind.
    pub async fn post_json<B, T>(&self, path: &str, body: &B, wrap: fn(String) -> Error) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        let mut last_err: Option<Error> = None;

        for attempt in 0..=self.retries {
            let mut request = self.client.post(url.clone()).json(body);
            if let Some(key) = &self.api_key {
                request = request.bearer_auth(key);
            }

            let retryable = match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response.json::<T>().await.map_err(|e| {
                            wrap(format!("Failed to parse response from {}: {}", url, e))
                        });
                    }

                    let text = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "<body unavailable>".to_string());
                    last_err = Some(wrap(format!("{} returned {}: {}", url, status, text)));
                    should_retry(status)
                }
                Err(e) => {
                    last_err = Some(wrap(format!("Request to {} failed: {}", url, e)));
                    true
                }
            };

            if !retryable || attempt >= self.retries {
                break;
            }

            debug!(attempt = attempt + 1, "Retrying request to {}", url);
            tokio::time::sleep(Duration::from_millis(200 * (attempt + 1) as u64)).await;
        }

        Err(last_err.unwrap_or_else(|| wrap(format!("Request to {} failed", url))))
    }
}

fn should_retry(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}
