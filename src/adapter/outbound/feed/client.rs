//! HTTP client for the external search feed.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use tracing::{debug, warn};

use super::dto::{parse_item, FeedPage};
use crate::config::FeedConfig;
use crate::domain::{DateWindow, MasterRecord, Topic};
use crate::error::{FetchError, Result};
use crate::port::RecordFetcher;

/// Search feed client implementing [`RecordFetcher`].
///
/// Retries rate-limit (429) and server (5xx) responses with a linearly
/// growing backoff before giving up. Safe to call repeatedly with the same
/// cursor: overlapping results are deduplicated downstream during merge.
pub struct FeedClient {
    http: reqwest::Client,
    config: FeedConfig,
    api_key: Option<String>,
}

impl FeedClient {
    /// Build a client from feed settings.
    ///
    /// The API key is read from the environment variable named by
    /// `config.api_key_env`; a missing key simply sends unauthenticated
    /// requests.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: FeedConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(FetchError::Http)?;
        let api_key = std::env::var(&config.api_key_env).ok();
        Ok(Self {
            http,
            config,
            api_key,
        })
    }

    async fn get_page(&self, params: &[(&str, String)]) -> Result<FeedPage> {
        let mut attempt = 0;
        loop {
            let mut request = self.http.get(&self.config.api_url).query(params);
            if let Some(key) = &self.api_key {
                request = request.query(&[("key", key.as_str())]);
            }

            let response = request.send().await.map_err(FetchError::Http)?;
            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                attempt += 1;
                if attempt >= self.config.retries {
                    return Err(FetchError::Status {
                        status: status.as_u16(),
                    }
                    .into());
                }
                let backoff = Duration::from_millis(1500 * u64::from(attempt));
                warn!(%status, attempt, ?backoff, "feed throttled, backing off");
                tokio::time::sleep(backoff).await;
                continue;
            }
            if !status.is_success() {
                return Err(FetchError::Status {
                    status: status.as_u16(),
                }
                .into());
            }

            return response
                .json::<FeedPage>()
                .await
                .map_err(|e| FetchError::Http(e).into());
        }
    }
}

impl RecordFetcher for FeedClient {
    async fn fetch(
        &self,
        topic: &Topic,
        window: &DateWindow,
        cursor: Option<DateTime<Utc>>,
    ) -> Result<Vec<MasterRecord>> {
        // Incremental cursor wins over the window's left edge when present.
        let published_after =
            cursor.unwrap_or_else(|| window.start().and_hms_opt(0, 0, 0).unwrap_or_default().and_utc());

        let mut records = Vec::new();
        let mut page_token: Option<String> = None;
        let mut dropped = 0usize;

        for page_index in 0..self.config.max_pages {
            let mut params = vec![
                ("q", topic.to_string()),
                ("published_after", published_after.to_rfc3339()),
                ("max_results", self.config.page_size.to_string()),
                ("order", "date".to_string()),
            ];
            if let Some(token) = &page_token {
                params.push(("page_token", token.clone()));
            }

            let page = self.get_page(&params).await?;
            debug!(%topic, page_index, items = page.items.len(), "feed page received");

            for item in &page.items {
                match parse_item(item) {
                    Ok(record) => records.push(record),
                    Err(error) => {
                        dropped += 1;
                        warn!(%topic, %error, "dropping malformed feed item");
                    }
                }
            }

            page_token = page.next_page_token;
            if page_token.is_none() {
                break;
            }
        }

        if dropped > 0 {
            warn!(%topic, dropped, kept = records.len(), "feed batch had malformed items");
        }
        Ok(records)
    }
}
