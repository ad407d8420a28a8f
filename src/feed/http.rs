use super::types::Book;
use super::{parse_feed, BookFeed};
use crate::config::FeedConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Feed fetched with a single HTTP GET.
pub struct HttpFeed {
    client: Client,
    url: String,
}

impl HttpFeed {
    pub fn new(config: &FeedConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            url: config.url.trim().to_string(),
        })
    }

    pub async fn fetch_text(&self) -> Result<String> {
        tracing::info!(url = %self.url, "fetching feed");

        let resp = self.client.get(&self.url).send().await
            .with_context(|| format!("GET {} failed", self.url))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("feed request failed ({}): {}", status, body);
        }

        let text = resp.text().await
            .context("failed to read feed body")?;
        tracing::debug!(bytes = text.len(), "feed downloaded");
        Ok(text)
    }
}

#[async_trait]
impl BookFeed for HttpFeed {
    async fn fetch_books(&mut self) -> Result<Vec<Book>> {
        let text = self.fetch_text().await?;
        tracing::info!("parsing feed content");
        parse_feed(&text).with_context(|| format!("failed to parse feed from {}", self.url))
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}
