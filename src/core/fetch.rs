use crate::domain::ports::PageFetcher;
use crate::utils::error::{Result, ScoutError};
use async_trait::async_trait;
use std::time::Duration;

// 固定的瀏覽器身分字串，避免被當成機器人擋下
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

const DEFAULT_MAX_RETRIES: u32 = 3;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// 帶重試與指數退避的頁面抓取器。
///
/// 暫時性與永久性失敗對呼叫端無法區分，重試耗盡後一律回傳
/// `FetchExhausted`，由 orchestrator 以 fail-open 處理。
pub struct HttpFetcher {
    client: reqwest::Client,
    max_retries: u32,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        Self::with_retries(DEFAULT_MAX_RETRIES)
    }

    pub fn with_retries(max_retries: u32) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            max_retries: max_retries.max(1),
        })
    }

    async fn try_fetch(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        for attempt in 0..self.max_retries {
            match self.try_fetch(url).await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    tracing::warn!(
                        "⚠️ Attempt {}/{} failed for {}: {}",
                        attempt + 1,
                        self.max_retries,
                        url,
                        e
                    );
                    if attempt + 1 < self.max_retries {
                        // 指數退避：1s, 2s, 4s…
                        tokio::time::sleep(Duration::from_secs(1u64 << attempt)).await;
                    }
                }
            }
        }

        Err(ScoutError::FetchExhausted {
            url: url.to_string(),
            attempts: self.max_retries,
        })
    }
}
