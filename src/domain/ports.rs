use crate::domain::model::{FilterOutcome, Listing};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn search_url(&self) -> String;
    fn output_path(&self) -> &str;
    fn max_pages(&self) -> usize;
    fn max_listings(&self) -> Option<usize>;
    fn request_delay_ms(&self) -> u64;
    fn exclusion_file(&self) -> &str;
}

/// 詳細頁抓取的外部協作者，production 實作帶重試，測試以 fixture 替換
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<Listing>>;
    async fn transform(&self, listings: Vec<Listing>) -> Result<FilterOutcome>;
    async fn load(&self, outcome: FilterOutcome) -> Result<String>;
}
