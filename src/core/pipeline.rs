use crate::core::discovery;
use crate::core::orchestrator::{FilterRules, ListingFilter};
use crate::domain::model::{FilterOutcome, FilterSummary, KeepReason, Listing, Verdict};
use crate::domain::ports::{ConfigProvider, PageFetcher, Pipeline, Storage};
use crate::utils::error::{Result, ScoutError};
use std::collections::BTreeMap;
use std::time::Duration;

pub const CSV_FILENAME: &str = "olx_defect_only.csv";
pub const JSON_FILENAME: &str = "olx_defect_only.json";
pub const REPORT_FILENAME: &str = "filter_report.json";

// 輸出欄位順序固定
const CSV_HEADER: [&str; 5] = ["title", "price", "location", "date", "link"];

pub struct ScoutPipeline<S: Storage, F: PageFetcher, C: ConfigProvider> {
    storage: S,
    fetcher: F,
    config: C,
    rules: FilterRules,
}

impl<S: Storage, F: PageFetcher, C: ConfigProvider> ScoutPipeline<S, F, C> {
    pub fn new(storage: S, fetcher: F, config: C, rules: FilterRules) -> Self {
        Self {
            storage,
            fetcher,
            config,
            rules,
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, F: PageFetcher, C: ConfigProvider> Pipeline for ScoutPipeline<S, F, C> {
    async fn extract(&self) -> Result<Vec<Listing>> {
        let search_url = self.config.search_url();
        discovery::scrape_search(&self.fetcher, &search_url, self.config.max_pages()).await
    }

    async fn transform(&self, listings: Vec<Listing>) -> Result<FilterOutcome> {
        let total_discovered = listings.len();

        let listings: Vec<Listing> = match self.config.max_listings() {
            Some(cap) => {
                tracing::info!("🧪 Processing first {} of {} listings", cap, total_discovered);
                listings.into_iter().take(cap).collect()
            }
            None => listings,
        };

        let filter = ListingFilter::new(self.rules.clone(), &self.fetcher);
        let delay = Duration::from_millis(self.config.request_delay_ms());

        let mut kept = Vec::new();
        let mut evaluations = Vec::new();
        let mut fetch_failed = 0usize;
        let mut excluded_by_reason: BTreeMap<String, usize> = BTreeMap::new();
        let mut processed = 0usize;

        let total = listings.len();
        for listing in listings {
            processed += 1;
            tracing::info!("📊 Progress: {}/{} listings", processed, total);

            // 缺標題或連結的不完整資料直接略過
            if listing.title.is_empty() || listing.link.is_empty() {
                continue;
            }

            let evaluation = filter.evaluate(&listing).await;
            match &evaluation.verdict {
                Verdict::Keep { reason } => {
                    if *reason == KeepReason::FetchFailed {
                        fetch_failed += 1;
                    }
                    kept.push(listing);
                }
                Verdict::Exclude { reason } => {
                    *excluded_by_reason
                        .entry(reason.as_str().to_string())
                        .or_insert(0) += 1;
                }
            }
            evaluations.push(evaluation);

            // 控制對站方的請求頻率
            tokio::time::sleep(delay).await;
        }

        let summary = FilterSummary {
            total,
            kept: kept.len(),
            fetch_failed,
            excluded_by_reason,
            completed_at: chrono::Utc::now(),
        };

        Ok(FilterOutcome {
            kept,
            evaluations,
            summary,
        })
    }

    async fn load(&self, outcome: FilterOutcome) -> Result<String> {
        let csv_bytes = listings_to_csv(&outcome.kept)?;
        self.storage.write_file(CSV_FILENAME, &csv_bytes).await?;

        let json_bytes = serde_json::to_vec_pretty(&outcome.kept)?;
        self.storage.write_file(JSON_FILENAME, &json_bytes).await?;

        // 完整評估報告，含每筆判定與彙總
        let report = serde_json::json!({
            "summary": outcome.summary,
            "evaluations": outcome.evaluations,
        });
        self.storage
            .write_file(REPORT_FILENAME, &serde_json::to_vec_pretty(&report)?)
            .await?;

        tracing::info!(
            "💾 Saved {} filtered listings to {}",
            outcome.kept.len(),
            CSV_FILENAME
        );

        Ok(format!("{}/{}", self.config.output_path(), CSV_FILENAME))
    }
}

/// 以固定欄位順序輸出 CSV，price 為列表頁的原始顯示字串，
/// 缺值以 "N/A" 補齊
pub fn listings_to_csv(listings: &[Listing]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;
    for listing in listings {
        writer.write_record([
            listing.title.as_str(),
            listing.price.as_deref().unwrap_or("N/A"),
            listing.location.as_deref().unwrap_or("N/A"),
            listing.date.as_deref().unwrap_or("N/A"),
            listing.link.as_str(),
        ])?;
    }
    writer.into_inner().map_err(|e| ScoutError::ProcessingError {
        message: format!("CSV buffer error: {}", e),
    })
}
