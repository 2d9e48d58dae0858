use crate::core::filters::{listing_id, ExclusionRegistry, ForbiddenPhrases, PriceLimits};
use crate::core::model_id::{identify_model, ExcludedModels};
use crate::core::{normalizer, price_extract};
use crate::domain::model::{
    Evaluation, ExcludeReason, KeepReason, Listing, SelectedPrice, Verdict,
};
use crate::domain::ports::PageFetcher;

/// 一次執行期間唯讀的過濾規則，明確傳入而非模組層級狀態，
/// 測試可以直接以 fixture 替換。
#[derive(Debug, Clone, Default)]
pub struct FilterRules {
    pub phrases: ForbiddenPhrases,
    pub excluded_models: ExcludedModels,
    pub limits: PriceLimits,
    pub registry: ExclusionRegistry,
}

/// 逐筆評估廣告的狀態機：
/// 排除名單 → 標題/URL 品質 → 抓詳細頁 → 解析價格 → 型號 →
/// 價格上限 → 描述品質 → 判定。
/// 任何一步排除即短路，記下第一個觸發的理由。
pub struct ListingFilter<'a, F: PageFetcher> {
    rules: FilterRules,
    fetcher: &'a F,
}

impl<'a, F: PageFetcher> ListingFilter<'a, F> {
    pub fn new(rules: FilterRules, fetcher: &'a F) -> Self {
        Self { rules, fetcher }
    }

    pub fn rules(&self) -> &FilterRules {
        &self.rules
    }

    pub async fn evaluate(&self, listing: &Listing) -> Evaluation {
        let id = listing_id(&listing.link);
        let model = identify_model(&listing.title);

        // 手動排除名單最優先，先於其他所有訊號
        if self.rules.registry.contains_link(&listing.link) {
            tracing::info!("❌ Excluding (manually excluded): {}", preview(&listing.title));
            return self.excluded(id, listing, model, None, ExcludeReason::ManuallyExcluded);
        }

        // 標題與 URL 在任何網路請求之前檢查
        if let Some(phrase) = self.rules.phrases.matches(&listing.title) {
            tracing::info!(
                "❌ Excluding (title quality, '{}'): {}",
                phrase,
                preview(&listing.title)
            );
            return self.excluded(id, listing, model, None, ExcludeReason::TitleQuality);
        }

        if let Some(phrase) = self.rules.phrases.matches(&listing.link) {
            tracing::info!(
                "❌ Excluding (URL quality, '{}'): {}",
                phrase,
                preview(&listing.title)
            );
            return self.excluded(id, listing, model, None, ExcludeReason::UrlQuality);
        }

        tracing::info!("🔍 Checking listing page for: {}", preview(&listing.title));

        // 抓不到詳細頁時 fail-open：缺資料永遠不是排除的理由
        let html = match self.fetcher.fetch(&listing.link).await {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!("⚠️ Could not fetch page ({}), keeping listing", e);
                return Evaluation {
                    listing_id: id,
                    title: listing.title.clone(),
                    verdict: Verdict::Keep {
                        reason: KeepReason::FetchFailed,
                    },
                    resolved_price: None,
                    model,
                };
            }
        };

        let resolved_price = self.resolve_price(listing, &html);
        if let Some(price) = &resolved_price {
            tracing::debug!(
                "📊 Price from page: {} (was: {})",
                price.display,
                listing.price.as_deref().unwrap_or("N/A")
            );
        }

        if let Some(term) = self.rules.excluded_models.matches(&listing.title) {
            tracing::info!(
                "❌ Excluding (unwanted model '{}'): {}",
                term,
                preview(&listing.title)
            );
            return self.excluded(id, listing, model, resolved_price, ExcludeReason::ExcludedModel);
        }

        if let (Some(model_key), Some(price)) = (model, &resolved_price) {
            if self.rules.limits.exceeds(model_key, price) {
                let ceiling = self.rules.limits.ceiling(model_key).unwrap_or_default();
                tracing::info!(
                    "❌ Excluding (price too high - {} > {} for {}): {}",
                    price.value,
                    ceiling,
                    model_key,
                    preview(&listing.title)
                );
                return self.excluded(id, listing, model, resolved_price, ExcludeReason::PriceTooHigh);
            }
        }

        let description = price_extract::extract_description(&html);
        if let Some(phrase) = self.rules.phrases.matches(&description) {
            tracing::info!(
                "❌ Excluding (description quality, '{}'): {}",
                phrase,
                preview(&listing.title)
            );
            return self.excluded(
                id,
                listing,
                model,
                resolved_price,
                ExcludeReason::DescriptionQuality,
            );
        }

        tracing::info!("✅ Keeping: {}", preview(&listing.title));
        Evaluation {
            listing_id: id,
            title: listing.title.clone(),
            verdict: Verdict::Keep {
                reason: KeepReason::Passed,
            },
            resolved_price,
            model,
        }
    }

    // 詳細頁解不出價格時，退回列表頁的臨時價格字串
    fn resolve_price(&self, listing: &Listing, html: &str) -> Option<SelectedPrice> {
        price_extract::resolve_price(html).or_else(|| {
            listing.price.as_deref().and_then(|display| {
                normalizer::parse_price_display(display).map(|(value, currency)| SelectedPrice {
                    value,
                    currency,
                    display: display.to_string(),
                })
            })
        })
    }

    fn excluded(
        &self,
        listing_id: String,
        listing: &Listing,
        model: Option<crate::domain::model::ModelKey>,
        resolved_price: Option<SelectedPrice>,
        reason: ExcludeReason,
    ) -> Evaluation {
        Evaluation {
            listing_id,
            title: listing.title.clone(),
            verdict: Verdict::Exclude { reason },
            resolved_price,
            model,
        }
    }
}

fn preview(title: &str) -> String {
    if title.chars().count() > 50 {
        let truncated: String = title.chars().take(50).collect();
        format!("{}...", truncated)
    } else {
        title.to_string()
    }
}
