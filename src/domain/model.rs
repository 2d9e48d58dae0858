use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 搜尋結果頁上的一筆二手主機廣告
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Listing {
    pub title: String,
    pub link: String,
    /// 列表頁顯示的原始價格字串（例如 "150 lei"）
    pub price: Option<String>,
    pub location: Option<String>,
    pub date: Option<String>,
}

/// 價格來源層級，結構化資料優先於價格元素，優先於全文掃描
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PriceTier {
    Structured,
    Element,
    TextScan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    Lei,
    Ron,
    Eur,
}

impl Currency {
    pub fn from_unit(unit: &str) -> Self {
        match unit.to_lowercase().as_str() {
            "ron" => Currency::Ron,
            "€" | "eur" => Currency::Eur,
            _ => Currency::Lei,
        }
    }

    /// 價格上限只能和 RON 價格比較，EUR 視為無法評估
    pub fn is_ron(&self) -> bool {
        matches!(self, Currency::Lei | Currency::Ron)
    }
}

/// 擷取階段產出的候選價格，僅存活於單次擷取
#[derive(Debug, Clone, PartialEq)]
pub struct PriceCandidate {
    pub value: f64,
    pub currency: Currency,
    pub tier: PriceTier,
    pub source_text: String,
}

/// 選擇器最終選定的價格
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedPrice {
    pub value: f64,
    pub currency: Currency,
    pub display: String,
}

/// 主機型號，依標題判定，每筆廣告至多一個
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelKey {
    XboxOne,
    XboxOneS,
    XboxOneX,
    XboxSeriesS,
    XboxSeriesX,
    Ps4,
    Ps4Slim,
    Ps4Pro,
    Ps5,
    Ps5Digital,
    Switch,
    NintendoSwitch,
}

impl ModelKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKey::XboxOne => "xbox one",
            ModelKey::XboxOneS => "xbox one s",
            ModelKey::XboxOneX => "xbox one x",
            ModelKey::XboxSeriesS => "xbox series s",
            ModelKey::XboxSeriesX => "xbox series x",
            ModelKey::Ps4 => "ps4",
            ModelKey::Ps4Slim => "ps4 slim",
            ModelKey::Ps4Pro => "ps4 pro",
            ModelKey::Ps5 => "ps5",
            ModelKey::Ps5Digital => "ps5 digital",
            ModelKey::Switch => "switch",
            ModelKey::NintendoSwitch => "nintendo switch",
        }
    }

    /// 設定檔中的型號名稱（與 `as_str` 相同寫法）
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_lowercase();
        [
            ModelKey::XboxOne,
            ModelKey::XboxOneS,
            ModelKey::XboxOneX,
            ModelKey::XboxSeriesS,
            ModelKey::XboxSeriesX,
            ModelKey::Ps4,
            ModelKey::Ps4Slim,
            ModelKey::Ps4Pro,
            ModelKey::Ps5,
            ModelKey::Ps5Digital,
            ModelKey::Switch,
            ModelKey::NintendoSwitch,
        ]
        .into_iter()
        .find(|key| key.as_str() == name)
    }
}

impl std::fmt::Display for ModelKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeepReason {
    Passed,
    /// 詳細頁抓取失敗，fail-open 保留
    FetchFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExcludeReason {
    ManuallyExcluded,
    TitleQuality,
    UrlQuality,
    ExcludedModel,
    PriceTooHigh,
    DescriptionQuality,
}

impl ExcludeReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExcludeReason::ManuallyExcluded => "manually-excluded",
            ExcludeReason::TitleQuality => "title-quality",
            ExcludeReason::UrlQuality => "url-quality",
            ExcludeReason::ExcludedModel => "excluded-model",
            ExcludeReason::PriceTooHigh => "price-too-high",
            ExcludeReason::DescriptionQuality => "description-quality",
        }
    }
}

/// 單筆廣告的最終判定，第一個觸發的理由即為最終理由
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "kebab-case")]
pub enum Verdict {
    Keep { reason: KeepReason },
    Exclude { reason: ExcludeReason },
}

impl Verdict {
    pub fn is_keep(&self) -> bool {
        matches!(self, Verdict::Keep { .. })
    }
}

/// 一筆廣告的完整評估結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    pub listing_id: String,
    pub title: String,
    pub verdict: Verdict,
    pub resolved_price: Option<SelectedPrice>,
    pub model: Option<ModelKey>,
}

/// 過濾階段的彙總輸出
#[derive(Debug, Clone)]
pub struct FilterOutcome {
    pub kept: Vec<Listing>,
    pub evaluations: Vec<Evaluation>,
    pub summary: FilterSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterSummary {
    pub total: usize,
    pub kept: usize,
    pub fetch_failed: usize,
    pub excluded_by_reason: BTreeMap<String, usize>,
    pub completed_at: DateTime<Utc>,
}

impl FilterSummary {
    pub fn excluded_total(&self) -> usize {
        self.excluded_by_reason.values().sum()
    }
}
