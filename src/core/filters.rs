use crate::domain::model::{ModelKey, SelectedPrice};
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

static LISTING_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-ID([a-zA-Z0-9]+)\.html").unwrap());

/// 品質禁用詞：出現任何一個即代表「沒有瑕疵」或是推廣/維修廣告。
///
/// 小寫子字串比對，變音符號視為不同字（只列舉明確的變體）。
#[derive(Debug, Clone)]
pub struct ForbiddenPhrases {
    phrases: Vec<String>,
}

impl Default for ForbiddenPhrases {
    fn default() -> Self {
        Self {
            phrases: [
                "fără defect",
                "fără defecte",
                "fara defecte",
                // URL 中的連字號寫法
                "fara-defecte",
                "ca nou",
                "perfect functional",
                "perfect funcțional",
                // 推廣/置頂廣告
                "promovat",
                "impecabil",
                // 維修服務廣告
                "reparatii",
                "reparatie",
                "reparații",
                "reparație",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl ForbiddenPhrases {
    pub fn new(phrases: Vec<String>) -> Self {
        Self { phrases }
    }

    /// 回傳文字中命中的第一個禁用詞
    pub fn matches(&self, text: &str) -> Option<&str> {
        if text.is_empty() {
            return None;
        }
        let text_lower = text.to_lowercase();
        self.phrases
            .iter()
            .find(|phrase| text_lower.contains(phrase.as_str()))
            .map(|s| s.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }
}

/// 各型號的收購價格上限（RON）。表中沒有的型號不設限。
#[derive(Debug, Clone)]
pub struct PriceLimits {
    limits: Vec<(ModelKey, f64)>,
}

impl Default for PriceLimits {
    fn default() -> Self {
        Self {
            limits: vec![
                (ModelKey::XboxOne, 200.0),
                (ModelKey::XboxOneS, 200.0),
                (ModelKey::XboxOneX, 500.0),
                (ModelKey::XboxSeriesS, 500.0),
                (ModelKey::XboxSeriesX, 700.0),
                (ModelKey::Ps4, 200.0),
                (ModelKey::Ps4Slim, 250.0),
                (ModelKey::Ps4Pro, 500.0),
                (ModelKey::Ps5, 700.0),
                (ModelKey::Ps5Digital, 600.0),
                (ModelKey::Switch, 400.0),
                (ModelKey::NintendoSwitch, 400.0),
            ],
        }
    }
}

impl PriceLimits {
    pub fn ceiling(&self, model: ModelKey) -> Option<f64> {
        self.limits
            .iter()
            .find(|(key, _)| *key == model)
            .map(|(_, ceiling)| *ceiling)
    }

    /// 覆寫單一型號的上限，上限必須為正且有限
    pub fn set_ceiling(&mut self, model: ModelKey, ceiling: f64) {
        if !(ceiling.is_finite() && ceiling > 0.0) {
            tracing::warn!("⚠️ Ignoring invalid price ceiling {} for {}", ceiling, model);
            return;
        }
        if let Some(entry) = self.limits.iter_mut().find(|(key, _)| *key == model) {
            entry.1 = ceiling;
        } else {
            self.limits.push((model, ceiling));
        }
    }

    /// 判定選定價格是否超過型號上限。
    ///
    /// 等於上限者保留；EUR 價格無法與 RON 上限比較，視為「無法評估」，
    /// 一律不因價格排除。
    pub fn exceeds(&self, model: ModelKey, price: &SelectedPrice) -> bool {
        if !price.currency.is_ron() {
            return false;
        }
        match self.ceiling(model) {
            Some(ceiling) => price.value > ceiling,
            None => false,
        }
    }
}

/// 從廣告 URL 取出識別碼：結尾的 -ID<英數>.html，沒有時以整個 URL 充當
pub fn listing_id(link: &str) -> String {
    LISTING_ID
        .captures(link)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| link.to_string())
}

/// 手動維護的永久排除名單，比對優先於所有其他過濾。
///
/// 執行期間唯讀；檔案不存在或毀損時視為空名單，不中斷執行。
#[derive(Debug, Clone, Default)]
pub struct ExclusionRegistry {
    ids: HashSet<String>,
}

impl ExclusionRegistry {
    pub fn from_ids<I: IntoIterator<Item = String>>(ids: I) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    /// 載入 JSON 排除名單（以識別碼為鍵的物件）
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => {
                tracing::debug!("No exclusion file at {}, starting empty", path.display());
                return Self::default();
            }
        };

        match serde_json::from_str::<serde_json::Value>(&content) {
            Ok(serde_json::Value::Object(map)) => {
                let registry = Self {
                    ids: map.keys().cloned().collect(),
                };
                tracing::info!(
                    "📋 Loaded {} manually excluded listings from {}",
                    registry.ids.len(),
                    path.display()
                );
                registry
            }
            Ok(_) | Err(_) => {
                tracing::warn!(
                    "⚠️ Exclusion file {} is not a valid JSON object, treating as empty",
                    path.display()
                );
                Self::default()
            }
        }
    }

    pub fn contains_link(&self, link: &str) -> bool {
        self.ids.contains(&listing_id(link))
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
