use crate::domain::model::Currency;
use regex::Regex;
use std::sync::LazyLock;

// 羅馬尼亞格式：千位以 . 分組，小數以 , 加兩位（例如 1.234,56）
static PRICE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\d{1,3}(?:\.\d{3})+|\d+)(?:,\d{2})?$").unwrap());

/// 將一個價格 token 正規化成數值。
///
/// token 必須符合「數字、可選的三位一組 `.` 分隔、可選的 `,` 加兩位小數」，
/// 不符合時靜默回傳 `None`，呼叫端一律視為「沒有候選價格」。
pub fn parse_price_token(token: &str) -> Option<f64> {
    let token = token.trim();
    if !PRICE_TOKEN.is_match(token) {
        return None;
    }

    let normalized = token.replace('.', "").replace(',', ".");
    normalized.parse::<f64>().ok()
}

/// 寬鬆解析列表頁顯示的價格字串（例如 "1.250 lei"、"150 €"）。
///
/// 去掉幣別單位後套用同一套正規化規則；同時回報辨識到的幣別，
/// 沒有明示單位時預設為 lei。
pub fn parse_price_display(display: &str) -> Option<(f64, Currency)> {
    let lowered = display.trim().to_lowercase();
    if lowered.is_empty() || lowered == "n/a" {
        return None;
    }

    let mut currency = Currency::Lei;
    for unit in ["lei", "ron", "eur", "€"] {
        if lowered.contains(unit) {
            currency = Currency::from_unit(unit);
            break;
        }
    }

    let stripped = lowered
        .replace("lei", "")
        .replace("ron", "")
        .replace('€', "")
        .replace("eur", "");

    parse_price_token(stripped.trim()).map(|value| (value, currency))
}
