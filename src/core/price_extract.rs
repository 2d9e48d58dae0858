use crate::core::normalizer;
use crate::domain::model::{Currency, PriceCandidate, PriceTier, SelectedPrice};
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;

// 價格 token + 幣別單位（lei / € / eur / ron），大小寫不敏感
static PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+(?:\.\d{3})*(?:,\d{2})?)\s*(lei|€|eur|ron)").unwrap());

// 疑似型號結尾的 token（例如 G29、…one、…x），全文掃描時丟棄。
// 已知的啟發式：對純數字 token 實際上不會觸發，為相容性原樣保留，
// 不要悄悄收緊。
static MODEL_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(g\d{2,}|xbox|one|s|x)$").unwrap());

static JSONLD_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"script[type="application/ld+json"]"#).unwrap());

// OLX 價格顯示元素，依可靠度排序，第一個能解出價格的勝出
static PRICE_ELEMENT_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    [
        r#"h3[data-testid="ad-price"]"#,
        r#"[data-cy="ad-price"]"#,
        ".css-1q7gvpp",
        ".css-1hgk2z",
        ".ad-price",
        ".price",
    ]
    .iter()
    .map(|s| Selector::parse(s).unwrap())
    .collect()
});

static DESCRIPTION_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    [
        r#"div[data-cy="ad-description"]"#,
        ".description",
        ".ad-description",
        r#"[data-testid="ad-description"]"#,
        ".css-1t8sg8s",
        ".clr-text-sm",
    ]
    .iter()
    .map(|s| Selector::parse(s).unwrap())
    .collect()
});

static DIV_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div").unwrap());

// 結構化資料與價格元素的合理價格範圍
const TRUSTED_RANGE: (f64, f64) = (10.0, 10_000.0);
// 全文掃描較嚴格，避免把容量、年份當成價格
const TEXT_SCAN_RANGE: (f64, f64) = (50.0, 5_000.0);

/// 從詳細頁擷取所有候選價格。
///
/// 三個層級依序嘗試，前一層有產出就不再往下：
/// 結構化資料 → 價格顯示元素 → 全文掃描。
/// 每層各自吞掉解析失敗，該層單純不產出候選。
pub fn extract_candidates(html: &str) -> Vec<PriceCandidate> {
    let document = Html::parse_document(html);

    let candidates = structured_candidates(&document);
    if !candidates.is_empty() {
        return candidates;
    }

    let candidates = element_candidates(&document);
    if !candidates.is_empty() {
        return candidates;
    }

    text_scan_candidates(&document)
}

/// 擷取加選擇一次完成
pub fn resolve_price(html: &str) -> Option<SelectedPrice> {
    select_price(extract_candidates(html))
}

// 第一層：embedded JSON-LD 的 offers.price / offers.priceCurrency
fn structured_candidates(document: &Html) -> Vec<PriceCandidate> {
    let mut candidates = Vec::new();

    for script in document.select(&JSONLD_SEL) {
        let text = script.inner_html();
        let data: serde_json::Value = match serde_json::from_str(text.trim()) {
            Ok(data) => data,
            Err(_) => continue,
        };

        let Some(offers) = data.get("offers") else {
            continue;
        };
        let Some(price_val) = offers.get("price") else {
            continue;
        };

        // price 可能是數字或數字字串
        let value = match price_val {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        let Some(value) = value else { continue };

        if !in_range(value, TRUSTED_RANGE) {
            continue;
        }

        let unit = offers
            .get("priceCurrency")
            .and_then(|c| c.as_str())
            .unwrap_or("lei")
            .to_lowercase();

        candidates.push(PriceCandidate {
            value,
            currency: Currency::from_unit(&unit),
            tier: PriceTier::Structured,
            source_text: format_price(value, &unit),
        });
    }

    candidates
}

// 第二層：專用價格元素，依序探測，第一個能解出範圍內價格的勝出
fn element_candidates(document: &Html) -> Vec<PriceCandidate> {
    for selector in PRICE_ELEMENT_SELECTORS.iter() {
        let Some(element) = document.select(selector).next() else {
            continue;
        };

        let text: String = element.text().collect::<Vec<_>>().join(" ");
        let Some(caps) = PRICE_RE.captures(&text) else {
            continue;
        };

        let token = &caps[1];
        let unit = &caps[2];
        let Some(value) = normalizer::parse_price_token(token) else {
            continue;
        };
        if !in_range(value, TRUSTED_RANGE) {
            continue;
        }

        return vec![PriceCandidate {
            value,
            currency: Currency::from_unit(unit),
            tier: PriceTier::Element,
            source_text: format!("{} {}", token, unit),
        }];
    }

    Vec::new()
}

// 第三層：全文掃描每個「token + 幣別單位」
fn text_scan_candidates(document: &Html) -> Vec<PriceCandidate> {
    let all_text: String = document.root_element().text().collect::<Vec<_>>().join(" ");
    let mut candidates = Vec::new();

    for caps in PRICE_RE.captures_iter(&all_text) {
        let token = &caps[1];
        let unit = &caps[2];

        // 型號誤判保護
        if MODEL_SUFFIX_RE.is_match(token) {
            continue;
        }

        let Some(value) = normalizer::parse_price_token(token) else {
            continue;
        };
        if !in_range(value, TEXT_SCAN_RANGE) {
            continue;
        }

        candidates.push(PriceCandidate {
            value,
            currency: Currency::from_unit(unit),
            tier: PriceTier::TextScan,
            source_text: format!("{} {}", token, unit),
        });
    }

    candidates
}

/// 依層級優先、再依信心分數選出一個價格。
///
/// 結構化 > 價格元素 > 全文掃描；全文掃描候選以典型二手主機價位
/// 給分（[200,1500] 3 分、[100,2500] 2 分、其餘 1 分），同分取較大值。
pub fn select_price(candidates: Vec<PriceCandidate>) -> Option<SelectedPrice> {
    if let Some(c) = candidates.iter().find(|c| c.tier == PriceTier::Structured) {
        return Some(to_selected(c));
    }
    if let Some(c) = candidates.iter().find(|c| c.tier == PriceTier::Element) {
        return Some(to_selected(c));
    }

    let mut scanned: Vec<&PriceCandidate> = candidates
        .iter()
        .filter(|c| c.tier == PriceTier::TextScan)
        .collect();
    if scanned.is_empty() {
        return None;
    }

    scanned.sort_by(|a, b| {
        confidence(b.value)
            .cmp(&confidence(a.value))
            .then(b.value.total_cmp(&a.value))
    });

    Some(to_selected(scanned[0]))
}

fn confidence(value: f64) -> u8 {
    if (200.0..=1500.0).contains(&value) {
        3
    } else if (100.0..=2500.0).contains(&value) {
        2
    } else {
        1
    }
}

fn to_selected(candidate: &PriceCandidate) -> SelectedPrice {
    SelectedPrice {
        value: candidate.value,
        currency: candidate.currency,
        display: candidate.source_text.clone(),
    }
}

fn in_range(value: f64, range: (f64, f64)) -> bool {
    value >= range.0 && value <= range.1
}

fn format_price(value: f64, unit: &str) -> String {
    if value.fract() == 0.0 {
        format!("{} {}", value as i64, unit)
    } else {
        format!("{} {}", value, unit)
    }
}

/// 從詳細頁取出描述文字。
///
/// 依序探測已知的描述區塊，第一個超過 20 字的勝出；都沒有時退回
/// 掃描內容量大的 div（跳過聯絡資訊區塊）。失敗時回傳空字串。
pub fn extract_description(html: &str) -> String {
    let document = Html::parse_document(html);

    for selector in DESCRIPTION_SELECTORS.iter() {
        if let Some(element) = document.select(selector).next() {
            let text: String = element.text().collect::<Vec<_>>().join(" ");
            let text = text.trim().to_string();
            if text.len() > 20 {
                return text;
            }
        }
    }

    // 退路：任何內容夠長、又不是聯絡區塊的 div
    for div in document.select(&DIV_SEL) {
        let text: String = div.text().collect::<Vec<_>>().join(" ");
        let text = text.trim();
        if text.len() > 100 {
            let lowered = text.to_lowercase();
            if !["telefon", "email", "contact"]
                .iter()
                .any(|skip| lowered.contains(skip))
            {
                return text.to_string();
            }
        }
    }

    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail_page(body: &str) -> String {
        format!("<html><head></head><body>{}</body></html>", body)
    }

    #[test]
    fn test_structured_tier_wins() {
        let html = detail_page(
            r#"
            <script type="application/ld+json">
                {"@type": "Product", "offers": {"price": 450, "priceCurrency": "RON"}}
            </script>
            <p>Pret vechi 999 lei</p>
            "#,
        );

        let candidates = extract_candidates(&html);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].tier, PriceTier::Structured);
        assert_eq!(candidates[0].value, 450.0);
        assert_eq!(candidates[0].currency, Currency::Ron);

        let selected = select_price(candidates).unwrap();
        assert_eq!(selected.value, 450.0);
    }

    #[test]
    fn test_structured_price_as_string_and_default_currency() {
        let html = detail_page(
            r#"<script type="application/ld+json">{"offers": {"price": "325.50"}}</script>"#,
        );

        let candidates = extract_candidates(&html);
        assert_eq!(candidates[0].value, 325.5);
        assert_eq!(candidates[0].currency, Currency::Lei);
    }

    #[test]
    fn test_structured_out_of_range_falls_through() {
        // 結構化價格超出 [10, 10000] 時往下層退
        let html = detail_page(
            r#"
            <script type="application/ld+json">{"offers": {"price": 99999}}</script>
            <h3 data-testid="ad-price">150 lei</h3>
            "#,
        );

        let candidates = extract_candidates(&html);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].tier, PriceTier::Element);
        assert_eq!(candidates[0].value, 150.0);
    }

    #[test]
    fn test_malformed_jsonld_is_ignored() {
        let html = detail_page(
            r#"
            <script type="application/ld+json">{not valid json</script>
            <h3 data-testid="ad-price">200 lei</h3>
            "#,
        );

        let candidates = extract_candidates(&html);
        assert_eq!(candidates[0].tier, PriceTier::Element);
    }

    #[test]
    fn test_element_tier_selector_order() {
        let html = detail_page(
            r#"
            <h3 data-testid="ad-price">250 lei</h3>
            <div class="price">999 lei</div>
            "#,
        );

        let candidates = extract_candidates(&html);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].value, 250.0);
        assert_eq!(candidates[0].source_text, "250 lei");
    }

    #[test]
    fn test_element_without_price_falls_to_next_selector() {
        let html = detail_page(
            r#"
            <h3 data-testid="ad-price">Negociabil</h3>
            <div class="ad-price">1.250 lei</div>
            "#,
        );

        let candidates = extract_candidates(&html);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].value, 1250.0);
    }

    #[test]
    fn test_text_scan_window_is_stricter() {
        let html = detail_page("<p>garantie 20 lei, consola 300 lei, factura 9.000 lei</p>");

        let candidates = extract_candidates(&html);
        // 20 與 9000 都在 [50, 5000] 之外
        let values: Vec<f64> = candidates.iter().map(|c| c.value).collect();
        assert_eq!(values, vec![300.0]);
    }

    #[test]
    fn test_text_scan_confidence_beats_value() {
        // 1200（3 分）勝過 1600（2 分），即使 1600 較大
        let html = detail_page("<p>vand la 1600 lei sau schimb, pretul meu 1200 lei</p>");

        let selected = resolve_price(&html).unwrap();
        assert_eq!(selected.value, 1200.0);
    }

    #[test]
    fn test_text_scan_equal_confidence_prefers_larger() {
        let html = detail_page("<p>700 lei sau 1200 lei cu tot cu jocuri</p>");

        let selected = resolve_price(&html).unwrap();
        assert_eq!(selected.value, 1200.0);
    }

    #[test]
    fn test_no_price_found() {
        let html = detail_page("<p>Schimb cu laptop, fara pret</p>");
        assert!(resolve_price(&html).is_none());
    }

    #[test]
    fn test_eur_currency_recognized() {
        let html = detail_page(r#"<h3 data-testid="ad-price">120 €</h3>"#);

        let selected = resolve_price(&html).unwrap();
        assert_eq!(selected.currency, Currency::Eur);
        assert_eq!(selected.value, 120.0);
    }

    #[test]
    fn test_description_from_dedicated_element() {
        let html = detail_page(
            r#"<div data-cy="ad-description">Consola are un defect la portul HDMI, altfel merge</div>"#,
        );

        let description = extract_description(&html);
        assert!(description.contains("defect la portul HDMI"));
    }

    #[test]
    fn test_description_short_text_is_skipped() {
        let html = detail_page(r#"<div data-cy="ad-description">scurt</div>"#);
        assert_eq!(extract_description(&html), "");
    }

    #[test]
    fn test_description_fallback_skips_contact_blocks() {
        let long_contact = "a".repeat(90) + " telefon 0722000000 " + &"b".repeat(30);
        let long_desc = "Vand consola xbox one s cu defect la cititorul de discuri, \
                         se vinde cum se vede in poze, fara intoarceri si fara accesorii"
            .to_string();
        let html = detail_page(&format!(
            "<div>{}</div><div>{}</div>",
            long_contact, long_desc
        ));

        let description = extract_description(&html);
        assert!(description.contains("cititorul de discuri"));
    }
}
