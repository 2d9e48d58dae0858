use olx_scout::core::normalizer::{parse_price_display, parse_price_token};
use olx_scout::core::price_extract::{extract_candidates, resolve_price, select_price};
use olx_scout::domain::model::{Currency, PriceTier};

// 取價三層的優先序與信心分數，對照實際 OLX 頁面的縮減版

const PAGE_WITH_EVERYTHING: &str = r#"
<html>
<head>
    <script type="application/ld+json">
        {"@type": "Product", "name": "Xbox One S", "offers": {"price": 420, "priceCurrency": "RON"}}
    </script>
</head>
<body>
    <h3 data-testid="ad-price">450 lei</h3>
    <div class="descriere">Accept schimb cu PS4, pretul este 500 lei negociabil</div>
</body>
</html>
"#;

#[test]
fn test_structured_data_beats_every_other_tier() {
    let candidates = extract_candidates(PAGE_WITH_EVERYTHING);
    assert!(candidates.iter().all(|c| c.tier == PriceTier::Structured));

    let selected = select_price(candidates).unwrap();
    assert_eq!(selected.value, 420.0);
    assert_eq!(selected.currency, Currency::Ron);
}

#[test]
fn test_element_tier_when_no_structured_data() {
    let html = r#"
        <html><body>
            <h3 data-testid="ad-price">450 lei</h3>
            <p>alt pret in text 900 lei</p>
        </body></html>
    "#;

    let selected = resolve_price(html).unwrap();
    assert_eq!(selected.value, 450.0);
    assert_eq!(selected.display, "450 lei");
}

#[test]
fn test_text_scan_confidence_scoring() {
    // 1200 在 [200, 1500]（3 分），1600 只有 2 分，信心分數先於數值
    let html = "<html><body><p>cer 1600 lei dar las la 1200 lei</p></body></html>";
    assert_eq!(resolve_price(html).unwrap().value, 1200.0);

    // 同分時取較大值
    let html = "<html><body><p>vand intre 700 lei si 1200 lei</p></body></html>";
    assert_eq!(resolve_price(html).unwrap().value, 1200.0);
}

#[test]
fn test_no_candidates_means_no_price() {
    let html = "<html><body><p>Schimb cu trotineta electrica</p></body></html>";
    assert!(resolve_price(html).is_none());
}

#[test]
fn test_romanian_grouped_format_normalization() {
    assert_eq!(parse_price_token("1.234,56"), Some(1234.56));
    assert_eq!(parse_price_token("2.500"), Some(2500.0));
    assert_eq!(parse_price_token("noua"), None);

    assert_eq!(
        parse_price_display("1.234,56 lei"),
        Some((1234.56, Currency::Lei))
    );
}

#[test]
fn test_grouped_price_in_element() {
    let html = r#"<html><body><div class="price">1.250 lei</div></body></html>"#;

    let candidates = extract_candidates(html);
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].value, 1250.0);
    assert_eq!(candidates[0].tier, PriceTier::Element);
    assert_eq!(candidates[0].source_text, "1.250 lei");
}
