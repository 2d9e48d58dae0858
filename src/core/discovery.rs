use crate::domain::model::Listing;
use crate::domain::ports::PageFetcher;
use crate::utils::error::Result;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use std::time::Duration;
use url::Url;

// 搜尋結果頁的卡片選擇器，版型改版時由前往後嘗試，第一個有結果的勝出
static CARD_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    [
        "table#offers_table tbody tr",
        r#"div[data-cy="l-card"]"#,
        ".offer-wrapper",
        ".listing-item",
        "div.offer",
        r#"article[data-cy="ad-card"]"#,
        ".css-1sw7q4x",
    ]
    .iter()
    .map(|s| Selector::parse(s).unwrap())
    .collect()
});

static ANCHOR_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());
static HEADING_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h3, h4, h5, h6").unwrap());
static TEXTY_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("span, div, p").unwrap());

static NEXT_PAGE_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    [
        r#"a[data-cy="pagination-forward"]"#,
        ".pagination a.next",
        "a.next",
        r#"a[rel="next"]"#,
        r#"link[rel="next"]"#,
    ]
    .iter()
    .map(|s| Selector::parse(s).unwrap())
    .collect()
});

static PRICE_CLASS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)price|pret").unwrap());
static LOCATION_CLASS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)location|locatie|city|oras").unwrap());
static DATE_CLASS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)date|data|time|timp").unwrap());

static PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+(?:\.\d{3})*(?:,\d{2})?)\s*(lei|€|eur|ron)").unwrap());
static OFFER_LINK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/oferta/|/d/oferta/").unwrap());
static PAGE_PARAM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"page=(\d+)").unwrap());

// 換頁之間的固定延遲
const PAGE_DELAY: Duration = Duration::from_secs(1);

/// 依搜尋 URL 逐頁收集廣告，直到沒有下一頁、空頁或達到頁數上限。
///
/// 頁面抓取失敗不會中斷整個收集，只是停在已收集到的部分。
pub async fn scrape_search<F: PageFetcher>(
    fetcher: &F,
    search_url: &str,
    max_pages: usize,
) -> Result<Vec<Listing>> {
    let mut all_listings = Vec::new();
    let mut current_url = search_url.to_string();
    let mut page_count = 0;

    while page_count < max_pages {
        page_count += 1;
        tracing::info!("🔍 Scraping page {}: {}", page_count, current_url);

        let html = match fetcher.fetch(&current_url).await {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!("⚠️ Error scraping page {}: {}", page_count, e);
                break;
            }
        };

        let listings = parse_listings(&html, &current_url);
        if listings.is_empty() {
            tracing::info!("No listings found on page {}, stopping", page_count);
            break;
        }

        tracing::info!(
            "Found {} listings on page {} (total: {})",
            listings.len(),
            page_count,
            all_listings.len() + listings.len()
        );
        all_listings.extend(listings);

        match next_page_url(&html, &current_url) {
            Some(next_url) if next_url != current_url => {
                current_url = next_url;
                tokio::time::sleep(PAGE_DELAY).await;
            }
            _ => {
                tracing::info!("No more pages found");
                break;
            }
        }
    }

    Ok(all_listings)
}

/// 從一頁搜尋結果取出全部廣告卡片
pub fn parse_listings(html: &str, base_url: &str) -> Vec<Listing> {
    let document = Html::parse_document(html);
    let mut listings = Vec::new();

    for selector in CARD_SELECTORS.iter() {
        let cards: Vec<ElementRef> = document.select(selector).collect();
        if cards.is_empty() {
            continue;
        }

        tracing::debug!("Found {} listing cards", cards.len());
        for card in cards {
            if let Some(listing) = parse_card(card, base_url) {
                listings.push(listing);
            }
        }
        return listings;
    }

    // 沒有任何卡片選擇器命中時，退回掃描廣告連結
    tracing::debug!("No card selector matched, scanning offer links");
    for anchor in document.select(&ANCHOR_SEL) {
        let href = anchor.value().attr("href").unwrap_or_default();
        if !OFFER_LINK_RE.is_match(href) {
            continue;
        }

        let title = anchor
            .value()
            .attr("title")
            .map(|t| t.to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| element_text(anchor));

        if title.len() > 10 {
            listings.push(Listing {
                title,
                link: absolutize(base_url, href),
                price: None,
                location: None,
                date: None,
            });
        }
    }

    listings
}

// 單張卡片：連結、標題、價格、地點、日期
fn parse_card(card: ElementRef<'_>, base_url: &str) -> Option<Listing> {
    let anchor = card.select(&ANCHOR_SEL).next()?;
    let href = anchor.value().attr("href")?;
    let link = absolutize(base_url, href);

    let mut title = anchor
        .value()
        .attr("title")
        .map(|t| t.to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| element_text(anchor));
    if title.is_empty() {
        title = card
            .select(&HEADING_SEL)
            .next()
            .map(element_text)
            .unwrap_or_else(|| "No title".to_string());
    }

    let price = find_by_class(card, &PRICE_CLASS_RE)
        .map(element_text)
        .or_else(|| highest_price_in_text(&element_text(card)));

    let location = find_by_class(card, &LOCATION_CLASS_RE).map(element_text);
    let date = find_by_class(card, &DATE_CLASS_RE).map(element_text);

    Some(Listing {
        title,
        link,
        price,
        location,
        date,
    })
}

// 卡片沒有專用價格元素時，取文字中數值最高的價格字串
fn highest_price_in_text(text: &str) -> Option<String> {
    let mut prices: Vec<(f64, String)> = PRICE_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let token = &caps[1];
            let unit = &caps[2];
            crate::core::normalizer::parse_price_token(token)
                .map(|value| (value, format!("{} {}", token, unit)))
        })
        .collect();

    prices.sort_by(|a, b| b.0.total_cmp(&a.0));
    prices.into_iter().next().map(|(_, display)| display)
}

/// 找下一頁的 URL：先試分頁連結，再退回 page= 參數遞增
pub fn next_page_url(html: &str, current_url: &str) -> Option<String> {
    let document = Html::parse_document(html);

    for selector in NEXT_PAGE_SELECTORS.iter() {
        if let Some(link) = document.select(selector).next() {
            if let Some(href) = link.value().attr("href") {
                return Some(absolutize(current_url, href));
            }
        }
    }

    let query = Url::parse(current_url).ok()?.query().map(|q| q.to_string());

    if let Some(query) = &query {
        if let Some(caps) = PAGE_PARAM_RE.captures(query) {
            let current_page: usize = caps[1].parse().ok()?;
            return Some(current_url.replace(
                &format!("page={}", current_page),
                &format!("page={}", current_page + 1),
            ));
        }
    }

    let separator = if query.is_some() { '&' } else { '?' };
    Some(format!("{}{}page=2", current_url, separator))
}

fn absolutize(base_url: &str, href: &str) -> String {
    if href.starts_with("http") {
        return href.to_string();
    }
    Url::parse(base_url)
        .and_then(|base| base.join(href))
        .map(|url| url.to_string())
        .unwrap_or_else(|_| href.to_string())
}

fn find_by_class<'a>(scope: ElementRef<'a>, class_re: &Regex) -> Option<ElementRef<'a>> {
    scope.select(&TEXTY_SEL).find(|el| {
        el.value()
            .attr("class")
            .map(|classes| class_re.is_match(classes))
            .unwrap_or(false)
    })
}

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH_PAGE: &str = r#"
        <html><body>
            <div data-cy="l-card">
                <a href="/d/oferta/xbox-one-s-defect-IDabc123.html" title="Xbox One S 500GB defect"></a>
                <p class="ad-price">150 lei</p>
                <span class="location-name">Bucuresti</span>
                <span class="date-posted">Azi 12:30</span>
            </div>
            <div data-cy="l-card">
                <a href="https://www.olx.ro/d/oferta/ps4-pro-IDzzz.html">PS4 Pro stricat</a>
                <p>garantie 50 lei, vand cu 450 lei</p>
            </div>
        </body></html>
    "#;

    #[test]
    fn test_parse_listing_cards() {
        let listings = parse_listings(SEARCH_PAGE, "https://www.olx.ro/oferte/q-xbox-defect/");

        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].title, "Xbox One S 500GB defect");
        assert_eq!(
            listings[0].link,
            "https://www.olx.ro/d/oferta/xbox-one-s-defect-IDabc123.html"
        );
        assert_eq!(listings[0].price.as_deref(), Some("150 lei"));
        assert_eq!(listings[0].location.as_deref(), Some("Bucuresti"));
        assert_eq!(listings[0].date.as_deref(), Some("Azi 12:30"));
    }

    #[test]
    fn test_price_fallback_picks_highest_value() {
        let listings = parse_listings(SEARCH_PAGE, "https://www.olx.ro/oferte/q-xbox-defect/");
        // 第二張卡片沒有價格元素，從文字挑最高的
        assert_eq!(listings[1].price.as_deref(), Some("450 lei"));
    }

    #[test]
    fn test_offer_link_fallback() {
        let html = r#"
            <html><body>
                <a href="/d/oferta/consola-xbox-one-defecta-IDqqq.html">Consola Xbox One defecta</a>
                <a href="/cont/setari">Setari</a>
            </body></html>
        "#;

        let listings = parse_listings(html, "https://www.olx.ro/oferte/");
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].title, "Consola Xbox One defecta");
        assert!(listings[0].price.is_none());
    }

    #[test]
    fn test_short_titles_are_skipped_in_fallback() {
        let html = r#"<a href="/d/oferta/x-IDq.html">scurt</a>"#;
        let listings = parse_listings(html, "https://www.olx.ro/oferte/");
        assert!(listings.is_empty());
    }

    #[test]
    fn test_next_page_from_pagination_link() {
        let html = r#"<a data-cy="pagination-forward" href="/oferte/q-xbox-defect/?page=2">next</a>"#;
        let next = next_page_url(html, "https://www.olx.ro/oferte/q-xbox-defect/");
        assert_eq!(
            next.as_deref(),
            Some("https://www.olx.ro/oferte/q-xbox-defect/?page=2")
        );
    }

    #[test]
    fn test_next_page_increments_page_param() {
        let next = next_page_url("<html></html>", "https://www.olx.ro/oferte/?page=3");
        assert_eq!(next.as_deref(), Some("https://www.olx.ro/oferte/?page=4"));
    }

    #[test]
    fn test_next_page_appends_page_param() {
        let next = next_page_url("<html></html>", "https://www.olx.ro/oferte/q-xbox/");
        assert_eq!(next.as_deref(), Some("https://www.olx.ro/oferte/q-xbox/?page=2"));
    }
}
