use anyhow::Context;
use clap::Parser;
use olx_scout::config::search_url_for;
use olx_scout::core::{discovery, pipeline};
use olx_scout::domain::ports::Storage;
use olx_scout::utils::logger;
use olx_scout::{HttpFetcher, LocalStorage};

/// 只跑探索階段：收集搜尋結果並原樣落地，不做任何過濾
#[derive(Parser)]
#[command(name = "discover")]
#[command(about = "Scrape OLX search results without filtering")]
struct Args {
    /// Search term, e.g. "xbox defect"
    search_term: String,

    #[arg(long, default_value = "5")]
    max_pages: usize,

    #[arg(long, default_value = "https://www.olx.ro")]
    base_url: String,

    #[arg(long, default_value = "./output")]
    output_path: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    logger::init_cli_logger(args.verbose);

    let search_url = search_url_for(&args.base_url, &args.search_term);
    tracing::info!("🔍 Searching for: '{}'", args.search_term);
    tracing::info!("📡 URL: {}", search_url);
    tracing::info!("📄 Max pages: {}", args.max_pages);

    let fetcher = HttpFetcher::new().context("building HTTP client")?;
    let listings = discovery::scrape_search(&fetcher, &search_url, args.max_pages)
        .await
        .context("scraping search results")?;

    if listings.is_empty() {
        println!("❌ No listings found or scraping failed");
        return Ok(());
    }

    println!("✅ Successfully scraped {} listings!", listings.len());

    // 依搜尋詞產生檔名，空白與連字號轉底線
    let safe_name = args
        .search_term
        .to_lowercase()
        .replace([' ', '-'], "_");
    let csv_file = format!("olx_{}.csv", safe_name);
    let json_file = format!("olx_{}.json", safe_name);

    let storage = LocalStorage::new(&args.output_path);
    let csv_bytes = pipeline::listings_to_csv(&listings)?;
    storage.write_file(&csv_file, &csv_bytes).await?;
    storage
        .write_file(&json_file, &serde_json::to_vec_pretty(&listings)?)
        .await?;

    println!("📄 Saved to: {} and {}", csv_file, json_file);

    println!();
    println!("📋 Sample results:");
    for (i, listing) in listings.iter().take(5).enumerate() {
        let title: String = listing.title.chars().take(50).collect();
        println!(
            "{}. {}... - {}",
            i + 1,
            title,
            listing.price.as_deref().unwrap_or("N/A")
        );
    }

    Ok(())
}
