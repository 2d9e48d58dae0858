use clap::Parser;
use olx_scout::config::toml_config::ScoutConfig;
use olx_scout::core::filters::ExclusionRegistry;
use olx_scout::utils::{logger, validation::Validate};
use olx_scout::{CliConfig, FilterRules, HttpFetcher, LocalStorage, ScoutEngine, ScoutPipeline};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("🔍 Starting OLX defect scout");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證 CLI 參數
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    // 載入並驗證可選的 TOML 規則檔
    let scout_config = match &config.config {
        Some(path) => {
            tracing::info!("📁 Loading filter rules from: {}", path);
            match ScoutConfig::from_file(path) {
                Ok(scout_config) => {
                    if let Err(e) = scout_config.validate() {
                        tracing::error!("❌ Configuration validation failed: {}", e);
                        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
                        eprintln!("❌ {}", e.user_friendly_message());
                        std::process::exit(1);
                    }
                    Some(scout_config)
                }
                Err(e) => {
                    eprintln!("❌ Failed to load config file '{}': {}", path, e);
                    eprintln!("💡 Make sure the file exists and is valid TOML format");
                    std::process::exit(1);
                }
            }
        }
        None => None,
    };

    // 規則檔可覆寫請求間隔與重試次數
    if let Some(delay) = scout_config.as_ref().and_then(|c| c.delay_ms()) {
        config.delay_ms = delay;
    }
    let retry_attempts = scout_config
        .as_ref()
        .and_then(|c| c.retry_attempts())
        .unwrap_or(3);

    let exclusion_path = scout_config
        .as_ref()
        .and_then(|c| c.exclusion_file())
        .unwrap_or(&config.exclusion_file)
        .to_string();
    let registry = ExclusionRegistry::load_from_file(&exclusion_path);

    let rules = match &scout_config {
        Some(scout_config) => scout_config.filter_rules(registry),
        None => FilterRules {
            registry,
            ..FilterRules::default()
        },
    };

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    // 創建存儲、抓取器與管道
    let storage = LocalStorage::new(config.output_path.clone());
    let fetcher = HttpFetcher::with_retries(retry_attempts)?;
    let pipeline = ScoutPipeline::new(storage, fetcher, config, rules);

    // 創建引擎並運行
    let engine = ScoutEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Scout run completed successfully!");
            tracing::info!("📁 Output saved to: {}", output_path);
            println!("✅ Scout run completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            // 記錄詳細錯誤信息
            tracing::error!(
                "❌ Scout run failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            // 輸出用戶友好的錯誤信息
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                olx_scout::utils::error::ErrorSeverity::Low => 0,
                olx_scout::utils::error::ErrorSeverity::Medium => 2,
                olx_scout::utils::error::ErrorSeverity::High => 1,
                olx_scout::utils::error::ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
