pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::domain::ports::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_range,
    validate_url, Validate,
};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "olx-scout")]
#[command(about = "Scout OLX for defective game consoles worth buying")]
pub struct CliConfig {
    /// Optional cap on listings processed (for bounded test runs)
    #[arg(value_name = "MAX_LISTINGS")]
    pub max_listings: Option<usize>,

    #[arg(long, default_value = "xbox defect")]
    pub search_term: String,

    #[arg(long, default_value = "https://www.olx.ro")]
    pub base_url: String,

    #[arg(long, default_value = "5")]
    pub max_pages: usize,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    /// Delay between listing evaluations, in milliseconds
    #[arg(long, default_value = "500")]
    pub delay_ms: u64,

    #[arg(long, default_value = "excluded_listings.json")]
    pub exclusion_file: String,

    /// Optional TOML file overriding the filter rules
    #[arg(long)]
    pub config: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Enable system monitoring")]
    pub monitor: bool,
}

/// 以搜尋詞組出 OLX 搜尋 URL（空白轉連字號、轉小寫）
pub fn search_url_for(base_url: &str, term: &str) -> String {
    let encoded = term.trim().replace(' ', "-").to_lowercase();
    format!("{}/oferte/q-{}/", base_url.trim_end_matches('/'), encoded)
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn search_url(&self) -> String {
        search_url_for(&self.base_url, &self.search_term)
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn max_pages(&self) -> usize {
        self.max_pages
    }

    fn max_listings(&self) -> Option<usize> {
        self.max_listings
    }

    fn request_delay_ms(&self) -> u64 {
        self.delay_ms
    }

    fn exclusion_file(&self) -> &str {
        &self.exclusion_file
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_url("base_url", &self.base_url)?;
        validate_non_empty_string("search_term", &self.search_term)?;
        validate_path("output_path", &self.output_path)?;
        validate_positive_number("max_pages", self.max_pages, 1)?;
        if let Some(cap) = self.max_listings {
            validate_positive_number("max_listings", cap, 1)?;
        }
        validate_range("delay_ms", self.delay_ms, 0, 60_000)?;
        Ok(())
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    fn base_config() -> CliConfig {
        CliConfig {
            max_listings: None,
            search_term: "xbox defect".to_string(),
            base_url: "https://www.olx.ro".to_string(),
            max_pages: 5,
            output_path: "./output".to_string(),
            delay_ms: 500,
            exclusion_file: "excluded_listings.json".to_string(),
            config: None,
            verbose: false,
            monitor: false,
        }
    }

    #[test]
    fn test_search_url_construction() {
        assert_eq!(
            search_url_for("https://www.olx.ro", "xbox defect"),
            "https://www.olx.ro/oferte/q-xbox-defect/"
        );
        assert_eq!(
            search_url_for("https://www.olx.ro/", "PS5 Stricat"),
            "https://www.olx.ro/oferte/q-ps5-stricat/"
        );
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn test_zero_cap_is_rejected() {
        let mut config = base_config();
        config.max_listings = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_base_url_is_rejected() {
        let mut config = base_config();
        config.base_url = "ftp://olx.ro".to_string();
        assert!(config.validate().is_err());
    }
}
