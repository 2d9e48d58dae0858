pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;
pub use crate::config::cli::LocalStorage;

pub use crate::core::engine::ScoutEngine;
pub use crate::core::fetch::HttpFetcher;
pub use crate::core::orchestrator::{FilterRules, ListingFilter};
pub use crate::core::pipeline::ScoutPipeline;
pub use crate::domain::model::Listing;
pub use crate::utils::error::{Result, ScoutError};
