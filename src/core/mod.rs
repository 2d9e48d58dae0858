pub mod discovery;
pub mod engine;
pub mod fetch;
pub mod filters;
pub mod model_id;
pub mod normalizer;
pub mod orchestrator;
pub mod pipeline;
pub mod price_extract;

pub use crate::domain::model::{Evaluation, FilterOutcome, Listing, Verdict};
pub use crate::domain::ports::{ConfigProvider, PageFetcher, Pipeline, Storage};
pub use crate::utils::error::Result;
