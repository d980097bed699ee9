mod bin_day_scraper;
mod config;
mod extractor;
mod normalizer;
mod records;
mod text_manipulators;

pub use bin_day_scraper::{
    BinDayScraper, CollectionPage, StepFailure, StepTimeouts, run_lookup_steps,
};
pub use config::{LoadFromEnv, LookupConfig};
pub use extractor::extract_collection_dates;
pub use normalizer::{beautify, beautify_on};
pub use records::{CategoryRecord, CollectionResult, ErrorCode, WasteCategory};
