use binwatch::{BinDayScraper, CollectionResult, LookupConfig, beautify, extract_collection_dates};
use dotenv::dotenv;

extern crate env_logger;
extern crate log;

use log::LevelFilter;

use log::{error, info};

async fn run_collection_lookup_job(config: &LookupConfig) -> CollectionResult {
    let scraper = BinDayScraper::new(
        config.lookup_url.clone(),
        config.postcode.clone(),
        config.address_value.clone(),
    );

    info!("[1/3] scraping {}", config.lookup_url);
    let html = match scraper.scrape().await {
        Ok(html) => html,
        Err(code) => return CollectionResult::error(code),
    };

    info!("[2/3] extracting collection dates");
    let record = match extract_collection_dates(&html) {
        Ok(record) => record,
        Err(code) => return CollectionResult::error(code),
    };

    info!("[3/3] normalising dates");
    beautify(CollectionResult::Dates(record))
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let config = match LookupConfig::new() {
        Ok(config) => config,
        Err(e) => {
            error!("could not load lookup config: {e:#}");
            std::process::exit(1);
        }
    };

    let result = run_collection_lookup_job(&config).await;

    // The display layer picks this up from stdout.
    match serde_json::to_string_pretty(&result) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            error!("could not serialise result: {e}");
            std::process::exit(1);
        }
    }
}
