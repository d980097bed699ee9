//! Turns the council results fragment into per-category date tokens.
//!
//! The markup contract, as served today (owned by the council, brittle by
//! nature — any redesign lands here first):
//!
//! ```text
//! <div class="rubbish_date_wrap">
//!   <div class="rubbish_date_container">
//!     <div class="rubbish_date_container_left rubbish_collection_difs_black">
//!       Your next rubbish collection day is
//!       <div class="rubbish_date_container_left_datetext">Friday 23 January</div>
//!     </div>
//!     ...
//!   </div>
//! </div>
//! ```
//!
//! One `rubbish_date_wrap` per stream; the `rubbish_collection_difs_*` class
//! on the header names the stream (black = rubbish, green = recycling,
//! purple = food waste).

use log::{debug, warn};
use scraper::{Html, Selector};

use crate::records::{CategoryRecord, ErrorCode, WasteCategory};
use crate::text_manipulators::{extract_text, format_collection_date};

pub const COLLECTION_BLOCK_SELECTOR: &str = "div.rubbish_date_wrap";
const CATEGORY_HEADER_SELECTOR: &str = r#"[class*="rubbish_collection_difs_"]"#;
const DATE_TEXT_SELECTOR: &str = ".rubbish_date_container_left_datetext";

const CATEGORY_MARKERS: [(&str, WasteCategory); 3] = [
    ("rubbish_collection_difs_black", WasteCategory::Rubbish),
    ("rubbish_collection_difs_green", WasteCategory::Recycling),
    ("rubbish_collection_difs_purple", WasteCategory::Food),
];

/// Extracts the collection dates from the scraped fragment.
///
/// Blocks with an unrecognised stream marker are skipped; a category missing
/// from the page is simply absent from the record. Failure is reserved for
/// the two shapes of total breakage: no blocks at all (`Invalid HTML`), or
/// blocks whose markers all changed under us (`JSON Mapping`).
pub fn extract_collection_dates(html: &str) -> Result<CategoryRecord, ErrorCode> {
    let document = Html::parse_fragment(html);

    let block_selector = Selector::parse(COLLECTION_BLOCK_SELECTOR).unwrap();
    let header_selector = Selector::parse(CATEGORY_HEADER_SELECTOR).unwrap();
    let date_selector = Selector::parse(DATE_TEXT_SELECTOR).unwrap();

    let blocks: Vec<_> = document.select(&block_selector).collect();
    if blocks.is_empty() {
        warn!("no collection blocks matched '{COLLECTION_BLOCK_SELECTOR}'");
        dump_fragment(html);
        return Err(ErrorCode::InvalidHtml);
    }

    let mut record = CategoryRecord::new();
    for block in &blocks {
        let Some(header) = block.select(&header_selector).next() else {
            continue;
        };
        let Some(date_el) = block.select(&date_selector).next() else {
            continue;
        };

        let category = header.value().classes().find_map(|class| {
            CATEGORY_MARKERS
                .iter()
                .find(|(marker, _)| *marker == class)
                .map(|(_, category)| *category)
        });

        if let Some(category) = category {
            let raw_date = extract_text(date_el).trim().to_string();
            record.insert(category, format_collection_date(&raw_date));
        }
    }

    if record.is_empty() {
        warn!("found {} collection blocks, but no stream marker matched", blocks.len());
        dump_fragment(html);
        return Err(ErrorCode::JsonMapping);
    }

    Ok(record)
}

// Bounded dump of the offending markup, for post-mortems when the council
// redesigns the page.
fn dump_fragment(html: &str) {
    let prefix: String = html.chars().take(5000).collect();
    debug!("--- HTML START ---\n{prefix}\n--- HTML END ---");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(marker: &str, date_text: &str) -> String {
        format!(
            r#"<div class="rubbish_date_wrap">
                 <div class="rubbish_date_container">
                   <div class="rubbish_date_container_left {marker}">
                     Your next collection day is
                     <br>
                     <div class="rubbish_date_container_left_datetext">{date_text}</div>
                   </div>
                 </div>
               </div>"#
        )
    }

    #[test]
    fn recycling_block_maps_to_canonical_token() {
        let html = block("rubbish_collection_difs_green", "Saturday 17 January");
        let record = extract_collection_dates(&html).unwrap();
        assert_eq!(record.len(), 1);
        assert_eq!(
            record.get(&WasteCategory::Recycling).map(String::as_str),
            Some("Saturday, 17th JAN")
        );
    }

    #[test]
    fn all_three_streams_are_extracted() {
        let html = [
            block("rubbish_collection_difs_black", "Friday 23 January"),
            block("rubbish_collection_difs_green", "Saturday 17 January"),
            block("rubbish_collection_difs_purple", "Monday 12 January"),
        ]
        .join("\n");

        let record = extract_collection_dates(&html).unwrap();
        assert_eq!(record.len(), 3);
        assert_eq!(
            record.get(&WasteCategory::Rubbish).map(String::as_str),
            Some("Friday, 23rd JAN")
        );
        assert_eq!(
            record.get(&WasteCategory::Food).map(String::as_str),
            Some("Monday, 12th JAN")
        );
    }

    #[test]
    fn no_blocks_is_invalid_html() {
        assert_eq!(
            extract_collection_dates("<div>maintenance page</div>"),
            Err(ErrorCode::InvalidHtml)
        );
        assert_eq!(extract_collection_dates(""), Err(ErrorCode::InvalidHtml));
    }

    #[test]
    fn blocks_without_known_markers_are_json_mapping() {
        let html = block("rubbish_collection_difs_orange", "Friday 23 January");
        assert_eq!(
            extract_collection_dates(&html),
            Err(ErrorCode::JsonMapping)
        );
    }

    #[test]
    fn unknown_markers_are_skipped_when_others_match() {
        let html = [
            block("rubbish_collection_difs_orange", "Friday 23 January"),
            block("rubbish_collection_difs_black", "Friday 23 January"),
        ]
        .join("\n");

        let record = extract_collection_dates(&html).unwrap();
        assert_eq!(record.len(), 1);
        assert!(record.contains_key(&WasteCategory::Rubbish));
    }

    #[test]
    fn unparseable_date_text_passes_through_verbatim() {
        let html = block("rubbish_collection_difs_purple", "Today");
        let record = extract_collection_dates(&html).unwrap();
        assert_eq!(
            record.get(&WasteCategory::Food).map(String::as_str),
            Some("Today")
        );
    }

    #[test]
    fn block_missing_its_date_element_is_skipped() {
        let html = r#"<div class="rubbish_date_wrap">
              <div class="rubbish_date_container_left rubbish_collection_difs_black">
                Your next rubbish collection day is
              </div>
            </div>"#;
        // The only block has no datetext child, so nothing maps.
        assert_eq!(extract_collection_dates(html), Err(ErrorCode::JsonMapping));
    }
}
