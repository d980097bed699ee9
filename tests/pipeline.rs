//! Extractor → normalizer pipeline against realistic council markup.

use binwatch::{CollectionResult, ErrorCode, WasteCategory, beautify_on, extract_collection_dates};
use chrono::NaiveDate;
use serde_json::json;

fn council_block(marker: &str, stream: &str, date_text: &str) -> String {
    format!(
        r#"<div class="rubbish_date_wrap">
             <div class="rubbish_date_container">
               <div class="rubbish_date_container_left {marker}" style="">
                 Your next {stream} collection day is
                 <br>
                 <div class="rubbish_date_container_left_datetext">{date_text}</div>
               </div>
               <div class="rubbish_date_container_right">
                 Collection calendar <b>5</b>
                 <div class="rubbish_date_schedule_desc">Friday every 3 weeks</div>
               </div>
             </div>
           </div>"#
    )
}

fn run_pipeline(html: &str, today: NaiveDate) -> CollectionResult {
    let outcome = match extract_collection_dates(html) {
        Ok(record) => CollectionResult::Dates(record),
        Err(code) => CollectionResult::error(code),
    };
    beautify_on(outcome, today)
}

fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

#[test]
fn empty_fragment_reports_invalid_html() {
    let result = run_pipeline("<p>Sorry, something went wrong.</p>", day(2026, 3, 10));
    assert_eq!(result, CollectionResult::error(ErrorCode::InvalidHtml));
    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({"Error": "Invalid HTML"})
    );
}

#[test]
fn unrecognised_markers_report_json_mapping() {
    let html = council_block("rubbish_collection_difs_teal", "garden waste", "Friday 23 January");
    let result = run_pipeline(&html, day(2026, 3, 10));
    assert_eq!(result, CollectionResult::error(ErrorCode::JsonMapping));
    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({"Error": "JSON Mapping"})
    );
}

#[test]
fn collection_on_the_current_day_reads_today() {
    // 2026-03-10 is a Tuesday.
    let html = council_block("rubbish_collection_difs_black", "rubbish", "Tuesday 10 March");
    let result = run_pipeline(&html, day(2026, 3, 10));

    let CollectionResult::Dates(record) = result else {
        panic!("expected dates, got {result:?}");
    };
    assert_eq!(
        record.get(&WasteCategory::Rubbish).map(String::as_str),
        Some("Today")
    );
}

#[test]
fn collection_five_days_out_shows_offset_and_short_weekday() {
    // 2026-10-06 is the Tuesday five days after the 1st.
    let html = council_block(
        "rubbish_collection_difs_purple",
        "weekly food waste",
        "Tuesday 6 October",
    );
    let result = run_pipeline(&html, day(2026, 10, 1));

    let CollectionResult::Dates(record) = result else {
        panic!("expected dates, got {result:?}");
    };
    assert_eq!(
        record.get(&WasteCategory::Food).map(String::as_str),
        Some("5 Days (Tue 6th)")
    );
}

#[test]
fn full_results_panel_maps_all_three_streams() {
    let html = [
        council_block("rubbish_collection_difs_black", "rubbish", "Friday 23 January"),
        council_block("rubbish_collection_difs_green", "recycling", "Saturday 17 January"),
        council_block(
            "rubbish_collection_difs_purple",
            "weekly food waste",
            "Monday 12 January",
        ),
    ]
    .join("\n");

    // Mid-January: all three dates are near-future, no rollover in play.
    let result = run_pipeline(&html, day(2026, 1, 10));
    let CollectionResult::Dates(record) = result else {
        panic!("expected dates, got {result:?}");
    };
    assert_eq!(record.len(), 3);
    assert_eq!(
        record.get(&WasteCategory::Rubbish).map(String::as_str),
        Some("13 Days (Fri 23rd)")
    );
    assert_eq!(
        record.get(&WasteCategory::Recycling).map(String::as_str),
        Some("7 Days (Sat 17th)")
    );
    assert_eq!(
        record.get(&WasteCategory::Food).map(String::as_str),
        Some("2 Days (Mon 12th)")
    );
}

#[test]
fn december_run_rolls_january_dates_into_next_year() {
    let html = council_block("rubbish_collection_difs_green", "recycling", "Saturday 3 January");
    let result = run_pipeline(&html, day(2025, 12, 20));

    let CollectionResult::Dates(record) = result else {
        panic!("expected dates, got {result:?}");
    };
    assert_eq!(
        record.get(&WasteCategory::Recycling).map(String::as_str),
        Some("14 Days (Sat 3rd)")
    );
}
