//! Rewrites canonical date tokens ("Tuesday, 6th JAN") as relative display
//! strings ("Today", "Tomorrow", "5 Days (Tue 6th)").
//!
//! This stage never fails outward: its result type has no error variant.
//! Error outcomes pass straight through, and any individual value that
//! doesn't parse is kept verbatim on the assumption it is already readable.

use chrono::{Datelike, Local, NaiveDate};
use regex::Regex;

use crate::records::{CategoryRecord, CollectionResult};
use crate::text_manipulators::title_case;

/// Tokens more than this many days in the past are taken to mean next year.
const YEAR_ROLLOVER_WINDOW_DAYS: i64 = 30;

pub fn beautify(result: CollectionResult) -> CollectionResult {
    beautify_on(result, Local::now().date_naive())
}

/// Same as [`beautify`], with the reference date supplied by the caller.
pub fn beautify_on(result: CollectionResult, today: NaiveDate) -> CollectionResult {
    match result {
        CollectionResult::Error { .. } => result,
        CollectionResult::Dates(record) => {
            let relative: CategoryRecord = record
                .into_iter()
                .map(|(category, value)| {
                    let display = relative_display(&value, today);
                    (category, display)
                })
                .collect();
            CollectionResult::Dates(relative)
        }
    }
}

fn relative_display(value: &str, today: NaiveDate) -> String {
    let text = value.trim();

    if text.eq_ignore_ascii_case("today") {
        return "Today".to_string();
    }

    let pattern = Regex::new(r"(\w+),\s+(\d{1,2})(st|nd|rd|th)\s+(\w+)").unwrap();
    let Some(caps) = pattern.captures(text) else {
        return value.to_string();
    };

    let weekday = &caps[1];
    let day = &caps[2];
    let suffix = &caps[3];
    let month = title_case(&caps[4]);

    let Some(mut target) = parse_day_month(day, &month, today.year()) else {
        return value.to_string();
    };

    // "6th JAN" seen in December is next January, not eleven months ago.
    if (target - today).num_days() < -YEAR_ROLLOVER_WINDOW_DAYS {
        match target.with_year(today.year() + 1) {
            Some(next_year) => target = next_year,
            None => return value.to_string(),
        }
    }

    let diff = (target - today).num_days();
    let weekday_short: String = weekday.chars().take(3).collect();

    match diff {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        _ => format!("{diff} Days ({weekday_short} {day}{suffix})"),
    }
}

// The month lands here as a 3-letter token ("JAN"), but accept full names
// too since they survive the extractor's passthrough path.
fn parse_day_month(day: &str, month: &str, year: i32) -> Option<NaiveDate> {
    let candidate = format!("{day} {month} {year}");
    ["%d %b %Y", "%d %B %Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&candidate, fmt).ok())
}
