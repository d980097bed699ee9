use regex::Regex;
use scraper::ElementRef;

pub fn extract_text(node: ElementRef) -> String {
    node.text().collect::<String>()
}

/// st/nd/rd/th, with the 11th-13th exception.
pub fn ordinal_suffix(day: u32) -> &'static str {
    if (11..=13).contains(&day) {
        return "th";
    }
    match day % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

pub fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

/// Rewrites the council's raw date phrase, e.g. "Tuesday 6 January", into the
/// canonical token "Tuesday, 6th JAN". Phrases that don't match the expected
/// shape are returned unchanged rather than treated as an error.
pub fn format_collection_date(raw: &str) -> String {
    let pattern = Regex::new(
        r"^(Monday|Tuesday|Wednesday|Thursday|Friday|Saturday|Sunday)\s+(\d{1,2})\s+(\w+)$",
    )
    .unwrap();

    let Some(caps) = pattern.captures(raw) else {
        return raw.to_string();
    };

    let weekday = &caps[1];
    let day: u32 = caps[2].parse().unwrap();
    let month_short: String = caps[3].chars().take(3).collect();

    format!(
        "{weekday}, {day}{} {}",
        ordinal_suffix(day),
        month_short.to_uppercase()
    )
}
