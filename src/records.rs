use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

/// The three collection streams the council reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum WasteCategory {
    Rubbish,
    Recycling,
    Food,
}

impl WasteCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            WasteCategory::Rubbish => "Rubbish",
            WasteCategory::Recycling => "Recycling",
            WasteCategory::Food => "Food",
        }
    }
}

impl fmt::Display for WasteCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-category date strings. Only categories actually found on the page are
/// present; a missing key is not an error.
pub type CategoryRecord = HashMap<WasteCategory, String>;

/// Terminal failure codes. Once one of these is produced the rest of the
/// pipeline is skipped and the code is shown to the consumer as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCode {
    Browser,
    Unknown,
    #[serde(rename = "Invalid HTML")]
    InvalidHtml,
    #[serde(rename = "JSON Mapping")]
    JsonMapping,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Browser => "Browser",
            ErrorCode::Unknown => "Unknown",
            ErrorCode::InvalidHtml => "Invalid HTML",
            ErrorCode::JsonMapping => "JSON Mapping",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::error::Error for ErrorCode {}

/// What the pipeline hands to the display layer: either the per-category
/// dates or `{"Error": <code>}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CollectionResult {
    Dates(CategoryRecord),
    Error {
        #[serde(rename = "Error")]
        code: ErrorCode,
    },
}

impl CollectionResult {
    pub fn error(code: ErrorCode) -> Self {
        CollectionResult::Error { code }
    }
}

impl From<ErrorCode> for CollectionResult {
    fn from(code: ErrorCode) -> Self {
        CollectionResult::error(code)
    }
}
