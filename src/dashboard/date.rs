use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};

/// Shown whenever a date is missing or cannot be read.
pub const UNAVAILABLE: &str = "N/A";

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedDate {
    Valid(NaiveDateTime),
    Invalid,
}

/// Never fails: input that is not a recognisable date is `Invalid`.
///
/// Offset-bearing timestamps are shown in local time. Naive values (what the
/// server sends for its `LocalDateTime` fields) and plain dates are shown
/// as-is.
pub fn parse_date(raw: Option<&str>) -> ParsedDate {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return ParsedDate::Invalid;
    };

    // RFC 3339 requires seconds; `%#z` also takes `Z` and short offsets.
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M%#z"))
    {
        return ParsedDate::Valid(dt.with_timezone(&Local).naive_local());
    }

    if let Some(dt) = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    {
        return ParsedDate::Valid(dt);
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map_or(ParsedDate::Invalid, ParsedDate::Valid)
}

/// `Mar 1, 2024`, or `Mar 1, 2024, 10:05 AM` with `include_time`.
pub fn format_date(raw: Option<&str>, include_time: bool) -> String {
    match parse_date(raw) {
        ParsedDate::Invalid => UNAVAILABLE.to_string(),
        ParsedDate::Valid(dt) if include_time => dt.format("%b %-d, %Y, %I:%M %p").to_string(),
        ParsedDate::Valid(dt) => dt.format("%b %-d, %Y").to_string(),
    }
}
