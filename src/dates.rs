//! Date normalization between human-entered text and the canonical
//! `YYYY-MM-DD` storage form.
//!
//! Nothing here errors or panics: the worst case for storage is a
//! pass-through of the unmodified input, and the worst case for list
//! display is an empty string. All other date formats are display-only
//! and must come through [`to_canonical`] before persistence.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};

/// Canonical storage format, free of time-zone information.
const CANONICAL_FORMAT: &str = "%Y-%m-%d";

/// Display convention. Day-first, matching the tie-break in
/// [`resolve_parts`], so display -> canonical -> display is stable.
const DISPLAY_FORMAT: &str = "%d/%m/%Y";

/// Unambiguous textual formats the flexible parser accepts, tried in
/// order. Slash/dot/dash numeric forms are deliberately absent: those
/// go through the magnitude rule instead.
const INPUT_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%B %d, %Y", "%b %d, %Y", "%d %B %Y"];

/// Convert free-form date text to the canonical storage form.
///
/// Falls through: blank input to empty string, then flexible parsing,
/// then an already-canonical value unchanged, then separator splitting
/// with day/month disambiguation by magnitude. Input matching no rule
/// is returned unchanged; persisting non-canonical text is an accepted
/// edge case, not an error.
pub fn to_canonical(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    if let Some(date) = parse_flexible(trimmed) {
        return date.format(CANONICAL_FORMAT).to_string();
    }

    if is_canonical(trimmed) {
        return trimmed.to_string();
    }

    if let Some(date) = parse_separated(trimmed) {
        return date.format(CANONICAL_FORMAT).to_string();
    }

    input.to_string()
}

/// Render a stored value for form editing.
///
/// Returns the input unchanged when it cannot be read as a date, so the
/// user sees what is actually stored rather than an invalid-date marker.
pub fn to_display(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    match parse_stored(trimmed) {
        Some(date) => date.format(DISPLAY_FORMAT).to_string(),
        None => value.to_string(),
    }
}

/// Render a stored value for list views, where a blank beats raw
/// storage text. Total failure yields an empty string.
pub fn safe_display(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    match parse_stored(trimmed) {
        Some(date) => date.format(DISPLAY_FORMAT).to_string(),
        None => String::new(),
    }
}

/// Anchor a date-only value at 12:00 before it becomes a datetime.
///
/// Midnight-based conversion shifts the calendar day as soon as an
/// offset crosses a day boundary; midday cannot. Every path that turns
/// a canonical date into a datetime goes through here.
pub fn anchored_midday(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(12, 0, 0)
        .expect("midday is a valid wall-clock time")
}

/// Exact `YYYY-MM-DD` shape check.
fn is_canonical(text: &str) -> bool {
    if let Ok(re) = regex_lite::Regex::new(r"^\d{4}-\d{2}-\d{2}$") {
        re.is_match(text)
    } else {
        false
    }
}

/// Parse a stored value into a date.
///
/// Canonical values are anchored at midday and only then reduced back
/// to a date, so no intermediate datetime can land on a neighboring
/// day. Anything else goes through the flexible parser.
fn parse_stored(value: &str) -> Option<NaiveDate> {
    if is_canonical(value) {
        let date = NaiveDate::parse_from_str(value, CANONICAL_FORMAT).ok()?;
        return Some(anchored_midday(date).date());
    }
    parse_flexible(value)
}

/// Best-effort parse of unambiguous date text: RFC 3339 datetimes
/// (reduced to the local calendar day), bare datetime text, then the
/// fixed format list.
fn parse_flexible(text: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Local).date_naive());
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.date());
    }

    for format in INPUT_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date);
        }
    }

    None
}

/// Split locale-formatted text on `/`, `-` or `.` and resolve the three
/// numeric parts into a date.
fn parse_separated(text: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = text.split(['/', '-', '.']).collect();
    if parts.len() != 3 {
        return None;
    }

    let first: u32 = parts[0].trim().parse().ok()?;
    let second: u32 = parts[1].trim().parse().ok()?;
    let third: u32 = parts[2].trim().parse().ok()?;

    resolve_parts(first, second, third)
}

/// Day/month/year disambiguation by magnitude.
///
/// The part over 31 is the year. With the year last, whichever of the
/// remaining parts exceeds 12 must be the day; when both fit a month
/// the input is ambiguous and day-first wins, the day-month-year
/// locale assumption ("03/04/2024" reads as 3 April). With no part
/// over 31 the input is taken as year-month-day. Impossible dates
/// resolve to `None`.
fn resolve_parts(first: u32, second: u32, third: u32) -> Option<NaiveDate> {
    let (year, month, day) = if third > 31 {
        if first > 12 {
            (third, second, first)
        } else if second > 12 {
            (third, first, second)
        } else {
            (third, second, first)
        }
    } else {
        (first, second, third)
    };

    NaiveDate::from_ymd_opt(year as i32, month, day)
}
