//! Date normalization for CV date fields (`from`, `to`, `issueDate`, `expiryDate`).
//!
//! Output is one of: `""`, `"Present"`, `YYYY`, `YYYY-MM` or `YYYY-MM-DD`.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::cv::schema::PRESENT;

/// Lowercased tokens meaning "still ongoing".
const ONGOING_TOKENS: &[&str] = &["present", "now", "current", "hiện tại"];

static FULL_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{4})-([0-9]{1,2})-([0-9]{1,2})$").unwrap());
static YEAR_MONTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{4})-([0-9]{1,2})$").unwrap());
static YEAR_ONLY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^([0-9]{4})$").unwrap());
static LOOSE_YEAR_MONTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]{4})(?:-([0-9]{2}))?").unwrap());

/// Coerces a date-like string into ISO-partial form.
///
/// Strict formats are tried from finest to coarsest granularity; when none
/// matches, the first `YYYY` (optionally followed by `-MM`) anywhere in the
/// input is used. Anything else yields `""`.
pub fn normalize_date(raw: &str) -> String {
    let s = raw.trim();
    if s.is_empty() {
        return String::new();
    }

    let lowered = s.to_lowercase();
    if ONGOING_TOKENS.contains(&lowered.as_str()) {
        return PRESENT.to_string();
    }

    if let Some(date) = parse_strict(s) {
        return date;
    }

    match LOOSE_YEAR_MONTH.captures(s) {
        Some(caps) => match caps.get(2) {
            Some(month) => format!("{}-{}", &caps[1], month.as_str()),
            None => caps[1].to_string(),
        },
        None => String::new(),
    }
}

fn parse_strict(s: &str) -> Option<String> {
    if let Some(caps) = FULL_DATE.captures(s) {
        let date = calendar_date(&caps[1], &caps[2], Some(&caps[3]))?;
        return Some(date.format("%Y-%m-%d").to_string());
    }
    if let Some(caps) = YEAR_MONTH.captures(s) {
        let date = calendar_date(&caps[1], &caps[2], None)?;
        return Some(date.format("%Y-%m").to_string());
    }
    if let Some(caps) = YEAR_ONLY.captures(s) {
        let date = calendar_date(&caps[1], "1", None)?;
        return Some(date.format("%Y").to_string());
    }
    None
}

/// Validates the components against the calendar. Year zero is rejected.
fn calendar_date(year: &str, month: &str, day: Option<&str>) -> Option<NaiveDate> {
    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    let day: u32 = day.map_or(Ok(1), str::parse::<u32>).ok()?;
    if year < 1 {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}
