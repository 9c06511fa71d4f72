//! Capture datetime formatting.

use chrono::NaiveDate;

/// Format a 14-digit capture datetime as an HTTP-date
/// (`Mon, 06 Feb 2017 00:23:37 GMT`).
///
/// Returns `None` when the token is not a valid calendar datetime.
pub fn http_date(datetime: &str) -> Option<String> {
    if datetime.len() != 14 || !datetime.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let field = |range: std::ops::Range<usize>| datetime[range].parse::<u32>().ok();

    let year = i32::try_from(field(0..4)?).ok()?;
    let date = NaiveDate::from_ymd_opt(year, field(4..6)?, field(6..8)?)?;
    let moment = date.and_hms_opt(field(8..10)?, field(10..12)?, field(12..14)?)?;
    Some(moment.and_utc().format("%a, %d %b %Y %H:%M:%S GMT").to_string())
}
