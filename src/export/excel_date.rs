// src/export/excel_date.rs

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Timestamps are stored as RFC 3339 in local time; turn them into an Excel
/// serial so the sheet can sort and filter on them.
pub(crate) fn parse_to_excel_date(s: &str) -> Option<(&'static str, f64)> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(("yyyy-mm-dd hh:mm:ss", naive_datetime_to_excel_serial(&dt.naive_local())));
    }

    let dt_formats = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];
    for fmt in dt_formats.iter() {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(("yyyy-mm-dd hh:mm:ss", naive_datetime_to_excel_serial(&dt)));
        }
    }

    None
}

fn naive_datetime_to_excel_serial(dt: &NaiveDateTime) -> f64 {
    let excel_epoch = NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default();

    let duration = *dt - excel_epoch;

    let days = duration.num_days() as f64;
    let secs = (duration.num_seconds() - duration.num_days() * 86400) as f64;

    days + secs / 86400.0
}
