use chrono::{DateTime, Duration, NaiveDate, Utc};

use super::{enums::Stage, oracle_error::{ErrCode, OracleError}};

pub const SECONDS_PER_DAY: u64 = 60 * 60 * 24;

/// Parse a calendar date, either "YYYY-MM-DD" or "YYYY/MM/DD"
pub fn parse_date(date_str: &str) -> Result<NaiveDate, OracleError> {
    let trimmed = date_str.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%Y/%m/%d"))
        .map_err(|e| {
            OracleError::new(
                Stage::Config,
                ErrCode::ParaError,
                format!("cannot parse date {:?}: {}", date_str, e),
            )
        })
}

/// Unix seconds of UTC midnight starting `date`, and of the following midnight
pub fn utc_day_bounds(date: NaiveDate) -> (u64, u64) {
    let start = date
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default();
    let end = start + Duration::days(1).num_seconds();
    (start.max(0) as u64, end.max(0) as u64)
}

/// UTC calendar date of a block timestamp
pub fn utc_date_of(ts: u64) -> Option<NaiveDate> {
    DateTime::<Utc>::from_timestamp(ts as i64, 0).map(|dt| dt.date_naive())
}

/// Formats a block timestamp as "YYYY-MM-DD HH:MM:SS" (UTC)
pub fn format_block_time(ts: u64) -> String {
    match DateTime::<Utc>::from_timestamp(ts as i64, 0) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => ts.to_string(),
    }
}
