use chrono::{Local, NaiveDate, NaiveTime};

use anyhow::{Context, Result};

#[cfg(not(test))]
/// Localタイムゾーンでの今日の日付を取得する。
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}


#[cfg(test)]
pub use mock_datetime::today;

/// `YYYY-MM-DD`形式の日付をパースする。
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("Failed to parse date: {}", s))
}

/// `YYYY-MM`形式の月をパースし、その月の初日を返す。
pub fn parse_month(s: &str) -> Result<NaiveDate> {
    let target_date = s.to_string() + "-01";
    NaiveDate::parse_from_str(&target_date, "%Y-%m-%d")
        .with_context(|| format!("Failed to parse month: {}", s))
}

/// `HH:MM`、または`HH:MM:SS`形式の時刻をパースする。
pub fn parse_time(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .with_context(|| format!("Failed to parse time: {}", s))
}
