use chrono::{Datelike, Days, Months, NaiveDate};

use crate::time_entry::TimeEntry;

/// 開始日と終了日を両端に含む日付の範囲。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// `date`が範囲内であれば`true`を返す。
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// 範囲内の日数を返す。`end`が`start`より前の場合は0とする。
    pub fn num_days(&self) -> i64 {
        ((self.end - self.start).num_days() + 1).max(0)
    }

    /// 範囲内の日付を昇順で返す。
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |date| *date <= end)
    }
}

/// 指定日1日分の範囲を返す。
pub fn day_range(date: NaiveDate) -> DateRange {
    DateRange::new(date, date)
}

/// 指定日を含む月曜始まり日曜終わりの週を返す。
///
/// 週の一部が`NaiveDate`で表現できない場合は、表現できる日までとする。
pub fn week_range(date: NaiveDate) -> DateRange {
    let offset = Days::new(u64::from(date.weekday().num_days_from_monday()));
    let monday = date.checked_sub_days(offset).unwrap_or(NaiveDate::MIN);
    let sunday = monday.checked_add_days(Days::new(6)).unwrap_or(NaiveDate::MAX);
    DateRange::new(monday, sunday)
}

/// 指定日を含む月の初日から末日までを返す。
///
/// 翌月が表現できない月は`NaiveDate::MAX`を含む12月だけなので、
/// その場合は`NaiveDate::MAX`を末日とする。
pub fn month_range(date: NaiveDate) -> DateRange {
    let first = date.with_day(1).unwrap_or(date);
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(NaiveDate::MAX);
    DateRange::new(first, last)
}

/// 指定日の前後`days`日を返す。
///
/// チーム一覧の「今週の時間」は暦の週ではなくこの範囲で集計する。
pub fn recent_range(today: NaiveDate, days: u64) -> DateRange {
    let days = Days::new(days);
    DateRange::new(
        today.checked_sub_days(days).unwrap_or(NaiveDate::MIN),
        today.checked_add_days(days).unwrap_or(NaiveDate::MAX),
    )
}

/// 範囲内のtime entryを返す。
///
/// # Arguments
///
/// * `entries` - 対象のtime entry
/// * `range` - 抽出する日付の範囲
/// * `user_id` - 指定した場合は、そのユーザーのtime entryのみを返す
pub fn entries_in_range(
    entries: &[TimeEntry],
    range: DateRange,
    user_id: Option<&str>,
) -> Vec<TimeEntry> {
    entries
        .iter()
        .filter(|entry| range.contains(entry.date))
        .filter(|entry| user_id.map_or(true, |id| entry.user_id == id))
        .cloned()
        .collect()
}

pub fn daily_entries(
    entries: &[TimeEntry],
    date: NaiveDate,
    user_id: Option<&str>,
) -> Vec<TimeEntry> {
    entries_in_range(entries, day_range(date), user_id)
}

pub fn weekly_entries(
    entries: &[TimeEntry],
    date: NaiveDate,
    user_id: Option<&str>,
) -> Vec<TimeEntry> {
    entries_in_range(entries, week_range(date), user_id)
}

pub fn monthly_entries(
    entries: &[TimeEntry],
    date: NaiveDate,
    user_id: Option<&str>,
) -> Vec<TimeEntry> {
    entries_in_range(entries, month_range(date), user_id)
}

pub fn entries_by_user(entries: &[TimeEntry], user_id: &str) -> Vec<TimeEntry> {
    entries
        .iter()
        .filter(|entry| entry.user_id == user_id)
        .cloned()
        .collect()
}
