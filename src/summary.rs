use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use crate::range::DateRange;
use crate::time_entry::TimeEntry;
use crate::user::User;

/// プロジェクトごとの集計結果。
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectTotal {
    pub project: String,
    pub minutes: i64,
}

/// ユーザーごとの集計結果。
#[derive(Clone, Debug, PartialEq)]
pub struct UserTotal {
    pub user_id: String,
    pub name: String,
    pub minutes: i64,
    pub entries: usize,
}

/// 日ごとの集計結果。
#[derive(Clone, Debug, PartialEq)]
pub struct DayTotal {
    pub date: NaiveDate,
    pub minutes: i64,
    pub entries: usize,
}

/// 日・週・月の表示に利用する集計結果。
#[derive(Clone, Debug, PartialEq)]
pub struct PeriodSummary {
    pub range: DateRange,
    pub entries: Vec<TimeEntry>,
    pub days: Vec<DayTotal>,
    pub total: i64,
}

impl PeriodSummary {
    pub fn new(range: DateRange, entries: Vec<TimeEntry>) -> Self {
        Self {
            range,
            days: daily_totals(&entries, range),
            total: total_minutes(&entries),
            entries,
        }
    }
}

/// 1日あたりの平均を計算する時の日数の数え方。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AverageBasis {
    /// 範囲内の全ての日数
    CalendarDays,
    /// time entryが存在する日数
    WorkedDays,
}

/// 月次レポート。
#[derive(Clone, Debug, PartialEq)]
pub struct MonthlyReport {
    pub summary: PeriodSummary,
    pub days_worked: usize,
    pub average_minutes: f64,
    pub projects: Vec<ProjectTotal>,
}

impl MonthlyReport {
    /// 範囲内のtime entryから月次レポートを作成する。
    pub fn new(range: DateRange, entries: Vec<TimeEntry>, basis: AverageBasis) -> Self {
        let summary = PeriodSummary::new(range, entries);
        let days_worked = days_with_entries(&summary.entries);
        let days = match basis {
            AverageBasis::CalendarDays => range.num_days(),
            AverageBasis::WorkedDays => days_worked as i64,
        };
        Self {
            days_worked,
            average_minutes: average_minutes_per_day(summary.total, days),
            projects: project_totals(&summary.entries),
            summary,
        }
    }
}

/// チーム一覧の1行。
#[derive(Clone, Debug, PartialEq)]
pub struct MemberOverview {
    pub user_id: String,
    pub name: String,
    pub recent_minutes: i64,
    pub logged_today: bool,
    pub projects: usize,
}

/// チームの月次レポート。
#[derive(Clone, Debug, PartialEq)]
pub struct TeamReport {
    pub range: DateRange,
    pub members: usize,
    pub total: i64,
    pub users: Vec<UserTotal>,
    pub projects: Vec<ProjectTotal>,
}

impl TeamReport {
    /// チームメンバーのtime entryから月次レポートを作成する。
    ///
    /// `members`に含まれないユーザーのtime entryは集計しない。
    /// マネージャー自身のtime entryもプロジェクト別の集計を含めて除外する。
    pub fn new(range: DateRange, entries: &[TimeEntry], members: &[User]) -> Self {
        let entries = entries
            .iter()
            .filter(|entry| range.contains(entry.date))
            .filter(|entry| members.iter().any(|member| member.id == entry.user_id))
            .cloned()
            .collect::<Vec<_>>();
        Self {
            range,
            members: members.len(),
            total: total_minutes(&entries),
            users: user_totals(&entries, members),
            projects: project_totals(&entries),
        }
    }
}

/// 作業時間の合計(分)を返す。
pub fn total_minutes(entries: &[TimeEntry]) -> i64 {
    entries.iter().map(|entry| entry.duration).sum()
}

/// プロジェクトごとの作業時間を、時間の多い順に返す。
///
/// 同じ時間の場合はプロジェクト名の昇順とする。
pub fn project_totals(entries: &[TimeEntry]) -> Vec<ProjectTotal> {
    let totals: HashMap<&str, i64> = entries.iter().fold(HashMap::new(), |mut acc, entry| {
        *acc.entry(entry.project_label()).or_insert(0) += entry.duration;
        acc
    });

    let mut totals = totals
        .into_iter()
        .map(|(project, minutes)| ProjectTotal {
            project: project.to_string(),
            minutes,
        })
        .collect::<Vec<_>>();
    totals.sort_by(|a, b| b.minutes.cmp(&a.minutes).then_with(|| a.project.cmp(&b.project)));
    totals
}

/// 指定したユーザーごとの作業時間を、時間の多い順に返す。
///
/// time entryが無いユーザーも0分として含める。
pub fn user_totals(entries: &[TimeEntry], users: &[User]) -> Vec<UserTotal> {
    let mut totals = users
        .iter()
        .map(|user| {
            let owned = entries.iter().filter(|entry| entry.user_id == user.id);
            let (minutes, count) = owned.fold((0, 0), |(minutes, count), entry| {
                (minutes + entry.duration, count + 1)
            });
            UserTotal {
                user_id: user.id.clone(),
                name: user.name.clone(),
                minutes,
                entries: count,
            }
        })
        .collect::<Vec<_>>();
    totals.sort_by(|a, b| b.minutes.cmp(&a.minutes));
    totals
}

/// 範囲内の日ごとの作業時間と件数を、日付順に返す。
pub fn daily_totals(entries: &[TimeEntry], range: DateRange) -> Vec<DayTotal> {
    range
        .days()
        .map(|date| {
            let (minutes, count) = entries
                .iter()
                .filter(|entry| entry.date == date)
                .fold((0, 0), |(minutes, count), entry| (minutes + entry.duration, count + 1));
            DayTotal {
                date,
                minutes,
                entries: count,
            }
        })
        .collect()
}

/// `total`に対する`part`の割合(%)を返す。`total`が0の場合は0とする。
pub fn percentage(part: i64, total: i64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    part as f64 / total as f64 * 100.0
}

/// 1日あたりの平均作業時間(分)を返す。`days`が0の場合は0とする。
pub fn average_minutes_per_day(total: i64, days: i64) -> f64 {
    if days <= 0 {
        return 0.0;
    }
    total as f64 / days as f64
}

/// time entryが存在する日数を返す。
pub fn days_with_entries(entries: &[TimeEntry]) -> usize {
    entries
        .iter()
        .map(|entry| entry.date)
        .collect::<HashSet<_>>()
        .len()
}

/// プロジェクトの種類数を返す。プロジェクト無しは`Uncategorized`として数える。
pub fn distinct_projects(entries: &[TimeEntry]) -> usize {
    entries
        .iter()
        .map(|entry| entry.project_label())
        .collect::<HashSet<_>>()
        .len()
}

pub fn minutes_to_hours(minutes: i64) -> f64 {
    minutes as f64 / 60.0
}

/// 分を`Xh Ym`形式で表示する。
pub fn format_duration(minutes: i64) -> String {
    format!("{}h {}m", minutes.div_euclid(60), minutes.rem_euclid(60))
}
