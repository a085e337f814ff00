use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::info;

use crate::api::TimeTrackRepository;
use crate::datetime::{self, parse_month};
use crate::range::month_range;
use crate::store::EntryStore;
use crate::summary::{AverageBasis, MonthlyReport, PeriodSummary};
use crate::user::User;

/// `monthly`、`report`サブコマンドの引数を表す構造体。
#[derive(Debug, clap::Args)]
pub struct MonthlyArgs {
    #[clap(
        short = 'm',
        long = "month",
        help = "Sets a custom month in the format YYYY-MM",
        parse(try_from_str = parse_month),
    )]
    pub month: Option<NaiveDate>,
}

pub struct MonthlyCommand<'a, R: TimeTrackRepository> {
    store: &'a mut EntryStore<R>,
    user: &'a User,
}

impl<'a, R: TimeTrackRepository> MonthlyCommand<'a, R> {
    /// 新しい`MonthlyCommand`を返す。
    pub fn new(store: &'a mut EntryStore<R>, user: &'a User) -> Self {
        Self { store, user }
    }

    /// `monthly`サブコマンドの処理を行う。
    ///
    /// 指定された月のログインユーザーのtime entryを日毎に集計する。
    /// 月が指定されていない場合は、Localタイムゾーンで今月を利用する。
    ///
    /// # Arguments
    ///
    /// * `monthly` - `monthly`サブコマンドの引数
    pub async fn run(&mut self, monthly: MonthlyArgs) -> Result<PeriodSummary> {
        let range = month_range(monthly.month.unwrap_or_else(datetime::today));
        info!("Start at: {}, End at: {}", range.start, range.end);

        self.store
            .load(self.user)
            .await
            .context("Failed to retrieve time entries")?;
        let entries = self.store.monthly_entries(range.start, Some(self.user.id.as_str()));
        info!("Time entries retrieved successfully.");

        Ok(PeriodSummary::new(range, entries))
    }

    /// `report`サブコマンドの処理を行う。
    ///
    /// 1日あたりの平均は月の日数で割った値とする。
    pub async fn run_report(&mut self, monthly: MonthlyArgs) -> Result<MonthlyReport> {
        let summary = self.run(monthly).await?;

        Ok(MonthlyReport::new(
            summary.range,
            summary.entries,
            AverageBasis::CalendarDays,
        ))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};

    use super::{MonthlyArgs, MonthlyCommand};
    use crate::api::MockTimeTrackRepository;
    use crate::cache::EntryCache;
    use crate::datetime::mock_datetime;
    use crate::store::EntryStore;
    use crate::time_entry::TimeEntry;
    use crate::user::{Role, User};

    fn user() -> User {
        User {
            id: "1".to_string(),
            name: "Regular User".to_string(),
            email: "user@example.com".to_string(),
            role: Role::Employee,
            manager_id: None,
            team_members: vec![],
        }
    }

    fn entry(id: &str, user_id: &str, month: u32, day: u32, project: Option<&str>) -> TimeEntry {
        TimeEntry {
            id: id.to_string(),
            user_id: user_id.to_string(),
            date: NaiveDate::from_ymd_opt(2024, month, day).unwrap(),
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            description: "work".to_string(),
            duration: 180,
            project: project.map(str::to_string),
        }
    }

    fn store(dir: &tempfile::TempDir) -> EntryStore<MockTimeTrackRepository> {
        let mut repository = MockTimeTrackRepository::new();
        repository.expect_read_time_entries().times(1).returning(|| {
            Ok(vec![
                entry("a", "1", 6, 1, Some("API")),
                entry("b", "1", 6, 30, None),
                entry("c", "1", 6, 30, Some("API")),
                entry("d", "2", 6, 10, Some("API")),
                entry("e", "1", 7, 1, Some("API")),
            ])
        });
        EntryStore::new(repository, EntryCache::new(dir.path().to_path_buf()))
    }

    #[tokio::test]
    async fn test_monthly_command_no_month() {
        mock_datetime::set_mock_date(NaiveDate::from_ymd_opt(2024, 6, 18).unwrap());
        let dir = tempfile::tempdir().unwrap();
        let mut store = store(&dir);
        let user = user();

        let summary = MonthlyCommand::new(&mut store, &user)
            .run(MonthlyArgs { month: None })
            .await
            .unwrap();
        mock_datetime::clear_mock_date();

        assert_eq!(summary.range.start, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(summary.days.len(), 30);
        assert_eq!(summary.entries.len(), 3);
        assert_eq!(summary.total, 540);
    }

    #[tokio::test]
    async fn test_report_command() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store(&dir);
        let user = user();

        let report = MonthlyCommand::new(&mut store, &user)
            .run_report(MonthlyArgs {
                month: Some(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()),
            })
            .await
            .unwrap();

        assert_eq!(report.days_worked, 2);
        assert_eq!(report.average_minutes, 18.0);
        assert_eq!(report.projects[0].project, "API");
        assert_eq!(report.projects[0].minutes, 360);
        assert_eq!(report.projects[1].project, "Uncategorized");
    }

    #[tokio::test]
    async fn test_report_command_empty_month() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store(&dir);
        let user = user();

        let report = MonthlyCommand::new(&mut store, &user)
            .run_report(MonthlyArgs {
                month: Some(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()),
            })
            .await
            .unwrap();

        assert_eq!(report.summary.total, 0);
        assert_eq!(report.summary.days.len(), 29);
        assert_eq!(report.average_minutes, 0.0);
    }
}
