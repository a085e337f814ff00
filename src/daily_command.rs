use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::info;

use crate::api::TimeTrackRepository;
use crate::datetime::{self, parse_date};
use crate::range::{day_range, week_range};
use crate::store::EntryStore;
use crate::summary::PeriodSummary;
use crate::user::User;

/// 日毎・週毎の情報を出力するためのサブコマンドの引数。
#[derive(Debug, clap::Args)]
pub struct DailyArgs {
    #[clap(
        short = 'd',
        long = "date",
        help = "Sets a custom date in the format YYYY-MM-DD",
        parse(try_from_str = parse_date),
    )]
    pub date: Option<NaiveDate>,
}

pub struct DailyCommand<'a, R: TimeTrackRepository> {
    store: &'a mut EntryStore<R>,
    user: &'a User,
}

impl<'a, R: TimeTrackRepository> DailyCommand<'a, R> {
    /// 新しい`DailyCommand`を返す。
    ///
    /// # Arguments
    /// * `store` - time entryを保持するstore
    /// * `user` - ログインユーザー
    pub fn new(store: &'a mut EntryStore<R>, user: &'a User) -> Self {
        Self { store, user }
    }

    /// `daily`サブコマンドの処理を行う。
    ///
    /// 指定された日付のログインユーザーのタイムエントリーを取得する。
    /// 日付が指定されていない場合は、Localタイムゾーンで今日の日付を利用する。
    pub async fn run(&mut self, daily: DailyArgs) -> Result<PeriodSummary> {
        let date = daily.date.unwrap_or_else(datetime::today);
        info!("Date: {}", date);

        self.store
            .load(self.user)
            .await
            .context("Failed to retrieve time entries")?;
        let entries = self.store.daily_entries(date, Some(self.user.id.as_str()));
        info!("Time entries retrieved successfully.");

        Ok(PeriodSummary::new(day_range(date), entries))
    }

    /// `weekly`サブコマンドの処理を行う。
    ///
    /// 指定された日付を含む月曜始まりの1週間のタイムエントリーを取得する。
    pub async fn run_weekly(&mut self, weekly: DailyArgs) -> Result<PeriodSummary> {
        let range = week_range(weekly.date.unwrap_or_else(datetime::today));
        info!("Start at: {}, End at: {}", range.start, range.end);

        self.store
            .load(self.user)
            .await
            .context("Failed to retrieve time entries")?;
        let entries = self.store.weekly_entries(range.start, Some(self.user.id.as_str()));
        info!("Time entries retrieved successfully.");

        Ok(PeriodSummary::new(range, entries))
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;
    use chrono::{NaiveDate, NaiveTime};
    use rstest::rstest;

    use super::DailyArgs;
    use super::DailyCommand;
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

    fn entry(id: &str, user_id: &str, date: NaiveDate) -> TimeEntry {
        TimeEntry {
            id: id.to_string(),
            user_id: user_id.to_string(),
            date,
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            description: "work".to_string(),
            duration: 480,
            project: None,
        }
    }

    fn repository() -> MockTimeTrackRepository {
        let mut repository = MockTimeTrackRepository::new();
        repository.expect_read_time_entries().times(1).returning(|| {
            Ok(vec![
                entry("a", "1", NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()),
                entry("b", "1", NaiveDate::from_ymd_opt(2024, 6, 12).unwrap()),
                entry("c", "2", NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()),
                entry("d", "1", NaiveDate::from_ymd_opt(2024, 6, 17).unwrap()),
            ])
        });
        repository
    }

    #[tokio::test]
    async fn test_daily_command_no_date() {
        mock_datetime::set_mock_date(NaiveDate::from_ymd_opt(2024, 6, 10).unwrap());
        let dir = tempfile::tempdir().unwrap();
        let mut store = EntryStore::new(repository(), EntryCache::new(dir.path().to_path_buf()));
        let user = user();

        let mut command = DailyCommand::new(&mut store, &user);
        let summary = command.run(DailyArgs { date: None }).await.unwrap();
        mock_datetime::clear_mock_date();

        assert_eq!(summary.entries.len(), 1);
        assert_eq!(summary.entries[0].id, "a");
        assert_eq!(summary.total, 480);
    }

    #[rstest]
    #[case(NaiveDate::from_ymd_opt(2024, 6, 12).unwrap(), 1)]
    #[case(NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(), 0)]
    #[tokio::test]
    async fn test_daily_command_with_date(#[case] date: NaiveDate, #[case] expected: usize) {
        let dir = tempfile::tempdir().unwrap();
        let mut store = EntryStore::new(repository(), EntryCache::new(dir.path().to_path_buf()));
        let user = user();

        let mut command = DailyCommand::new(&mut store, &user);
        let result = command.run(DailyArgs { date: Some(date) }).await;

        assert_eq!(result.unwrap().entries.len(), expected);
    }

    #[tokio::test]
    async fn test_weekly_command() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = EntryStore::new(repository(), EntryCache::new(dir.path().to_path_buf()));
        let user = user();

        let mut command = DailyCommand::new(&mut store, &user);
        let summary = command
            .run_weekly(DailyArgs {
                date: Some(NaiveDate::from_ymd_opt(2024, 6, 16).unwrap()),
            })
            .await
            .unwrap();

        assert_eq!(summary.range.start, NaiveDate::from_ymd_opt(2024, 6, 10).unwrap());
        assert_eq!(summary.days.len(), 7);
        assert_eq!(summary.total, 960);
    }

    #[tokio::test]
    async fn test_daily_command_fetch_failure() {
        let mut repository = MockTimeTrackRepository::new();
        repository
            .expect_read_time_entries()
            .returning(|| Err(anyhow!("connection refused")));
        let dir = tempfile::tempdir().unwrap();
        let mut store = EntryStore::new(repository, EntryCache::new(dir.path().to_path_buf()));
        let user = user();

        let mut command = DailyCommand::new(&mut store, &user);
        let result = command.run(DailyArgs { date: None }).await;

        assert!(result.is_err());
    }
}
