use anyhow::{ensure, Context, Result};
use chrono::NaiveDate;
use log::info;

use crate::api::TimeTrackRepository;
use crate::datetime::{self, parse_month};
use crate::range::{entries_in_range, month_range, recent_range};
use crate::store::EntryStore;
use crate::summary::{
    distinct_projects, total_minutes, AverageBasis, MemberOverview, MonthlyReport, TeamReport,
};
use crate::user::User;

/// チーム一覧で「今週」として集計する前後の日数。
const RECENT_DAYS: u64 = 7;

/// `team`サブコマンドのサブコマンド。
#[derive(Debug, clap::Subcommand)]
pub enum TeamSubCommands {
    /// Shows each team member's recent activity
    Overview,
    /// Shows the monthly hours of the whole team
    Report(TeamReportArgs),
    /// Shows the monthly report of one team member
    Employee(EmployeeArgs),
}

#[derive(Debug, clap::Args)]
pub struct TeamReportArgs {
    #[clap(
        short = 'm',
        long = "month",
        help = "Sets a custom month in the format YYYY-MM",
        parse(try_from_str = parse_month),
    )]
    pub month: Option<NaiveDate>,
}

#[derive(Debug, clap::Args)]
pub struct EmployeeArgs {
    #[clap(help = "Id of the team member")]
    pub id: String,

    #[clap(
        short = 'm',
        long = "month",
        help = "Sets a custom month in the format YYYY-MM",
        parse(try_from_str = parse_month),
    )]
    pub month: Option<NaiveDate>,
}

/// マネージャー向けにチームの集計を行うコマンド。
pub struct TeamCommand<'a, R: TimeTrackRepository> {
    store: &'a mut EntryStore<R>,
    user: &'a User,
}

impl<'a, R: TimeTrackRepository> TeamCommand<'a, R> {
    pub fn new(store: &'a mut EntryStore<R>, user: &'a User) -> Self {
        Self { store, user }
    }

    /// マネージャーであることを確認し、チームのtime entryを読み込む。
    async fn load(&mut self) -> Result<()> {
        ensure!(self.user.is_manager(), "Manager role required");
        self.store
            .load(self.user)
            .await
            .context("Failed to retrieve time entries")
    }

    /// チームメンバーごとの直近の作業時間、今日の記録の有無、プロジェクト数を返す。
    pub async fn overview(&mut self) -> Result<Vec<MemberOverview>> {
        self.load().await?;
        let today = datetime::today();
        let recent = recent_range(today, RECENT_DAYS);
        let members = self
            .user
            .team()
            .iter()
            .map(|member| {
                let owned = self.store.entries_by_user(&member.id);
                MemberOverview {
                    user_id: member.id.clone(),
                    name: member.name.clone(),
                    recent_minutes: total_minutes(&entries_in_range(&owned, recent, None)),
                    logged_today: owned.iter().any(|entry| entry.date == today),
                    projects: distinct_projects(&owned),
                }
            })
            .collect();

        Ok(members)
    }

    /// チーム全体の月次レポートを返す。
    pub async fn report(&mut self, args: TeamReportArgs) -> Result<TeamReport> {
        self.load().await?;
        let range = month_range(args.month.unwrap_or_else(datetime::today));
        info!("Start at: {}, End at: {}", range.start, range.end);

        Ok(TeamReport::new(range, &self.store.team_entries(), self.user.team()))
    }

    /// チームメンバー1人の月次レポートを返す。
    ///
    /// 1日あたりの平均は作業した日数で割った値とする。
    pub async fn employee(&mut self, args: EmployeeArgs) -> Result<(User, MonthlyReport)> {
        self.load().await?;
        let employee = self
            .user
            .find_member(&args.id)
            .with_context(|| format!("Employee not found: {}", args.id))?
            .clone();
        let date = args.month.unwrap_or_else(datetime::today);
        let entries = self.store.monthly_entries(date, Some(employee.id.as_str()));
        let report = MonthlyReport::new(month_range(date), entries, AverageBasis::WorkedDays);

        Ok((employee, report))
    }
}
