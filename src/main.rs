use std::io;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};

mod api;
mod auth_command;
mod cache;
mod config;
mod console;
mod daily_command;
mod datetime;
mod entry_command;
mod logger;
mod monthly_command;
mod range;
mod session;
mod store;
mod summary;
mod team_command;
mod time_entry;
mod user;

use api::{is_unauthorized, ApiClient};
use auth_command::{AuthCommand, LoginArgs};
use cache::EntryCache;
use config::Config;
use console::{ConsoleMarkdown, ConsolePresenter};
use daily_command::{DailyArgs, DailyCommand};
use entry_command::{AddArgs, DeleteArgs, EditArgs, EntryCommand};
use monthly_command::{MonthlyArgs, MonthlyCommand};
use session::{Session, SessionStore};
use store::EntryStore;
use team_command::{TeamCommand, TeamSubCommands};

/// TimeTrack APIのtime entryを記録・集計するためのCLIアプリケーション。
///
/// # Examples
/// ```
/// $ timetrack login -e user@example.com -p password
/// $ timetrack daily
/// $ timetrack report -m 2024-06
/// ```
#[derive(Debug, Parser)]
#[clap(version, about)]
struct Args {
    #[clap(short = 'v', long = "verbose", help = "Prints debug logs")]
    verbose: bool,

    #[clap(long = "api-url", help = "Overrides the base URL of the API")]
    api_url: Option<String>,

    #[clap(subcommand)]
    subcommand: SubCommands,
}

/// サブコマンドを表す列挙型。
#[derive(Debug, Subcommand)]
enum SubCommands {
    /// Logs in and stores the session
    Login(LoginArgs),
    /// Removes the stored session
    Logout,
    /// Shows the logged in user
    Status,
    /// Shows the time entries of a day
    Daily(DailyArgs),
    /// Shows the time entries of a week starting on Monday
    Weekly(DailyArgs),
    /// Shows the hours of each day in a month
    Monthly(MonthlyArgs),
    /// Shows the monthly report with project breakdown
    Report(MonthlyArgs),
    /// Adds a time entry
    Add(AddArgs),
    /// Edits a time entry
    Edit(EditArgs),
    /// Deletes a time entry
    Delete(DeleteArgs),
    /// Team views for managers
    #[clap(subcommand)]
    Team(TeamSubCommands),
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logger::init(args.verbose)?;

    let config = Config::load(args.api_url)?;
    let sessions = SessionStore::new(config.session_path());

    match args.subcommand {
        SubCommands::Login(login) => {
            let client = ApiClient::new(&config.api_url, None);
            let session = AuthCommand::new(&client).login(login).await?;
            sessions.save(&session)?;
            let mut stdout = io::stdout();
            ConsoleMarkdown::new(&mut stdout).show_user(&session.user)?;
        }
        SubCommands::Logout => {
            sessions.clear()?;
            info!("Logged out.");
        }
        subcommand => {
            let session = sessions
                .load()?
                .context("Not logged in. Run `timetrack login` first")?;
            if let Err(err) = run(subcommand, &config, &session).await {
                if is_unauthorized(&err) {
                    warn!("Session expired. Please log in again.");
                    sessions.clear()?;
                }
                return Err(err);
            }
        }
    }

    Ok(())
}

/// ログインが必要なサブコマンドを実行する。
async fn run(subcommand: SubCommands, config: &Config, session: &Session) -> Result<()> {
    let client = ApiClient::new(&config.api_url, Some(session.token.clone()));
    let mut store = EntryStore::new(client, EntryCache::new(config.data_dir.clone()));
    let user = &session.user;
    let mut stdout = io::stdout();
    let mut console = ConsoleMarkdown::new(&mut stdout);

    match subcommand {
        SubCommands::Status => {
            if !AuthCommand::new(store.repository()).status().await? {
                anyhow::bail!(api::ApiError::Unauthorized);
            }
            console.show_user(user)?;
        }
        SubCommands::Daily(daily) => {
            let summary = DailyCommand::new(&mut store, user).run(daily).await?;
            console.show_daily(&summary)?;
        }
        SubCommands::Weekly(weekly) => {
            let summary = DailyCommand::new(&mut store, user).run_weekly(weekly).await?;
            console.show_weekly(&summary)?;
        }
        SubCommands::Monthly(monthly) => {
            let summary = MonthlyCommand::new(&mut store, user).run(monthly).await?;
            console.show_monthly(&summary)?;
        }
        SubCommands::Report(monthly) => {
            let report = MonthlyCommand::new(&mut store, user)
                .run_report(monthly)
                .await?;
            console.show_report(&user.name, &report)?;
        }
        SubCommands::Add(add) => {
            let entry = EntryCommand::new(&mut store, user).add(add).await?;
            console.show_time_entries(&[entry])?;
        }
        SubCommands::Edit(edit) => {
            let entry = EntryCommand::new(&mut store, user).edit(edit).await?;
            console.show_time_entries(&[entry])?;
        }
        SubCommands::Delete(delete) => {
            EntryCommand::new(&mut store, user).delete(delete).await?;
        }
        SubCommands::Team(team) => {
            let mut command = TeamCommand::new(&mut store, user);
            match team {
                TeamSubCommands::Overview => {
                    let members = command.overview().await?;
                    console.show_team_overview(&members)?;
                }
                TeamSubCommands::Report(args) => {
                    let report = command.report(args).await?;
                    console.show_team_report(&report)?;
                }
                TeamSubCommands::Employee(args) => {
                    let (employee, report) = command.employee(args).await?;
                    console.show_report(&employee.name, &report)?;
                }
            }
        }
        SubCommands::Login(_) | SubCommands::Logout => {}
    }

    Ok(())
}
