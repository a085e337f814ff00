use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime};
use log::info;

use crate::api::TimeTrackRepository;
use crate::datetime::{self, parse_date, parse_time};
use crate::store::EntryStore;
use crate::time_entry::{EntryChanges, NewTimeEntry, TimeEntry};
use crate::user::User;

/// `add`サブコマンドの引数。
#[derive(Debug, clap::Args)]
pub struct AddArgs {
    #[clap(
        short = 'd',
        long = "date",
        help = "Date of the entry in the format YYYY-MM-DD, defaults to today",
        parse(try_from_str = parse_date),
    )]
    pub date: Option<NaiveDate>,

    #[clap(
        short = 's',
        long = "start",
        help = "Start time in the format HH:MM",
        default_value = "09:00",
        parse(try_from_str = parse_time),
    )]
    pub start: NaiveTime,

    #[clap(
        short = 'e',
        long = "end",
        help = "End time in the format HH:MM",
        default_value = "17:00",
        parse(try_from_str = parse_time),
    )]
    pub end: NaiveTime,

    #[clap(short = 'm', long = "description", help = "What did you work on?")]
    pub description: String,

    #[clap(short = 'p', long = "project", help = "Project name (optional)")]
    pub project: Option<String>,
}

/// `edit`サブコマンドの引数。指定しなかった項目は変更しない。
#[derive(Debug, clap::Args)]
pub struct EditArgs {
    #[clap(help = "Id of the entry to edit")]
    pub id: String,

    #[clap(short = 'd', long = "date", parse(try_from_str = parse_date))]
    pub date: Option<NaiveDate>,

    #[clap(short = 's', long = "start", parse(try_from_str = parse_time))]
    pub start: Option<NaiveTime>,

    #[clap(short = 'e', long = "end", parse(try_from_str = parse_time))]
    pub end: Option<NaiveTime>,

    #[clap(short = 'm', long = "description")]
    pub description: Option<String>,

    #[clap(short = 'p', long = "project", help = "New project name, empty to clear it")]
    pub project: Option<String>,
}

/// `delete`サブコマンドの引数。
#[derive(Debug, clap::Args)]
pub struct DeleteArgs {
    #[clap(help = "Id of the entry to delete")]
    pub id: String,
}

/// time entryを作成・更新・削除するコマンド。
pub struct EntryCommand<'a, R: TimeTrackRepository> {
    store: &'a mut EntryStore<R>,
    user: &'a User,
}

impl<'a, R: TimeTrackRepository> EntryCommand<'a, R> {
    pub fn new(store: &'a mut EntryStore<R>, user: &'a User) -> Self {
        Self { store, user }
    }

    /// 入力値を検証し、time entryを作成する。
    ///
    /// 終了時刻が開始時刻以前の場合は、storeを呼び出す前にエラーとする。
    pub async fn add(&mut self, args: AddArgs) -> Result<TimeEntry> {
        let entry = NewTimeEntry::new(
            Some(self.user.id.clone()),
            args.date.unwrap_or_else(datetime::today),
            args.start,
            args.end,
            &args.description,
            args.project.as_deref(),
        )?;

        self.store
            .load(self.user)
            .await
            .context("Failed to retrieve time entries")?;
        let created = self
            .store
            .add(&entry)
            .await
            .context("Failed to add time entry")?;
        info!("Time entry added successfully.");

        Ok(created)
    }

    /// 既存のtime entryに変更を反映して更新する。
    pub async fn edit(&mut self, args: EditArgs) -> Result<TimeEntry> {
        self.store
            .load(self.user)
            .await
            .context("Failed to retrieve time entries")?;
        let current = self
            .store
            .find(&args.id)
            .with_context(|| format!("Time entry not found: {}", args.id))?;
        let changes = EntryChanges {
            date: args.date,
            start_time: args.start,
            end_time: args.end,
            description: args.description,
            project: args.project,
        };
        let entry = NewTimeEntry::edit(current, changes)?;

        let updated = self
            .store
            .update(&args.id, &entry)
            .await
            .context("Failed to update time entry")?;
        info!("Time entry updated successfully.");

        Ok(updated)
    }

    pub async fn delete(&mut self, args: DeleteArgs) -> Result<()> {
        self.store
            .load(self.user)
            .await
            .context("Failed to retrieve time entries")?;
        if self.store.find(&args.id).is_none() {
            anyhow::bail!("Time entry not found: {}", args.id);
        }
        self.store
            .delete(&args.id)
            .await
            .context("Failed to delete time entry")?;
        info!("Time entry deleted successfully.");

        Ok(())
    }
}
