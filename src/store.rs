use anyhow::Result;
use chrono::NaiveDate;
use log::{error, info, warn};

use crate::api::{is_unauthorized, TimeTrackRepository};
use crate::cache::EntryCache;
use crate::range;
use crate::time_entry::{NewTimeEntry, TimeEntry};
use crate::user::User;

/// ログインユーザーのtime entryを保持し、リモートと同期する。
///
/// 変更はリクエストが成功した後にのみ手元の一覧へ反映する。
/// 失敗した場合はログを出力し、一覧は変更しない。
pub struct EntryStore<R: TimeTrackRepository> {
    repository: R,
    cache: EntryCache,
    user: Option<User>,
    entries: Vec<TimeEntry>,
}

impl<R: TimeTrackRepository> EntryStore<R> {
    /// 新しい`EntryStore`を返す。
    ///
    /// # Arguments
    ///
    /// * `repository` - time entryを保持するリモートのリポジトリ
    /// * `cache` - 取得に失敗した時に利用するキャッシュ
    pub fn new(repository: R, cache: EntryCache) -> Self {
        Self {
            repository,
            cache,
            user: None,
            entries: Vec::new(),
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn entries(&self) -> &[TimeEntry] {
        &self.entries
    }

    pub fn find(&self, id: &str) -> Option<&TimeEntry> {
        self.entries().iter().find(|entry| entry.id == id)
    }

    /// ユーザーのtime entryを全て取得し、一覧を置き換える。
    ///
    /// ユーザーが変わった場合は取得前に一覧を空にする。
    /// 取得に失敗した場合はキャッシュがあればそれを利用する。
    pub async fn load(&mut self, user: &User) -> Result<()> {
        if self.user.as_ref().map(|current| current.id.as_str()) != Some(user.id.as_str()) {
            self.entries.clear();
            self.user = Some(user.clone());
        }

        match self.repository.read_time_entries().await {
            Ok(entries) => {
                info!("Loaded {} time entries for user {}", entries.len(), user.id);
                self.entries = entries;
                self.persist();
                Ok(())
            }
            Err(err) if is_unauthorized(&err) => Err(err),
            Err(err) => match self.cache.load(&user.id) {
                Ok(Some(cached)) => {
                    warn!("Failed to fetch time entries, using cached entries: {:#}", err);
                    self.entries = cached;
                    Ok(())
                }
                Ok(None) => {
                    error!("Failed to fetch time entries: {:#}", err);
                    Err(err)
                }
                Err(cache_err) => {
                    warn!("Failed to read cached time entries: {:#}", cache_err);
                    error!("Failed to fetch time entries: {:#}", err);
                    Err(err)
                }
            },
        }
    }

    /// time entryを作成し、一覧に追加する。
    pub async fn add(&mut self, entry: &NewTimeEntry) -> Result<TimeEntry> {
        match self.repository.create_time_entry(entry).await {
            Ok(created) => {
                info!("Added time entry {}", created.id);
                self.entries.push(created.clone());
                self.persist();
                Ok(created)
            }
            Err(err) => {
                error!("Failed to add time entry: {:#}", err);
                Err(err)
            }
        }
    }

    /// time entryを更新し、一覧の同じidのtime entryを置き換える。
    pub async fn update(&mut self, id: &str, entry: &NewTimeEntry) -> Result<TimeEntry> {
        match self.repository.update_time_entry(id, entry).await {
            Ok(updated) => {
                info!("Updated time entry {}", id);
                self.entries
                    .iter_mut()
                    .filter(|current| current.id == id)
                    .for_each(|current| *current = updated.clone());
                self.persist();
                Ok(updated)
            }
            Err(err) => {
                error!("Failed to update time entry {}: {:#}", id, err);
                Err(err)
            }
        }
    }

    /// time entryを削除し、一覧から取り除く。
    pub async fn delete(&mut self, id: &str) -> Result<()> {
        match self.repository.delete_time_entry(id).await {
            Ok(()) => {
                info!("Deleted time entry {}", id);
                self.entries.retain(|entry| entry.id != id);
                self.persist();
                Ok(())
            }
            Err(err) => {
                error!("Failed to delete time entry {}: {:#}", id, err);
                Err(err)
            }
        }
    }

    pub fn daily_entries(&self, date: NaiveDate, user_id: Option<&str>) -> Vec<TimeEntry> {
        range::daily_entries(&self.entries, date, user_id)
    }

    pub fn weekly_entries(&self, date: NaiveDate, user_id: Option<&str>) -> Vec<TimeEntry> {
        range::weekly_entries(&self.entries, date, user_id)
    }

    pub fn monthly_entries(&self, date: NaiveDate, user_id: Option<&str>) -> Vec<TimeEntry> {
        range::monthly_entries(&self.entries, date, user_id)
    }

    pub fn entries_by_user(&self, user_id: &str) -> Vec<TimeEntry> {
        range::entries_by_user(&self.entries, user_id)
    }

    /// マネージャー自身とチームメンバーのtime entryを返す。
    ///
    /// マネージャー以外は常に空となる。
    pub fn team_entries(&self) -> Vec<TimeEntry> {
        let Some(user) = self.user().filter(|user| user.is_manager()) else {
            return Vec::new();
        };
        self.entries
            .iter()
            .filter(|entry| user.is_in_team(&entry.user_id))
            .cloned()
            .collect()
    }

    /// 現在の一覧をキャッシュに書き込む。失敗してもログのみとする。
    fn persist(&self) {
        if let Some(user) = &self.user {
            if let Err(err) = self.cache.save(&user.id, &self.entries) {
                warn!("Failed to write entry cache: {:#}", err);
            }
        }
    }
}
