use std::{fs, io::ErrorKind, path::PathBuf};

use anyhow::{Context, Result};
use log::debug;

use crate::time_entry::TimeEntry;

/// 最後に取得したtime entryをユーザーごとに保存するキャッシュ。
#[derive(Clone, Debug)]
pub struct EntryCache {
    dir: PathBuf,
}

impl EntryCache {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path(&self, user_id: &str) -> PathBuf {
        self.dir.join(format!("entries_{}.json", user_id))
    }

    /// キャッシュされたtime entryを返す。キャッシュが無い場合は`None`を返す。
    pub fn load(&self, user_id: &str) -> Result<Option<Vec<TimeEntry>>> {
        let path = self.path(user_id);
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| format!("Failed to read cache: {}", path.display()))
            }
        };
        let entries = serde_json::from_str::<Vec<TimeEntry>>(&json)
            .with_context(|| format!("Failed to parse cache: {}", path.display()))?;
        debug!("Loaded {} cached entries from {}", entries.len(), path.display());

        Ok(Some(entries))
    }

    pub fn save(&self, user_id: &str, entries: &[TimeEntry]) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create directory: {}", self.dir.display()))?;
        let path = self.path(user_id);
        let json = serde_json::to_string(entries).context("Failed to serialize time entries")?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write cache: {}", path.display()))?;
        debug!("Cached {} entries to {}", entries.len(), path.display());

        Ok(())
    }
}
