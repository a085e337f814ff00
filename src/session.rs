use std::{fs, io::ErrorKind, path::PathBuf};

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::user::User;

/// ログイン中のユーザーとトークン。
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

/// セッションをファイルに保存する。
///
/// ログインで作成し、ログアウト、またはAPIが401を返した時に削除する。
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// 保存されているセッションを返す。未ログインの場合は`None`を返す。
    pub fn load(&self) -> Result<Option<Session>> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to read session: {}", self.path.display()))
            }
        };
        let session = serde_json::from_str::<Session>(&json)
            .with_context(|| format!("Failed to parse session: {}", self.path.display()))?;
        debug!("Loaded session for {}", session.user.email);

        Ok(Some(session))
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(session).context("Failed to serialize session")?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write session: {}", self.path.display()))?;
        info!("Session saved to {}", self.path.display());

        Ok(())
    }

    /// セッションを削除する。未ログインの場合は何もしない。
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err)
                .with_context(|| format!("Failed to remove session: {}", self.path.display())),
        }
    }
}
