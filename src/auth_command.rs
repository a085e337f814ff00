use anyhow::{Context, Result};
use log::info;

use crate::api::TimeTrackRepository;
use crate::session::Session;

/// `login`サブコマンドの引数。
#[derive(Debug, clap::Args)]
pub struct LoginArgs {
    #[clap(short = 'e', long = "email", help = "Email address")]
    pub email: String,

    #[clap(short = 'p', long = "password", help = "Password")]
    pub password: String,
}

/// ログインとセッション確認を行うコマンド。
pub struct AuthCommand<'a, R: TimeTrackRepository> {
    repository: &'a R,
}

impl<'a, R: TimeTrackRepository> AuthCommand<'a, R> {
    pub fn new(repository: &'a R) -> Self {
        Self { repository }
    }

    /// ログインしてセッションを返す。
    ///
    /// メールアドレスかパスワードが空の場合はAPIを呼び出さずにエラーとする。
    pub async fn login(&self, args: LoginArgs) -> Result<Session> {
        let email = args.email.trim();
        if email.is_empty() || args.password.is_empty() {
            anyhow::bail!("Invalid email or password");
        }

        let session = self
            .repository
            .login(email, &args.password)
            .await
            .context("Invalid email or password")?;
        info!("Successfully logged in!");

        Ok(session)
    }

    /// 現在のトークンが有効か確認する。
    pub async fn status(&self) -> Result<bool> {
        self.repository
            .is_logged_in()
            .await
            .context("Failed to check session")
    }
}
