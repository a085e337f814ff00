use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, info};
#[cfg(test)]
use mockall::automock;
use reqwest::{
    header::{ACCEPT, CONTENT_TYPE},
    Client, Method, RequestBuilder, Response, StatusCode,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::datetime::{parse_date, parse_time};
use crate::session::Session;
use crate::time_entry::{NewTimeEntry, TimeEntry};
use crate::user::deserialize_id;

/// APIの呼び出し元で分岐が必要なエラー。
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Session is no longer valid, please log in again")]
    Unauthorized,
    #[error("Request returned an error status: {0}")]
    Status(StatusCode),
}

/// エラーの原因に`ApiError::Unauthorized`が含まれていれば`true`を返す。
pub fn is_unauthorized(err: &anyhow::Error) -> bool {
    err.chain()
        .any(|cause| matches!(cause.downcast_ref::<ApiError>(), Some(ApiError::Unauthorized)))
}

/// time entryを保持するリモートのリポジトリ。
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TimeTrackRepository {
    /// メールアドレスとパスワードでログインし、セッションを返す。
    async fn login(&self, email: &str, password: &str) -> Result<Session>;

    /// 現在のトークンが有効であれば`true`を返す。
    async fn is_logged_in(&self) -> Result<bool>;

    /// ログインユーザーが参照できる全てのtime entryを取得する。
    async fn read_time_entries(&self) -> Result<Vec<TimeEntry>>;

    async fn create_time_entry(&self, entry: &NewTimeEntry) -> Result<TimeEntry>;

    async fn update_time_entry(&self, id: &str, entry: &NewTimeEntry) -> Result<TimeEntry>;

    async fn delete_time_entry(&self, id: &str) -> Result<()>;
}

/// APIのレスポンスをデシリアライズするための構造体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiTimeEntry {
    #[serde(deserialize_with = "deserialize_id")]
    id: String,
    #[serde(deserialize_with = "deserialize_id")]
    user_id: String,
    date: String,
    start_time: String,
    end_time: String,
    description: String,
    duration: i64,
    #[serde(default)]
    project: Option<String>,
}

impl TryFrom<ApiTimeEntry> for TimeEntry {
    type Error = anyhow::Error;

    fn try_from(entry: ApiTimeEntry) -> Result<Self> {
        let date = parse_date(&entry.date)
            .with_context(|| format!("Invalid date in time entry {}", entry.id))?;
        let start_time = parse_time(&entry.start_time)
            .with_context(|| format!("Invalid start time in time entry {}", entry.id))?;
        let end_time = parse_time(&entry.end_time)
            .with_context(|| format!("Invalid end time in time entry {}", entry.id))?;

        Ok(TimeEntry {
            id: entry.id,
            user_id: entry.user_id,
            date,
            start_time,
            end_time,
            description: entry.description,
            duration: entry.duration,
            project: entry.project.filter(|project| !project.is_empty()),
        })
    }
}

/// 作成・更新リクエストのボディ。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiTimeEntryBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<&'a str>,
    date: String,
    start_time: String,
    end_time: String,
    description: &'a str,
    duration: i64,
    project: Option<&'a str>,
}

impl<'a> From<&'a NewTimeEntry> for ApiTimeEntryBody<'a> {
    fn from(entry: &'a NewTimeEntry) -> Self {
        Self {
            user_id: entry.user_id(),
            date: entry.date().format("%Y-%m-%d").to_string(),
            start_time: entry.start_time().format("%H:%M").to_string(),
            end_time: entry.end_time().format("%H:%M").to_string(),
            description: entry.description(),
            duration: entry.duration(),
            project: entry.project(),
        }
    }
}

#[derive(Debug, Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

/// TimeTrack APIと通信するためのクライアント。
///
/// # Examples
///
/// ```
/// let client = ApiClient::new("http://localhost:8080", Some(token));
/// let time_entries = client.read_time_entries().await.unwrap();
/// ```
pub struct ApiClient {
    client: Client,
    api_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// 新しい`ApiClient`を返す。
    ///
    /// # Arguments
    ///
    /// * `api_url` - APIのベースURL
    /// * `token` - ログイン済みの場合のBearerトークン
    pub fn new(api_url: &str, token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    /// 認証ヘッダー付きのリクエストを作成する。
    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let token = self
            .token
            .as_deref()
            .context("Not logged in. Run `timetrack login` first")?;

        Ok(self
            .client
            .request(method, format!("{}{}", self.api_url, path))
            .bearer_auth(token)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json"))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request
            .send()
            .await
            .with_context(|| {
                format!("Failed to send request to TimeTrack API at {}", self.api_url)
            })?;
        debug!("{} {}", response.status(), response.url());
        check_status(response)
    }
}

/// ステータスコードを確認し、エラーであれば`ApiError`を返す。
fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(ApiError::Unauthorized.into());
    }
    if status.is_client_error() || status.is_server_error() {
        return Err(ApiError::Status(status).into());
    }
    Ok(response)
}

#[async_trait]
impl TimeTrackRepository for ApiClient {
    async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let request = self
            .client
            .post(format!("{}/api/login", self.api_url))
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .json(&LoginBody { email, password });
        let session = self
            .send(request)
            .await
            .context("Login failed")?
            .json::<Session>()
            .await
            .context("Failed to deserialize response")?;
        info!("Logged in as {}", session.user.email);

        Ok(session)
    }

    async fn is_logged_in(&self) -> Result<bool> {
        let request = self.request(Method::GET, "/api/logged")?;
        match self.send(request).await {
            Ok(_) => Ok(true),
            Err(err) if is_unauthorized(&err) => Ok(false),
            Err(err) => Err(err),
        }
    }

    async fn read_time_entries(&self) -> Result<Vec<TimeEntry>> {
        let request = self.request(Method::GET, "/api/time_entries")?;
        let api_time_entries = self
            .send(request)
            .await?
            .json::<Vec<ApiTimeEntry>>()
            .await
            .context("Failed to deserialize response")?;
        info!("length of time entries: {}", api_time_entries.len());

        api_time_entries
            .into_iter()
            .map(TimeEntry::try_from)
            .collect()
    }

    async fn create_time_entry(&self, entry: &NewTimeEntry) -> Result<TimeEntry> {
        let request = self
            .request(Method::POST, "/api/time_entries")?
            .json(&ApiTimeEntryBody::from(entry));
        let created = self
            .send(request)
            .await?
            .json::<ApiTimeEntry>()
            .await
            .context("Failed to deserialize response")?;

        TimeEntry::try_from(created)
    }

    async fn update_time_entry(&self, id: &str, entry: &NewTimeEntry) -> Result<TimeEntry> {
        let request = self
            .request(Method::PATCH, &format!("/api/time_entries/{}", id))?
            .json(&ApiTimeEntryBody::from(entry));
        let updated = self
            .send(request)
            .await?
            .json::<ApiTimeEntry>()
            .await
            .context("Failed to deserialize response")?;

        TimeEntry::try_from(updated)
    }

    async fn delete_time_entry(&self, id: &str) -> Result<()> {
        let request = self.request(Method::DELETE, &format!("/api/time_entries/{}", id))?;
        self.send(request).await?;

        Ok(())
    }
}
