use std::{
    env, fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use log::debug;
use serde::Deserialize;

const DEFAULT_API_URL: &str = "http://localhost:8080";
const APP_DIR: &str = "timetrack";

/// 設定ファイル(`config.json`)の内容。
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    api_url: Option<String>,
    data_dir: Option<PathBuf>,
}

/// アプリケーションの設定。
///
/// 優先順位は、コマンドライン引数、環境変数、設定ファイル、デフォルト値の順とする。
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub api_url: String,
    pub data_dir: PathBuf,
}

impl Config {
    /// デフォルトの場所から設定を読み込む。
    ///
    /// # Arguments
    ///
    /// * `api_url` - コマンドラインで指定されたAPIのURL
    pub fn load(api_url: Option<String>) -> Result<Self> {
        let path = dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.json"));
        Self::load_from(path.as_deref(), api_url, |key| env::var(key).ok())
    }

    /// 指定した設定ファイルと環境変数から設定を読み込む。
    pub fn load_from(
        path: Option<&Path>,
        api_url: Option<String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let file = match path {
            Some(path) => read_config_file(path)?,
            None => ConfigFile::default(),
        };

        let api_url = api_url
            .or_else(|| env("TIMETRACK_API_URL"))
            .or(file.api_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let data_dir = env("TIMETRACK_DATA_DIR")
            .map(PathBuf::from)
            .or(file.data_dir)
            .or_else(|| dirs::data_dir().map(|dir| dir.join(APP_DIR)))
            .context("Failed to determine data directory, set TIMETRACK_DATA_DIR")?;

        let config = Self { api_url, data_dir };
        debug!("{:?}", config);
        Ok(config)
    }

    pub fn session_path(&self) -> PathBuf {
        self.data_dir.join("session.json")
    }
}

fn read_config_file(path: &Path) -> Result<ConfigFile> {
    match fs::read_to_string(path) {
        Ok(json) => serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse config file: {}", path.display())),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(err) => {
            Err(err).with_context(|| format!("Failed to read config file: {}", path.display()))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env_of(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let env = env_of(&[("TIMETRACK_DATA_DIR", "/tmp/tt")]);
        let config = Config::load_from(None, None, env).unwrap();

        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.session_path(), PathBuf::from("/tmp/tt/session.json"));
    }

    #[test]
    fn test_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"apiUrl": "https://time.example.com", "dataDir": "/var/tt"}"#,
        )
        .unwrap();

        let config = Config::load_from(Some(&path), None, env_of(&[])).unwrap();

        assert_eq!(config.api_url, "https://time.example.com");
        assert_eq!(config.data_dir, PathBuf::from("/var/tt"));
    }

    /// 環境変数が設定ファイルより、引数が環境変数より優先されることを確認する。
    #[test]
    fn test_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"apiUrl": "https://file.example.com"}"#).unwrap();
        let env = env_of(&[
            ("TIMETRACK_API_URL", "https://env.example.com"),
            ("TIMETRACK_DATA_DIR", "/env/tt"),
        ]);

        let from_env = Config::load_from(Some(&path), None, &env).unwrap();
        let arg = Some("https://arg.example.com".to_string());
        let from_arg = Config::load_from(Some(&path), arg, &env).unwrap();

        assert_eq!(from_env.api_url, "https://env.example.com");
        assert_eq!(from_env.data_dir, PathBuf::from("/env/tt"));
        assert_eq!(from_arg.api_url, "https://arg.example.com");
    }

    #[test]
    fn test_missing_config_file() {
        let dir = tempfile::tempdir().unwrap();

        let config = Config::load_from(
            Some(&dir.path().join("missing.json")),
            None,
            env_of(&[("TIMETRACK_DATA_DIR", "/tmp/tt")]),
        )
        .unwrap();

        assert_eq!(config.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_broken_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();

        assert!(Config::load_from(Some(&path), None, env_of(&[])).is_err());
    }
}
