//! # Marker Service 設定
//!
//! 環境変数から Marker Service サーバーの設定を読み込む。
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `MARKER_HOST` | No | バインドアドレス（デフォルト: `0.0.0.0`） |
//! | `MARKER_PORT` | No | ポート番号（デフォルト: `3690`） |
//! | `DATABASE_URL` | **Yes** | PostgreSQL 接続 URL |
//! | `IDENTITY_API_URL` | No | ID プロバイダの API URL（デフォルト: `https://api.clerk.com`） |
//! | `IDENTITY_SECRET_KEY` | **Yes** | ID プロバイダのシークレットキー |

use std::{env, fmt};

use thiserror::Error;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3690;
const DEFAULT_IDENTITY_API_URL: &str = "https://api.clerk.com";

/// 設定読み込みエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// 必須の環境変数が未設定
    #[error("{0} が設定されていません")]
    Missing(&'static str),

    /// 値の形式が不正
    #[error("{name} の値が不正です（{value:?}）: {reason}")]
    Invalid {
        name:   &'static str,
        value:  String,
        reason: String,
    },
}

/// Marker Service サーバーの設定
#[derive(Clone)]
pub struct MarkerServiceConfig {
    /// バインドアドレス
    pub host: String,
    /// ポート番号
    pub port: u16,
    /// データベース接続 URL
    pub database_url: String,
    /// ID プロバイダの API URL
    pub identity_api_url: String,
    /// ID プロバイダのシークレットキー
    pub identity_secret_key: String,
}

impl MarkerServiceConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 任意の参照関数から設定を読み込む
    ///
    /// 空文字列は未設定として扱う。
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let require = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let port = match get("MARKER_PORT") {
            Some(value) => value.parse().map_err(|e| ConfigError::Invalid {
                name:   "MARKER_PORT",
                value:  value.clone(),
                reason: format!("{e}"),
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            host: get("MARKER_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            database_url: require("DATABASE_URL")?,
            identity_api_url: get("IDENTITY_API_URL")
                .unwrap_or_else(|| DEFAULT_IDENTITY_API_URL.to_string()),
            identity_secret_key: require("IDENTITY_SECRET_KEY")?,
        })
    }
}

// シークレットを含むため手動実装
impl fmt::Debug for MarkerServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarkerServiceConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database_url", &"[REDACTED]")
            .field("identity_api_url", &self.identity_api_url)
            .field("identity_secret_key", &"[REDACTED]")
            .finish()
    }
}
