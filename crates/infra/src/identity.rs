//! # ID プロバイダクライアント
//!
//! 外部ユーザー ID から本人確認済みのプロフィール（ユーザー名・メールアドレス）を取得する。
//! ユーザー登録時にのみ使用する。
//!
//! ## エンドポイント
//!
//! - `GET {base_url}/v1/users/{user_id}` - Clerk Backend API のユーザー取得
//!
//! 認証は `Authorization: Bearer {secret_key}`。

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// 1 リクエストあたりのタイムアウト
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// ID プロバイダから取得したプロフィール
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityProfile {
    pub id:       String,
    /// ユーザー名。プロバイダにない場合はメールアドレス
    pub username: String,
    pub email:    String,
}

/// ID プロバイダクライアントエラー
#[derive(Debug, Clone, Error)]
pub enum IdentityError {
    /// ユーザーが存在しない（404）
    #[error("ID プロバイダにユーザーが存在しません: {0}")]
    NotFound(String),

    /// ID プロバイダに到達できない（接続失敗、タイムアウト、503）
    #[error("ID プロバイダが一時的に利用できません")]
    ServiceUnavailable,

    /// 予期しないエラー
    #[error("予期しないエラー: {0}")]
    Unexpected(String),
}

impl From<reqwest::Error> for IdentityError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            IdentityError::ServiceUnavailable
        } else {
            IdentityError::Unexpected(err.to_string())
        }
    }
}

/// ID プロバイダトレイト
///
/// テスト時にスタブを使用できるようトレイトで定義。
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// 外部ユーザー ID からプロフィールを取得する
    async fn resolve(&self, user_id: &str) -> Result<IdentityProfile, IdentityError>;
}

// --- レスポンス型 ---

#[derive(Debug, Deserialize)]
struct ClerkUser {
    id:                       String,
    username:                 Option<String>,
    primary_email_address_id: Option<String>,
    #[serde(default)]
    email_addresses:          Vec<ClerkEmailAddress>,
}

#[derive(Debug, Deserialize)]
struct ClerkEmailAddress {
    id:            String,
    email_address: String,
}

impl ClerkUser {
    /// プライマリのメールアドレス（未設定なら先頭のもの）を返す
    fn primary_email(&self) -> Option<&str> {
        let primary = self.primary_email_address_id.as_deref().and_then(|primary_id| {
            self.email_addresses
                .iter()
                .find(|address| address.id == primary_id)
        });

        primary
            .or_else(|| self.email_addresses.first())
            .map(|address| address.email_address.as_str())
    }

    fn into_profile(self) -> Result<IdentityProfile, IdentityError> {
        let email = self
            .primary_email()
            .ok_or_else(|| {
                IdentityError::Unexpected(format!(
                    "メールアドレスが登録されていません: {}",
                    self.id
                ))
            })?
            .to_string();

        let username = self
            .username
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| email.clone());

        Ok(IdentityProfile {
            id: self.id,
            username,
            email,
        })
    }
}

/// Clerk Backend API を使う IdentityResolver 実装
pub struct ClerkIdentityResolver {
    base_url:   String,
    secret_key: String,
    client:     reqwest::Client,
}

impl ClerkIdentityResolver {
    /// 新しいクライアントを作成する
    ///
    /// # 引数
    ///
    /// - `base_url`: API のベース URL（例: `https://api.clerk.com`）
    /// - `secret_key`: Backend API のシークレットキー
    pub fn new(base_url: &str, secret_key: impl Into<String>) -> Self {
        Self {
            base_url:   base_url.trim_end_matches('/').to_string(),
            secret_key: secret_key.into(),
            client:     reqwest::Client::new(),
        }
    }

    fn user_url(&self, user_id: &str) -> Result<reqwest::Url, IdentityError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| IdentityError::Unexpected(format!("ベース URL が不正です: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| IdentityError::Unexpected("ベース URL にパスを追加できません".into()))?
            .pop_if_empty()
            .extend(["v1", "users", user_id]);
        Ok(url)
    }
}

#[async_trait]
impl IdentityResolver for ClerkIdentityResolver {
    #[tracing::instrument(skip_all, level = "debug", fields(%user_id))]
    async fn resolve(&self, user_id: &str) -> Result<IdentityProfile, IdentityError> {
        let url = self.user_url(user_id)?;

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.secret_key)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                let user = response.json::<ClerkUser>().await?;
                user.into_profile()
            }
            reqwest::StatusCode::NOT_FOUND => Err(IdentityError::NotFound(user_id.to_string())),
            reqwest::StatusCode::SERVICE_UNAVAILABLE
            | reqwest::StatusCode::BAD_GATEWAY
            | reqwest::StatusCode::GATEWAY_TIMEOUT => Err(IdentityError::ServiceUnavailable),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(IdentityError::Unexpected(format!(
                    "予期しないステータス {}: {}",
                    status, body
                )))
            }
        }
    }
}
