//! # Marker Service エラー定義
//!
//! ユースケース層・ハンドラ層のエラーと、HTTP レスポンスへの変換を定義する。
//!
//! | バリアント | ステータス |
//! |---|---|
//! | `BadRequest` | 400 |
//! | `UnknownUser` | 401 |
//! | `RequestNotFound` | 401（承認対象の申請がない） |
//! | `NotFound` | 404 |
//! | `Conflict` | 409 |
//! | `Database` / `Internal` | 500 |
//! | `Identity` | 500 / 502 |
//!
//! レスポンスボディは `{ "error": "<メッセージ>" }`。
//! 5xx は固定メッセージを返し、詳細はサーバーログにのみ出力する。

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use mapmark_infra::{IdentityError, InfraError};
use mapmark_shared::{
    ErrorResponse,
    event_log::error::{category, kind},
};
use thiserror::Error;

/// ID プロバイダに到達できない場合のメッセージ
const IDENTITY_UNAVAILABLE_MESSAGE: &str = "Identity service unavailable";

/// Marker Service で発生するエラー
#[derive(Debug, Error)]
pub enum CoreError {
    /// 不正なリクエスト（ヘッダー欠落、JSON 不正、検証エラー）
    #[error("不正なリクエスト: {0}")]
    BadRequest(String),

    /// 存在しないユーザーからの投稿
    #[error("ユーザーが存在しません: {0}")]
    UnknownUser(String),

    /// 承認対象の申請が存在しない（承認済みを含む）
    #[error("申請が見つかりません: {0}")]
    RequestNotFound(String),

    /// リソースが見つからない
    #[error("リソースが見つかりません: {0}")]
    NotFound(String),

    /// 競合
    #[error("競合が発生しました: {0}")]
    Conflict(String),

    /// データベースエラー
    #[error("データベースエラー: {0}")]
    Database(#[from] InfraError),

    /// ID プロバイダエラー
    #[error("ID プロバイダエラー: {0}")]
    Identity(#[from] IdentityError),

    /// 内部エラー
    #[error("内部エラー: {0}")]
    Internal(String),
}

impl CoreError {
    /// HTTP ステータスコード
    pub fn status(&self) -> StatusCode {
        match self {
            CoreError::BadRequest(_) => StatusCode::BAD_REQUEST,
            CoreError::UnknownUser(_) | CoreError::RequestNotFound(_) => StatusCode::UNAUTHORIZED,
            CoreError::NotFound(_) => StatusCode::NOT_FOUND,
            CoreError::Conflict(_) => StatusCode::CONFLICT,
            CoreError::Identity(IdentityError::ServiceUnavailable) => StatusCode::BAD_GATEWAY,
            CoreError::Database(_) | CoreError::Identity(_) | CoreError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<JsonRejection> for CoreError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection, "リクエストボディの解析に失敗");
        CoreError::BadRequest("Invalid request body".to_string())
    }
}

impl IntoResponse for CoreError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            CoreError::BadRequest(msg)
            | CoreError::UnknownUser(msg)
            | CoreError::RequestNotFound(msg)
            | CoreError::NotFound(msg)
            | CoreError::Conflict(msg) => ErrorResponse::new(msg.clone()),
            CoreError::Database(e) => {
                tracing::error!(
                    error.category = category::INFRASTRUCTURE,
                    error.kind = kind::DATABASE,
                    span_trace = %e.span_trace(),
                    "データベースエラー: {}",
                    e
                );
                ErrorResponse::internal_error()
            }
            CoreError::Identity(e) => {
                tracing::error!(
                    error.category = category::EXTERNAL_SERVICE,
                    error.kind = kind::IDENTITY_LOOKUP,
                    "ID プロバイダエラー: {}",
                    e
                );
                match e {
                    IdentityError::ServiceUnavailable => {
                        ErrorResponse::new(IDENTITY_UNAVAILABLE_MESSAGE)
                    }
                    _ => ErrorResponse::internal_error(),
                }
            }
            CoreError::Internal(msg) => {
                tracing::error!(
                    error.category = category::INFRASTRUCTURE,
                    error.kind = kind::INTERNAL,
                    "内部エラー: {}",
                    msg
                );
                ErrorResponse::internal_error()
            }
        };

        (status, Json(body)).into_response()
    }
}
