//! # エラーレスポンス
//!
//! 全エンドポイントで共通のエラーレスポンス構造体を提供する。
//!
//! ## 設計
//!
//! - `ErrorResponse` は純粋なデータ構造（`Serialize` / `Deserialize` のみ）
//! - axum の `IntoResponse` 変換はサービスの責務（shared に axum 依存を入れない）
//! - 形式は `{ "error": "<メッセージ>" }` で、既存モバイルクライアントの期待に合わせる

use serde::{Deserialize, Serialize};

/// 5xx で返す固定メッセージ（内部情報を漏らさないため）
const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// エラーレスポンス
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }

    /// 500 Internal Server Error 用
    ///
    /// メッセージは固定値。詳細はサーバーログにのみ出力する。
    pub fn internal_error() -> Self {
        Self::new(INTERNAL_ERROR_MESSAGE)
    }
}

/// 処理結果メッセージのみを返すレスポンス
///
/// `POST /user` などの `{ "message": "..." }` 形式で使用する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
