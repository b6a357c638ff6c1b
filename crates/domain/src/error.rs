//! # ドメイン層エラー定義
//!
//! ビジネスルール違反やドメイン固有の例外状態を表現するエラー型。
//!
//! 存在確認や一意制約の競合はリポジトリとユースケースの責務であり、
//! ドメイン層が扱うのは値の検証失敗のみ。API 層で 400 Bad Request に変換される。
//!
//! ## 使用例
//!
//! ```rust
//! use mapmark_domain::DomainError;
//!
//! fn validate_title(title: &str) -> Result<(), DomainError> {
//!     if title.is_empty() {
//!         return Err(DomainError::Validation("タイトルは必須です".to_string()));
//!     }
//!     Ok(())
//! }
//!
//! assert!(validate_title("").is_err());
//! ```

use thiserror::Error;

/// ドメイン層で発生するエラー
///
/// API 層でこのエラーを受け取り、適切な HTTP レスポンスに変換する。
#[derive(Debug, Error)]
pub enum DomainError {
    /// バリデーションエラー
    ///
    /// 必須フィールドの欠落、文字数超過、座標の範囲外、不正な URL など。
    #[error("バリデーションエラー: {0}")]
    Validation(String),
}
