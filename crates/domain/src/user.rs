//! # ユーザー
//!
//! ユーザーエンティティとそれに関連する値オブジェクトを定義する。
//!
//! ## 設計方針
//!
//! - **外部 ID をそのまま採用**: [`UserId`] は ID プロバイダが払い出す文字列
//!   （例: `user_2abc...`）で、UUID ではない
//! - **不変性**: 登録後に変更しない
//!
//! ## 使用例
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use mapmark_domain::{
//!     user::{Email, User, UserId},
//!     value_objects::UserName,
//! };
//!
//! let user = User::new(
//!     UserId::new("user_2abc")?,
//!     UserName::new("hiker")?,
//!     Email::new("hiker@example.com")?,
//!     chrono::Utc::now(),
//! );
//! assert_eq!(user.id().as_str(), "user_2abc");
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{DomainError, value_objects::UserName};

define_validated_string! {
    /// ユーザー ID（ID プロバイダ発行の不透明な文字列）
    pub struct UserId {
        label: "ユーザー ID",
        max_length: 255,
    }
}

/// メールアドレスの最大長（DB: `VARCHAR(255)`）
const MAX_EMAIL_LENGTH: usize = 255;

/// メールアドレス（値オブジェクト）
///
/// `local@domain` の形式を要求する。
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    /// メールアドレスを作成する
    ///
    /// # バリデーション
    ///
    /// - 空文字列ではない
    /// - 制御文字を含まない
    /// - `@` の前後がどちらも空でない
    /// - 最大 255 文字
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into().trim().to_string();

        if value.is_empty() {
            return Err(DomainError::Validation(
                "メールアドレスは必須です".to_string(),
            ));
        }

        if value.chars().any(char::is_control) {
            return Err(DomainError::Validation(
                "メールアドレスに制御文字は使用できません".to_string(),
            ));
        }

        let Some((local, domain)) = value.split_once('@') else {
            return Err(DomainError::Validation(
                "メールアドレスの形式が不正です".to_string(),
            ));
        };

        if local.is_empty() || domain.is_empty() {
            return Err(DomainError::Validation(
                "メールアドレスの形式が不正です".to_string(),
            ));
        }

        if value.len() > MAX_EMAIL_LENGTH {
            return Err(DomainError::Validation(format!(
                "メールアドレスは{}文字以内である必要があります",
                MAX_EMAIL_LENGTH
            )));
        }

        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// PII のためログにはマスクして出力する
impl std::fmt::Debug for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Email").field(&"[REDACTED]").finish()
    }
}

/// ユーザーエンティティ
///
/// ID プロバイダで本人確認済みのプロフィールから作成される。
///
/// # 不変条件
///
/// - `id` は一意（ID プロバイダの ID）
/// - 申請・投稿記録・承認記録が参照する `user_id` は必ず既存ユーザー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id:         UserId,
    username:   UserName,
    email:      Email,
    created_at: DateTime<Utc>,
}

impl User {
    pub fn new(id: UserId, username: UserName, email: Email, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            username,
            email,
            created_at,
        }
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn username(&self) -> &UserName {
        &self.username
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
