//! # リポジトリ実装
//!
//! ユーザー・申請・マーカー・投稿記録の永続化を提供する。
//!
//! - 読み取りメソッドはプールから直接実行する
//! - 書き込みメソッドは `&mut TxContext` を要求する
//! - すべてのメソッドに `#[tracing::instrument]` を付け、
//!   エラーの SpanTrace に操作名が残るようにする

pub mod marker_repository;
pub mod request_repository;
pub mod submission_repository;
pub mod user_repository;

pub use marker_repository::{MarkerRepository, PostgresMarkerRepository};
pub use request_repository::{PostgresRequestRepository, RequestRepository};
pub use submission_repository::{PostgresSubmissionRepository, SubmissionRepository};
pub use user_repository::{PostgresUserRepository, UserRepository};

use crate::error::InfraError;

/// 一意制約違反を Conflict に、それ以外を Database エラーに変換する
pub(crate) fn conflict_on_unique_violation(
    entity: &'static str,
    id: String,
) -> impl FnOnce(sqlx::Error) -> InfraError {
    move |e| {
        let is_unique_violation =
            matches!(&e, sqlx::Error::Database(db) if db.is_unique_violation());
        if is_unique_violation {
            InfraError::conflict(entity, id)
        } else {
            InfraError::from(e)
        }
    }
}
