//! # SubmissionRepository
//!
//! 投稿記録（submissions）と承認記録（valid_submissions）の永続化。
//! どちらも追記専用で、更新・削除は提供しない。

use async_trait::async_trait;
use mapmark_domain::{
    request::RequestId,
    submission::{Submission, ValidSubmission},
    user::UserId,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{db::TxContext, error::InfraError};

/// 投稿記録リポジトリトレイト
#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    /// 投稿記録を追加する
    async fn record_submission(
        &self,
        tx: &mut TxContext,
        submission: &Submission,
    ) -> Result<(), InfraError>;

    /// 承認記録を追加する
    async fn record_valid_submission(
        &self,
        tx: &mut TxContext,
        valid_submission: &ValidSubmission,
    ) -> Result<(), InfraError>;

    /// ユーザーが投稿した申請 ID を投稿日時順で取得する
    async fn find_submitted_request_ids(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<RequestId>, InfraError>;

    /// ユーザーの承認済み申請 ID を承認日時順で取得する
    async fn find_approved_request_ids(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<RequestId>, InfraError>;
}

/// PostgreSQL 実装の SubmissionRepository
#[derive(Debug, Clone)]
pub struct PostgresSubmissionRepository {
    pool: PgPool,
}

impl PostgresSubmissionRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubmissionRepository for PostgresSubmissionRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(request_id = %submission.request_id()))]
    async fn record_submission(
        &self,
        tx: &mut TxContext,
        submission: &Submission,
    ) -> Result<(), InfraError> {
        sqlx::query(
            r#"
            INSERT INTO submissions (user_id, request_id, submitted_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(submission.user_id().as_str())
        .bind(submission.request_id().as_uuid())
        .bind(submission.submitted_at())
        .execute(tx.conn())
        .await?;

        Ok(())
    }

    #[tracing::instrument(
        skip_all,
        level = "debug",
        fields(request_id = %valid_submission.request_id())
    )]
    async fn record_valid_submission(
        &self,
        tx: &mut TxContext,
        valid_submission: &ValidSubmission,
    ) -> Result<(), InfraError> {
        sqlx::query(
            r#"
            INSERT INTO valid_submissions (user_id, request_id, approved_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(valid_submission.user_id().as_str())
        .bind(valid_submission.request_id().as_uuid())
        .bind(valid_submission.approved_at())
        .execute(tx.conn())
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%user_id))]
    async fn find_submitted_request_ids(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<RequestId>, InfraError> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT request_id
            FROM submissions
            WHERE user_id = $1
            ORDER BY submitted_at ASC, request_id ASC
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().map(RequestId::from_uuid).collect())
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%user_id))]
    async fn find_approved_request_ids(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<RequestId>, InfraError> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT request_id
            FROM valid_submissions
            WHERE user_id = $1
            ORDER BY approved_at ASC, request_id ASC
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().map(RequestId::from_uuid).collect())
    }
}
