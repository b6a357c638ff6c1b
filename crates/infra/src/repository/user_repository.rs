//! # UserRepository
//!
//! ユーザー情報の永続化を担当するリポジトリ。
//!
//! ユーザー ID は ID プロバイダの文字列 ID をそのまま主キーにする。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mapmark_domain::{
    user::{Email, User, UserId},
    value_objects::UserName,
};
use sqlx::PgPool;

use super::conflict_on_unique_violation;
use crate::{db::TxContext, error::InfraError};

/// ユーザーリポジトリトレイト
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// ユーザーが存在するか
    async fn exists(&self, id: &UserId) -> Result<bool, InfraError>;

    /// ID でユーザーを検索
    ///
    /// # 戻り値
    ///
    /// - `Ok(Some(user))`: ユーザーが見つかった場合
    /// - `Ok(None)`: ユーザーが見つからない場合
    /// - `Err(_)`: データベースエラー
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, InfraError>;

    /// ユーザーを挿入する
    ///
    /// 同じ ID のユーザーがすでに存在する場合は Conflict を返す。
    async fn insert(&self, tx: &mut TxContext, user: &User) -> Result<(), InfraError>;
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id:         String,
    username:   String,
    email:      String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = InfraError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User::new(
            UserId::new(row.id)?,
            UserName::new(row.username)?,
            Email::new(row.email)?,
            row.created_at,
        ))
    }
}

/// PostgreSQL 実装の UserRepository
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn exists(&self, id: &UserId) -> Result<bool, InfraError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
                .bind(id.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, InfraError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, email, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(id = %user.id()))]
    async fn insert(&self, tx: &mut TxContext, user: &User) -> Result<(), InfraError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(user.id().as_str())
        .bind(user.username().as_str())
        .bind(user.email().as_str())
        .bind(user.created_at())
        .execute(tx.conn())
        .await
        .map_err(conflict_on_unique_violation("User", user.id().to_string()))?;

        Ok(())
    }
}
