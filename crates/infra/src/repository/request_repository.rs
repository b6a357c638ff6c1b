//! # RequestRepository
//!
//! 承認待ち申請の永続化を担当するリポジトリ。
//!
//! ## 設計方針
//!
//! - **一覧・単体取得はギャラリー画像を読まない**: 投稿経路では画像が登録されないため
//! - **承認用の悲観的ロック**: [`RequestRepository::lock_for_approval`] は
//!   `SELECT ... FOR UPDATE` で申請行をロックし、ギャラリー画像も合わせて読む。
//!   同じ申請を同時に承認しようとした 2 つ目のトランザクションは、
//!   1 つ目のコミット後に行が消えていることを観測する

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mapmark_domain::{
    request::{Request, RequestId, RequestRecord},
    user::UserId,
    value_objects::{Description, LatLng, ResourceUrl, Title},
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{db::TxContext, error::InfraError};

/// 申請リポジトリトレイト
#[async_trait]
pub trait RequestRepository: Send + Sync {
    /// すべての申請を投稿日時順で取得する
    async fn find_all(&self) -> Result<Vec<Request>, InfraError>;

    /// ID で申請を検索する
    async fn find_by_id(&self, id: &RequestId) -> Result<Option<Request>, InfraError>;

    /// 申請が存在するか
    async fn exists(&self, id: &RequestId) -> Result<bool, InfraError>;

    /// 申請を挿入する
    async fn insert(&self, tx: &mut TxContext, request: &Request) -> Result<(), InfraError>;

    /// 承認のために申請行をロックして読み出す
    ///
    /// ギャラリー画像（登録順）を含む完全な申請を返す。
    /// 行が存在しない場合は `Ok(None)`。
    async fn lock_for_approval(
        &self,
        tx: &mut TxContext,
        id: &RequestId,
    ) -> Result<Option<Request>, InfraError>;

    /// 申請を削除する
    ///
    /// 行を削除した場合は `true`、対象がなかった場合は `false`。
    async fn delete(&self, tx: &mut TxContext, id: &RequestId) -> Result<bool, InfraError>;
}

#[derive(sqlx::FromRow)]
struct RequestRow {
    id:           Uuid,
    user_id:      String,
    title:        String,
    description:  String,
    latitude:     f64,
    longitude:    f64,
    map_url:      Option<String>,
    banner_image: Option<String>,
    is_empty:     bool,
    submitted_at: DateTime<Utc>,
}

impl RequestRow {
    fn into_request(self, gallery_images: Vec<String>) -> Result<Request, InfraError> {
        Ok(Request::from_db(RequestRecord {
            id:             RequestId::from_uuid(self.id),
            user_id:        UserId::new(self.user_id)?,
            title:          Title::new(self.title)?,
            description:    Description::new(self.description)?,
            latlng:         LatLng::new(self.latitude, self.longitude)?,
            map_url:        self.map_url.map(ResourceUrl::new).transpose()?,
            banner_image:   self.banner_image.map(ResourceUrl::new).transpose()?,
            is_empty:       self.is_empty,
            gallery_images: gallery_images
                .into_iter()
                .map(ResourceUrl::new)
                .collect::<Result<_, _>>()?,
            submitted_at:   self.submitted_at,
        }))
    }
}

const SELECT_REQUEST: &str = r#"
    SELECT
        id,
        user_id,
        title,
        description,
        latitude,
        longitude,
        map_url,
        banner_image,
        is_empty,
        submitted_at
    FROM requests
"#;

/// PostgreSQL 実装の RequestRepository
#[derive(Debug, Clone)]
pub struct PostgresRequestRepository {
    pool: PgPool,
}

impl PostgresRequestRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RequestRepository for PostgresRequestRepository {
    #[tracing::instrument(skip_all, level = "debug")]
    async fn find_all(&self) -> Result<Vec<Request>, InfraError> {
        let rows = sqlx::query_as::<_, RequestRow>(&format!(
            "{SELECT_REQUEST} ORDER BY submitted_at ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| row.into_request(Vec::new()))
            .collect()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn find_by_id(&self, id: &RequestId) -> Result<Option<Request>, InfraError> {
        let row = sqlx::query_as::<_, RequestRow>(&format!("{SELECT_REQUEST} WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| row.into_request(Vec::new())).transpose()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn exists(&self, id: &RequestId) -> Result<bool, InfraError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM requests WHERE id = $1)")
                .bind(id.as_uuid())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    #[tracing::instrument(skip_all, level = "debug", fields(id = %request.id()))]
    async fn insert(&self, tx: &mut TxContext, request: &Request) -> Result<(), InfraError> {
        sqlx::query(
            r#"
            INSERT INTO requests (
                id, user_id, title, description, latitude, longitude,
                map_url, banner_image, is_empty, submitted_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(request.id().as_uuid())
        .bind(request.user_id().as_str())
        .bind(request.title().as_str())
        .bind(request.description().as_str())
        .bind(request.latlng().latitude())
        .bind(request.latlng().longitude())
        .bind(request.map_url().map(ResourceUrl::as_str))
        .bind(request.banner_image().map(ResourceUrl::as_str))
        .bind(request.is_empty())
        .bind(request.submitted_at())
        .execute(tx.conn())
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn lock_for_approval(
        &self,
        tx: &mut TxContext,
        id: &RequestId,
    ) -> Result<Option<Request>, InfraError> {
        let row = sqlx::query_as::<_, RequestRow>(&format!(
            "{SELECT_REQUEST} WHERE id = $1 FOR UPDATE"
        ))
        .bind(id.as_uuid())
        .fetch_optional(tx.conn())
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let gallery_images = sqlx::query_scalar::<_, String>(
            r#"
            SELECT image_url
            FROM request_gallery_images
            WHERE request_id = $1
            ORDER BY position ASC
            "#,
        )
        .bind(id.as_uuid())
        .fetch_all(tx.conn())
        .await?;

        row.into_request(gallery_images).map(Some)
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn delete(&self, tx: &mut TxContext, id: &RequestId) -> Result<bool, InfraError> {
        let result = sqlx::query("DELETE FROM requests WHERE id = $1")
            .bind(id.as_uuid())
            .execute(tx.conn())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
