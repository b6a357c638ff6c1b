//! # MarkerRepository
//!
//! 公開済みマーカーとギャラリー画像の永続化を担当するリポジトリ。
//!
//! 取得系はギャラリー画像を position 順で付与した状態で返す。
//! 一覧取得は N+1 を避けるため、画像を `ANY($1)` で一括取得してから振り分ける。

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mapmark_domain::{
    marker::{Marker, MarkerId, MarkerRecord},
    value_objects::{Description, LatLng, ResourceUrl, Title},
};
use sqlx::PgPool;
use uuid::Uuid;

use super::conflict_on_unique_violation;
use crate::{db::TxContext, error::InfraError};

/// マーカーリポジトリトレイト
#[async_trait]
pub trait MarkerRepository: Send + Sync {
    /// すべてのマーカーを公開日時順で取得する（ギャラリー画像付き）
    async fn find_all(&self) -> Result<Vec<Marker>, InfraError>;

    /// ID でマーカーを検索する（ギャラリー画像付き）
    async fn find_by_id(&self, id: &MarkerId) -> Result<Option<Marker>, InfraError>;

    /// マーカーが存在するか
    async fn exists(&self, id: &MarkerId) -> Result<bool, InfraError>;

    /// マーカー本体を挿入する
    ///
    /// ギャラリー画像は [`insert_gallery_image`](Self::insert_gallery_image) で別途挿入する。
    /// 同じ ID のマーカーがすでに存在する場合は Conflict を返す。
    async fn insert(&self, tx: &mut TxContext, marker: &Marker) -> Result<(), InfraError>;

    /// ギャラリー画像を 1 件挿入する
    async fn insert_gallery_image(
        &self,
        tx: &mut TxContext,
        marker_id: &MarkerId,
        position: i32,
        image_url: &ResourceUrl,
    ) -> Result<(), InfraError>;
}

#[derive(sqlx::FromRow)]
struct MarkerRow {
    id:           Uuid,
    title:        String,
    description:  String,
    latitude:     f64,
    longitude:    f64,
    is_empty:     bool,
    banner_image: Option<String>,
    published_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct GalleryImageRow {
    marker_id: Uuid,
    image_url: String,
}

impl MarkerRow {
    fn into_marker(self, gallery_images: Vec<String>) -> Result<Marker, InfraError> {
        Ok(Marker::from_db(MarkerRecord {
            id:             MarkerId::from_uuid(self.id),
            title:          Title::new(self.title)?,
            description:    Description::new(self.description)?,
            latlng:         LatLng::new(self.latitude, self.longitude)?,
            is_empty:       self.is_empty,
            banner_image:   self.banner_image.map(ResourceUrl::new).transpose()?,
            gallery_images: gallery_images
                .into_iter()
                .map(ResourceUrl::new)
                .collect::<Result<_, _>>()?,
            published_at:   self.published_at,
        }))
    }
}

const SELECT_MARKER: &str = r#"
    SELECT
        id,
        title,
        description,
        latitude,
        longitude,
        is_empty,
        banner_image,
        published_at
    FROM markers
"#;

/// PostgreSQL 実装の MarkerRepository
#[derive(Debug, Clone)]
pub struct PostgresMarkerRepository {
    pool: PgPool,
}

impl PostgresMarkerRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 指定マーカー群のギャラリー画像を position 順で取得し、マーカー ID ごとにまとめる
    async fn fetch_gallery_images(
        &self,
        marker_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<String>>, InfraError> {
        if marker_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, GalleryImageRow>(
            r#"
            SELECT marker_id, image_url
            FROM gallery_images
            WHERE marker_id = ANY($1)
            ORDER BY marker_id ASC, position ASC
            "#,
        )
        .bind(marker_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut images: HashMap<Uuid, Vec<String>> = HashMap::new();
        for row in rows {
            images.entry(row.marker_id).or_default().push(row.image_url);
        }
        Ok(images)
    }
}

#[async_trait]
impl MarkerRepository for PostgresMarkerRepository {
    #[tracing::instrument(skip_all, level = "debug")]
    async fn find_all(&self) -> Result<Vec<Marker>, InfraError> {
        let rows = sqlx::query_as::<_, MarkerRow>(&format!(
            "{SELECT_MARKER} ORDER BY published_at ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let mut images = self.fetch_gallery_images(&ids).await?;

        rows.into_iter()
            .map(|row| {
                let gallery = images.remove(&row.id).unwrap_or_default();
                row.into_marker(gallery)
            })
            .collect()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn find_by_id(&self, id: &MarkerId) -> Result<Option<Marker>, InfraError> {
        let row = sqlx::query_as::<_, MarkerRow>(&format!("{SELECT_MARKER} WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut images = self.fetch_gallery_images(&[row.id]).await?;
        let gallery = images.remove(&row.id).unwrap_or_default();
        row.into_marker(gallery).map(Some)
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn exists(&self, id: &MarkerId) -> Result<bool, InfraError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM markers WHERE id = $1)")
                .bind(id.as_uuid())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    #[tracing::instrument(skip_all, level = "debug", fields(id = %marker.id()))]
    async fn insert(&self, tx: &mut TxContext, marker: &Marker) -> Result<(), InfraError> {
        sqlx::query(
            r#"
            INSERT INTO markers (
                id, title, description, latitude, longitude,
                is_empty, banner_image, published_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(marker.id().as_uuid())
        .bind(marker.title().as_str())
        .bind(marker.description().as_str())
        .bind(marker.latlng().latitude())
        .bind(marker.latlng().longitude())
        .bind(marker.is_empty())
        .bind(marker.banner_image().map(ResourceUrl::as_str))
        .bind(marker.published_at())
        .execute(tx.conn())
        .await
        .map_err(conflict_on_unique_violation("Marker", marker.id().to_string()))?;

        Ok(())
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%marker_id, position))]
    async fn insert_gallery_image(
        &self,
        tx: &mut TxContext,
        marker_id: &MarkerId,
        position: i32,
        image_url: &ResourceUrl,
    ) -> Result<(), InfraError> {
        sqlx::query(
            r#"
            INSERT INTO gallery_images (marker_id, position, image_url)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(marker_id.as_uuid())
        .bind(position)
        .bind(image_url.as_str())
        .execute(tx.conn())
        .await?;

        Ok(())
    }
}
