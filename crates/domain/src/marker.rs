//! # マーカー
//!
//! 承認済みで地図上に公開される地点情報。
//!
//! マーカーは承認ワークフローによってのみ作成され、ID は元の申請 ID と同じ。
//! 作成後に変更・削除されることはない。

use chrono::{DateTime, Utc};

use crate::{
    request::{Request, RequestId},
    value_objects::{Description, LatLng, ResourceUrl, Title},
};

define_uuid_id! {
    /// マーカーの一意識別子（元の申請 ID と同値）
    pub struct MarkerId;
}

impl From<&RequestId> for MarkerId {
    fn from(id: &RequestId) -> Self {
        Self::from_uuid(*id.as_uuid())
    }
}

/// マーカーエンティティ
///
/// # 不変条件
///
/// - `id` は承認された申請の ID と一致する
/// - `gallery_images` は登録順（position 昇順）
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    id:             MarkerId,
    title:          Title,
    description:    Description,
    latlng:         LatLng,
    is_empty:       bool,
    banner_image:   Option<ResourceUrl>,
    gallery_images: Vec<ResourceUrl>,
    published_at:   DateTime<Utc>,
}

/// マーカーの DB 復元パラメータ
pub struct MarkerRecord {
    pub id:             MarkerId,
    pub title:          Title,
    pub description:    Description,
    pub latlng:         LatLng,
    pub is_empty:       bool,
    pub banner_image:   Option<ResourceUrl>,
    pub gallery_images: Vec<ResourceUrl>,
    pub published_at:   DateTime<Utc>,
}

impl Marker {
    /// 申請を公開用のマーカーに変換する
    ///
    /// 地図 URL はマーカーに引き継がない。
    pub fn publish(request: &Request, now: DateTime<Utc>) -> Self {
        Self {
            id:             MarkerId::from(request.id()),
            title:          request.title().clone(),
            description:    request.description().clone(),
            latlng:         request.latlng(),
            is_empty:       request.is_empty(),
            banner_image:   request.banner_image().cloned(),
            gallery_images: request.gallery_images().to_vec(),
            published_at:   now,
        }
    }

    /// 既存のデータから復元する
    pub fn from_db(record: MarkerRecord) -> Self {
        Self {
            id:             record.id,
            title:          record.title,
            description:    record.description,
            latlng:         record.latlng,
            is_empty:       record.is_empty,
            banner_image:   record.banner_image,
            gallery_images: record.gallery_images,
            published_at:   record.published_at,
        }
    }

    // Getter メソッド

    pub fn id(&self) -> &MarkerId {
        &self.id
    }

    pub fn title(&self) -> &Title {
        &self.title
    }

    pub fn description(&self) -> &Description {
        &self.description
    }

    pub fn latlng(&self) -> LatLng {
        self.latlng
    }

    pub fn is_empty(&self) -> bool {
        self.is_empty
    }

    pub fn banner_image(&self) -> Option<&ResourceUrl> {
        self.banner_image.as_ref()
    }

    pub fn gallery_images(&self) -> &[ResourceUrl] {
        &self.gallery_images
    }

    pub fn published_at(&self) -> DateTime<Utc> {
        self.published_at
    }
}
