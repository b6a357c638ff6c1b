//! # 申請
//!
//! ユーザーが投稿した、承認待ちの地点情報。
//!
//! 承認されると同じ ID の [`Marker`](crate::marker::Marker) として公開され、
//! 申請自体は削除される。
//!
//! ## ギャラリー画像
//!
//! 投稿経路ではギャラリー画像を受け付けない。承認経路は
//! `request_gallery_images` に登録済みの画像を読み、マーカーへ引き継ぐ。
//!
//! ## 使用例
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use mapmark_domain::{
//!     request::{NewRequest, Request, RequestId},
//!     user::UserId,
//!     value_objects::{Description, LatLng, Title},
//! };
//!
//! let request = Request::new(NewRequest {
//!     id:           RequestId::new(),
//!     user_id:      UserId::new("user_2abc")?,
//!     title:        Title::new("Trailhead")?,
//!     description:  Description::new("start of the loop")?,
//!     latlng:       LatLng::new(40.0, -105.2)?,
//!     map_url:      None,
//!     banner_image: None,
//!     is_empty:     false,
//!     now:          chrono::Utc::now(),
//! });
//!
//! assert_eq!(request.title().as_str(), "Trailhead");
//! assert!(request.gallery_images().is_empty());
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};

use crate::{
    user::UserId,
    value_objects::{Description, LatLng, ResourceUrl, Title},
};

define_uuid_id! {
    /// 申請の一意識別子
    ///
    /// 承認後はマーカー ID としてそのまま引き継がれる。
    pub struct RequestId;
}

/// 申請エンティティ
///
/// # 不変条件
///
/// - `user_id` は既存ユーザーを参照する
/// - 承認済みの ID は申請として存在しない
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    id:             RequestId,
    user_id:        UserId,
    title:          Title,
    description:    Description,
    latlng:         LatLng,
    map_url:        Option<ResourceUrl>,
    banner_image:   Option<ResourceUrl>,
    is_empty:       bool,
    gallery_images: Vec<ResourceUrl>,
    submitted_at:   DateTime<Utc>,
}

/// 申請の新規作成パラメータ
pub struct NewRequest {
    pub id:           RequestId,
    pub user_id:      UserId,
    pub title:        Title,
    pub description:  Description,
    pub latlng:       LatLng,
    pub map_url:      Option<ResourceUrl>,
    pub banner_image: Option<ResourceUrl>,
    pub is_empty:     bool,
    pub now:          DateTime<Utc>,
}

/// 申請の DB 復元パラメータ
pub struct RequestRecord {
    pub id:             RequestId,
    pub user_id:        UserId,
    pub title:          Title,
    pub description:    Description,
    pub latlng:         LatLng,
    pub map_url:        Option<ResourceUrl>,
    pub banner_image:   Option<ResourceUrl>,
    pub is_empty:       bool,
    pub gallery_images: Vec<ResourceUrl>,
    pub submitted_at:   DateTime<Utc>,
}

impl Request {
    /// 新しい申請を作成する
    ///
    /// 投稿時点ではギャラリー画像は常に空。
    pub fn new(params: NewRequest) -> Self {
        Self {
            id:             params.id,
            user_id:        params.user_id,
            title:          params.title,
            description:    params.description,
            latlng:         params.latlng,
            map_url:        params.map_url,
            banner_image:   params.banner_image,
            is_empty:       params.is_empty,
            gallery_images: Vec::new(),
            submitted_at:   params.now,
        }
    }

    /// 既存のデータから復元する
    pub fn from_db(record: RequestRecord) -> Self {
        Self {
            id:             record.id,
            user_id:        record.user_id,
            title:          record.title,
            description:    record.description,
            latlng:         record.latlng,
            map_url:        record.map_url,
            banner_image:   record.banner_image,
            is_empty:       record.is_empty,
            gallery_images: record.gallery_images,
            submitted_at:   record.submitted_at,
        }
    }

    // Getter メソッド

    pub fn id(&self) -> &RequestId {
        &self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
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

    pub fn map_url(&self) -> Option<&ResourceUrl> {
        self.map_url.as_ref()
    }

    pub fn banner_image(&self) -> Option<&ResourceUrl> {
        self.banner_image.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.is_empty
    }

    /// 承認時にマーカーへ引き継ぐギャラリー画像（登録順）
    pub fn gallery_images(&self) -> &[ResourceUrl] {
        &self.gallery_images
    }

    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn new_params(id: RequestId, now: DateTime<Utc>) -> NewRequest {
        NewRequest {
            id,
            user_id: UserId::new("user_2abc").unwrap(),
            title: Title::new("Trailhead").unwrap(),
            description: Description::new("start of the loop").unwrap(),
            latlng: LatLng::new(40.0, -105.2).unwrap(),
            map_url: Some(ResourceUrl::new("https://maps.example.com/trailhead").unwrap()),
            banner_image: None,
            is_empty: false,
            now,
        }
    }

    #[rstest]
    fn test_新規作成の初期状態(now: DateTime<Utc>) {
        let id = RequestId::new();

        let sut = Request::new(new_params(id.clone(), now));

        let expected = Request::from_db(RequestRecord {
            id,
            user_id: UserId::new("user_2abc").unwrap(),
            title: Title::new("Trailhead").unwrap(),
            description: Description::new("start of the loop").unwrap(),
            latlng: LatLng::new(40.0, -105.2).unwrap(),
            map_url: Some(ResourceUrl::new("https://maps.example.com/trailhead").unwrap()),
            banner_image: None,
            is_empty: false,
            gallery_images: Vec::new(),
            submitted_at: now,
        });
        assert_eq!(sut, expected);
    }

    #[rstest]
    fn test_復元時はギャラリー画像の順序を保持する(now: DateTime<Utc>) {
        let images = vec![
            ResourceUrl::new("https://images.example.com/1.jpg").unwrap(),
            ResourceUrl::new("https://images.example.com/2.jpg").unwrap(),
        ];
        let NewRequest {
            id,
            user_id,
            title,
            description,
            latlng,
            map_url,
            banner_image,
            is_empty,
            now,
        } = new_params(RequestId::new(), now);

        let sut = Request::from_db(RequestRecord {
            id,
            user_id,
            title,
            description,
            latlng,
            map_url,
            banner_image,
            is_empty,
            gallery_images: images.clone(),
            submitted_at: now,
        });

        assert_eq!(sut.gallery_images(), images.as_slice());
    }

    #[test]
    fn test_uuidでない文字列はidとして解釈されない() {
        assert_eq!(RequestId::parse("r1"), None);
        assert_eq!(RequestId::parse(""), None);
    }

    #[test]
    fn test_idは文字列表現から復元できる() {
        let id = RequestId::new();

        assert_eq!(RequestId::parse(&id.to_string()), Some(id));
    }
}
