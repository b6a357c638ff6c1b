//! # テスト用モック
//!
//! ユースケーステストで使用するインメモリのリポジトリと ID プロバイダ。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! mapmark-infra = { workspace = true, features = ["test-utils"] }
//! ```
//!
//! トランザクションは模倣しない。書き込みは呼び出した時点で反映される。

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use mapmark_domain::{
    marker::{Marker, MarkerId, MarkerRecord},
    request::{Request, RequestId},
    submission::{Submission, ValidSubmission},
    user::{User, UserId},
    value_objects::ResourceUrl,
};

use crate::{
    db::{TransactionManager, TxContext},
    error::InfraError,
    identity::{IdentityError, IdentityProfile, IdentityResolver},
    repository::{MarkerRepository, RequestRepository, SubmissionRepository, UserRepository},
};

// ===== MockTransactionManager =====

#[derive(Clone, Default)]
pub struct MockTransactionManager;

#[async_trait]
impl TransactionManager for MockTransactionManager {
    async fn begin(&self) -> Result<TxContext, InfraError> {
        Ok(TxContext::mock())
    }
}

// ===== MockUserRepository =====

#[derive(Clone, Default)]
pub struct MockUserRepository {
    users: Arc<Mutex<Vec<User>>>,
}

impl MockUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, user: User) {
        self.users.lock().unwrap().push(user);
    }

    pub fn users(&self) -> Vec<User> {
        self.users.lock().unwrap().clone()
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn exists(&self, id: &UserId) -> Result<bool, InfraError> {
        Ok(self.users.lock().unwrap().iter().any(|u| u.id() == id))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, InfraError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id() == id)
            .cloned())
    }

    async fn insert(&self, _tx: &mut TxContext, user: &User) -> Result<(), InfraError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.id() == user.id()) {
            return Err(InfraError::conflict("User", user.id().to_string()));
        }
        users.push(user.clone());
        Ok(())
    }
}

// ===== MockRequestRepository =====

#[derive(Clone, Default)]
pub struct MockRequestRepository {
    requests: Arc<Mutex<Vec<Request>>>,
}

impl MockRequestRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_request(&self, request: Request) {
        self.requests.lock().unwrap().push(request);
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl RequestRepository for MockRequestRepository {
    async fn find_all(&self) -> Result<Vec<Request>, InfraError> {
        Ok(self.requests.lock().unwrap().clone())
    }

    async fn find_by_id(&self, id: &RequestId) -> Result<Option<Request>, InfraError> {
        Ok(self
            .requests
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id() == id)
            .cloned())
    }

    async fn exists(&self, id: &RequestId) -> Result<bool, InfraError> {
        Ok(self.requests.lock().unwrap().iter().any(|r| r.id() == id))
    }

    async fn insert(&self, _tx: &mut TxContext, request: &Request) -> Result<(), InfraError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(())
    }

    async fn lock_for_approval(
        &self,
        _tx: &mut TxContext,
        id: &RequestId,
    ) -> Result<Option<Request>, InfraError> {
        self.find_by_id(id).await
    }

    async fn delete(&self, _tx: &mut TxContext, id: &RequestId) -> Result<bool, InfraError> {
        let mut requests = self.requests.lock().unwrap();
        let before = requests.len();
        requests.retain(|r| r.id() != id);
        Ok(requests.len() < before)
    }
}

// ===== MockMarkerRepository =====

#[derive(Clone, Default)]
pub struct MockMarkerRepository {
    markers: Arc<Mutex<Vec<Marker>>>,
    gallery: Arc<Mutex<HashMap<MarkerId, Vec<(i32, ResourceUrl)>>>>,
}

impl MockMarkerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// ギャラリー画像を含めてマーカーを登録する
    pub fn add_marker(&self, marker: Marker) {
        let images = marker
            .gallery_images()
            .iter()
            .enumerate()
            .map(|(position, url)| (position as i32, url.clone()))
            .collect();
        self.gallery
            .lock()
            .unwrap()
            .insert(marker.id().clone(), images);
        self.markers.lock().unwrap().push(marker);
    }

    /// 本体と、別途挿入されたギャラリー画像を合成する
    fn hydrate(&self, marker: &Marker) -> Marker {
        let gallery = self.gallery.lock().unwrap();
        let mut images = gallery.get(marker.id()).cloned().unwrap_or_default();
        images.sort_by_key(|(position, _)| *position);

        Marker::from_db(MarkerRecord {
            id:             marker.id().clone(),
            title:          marker.title().clone(),
            description:    marker.description().clone(),
            latlng:         marker.latlng(),
            is_empty:       marker.is_empty(),
            banner_image:   marker.banner_image().cloned(),
            gallery_images: images.into_iter().map(|(_, url)| url).collect(),
            published_at:   marker.published_at(),
        })
    }
}

#[async_trait]
impl MarkerRepository for MockMarkerRepository {
    async fn find_all(&self) -> Result<Vec<Marker>, InfraError> {
        let markers = self.markers.lock().unwrap().clone();
        Ok(markers.iter().map(|m| self.hydrate(m)).collect())
    }

    async fn find_by_id(&self, id: &MarkerId) -> Result<Option<Marker>, InfraError> {
        let marker = self
            .markers
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.id() == id)
            .cloned();
        Ok(marker.map(|m| self.hydrate(&m)))
    }

    async fn exists(&self, id: &MarkerId) -> Result<bool, InfraError> {
        Ok(self.markers.lock().unwrap().iter().any(|m| m.id() == id))
    }

    async fn insert(&self, _tx: &mut TxContext, marker: &Marker) -> Result<(), InfraError> {
        let mut markers = self.markers.lock().unwrap();
        if markers.iter().any(|m| m.id() == marker.id()) {
            return Err(InfraError::conflict("Marker", marker.id().to_string()));
        }
        markers.push(marker.clone());
        Ok(())
    }

    async fn insert_gallery_image(
        &self,
        _tx: &mut TxContext,
        marker_id: &MarkerId,
        position: i32,
        image_url: &ResourceUrl,
    ) -> Result<(), InfraError> {
        self.gallery
            .lock()
            .unwrap()
            .entry(marker_id.clone())
            .or_default()
            .push((position, image_url.clone()));
        Ok(())
    }
}

// ===== MockSubmissionRepository =====

#[derive(Clone, Default)]
pub struct MockSubmissionRepository {
    submissions:       Arc<Mutex<Vec<Submission>>>,
    valid_submissions: Arc<Mutex<Vec<ValidSubmission>>>,
}

impl MockSubmissionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().unwrap().clone()
    }

    pub fn valid_submissions(&self) -> Vec<ValidSubmission> {
        self.valid_submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl SubmissionRepository for MockSubmissionRepository {
    async fn record_submission(
        &self,
        _tx: &mut TxContext,
        submission: &Submission,
    ) -> Result<(), InfraError> {
        self.submissions.lock().unwrap().push(submission.clone());
        Ok(())
    }

    async fn record_valid_submission(
        &self,
        _tx: &mut TxContext,
        valid_submission: &ValidSubmission,
    ) -> Result<(), InfraError> {
        self.valid_submissions
            .lock()
            .unwrap()
            .push(valid_submission.clone());
        Ok(())
    }

    async fn find_submitted_request_ids(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<RequestId>, InfraError> {
        Ok(self
            .submissions
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.user_id() == user_id)
            .map(|s| s.request_id().clone())
            .collect())
    }

    async fn find_approved_request_ids(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<RequestId>, InfraError> {
        Ok(self
            .valid_submissions
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.user_id() == user_id)
            .map(|s| s.request_id().clone())
            .collect())
    }
}

// ===== MockIdentityResolver =====

/// 登録済みのプロフィールを返す ID プロバイダ
///
/// 未登録の ID には `NotFound`、[`unavailable`](Self::unavailable) で作成した場合は
/// 常に `ServiceUnavailable` を返す。呼び出し回数を記録する。
#[derive(Clone, Default)]
pub struct MockIdentityResolver {
    profiles:    Arc<Mutex<Vec<IdentityProfile>>>,
    unavailable: bool,
    calls:       Arc<Mutex<usize>>,
}

impl MockIdentityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn add_profile(&self, profile: IdentityProfile) {
        self.profiles.lock().unwrap().push(profile);
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl IdentityResolver for MockIdentityResolver {
    async fn resolve(&self, user_id: &str) -> Result<IdentityProfile, IdentityError> {
        *self.calls.lock().unwrap() += 1;

        if self.unavailable {
            return Err(IdentityError::ServiceUnavailable);
        }

        self.profiles
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == user_id)
            .cloned()
            .ok_or_else(|| IdentityError::NotFound(user_id.to_string()))
    }
}
