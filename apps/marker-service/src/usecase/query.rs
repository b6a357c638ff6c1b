//! マーカー・申請の参照ユースケース
//!
//! 読み取り専用。UUID として解釈できない ID は何にも一致しない（`NotFound`）。

use std::sync::Arc;

use mapmark_domain::{
    marker::{Marker, MarkerId},
    request::{Request, RequestId},
};
use mapmark_infra::repository::{MarkerRepository, RequestRepository};

use crate::{
    error::CoreError,
    usecase::helpers::{FindResultExt, not_found},
};

/// 参照ユースケース
pub struct QueryUseCaseImpl {
    marker_repo:  Arc<dyn MarkerRepository>,
    request_repo: Arc<dyn RequestRepository>,
}

impl QueryUseCaseImpl {
    pub fn new(
        marker_repo: Arc<dyn MarkerRepository>,
        request_repo: Arc<dyn RequestRepository>,
    ) -> Self {
        Self {
            marker_repo,
            request_repo,
        }
    }

    /// 公開済みマーカーの一覧（ギャラリー画像付き、公開日時順）
    pub async fn list_markers(&self) -> Result<Vec<Marker>, CoreError> {
        Ok(self.marker_repo.find_all().await?)
    }

    /// マーカーを 1 件取得する
    pub async fn get_marker(&self, id: &str) -> Result<Marker, CoreError> {
        let id = MarkerId::parse(id).ok_or_else(|| not_found("Marker"))?;
        self.marker_repo.find_by_id(&id).await.or_not_found("Marker")
    }

    /// 承認待ち申請の一覧（投稿日時順）
    pub async fn list_requests(&self) -> Result<Vec<Request>, CoreError> {
        Ok(self.request_repo.find_all().await?)
    }

    /// 申請を 1 件取得する
    pub async fn get_request(&self, id: &str) -> Result<Request, CoreError> {
        let id = RequestId::parse(id).ok_or_else(|| not_found("Request"))?;
        self.request_repo.find_by_id(&id).await.or_not_found("Request")
    }
}
