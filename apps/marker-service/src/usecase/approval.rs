//! 申請の承認ユースケース
//!
//! 承認待ちの申請を公開マーカーへ昇格させる。
//! すべての書き込みを 1 つのトランザクションで行い、途中で失敗した場合は
//! 申請が承認待ちのまま残る（マーカー・ギャラリー画像・承認記録はいずれも残らない）。

use std::sync::Arc;

use mapmark_domain::{
    clock::Clock,
    marker::Marker,
    request::RequestId,
    submission::ValidSubmission,
};
use mapmark_infra::{
    db::TransactionManager,
    repository::{MarkerRepository, RequestRepository, SubmissionRepository},
};
use mapmark_shared::{event_log::event, log_business_event};

use crate::error::CoreError;

/// 承認対象が見つからない場合のメッセージ
const REQUEST_NOT_FOUND_MESSAGE: &str = "Marker not found";

/// 申請承認ユースケース
pub struct ApprovalUseCaseImpl {
    request_repo:    Arc<dyn RequestRepository>,
    marker_repo:     Arc<dyn MarkerRepository>,
    submission_repo: Arc<dyn SubmissionRepository>,
    tx_manager:      Arc<dyn TransactionManager>,
    clock:           Arc<dyn Clock>,
}

impl ApprovalUseCaseImpl {
    pub fn new(
        request_repo: Arc<dyn RequestRepository>,
        marker_repo: Arc<dyn MarkerRepository>,
        submission_repo: Arc<dyn SubmissionRepository>,
        tx_manager: Arc<dyn TransactionManager>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            request_repo,
            marker_repo,
            submission_repo,
            tx_manager,
            clock,
        }
    }

    /// 申請を承認してマーカーを公開する
    ///
    /// 1. 申請行をロックして取得（ギャラリー画像を含む）
    /// 2. マーカーを挿入
    /// 3. ギャラリー画像を順序どおりに挿入
    /// 4. 承認記録を挿入
    /// 5. 申請を削除
    ///
    /// UUID として解釈できない ID と承認済みの ID は `RequestNotFound` になる。
    /// 同じ ID の同時承認は行ロックにより 1 件だけが成功する。
    #[tracing::instrument(skip_all, fields(request_id = %request_id))]
    pub async fn approve(&self, request_id: &str) -> Result<Marker, CoreError> {
        if request_id.trim().is_empty() {
            return Err(CoreError::BadRequest("id parameter is required".to_string()));
        }
        let Some(request_id) = RequestId::parse(request_id) else {
            return Err(CoreError::RequestNotFound(REQUEST_NOT_FOUND_MESSAGE.to_string()));
        };

        let mut tx = self.tx_manager.begin().await?;

        let request = self
            .request_repo
            .lock_for_approval(&mut tx, &request_id)
            .await?
            .ok_or_else(|| CoreError::RequestNotFound(REQUEST_NOT_FOUND_MESSAGE.to_string()))?;

        let now = self.clock.now();
        let marker = Marker::publish(&request, now);

        self.marker_repo
            .insert(&mut tx, &marker)
            .await
            .map_err(|e| match e.as_conflict() {
                Some(_) => CoreError::Conflict(format!("Marker already exists: {}", marker.id())),
                None => CoreError::Database(e),
            })?;

        for (position, image_url) in marker.gallery_images().iter().enumerate() {
            let position = i32::try_from(position)
                .map_err(|_| CoreError::Internal("ギャラリー画像が多すぎます".to_string()))?;
            self.marker_repo
                .insert_gallery_image(&mut tx, marker.id(), position, image_url)
                .await?;
        }

        self.submission_repo
            .record_valid_submission(
                &mut tx,
                &ValidSubmission::new(request.user_id().clone(), request_id.clone(), now),
            )
            .await?;

        if !self.request_repo.delete(&mut tx, &request_id).await? {
            return Err(CoreError::RequestNotFound(REQUEST_NOT_FOUND_MESSAGE.to_string()));
        }

        tx.commit().await?;

        log_business_event!(
            event.category = event::category::APPROVAL,
            event.action = event::action::MARKER_APPROVED,
            event.entity_type = event::entity_type::MARKER,
            event.entity_id = %marker.id(),
            event.actor_id = %request.user_id(),
            event.result = event::result::SUCCESS,
            "申請を承認した"
        );

        Ok(marker)
    }
}
