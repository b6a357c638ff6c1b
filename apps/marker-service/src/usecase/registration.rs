//! ユーザー登録・プロフィール参照ユースケース
//!
//! 登録は冪等。既存ユーザーの再登録は ID プロバイダを呼ばずに成功する。

use std::sync::Arc;

use mapmark_domain::{
    clock::Clock,
    request::RequestId,
    user::{Email, User, UserId},
    value_objects::UserName,
};
use mapmark_infra::{
    IdentityResolver,
    db::TransactionManager,
    repository::{SubmissionRepository, UserRepository},
};
use mapmark_shared::{event_log::event, log_business_event};

use crate::{
    error::CoreError,
    usecase::helpers::{FindResultExt, not_found},
};

/// 登録結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// 新規に登録した
    Created,
    /// 登録済みだった
    AlreadyRegistered,
}

/// ユーザーと投稿・承認済み申請 ID の一覧
#[derive(Debug, Clone)]
pub struct UserProfile {
    pub user:              User,
    pub submissions:       Vec<RequestId>,
    pub valid_submissions: Vec<RequestId>,
}

/// ユーザー登録ユースケース
pub struct RegistrationUseCaseImpl {
    user_repo:       Arc<dyn UserRepository>,
    submission_repo: Arc<dyn SubmissionRepository>,
    identity:        Arc<dyn IdentityResolver>,
    tx_manager:      Arc<dyn TransactionManager>,
    clock:           Arc<dyn Clock>,
}

impl RegistrationUseCaseImpl {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        submission_repo: Arc<dyn SubmissionRepository>,
        identity: Arc<dyn IdentityResolver>,
        tx_manager: Arc<dyn TransactionManager>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            user_repo,
            submission_repo,
            identity,
            tx_manager,
            clock,
        }
    }

    /// 外部 ID のユーザーを登録する
    ///
    /// 1. 登録済みなら何もせず `AlreadyRegistered`
    /// 2. ID プロバイダからプロフィールを取得
    /// 3. ユーザーを保存（同時登録による一意制約違反は `AlreadyRegistered`）
    #[tracing::instrument(skip_all, fields(user_id = %external_user_id))]
    pub async fn register(
        &self,
        external_user_id: &str,
    ) -> Result<RegistrationOutcome, CoreError> {
        let user_id =
            UserId::new(external_user_id).map_err(|e| CoreError::BadRequest(e.to_string()))?;

        if self.user_repo.exists(&user_id).await? {
            return Ok(RegistrationOutcome::AlreadyRegistered);
        }

        let profile = self.identity.resolve(user_id.as_str()).await?;

        // プロバイダ側のデータ不備は 500
        let username = UserName::new(profile.username)
            .map_err(|e| CoreError::Internal(format!("ユーザー名が不正です: {}", e)))?;
        let email = Email::new(profile.email)
            .map_err(|e| CoreError::Internal(format!("メールアドレスが不正です: {}", e)))?;
        let user = User::new(user_id, username, email, self.clock.now());

        let mut tx = self.tx_manager.begin().await?;
        if let Err(e) = self.user_repo.insert(&mut tx, &user).await {
            if e.as_conflict().is_some() {
                return Ok(RegistrationOutcome::AlreadyRegistered);
            }
            return Err(e.into());
        }
        tx.commit().await?;

        log_business_event!(
            event.category = event::category::USER,
            event.action = event::action::USER_REGISTERED,
            event.entity_type = event::entity_type::USER,
            event.entity_id = %user.id(),
            event.result = event::result::SUCCESS,
            "ユーザーを登録した"
        );

        Ok(RegistrationOutcome::Created)
    }

    /// ユーザーと投稿・承認済み申請 ID を取得する
    pub async fn get_user(&self, id: &str) -> Result<UserProfile, CoreError> {
        let user_id = UserId::new(id).map_err(|_| not_found("User"))?;
        let user = self.user_repo.find_by_id(&user_id).await.or_not_found("User")?;

        let submissions = self
            .submission_repo
            .find_submitted_request_ids(&user_id)
            .await?;
        let valid_submissions = self
            .submission_repo
            .find_approved_request_ids(&user_id)
            .await?;

        Ok(UserProfile {
            user,
            submissions,
            valid_submissions,
        })
    }
}
