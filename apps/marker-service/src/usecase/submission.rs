//! 申請の投稿ユースケース

use std::sync::Arc;

use mapmark_domain::{
    clock::Clock,
    request::{NewRequest, Request, RequestId},
    submission::Submission,
    user::UserId,
    value_objects::{Description, LatLng, ResourceUrl, Title},
};
use mapmark_infra::{
    db::TransactionManager,
    repository::{RequestRepository, SubmissionRepository, UserRepository},
};
use mapmark_shared::{event_log::event, log_business_event};

use crate::error::CoreError;

/// 申請投稿の入力
///
/// 値の検証はユースケース内で行う。空文字列の URL は未指定として扱う。
#[derive(Debug, Clone, Default)]
pub struct SubmitRequestInput {
    pub title:        String,
    pub description:  Option<String>,
    /// `(latitude, longitude)`。未指定は `(0, 0)`
    pub latlng:       Option<(f64, f64)>,
    pub map_url:      Option<String>,
    pub banner_image: Option<String>,
    pub is_empty:     bool,
}

/// 検証済みの投稿内容
struct ValidatedInput {
    title:        Title,
    description:  Description,
    latlng:       LatLng,
    map_url:      Option<ResourceUrl>,
    banner_image: Option<ResourceUrl>,
    is_empty:     bool,
}

impl SubmitRequestInput {
    fn validate(self) -> Result<ValidatedInput, CoreError> {
        let bad_request = |e: mapmark_domain::DomainError| CoreError::BadRequest(e.to_string());

        let title = Title::new(self.title).map_err(bad_request)?;
        let description = match self.description {
            Some(d) => Description::new(d).map_err(bad_request)?,
            None => Description::default(),
        };
        let latlng = match self.latlng {
            Some((latitude, longitude)) => LatLng::new(latitude, longitude).map_err(bad_request)?,
            None => LatLng::origin(),
        };

        Ok(ValidatedInput {
            title,
            description,
            latlng,
            map_url: optional_url(self.map_url)?,
            banner_image: optional_url(self.banner_image)?,
            is_empty: self.is_empty,
        })
    }
}

fn optional_url(value: Option<String>) -> Result<Option<ResourceUrl>, CoreError> {
    match value {
        Some(v) if !v.trim().is_empty() => ResourceUrl::new(v)
            .map(Some)
            .map_err(|e| CoreError::BadRequest(e.to_string())),
        _ => Ok(None),
    }
}

/// 申請投稿ユースケース
pub struct SubmissionUseCaseImpl {
    user_repo:       Arc<dyn UserRepository>,
    request_repo:    Arc<dyn RequestRepository>,
    submission_repo: Arc<dyn SubmissionRepository>,
    tx_manager:      Arc<dyn TransactionManager>,
    clock:           Arc<dyn Clock>,
}

impl SubmissionUseCaseImpl {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        request_repo: Arc<dyn RequestRepository>,
        submission_repo: Arc<dyn SubmissionRepository>,
        tx_manager: Arc<dyn TransactionManager>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            user_repo,
            request_repo,
            submission_repo,
            tx_manager,
            clock,
        }
    }

    /// 申請を投稿する
    ///
    /// 1. 入力値の検証（失敗時は書き込み前に BadRequest）
    /// 2. 投稿者の存在確認（存在しなければ UnknownUser）
    /// 3. 申請と投稿記録を単一トランザクションで保存
    #[tracing::instrument(skip_all, fields(user_id = %user_id))]
    pub async fn submit(
        &self,
        user_id: &str,
        input: SubmitRequestInput,
    ) -> Result<Request, CoreError> {
        let input = input.validate()?;

        // ユーザー ID として成立しない値は該当ユーザーなし
        let user_id =
            UserId::new(user_id).map_err(|_| CoreError::UnknownUser("User not found".to_string()))?;
        if !self.user_repo.exists(&user_id).await? {
            return Err(CoreError::UnknownUser("User not found".to_string()));
        }

        let now = self.clock.now();
        let request = Request::new(NewRequest {
            id: RequestId::new(),
            user_id: user_id.clone(),
            title: input.title,
            description: input.description,
            latlng: input.latlng,
            map_url: input.map_url,
            banner_image: input.banner_image,
            is_empty: input.is_empty,
            now,
        });
        let submission = Submission::new(user_id, request.id().clone(), now);

        let mut tx = self.tx_manager.begin().await?;
        self.request_repo.insert(&mut tx, &request).await?;
        self.submission_repo
            .record_submission(&mut tx, &submission)
            .await?;
        tx.commit().await?;

        log_business_event!(
            event.category = event::category::SUBMISSION,
            event.action = event::action::REQUEST_SUBMITTED,
            event.entity_type = event::entity_type::REQUEST,
            event.entity_id = %request.id(),
            event.actor_id = %request.user_id(),
            event.result = event::result::SUCCESS,
            "申請を受け付けた"
        );

        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use mapmark_domain::{
        clock::FixedClock,
        user::{Email, User, UserId},
        value_objects::UserName,
    };
    use mapmark_infra::mock::{
        MockRequestRepository,
        MockSubmissionRepository,
        MockTransactionManager,
        MockUserRepository,
    };
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    struct Fixture {
        users:       MockUserRepository,
        requests:    MockRequestRepository,
        submissions: MockSubmissionRepository,
        sut:         SubmissionUseCaseImpl,
    }

    fn fixture() -> Fixture {
        let users = MockUserRepository::new();
        let requests = MockRequestRepository::new();
        let submissions = MockSubmissionRepository::new();
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();

        users.add_user(User::new(
            UserId::new("user_1").unwrap(),
            UserName::new("alice").unwrap(),
            Email::new("alice@example.com").unwrap(),
            now,
        ));

        let sut = SubmissionUseCaseImpl::new(
            Arc::new(users.clone()),
            Arc::new(requests.clone()),
            Arc::new(submissions.clone()),
            Arc::new(MockTransactionManager),
            Arc::new(FixedClock::new(now)),
        );

        Fixture {
            users,
            requests,
            submissions,
            sut,
        }
    }

    fn trailhead() -> SubmitRequestInput {
        SubmitRequestInput {
            title: "Trailhead".to_string(),
            description: Some("North entrance".to_string()),
            latlng: Some((35.3606, 138.7274)),
            map_url: Some("https://maps.example.com/trailhead".to_string()),
            banner_image: None,
            is_empty: false,
        }
    }

    #[tokio::test]
    async fn test_submit_正常系で申請と投稿記録が保存される() {
        let f = fixture();

        let request = f.sut.submit("user_1", trailhead()).await.unwrap();

        assert_eq!(request.title().as_str(), "Trailhead");
        assert_eq!(request.user_id().as_str(), "user_1");
        assert_eq!(request.latlng().latitude(), 35.3606);
        assert!(request.gallery_images().is_empty());
        assert_eq!(f.requests.requests(), vec![request.clone()]);

        let submissions = f.submissions.submissions();
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].request_id(), request.id());
        assert_eq!(submissions[0].user_id().as_str(), "user_1");
    }

    #[tokio::test]
    async fn test_submit_未登録ユーザーはunknown_userで何も書き込まない() {
        let f = fixture();

        let err = f.sut.submit("user_ghost", trailhead()).await.unwrap_err();

        assert!(matches!(err, CoreError::UnknownUser(_)));
        assert!(f.requests.requests().is_empty());
        assert!(f.submissions.submissions().is_empty());
        assert_eq!(f.users.users().len(), 1);
    }

    #[tokio::test]
    async fn test_submit_latlng_省略時は原点になる() {
        let f = fixture();
        let input = SubmitRequestInput {
            title: "Somewhere".to_string(),
            ..Default::default()
        };

        let request = f.sut.submit("user_1", input).await.unwrap();

        assert_eq!(request.latlng(), LatLng::origin());
        assert_eq!(request.description().as_str(), "");
        assert_eq!(request.map_url(), None);
    }

    #[tokio::test]
    async fn test_submit_空文字列のurlは未指定として扱う() {
        let f = fixture();
        let input = SubmitRequestInput {
            map_url: Some(String::new()),
            banner_image: Some("  ".to_string()),
            ..trailhead()
        };

        let request = f.sut.submit("user_1", input).await.unwrap();

        assert_eq!(request.map_url(), None);
        assert_eq!(request.banner_image(), None);
    }

    #[rstest]
    #[case::タイトルが空(SubmitRequestInput { title: "  ".into(), ..Default::default() })]
    #[case::緯度が範囲外(SubmitRequestInput {
        title: "x".into(),
        latlng: Some((91.0, 0.0)),
        ..Default::default()
    })]
    #[case::urlのスキームが不正(SubmitRequestInput {
        title: "x".into(),
        map_url: Some("ftp://example.com/map".into()),
        ..Default::default()
    })]
    #[case::タイトルにnulを含む(SubmitRequestInput {
        title: "Trail\u{0}head".into(),
        description: Some("a\u{0}b".into()),
        ..Default::default()
    })]
    #[case::説明にnulを含む(SubmitRequestInput {
        title: "Trailhead".into(),
        description: Some("a\u{0}b".into()),
        ..Default::default()
    })]
    #[tokio::test]
    async fn test_submit_不正な入力はbad_requestで何も書き込まない(
        #[case] input: SubmitRequestInput,
    ) {
        let f = fixture();

        let err = f.sut.submit("user_1", input).await.unwrap_err();

        assert!(matches!(err, CoreError::BadRequest(_)));
        assert!(f.requests.requests().is_empty());
        assert!(f.submissions.submissions().is_empty());
    }

    #[tokio::test]
    async fn test_submit_不正な入力は未登録ユーザーより先に検出される() {
        let f = fixture();
        let input = SubmitRequestInput {
            title: String::new(),
            ..Default::default()
        };

        let err = f.sut.submit("user_ghost", input).await.unwrap_err();

        assert!(matches!(err, CoreError::BadRequest(_)));
    }

    #[rstest]
    #[case::長すぎるid("u".repeat(256))]
    #[case::nulを含むid("user\u{0}1".to_string())]
    #[tokio::test]
    async fn test_submit_ユーザーidとして不正な値はunknown_userになる(#[case] user_id: String) {
        let f = fixture();

        let err = f.sut.submit(&user_id, trailhead()).await.unwrap_err();

        assert!(matches!(err, CoreError::UnknownUser(_)));
        assert!(f.requests.requests().is_empty());
        assert!(f.submissions.submissions().is_empty());
    }
}
