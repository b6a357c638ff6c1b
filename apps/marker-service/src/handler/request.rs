//! # 申請ハンドラ
//!
//! ## エンドポイント
//!
//! - `GET /requests` - 承認待ち申請一覧
//! - `GET /requests/{id}` - 申請取得（0 件または 1 件の配列）
//! - `POST /requests` - 申請の投稿（`userID` ヘッダー必須）
//!
//! `userID` ヘッダーは前段のゲートウェイで認証済みの値として扱う。

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use mapmark_domain::request::Request;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::marker::LatLngDto;
use crate::{
    error::CoreError,
    usecase::{QueryUseCaseImpl, SubmissionUseCaseImpl, SubmitRequestInput},
};

/// 投稿者 ID のヘッダー名（HTTP ヘッダー名は大文字小文字を区別しない）
pub const USER_ID_HEADER: &str = "userid";

/// 申請 API の共有状態
pub struct RequestState {
    pub query:      Arc<QueryUseCaseImpl>,
    pub submission: SubmissionUseCaseImpl,
}

// --- リクエスト/レスポンス型 ---

/// 申請投稿リクエスト
#[derive(Debug, Deserialize)]
pub struct SubmitRequestBody {
    pub title:        String,
    pub description:  Option<String>,
    pub latlng:       Option<LatLngDto>,
    pub map_url:      Option<String>,
    pub banner_image: Option<String>,
    #[serde(default)]
    pub is_empty:     bool,
}

impl From<SubmitRequestBody> for SubmitRequestInput {
    fn from(body: SubmitRequestBody) -> Self {
        Self {
            title:        body.title,
            description:  body.description,
            latlng:       body.latlng.map(|l| (l.latitude, l.longitude)),
            map_url:      body.map_url,
            banner_image: body.banner_image,
            is_empty:     body.is_empty,
        }
    }
}

/// 申請 DTO
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct RequestDto {
    pub id:           Uuid,
    pub user_id:      String,
    pub title:        String,
    pub description:  String,
    pub latlng:       LatLngDto,
    pub map_url:      Option<String>,
    pub banner_image: Option<String>,
    pub is_empty:     bool,
}

impl From<&Request> for RequestDto {
    fn from(request: &Request) -> Self {
        Self {
            id:           *request.id().as_uuid(),
            user_id:      request.user_id().as_str().to_string(),
            title:        request.title().as_str().to_string(),
            description:  request.description().as_str().to_string(),
            latlng:       request.latlng().into(),
            map_url:      request.map_url().map(|url| url.as_str().to_string()),
            banner_image: request.banner_image().map(|url| url.as_str().to_string()),
            is_empty:     request.is_empty(),
        }
    }
}

// --- ハンドラ ---

/// GET /requests
#[tracing::instrument(skip_all)]
pub async fn list_requests(
    State(state): State<Arc<RequestState>>,
) -> Result<impl IntoResponse, CoreError> {
    let requests = state.query.list_requests().await?;

    let items: Vec<RequestDto> = requests.iter().map(RequestDto::from).collect();
    Ok((StatusCode::OK, Json(items)))
}

/// GET /requests/{id}
///
/// 見つからない場合も 200 で空配列を返す。
#[tracing::instrument(skip_all, fields(%id))]
pub async fn get_request(
    State(state): State<Arc<RequestState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, CoreError> {
    let items: Vec<RequestDto> = match state.query.get_request(&id).await {
        Ok(request) => vec![RequestDto::from(&request)],
        Err(CoreError::NotFound(_)) => Vec::new(),
        Err(e) => return Err(e),
    };

    Ok((StatusCode::OK, Json(items)))
}

/// POST /requests
///
/// ## レスポンス
///
/// - `201 Created`: 保存された申請
/// - `400 Bad Request`: `userID` ヘッダーの欠落、ボディ不正、検証エラー
/// - `401 Unauthorized`: 投稿者が未登録
#[tracing::instrument(skip_all)]
pub async fn submit_request(
    State(state): State<Arc<RequestState>>,
    headers: HeaderMap,
    payload: Result<Json<SubmitRequestBody>, JsonRejection>,
) -> Result<impl IntoResponse, CoreError> {
    let user_id = headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| CoreError::BadRequest("userID header is required".to_string()))?;
    let Json(body) = payload?;

    let request = state.submission.submit(user_id, body.into()).await?;

    Ok((StatusCode::CREATED, Json(RequestDto::from(&request))))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        Router,
        body::{Body, to_bytes},
        http::Request as HttpRequest,
        routing::get,
    };
    use chrono::{TimeZone, Utc};
    use mapmark_domain::{
        clock::FixedClock,
        user::{Email, User, UserId},
        value_objects::UserName,
    };
    use mapmark_infra::mock::{
        MockMarkerRepository,
        MockRequestRepository,
        MockSubmissionRepository,
        MockTransactionManager,
        MockUserRepository,
    };
    use pretty_assertions::assert_eq;
    use tower::ServiceExt;

    use super::*;

    struct TestApp {
        router:      Router,
        requests:    MockRequestRepository,
        submissions: MockSubmissionRepository,
    }

    fn create_test_app() -> TestApp {
        let users = MockUserRepository::new();
        let requests = MockRequestRepository::new();
        let submissions = MockSubmissionRepository::new();
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();

        users.add_user(User::new(
            UserId::new("u1").unwrap(),
            UserName::new("hiker").unwrap(),
            Email::new("hiker@example.com").unwrap(),
            now,
        ));

        let state = Arc::new(RequestState {
            query:      Arc::new(QueryUseCaseImpl::new(
                Arc::new(MockMarkerRepository::new()),
                Arc::new(requests.clone()),
            )),
            submission: SubmissionUseCaseImpl::new(
                Arc::new(users),
                Arc::new(requests.clone()),
                Arc::new(submissions.clone()),
                Arc::new(MockTransactionManager),
                Arc::new(FixedClock::new(now)),
            ),
        });

        let router = Router::new()
            .route("/requests", get(list_requests).post(submit_request))
            .route("/requests/{id}", get(get_request))
            .with_state(state);

        TestApp {
            router,
            requests,
            submissions,
        }
    }

    fn post_request(user_id: Option<&str>, body: &str) -> HttpRequest<Body> {
        let mut builder = HttpRequest::builder()
            .method("POST")
            .uri("/requests")
            .header("content-type", "application/json");
        if let Some(user_id) = user_id {
            builder = builder.header("userID", user_id);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn into_parts(response: axum::response::Response) -> (StatusCode, serde_json::Value) {
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_submit_request_201で保存された申請を返す() {
        let app = create_test_app();
        let body = r#"{
            "title": "Trailhead",
            "description": "North entrance",
            "latlng": { "latitude": 35.5, "longitude": 139.25 },
            "map_url": "https://maps.example.com/t"
        }"#;

        let response = app
            .router
            .oneshot(post_request(Some("u1"), body))
            .await
            .unwrap();
        let (status, json) = into_parts(response).await;

        assert_eq!(status, StatusCode::CREATED);
        let dto: RequestDto = serde_json::from_value(json).unwrap();
        assert_eq!(dto.user_id, "u1");
        assert_eq!(dto.title, "Trailhead");
        assert_eq!(
            dto.latlng,
            LatLngDto {
                latitude:  35.5,
                longitude: 139.25,
            }
        );
        assert_eq!(dto.map_url.as_deref(), Some("https://maps.example.com/t"));
        assert_eq!(dto.banner_image, None);
        assert!(!dto.is_empty);

        let stored = app.requests.requests();
        assert_eq!(stored.len(), 1);
        assert_eq!(*stored[0].id().as_uuid(), dto.id);
    }

    #[tokio::test]
    async fn test_submit_request_ヘッダーがない場合は400を返す() {
        let app = create_test_app();

        let response = app
            .router
            .oneshot(post_request(None, r#"{"title": "Trailhead"}"#))
            .await
            .unwrap();
        let (status, json) = into_parts(response).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json, serde_json::json!({ "error": "userID header is required" }));
        assert!(app.requests.requests().is_empty());
    }

    #[tokio::test]
    async fn test_submit_request_不正なjsonは400を返す() {
        let app = create_test_app();

        let response = app
            .router
            .oneshot(post_request(Some("u1"), r#"{"title": "#))
            .await
            .unwrap();
        let (status, json) = into_parts(response).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json, serde_json::json!({ "error": "Invalid request body" }));
    }

    #[tokio::test]
    async fn test_submit_request_未登録ユーザーは401で何も書き込まない() {
        let app = create_test_app();

        let response = app
            .router
            .oneshot(post_request(Some("u_ghost"), r#"{"title": "Trailhead"}"#))
            .await
            .unwrap();
        let (status, json) = into_parts(response).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json, serde_json::json!({ "error": "User not found" }));
        assert!(app.requests.requests().is_empty());
        assert!(app.submissions.submissions().is_empty());
    }

    #[tokio::test]
    async fn test_get_request_uuidでないidは空配列を返す() {
        let app = create_test_app();

        let response = app
            .router
            .oneshot(
                HttpRequest::builder()
                    .uri("/requests/r1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let (status, json) = into_parts(response).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, serde_json::json!([]));
    }
}
