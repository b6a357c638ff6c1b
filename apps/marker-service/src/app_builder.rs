//! # Marker Service アプリケーション構築
//!
//! DI（リポジトリ・ユースケース・State）の組み立てとルーター構築を担当する。
//! `main.rs` はインフラ初期化とサーバー起動に集中する。

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use mapmark_domain::clock::{Clock, SystemClock};
use mapmark_infra::{
    IdentityResolver,
    db::{PgTransactionManager, TransactionManager},
    repository::{
        MarkerRepository,
        PostgresMarkerRepository,
        PostgresRequestRepository,
        PostgresSubmissionRepository,
        PostgresUserRepository,
        RequestRepository,
        SubmissionRepository,
        UserRepository,
    },
};
use mapmark_shared::observability::{MakeRequestUuidV7, make_request_span};
use sqlx::PgPool;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::{
    handler::{
        MarkerState,
        RequestState,
        UserState,
        approve_marker,
        get_marker,
        get_request,
        get_user,
        health_check,
        list_markers,
        list_requests,
        register_user,
        submit_request,
    },
    usecase::{
        ApprovalUseCaseImpl,
        QueryUseCaseImpl,
        RegistrationUseCaseImpl,
        SubmissionUseCaseImpl,
    },
};

/// ルーター構築に必要な依存
#[derive(Clone)]
pub struct Dependencies {
    pub user_repo:       Arc<dyn UserRepository>,
    pub request_repo:    Arc<dyn RequestRepository>,
    pub marker_repo:     Arc<dyn MarkerRepository>,
    pub submission_repo: Arc<dyn SubmissionRepository>,
    pub tx_manager:      Arc<dyn TransactionManager>,
    pub identity:        Arc<dyn IdentityResolver>,
    pub clock:           Arc<dyn Clock>,
}

impl Dependencies {
    /// PostgreSQL 実装とシステム時刻で依存を組み立てる
    pub fn postgres(pool: PgPool, identity: Arc<dyn IdentityResolver>) -> Self {
        Self {
            user_repo: Arc::new(PostgresUserRepository::new(pool.clone())),
            request_repo: Arc::new(PostgresRequestRepository::new(pool.clone())),
            marker_repo: Arc::new(PostgresMarkerRepository::new(pool.clone())),
            submission_repo: Arc::new(PostgresSubmissionRepository::new(pool.clone())),
            tx_manager: Arc::new(PgTransactionManager::new(pool)),
            identity,
            clock: Arc::new(SystemClock),
        }
    }
}

/// ユースケース → State → Router の順に組み立てる
pub fn build_app(deps: Dependencies) -> Router {
    let query = Arc::new(QueryUseCaseImpl::new(
        deps.marker_repo.clone(),
        deps.request_repo.clone(),
    ));

    let marker_state = Arc::new(MarkerState {
        query:    query.clone(),
        approval: ApprovalUseCaseImpl::new(
            deps.request_repo.clone(),
            deps.marker_repo.clone(),
            deps.submission_repo.clone(),
            deps.tx_manager.clone(),
            deps.clock.clone(),
        ),
    });

    let request_state = Arc::new(RequestState {
        query,
        submission: SubmissionUseCaseImpl::new(
            deps.user_repo.clone(),
            deps.request_repo.clone(),
            deps.submission_repo.clone(),
            deps.tx_manager.clone(),
            deps.clock.clone(),
        ),
    });

    let user_state = Arc::new(UserState {
        usecase: RegistrationUseCaseImpl::new(
            deps.user_repo,
            deps.submission_repo,
            deps.identity,
            deps.tx_manager,
            deps.clock,
        ),
    });

    Router::new()
        .route("/health", get(health_check))
        .merge(
            Router::new()
                .route("/markers", get(list_markers))
                .route("/markers/{id}", get(get_marker))
                .route("/markers/{id}/approve", post(approve_marker))
                .with_state(marker_state),
        )
        .merge(
            Router::new()
                .route("/requests", get(list_requests).post(submit_request))
                .route("/requests/{id}", get(get_request))
                .with_state(request_state),
        )
        .merge(
            Router::new()
                .route("/user", post(register_user))
                .route("/user/{id}", get(get_user))
                .with_state(user_state),
        )
        // Request ID レイヤー（下に書いたものが外側）
        // 1. SetRequestIdLayer（最外）: UUID v7 を生成（クライアント提供値があればそれを使用）
        // 2. TraceLayer: request_id を含むスパンを作成
        // 3. PropagateRequestIdLayer: レスポンスヘッダーに X-Request-Id をコピー
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use chrono::Utc;
    use mapmark_domain::clock::FixedClock;
    use mapmark_infra::mock::{
        MockIdentityResolver,
        MockMarkerRepository,
        MockRequestRepository,
        MockSubmissionRepository,
        MockTransactionManager,
        MockUserRepository,
    };
    use mapmark_shared::observability::REQUEST_ID_HEADER;
    use pretty_assertions::assert_eq;
    use tower::ServiceExt;

    use super::*;

    fn mock_dependencies() -> Dependencies {
        Dependencies {
            user_repo:       Arc::new(MockUserRepository::new()),
            request_repo:    Arc::new(MockRequestRepository::new()),
            marker_repo:     Arc::new(MockMarkerRepository::new()),
            submission_repo: Arc::new(MockSubmissionRepository::new()),
            tx_manager:      Arc::new(MockTransactionManager),
            identity:        Arc::new(MockIdentityResolver::new()),
            clock:           Arc::new(FixedClock::new(Utc::now())),
        }
    }

    #[tokio::test]
    async fn test_healthはバージョン付きで200を返す() {
        let app = build_app(mock_dependencies());

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "status": "healthy", "version": env!("CARGO_PKG_VERSION") })
        );
    }

    #[tokio::test]
    async fn test_レスポンスにx_request_idが付与される() {
        let app = build_app(mock_dependencies());

        let response = app
            .oneshot(Request::builder().uri("/markers").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let request_id = response
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap();
        assert!(uuid::Uuid::parse_str(request_id).is_ok());
    }

    #[tokio::test]
    async fn test_クライアント提供のx_request_idをそのまま返す() {
        let app = build_app(mock_dependencies());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/requests")
                    .header(REQUEST_ID_HEADER, "client-req-42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers().get(REQUEST_ID_HEADER).unwrap(),
            "client-req-42"
        );
    }
}
