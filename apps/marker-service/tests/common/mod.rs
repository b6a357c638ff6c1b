//! テスト共通フィクスチャ
//!
//! DB を使用する統合テストで共通利用するシードデータとアプリ構築ヘルパー。

// 各テストファイルが独立したクレートとしてコンパイルされるため、
// 使用しない関数に dead_code 警告が出る。モジュール全体で抑制する。
#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request as HttpRequest, StatusCode},
};
use chrono::{DateTime, Utc};
use mapmark_domain::{
    clock::FixedClock,
    request::{NewRequest, Request, RequestId},
    submission::Submission,
    user::{Email, User, UserId},
    value_objects::{Description, LatLng, ResourceUrl, Title, UserName},
};
use mapmark_infra::{
    IdentityResolver,
    db::{PgTransactionManager, TransactionManager},
    repository::{
        PostgresRequestRepository,
        PostgresSubmissionRepository,
        PostgresUserRepository,
        RequestRepository,
        SubmissionRepository,
        UserRepository,
    },
};
use mapmark_marker_service::app_builder::{Dependencies, build_app};
use sqlx::PgPool;
use tower::ServiceExt;

/// テスト用の固定日時
pub fn test_now() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

/// 指定 ID のユーザーを挿入する
pub async fn insert_user(pool: &PgPool, id: &str) -> User {
    let user = User::new(
        UserId::new(id).unwrap(),
        UserName::new(format!("{id}-name")).unwrap(),
        Email::new(format!("{id}@example.com")).unwrap(),
        test_now(),
    );

    let mut tx = PgTransactionManager::new(pool.clone()).begin().await.unwrap();
    PostgresUserRepository::new(pool.clone())
        .insert(&mut tx, &user)
        .await
        .unwrap();
    tx.commit().await.unwrap();

    user
}

/// 承認待ちの申請を投稿記録とともに挿入する
pub async fn insert_pending_request(pool: &PgPool, user_id: &UserId, title: &str) -> Request {
    let request = Request::new(NewRequest {
        id:           RequestId::new(),
        user_id:      user_id.clone(),
        title:        Title::new(title).unwrap(),
        description:  Description::new("North entrance").unwrap(),
        latlng:       LatLng::new(40.0, -105.2).unwrap(),
        map_url:      Some(ResourceUrl::new("https://maps.example.com/trailhead").unwrap()),
        banner_image: Some(ResourceUrl::new("https://images.example.com/banner.jpg").unwrap()),
        is_empty:     false,
        now:          test_now(),
    });

    let mut tx = PgTransactionManager::new(pool.clone()).begin().await.unwrap();
    PostgresRequestRepository::new(pool.clone())
        .insert(&mut tx, &request)
        .await
        .unwrap();
    PostgresSubmissionRepository::new(pool.clone())
        .record_submission(
            &mut tx,
            &Submission::new(user_id.clone(), request.id().clone(), test_now()),
        )
        .await
        .unwrap();
    tx.commit().await.unwrap();

    request
}

/// 申請にギャラリー画像を直接登録する（投稿 API からは書き込まれないテーブル）
pub async fn insert_request_gallery_images(pool: &PgPool, request_id: &RequestId, urls: &[&str]) {
    for (position, url) in urls.iter().enumerate() {
        sqlx::query(
            "INSERT INTO request_gallery_images (request_id, position, image_url) VALUES ($1, $2, $3)",
        )
        .bind(request_id.as_uuid())
        .bind(position as i32)
        .bind(*url)
        .execute(pool)
        .await
        .unwrap();
    }
}

/// テーブルの行数を数える
pub async fn count_rows(pool: &PgPool, table: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap()
}

/// PostgreSQL 実装でアプリを構築する（時計は固定）
pub fn create_app(pool: PgPool, identity: Arc<dyn IdentityResolver>) -> Router {
    let deps = Dependencies {
        clock: Arc::new(FixedClock::new(test_now())),
        ..Dependencies::postgres(pool, identity)
    };
    build_app(deps)
}

/// リクエストを送信し、ステータスと JSON ボディを返す
pub async fn send(app: &Router, request: HttpRequest<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

pub fn get(uri: &str) -> HttpRequest<Body> {
    HttpRequest::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, user_id: Option<&str>, body: serde_json::Value) -> HttpRequest<Body> {
    let mut builder = HttpRequest::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(user_id) = user_id {
        builder = builder.header("userID", user_id);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn post_empty(uri: &str) -> HttpRequest<Body> {
    HttpRequest::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}
