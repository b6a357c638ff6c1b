//! HTTP シナリオテスト
//!
//! 投稿 → 参照 → 承認 → 参照の一連の流れを、ルーター全体と実 DB で確認する。
//!
//! 実行方法:
//! ```bash
//! cargo test -p mapmark-marker-service --test scenario_test
//! ```

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{count_rows, create_app, get, insert_user, post_empty, post_json, send};
use mapmark_infra::{IdentityProfile, mock::MockIdentityResolver};
use pretty_assertions::assert_eq;
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../migrations")]
async fn test_trailheadを投稿して承認するとマーカーとして公開される(pool: PgPool) {
    insert_user(&pool, "u1").await;
    let app = create_app(pool.clone(), Arc::new(MockIdentityResolver::new()));

    // 投稿
    let (status, created) = send(
        &app,
        post_json(
            "/requests",
            Some("u1"),
            json!({
                "title": "Trailhead",
                "description": "North entrance",
                "latlng": { "latitude": 40.0, "longitude": -105.2 }
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let r1 = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["user_id"], "u1");

    // 承認前の参照
    let (status, requests) = send(&app, get(&format!("/requests/{r1}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(requests.as_array().unwrap().len(), 1);
    assert_eq!(requests[0]["id"], r1.as_str());
    assert_eq!(requests[0]["title"], "Trailhead");

    // 承認
    let (status, approved) = send(&app, post_empty(&format!("/markers/{r1}/approve"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["message"], "Marker approved successfully");

    // 承認後の参照
    let (status, markers) = send(&app, get(&format!("/markers/{r1}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        markers,
        json!([{
            "id": r1,
            "title": "Trailhead",
            "description": "North entrance",
            "latlng": { "latitude": 40.0, "longitude": -105.2 },
            "banner_image": null,
            "gallery_images": [],
            "is_empty": false
        }])
    );

    let (status, requests) = send(&app, get(&format!("/requests/{r1}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(requests, json!([]));

    let (_, all_markers) = send(&app, get("/markers")).await;
    assert_eq!(all_markers.as_array().unwrap().len(), 1);

    // ユーザーの投稿・承認記録
    let (status, user) = send(&app, get("/user/u1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["submissions"], json!([r1]));
    assert_eq!(user["valid_submissions"], json!([r1]));

    // 再承認
    let (status, body) = send(&app, post_empty(&format!("/markers/{r1}/approve"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Marker not found" }));
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_未登録ユーザーの投稿は401で申請が作られない(pool: PgPool) {
    let app = create_app(pool.clone(), Arc::new(MockIdentityResolver::new()));

    let (status, body) = send(
        &app,
        post_json("/requests", Some("u_ghost"), json!({ "title": "Trailhead" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "User not found" }));
    assert_eq!(count_rows(&pool, "requests").await, 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_nulを含む投稿は400で申請が作られない(pool: PgPool) {
    insert_user(&pool, "u1").await;
    let app = create_app(pool.clone(), Arc::new(MockIdentityResolver::new()));

    let (status, _) = send(
        &app,
        post_json(
            "/requests",
            Some("u1"),
            json!({ "title": "Trail\u{0}head", "description": "a\u{0}b" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(count_rows(&pool, "requests").await, 0);
    assert_eq!(count_rows(&pool, "submissions").await, 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_長すぎるユーザーidヘッダーは401を返す(pool: PgPool) {
    let app = create_app(pool.clone(), Arc::new(MockIdentityResolver::new()));
    let user_id = "u".repeat(256);

    let (status, body) = send(
        &app,
        post_json("/requests", Some(&user_id), json!({ "title": "Trailhead" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "User not found" }));
    assert_eq!(count_rows(&pool, "requests").await, 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_ユーザー登録は冪等でid_プロバイダのプロフィールを保存する(pool: PgPool) {
    let identity = MockIdentityResolver::new();
    identity.add_profile(IdentityProfile {
        id:       "user_2abc".to_string(),
        username: "hiker@example.com".to_string(),
        email:    "hiker@example.com".to_string(),
    });
    let app = create_app(pool.clone(), Arc::new(identity.clone()));

    let (first, _) = send(&app, post_json("/user", None, json!({ "id": "user_2abc" }))).await;
    let (second, body) = send(&app, post_json("/user", None, json!({ "id": "user_2abc" }))).await;

    assert_eq!(first, StatusCode::CREATED);
    assert_eq!(second, StatusCode::OK);
    assert_eq!(body, json!({ "message": "User already registered" }));
    assert_eq!(identity.call_count(), 1);
    assert_eq!(count_rows(&pool, "users").await, 1);

    let (status, user) = send(&app, get("/user/user_2abc")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["email"], "hiker@example.com");
}
