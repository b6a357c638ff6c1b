//! テスト共通フィクスチャ
//!
//! DB を使用する統合テストで共通利用するシードデータとエンティティ生成ヘルパー。

// 各テストファイルが独立したクレートとしてコンパイルされるため、
// 使用しない関数に dead_code 警告が出る。モジュール全体で抑制する。
#![allow(dead_code)]

use chrono::{DateTime, Utc};
use mapmark_domain::{
    request::{NewRequest, Request, RequestId},
    user::{Email, User, UserId},
    value_objects::{Description, LatLng, ResourceUrl, Title, UserName},
};
use mapmark_infra::{
    db::{PgTransactionManager, TransactionManager},
    repository::{
        PostgresRequestRepository,
        PostgresUserRepository,
        RequestRepository,
        UserRepository,
    },
};
use sqlx::PgPool;

/// テスト用の固定日時
pub fn test_now() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

/// シードユーザーの ID
pub fn seed_user_id() -> UserId {
    UserId::new("user_seed").unwrap()
}

/// 指定 ID のユーザーを作成して挿入する
pub async fn insert_user(pool: &PgPool, id: &str) -> User {
    let user = User::new(
        UserId::new(id).unwrap(),
        UserName::new(format!("{id}-name")).unwrap(),
        Email::new(format!("{id}@example.com")).unwrap(),
        test_now(),
    );

    let tx_manager = PgTransactionManager::new(pool.clone());
    let mut tx = tx_manager.begin().await.unwrap();
    PostgresUserRepository::new(pool.clone())
        .insert(&mut tx, &user)
        .await
        .unwrap();
    tx.commit().await.unwrap();

    user
}

/// シードユーザーを挿入する
pub async fn setup_test_data(pool: &PgPool) -> UserId {
    insert_user(pool, "user_seed").await;
    seed_user_id()
}

/// デフォルト値で申請を作成する
pub fn create_test_request(user_id: &UserId, title: &str) -> Request {
    create_test_request_at(user_id, title, test_now())
}

/// 投稿日時を指定して申請を作成する
pub fn create_test_request_at(user_id: &UserId, title: &str, now: DateTime<Utc>) -> Request {
    Request::new(NewRequest {
        id:           RequestId::new(),
        user_id:      user_id.clone(),
        title:        Title::new(title).unwrap(),
        description:  Description::new("テスト用の申請").unwrap(),
        latlng:       LatLng::new(40.0, -105.2).unwrap(),
        map_url:      Some(ResourceUrl::new("https://maps.example.com/trailhead").unwrap()),
        banner_image: Some(ResourceUrl::new("https://images.example.com/banner.jpg").unwrap()),
        is_empty:     false,
        now,
    })
}

/// 申請を挿入してコミットする
pub async fn insert_request(pool: &PgPool, request: &Request) {
    let tx_manager = PgTransactionManager::new(pool.clone());
    let mut tx = tx_manager.begin().await.unwrap();
    PostgresRequestRepository::new(pool.clone())
        .insert(&mut tx, request)
        .await
        .unwrap();
    tx.commit().await.unwrap();
}

/// 申請にギャラリー画像を直接登録する（API からは書き込まれないテーブル）
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
