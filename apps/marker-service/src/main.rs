//! # Marker Service サーバー
//!
//! 地図マーカーの投稿・承認ワークフローを提供する API サーバー。
//!
//! ## 役割
//!
//! - **投稿**: ユーザーが地点情報を申請として投稿する
//! - **承認**: 申請を公開マーカーへ昇格させる
//! - **参照**: マーカー・申請・ユーザーを取得する
//!
//! 環境変数は [`config`](mapmark_marker_service::config) を参照。
//!
//! ## 起動方法
//!
//! ```bash
//! DATABASE_URL=postgres://... IDENTITY_SECRET_KEY=sk_... cargo run -p mapmark-marker-service
//! ```

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use mapmark_infra::{ClerkIdentityResolver, db};
use mapmark_marker_service::{
    app_builder::{Dependencies, build_app},
    config::MarkerServiceConfig,
};
use mapmark_shared::observability::{TracingConfig, init_tracing};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    init_tracing(TracingConfig::from_env("marker-service"));
    let _tracing_guard = tracing::info_span!("app", service = "marker-service").entered();

    let config = MarkerServiceConfig::from_env().context("設定の読み込みに失敗しました")?;

    tracing::info!(
        "Marker Service サーバーを起動します: {}:{}",
        config.host,
        config.port
    );

    let pool = db::create_pool(&config.database_url)
        .await
        .context("データベース接続に失敗しました")?;
    db::run_migrations(&pool)
        .await
        .context("マイグレーションの適用に失敗しました")?;
    tracing::info!("データベースに接続しました");

    let identity = Arc::new(ClerkIdentityResolver::new(
        &config.identity_api_url,
        config.identity_secret_key.clone(),
    ));
    let app = build_app(Dependencies::postgres(pool, identity));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("アドレスのパースに失敗しました")?;

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Marker Service サーバーが起動しました: {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
