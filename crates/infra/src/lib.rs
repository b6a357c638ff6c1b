//! # mapmark インフラ層
//!
//! 外部システムとの接続・通信を担当するインフラストラクチャ層。
//!
//! ## 責務
//!
//! - **データベース接続**: PostgreSQL への接続プールとトランザクション管理
//! - **リポジトリ実装**: ユーザー・申請・マーカー・投稿記録の永続化
//! - **ID プロバイダ**: 外部ユーザー ID からプロフィールを取得する
//!
//! ## 依存関係
//!
//! ```text
//! marker-service → infra → domain
//! ```
//!
//! ドメイン層はインフラ層に依存しない。
//!
//! ## モジュール構成
//!
//! - [`db`] - 接続プール、マイグレーション、[`TxContext`](db::TxContext)
//! - [`error`] - インフラ層エラー定義
//! - [`identity`] - ID プロバイダクライアント
//! - [`repository`] - リポジトリ実装
//! - `mock` - インメモリのテスト用実装（`test-utils` feature）
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use mapmark_infra::{db, repository::PostgresMarkerRepository};
//!
//! async fn setup() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = db::create_pool("postgres://localhost/mapmark").await?;
//!     db::run_migrations(&pool).await?;
//!     let markers = PostgresMarkerRepository::new(pool);
//!     Ok(())
//! }
//! ```

pub mod db;
pub mod error;
pub mod identity;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod repository;

pub use error::{InfraError, InfraErrorKind};
pub use identity::{ClerkIdentityResolver, IdentityError, IdentityProfile, IdentityResolver};
