//! # ユースケース層
//!
//! Marker Service のビジネスロジックを実装する。
//!
//! ## 設計方針
//!
//! - **依存性注入**: リポジトリ・トランザクション管理・時計を `Arc<dyn Trait>` で外部から注入
//! - **薄いハンドラ**: ハンドラは薄く保ち、ロジックはユースケースに集約
//! - **単一トランザクション**: 複数行にまたがる書き込みは 1 つの [`TxContext`](mapmark_infra::db::TxContext) で行う
//!
//! ## モジュール構成
//!
//! - `submission`: 申請の投稿
//! - `approval`: 申請の承認（マーカーへの昇格）
//! - `query`: マーカー・申請の参照
//! - `registration`: ユーザー登録とプロフィール参照

pub(crate) mod helpers;

pub mod approval;
pub mod query;
pub mod registration;
pub mod submission;

pub use approval::ApprovalUseCaseImpl;
pub use query::QueryUseCaseImpl;
pub use registration::{RegistrationOutcome, RegistrationUseCaseImpl, UserProfile};
pub use submission::{SubmissionUseCaseImpl, SubmitRequestInput};
