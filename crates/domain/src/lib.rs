//! # mapmark ドメイン層
//!
//! 地図マーカー投稿ワークフローのドメインモデルを定義する。
//!
//! ## 設計方針
//!
//! - **エンティティ**: 一意の識別子を持つオブジェクト（[`request::Request`], [`marker::Marker`], [`user::User`]）
//! - **値オブジェクト**: 生成時に検証される不変オブジェクト（[`value_objects`]）
//! - **ドメインエラー**: ビジネスルール違反を表現するエラー型（[`DomainError`]）
//!
//! ## 依存関係の方向
//!
//! ```text
//! marker-service → infra → domain
//!        ↘                   ↑
//!          shared      (依存しない)
//! ```
//!
//! ドメイン層はインフラ層（DB、外部サービス）には一切依存しない。
//!
//! ## 用語
//!
//! | 型 | 用語 | 意味 |
//! |---|---|---|
//! | [`request::Request`] | 申請 | 承認待ちのマーカー投稿 |
//! | [`marker::Marker`] | マーカー | 公開済みの地点情報 |
//! | [`submission::Submission`] | 投稿記録 | 誰がどの申請を出したか（追記のみ） |
//! | [`submission::ValidSubmission`] | 承認記録 | 誰の申請が承認されたか（追記のみ） |

#[macro_use]
mod macros;

pub mod clock;
pub mod error;
pub mod marker;
pub mod request;
pub mod submission;
pub mod user;
pub mod value_objects;

pub use error::DomainError;
