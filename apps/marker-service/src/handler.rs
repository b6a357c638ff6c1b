//! # HTTP リクエストハンドラ
//!
//! axum のルートに対応するハンドラ関数を定義する。
//!
//! ## 設計方針
//!
//! - 各ハンドラはサブモジュールに配置
//! - 親モジュール（この `handler.rs`）で re-export し、フラットな API を提供
//! - ハンドラは薄く保ち、ビジネスロジックはユースケース層に委譲
//! - 単一取得の GET は既存クライアントに合わせて 0 件または 1 件の配列を返す

pub mod health;
pub mod marker;
pub mod request;
pub mod user;

pub use health::health_check;
pub use marker::{MarkerState, approve_marker, get_marker, list_markers};
pub use request::{RequestState, USER_ID_HEADER, get_request, list_requests, submit_request};
pub use user::{UserState, get_user, register_user};
