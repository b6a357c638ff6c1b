//! # Marker Service ライブラリ
//!
//! 地図マーカーの投稿・承認・参照 API を提供する。
//! 統合テスト用にルーター構築とユースケースを公開する。

pub mod app_builder;
pub mod config;
pub mod error;
pub mod handler;
pub mod usecase;
