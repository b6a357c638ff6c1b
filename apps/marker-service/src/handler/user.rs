//! # ユーザーハンドラ
//!
//! ## エンドポイント
//!
//! - `POST /user` - ユーザー登録（冪等）
//! - `GET /user/{id}` - ユーザーと投稿・承認済み申請 ID

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use mapmark_shared::MessageResponse;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::CoreError,
    usecase::{RegistrationOutcome, RegistrationUseCaseImpl},
};

/// ユーザー API の共有状態
pub struct UserState {
    pub usecase: RegistrationUseCaseImpl,
}

/// ユーザー登録リクエスト
#[derive(Debug, Deserialize)]
pub struct RegisterUserBody {
    pub id: String,
}

/// ユーザー DTO
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct UserDto {
    pub id:                String,
    pub username:          String,
    pub email:             String,
    pub submissions:       Vec<Uuid>,
    pub valid_submissions: Vec<Uuid>,
}

/// POST /user
///
/// ## レスポンス
///
/// - `201 Created`: 新規登録
/// - `200 OK`: 登録済み
/// - `400 Bad Request`: ボディ不正、ID が空
/// - `500 Internal Server Error`: ID プロバイダにユーザーが存在しない
/// - `502 Bad Gateway`: ID プロバイダに到達できない
#[tracing::instrument(skip_all)]
pub async fn register_user(
    State(state): State<Arc<UserState>>,
    payload: Result<Json<RegisterUserBody>, JsonRejection>,
) -> Result<impl IntoResponse, CoreError> {
    let Json(body) = payload?;

    let (status, message) = match state.usecase.register(&body.id).await? {
        RegistrationOutcome::Created => (StatusCode::CREATED, "User created successfully"),
        RegistrationOutcome::AlreadyRegistered => (StatusCode::OK, "User already registered"),
    };

    Ok((status, Json(MessageResponse::new(message))))
}

/// GET /user/{id}
#[tracing::instrument(skip_all, fields(%id))]
pub async fn get_user(
    State(state): State<Arc<UserState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, CoreError> {
    let profile = state.usecase.get_user(&id).await?;

    let dto = UserDto {
        id:                profile.user.id().as_str().to_string(),
        username:          profile.user.username().as_str().to_string(),
        email:             profile.user.email().as_str().to_string(),
        submissions:       profile.submissions.iter().map(|id| *id.as_uuid()).collect(),
        valid_submissions: profile
            .valid_submissions
            .iter()
            .map(|id| *id.as_uuid())
            .collect(),
    };
    Ok((StatusCode::OK, Json(dto)))
}
