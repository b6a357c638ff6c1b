//! # マーカーハンドラ
//!
//! ## エンドポイント
//!
//! - `GET /markers` - 公開済みマーカー一覧
//! - `GET /markers/{id}` - マーカー取得（0 件または 1 件の配列）
//! - `POST /markers/{id}/approve` - 申請を承認してマーカーを公開

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use mapmark_domain::{marker::Marker, value_objects::LatLng};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::CoreError,
    usecase::{ApprovalUseCaseImpl, QueryUseCaseImpl},
};

/// マーカー API の共有状態
pub struct MarkerState {
    pub query:    Arc<QueryUseCaseImpl>,
    pub approval: ApprovalUseCaseImpl,
}

// --- リクエスト/レスポンス型 ---

/// 座標 DTO
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LatLngDto {
    pub latitude:  f64,
    pub longitude: f64,
}

impl From<LatLng> for LatLngDto {
    fn from(latlng: LatLng) -> Self {
        Self {
            latitude:  latlng.latitude(),
            longitude: latlng.longitude(),
        }
    }
}

/// マーカー DTO
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct MarkerDto {
    pub id:             Uuid,
    pub title:          String,
    pub description:    String,
    pub latlng:         LatLngDto,
    pub banner_image:   Option<String>,
    pub gallery_images: Vec<String>,
    pub is_empty:       bool,
}

impl From<&Marker> for MarkerDto {
    fn from(marker: &Marker) -> Self {
        Self {
            id:             *marker.id().as_uuid(),
            title:          marker.title().as_str().to_string(),
            description:    marker.description().as_str().to_string(),
            latlng:         marker.latlng().into(),
            banner_image:   marker.banner_image().map(|url| url.as_str().to_string()),
            gallery_images: marker
                .gallery_images()
                .iter()
                .map(|url| url.as_str().to_string())
                .collect(),
            is_empty:       marker.is_empty(),
        }
    }
}

/// 承認レスポンス
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ApproveResponse {
    pub message: String,
    pub marker:  MarkerDto,
}

// --- ハンドラ ---

/// GET /markers
#[tracing::instrument(skip_all)]
pub async fn list_markers(
    State(state): State<Arc<MarkerState>>,
) -> Result<impl IntoResponse, CoreError> {
    let markers = state.query.list_markers().await?;

    let items: Vec<MarkerDto> = markers.iter().map(MarkerDto::from).collect();
    Ok((StatusCode::OK, Json(items)))
}

/// GET /markers/{id}
///
/// 見つからない場合も 200 で空配列を返す。
#[tracing::instrument(skip_all, fields(%id))]
pub async fn get_marker(
    State(state): State<Arc<MarkerState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, CoreError> {
    let items: Vec<MarkerDto> = match state.query.get_marker(&id).await {
        Ok(marker) => vec![MarkerDto::from(&marker)],
        Err(CoreError::NotFound(_)) => Vec::new(),
        Err(e) => return Err(e),
    };

    Ok((StatusCode::OK, Json(items)))
}

/// POST /markers/{id}/approve
///
/// ## レスポンス
///
/// - `200 OK`: 公開されたマーカー
/// - `400 Bad Request`: ID が空
/// - `401 Unauthorized`: 承認待ちの申請が存在しない
#[tracing::instrument(skip_all, fields(%id))]
pub async fn approve_marker(
    State(state): State<Arc<MarkerState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, CoreError> {
    let marker = state.approval.approve(&id).await?;

    let response = ApproveResponse {
        message: "Marker approved successfully".to_string(),
        marker:  MarkerDto::from(&marker),
    };
    Ok((StatusCode::OK, Json(response)))
}
