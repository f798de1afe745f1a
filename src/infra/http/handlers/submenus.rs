//! Submenu handlers

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::application::catalog::{CreateSubmenuCommand, UpdateSubmenuCommand};
use crate::infra::http::error::ApiError;
use crate::infra::http::models::{SubmenuCreateRequest, SubmenuUpdateRequest};
use crate::infra::http::state::ApiState;

pub async fn list_submenus(
    State(state): State<ApiState>,
    Path(_menu_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let submenus = state.submenus.list().await?;
    Ok(Json(submenus))
}

pub async fn get_submenu(
    State(state): State<ApiState>,
    Path((_menu_id, submenu_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let submenu = state.submenus.get(submenu_id).await?;
    Ok(Json(submenu))
}

pub async fn create_submenu(
    State(state): State<ApiState>,
    Path(menu_id): Path<Uuid>,
    Json(payload): Json<SubmenuCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let command = CreateSubmenuCommand {
        title: payload.title,
        description: payload.description,
    };

    let submenu = state.submenus.create(menu_id, command).await?;
    Ok((StatusCode::CREATED, Json(submenu)))
}

pub async fn update_submenu(
    State(state): State<ApiState>,
    Path((menu_id, submenu_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<SubmenuUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let command = UpdateSubmenuCommand {
        id: submenu_id,
        title: payload.title,
        description: payload.description,
    };

    let submenu = state.submenus.update(menu_id, command).await?;
    Ok(Json(submenu))
}

pub async fn delete_submenu(
    State(state): State<ApiState>,
    Path((menu_id, submenu_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let ack = state.submenus.delete(menu_id, submenu_id).await?;
    Ok(Json(ack))
}
