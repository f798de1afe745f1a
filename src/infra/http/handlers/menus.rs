//! Menu handlers

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::application::catalog::{CreateMenuCommand, UpdateMenuCommand};
use crate::infra::http::error::ApiError;
use crate::infra::http::models::{MenuCreateRequest, MenuUpdateRequest};
use crate::infra::http::state::ApiState;

pub async fn list_menus(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let menus = state.menus.list().await?;
    Ok(Json(menus))
}

pub async fn get_menu(
    State(state): State<ApiState>,
    Path(menu_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let menu = state.menus.get(menu_id).await?;
    Ok(Json(menu))
}

pub async fn create_menu(
    State(state): State<ApiState>,
    Json(payload): Json<MenuCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let command = CreateMenuCommand {
        title: payload.title,
        description: payload.description,
    };

    let menu = state.menus.create(command).await?;
    Ok((StatusCode::CREATED, Json(menu)))
}

pub async fn update_menu(
    State(state): State<ApiState>,
    Path(menu_id): Path<Uuid>,
    Json(payload): Json<MenuUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let command = UpdateMenuCommand {
        id: menu_id,
        title: payload.title,
        description: payload.description,
    };

    let menu = state.menus.update(command).await?;
    Ok(Json(menu))
}

pub async fn delete_menu(
    State(state): State<ApiState>,
    Path(menu_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let ack = state.menus.delete(menu_id).await?;
    Ok(Json(ack))
}
