//! Dish handlers

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::application::catalog::{CreateDishCommand, UpdateDishCommand};
use crate::infra::http::error::ApiError;
use crate::infra::http::models::{DishCreateRequest, DishUpdateRequest};
use crate::infra::http::state::ApiState;

pub async fn list_dishes(
    State(state): State<ApiState>,
    Path((_menu_id, _submenu_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let dishes = state.dishes.list().await?;
    Ok(Json(dishes))
}

pub async fn get_dish(
    State(state): State<ApiState>,
    Path((_menu_id, _submenu_id, dish_id)): Path<(Uuid, Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let dish = state.dishes.get(dish_id).await?;
    Ok(Json(dish))
}

pub async fn create_dish(
    State(state): State<ApiState>,
    Path((menu_id, submenu_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<DishCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let command = CreateDishCommand {
        title: payload.title,
        description: payload.description,
        price: payload.price,
    };

    let dish = state.dishes.create(menu_id, submenu_id, command).await?;
    Ok((StatusCode::CREATED, Json(dish)))
}

pub async fn update_dish(
    State(state): State<ApiState>,
    Path((menu_id, submenu_id, dish_id)): Path<(Uuid, Uuid, Uuid)>,
    Json(payload): Json<DishUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let command = UpdateDishCommand {
        id: dish_id,
        title: payload.title,
        description: payload.description,
        price: payload.price,
    };

    let dish = state.dishes.update(menu_id, submenu_id, command).await?;
    Ok(Json(dish))
}

pub async fn delete_dish(
    State(state): State<ApiState>,
    Path((menu_id, submenu_id, dish_id)): Path<(Uuid, Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let ack = state.dishes.delete(menu_id, submenu_id, dish_id).await?;
    Ok(Json(ack))
}
