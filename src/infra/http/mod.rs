//! HTTP surface: the catalog REST API plus the operational health probe.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod state;

pub use state::ApiState;

use std::sync::Arc;

use axum::{
    Router, middleware as axum_middleware,
    response::{IntoResponse, Response},
    routing::get,
};
use axum::extract::State;
use axum::http::StatusCode;

use crate::application::error::ErrorReport;
use crate::infra::db::PostgresCatalog;

use middleware::{log_responses, set_request_context};

pub fn build_api_router(state: ApiState) -> Router {
    Router::new()
        .route(
            "/api/v1/menus",
            get(handlers::list_menus).post(handlers::create_menu),
        )
        .route(
            "/api/v1/menus/{menu_id}",
            get(handlers::get_menu)
                .patch(handlers::update_menu)
                .delete(handlers::delete_menu),
        )
        .route(
            "/api/v1/menus/{menu_id}/submenus",
            get(handlers::list_submenus).post(handlers::create_submenu),
        )
        .route(
            "/api/v1/menus/{menu_id}/submenus/{submenu_id}",
            get(handlers::get_submenu)
                .patch(handlers::update_submenu)
                .delete(handlers::delete_submenu),
        )
        .route(
            "/api/v1/menus/{menu_id}/submenus/{submenu_id}/dishes",
            get(handlers::list_dishes).post(handlers::create_dish),
        )
        .route(
            "/api/v1/menus/{menu_id}/submenus/{submenu_id}/dishes/{dish_id}",
            get(handlers::get_dish)
                .patch(handlers::update_dish)
                .delete(handlers::delete_dish),
        )
        .with_state(state)
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(set_request_context))
}

pub fn build_health_router(catalog: Arc<PostgresCatalog>) -> Router {
    Router::new()
        .route("/health/db", get(db_health))
        .with_state(catalog)
}

async fn db_health(State(catalog): State<Arc<PostgresCatalog>>) -> Response {
    match catalog.health_check().await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            ErrorReport::from_error(
                "infra::http::db_health",
                StatusCode::SERVICE_UNAVAILABLE,
                &err,
            )
            .attach(&mut response);
            response
        }
    }
}
