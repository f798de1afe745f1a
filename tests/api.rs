//! End-to-end tests for the catalog API: full scenarios driven through the
//! router against an in-memory store, exercising the read-through cache and
//! the invalidation cascade along the way.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use time::OffsetDateTime;
use tower::ServiceExt;
use uuid::Uuid;

use carta::application::catalog::{DishService, MenuService, SubmenuService};
use carta::application::repos::{
    CreateDishParams, CreateMenuParams, CreateSubmenuParams, DishesRepo, DishesWriteRepo,
    MenusRepo, MenusWriteRepo, RepoError, SubmenusRepo, SubmenusWriteRepo, UpdateDishParams,
    UpdateMenuParams, UpdateSubmenuParams,
};
use carta::cache::{CacheConfig, CacheEngine, MemoryCache};
use carta::domain::entities::{DishRecord, MenuRecord, MenuTree, SubmenuRecord, SubmenuTree};
use carta::infra::http::{ApiState, build_api_router};

/// In-memory stand-in for the Postgres catalog: referential integrity and
/// cascade deletes are modelled the way the real schema enforces them.
#[derive(Default)]
struct MemoryCatalog {
    state: RwLock<CatalogState>,
}

#[derive(Default)]
struct CatalogState {
    menus: Vec<MenuRecord>,
    submenus: Vec<SubmenuRecord>,
    dishes: Vec<DishRecord>,
}

impl CatalogState {
    fn submenu_tree(&self, submenu: &SubmenuRecord) -> SubmenuTree {
        SubmenuTree {
            submenu: submenu.clone(),
            dishes: self
                .dishes
                .iter()
                .filter(|d| d.submenu_id == submenu.id)
                .cloned()
                .collect(),
        }
    }

    fn menu_tree(&self, menu: &MenuRecord) -> MenuTree {
        MenuTree {
            menu: menu.clone(),
            submenus: self
                .submenus
                .iter()
                .filter(|s| s.menu_id == menu.id)
                .map(|s| self.submenu_tree(s))
                .collect(),
        }
    }
}

fn now() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

fn fk_violation() -> RepoError {
    RepoError::InvalidInput {
        message: "insert violates foreign key constraint".to_string(),
    }
}

#[async_trait]
impl MenusRepo for MemoryCatalog {
    async fn list_menu_trees(&self) -> Result<Vec<MenuTree>, RepoError> {
        let state = self.state.read().unwrap();
        Ok(state.menus.iter().map(|m| state.menu_tree(m)).collect())
    }

    async fn find_menu_tree(&self, id: Uuid) -> Result<Option<MenuTree>, RepoError> {
        let state = self.state.read().unwrap();
        Ok(state
            .menus
            .iter()
            .find(|m| m.id == id)
            .map(|m| state.menu_tree(m)))
    }

    async fn find_menu_by_title(&self, title: &str) -> Result<Option<MenuRecord>, RepoError> {
        let state = self.state.read().unwrap();
        Ok(state.menus.iter().find(|m| m.title == title).cloned())
    }
}

#[async_trait]
impl MenusWriteRepo for MemoryCatalog {
    async fn create_menu(&self, params: CreateMenuParams) -> Result<MenuRecord, RepoError> {
        let mut state = self.state.write().unwrap();
        if state.menus.iter().any(|m| m.title == params.title) {
            return Err(RepoError::Duplicate {
                constraint: "menus_title_key".to_string(),
            });
        }
        let record = MenuRecord {
            id: Uuid::new_v4(),
            title: params.title,
            description: params.description,
            created_at: now(),
            updated_at: now(),
        };
        state.menus.push(record.clone());
        Ok(record)
    }

    async fn update_menu(&self, params: UpdateMenuParams) -> Result<MenuRecord, RepoError> {
        let mut state = self.state.write().unwrap();
        let menu = state
            .menus
            .iter_mut()
            .find(|m| m.id == params.id)
            .ok_or(RepoError::NotFound)?;
        menu.title = params.title;
        menu.description = params.description;
        menu.updated_at = now();
        Ok(menu.clone())
    }

    async fn delete_menu(&self, id: Uuid) -> Result<bool, RepoError> {
        let mut state = self.state.write().unwrap();
        let before = state.menus.len();
        state.menus.retain(|m| m.id != id);
        let submenu_ids: Vec<Uuid> = state
            .submenus
            .iter()
            .filter(|s| s.menu_id == id)
            .map(|s| s.id)
            .collect();
        state.submenus.retain(|s| s.menu_id != id);
        state.dishes.retain(|d| !submenu_ids.contains(&d.submenu_id));
        Ok(state.menus.len() < before)
    }
}

#[async_trait]
impl SubmenusRepo for MemoryCatalog {
    async fn list_submenu_trees(&self) -> Result<Vec<SubmenuTree>, RepoError> {
        let state = self.state.read().unwrap();
        Ok(state
            .submenus
            .iter()
            .map(|s| state.submenu_tree(s))
            .collect())
    }

    async fn find_submenu_tree(&self, id: Uuid) -> Result<Option<SubmenuTree>, RepoError> {
        let state = self.state.read().unwrap();
        Ok(state
            .submenus
            .iter()
            .find(|s| s.id == id)
            .map(|s| state.submenu_tree(s)))
    }
}

#[async_trait]
impl SubmenusWriteRepo for MemoryCatalog {
    async fn create_submenu(
        &self,
        params: CreateSubmenuParams,
    ) -> Result<SubmenuRecord, RepoError> {
        let mut state = self.state.write().unwrap();
        if !state.menus.iter().any(|m| m.id == params.menu_id) {
            return Err(fk_violation());
        }
        let record = SubmenuRecord {
            id: Uuid::new_v4(),
            menu_id: params.menu_id,
            title: params.title,
            description: params.description,
            created_at: now(),
            updated_at: now(),
        };
        state.submenus.push(record.clone());
        Ok(record)
    }

    async fn update_submenu(
        &self,
        params: UpdateSubmenuParams,
    ) -> Result<SubmenuRecord, RepoError> {
        let mut state = self.state.write().unwrap();
        let submenu = state
            .submenus
            .iter_mut()
            .find(|s| s.id == params.id)
            .ok_or(RepoError::NotFound)?;
        submenu.title = params.title;
        submenu.description = params.description;
        submenu.updated_at = now();
        Ok(submenu.clone())
    }

    async fn delete_submenu(&self, id: Uuid) -> Result<bool, RepoError> {
        let mut state = self.state.write().unwrap();
        let before = state.submenus.len();
        state.submenus.retain(|s| s.id != id);
        state.dishes.retain(|d| d.submenu_id != id);
        Ok(state.submenus.len() < before)
    }
}

#[async_trait]
impl DishesRepo for MemoryCatalog {
    async fn list_dishes(&self) -> Result<Vec<DishRecord>, RepoError> {
        Ok(self.state.read().unwrap().dishes.clone())
    }

    async fn find_dish(&self, id: Uuid) -> Result<Option<DishRecord>, RepoError> {
        let state = self.state.read().unwrap();
        Ok(state.dishes.iter().find(|d| d.id == id).cloned())
    }
}

#[async_trait]
impl DishesWriteRepo for MemoryCatalog {
    async fn create_dish(&self, params: CreateDishParams) -> Result<DishRecord, RepoError> {
        let mut state = self.state.write().unwrap();
        if !state.submenus.iter().any(|s| s.id == params.submenu_id) {
            return Err(fk_violation());
        }
        let record = DishRecord {
            id: Uuid::new_v4(),
            submenu_id: params.submenu_id,
            title: params.title,
            description: params.description,
            price: params.price,
            created_at: now(),
            updated_at: now(),
        };
        state.dishes.push(record.clone());
        Ok(record)
    }

    async fn update_dish(&self, params: UpdateDishParams) -> Result<DishRecord, RepoError> {
        let mut state = self.state.write().unwrap();
        let dish = state
            .dishes
            .iter_mut()
            .find(|d| d.id == params.id)
            .ok_or(RepoError::NotFound)?;
        dish.title = params.title;
        dish.description = params.description;
        dish.price = params.price;
        dish.updated_at = now();
        Ok(dish.clone())
    }

    async fn delete_dish(&self, id: Uuid) -> Result<bool, RepoError> {
        let mut state = self.state.write().unwrap();
        let before = state.dishes.len();
        state.dishes.retain(|d| d.id != id);
        Ok(state.dishes.len() < before)
    }
}

fn build_app() -> Router {
    let catalog = Arc::new(MemoryCatalog::default());
    let config = CacheConfig::default();
    let engine = Arc::new(CacheEngine::new(
        Arc::new(MemoryCache::new(&config)),
        &config,
    ));

    let state = ApiState {
        menus: Arc::new(MenuService::new(
            catalog.clone(),
            catalog.clone(),
            engine.clone(),
        )),
        submenus: Arc::new(SubmenuService::new(
            catalog.clone(),
            catalog.clone(),
            engine.clone(),
        )),
        dishes: Arc::new(DishService::new(catalog.clone(), catalog, engine)),
    };

    build_api_router(state)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(value) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn empty_store_lists_are_empty_arrays() {
    let app = build_app();

    let (status, body) = send(&app, "GET", "/api/v1/menus", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn catalog_counts_track_the_tree() {
    let app = build_app();

    let (status, menu) = send(
        &app,
        "POST",
        "/api/v1/menus",
        Some(json!({"title": "Meню", "description": "d"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let menu_id = menu["id"].as_str().expect("generated id").to_string();
    assert_eq!(menu["submenus_count"], 0);
    assert_eq!(menu["dishes_count"], 0);

    let (status, submenu) = send(
        &app,
        "POST",
        &format!("/api/v1/menus/{menu_id}/submenus"),
        Some(json!({"title": "S1"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let submenu_id = submenu["id"].as_str().unwrap().to_string();
    assert_eq!(submenu["dishes_count"], 0);
    assert_eq!(submenu["menu_id"], Value::String(menu_id.clone()));

    let (status, dish) = send(
        &app,
        "POST",
        &format!("/api/v1/menus/{menu_id}/submenus/{submenu_id}/dishes"),
        Some(json!({"title": "D1", "price": "10.20"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(dish["price"], "10.20");

    // The dish create invalidated both ancestor aggregates.
    let (status, menu) = send(&app, "GET", &format!("/api/v1/menus/{menu_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(menu["submenus_count"], 1);
    assert_eq!(menu["dishes_count"], 1);

    let (status, submenu) = send(
        &app,
        "GET",
        &format!("/api/v1/menus/{menu_id}/submenus/{submenu_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(submenu["dishes_count"], 1);
}

#[tokio::test]
async fn cached_menu_list_is_refreshed_after_mutations() {
    let app = build_app();

    let (_, menu) = send(
        &app,
        "POST",
        "/api/v1/menus",
        Some(json!({"title": "Menu", "description": ""})),
    )
    .await;
    let menu_id = menu["id"].as_str().unwrap().to_string();

    // Populate the list cache.
    let (_, listed) = send(&app, "GET", "/api/v1/menus", None).await;
    assert_eq!(listed[0]["submenus_count"], 0);

    let (_, submenu) = send(
        &app,
        "POST",
        &format!("/api/v1/menus/{menu_id}/submenus"),
        Some(json!({"title": "S1"})),
    )
    .await;
    let submenu_id = submenu["id"].as_str().unwrap().to_string();
    send(
        &app,
        "POST",
        &format!("/api/v1/menus/{menu_id}/submenus/{submenu_id}/dishes"),
        Some(json!({"title": "D1", "price": "5.00"})),
    )
    .await;

    // The cached list fell with the mutations; counts are fresh.
    let (_, listed) = send(&app, "GET", "/api/v1/menus", None).await;
    assert_eq!(listed[0]["submenus_count"], 1);
    assert_eq!(listed[0]["dishes_count"], 1);
}

#[tokio::test]
async fn deleting_a_submenu_cascades_to_its_dishes() {
    let app = build_app();

    let (_, menu) = send(
        &app,
        "POST",
        "/api/v1/menus",
        Some(json!({"title": "Menu", "description": ""})),
    )
    .await;
    let menu_id = menu["id"].as_str().unwrap().to_string();
    let (_, submenu) = send(
        &app,
        "POST",
        &format!("/api/v1/menus/{menu_id}/submenus"),
        Some(json!({"title": "S1"})),
    )
    .await;
    let submenu_id = submenu["id"].as_str().unwrap().to_string();
    let (_, dish) = send(
        &app,
        "POST",
        &format!("/api/v1/menus/{menu_id}/submenus/{submenu_id}/dishes"),
        Some(json!({"title": "D1", "price": "10.20"})),
    )
    .await;
    let dish_id = dish["id"].as_str().unwrap().to_string();

    let (status, ack) = send(
        &app,
        "DELETE",
        &format!("/api/v1/menus/{menu_id}/submenus/{submenu_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack["status"], true);
    assert_eq!(ack["message"], "The submenu has been deleted");

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/v1/menus/{menu_id}/submenus/{submenu_id}/dishes/{dish_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, menu) = send(&app, "GET", &format!("/api/v1/menus/{menu_id}"), None).await;
    assert_eq!(menu["submenus_count"], 0);
    assert_eq!(menu["dishes_count"], 0);
}

#[tokio::test]
async fn duplicate_menu_title_is_rejected() {
    let app = build_app();

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/menus",
        Some(json!({"title": "Menu", "description": "first"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/menus",
        Some(json!({"title": "Menu", "description": "second"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "duplicate");

    // The rejected create left no trace.
    let (_, listed) = send(&app, "GET", "/api/v1/menus", None).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["description"], "first");
}

#[tokio::test]
async fn unknown_ids_return_not_found() {
    let app = build_app();
    let missing = Uuid::new_v4();

    let (status, body) = send(&app, "GET", &format!("/api/v1/menus/{missing}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "menu not found");

    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/v1/menus/{missing}"),
        Some(json!({"title": "New", "description": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", &format!("/api/v1/menus/{missing}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_returns_fresh_aggregate_counts() {
    let app = build_app();

    let (_, menu) = send(
        &app,
        "POST",
        "/api/v1/menus",
        Some(json!({"title": "Menu", "description": "old"})),
    )
    .await;
    let menu_id = menu["id"].as_str().unwrap().to_string();
    let (_, submenu) = send(
        &app,
        "POST",
        &format!("/api/v1/menus/{menu_id}/submenus"),
        Some(json!({"title": "S1"})),
    )
    .await;
    let submenu_id = submenu["id"].as_str().unwrap().to_string();
    send(
        &app,
        "POST",
        &format!("/api/v1/menus/{menu_id}/submenus/{submenu_id}/dishes"),
        Some(json!({"title": "D1", "price": "3.50"})),
    )
    .await;

    let (status, updated) = send(
        &app,
        "PATCH",
        &format!("/api/v1/menus/{menu_id}"),
        Some(json!({"title": "Renamed", "description": "new"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Renamed");
    assert_eq!(updated["submenus_count"], 1);
    assert_eq!(updated["dishes_count"], 1);
}

#[tokio::test]
async fn dish_update_changes_price_text() {
    let app = build_app();

    let (_, menu) = send(
        &app,
        "POST",
        "/api/v1/menus",
        Some(json!({"title": "Menu", "description": ""})),
    )
    .await;
    let menu_id = menu["id"].as_str().unwrap().to_string();
    let (_, submenu) = send(
        &app,
        "POST",
        &format!("/api/v1/menus/{menu_id}/submenus"),
        Some(json!({"title": "S1"})),
    )
    .await;
    let submenu_id = submenu["id"].as_str().unwrap().to_string();
    let (_, dish) = send(
        &app,
        "POST",
        &format!("/api/v1/menus/{menu_id}/submenus/{submenu_id}/dishes"),
        Some(json!({"title": "D1", "price": "10.20"})),
    )
    .await;
    let dish_id = dish["id"].as_str().unwrap().to_string();

    // Prime the single-dish cache, then mutate through it.
    send(
        &app,
        "GET",
        &format!("/api/v1/menus/{menu_id}/submenus/{submenu_id}/dishes/{dish_id}"),
        None,
    )
    .await;

    let (status, updated) = send(
        &app,
        "PATCH",
        &format!("/api/v1/menus/{menu_id}/submenus/{submenu_id}/dishes/{dish_id}"),
        Some(json!({"title": "D1", "price": "12.00"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["price"], "12.00");

    let (_, fetched) = send(
        &app,
        "GET",
        &format!("/api/v1/menus/{menu_id}/submenus/{submenu_id}/dishes/{dish_id}"),
        None,
    )
    .await;
    assert_eq!(fetched["price"], "12.00");
}

#[tokio::test]
async fn creating_under_a_missing_parent_is_not_found() {
    let app = build_app();
    let missing = Uuid::new_v4();

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/v1/menus/{missing}/submenus"),
        Some(json!({"title": "S1"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/v1/menus/{missing}/submenus/{}/dishes", Uuid::new_v4()),
        Some(json!({"title": "D1", "price": "1.00"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_a_menu_acknowledges_and_removes_the_tree() {
    let app = build_app();

    let (_, menu) = send(
        &app,
        "POST",
        "/api/v1/menus",
        Some(json!({"title": "Menu", "description": ""})),
    )
    .await;
    let menu_id = menu["id"].as_str().unwrap().to_string();
    let (_, submenu) = send(
        &app,
        "POST",
        &format!("/api/v1/menus/{menu_id}/submenus"),
        Some(json!({"title": "S1"})),
    )
    .await;
    let submenu_id = submenu["id"].as_str().unwrap().to_string();

    let (status, ack) = send(&app, "DELETE", &format!("/api/v1/menus/{menu_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack["message"], "The menu has been deleted");

    let (status, _) = send(&app, "GET", &format!("/api/v1/menus/{menu_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/v1/menus/{menu_id}/submenus/{submenu_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
