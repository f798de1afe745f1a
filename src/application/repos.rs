//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::entities::{DishRecord, MenuRecord, MenuTree, SubmenuRecord, SubmenuTree};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct CreateMenuParams {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct UpdateMenuParams {
    pub id: Uuid,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct CreateSubmenuParams {
    pub menu_id: Uuid,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct UpdateSubmenuParams {
    pub id: Uuid,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct CreateDishParams {
    pub submenu_id: Uuid,
    pub title: String,
    pub description: String,
    pub price: String,
}

#[derive(Debug, Clone)]
pub struct UpdateDishParams {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub price: String,
}

#[async_trait]
pub trait MenusRepo: Send + Sync {
    /// Every menu with its full descendant subtree, eagerly fetched.
    async fn list_menu_trees(&self) -> Result<Vec<MenuTree>, RepoError>;

    async fn find_menu_tree(&self, id: Uuid) -> Result<Option<MenuTree>, RepoError>;

    async fn find_menu_by_title(&self, title: &str) -> Result<Option<MenuRecord>, RepoError>;
}

#[async_trait]
pub trait MenusWriteRepo: Send + Sync {
    async fn create_menu(&self, params: CreateMenuParams) -> Result<MenuRecord, RepoError>;

    /// Returns [`RepoError::NotFound`] when no row matches.
    async fn update_menu(&self, params: UpdateMenuParams) -> Result<MenuRecord, RepoError>;

    /// Cascades to child submenus and their dishes. Returns whether a row was
    /// actually deleted.
    async fn delete_menu(&self, id: Uuid) -> Result<bool, RepoError>;
}

#[async_trait]
pub trait SubmenusRepo: Send + Sync {
    async fn list_submenu_trees(&self) -> Result<Vec<SubmenuTree>, RepoError>;

    async fn find_submenu_tree(&self, id: Uuid) -> Result<Option<SubmenuTree>, RepoError>;
}

#[async_trait]
pub trait SubmenusWriteRepo: Send + Sync {
    async fn create_submenu(&self, params: CreateSubmenuParams)
    -> Result<SubmenuRecord, RepoError>;

    /// Returns [`RepoError::NotFound`] when no row matches.
    async fn update_submenu(&self, params: UpdateSubmenuParams)
    -> Result<SubmenuRecord, RepoError>;

    /// Cascades to child dishes. Returns whether a row was actually deleted.
    async fn delete_submenu(&self, id: Uuid) -> Result<bool, RepoError>;
}

#[async_trait]
pub trait DishesRepo: Send + Sync {
    async fn list_dishes(&self) -> Result<Vec<DishRecord>, RepoError>;

    async fn find_dish(&self, id: Uuid) -> Result<Option<DishRecord>, RepoError>;
}

#[async_trait]
pub trait DishesWriteRepo: Send + Sync {
    async fn create_dish(&self, params: CreateDishParams) -> Result<DishRecord, RepoError>;

    /// Returns [`RepoError::NotFound`] when no row matches.
    async fn update_dish(&self, params: UpdateDishParams) -> Result<DishRecord, RepoError>;

    async fn delete_dish(&self, id: Uuid) -> Result<bool, RepoError>;
}
