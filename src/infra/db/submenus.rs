use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{
    CreateSubmenuParams, RepoError, SubmenusRepo, SubmenusWriteRepo, UpdateSubmenuParams,
};
use crate::domain::entities::{SubmenuRecord, SubmenuTree};

use super::dishes::DishRow;
use super::{PostgresCatalog, assemble_submenu_trees, map_sqlx_error};

#[derive(sqlx::FromRow)]
pub(crate) struct SubmenuRow {
    id: Uuid,
    menu_id: Uuid,
    title: String,
    description: String,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<SubmenuRow> for SubmenuRecord {
    fn from(row: SubmenuRow) -> Self {
        Self {
            id: row.id,
            menu_id: row.menu_id,
            title: row.title,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const SUBMENU_COLUMNS: &str = "id, menu_id, title, description, created_at, updated_at";

#[async_trait]
impl SubmenusRepo for PostgresCatalog {
    async fn list_submenu_trees(&self) -> Result<Vec<SubmenuTree>, RepoError> {
        let submenus: Vec<SubmenuRow> = sqlx::query_as(&format!(
            "SELECT {SUBMENU_COLUMNS} FROM submenus ORDER BY created_at, id"
        ))
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        let dishes: Vec<DishRow> = sqlx::query_as(
            "SELECT id, submenu_id, title, description, price, created_at, updated_at \
             FROM dishes ORDER BY created_at, id",
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(assemble_submenu_trees(
            submenus.into_iter().map(Into::into).collect(),
            dishes.into_iter().map(Into::into).collect(),
        ))
    }

    async fn find_submenu_tree(&self, id: Uuid) -> Result<Option<SubmenuTree>, RepoError> {
        let submenu: Option<SubmenuRow> = sqlx::query_as(&format!(
            "SELECT {SUBMENU_COLUMNS} FROM submenus WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        let Some(submenu) = submenu else {
            return Ok(None);
        };

        let dishes: Vec<DishRow> = sqlx::query_as(
            "SELECT id, submenu_id, title, description, price, created_at, updated_at \
             FROM dishes WHERE submenu_id = $1 ORDER BY created_at, id",
        )
        .bind(id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(Some(SubmenuTree {
            submenu: submenu.into(),
            dishes: dishes.into_iter().map(Into::into).collect(),
        }))
    }
}

#[async_trait]
impl SubmenusWriteRepo for PostgresCatalog {
    async fn create_submenu(
        &self,
        params: CreateSubmenuParams,
    ) -> Result<SubmenuRecord, RepoError> {
        let id = Uuid::new_v4();
        let now = OffsetDateTime::now_utc();

        let row: SubmenuRow = sqlx::query_as(&format!(
            "INSERT INTO submenus (id, menu_id, title, description, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $5) \
             RETURNING {SUBMENU_COLUMNS}"
        ))
        .bind(id)
        .bind(params.menu_id)
        .bind(params.title)
        .bind(params.description)
        .bind(now)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn update_submenu(
        &self,
        params: UpdateSubmenuParams,
    ) -> Result<SubmenuRecord, RepoError> {
        let row: Option<SubmenuRow> = sqlx::query_as(&format!(
            "UPDATE submenus \
             SET title = $2, description = $3, updated_at = now() \
             WHERE id = $1 \
             RETURNING {SUBMENU_COLUMNS}"
        ))
        .bind(params.id)
        .bind(params.title)
        .bind(params.description)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        row.map(SubmenuRecord::from).ok_or(RepoError::NotFound)
    }

    async fn delete_submenu(&self, id: Uuid) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM submenus WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}
