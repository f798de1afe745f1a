use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{
    CreateMenuParams, MenusRepo, MenusWriteRepo, RepoError, UpdateMenuParams,
};
use crate::domain::entities::{MenuRecord, MenuTree};

use super::{PostgresCatalog, assemble_menu_trees, assemble_submenu_trees, map_sqlx_error};
use super::{dishes::DishRow, submenus::SubmenuRow};

#[derive(sqlx::FromRow)]
pub(crate) struct MenuRow {
    id: Uuid,
    title: String,
    description: String,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<MenuRow> for MenuRecord {
    fn from(row: MenuRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const MENU_COLUMNS: &str = "id, title, description, created_at, updated_at";

#[async_trait]
impl MenusRepo for PostgresCatalog {
    async fn list_menu_trees(&self) -> Result<Vec<MenuTree>, RepoError> {
        let menus: Vec<MenuRow> = sqlx::query_as(&format!(
            "SELECT {MENU_COLUMNS} FROM menus ORDER BY created_at, id"
        ))
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        let submenus: Vec<SubmenuRow> = sqlx::query_as(
            "SELECT id, menu_id, title, description, created_at, updated_at \
             FROM submenus ORDER BY created_at, id",
        )
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

        let submenu_trees = assemble_submenu_trees(
            submenus.into_iter().map(Into::into).collect(),
            dishes.into_iter().map(Into::into).collect(),
        );
        Ok(assemble_menu_trees(
            menus.into_iter().map(Into::into).collect(),
            submenu_trees,
        ))
    }

    async fn find_menu_tree(&self, id: Uuid) -> Result<Option<MenuTree>, RepoError> {
        let menu: Option<MenuRow> =
            sqlx::query_as(&format!("SELECT {MENU_COLUMNS} FROM menus WHERE id = $1"))
                .bind(id)
                .fetch_optional(self.pool())
                .await
                .map_err(map_sqlx_error)?;

        let Some(menu) = menu else {
            return Ok(None);
        };

        let submenus: Vec<SubmenuRow> = sqlx::query_as(
            "SELECT id, menu_id, title, description, created_at, updated_at \
             FROM submenus WHERE menu_id = $1 ORDER BY created_at, id",
        )
        .bind(id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        let dishes: Vec<DishRow> = sqlx::query_as(
            "SELECT d.id, d.submenu_id, d.title, d.description, d.price, \
                    d.created_at, d.updated_at \
             FROM dishes d \
             INNER JOIN submenus s ON s.id = d.submenu_id \
             WHERE s.menu_id = $1 \
             ORDER BY d.created_at, d.id",
        )
        .bind(id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        let submenus = assemble_submenu_trees(
            submenus.into_iter().map(Into::into).collect(),
            dishes.into_iter().map(Into::into).collect(),
        );
        Ok(Some(MenuTree {
            menu: menu.into(),
            submenus,
        }))
    }

    async fn find_menu_by_title(&self, title: &str) -> Result<Option<MenuRecord>, RepoError> {
        let row: Option<MenuRow> = sqlx::query_as(&format!(
            "SELECT {MENU_COLUMNS} FROM menus WHERE title = $1"
        ))
        .bind(title)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(MenuRecord::from))
    }
}

#[async_trait]
impl MenusWriteRepo for PostgresCatalog {
    async fn create_menu(&self, params: CreateMenuParams) -> Result<MenuRecord, RepoError> {
        let id = Uuid::new_v4();
        let now = OffsetDateTime::now_utc();

        let row: MenuRow = sqlx::query_as(&format!(
            "INSERT INTO menus (id, title, description, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $4) \
             RETURNING {MENU_COLUMNS}"
        ))
        .bind(id)
        .bind(params.title)
        .bind(params.description)
        .bind(now)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn update_menu(&self, params: UpdateMenuParams) -> Result<MenuRecord, RepoError> {
        let row: Option<MenuRow> = sqlx::query_as(&format!(
            "UPDATE menus \
             SET title = $2, description = $3, updated_at = now() \
             WHERE id = $1 \
             RETURNING {MENU_COLUMNS}"
        ))
        .bind(params.id)
        .bind(params.title)
        .bind(params.description)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        row.map(MenuRecord::from).ok_or(RepoError::NotFound)
    }

    async fn delete_menu(&self, id: Uuid) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM menus WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}
