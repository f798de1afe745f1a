use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{
    CreateDishParams, DishesRepo, DishesWriteRepo, RepoError, UpdateDishParams,
};
use crate::domain::entities::DishRecord;

use super::{PostgresCatalog, map_sqlx_error};

#[derive(sqlx::FromRow)]
pub(crate) struct DishRow {
    id: Uuid,
    submenu_id: Uuid,
    title: String,
    description: String,
    price: String,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<DishRow> for DishRecord {
    fn from(row: DishRow) -> Self {
        Self {
            id: row.id,
            submenu_id: row.submenu_id,
            title: row.title,
            description: row.description,
            price: row.price,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const DISH_COLUMNS: &str = "id, submenu_id, title, description, price, created_at, updated_at";

#[async_trait]
impl DishesRepo for PostgresCatalog {
    async fn list_dishes(&self) -> Result<Vec<DishRecord>, RepoError> {
        let rows: Vec<DishRow> = sqlx::query_as(&format!(
            "SELECT {DISH_COLUMNS} FROM dishes ORDER BY created_at, id"
        ))
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(DishRecord::from).collect())
    }

    async fn find_dish(&self, id: Uuid) -> Result<Option<DishRecord>, RepoError> {
        let row: Option<DishRow> = sqlx::query_as(&format!(
            "SELECT {DISH_COLUMNS} FROM dishes WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(DishRecord::from))
    }
}

#[async_trait]
impl DishesWriteRepo for PostgresCatalog {
    async fn create_dish(&self, params: CreateDishParams) -> Result<DishRecord, RepoError> {
        let id = Uuid::new_v4();
        let now = OffsetDateTime::now_utc();

        let row: DishRow = sqlx::query_as(&format!(
            "INSERT INTO dishes (id, submenu_id, title, description, price, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $6) \
             RETURNING {DISH_COLUMNS}"
        ))
        .bind(id)
        .bind(params.submenu_id)
        .bind(params.title)
        .bind(params.description)
        .bind(params.price)
        .bind(now)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn update_dish(&self, params: UpdateDishParams) -> Result<DishRecord, RepoError> {
        let row: Option<DishRow> = sqlx::query_as(&format!(
            "UPDATE dishes \
             SET title = $2, description = $3, price = $4, updated_at = now() \
             WHERE id = $1 \
             RETURNING {DISH_COLUMNS}"
        ))
        .bind(params.id)
        .bind(params.title)
        .bind(params.description)
        .bind(params.price)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        row.map(DishRecord::from).ok_or(RepoError::NotFound)
    }

    async fn delete_dish(&self, id: Uuid) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM dishes WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}
