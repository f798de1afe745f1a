use std::sync::Arc;

use uuid::Uuid;

use crate::application::error::CatalogError;
use crate::application::repos::{
    CreateDishParams, DishesRepo, DishesWriteRepo, RepoError, UpdateDishParams,
};
use crate::cache::{CacheEngine, CacheKey, Mutation};
use crate::domain::views::{DeleteAck, DishView};

#[derive(Debug, Clone)]
pub struct CreateDishCommand {
    pub title: String,
    pub description: String,
    pub price: String,
}

#[derive(Debug, Clone)]
pub struct UpdateDishCommand {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub price: String,
}

/// Dish mutations carry both ancestor ids so the invalidation cascade can
/// reach the parent submenu and grandparent menu aggregates.
#[derive(Clone)]
pub struct DishService {
    reader: Arc<dyn DishesRepo>,
    writer: Arc<dyn DishesWriteRepo>,
    cache: Arc<CacheEngine>,
}

impl DishService {
    pub fn new(
        reader: Arc<dyn DishesRepo>,
        writer: Arc<dyn DishesWriteRepo>,
        cache: Arc<CacheEngine>,
    ) -> Self {
        Self {
            reader,
            writer,
            cache,
        }
    }

    pub async fn list(&self) -> Result<Vec<DishView>, CatalogError> {
        if let Some(views) = self.cache.get::<Vec<DishView>>(&CacheKey::DishList).await {
            return Ok(views);
        }

        let dishes = self.reader.list_dishes().await?;
        let views: Vec<DishView> = dishes.iter().map(DishView::from).collect();
        self.cache.put(&CacheKey::DishList, &views).await;
        Ok(views)
    }

    pub async fn get(&self, id: Uuid) -> Result<DishView, CatalogError> {
        let key = CacheKey::Dish(Some(id));
        if let Some(view) = self.cache.get::<DishView>(&key).await {
            return Ok(view);
        }

        let dish = self
            .reader
            .find_dish(id)
            .await?
            .ok_or_else(|| CatalogError::not_found("dish"))?;
        let view = DishView::from(&dish);
        self.cache.put(&key, &view).await;
        Ok(view)
    }

    pub async fn create(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
        command: CreateDishCommand,
    ) -> Result<DishView, CatalogError> {
        let dish = self
            .writer
            .create_dish(CreateDishParams {
                submenu_id,
                title: command.title,
                description: command.description,
                price: command.price,
            })
            .await
            .map_err(|err| match err {
                // The FK rejected the parent reference.
                RepoError::InvalidInput { .. } => CatalogError::not_found("submenu"),
                other => CatalogError::from(other),
            })?;

        self.cache
            .invalidate_for(&Mutation::Dish {
                menu: Some(menu_id),
                submenu: Some(submenu_id),
                dish: Some(dish.id),
            })
            .await;
        Ok(DishView::from(&dish))
    }

    pub async fn update(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
        command: UpdateDishCommand,
    ) -> Result<DishView, CatalogError> {
        let id = command.id;
        self.writer
            .update_dish(UpdateDishParams {
                id,
                title: command.title,
                description: command.description,
                price: command.price,
            })
            .await
            .map_err(|err| match err {
                RepoError::NotFound => CatalogError::not_found("dish"),
                other => CatalogError::from(other),
            })?;

        self.cache
            .invalidate_for(&Mutation::Dish {
                menu: Some(menu_id),
                submenu: Some(submenu_id),
                dish: Some(id),
            })
            .await;

        self.get(id).await
    }

    pub async fn delete(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
        id: Uuid,
    ) -> Result<DeleteAck, CatalogError> {
        if !self.writer.delete_dish(id).await? {
            return Err(CatalogError::not_found("dish"));
        }

        self.cache
            .invalidate_for(&Mutation::Dish {
                menu: Some(menu_id),
                submenu: Some(submenu_id),
                dish: Some(id),
            })
            .await;
        Ok(DeleteAck::new("dish"))
    }
}
