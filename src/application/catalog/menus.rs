use std::sync::Arc;

use uuid::Uuid;

use crate::application::error::CatalogError;
use crate::application::repos::{
    CreateMenuParams, MenusRepo, MenusWriteRepo, RepoError, UpdateMenuParams,
};
use crate::cache::{CacheEngine, CacheKey, Mutation};
use crate::domain::views::{DeleteAck, MenuView};

#[derive(Debug, Clone)]
pub struct CreateMenuCommand {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct UpdateMenuCommand {
    pub id: Uuid,
    pub title: String,
    pub description: String,
}

#[derive(Clone)]
pub struct MenuService {
    reader: Arc<dyn MenusRepo>,
    writer: Arc<dyn MenusWriteRepo>,
    cache: Arc<CacheEngine>,
}

impl MenuService {
    pub fn new(
        reader: Arc<dyn MenusRepo>,
        writer: Arc<dyn MenusWriteRepo>,
        cache: Arc<CacheEngine>,
    ) -> Self {
        Self {
            reader,
            writer,
            cache,
        }
    }

    pub async fn list(&self) -> Result<Vec<MenuView>, CatalogError> {
        if let Some(views) = self.cache.get::<Vec<MenuView>>(&CacheKey::MenuList).await {
            return Ok(views);
        }

        let trees = self.reader.list_menu_trees().await?;
        let views = MenuView::build_list(&trees);
        self.cache.put(&CacheKey::MenuList, &views).await;
        Ok(views)
    }

    pub async fn get(&self, id: Uuid) -> Result<MenuView, CatalogError> {
        let key = CacheKey::Menu(Some(id));
        if let Some(view) = self.cache.get::<MenuView>(&key).await {
            return Ok(view);
        }

        let tree = self
            .reader
            .find_menu_tree(id)
            .await?
            .ok_or_else(|| CatalogError::not_found("menu"))?;
        let view = MenuView::build(&tree);
        self.cache.put(&key, &view).await;
        Ok(view)
    }

    /// Rejects a duplicate title before touching the store, so a rejected
    /// create performs no mutation and no invalidation.
    pub async fn create(&self, command: CreateMenuCommand) -> Result<MenuView, CatalogError> {
        if self
            .reader
            .find_menu_by_title(&command.title)
            .await?
            .is_some()
        {
            return Err(CatalogError::DuplicateTitle {
                title: command.title,
            });
        }

        let menu = self
            .writer
            .create_menu(CreateMenuParams {
                title: command.title.clone(),
                description: command.description,
            })
            .await
            .map_err(|err| match err {
                // Lost the race against a concurrent create with the same title.
                RepoError::Duplicate { .. } => CatalogError::DuplicateTitle {
                    title: command.title,
                },
                other => CatalogError::from(other),
            })?;

        self.cache
            .invalidate_for(&Mutation::Menu {
                menu: Some(menu.id),
            })
            .await;
        Ok(MenuView::leaf(&menu))
    }

    pub async fn update(&self, command: UpdateMenuCommand) -> Result<MenuView, CatalogError> {
        let id = command.id;
        self.writer
            .update_menu(UpdateMenuParams {
                id,
                title: command.title,
                description: command.description,
            })
            .await
            .map_err(|err| match err {
                RepoError::NotFound => CatalogError::not_found("menu"),
                other => CatalogError::from(other),
            })?;

        self.cache
            .invalidate_for(&Mutation::Menu { menu: Some(id) })
            .await;

        // Read back through the cache so the response carries fresh counts.
        self.get(id).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<DeleteAck, CatalogError> {
        if !self.writer.delete_menu(id).await? {
            return Err(CatalogError::not_found("menu"));
        }

        self.cache
            .invalidate_for(&Mutation::Menu { menu: Some(id) })
            .await;
        Ok(DeleteAck::new("menu"))
    }
}
