use std::sync::Arc;

use uuid::Uuid;

use crate::application::error::CatalogError;
use crate::application::repos::{
    CreateSubmenuParams, RepoError, SubmenusRepo, SubmenusWriteRepo, UpdateSubmenuParams,
};
use crate::cache::{CacheEngine, CacheKey, Mutation};
use crate::domain::views::{DeleteAck, SubmenuView};

#[derive(Debug, Clone)]
pub struct CreateSubmenuCommand {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct UpdateSubmenuCommand {
    pub id: Uuid,
    pub title: String,
    pub description: String,
}

#[derive(Clone)]
pub struct SubmenuService {
    reader: Arc<dyn SubmenusRepo>,
    writer: Arc<dyn SubmenusWriteRepo>,
    cache: Arc<CacheEngine>,
}

impl SubmenuService {
    pub fn new(
        reader: Arc<dyn SubmenusRepo>,
        writer: Arc<dyn SubmenusWriteRepo>,
        cache: Arc<CacheEngine>,
    ) -> Self {
        Self {
            reader,
            writer,
            cache,
        }
    }

    pub async fn list(&self) -> Result<Vec<SubmenuView>, CatalogError> {
        if let Some(views) = self
            .cache
            .get::<Vec<SubmenuView>>(&CacheKey::SubmenuList)
            .await
        {
            return Ok(views);
        }

        let trees = self.reader.list_submenu_trees().await?;
        let views = SubmenuView::build_list(&trees);
        self.cache.put(&CacheKey::SubmenuList, &views).await;
        Ok(views)
    }

    pub async fn get(&self, id: Uuid) -> Result<SubmenuView, CatalogError> {
        let key = CacheKey::Submenu(Some(id));
        if let Some(view) = self.cache.get::<SubmenuView>(&key).await {
            return Ok(view);
        }

        let tree = self
            .reader
            .find_submenu_tree(id)
            .await?
            .ok_or_else(|| CatalogError::not_found("submenu"))?;
        let view = SubmenuView::build(&tree);
        self.cache.put(&key, &view).await;
        Ok(view)
    }

    pub async fn create(
        &self,
        menu_id: Uuid,
        command: CreateSubmenuCommand,
    ) -> Result<SubmenuView, CatalogError> {
        let submenu = self
            .writer
            .create_submenu(CreateSubmenuParams {
                menu_id,
                title: command.title,
                description: command.description,
            })
            .await
            .map_err(|err| match err {
                // The FK rejected the parent reference.
                RepoError::InvalidInput { .. } => CatalogError::not_found("menu"),
                other => CatalogError::from(other),
            })?;

        self.cache
            .invalidate_for(&Mutation::Submenu {
                menu: Some(menu_id),
                submenu: Some(submenu.id),
            })
            .await;
        Ok(SubmenuView::leaf(&submenu))
    }

    pub async fn update(
        &self,
        menu_id: Uuid,
        command: UpdateSubmenuCommand,
    ) -> Result<SubmenuView, CatalogError> {
        let id = command.id;
        self.writer
            .update_submenu(UpdateSubmenuParams {
                id,
                title: command.title,
                description: command.description,
            })
            .await
            .map_err(|err| match err {
                RepoError::NotFound => CatalogError::not_found("submenu"),
                other => CatalogError::from(other),
            })?;

        self.cache
            .invalidate_for(&Mutation::Submenu {
                menu: Some(menu_id),
                submenu: Some(id),
            })
            .await;

        self.get(id).await
    }

    pub async fn delete(&self, menu_id: Uuid, id: Uuid) -> Result<DeleteAck, CatalogError> {
        if !self.writer.delete_submenu(id).await? {
            return Err(CatalogError::not_found("submenu"));
        }

        self.cache
            .invalidate_for(&Mutation::Submenu {
                menu: Some(menu_id),
                submenu: Some(id),
            })
            .await;
        Ok(DeleteAck::new("submenu"))
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use time::OffsetDateTime;

    use super::*;
    use crate::cache::{CacheConfig, MemoryCache};
    use crate::domain::entities::{DishRecord, SubmenuRecord, SubmenuTree};
    use crate::domain::views::MenuView;

    fn sample_submenu(id: Uuid, menu_id: Uuid) -> SubmenuRecord {
        SubmenuRecord {
            id,
            menu_id,
            title: "S1".to_string(),
            description: String::new(),
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    fn sample_dish(submenu_id: Uuid) -> DishRecord {
        DishRecord {
            id: Uuid::new_v4(),
            submenu_id,
            title: "D1".to_string(),
            description: String::new(),
            price: "10.20".to_string(),
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    struct StubSubmenusRepo {
        trees: Vec<SubmenuTree>,
    }

    #[async_trait]
    impl SubmenusRepo for StubSubmenusRepo {
        async fn list_submenu_trees(&self) -> Result<Vec<SubmenuTree>, RepoError> {
            Ok(self.trees.clone())
        }

        async fn find_submenu_tree(&self, id: Uuid) -> Result<Option<SubmenuTree>, RepoError> {
            Ok(self.trees.iter().find(|t| t.submenu.id == id).cloned())
        }
    }

    struct StubSubmenusWriter {
        parent_missing: bool,
    }

    #[async_trait]
    impl SubmenusWriteRepo for StubSubmenusWriter {
        async fn create_submenu(
            &self,
            params: CreateSubmenuParams,
        ) -> Result<SubmenuRecord, RepoError> {
            if self.parent_missing {
                return Err(RepoError::InvalidInput {
                    message: "violates foreign key constraint".to_string(),
                });
            }
            let mut record = sample_submenu(Uuid::new_v4(), params.menu_id);
            record.title = params.title;
            record.description = params.description;
            Ok(record)
        }

        async fn update_submenu(
            &self,
            _params: UpdateSubmenuParams,
        ) -> Result<SubmenuRecord, RepoError> {
            Err(RepoError::NotFound)
        }

        async fn delete_submenu(&self, _id: Uuid) -> Result<bool, RepoError> {
            Ok(true)
        }
    }

    fn build_service(
        trees: Vec<SubmenuTree>,
        parent_missing: bool,
    ) -> (SubmenuService, Arc<CacheEngine>) {
        let config = CacheConfig::default();
        let cache = Arc::new(CacheEngine::new(
            Arc::new(MemoryCache::new(&config)),
            &config,
        ));
        (
            SubmenuService::new(
                Arc::new(StubSubmenusRepo { trees }),
                Arc::new(StubSubmenusWriter { parent_missing }),
                cache.clone(),
            ),
            cache,
        )
    }

    #[tokio::test]
    async fn get_counts_child_dishes() {
        let menu_id = Uuid::new_v4();
        let submenu = sample_submenu(Uuid::new_v4(), menu_id);
        let tree = SubmenuTree {
            dishes: vec![sample_dish(submenu.id), sample_dish(submenu.id)],
            submenu: submenu.clone(),
        };
        let (service, _) = build_service(vec![tree], false);

        let view = service.get(submenu.id).await.expect("get succeeds");
        assert_eq!(view.dishes_count, 2);
        assert_eq!(view.menu_id, menu_id);
    }

    #[tokio::test]
    async fn create_returns_zero_dishes_and_parent_id() {
        let menu_id = Uuid::new_v4();
        let (service, _) = build_service(Vec::new(), false);

        let view = service
            .create(
                menu_id,
                CreateSubmenuCommand {
                    title: "S1".to_string(),
                    description: String::new(),
                },
            )
            .await
            .expect("create succeeds");

        assert_eq!(view.dishes_count, 0);
        assert_eq!(view.menu_id, menu_id);
    }

    #[tokio::test]
    async fn create_under_missing_menu_is_not_found() {
        let (service, _) = build_service(Vec::new(), true);

        let result = service
            .create(
                Uuid::new_v4(),
                CreateSubmenuCommand {
                    title: "S1".to_string(),
                    description: String::new(),
                },
            )
            .await;

        match result {
            Err(CatalogError::NotFound { entity }) => assert_eq!(entity, "menu"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn create_drops_parent_menu_key() {
        let menu_id = Uuid::new_v4();
        let (service, cache) = build_service(Vec::new(), false);

        let parent_key = CacheKey::Menu(Some(menu_id));
        cache
            .put(
                &parent_key,
                &MenuView {
                    id: menu_id,
                    title: "Menu".to_string(),
                    description: String::new(),
                    submenus_count: 0,
                    dishes_count: 0,
                },
            )
            .await;

        service
            .create(
                menu_id,
                CreateSubmenuCommand {
                    title: "S1".to_string(),
                    description: String::new(),
                },
            )
            .await
            .expect("create succeeds");

        let cached: Option<MenuView> = cache.get(&parent_key).await;
        assert!(cached.is_none(), "submenu create must drop the parent menu");
    }

    #[tokio::test]
    async fn delete_acknowledges() {
        let (service, _) = build_service(Vec::new(), false);

        let ack = service
            .delete(Uuid::new_v4(), Uuid::new_v4())
            .await
            .expect("delete succeeds");
        assert!(ack.status);
        assert_eq!(ack.message, "The submenu has been deleted");
    }

    #[tokio::test]
    async fn update_unknown_submenu_is_not_found() {
        let (service, _) = build_service(Vec::new(), false);

        let result = service
            .update(
                Uuid::new_v4(),
                UpdateSubmenuCommand {
                    id: Uuid::new_v4(),
                    title: "S1".to_string(),
                    description: String::new(),
                },
            )
            .await;

        match result {
            Err(CatalogError::NotFound { entity }) => assert_eq!(entity, "submenu"),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
