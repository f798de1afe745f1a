//! Postgres-backed repository implementations.

mod dishes;
mod menus;
mod submenus;

use std::collections::HashMap;
use std::sync::Arc;

use sqlx::{
    postgres::{PgPool, PgPoolOptions},
    query,
};
use uuid::Uuid;

use crate::application::repos::RepoError;
use crate::domain::entities::{DishRecord, MenuRecord, MenuTree, SubmenuRecord, SubmenuTree};

#[derive(Clone)]
pub struct PostgresCatalog {
    pool: Arc<PgPool>,
}

impl PostgresCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn connect(url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
    }

    pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations")
            .run(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        query("SELECT 1").execute(self.pool()).await.map(|_| ())
    }
}

pub fn map_sqlx_error(err: sqlx::Error) -> RepoError {
    match err {
        sqlx::Error::RowNotFound => RepoError::NotFound,
        sqlx::Error::Database(db) if db.message().contains("duplicate key") => {
            RepoError::Duplicate {
                constraint: db.constraint().unwrap_or("unknown").to_string(),
            }
        }
        sqlx::Error::Database(db)
            if db.message().contains("violates foreign key constraint")
                || db.message().contains("invalid input syntax") =>
        {
            RepoError::InvalidInput {
                message: db.message().to_string(),
            }
        }
        sqlx::Error::Database(db)
            if db
                .message()
                .contains("canceling statement due to user request") =>
        {
            RepoError::Timeout
        }
        other => RepoError::from_persistence(other),
    }
}

/// Group eagerly fetched dishes under their parent submenus.
pub(crate) fn assemble_submenu_trees(
    submenus: Vec<SubmenuRecord>,
    dishes: Vec<DishRecord>,
) -> Vec<SubmenuTree> {
    let mut by_submenu: HashMap<Uuid, Vec<DishRecord>> = HashMap::new();
    for dish in dishes {
        by_submenu.entry(dish.submenu_id).or_default().push(dish);
    }

    submenus
        .into_iter()
        .map(|submenu| SubmenuTree {
            dishes: by_submenu.remove(&submenu.id).unwrap_or_default(),
            submenu,
        })
        .collect()
}

/// Group submenu trees under their parent menus, preserving menu order.
pub(crate) fn assemble_menu_trees(
    menus: Vec<MenuRecord>,
    submenu_trees: Vec<SubmenuTree>,
) -> Vec<MenuTree> {
    let mut by_menu: HashMap<Uuid, Vec<SubmenuTree>> = HashMap::new();
    for tree in submenu_trees {
        by_menu.entry(tree.submenu.menu_id).or_default().push(tree);
    }

    menus
        .into_iter()
        .map(|menu| MenuTree {
            submenus: by_menu.remove(&menu.id).unwrap_or_default(),
            menu,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use time::OffsetDateTime;

    use super::*;
    use crate::domain::entities::MenuRecord;

    fn menu(id: Uuid) -> MenuRecord {
        MenuRecord {
            id,
            title: format!("menu-{id}"),
            description: String::new(),
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    fn submenu(id: Uuid, menu_id: Uuid) -> SubmenuRecord {
        SubmenuRecord {
            id,
            menu_id,
            title: String::new(),
            description: String::new(),
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    fn dish(submenu_id: Uuid) -> DishRecord {
        DishRecord {
            id: Uuid::new_v4(),
            submenu_id,
            title: String::new(),
            description: String::new(),
            price: "1.00".to_string(),
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn assembly_groups_descendants_under_parents() {
        let menu_a = Uuid::new_v4();
        let menu_b = Uuid::new_v4();
        let sub_a = Uuid::new_v4();
        let sub_b = Uuid::new_v4();

        let submenu_trees = assemble_submenu_trees(
            vec![submenu(sub_a, menu_a), submenu(sub_b, menu_b)],
            vec![dish(sub_a), dish(sub_a), dish(sub_b)],
        );
        assert_eq!(submenu_trees[0].dishes.len(), 2);
        assert_eq!(submenu_trees[1].dishes.len(), 1);

        let trees = assemble_menu_trees(vec![menu(menu_a), menu(menu_b)], submenu_trees);
        assert_eq!(trees.len(), 2);
        assert_eq!(trees[0].submenus.len(), 1);
        assert_eq!(trees[0].submenus[0].dishes.len(), 2);
        assert_eq!(trees[1].submenus[0].dishes.len(), 1);
    }

    #[test]
    fn assembly_tolerates_childless_parents() {
        let menu_id = Uuid::new_v4();
        let trees = assemble_menu_trees(vec![menu(menu_id)], Vec::new());
        assert_eq!(trees.len(), 1);
        assert!(trees[0].submenus.is_empty());
    }
}
