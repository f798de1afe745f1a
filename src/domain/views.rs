//! Aggregate views served to clients and written to the cache.
//!
//! Each view carries a fixed field list so the wire shape (and the cached
//! value shape) is a stated contract. Derived counts are computed here by
//! walking the eagerly fetched menu→submenu→dish tree.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::{DishRecord, MenuRecord, MenuTree, SubmenuRecord, SubmenuTree};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuView {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub submenus_count: usize,
    pub dishes_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmenuView {
    pub id: Uuid,
    pub menu_id: Uuid,
    pub title: String,
    pub description: String,
    pub dishes_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DishView {
    pub id: Uuid,
    pub submenu_id: Uuid,
    pub title: String,
    pub description: String,
    pub price: String,
}

/// Uniform acknowledgement returned by every delete operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteAck {
    pub status: bool,
    pub message: String,
}

impl MenuView {
    /// Build the aggregate view for a menu subtree.
    ///
    /// `dishes_count` sums dish counts across all child submenus.
    pub fn build(tree: &MenuTree) -> Self {
        let dishes_count = tree.submenus.iter().map(|s| s.dishes.len()).sum();
        Self {
            id: tree.menu.id,
            title: tree.menu.title.clone(),
            description: tree.menu.description.clone(),
            submenus_count: tree.submenus.len(),
            dishes_count,
        }
    }

    /// View for a menu known to have no descendants yet (just created).
    pub fn leaf(menu: &MenuRecord) -> Self {
        Self {
            id: menu.id,
            title: menu.title.clone(),
            description: menu.description.clone(),
            submenus_count: 0,
            dishes_count: 0,
        }
    }

    /// Apply [`MenuView::build`] to each tree independently. An empty store
    /// yields an empty list, which is a valid cacheable result.
    pub fn build_list(trees: &[MenuTree]) -> Vec<Self> {
        trees.iter().map(Self::build).collect()
    }
}

impl SubmenuView {
    pub fn build(tree: &SubmenuTree) -> Self {
        Self {
            id: tree.submenu.id,
            menu_id: tree.submenu.menu_id,
            title: tree.submenu.title.clone(),
            description: tree.submenu.description.clone(),
            dishes_count: tree.dishes.len(),
        }
    }

    /// View for a submenu known to have no dishes yet (just created).
    pub fn leaf(submenu: &SubmenuRecord) -> Self {
        Self {
            id: submenu.id,
            menu_id: submenu.menu_id,
            title: submenu.title.clone(),
            description: submenu.description.clone(),
            dishes_count: 0,
        }
    }

    pub fn build_list(trees: &[SubmenuTree]) -> Vec<Self> {
        trees.iter().map(Self::build).collect()
    }
}

impl From<&DishRecord> for DishView {
    fn from(dish: &DishRecord) -> Self {
        Self {
            id: dish.id,
            submenu_id: dish.submenu_id,
            title: dish.title.clone(),
            description: dish.description.clone(),
            price: dish.price.clone(),
        }
    }
}

impl DeleteAck {
    pub fn new(entity: &str) -> Self {
        Self {
            status: true,
            message: format!("The {entity} has been deleted"),
        }
    }
}
