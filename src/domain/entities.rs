//! Domain entities mirrored from persistent storage.

use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuRecord {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmenuRecord {
    pub id: Uuid,
    pub menu_id: Uuid,
    pub title: String,
    pub description: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// `price` is a decimal carried as text end to end; nothing in the pipeline
/// parses it into a float.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DishRecord {
    pub id: Uuid,
    pub submenu_id: Uuid,
    pub title: String,
    pub description: String,
    pub price: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// A submenu together with its eagerly fetched dishes.
#[derive(Debug, Clone)]
pub struct SubmenuTree {
    pub submenu: SubmenuRecord,
    pub dishes: Vec<DishRecord>,
}

/// A menu together with its full descendant subtree.
#[derive(Debug, Clone)]
pub struct MenuTree {
    pub menu: MenuRecord,
    pub submenus: Vec<SubmenuTree>,
}
