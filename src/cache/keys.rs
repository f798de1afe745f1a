//! Cache key definitions and the mutation-to-keyset mapping.
//!
//! The rendered key namespace is stable and shared with external cache
//! inspection tooling: `"menus"`, `"submenus"`, `"dishes"` for list views,
//! `"menu:<id>"`, `"submenu:<id>"`, `"dish:<id>"` for single entities.

use std::fmt;

use uuid::Uuid;

/// Identifies a cached aggregate view.
///
/// Single-entity variants carry an optional id: `Menu(None)` renders the
/// generic `"menu"` key (an empty id suffix), which mutation handling still
/// drops so a caller without the id at hand can over-invalidate safely.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    MenuList,
    SubmenuList,
    DishList,
    Menu(Option<Uuid>),
    Submenu(Option<Uuid>),
    Dish(Option<Uuid>),
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MenuList => f.write_str("menus"),
            Self::SubmenuList => f.write_str("submenus"),
            Self::DishList => f.write_str("dishes"),
            Self::Menu(Some(id)) => write!(f, "menu:{id}"),
            Self::Menu(None) => f.write_str("menu"),
            Self::Submenu(Some(id)) => write!(f, "submenu:{id}"),
            Self::Submenu(None) => f.write_str("submenu"),
            Self::Dish(Some(id)) => write!(f, "dish:{id}"),
            Self::Dish(None) => f.write_str("dish"),
        }
    }
}

/// A domain mutation, described precisely enough to derive the set of cache
/// keys it invalidates.
///
/// A dish mutation changes derived counts on its parent submenu, the
/// grandparent menu, and every list view, so all ancestor and list keys fall
/// with it; submenu mutations cascade the same way one level up. The policy
/// over-invalidates rather than risk serving stale aggregate counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Menu {
        menu: Option<Uuid>,
    },
    Submenu {
        menu: Option<Uuid>,
        submenu: Option<Uuid>,
    },
    Dish {
        menu: Option<Uuid>,
        submenu: Option<Uuid>,
        dish: Option<Uuid>,
    },
}

impl Mutation {
    /// The keys dropped when this mutation is applied.
    pub fn keyset(&self) -> Vec<CacheKey> {
        match *self {
            Self::Menu { menu } => vec![CacheKey::MenuList, CacheKey::Menu(menu)],
            Self::Submenu { menu, submenu } => vec![
                CacheKey::MenuList,
                CacheKey::SubmenuList,
                CacheKey::Menu(menu),
                CacheKey::Submenu(submenu),
            ],
            Self::Dish {
                menu,
                submenu,
                dish,
            } => vec![
                CacheKey::MenuList,
                CacheKey::SubmenuList,
                CacheKey::DishList,
                CacheKey::Menu(menu),
                CacheKey::Submenu(submenu),
                CacheKey::Dish(dish),
            ],
        }
    }
}
