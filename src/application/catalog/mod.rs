//! Catalog services: one service per entity kind, all sharing the single
//! cache engine so the read-through and invalidation paths stay uniform.

pub mod dishes;
pub mod menus;
pub mod submenus;

pub use dishes::{CreateDishCommand, DishService, UpdateDishCommand};
pub use menus::{CreateMenuCommand, MenuService, UpdateMenuCommand};
pub use submenus::{CreateSubmenuCommand, SubmenuService, UpdateSubmenuCommand};
