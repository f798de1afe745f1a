//! Request handlers for the catalog API.

mod dishes;
mod menus;
mod submenus;

pub use dishes::{create_dish, delete_dish, get_dish, list_dishes, update_dish};
pub use menus::{create_menu, delete_menu, get_menu, list_menus, update_menu};
pub use submenus::{create_submenu, delete_submenu, get_submenu, list_submenus, update_submenu};
