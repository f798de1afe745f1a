//! Carta: a three-tier catalog API (menus → submenus → dishes) backed by
//! PostgreSQL, fronted by a read-through, write-invalidate cache.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
