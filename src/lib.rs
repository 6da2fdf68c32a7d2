//! Itemdex - A terminal catalog viewer for game items
//!
//! Loads an item dataset, shows it as a grid of cards, filters it by text
//! and category, and shows any item in a detail overlay.

pub mod catalog;
pub mod config;
pub mod render;
pub mod ui;

// Re-export commonly used types
pub use catalog::{CatalogStore, FilterState, Item, ItemId};
pub use config::CatalogConfig;
pub use ui::App;
