//! Item catalog
//!
//! Data model, the in-memory store, dataset loading and filtering.

pub mod error;
pub mod item;
pub mod store;
pub mod filter;
pub mod loader;

pub use error::CatalogError;
pub use item::{Item, ItemId};
pub use store::CatalogStore;
pub use filter::{search, FilterField, FilterState, Selection, Selector, ALL};
pub use loader::{load_items, parse_items, LoadOutcome, Loader};
