//! Search and category filtering
//!
//! Every search starts from the full store and keeps dataset order.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use super::{CatalogStore, Item};

/// Sentinel shown for "no restriction" in every selector
pub const ALL: &str = "ALL";

/// Current value of a categorical selector
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    All,
    Value(String),
}

impl Selection {
    /// Exact, case-sensitive comparison against a field value
    pub fn accepts(&self, value: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Value(selected) => selected == value,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Selection::All => ALL,
            Selection::Value(v) => v,
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<&str> for Selection {
    fn from(value: &str) -> Self {
        if value == ALL {
            Selection::All
        } else {
            Selection::Value(value.to_string())
        }
    }
}

/// The four search inputs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub query: String,
    pub rarity: Selection,
    pub item_type: Selection,
    pub collection_type: Selection,
}

impl FilterState {
    /// Check a single item against all four inputs
    pub fn matches(&self, item: &Item) -> bool {
        let needle = self.query.trim().to_lowercase();
        self.matches_prepared(item, &needle)
    }

    fn matches_prepared(&self, item: &Item, needle: &str) -> bool {
        matches_text(item, needle)
            && self.rarity.accepts(&item.rare)
            && self.item_type.accepts(&item.item_type)
            && self.collection_type.accepts(&item.collection_type)
    }
}

fn matches_text(item: &Item, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    item.id_text().to_lowercase().contains(needle)
        || item.description.to_lowercase().contains(needle)
        || item.icon.to_lowercase().contains(needle)
}

/// Compute the matching subset of the store
pub fn search(store: &CatalogStore, filter: &FilterState) -> Vec<Arc<Item>> {
    let needle = filter.query.trim().to_lowercase();
    store
        .items()
        .iter()
        .filter(|item| filter.matches_prepared(item, &needle))
        .cloned()
        .collect()
}

/// Which categorical field a selector drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterField {
    Rarity,
    ItemType,
    CollectionType,
}

impl FilterField {
    pub const ALL_FIELDS: [FilterField; 3] = [
        FilterField::Rarity,
        FilterField::ItemType,
        FilterField::CollectionType,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FilterField::Rarity => "Rarity",
            FilterField::ItemType => "Item Type",
            FilterField::CollectionType => "Collection",
        }
    }

    fn value<'a>(&self, item: &'a Item) -> &'a str {
        match self {
            FilterField::Rarity => &item.rare,
            FilterField::ItemType => &item.item_type,
            FilterField::CollectionType => &item.collection_type,
        }
    }
}

/// Selector over `ALL` plus the distinct values of one field
#[derive(Debug, Clone)]
pub struct Selector {
    pub field: FilterField,
    options: Vec<Selection>,
    index: usize,
}

impl Selector {
    /// Selector offering only `ALL`
    pub fn new(field: FilterField) -> Self {
        Self {
            field,
            options: vec![Selection::All],
            index: 0,
        }
    }

    /// Build the option list from the store's distinct values, sorted.
    /// Empty strings are left out.
    pub fn from_store(field: FilterField, store: &CatalogStore) -> Self {
        let distinct: BTreeSet<&str> = store
            .items()
            .iter()
            .map(|item| field.value(item))
            .filter(|v| !v.is_empty())
            .collect();

        let mut options = Vec::with_capacity(distinct.len() + 1);
        options.push(Selection::All);
        options.extend(distinct.into_iter().map(|v| Selection::Value(v.to_string())));

        Self {
            field,
            options,
            index: 0,
        }
    }

    pub fn current(&self) -> &Selection {
        &self.options[self.index]
    }

    pub fn options(&self) -> &[Selection] {
        &self.options
    }

    /// Advance to the next option, wrapping. Returns true if the value changed.
    pub fn next(&mut self) -> bool {
        let before = self.index;
        self.index = (self.index + 1) % self.options.len();
        before != self.index
    }

    /// Step back to the previous option, wrapping. Returns true if the value changed.
    pub fn prev(&mut self) -> bool {
        let before = self.index;
        self.index = (self.index + self.options.len() - 1) % self.options.len();
        before != self.index
    }

    /// Select an option by value. Returns true if the value changed.
    pub fn select(&mut self, selection: &Selection) -> bool {
        match self.options.iter().position(|o| o == selection) {
            Some(index) if index != self.index => {
                self.index = index;
                true
            }
            _ => false,
        }
    }
}
