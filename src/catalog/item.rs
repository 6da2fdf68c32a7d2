//! Item definitions
//!
//! One record per catalog entry, read verbatim from the dataset.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};

/// Item identifier as it appears in the dataset.
///
/// Datasets mix plain numbers and numeric strings, so both are accepted and
/// displayed exactly as written. Any JSON number fits, floats and values
/// past `i64` included.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    Number(Number),
    Text(String),
}

impl Default for ItemId {
    fn default() -> Self {
        ItemId::Text(String::new())
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemId::Number(n) => write!(f, "{}", n),
            ItemId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ItemId {
    fn from(value: i64) -> Self {
        ItemId::Number(value.into())
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        ItemId::Text(value.to_string())
    }
}

/// A catalog item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "itemID", default, deserialize_with = "id_or_null")]
    pub item_id: ItemId,
    /// Short display name (card label, overlay title)
    #[serde(default, deserialize_with = "string_or_null")]
    pub description: String,
    /// Long description, only shown in the overlay
    #[serde(default, deserialize_with = "string_or_null")]
    pub description2: String,
    /// Icon label. Not the image path.
    #[serde(default, deserialize_with = "string_or_null")]
    pub icon: String,
    #[serde(rename = "Rare", default, deserialize_with = "string_or_null")]
    pub rare: String,
    #[serde(rename = "isUnique", default, deserialize_with = "bool_or_null")]
    pub is_unique: bool,
    #[serde(rename = "itemType", default, deserialize_with = "string_or_null")]
    pub item_type: String,
    #[serde(rename = "collectionType", default, deserialize_with = "string_or_null")]
    pub collection_type: String,
}

impl Item {
    /// Uniqueness as shown to the user
    pub fn unique_label(&self) -> &'static str {
        if self.is_unique {
            "Yes"
        } else {
            "No"
        }
    }

    /// Id rendered as text, used for display and text search
    pub fn id_text(&self) -> String {
        self.item_id.to_string()
    }
}

// Records are never rejected: a field of the wrong JSON type is read the way
// a browser would coerce it instead of failing the whole dataset.

fn string_or_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

/// JavaScript truthiness
fn bool_or_null<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => false,
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    })
}

fn id_or_null<'de, D>(deserializer: D) -> Result<ItemId, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => ItemId::default(),
        Value::Number(n) => ItemId::Number(n),
        Value::String(s) => ItemId::Text(s),
        other => ItemId::Text(other.to_string()),
    })
}
