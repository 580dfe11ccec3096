//! Shop Records
//!
//! The persisted form of a shopkeeper. Records arrive as untrusted JSON and
//! are first read into [`RawShopRecord`], where every field is optional, so
//! that a missing field can be reported by name.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::creation::ShopOwner;
use super::object::{BlockLocation, ShopObject};
use crate::economy::TradingRecipe;
use crate::error::ShopError;

/// A shopkeeper as written to storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopRecord {
    pub id: u32,
    #[serde(rename = "type")]
    pub shop_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<ShopOwner>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub object: ShopObject,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<BlockLocation>,
    #[serde(default)]
    pub recipes: Vec<TradingRecipe>,
}

impl ShopRecord {
    pub fn to_json(&self) -> Result<Value, ShopError> {
        serde_json::to_value(self).map_err(|e| ShopError::CorruptRecord {
            field: "record",
            reason: e.to_string(),
        })
    }
}

/// Unvalidated record as read from storage
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawShopRecord {
    #[serde(default)]
    pub id: Option<u32>,
    #[serde(default, rename = "type")]
    pub shop_type: Option<String>,
    #[serde(default)]
    pub owner: Option<ShopOwner>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub object: Option<ShopObject>,
    #[serde(default)]
    pub container: Option<BlockLocation>,
    /// Kept as raw values so one bad recipe does not reject the whole record
    #[serde(default)]
    pub recipes: Vec<Value>,
}

impl RawShopRecord {
    pub fn from_json(value: &Value) -> Result<Self, ShopError> {
        if !value.is_object() {
            return Err(ShopError::CorruptRecord {
                field: "record",
                reason: "expected an object".to_string(),
            });
        }
        RawShopRecord::deserialize(value).map_err(|e| ShopError::CorruptRecord {
            field: "record",
            reason: e.to_string(),
        })
    }

    pub fn require<'a, T>(value: &'a Option<T>, field: &'static str) -> Result<&'a T, ShopError> {
        value.as_ref().ok_or_else(|| ShopError::CorruptRecord {
            field,
            reason: "missing".to_string(),
        })
    }
}
