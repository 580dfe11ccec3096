use thiserror::Error;

use crate::permissions::PlayerId;

/// Errors surfaced by shop registry and shopkeeper operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShopError {
    #[error("shop type identifier '{identifier}' is already registered to '{existing}'")]
    DuplicateShopType { identifier: String, existing: String },

    #[error("unknown shop type: {0}")]
    UnknownShopType(String),

    #[error("invalid creation data for '{field}': {reason}")]
    InvalidCreationData { field: &'static str, reason: String },

    #[error("corrupt shop record, field '{field}': {reason}")]
    CorruptRecord { field: &'static str, reason: String },

    #[error("missing permission: {permission}")]
    MissingPermission { permission: String },

    #[error("shop limit reached: {owned} >= {limit}")]
    ShopLimitReached { owned: usize, limit: u32 },

    #[error("invalid shop name: '{name}'")]
    InvalidName { name: String },

    #[error("shopkeeper {id} is no longer valid")]
    ShopkeeperInvalidated { id: u32 },

    #[error("no free shopkeeper id left")]
    IdsExhausted,
}

/// Errors surfaced by editor session operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    #[error("editor session of player {player} is closed")]
    SessionClosed { player: PlayerId },

    #[error("slot {slot} is outside of the editor page ({capacity} slots)")]
    InvalidSlot { slot: usize, capacity: usize },

    #[error(transparent)]
    Shop(#[from] ShopError),
}

impl EditorError {
    pub fn is_lifecycle(&self) -> bool {
        matches!(
            self,
            EditorError::SessionClosed { .. }
                | EditorError::Shop(ShopError::ShopkeeperInvalidated { .. })
        )
    }
}
