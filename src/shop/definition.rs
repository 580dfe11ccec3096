//! Shop Type Definitions
//!
//! The closed set of shop kinds and the descriptors that register them under
//! an id and aliases.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::creation::ShopCreationData;
use super::object::ShopObject;
use super::record::RawShopRecord;
use super::shopkeeper::Shopkeeper;
use crate::economy::{
    CurrencyConfig, RecipeRejection, TradeRule, TradingRecipe, TradingRecipeDraft, validate_for_rule, validate_recipe,
};
use crate::error::ShopError;
use crate::messages::{MessageKey, keys};
use crate::permissions::{
    ADMIN_PERMISSION, PLAYER_BOOK_PERMISSION, PLAYER_BUY_PERMISSION, PLAYER_SELL_PERMISSION,
    PLAYER_TRADE_PERMISSION,
};
use crate::settings::SettingsStore;

/// Identifier prefixes accepted when neither an id nor an alias matches
pub const PREFIX_FALLBACKS: &[(&str, &str)] = &[("buy", "buy"), ("sell", "sell"), ("trad", "trade"), ("book", "book")];

/// Lower-cases and strips `-`, `_` and whitespace
pub fn normalize_identifier(identifier: &str) -> String {
    identifier
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShopKind {
    Admin,
    Selling,
    Buying,
    Trading,
    Book,
}

impl ShopKind {
    /// Player shops have an owner and a container
    pub fn is_player_shop(self) -> bool {
        !matches!(self, ShopKind::Admin)
    }

    pub fn display_name(self) -> MessageKey {
        match self {
            ShopKind::Admin => keys::SHOP_TYPE_ADMIN,
            ShopKind::Selling => keys::SHOP_TYPE_SELLING,
            ShopKind::Buying => keys::SHOP_TYPE_BUYING,
            ShopKind::Trading => keys::SHOP_TYPE_TRADING,
            ShopKind::Book => keys::SHOP_TYPE_BOOK,
        }
    }

    pub fn description(self) -> MessageKey {
        match self {
            ShopKind::Admin => keys::SHOP_TYPE_DESC_ADMIN,
            ShopKind::Selling => keys::SHOP_TYPE_DESC_SELLING,
            ShopKind::Buying => keys::SHOP_TYPE_DESC_BUYING,
            ShopKind::Trading => keys::SHOP_TYPE_DESC_TRADING,
            ShopKind::Book => keys::SHOP_TYPE_DESC_BOOK,
        }
    }

    pub fn setup_description(self) -> MessageKey {
        match self {
            ShopKind::Admin => keys::SHOP_SETUP_DESC_ADMIN,
            ShopKind::Selling => keys::SHOP_SETUP_DESC_SELLING,
            ShopKind::Buying => keys::SHOP_SETUP_DESC_BUYING,
            ShopKind::Trading => keys::SHOP_SETUP_DESC_TRADING,
            ShopKind::Book => keys::SHOP_SETUP_DESC_BOOK,
        }
    }

    pub fn trade_setup_description(self) -> MessageKey {
        match self {
            ShopKind::Admin => keys::TRADE_SETUP_DESC_ADMIN,
            ShopKind::Selling => keys::TRADE_SETUP_DESC_SELLING,
            ShopKind::Buying => keys::TRADE_SETUP_DESC_BUYING,
            ShopKind::Trading => keys::TRADE_SETUP_DESC_TRADING,
            ShopKind::Book => keys::TRADE_SETUP_DESC_BOOK,
        }
    }

    pub fn trade_rule(self) -> TradeRule {
        match self {
            ShopKind::Admin | ShopKind::Trading => TradeRule::Any,
            ShopKind::Selling | ShopKind::Book => TradeRule::CurrencyCosts,
            ShopKind::Buying => TradeRule::CurrencyResult,
        }
    }
}

/// Validates a draft and applies the trade setup rule of `kind`
pub fn validate_for_shop(
    kind: ShopKind,
    draft: &TradingRecipeDraft,
    currency: &CurrencyConfig,
) -> Result<TradingRecipe, RecipeRejection> {
    validate_for_rule(draft, kind.trade_rule(), currency)
}

/// A registered shop type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopTypeDescriptor {
    pub id: String,
    pub aliases: Vec<String>,
    pub permission: String,
    pub kind: ShopKind,
}

impl ShopTypeDescriptor {
    pub fn new(id: &str, kind: ShopKind, permission: &str) -> Self {
        Self {
            id: normalize_identifier(id),
            aliases: Vec::new(),
            permission: permission.to_string(),
            kind,
        }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.aliases.push(normalize_identifier(alias));
        self
    }

    /// The built-in shop types in registration order
    pub fn defaults() -> Vec<ShopTypeDescriptor> {
        vec![
            Self::new("admin", ShopKind::Admin, ADMIN_PERMISSION),
            Self::new("sell", ShopKind::Selling, PLAYER_SELL_PERMISSION)
                .with_alias("selling")
                .with_alias("normal")
                .with_alias("player"),
            Self::new("buy", ShopKind::Buying, PLAYER_BUY_PERMISSION).with_alias("buying"),
            Self::new("trade", ShopKind::Trading, PLAYER_TRADE_PERMISSION).with_alias("trading"),
            Self::new("book", ShopKind::Book, PLAYER_BOOK_PERMISSION).with_alias("books"),
        ]
    }

    /// Id followed by aliases
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.id.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    pub fn is_player_shop(&self) -> bool {
        self.kind.is_player_shop()
    }

    pub fn display_name(&self) -> MessageKey {
        self.kind.display_name()
    }

    pub fn description(&self) -> MessageKey {
        self.kind.description()
    }

    pub fn setup_description(&self) -> MessageKey {
        self.kind.setup_description()
    }

    pub fn trade_setup_description(&self) -> MessageKey {
        self.kind.trade_setup_description()
    }
}

// ============================================================================
// Capabilities
// ============================================================================

fn invalid(field: &'static str, reason: impl Into<String>) -> ShopError {
    ShopError::InvalidCreationData {
        field,
        reason: reason.into(),
    }
}

impl ShopTypeDescriptor {
    /// Validates creation input and builds a shopkeeper with empty recipes.
    /// Permission and shop limit checks are done by the registry.
    pub fn create(&self, id: u32, data: &ShopCreationData, settings: &SettingsStore) -> Result<Shopkeeper, ShopError> {
        let spawn = data
            .spawn_location
            .as_ref()
            .ok_or_else(|| invalid("spawn_location", "missing"))?;

        let (owner, container) = if self.is_player_shop() {
            let owner = data
                .creator
                .clone()
                .ok_or_else(|| invalid("creator", "player shops need an owner"))?;
            let container = data
                .container
                .clone()
                .ok_or_else(|| invalid("container", "player shops need a container"))?;
            (Some(owner), Some(container))
        } else {
            (None, None)
        };

        let object_kind = data.object_kind.clone().ok_or_else(|| invalid("object", "missing"))?;
        if !object_kind.is_enabled(settings.settings()) {
            return Err(invalid("object", format!("{} shops are disabled", object_kind)));
        }

        if let Some(container) = &container {
            let max_distance = settings.settings().max_container_distance;
            if !container.is_within(spawn, max_distance) {
                return Err(invalid(
                    "container",
                    format!("further than {} blocks from the shop", max_distance),
                ));
            }
        }

        if let Some(name) = &data.name {
            if !settings.derived().shop_name_pattern.is_match(name) {
                return Err(ShopError::InvalidName { name: name.clone() });
            }
        }

        let mut shopkeeper = Shopkeeper::new(id, self, owner, ShopObject::new(object_kind, spawn.clone()), container);
        shopkeeper.set_name(data.name.clone())?;
        Ok(shopkeeper)
    }

    /// Rebuilds a shopkeeper from a raw record. Recipes that no longer
    /// validate are dropped.
    pub fn load(&self, raw: &RawShopRecord) -> Result<Shopkeeper, ShopError> {
        let id = *RawShopRecord::require(&raw.id, "id")?;
        let object = RawShopRecord::require(&raw.object, "object")?.clone();

        let (owner, container) = if self.is_player_shop() {
            (
                Some(RawShopRecord::require(&raw.owner, "owner")?.clone()),
                Some(RawShopRecord::require(&raw.container, "container")?.clone()),
            )
        } else {
            (None, None)
        };

        let mut recipes = Vec::with_capacity(raw.recipes.len());
        for (index, value) in raw.recipes.iter().enumerate() {
            let recipe = TradingRecipe::deserialize(value)
                .map_err(|e| e.to_string())
                .and_then(|recipe| validate_recipe(&TradingRecipeDraft::from(&recipe)).map_err(|e| e.to_string()));
            match recipe {
                Ok(recipe) => recipes.push(recipe),
                Err(reason) => warn!("Shopkeeper {}: dropping invalid recipe #{}: {}", id, index, reason),
            }
        }

        Ok(Shopkeeper::restore(id, self, owner, raw.name.clone(), object, container, recipes))
    }
}
