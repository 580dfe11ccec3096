//! Shopkeeper Entity
//!
//! One persistent shop. Owned by the [`ShopRegistry`](super::ShopRegistry);
//! once deleted it is invalid and rejects every mutation.

use super::creation::ShopOwner;
use super::definition::{ShopKind, ShopTypeDescriptor};
use super::object::{BlockLocation, ShopObject};
use super::record::ShopRecord;
use crate::economy::{TaxConfig, TradeRule, TradingRecipe, cost_to_price, CurrencyConfig};
use crate::error::ShopError;
use crate::permissions::PlayerId;

#[derive(Debug, Clone, PartialEq)]
pub struct Shopkeeper {
    id: u32,
    type_id: String,
    kind: ShopKind,
    owner: Option<ShopOwner>,
    name: Option<String>,
    recipes: Vec<TradingRecipe>,
    object: ShopObject,
    container: Option<BlockLocation>,
    valid: bool,
}

impl Shopkeeper {
    pub(crate) fn new(
        id: u32,
        descriptor: &ShopTypeDescriptor,
        owner: Option<ShopOwner>,
        object: ShopObject,
        container: Option<BlockLocation>,
    ) -> Self {
        Self {
            id,
            type_id: descriptor.id.clone(),
            kind: descriptor.kind,
            owner,
            name: None,
            recipes: Vec::new(),
            object,
            container,
            valid: true,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn type_id(&self) -> &str {
        &self.type_id
    }

    pub fn kind(&self) -> ShopKind {
        self.kind
    }

    pub fn is_player_shop(&self) -> bool {
        self.kind.is_player_shop()
    }

    pub fn owner(&self) -> Option<&ShopOwner> {
        self.owner.as_ref()
    }

    pub fn is_owned_by(&self, player: &PlayerId) -> bool {
        self.owner.as_ref().is_some_and(|owner| &owner.id == player)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn recipes(&self) -> &[TradingRecipe] {
        &self.recipes
    }

    pub fn object(&self) -> &ShopObject {
        &self.object
    }

    pub fn container(&self) -> Option<&BlockLocation> {
        self.container.as_ref()
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    fn ensure_valid(&self) -> Result<(), ShopError> {
        if self.valid {
            Ok(())
        } else {
            Err(ShopError::ShopkeeperInvalidated { id: self.id })
        }
    }

    /// Replaces the whole recipe sequence
    pub fn set_recipes(&mut self, recipes: Vec<TradingRecipe>) -> Result<(), ShopError> {
        self.ensure_valid()?;
        self.recipes = recipes;
        Ok(())
    }

    /// Name validation is done by the registry
    pub(crate) fn set_name(&mut self, name: Option<String>) -> Result<(), ShopError> {
        self.ensure_valid()?;
        self.name = name;
        Ok(())
    }

    pub fn object_mut(&mut self) -> Result<&mut ShopObject, ShopError> {
        self.ensure_valid()?;
        Ok(&mut self.object)
    }

    /// `valid -> invalid`, exactly once
    pub(crate) fn invalidate(&mut self) -> Result<(), ShopError> {
        self.ensure_valid()?;
        self.valid = false;
        Ok(())
    }

    /// Currency the owner keeps from one trade of `recipe` after tax.
    /// `None` for shops that are not paid in currency.
    pub fn owner_earnings(&self, recipe: &TradingRecipe, currency: &CurrencyConfig, tax: &TaxConfig) -> Option<u32> {
        if !self.is_player_shop() || self.kind.trade_rule() != TradeRule::CurrencyCosts {
            return None;
        }
        cost_to_price(&recipe.cost1, recipe.cost2.as_ref(), currency).map(|gross| tax.apply(gross))
    }

    pub fn to_record(&self) -> ShopRecord {
        ShopRecord {
            id: self.id,
            shop_type: self.type_id.clone(),
            owner: self.owner.clone(),
            name: self.name.clone(),
            object: self.object.clone(),
            container: self.container.clone(),
            recipes: self.recipes.clone(),
        }
    }

    /// Rebuilds a shopkeeper from already validated record parts
    pub(crate) fn restore(
        id: u32,
        descriptor: &ShopTypeDescriptor,
        owner: Option<ShopOwner>,
        name: Option<String>,
        object: ShopObject,
        container: Option<BlockLocation>,
        recipes: Vec<TradingRecipe>,
    ) -> Self {
        Self {
            name,
            recipes,
            ..Self::new(id, descriptor, owner, object, container)
        }
    }
}
