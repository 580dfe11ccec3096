//! Trading Recipes
//!
//! Committed recipes, their staged drafts, and the validation that turns one
//! into the other.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::currency::{CurrencyConfig, cost_to_price, currency_value};
use crate::item::{ItemDescriptor, ItemStack, is_empty_slot};

/// A fixed exchange of one result for one or two costs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingRecipe {
    pub result: ItemStack,
    pub cost1: ItemStack,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost2: Option<ItemStack>,
}

/// An in-progress offer; any slot may be empty while editing
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TradingRecipeDraft {
    pub result: Option<ItemStack>,
    pub cost1: Option<ItemStack>,
    pub cost2: Option<ItemStack>,
}

impl TradingRecipeDraft {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(result: ItemStack, cost1: ItemStack, cost2: Option<ItemStack>) -> Self {
        Self {
            result: Some(result),
            cost1: Some(cost1),
            cost2,
        }
    }

    /// True if no slot holds anything
    pub fn is_empty(&self) -> bool {
        is_empty_slot(self.result.as_ref()) && is_empty_slot(self.cost1.as_ref()) && is_empty_slot(self.cost2.as_ref())
    }
}

impl From<&TradingRecipe> for TradingRecipeDraft {
    fn from(recipe: &TradingRecipe) -> Self {
        Self {
            result: Some(recipe.result.clone()),
            cost1: Some(recipe.cost1.clone()),
            cost2: recipe.cost2.clone(),
        }
    }
}

/// Why a draft could not become a recipe
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeRejection {
    #[error("the result slot is empty")]
    EmptyResult,
    #[error("the primary cost slot is empty")]
    EmptyPrimaryCost,
    #[error("the secondary cost is present but has no quantity")]
    InvalidSecondaryCost,
    #[error("the trade does not use the shop's currency")]
    CurrencyMismatch,
}

/// Trade setup rule of a shop kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeRule {
    /// Any items on either side
    Any,
    /// Costs must be paid in currency (the shop sells)
    CurrencyCosts,
    /// The result must be currency (the shop buys)
    CurrencyResult,
}

pub fn validate_recipe(draft: &TradingRecipeDraft) -> Result<TradingRecipe, RecipeRejection> {
    let result = match &draft.result {
        Some(stack) if !stack.is_empty() => stack.clone(),
        _ => return Err(RecipeRejection::EmptyResult),
    };
    let cost1 = match &draft.cost1 {
        Some(stack) if !stack.is_empty() => stack.clone(),
        _ => return Err(RecipeRejection::EmptyPrimaryCost),
    };
    let cost2 = match &draft.cost2 {
        None => None,
        Some(stack) if stack.item.is_air() => None,
        Some(stack) if stack.amount == 0 => return Err(RecipeRejection::InvalidSecondaryCost),
        Some(stack) => Some(stack.clone()),
    };
    Ok(TradingRecipe { result, cost1, cost2 })
}

/// [`validate_recipe`] plus the shop kind's trade setup rule
pub fn validate_for_rule(
    draft: &TradingRecipeDraft,
    rule: TradeRule,
    currency: &CurrencyConfig,
) -> Result<TradingRecipe, RecipeRejection> {
    let recipe = validate_recipe(draft)?;
    let accepted = match rule {
        TradeRule::Any => true,
        TradeRule::CurrencyCosts => cost_to_price(&recipe.cost1, recipe.cost2.as_ref(), currency).is_some(),
        TradeRule::CurrencyResult => currency_value(&recipe.result, currency).is_some(),
    };
    if accepted { Ok(recipe) } else { Err(RecipeRejection::CurrencyMismatch) }
}

/// Item equivalence used when comparing offered items against costs
pub fn items_equivalent(required: &ItemDescriptor, offered: &ItemDescriptor, strict: bool) -> bool {
    if strict {
        required.matches_exactly(offered)
    } else {
        required.matches(offered)
    }
}

fn covers(required: Option<&ItemStack>, offered: Option<&ItemStack>, strict: bool) -> bool {
    match (required, offered) {
        (None, _) => true,
        (Some(required), _) if required.is_empty() => true,
        (Some(required), Some(offered)) => {
            offered.amount >= required.amount && items_equivalent(&required.item, &offered.item, strict)
        }
        (Some(_), None) => false,
    }
}

impl TradingRecipe {
    /// Whether the offered items pay for this trade
    pub fn is_paid_by(&self, offered1: Option<&ItemStack>, offered2: Option<&ItemStack>, strict: bool) -> bool {
        covers(Some(&self.cost1), offered1, strict) && covers(self.cost2.as_ref(), offered2, strict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn currency() -> CurrencyConfig {
        CurrencyConfig::new(
            ItemDescriptor::new("EMERALD"),
            ItemDescriptor::new("EMERALD_BLOCK"),
            9,
            20,
        )
    }

    #[test]
    fn test_validate_recipe_rejections() {
        let mut draft = TradingRecipeDraft::new(ItemStack::of("BREAD", 0), ItemStack::of("EMERALD", 1), None);
        assert_eq!(validate_recipe(&draft), Err(RecipeRejection::EmptyResult));

        draft.result = Some(ItemStack::of("BREAD", 3));
        draft.cost1 = None;
        assert_eq!(validate_recipe(&draft), Err(RecipeRejection::EmptyPrimaryCost));

        draft.cost1 = Some(ItemStack::of("EMERALD", 1));
        draft.cost2 = Some(ItemStack::of("EMERALD_BLOCK", 0));
        assert_eq!(validate_recipe(&draft), Err(RecipeRejection::InvalidSecondaryCost));

        draft.cost2 = Some(ItemStack::of("AIR", 0));
        let recipe = validate_recipe(&draft).unwrap();
        assert_eq!(recipe.cost2, None);
        assert_eq!(recipe.result, ItemStack::of("BREAD", 3));
    }

    #[test]
    fn test_trade_rules() {
        let selling = TradingRecipeDraft::new(
            ItemStack::of("BREAD", 3),
            ItemStack::of("EMERALD_BLOCK", 2),
            Some(ItemStack::of("EMERALD", 4)),
        );
        assert!(validate_for_rule(&selling, TradeRule::CurrencyCosts, &currency()).is_ok());
        assert_eq!(
            validate_for_rule(&selling, TradeRule::CurrencyResult, &currency()),
            Err(RecipeRejection::CurrencyMismatch)
        );

        let buying = TradingRecipeDraft::new(ItemStack::of("EMERALD", 2), ItemStack::of("WHEAT", 16), None);
        assert!(validate_for_rule(&buying, TradeRule::CurrencyResult, &currency()).is_ok());
        assert!(validate_for_rule(&buying, TradeRule::Any, &currency()).is_ok());
        assert_eq!(
            validate_for_rule(&buying, TradeRule::CurrencyCosts, &currency()),
            Err(RecipeRejection::CurrencyMismatch)
        );
    }

    #[test]
    fn test_draft_emptiness() {
        assert!(TradingRecipeDraft::empty().is_empty());
        let draft = TradingRecipeDraft {
            cost2: Some(ItemStack::of("EMERALD", 1)),
            ..Default::default()
        };
        assert!(!draft.is_empty());
    }

    #[test]
    fn test_is_paid_by_strictness() {
        let recipe = TradingRecipe {
            result: ItemStack::of("BREAD", 1),
            cost1: ItemStack::of("EMERALD", 3),
            cost2: None,
        };
        let named = ItemStack::new(ItemDescriptor::named("EMERALD", "Shiny"), 5);

        assert!(recipe.is_paid_by(Some(&named), None, false));
        assert!(!recipe.is_paid_by(Some(&named), None, true));
        assert!(recipe.is_paid_by(Some(&ItemStack::of("EMERALD", 3)), None, true));
        assert!(!recipe.is_paid_by(Some(&ItemStack::of("EMERALD", 2)), None, false));
        assert!(!recipe.is_paid_by(None, None, false));
    }
}
