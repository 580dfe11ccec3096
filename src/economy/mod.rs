//! Economy Engine
//!
//! Stateless functions over items and prices: currency items, price
//! decomposition, tax, and trade validity.

pub mod currency;
pub mod recipe;
pub mod tax;

pub use currency::{
    CurrencyConfig, CurrencyItem, Denomination, build_currency_item, cost_to_price, currency_value,
    decompose_price, is_zero_currency, matches_currency, price_to_cost,
};
pub use recipe::{
    RecipeRejection, TradeRule, TradingRecipe, TradingRecipeDraft, items_equivalent, validate_for_rule,
    validate_recipe,
};
pub use tax::{TaxConfig, apply_tax};
