//! Currency
//!
//! Two denominations with a fixed ratio: the normal currency item and the
//! optional "high" currency item worth `high_value` normal units.

use crate::item::{ItemDescriptor, ItemStack, MAX_STACK_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denomination {
    Normal,
    High,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyConfig {
    pub normal: ItemDescriptor,
    pub high: ItemDescriptor,
    /// Worth of one high currency unit in normal units
    pub high_value: u32,
    /// Minimum total price before high currency is used
    pub high_min_cost: u32,
    pub zero_normal: Option<ItemDescriptor>,
    pub zero_high: Option<ItemDescriptor>,
}

impl CurrencyConfig {
    pub fn new(normal: ItemDescriptor, high: ItemDescriptor, high_value: u32, high_min_cost: u32) -> Self {
        Self {
            normal,
            high,
            high_value,
            high_min_cost,
            zero_normal: None,
            zero_high: None,
        }
    }

    /// AIR sentinels mean "no sentinel"
    pub fn with_zero_items(mut self, zero_normal: ItemDescriptor, zero_high: ItemDescriptor) -> Self {
        self.zero_normal = Some(zero_normal).filter(|item| !item.is_air());
        self.zero_high = Some(zero_high).filter(|item| !item.is_air());
        self
    }

    pub fn is_high_enabled(&self) -> bool {
        self.high_value > 0 && !self.high.is_air()
    }

    /// The configured item of a denomination, or `None` if it is disabled
    pub fn descriptor(&self, denomination: Denomination) -> Option<&ItemDescriptor> {
        match denomination {
            Denomination::Normal => Some(&self.normal),
            Denomination::High if self.is_high_enabled() => Some(&self.high),
            Denomination::High => None,
        }
    }

    fn sentinel(&self, denomination: Denomination) -> Option<&ItemDescriptor> {
        match denomination {
            Denomination::Normal => self.zero_normal.as_ref(),
            Denomination::High => self.zero_high.as_ref(),
        }
    }
}

/// Splits a total price into `(high_units, normal_units)`.
///
/// High currency is only used when it is enabled and the total reaches
/// `high_min_cost`; otherwise the whole price is expressed in normal units.
pub fn decompose_price(total_cost: u32, currency: &CurrencyConfig) -> (u32, u32) {
    if !currency.is_high_enabled() || total_cost < currency.high_min_cost {
        return (0, total_cost);
    }
    (total_cost / currency.high_value, total_cost % currency.high_value)
}

/// Outcome of building a currency item for an amount
#[derive(Debug, Clone, PartialEq)]
pub enum CurrencyItem {
    Stack(ItemStack),
    /// Zero amount, shown as the configured zero-item
    Sentinel(ItemStack),
    /// Zero amount and no zero-item configured
    Nothing,
    /// The denomination is disabled
    Unavailable,
}

impl CurrencyItem {
    pub fn into_stack(self) -> Option<ItemStack> {
        match self {
            CurrencyItem::Stack(stack) | CurrencyItem::Sentinel(stack) => Some(stack),
            CurrencyItem::Nothing | CurrencyItem::Unavailable => None,
        }
    }
}

pub fn build_currency_item(denomination: Denomination, amount: u32, currency: &CurrencyConfig) -> CurrencyItem {
    let Some(descriptor) = currency.descriptor(denomination) else {
        return CurrencyItem::Unavailable;
    };
    if amount > 0 {
        return CurrencyItem::Stack(descriptor.to_stack(amount));
    }
    match currency.sentinel(denomination) {
        Some(sentinel) => CurrencyItem::Sentinel(sentinel.to_stack(1)),
        None => CurrencyItem::Nothing,
    }
}

/// Whether `item` is the currency of `denomination`, where an empty slot (no
/// sentinel configured) or the sentinel itself stand for zero currency.
pub fn matches_currency(item: Option<&ItemStack>, denomination: Denomination, currency: &CurrencyConfig) -> bool {
    let Some(descriptor) = currency.descriptor(denomination) else {
        return false;
    };
    is_zero_currency(item, denomination, currency) || descriptor.matches_stack(item)
}

pub fn is_zero_currency(item: Option<&ItemStack>, denomination: Denomination, currency: &CurrencyConfig) -> bool {
    if currency.descriptor(denomination).is_none() {
        return false;
    }
    let empty = item.map_or(true, ItemStack::is_empty);
    match currency.sentinel(denomination) {
        Some(sentinel) => sentinel.matches_stack(item),
        None => empty,
    }
}

/// Value of a stack in normal currency units, or `None` for non-currency items
pub fn currency_value(stack: &ItemStack, currency: &CurrencyConfig) -> Option<u32> {
    if stack.is_empty() {
        return None;
    }
    if currency.normal.matches(&stack.item) {
        return Some(stack.amount);
    }
    if currency.is_high_enabled() && currency.high.matches(&stack.item) {
        return stack.amount.checked_mul(currency.high_value);
    }
    None
}

/// Expresses a price as one or two cost stacks.
///
/// High currency (if used) goes first, capped at the max stack size with the
/// excess folded back into normal units. Returns `None` for a zero price or
/// when the remainder does not fit into a single stack.
pub fn price_to_cost(price: u32, currency: &CurrencyConfig) -> Option<(ItemStack, Option<ItemStack>)> {
    if price == 0 {
        return None;
    }
    let (mut high, mut normal) = decompose_price(price, currency);
    if high > MAX_STACK_SIZE {
        normal += (high - MAX_STACK_SIZE) * currency.high_value;
        high = MAX_STACK_SIZE;
    }
    if normal > MAX_STACK_SIZE {
        return None;
    }

    let high_stack = (high > 0).then(|| currency.high.to_stack(high));
    let normal_stack = (normal > 0).then(|| currency.normal.to_stack(normal));
    match (high_stack, normal_stack) {
        (Some(high), normal) => Some((high, normal)),
        (None, Some(normal)) => Some((normal, None)),
        (None, None) => None,
    }
}

/// Total price of the given cost stacks, or `None` if any of them is not a
/// currency item
pub fn cost_to_price(cost1: &ItemStack, cost2: Option<&ItemStack>, currency: &CurrencyConfig) -> Option<u32> {
    let first = currency_value(cost1, currency)?;
    match cost2 {
        Some(stack) if !stack.is_empty() => first.checked_add(currency_value(stack, currency)?),
        _ => Some(first),
    }
}
