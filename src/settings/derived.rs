//! Derived Settings
//!
//! Values computed from the loaded settings: button icons, the naming item
//! comparator, the compiled shop name pattern, and the economy configs.

use std::sync::LazyLock;

use regex::Regex;

use super::definition::{DEFAULT_NAME_REGEX, Settings};
use crate::economy::{CurrencyConfig, TaxConfig};
use crate::item::{ItemDescriptor, ItemStack};
use crate::messages::{MessageKey, keys};

static DEFAULT_NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    compile_name_pattern(DEFAULT_NAME_REGEX).expect("built-in name regex compiles")
});

/// Anchors the configured expression so it must match the whole name
pub fn compile_name_pattern(regex: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{regex})$"))
}

pub fn default_name_pattern() -> Regex {
    DEFAULT_NAME_PATTERN.clone()
}

/// An editor button icon: the configured item plus name and lore keys
#[derive(Debug, Clone, PartialEq)]
pub struct ButtonIcon {
    pub item: ItemDescriptor,
    pub name: MessageKey,
    pub lore: MessageKey,
}

impl ButtonIcon {
    fn new(item: &ItemDescriptor, name: MessageKey, lore: MessageKey) -> Self {
        Self {
            item: item.clone(),
            name,
            lore,
        }
    }

    pub fn stack(&self, amount: u32) -> ItemStack {
        self.item.to_stack(amount.max(1))
    }
}

#[derive(Debug, Clone)]
pub struct DerivedSettings {
    /// The name item with its display name ignored; the display name is
    /// what the player types as the new shop name.
    pub naming_item: ItemDescriptor,

    pub name_button: ButtonIcon,
    pub container_button: ButtonIcon,
    pub delete_button: ButtonIcon,
    pub hire_button: ButtonIcon,
    pub previous_page_button: ButtonIcon,
    pub next_page_button: ButtonIcon,
    pub current_page_button: ButtonIcon,
    pub trade_setup_button: ButtonIcon,

    pub shop_name_pattern: Regex,
    pub currency: CurrencyConfig,
    pub tax: TaxConfig,
}

impl DerivedSettings {
    pub fn new(settings: &Settings, shop_name_pattern: Regex) -> Self {
        let currency = CurrencyConfig::new(
            settings.currency_item.clone(),
            settings.high_currency_item.clone(),
            settings.high_currency_value.max(0) as u32,
            settings.high_currency_min_cost.max(0) as u32,
        )
        .with_zero_items(
            settings.zero_currency_item.clone(),
            settings.zero_high_currency_item.clone(),
        );

        Self {
            naming_item: settings.name_item.without_display_name(),
            name_button: ButtonIcon::new(&settings.name_item, keys::BUTTON_NAME, keys::BUTTON_NAME_LORE),
            container_button: ButtonIcon::new(
                &settings.container_item,
                keys::BUTTON_CONTAINER,
                keys::BUTTON_CONTAINER_LORE,
            ),
            delete_button: ButtonIcon::new(&settings.delete_item, keys::BUTTON_DELETE, keys::BUTTON_DELETE_LORE),
            hire_button: ButtonIcon::new(&settings.hire_item, keys::BUTTON_HIRE, keys::BUTTON_HIRE_LORE),
            previous_page_button: ButtonIcon::new(
                &settings.previous_page_item,
                keys::BUTTON_PREVIOUS_PAGE,
                keys::BUTTON_PREVIOUS_PAGE_LORE,
            ),
            next_page_button: ButtonIcon::new(
                &settings.next_page_item,
                keys::BUTTON_NEXT_PAGE,
                keys::BUTTON_NEXT_PAGE_LORE,
            ),
            current_page_button: ButtonIcon::new(
                &settings.current_page_item,
                keys::BUTTON_CURRENT_PAGE,
                keys::BUTTON_CURRENT_PAGE_LORE,
            ),
            trade_setup_button: ButtonIcon::new(
                &settings.trade_setup_item,
                keys::TRADE_SETUP_DESC_HEADER,
                keys::TRADE_SETUP_DESC_HEADER,
            ),
            shop_name_pattern,
            currency,
            tax: TaxConfig {
                rate: settings.tax_rate.clamp(0, 100) as u32,
                round_up: settings.tax_round_up,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_pattern_is_anchored() {
        let pattern = compile_name_pattern("[a-z]{3}").unwrap();
        assert!(pattern.is_match("abc"));
        assert!(!pattern.is_match("abcd"));
        assert!(!pattern.is_match("xabc"));
        assert!(compile_name_pattern("[a-z").is_err());
    }

    #[test]
    fn test_derived_from_defaults() {
        let mut settings = Settings::default();
        settings.name_item = ItemDescriptor::named("NAME_TAG", "Shop name");
        settings.zero_high_currency_item = ItemDescriptor::air();

        let derived = DerivedSettings::new(&settings, default_name_pattern());
        assert_eq!(derived.naming_item, ItemDescriptor::new("NAME_TAG"));
        assert_eq!(derived.name_button.item.display_name.as_deref(), Some("Shop name"));
        assert_eq!(derived.currency.high_value, 9);
        assert_eq!(derived.currency.zero_normal, Some(ItemDescriptor::new("BARRIER")));
        assert_eq!(derived.currency.zero_high, None);
        assert!(derived.shop_name_pattern.is_match("My Shop"));
        assert!(!derived.shop_name_pattern.is_match("ab"));
    }
}
