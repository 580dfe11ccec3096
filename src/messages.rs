//! Message Keys
//!
//! The core never produces display text. Everything user-facing is a
//! [`MessageKey`] plus substitution arguments, resolved by the host's
//! localized text provider.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct MessageKey(pub &'static str);

impl MessageKey {
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for MessageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

/// A message key with its substitution arguments
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub key: MessageKey,
    pub args: Vec<(&'static str, String)>,
}

impl Message {
    pub fn new(key: MessageKey) -> Self {
        Self { key, args: Vec::new() }
    }

    pub fn arg(mut self, name: &'static str, value: impl ToString) -> Self {
        self.args.push((name, value.to_string()));
        self
    }

    pub fn get_arg(&self, name: &str) -> Option<&str> {
        self.args
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }
}

impl From<MessageKey> for Message {
    fn from(key: MessageKey) -> Self {
        Message::new(key)
    }
}

// ============================================================================
// Keys
// ============================================================================

pub mod keys {
    use super::MessageKey;

    // Shop types
    pub const SHOP_TYPE_ADMIN: MessageKey = MessageKey("shop-type.admin");
    pub const SHOP_TYPE_SELLING: MessageKey = MessageKey("shop-type.selling");
    pub const SHOP_TYPE_BUYING: MessageKey = MessageKey("shop-type.buying");
    pub const SHOP_TYPE_TRADING: MessageKey = MessageKey("shop-type.trading");
    pub const SHOP_TYPE_BOOK: MessageKey = MessageKey("shop-type.book");

    pub const SHOP_TYPE_DESC_ADMIN: MessageKey = MessageKey("shop-type-desc.admin");
    pub const SHOP_TYPE_DESC_SELLING: MessageKey = MessageKey("shop-type-desc.selling");
    pub const SHOP_TYPE_DESC_BUYING: MessageKey = MessageKey("shop-type-desc.buying");
    pub const SHOP_TYPE_DESC_TRADING: MessageKey = MessageKey("shop-type-desc.trading");
    pub const SHOP_TYPE_DESC_BOOK: MessageKey = MessageKey("shop-type-desc.book");

    pub const SHOP_SETUP_DESC_ADMIN: MessageKey = MessageKey("shop-setup-desc.admin");
    pub const SHOP_SETUP_DESC_SELLING: MessageKey = MessageKey("shop-setup-desc.selling");
    pub const SHOP_SETUP_DESC_BUYING: MessageKey = MessageKey("shop-setup-desc.buying");
    pub const SHOP_SETUP_DESC_TRADING: MessageKey = MessageKey("shop-setup-desc.trading");
    pub const SHOP_SETUP_DESC_BOOK: MessageKey = MessageKey("shop-setup-desc.book");

    pub const TRADE_SETUP_DESC_ADMIN: MessageKey = MessageKey("trade-setup-desc.admin");
    pub const TRADE_SETUP_DESC_SELLING: MessageKey = MessageKey("trade-setup-desc.selling");
    pub const TRADE_SETUP_DESC_BUYING: MessageKey = MessageKey("trade-setup-desc.buying");
    pub const TRADE_SETUP_DESC_TRADING: MessageKey = MessageKey("trade-setup-desc.trading");
    pub const TRADE_SETUP_DESC_BOOK: MessageKey = MessageKey("trade-setup-desc.book");
    pub const TRADE_SETUP_DESC_HEADER: MessageKey = MessageKey("trade-setup-desc-header");

    // Editor buttons
    pub const BUTTON_PREVIOUS_PAGE: MessageKey = MessageKey("button.previous-page");
    pub const BUTTON_PREVIOUS_PAGE_LORE: MessageKey = MessageKey("button.previous-page.lore");
    pub const BUTTON_NEXT_PAGE: MessageKey = MessageKey("button.next-page");
    pub const BUTTON_NEXT_PAGE_LORE: MessageKey = MessageKey("button.next-page.lore");
    pub const BUTTON_CURRENT_PAGE: MessageKey = MessageKey("button.current-page");
    pub const BUTTON_CURRENT_PAGE_LORE: MessageKey = MessageKey("button.current-page.lore");
    pub const BUTTON_NAME: MessageKey = MessageKey("button.name");
    pub const BUTTON_NAME_LORE: MessageKey = MessageKey("button.name.lore");
    pub const BUTTON_CONTAINER: MessageKey = MessageKey("button.container");
    pub const BUTTON_CONTAINER_LORE: MessageKey = MessageKey("button.container.lore");
    pub const BUTTON_DELETE: MessageKey = MessageKey("button.delete");
    pub const BUTTON_DELETE_LORE: MessageKey = MessageKey("button.delete.lore");
    pub const BUTTON_HIRE: MessageKey = MessageKey("button.hire");
    pub const BUTTON_HIRE_LORE: MessageKey = MessageKey("button.hire.lore");
    pub const BUTTON_OBJECT_VARIANT: MessageKey = MessageKey("button.object-variant");
    pub const BUTTON_OBJECT_VARIANT_LORE: MessageKey = MessageKey("button.object-variant.lore");

    // Editor feedback
    pub const INVALID_TRADE: MessageKey = MessageKey("editor.invalid-trade");
    pub const TYPE_NEW_NAME: MessageKey = MessageKey("editor.type-new-name");
    pub const SHOPKEEPER_REMOVED: MessageKey = MessageKey("editor.shopkeeper-removed");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_args() {
        let message = Message::new(keys::TRADE_SETUP_DESC_HEADER).arg("shopType", "trade");
        assert_eq!(message.get_arg("shopType"), Some("trade"));
        assert_eq!(message.get_arg("missing"), None);
        assert_eq!(message.key.as_str(), "trade-setup-desc-header");
    }
}
