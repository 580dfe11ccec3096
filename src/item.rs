use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Structured extras attached to an item (enchantments, book data, ...).
pub type ItemMetadata = serde_json::Map<String, Value>;

pub const MAX_STACK_SIZE: u32 = 64;

// ============================================================================
// Item Kinds
// ============================================================================

/// Normalized item kind identifier (`EMERALD`, `NAME_TAG`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ItemKind(String);

impl ItemKind {
    pub const AIR: &'static str = "AIR";

    pub fn new(id: &str) -> Self {
        Self(normalize_kind(id))
    }

    pub fn air() -> Self {
        Self(Self::AIR.to_string())
    }

    pub fn is_air(&self) -> bool {
        self.0 == Self::AIR || self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn normalize_kind(id: &str) -> String {
    id.trim()
        .to_uppercase()
        .chars()
        .map(|c| if c == '-' || c == ' ' { '_' } else { c })
        .collect()
}

impl From<String> for ItemKind {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

impl From<ItemKind> for String {
    fn from(value: ItemKind) -> Self {
        value.0
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Item Descriptor
// ============================================================================

/// Configured description of an item: kind plus optional name and extras.
///
/// Descriptors double as comparators. [`ItemDescriptor::matches`] is the
/// lenient "type match" used for configured items (the actual item may carry
/// additional data), [`ItemDescriptor::matches_exactly`] requires equality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawItemDescriptor", into = "RawItemDescriptor")]
pub struct ItemDescriptor {
    pub kind: ItemKind,
    pub display_name: Option<String>,
    pub metadata: Option<ItemMetadata>,
}

/// Config form: either `"EMERALD"` or `{ type = "EMERALD", display-name = "..", meta = {..} }`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawItemDescriptor {
    Kind(String),
    Full {
        #[serde(rename = "type")]
        kind: String,
        #[serde(rename = "display-name", default, skip_serializing_if = "Option::is_none")]
        display_name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        meta: Option<ItemMetadata>,
    },
}

impl From<RawItemDescriptor> for ItemDescriptor {
    fn from(raw: RawItemDescriptor) -> Self {
        match raw {
            RawItemDescriptor::Kind(kind) => ItemDescriptor::new(&kind),
            RawItemDescriptor::Full { kind, display_name, meta } => ItemDescriptor {
                kind: ItemKind::new(&kind),
                display_name,
                metadata: meta.filter(|m| !m.is_empty()),
            },
        }
    }
}

impl From<ItemDescriptor> for RawItemDescriptor {
    fn from(item: ItemDescriptor) -> Self {
        if item.display_name.is_none() && item.metadata.is_none() {
            RawItemDescriptor::Kind(item.kind.into())
        } else {
            RawItemDescriptor::Full {
                kind: item.kind.into(),
                display_name: item.display_name,
                meta: item.metadata,
            }
        }
    }
}

impl ItemDescriptor {
    pub fn new(kind: &str) -> Self {
        Self {
            kind: ItemKind::new(kind),
            display_name: None,
            metadata: None,
        }
    }

    pub fn air() -> Self {
        Self::new(ItemKind::AIR)
    }

    pub fn named(kind: &str, display_name: &str) -> Self {
        Self {
            display_name: Some(display_name.to_string()),
            ..Self::new(kind)
        }
    }

    pub fn with_metadata(mut self, metadata: ItemMetadata) -> Self {
        self.metadata = if metadata.is_empty() { None } else { Some(metadata) };
        self
    }

    /// Same name and extras, different kind
    pub fn with_kind(&self, kind: &str) -> Self {
        Self {
            kind: ItemKind::new(kind),
            ..self.clone()
        }
    }

    pub fn without_display_name(&self) -> Self {
        Self {
            display_name: None,
            ..self.clone()
        }
    }

    pub fn is_air(&self) -> bool {
        self.kind.is_air()
    }

    pub fn to_stack(&self, amount: u32) -> ItemStack {
        ItemStack::new(self.clone(), amount)
    }

    /// Type match: same kind, and everything this descriptor specifies is
    /// present in `item`.
    pub fn matches(&self, item: &ItemDescriptor) -> bool {
        if self.kind != item.kind {
            return false;
        }
        if let Some(name) = &self.display_name {
            if item.display_name.as_ref() != Some(name) {
                return false;
            }
        }
        match (&self.metadata, &item.metadata) {
            (None, _) => true,
            (Some(expected), None) => expected.is_empty(),
            (Some(expected), Some(actual)) => metadata_subset(expected, actual),
        }
    }

    pub fn matches_exactly(&self, item: &ItemDescriptor) -> bool {
        self == item
    }

    /// Type match against a (possibly absent) stack. Empty stacks never match.
    pub fn matches_stack(&self, stack: Option<&ItemStack>) -> bool {
        match stack {
            Some(stack) if !stack.is_empty() => self.matches(&stack.item),
            _ => false,
        }
    }
}

fn metadata_subset(expected: &ItemMetadata, actual: &ItemMetadata) -> bool {
    expected.iter().all(|(key, value)| {
        actual
            .get(key)
            .map(|other| value_compatible(value, other))
            .unwrap_or(false)
    })
}

fn value_compatible(expected: &Value, actual: &Value) -> bool {
    match (expected, actual) {
        (Value::Object(e), Value::Object(a)) => metadata_subset(e, a),
        _ => expected == actual,
    }
}

// ============================================================================
// Item Stacks
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item: ItemDescriptor,
    pub amount: u32,
}

impl ItemStack {
    pub fn new(item: ItemDescriptor, amount: u32) -> Self {
        Self { item, amount }
    }

    pub fn of(kind: &str, amount: u32) -> Self {
        Self::new(ItemDescriptor::new(kind), amount)
    }

    pub fn kind(&self) -> &ItemKind {
        &self.item.kind
    }

    pub fn is_empty(&self) -> bool {
        self.amount == 0 || self.item.is_air()
    }

    pub fn with_amount(&self, amount: u32) -> Self {
        Self::new(self.item.clone(), amount)
    }
}

/// Whether a slot holds nothing tradeable
pub fn is_empty_slot(stack: Option<&ItemStack>) -> bool {
    stack.map_or(true, ItemStack::is_empty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn meta(value: Value) -> ItemMetadata {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_kind_normalization() {
        assert_eq!(ItemKind::new(" emerald-block ").as_str(), "EMERALD_BLOCK");
        assert_eq!(ItemKind::new("name tag").as_str(), "NAME_TAG");
        assert!(ItemKind::new("air").is_air());
    }

    #[test]
    fn test_parse_descriptor_forms() {
        #[derive(Deserialize)]
        struct Wrapper {
            plain: ItemDescriptor,
            full: ItemDescriptor,
        }

        let toml_str = r#"
            plain = "emerald"

            [full]
            type = "villager_spawn_egg"
            display-name = "&aShopkeeper"
            meta = { custom-model = 3 }
        "#;

        let parsed: Wrapper = toml::from_str(toml_str).unwrap();
        assert_eq!(parsed.plain, ItemDescriptor::new("EMERALD"));
        assert_eq!(parsed.full.kind.as_str(), "VILLAGER_SPAWN_EGG");
        assert_eq!(parsed.full.display_name.as_deref(), Some("&aShopkeeper"));
        assert_eq!(parsed.full.metadata.unwrap()["custom-model"], json!(3));
    }

    #[test]
    fn test_type_match_allows_extra_data() {
        let configured = ItemDescriptor::new("WRITTEN_BOOK")
            .with_metadata(meta(json!({ "book": { "author": "Notch" } })));
        let actual = ItemDescriptor::named("WRITTEN_BOOK", "Tales")
            .with_metadata(meta(json!({ "book": { "author": "Notch", "pages": 4 }, "generation": 0 })));

        assert!(configured.matches(&actual));
        assert!(!configured.matches_exactly(&actual));
        assert!(!actual.matches(&configured));
    }

    #[test]
    fn test_type_match_respects_display_name() {
        let configured = ItemDescriptor::named("NAME_TAG", "Rename");
        assert!(!configured.matches(&ItemDescriptor::new("NAME_TAG")));
        assert!(configured.without_display_name().matches(&ItemDescriptor::named("NAME_TAG", "Bob")));
        assert!(!configured.matches(&ItemDescriptor::named("PAPER", "Rename")));
    }

    #[test]
    fn test_empty_stacks() {
        assert!(ItemStack::of("EMERALD", 0).is_empty());
        assert!(ItemStack::of("AIR", 5).is_empty());
        assert!(is_empty_slot(None));
        assert!(!ItemDescriptor::new("EMERALD").matches_stack(Some(&ItemStack::of("EMERALD", 0))));
        assert!(ItemDescriptor::new("EMERALD").matches_stack(Some(&ItemStack::of("EMERALD", 2))));
    }
}
