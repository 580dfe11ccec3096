//! Settings Definition
//!
//! The statically typed settings struct, its defaults, and the declarative
//! table mapping every field to its config key.

use crate::item::ItemDescriptor;

pub const CURRENT_CONFIG_VERSION: i64 = 4;
pub const DEFAULT_NAME_REGEX: &str = "[A-Za-z0-9 ]{3,32}";

/// Debug options that can be listed in `debug-options`
pub mod debug_options {
    /// Logs details of the host capabilities.
    pub const CAPABILITIES: &str = "capabilities";
    pub const LOG_ALL_EVENTS: &str = "log-all-events";
    pub const PRINT_LISTENERS: &str = "print-listeners";
    /// Shopkeeper activation and object spawning.
    pub const SHOPKEEPER_ACTIVATION: &str = "shopkeeper-activation";
    pub const COMMANDS: &str = "commands";
    pub const OWNER_NAME_UPDATES: &str = "owner-name-updates";
    /// Logs whenever trading offers get migrated or dropped while loading.
    pub const ITEM_MIGRATIONS: &str = "item-migrations";
    pub const ITEM_CONVERSIONS: &str = "item-conversions";
}

/// Living object kinds that may be enabled for shops
pub const KNOWN_LIVING_KINDS: &[&str] = &[
    "VILLAGER", "COW", "MUSHROOM_COW", "SHEEP", "PIG", "CHICKEN", "OCELOT", "RABBIT", "WOLF",
    "SNOWMAN", "IRON_GOLEM", "BLAZE", "SILVERFISH", "POLAR_BEAR", "SKELETON", "STRAY",
    "WITHER_SKELETON", "SPIDER", "CAVE_SPIDER", "CREEPER", "WITCH", "ENDERMAN", "ZOMBIE",
    "ZOMBIE_VILLAGER", "HUSK", "GIANT", "GHAST", "SLIME", "MAGMA_CUBE", "SQUID", "HORSE", "MULE",
    "DONKEY", "SKELETON_HORSE", "ZOMBIE_HORSE", "EVOKER", "VEX", "VINDICATOR", "ILLUSIONER",
    "PARROT", "TURTLE", "PHANTOM", "COD", "SALMON", "PUFFERFISH", "TROPICAL_FISH", "DROWNED",
    "DOLPHIN", "CAT", "PANDA", "PILLAGER", "RAVAGER", "LLAMA", "TRADER_LLAMA", "WANDERING_TRADER",
    "FOX", "BEE", "ZOMBIFIED_PIGLIN", "PIGLIN", "HOGLIN", "ZOGLIN", "STRIDER", "PIGLIN_BRUTE",
];

/// Identifiers that no longer exist, with their replacement
pub const LEGACY_LIVING_KINDS: &[(&str, &str)] = &[("PIG_ZOMBIE", "ZOMBIFIED_PIGLIN")];

/// Config keys renamed by earlier config versions: (introduced in version, old key, new key)
pub const RENAMED_KEYS: &[(i64, &str, &str)] = &[
    (3, "max-trade-pages", "max-trades-pages"),
    (4, "high-zero-cost", "high-currency-min-cost"),
];

pub fn normalize_object_kind(id: &str) -> String {
    id.trim().to_uppercase().replace(['-', ' '], "_")
}

// ============================================================================
// Settings
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub config_version: i64,
    pub debug: bool,
    pub debug_options: Vec<String>,

    // Shopkeeper data
    pub file_encoding: String,
    pub save_instantly: bool,

    // Shop creation (and removal)
    pub shop_creation_item: ItemDescriptor,
    pub deleting_player_shop_returns_creation_item: bool,
    pub max_container_distance: i32,
    pub max_shops_per_player: u32,
    pub max_shops_perm_options: String,

    // Shop object types
    pub enabled_living_shops: Vec<String>,
    pub gravity_chunk_range: i32,
    pub enable_citizen_shops: bool,
    pub enable_sign_shops: bool,

    // Naming
    pub name_regex: String,
    pub naming_of_player_shops_via_item: bool,
    pub allow_renaming_of_player_npc_shops: bool,

    // Editor menu
    pub max_trades_pages: i32,
    pub editor_trades_per_page: i32,
    pub previous_page_item: ItemDescriptor,
    pub next_page_item: ItemDescriptor,
    pub current_page_item: ItemDescriptor,
    pub trade_setup_item: ItemDescriptor,
    pub name_item: ItemDescriptor,
    pub enable_container_option_on_player_shop: bool,
    pub container_item: ItemDescriptor,
    pub delete_item: ItemDescriptor,

    // Hiring
    pub hire_item: ItemDescriptor,

    // Trading
    pub use_strict_item_comparison: bool,
    pub tax_rate: i32,
    pub tax_round_up: bool,

    // Currencies
    pub currency_item: ItemDescriptor,
    pub zero_currency_item: ItemDescriptor,
    pub high_currency_item: ItemDescriptor,
    pub zero_high_currency_item: ItemDescriptor,
    pub high_currency_value: i32,
    pub high_currency_min_cost: i32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            config_version: CURRENT_CONFIG_VERSION,
            debug: false,
            debug_options: Vec::new(),
            file_encoding: "UTF-8".to_string(),
            save_instantly: true,
            shop_creation_item: ItemDescriptor::named("VILLAGER_SPAWN_EGG", "&aShopkeeper"),
            deleting_player_shop_returns_creation_item: false,
            max_container_distance: 15,
            max_shops_per_player: 0,
            max_shops_perm_options: "10,15,25".to_string(),
            enabled_living_shops: KNOWN_LIVING_KINDS.iter().map(|s| s.to_string()).collect(),
            gravity_chunk_range: 4,
            enable_citizen_shops: true,
            enable_sign_shops: true,
            name_regex: DEFAULT_NAME_REGEX.to_string(),
            naming_of_player_shops_via_item: false,
            allow_renaming_of_player_npc_shops: false,
            max_trades_pages: 5,
            editor_trades_per_page: 8,
            previous_page_item: ItemDescriptor::new("WRITABLE_BOOK"),
            next_page_item: ItemDescriptor::new("WRITABLE_BOOK"),
            current_page_item: ItemDescriptor::new("WRITABLE_BOOK"),
            trade_setup_item: ItemDescriptor::new("PAPER"),
            name_item: ItemDescriptor::new("NAME_TAG"),
            enable_container_option_on_player_shop: true,
            container_item: ItemDescriptor::new("CHEST"),
            delete_item: ItemDescriptor::new("BONE"),
            hire_item: ItemDescriptor::new("EMERALD"),
            use_strict_item_comparison: false,
            tax_rate: 0,
            tax_round_up: false,
            currency_item: ItemDescriptor::new("EMERALD"),
            zero_currency_item: ItemDescriptor::new("BARRIER"),
            high_currency_item: ItemDescriptor::new("EMERALD_BLOCK"),
            zero_high_currency_item: ItemDescriptor::new("BARRIER"),
            high_currency_value: 9,
            high_currency_min_cost: 20,
        }
    }
}

// ============================================================================
// Field Table
// ============================================================================

/// One externally keyed setting: how to read it out of and write it into
/// the typed struct.
pub struct SettingField {
    pub key: &'static str,
    pub read: fn(&Settings) -> Result<toml::Value, String>,
    pub write: fn(&mut Settings, toml::Value) -> Result<(), String>,
}

macro_rules! setting_fields {
    ($($field:ident => $key:literal),* $(,)?) => {
        pub const SETTING_FIELDS: &[SettingField] = &[
            $(
                SettingField {
                    key: $key,
                    read: |settings| {
                        toml::Value::try_from(&settings.$field).map_err(|e| e.to_string())
                    },
                    write: |settings, value| {
                        settings.$field = value.try_into().map_err(|e: toml::de::Error| e.to_string())?;
                        Ok(())
                    },
                },
            )*
        ];
    };
}

setting_fields! {
    config_version => "config-version",
    debug => "debug",
    debug_options => "debug-options",
    file_encoding => "file-encoding",
    save_instantly => "save-instantly",
    shop_creation_item => "shop-creation-item",
    deleting_player_shop_returns_creation_item => "deleting-player-shop-returns-creation-item",
    max_container_distance => "max-container-distance",
    max_shops_per_player => "max-shops-per-player",
    max_shops_perm_options => "max-shops-perm-options",
    enabled_living_shops => "enabled-living-shops",
    gravity_chunk_range => "gravity-chunk-range",
    enable_citizen_shops => "enable-citizen-shops",
    enable_sign_shops => "enable-sign-shops",
    name_regex => "name-regex",
    naming_of_player_shops_via_item => "naming-of-player-shops-via-item",
    allow_renaming_of_player_npc_shops => "allow-renaming-of-player-npc-shops",
    max_trades_pages => "max-trades-pages",
    editor_trades_per_page => "editor-trades-per-page",
    previous_page_item => "previous-page-item",
    next_page_item => "next-page-item",
    current_page_item => "current-page-item",
    trade_setup_item => "trade-setup-item",
    name_item => "name-item",
    enable_container_option_on_player_shop => "enable-container-option-on-player-shop",
    container_item => "container-item",
    delete_item => "delete-item",
    hire_item => "hire-item",
    use_strict_item_comparison => "use-strict-item-comparison",
    tax_rate => "tax-rate",
    tax_round_up => "tax-round-up",
    currency_item => "currency-item",
    zero_currency_item => "zero-currency-item",
    high_currency_item => "high-currency-item",
    zero_high_currency_item => "zero-high-currency-item",
    high_currency_value => "high-currency-value",
    high_currency_min_cost => "high-currency-min-cost",
}

impl Settings {
    /// The built-in defaults as a config record
    pub fn default_record() -> toml::Table {
        Self::default().to_record()
    }

    /// Renders every field under its config key. Fields that fail to
    /// serialize are left out.
    pub fn to_record(&self) -> toml::Table {
        let mut record = toml::Table::new();
        for field in SETTING_FIELDS {
            if let Ok(value) = (field.read)(self) {
                record.insert(field.key.to_string(), value);
            }
        }
        record
    }

    pub fn field(key: &str) -> Option<&'static SettingField> {
        SETTING_FIELDS.iter().find(|f| f.key == key)
    }
}
