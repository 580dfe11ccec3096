//! Shop Registry
//!
//! Maps shop type ids and aliases to their descriptors and owns the live
//! index of shopkeepers.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};

use serde_json::Value;
use tracing::{debug, info, warn};

use super::creation::ShopCreationData;
use super::definition::{PREFIX_FALLBACKS, ShopTypeDescriptor, normalize_identifier};
use super::record::RawShopRecord;
use super::shopkeeper::Shopkeeper;
use crate::error::ShopError;
use crate::permissions::{PermissionProvider, PlayerId};
use crate::settings::{SettingsStore, debug_options};

/// Registry for shop types and the shopkeepers created from them
pub struct ShopRegistry {
    types: Vec<ShopTypeDescriptor>,
    identifiers: HashMap<String, usize>,
    shopkeepers: BTreeMap<u32, Shopkeeper>,
    next_id: u32,
}

impl ShopRegistry {
    /// Create a new registry without any shop types
    pub fn new() -> Self {
        Self {
            types: Vec::new(),
            identifiers: HashMap::new(),
            shopkeepers: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Create a registry with the built-in admin, sell, buy, trade and book types
    pub fn with_default_types() -> Self {
        let mut registry = Self::new();
        for descriptor in ShopTypeDescriptor::defaults() {
            if let Err(e) = registry.register(descriptor) {
                warn!("Failed to register built-in shop type: {}", e);
            }
        }
        registry
    }

    // ========================================================================
    // Shop Types
    // ========================================================================

    /// Register a shop type under its id and aliases. Registering an identical
    /// descriptor again is a no-op.
    pub fn register(&mut self, mut descriptor: ShopTypeDescriptor) -> Result<(), ShopError> {
        descriptor.id = normalize_identifier(&descriptor.id);
        for alias in &mut descriptor.aliases {
            *alias = normalize_identifier(alias);
        }

        if self.types.contains(&descriptor) {
            debug!("Shop type '{}' is already registered", descriptor.id);
            return Ok(());
        }

        for identifier in descriptor.identifiers() {
            if let Some(&index) = self.identifiers.get(identifier) {
                return Err(ShopError::DuplicateShopType {
                    identifier: identifier.to_string(),
                    existing: self.types[index].id.clone(),
                });
            }
        }

        let index = self.types.len();
        for identifier in descriptor.identifiers() {
            self.identifiers.insert(identifier.to_string(), index);
        }
        info!("Registered shop type '{}'", descriptor.id);
        self.types.push(descriptor);
        Ok(())
    }

    /// Look up a shop type by id or alias, falling back to known prefixes
    pub fn resolve(&self, identifier: &str) -> Option<&ShopTypeDescriptor> {
        let normalized = normalize_identifier(identifier);
        if let Some(&index) = self.identifiers.get(&normalized) {
            return self.types.get(index);
        }

        PREFIX_FALLBACKS
            .iter()
            .find(|(prefix, _)| normalized.starts_with(prefix))
            .and_then(|(_, target)| self.identifiers.get(*target))
            .and_then(|&index| self.types.get(index))
    }

    /// Get an iterator over all shop types in registration order
    pub fn shop_types(&self) -> impl Iterator<Item = &ShopTypeDescriptor> {
        self.types.iter()
    }

    // ========================================================================
    // Shopkeepers
    // ========================================================================

    /// Validate creation input and add a new shopkeeper with empty recipes
    pub fn create_shopkeeper(
        &mut self,
        shop_type: &str,
        data: &ShopCreationData,
        settings: &SettingsStore,
        permissions: &dyn PermissionProvider,
    ) -> Result<&Shopkeeper, ShopError> {
        let descriptor = self
            .resolve(shop_type)
            .cloned()
            .ok_or_else(|| ShopError::UnknownShopType(shop_type.to_string()))?;

        // Shape first, then the creator's rights
        let shopkeeper = descriptor.create(self.next_id, data, settings)?;

        if let Some(creator) = &data.creator {
            if !permissions.has_permission(&creator.id, &descriptor.permission) {
                return Err(ShopError::MissingPermission {
                    permission: descriptor.permission.clone(),
                });
            }

            if descriptor.is_player_shop() {
                let limit = settings.max_shops_for(&creator.id, permissions);
                let owned = self.owned_by(&creator.id).count();
                if limit > 0 && owned >= limit as usize {
                    return Err(ShopError::ShopLimitReached { owned, limit });
                }
            }
        }

        let id = self.next_id;
        let next_id = id.checked_add(1).ok_or(ShopError::IdsExhausted)?;
        info!(
            "Created {} shopkeeper {} at {:?}",
            descriptor.id,
            id,
            shopkeeper.object().location
        );
        self.next_id = next_id;
        self.insert_new(shopkeeper)
    }

    /// Rebuild a shopkeeper from a persisted record and add it to the index
    pub fn load_shopkeeper(&mut self, shop_type: &str, record: &Value) -> Result<&Shopkeeper, ShopError> {
        let descriptor = self
            .resolve(shop_type)
            .cloned()
            .ok_or_else(|| ShopError::UnknownShopType(shop_type.to_string()))?;

        let raw = RawShopRecord::from_json(record)?;
        let tag = RawShopRecord::require(&raw.shop_type, "type")?;
        if self.resolve(tag).map(|d| d.id.as_str()) != Some(descriptor.id.as_str()) {
            return Err(ShopError::CorruptRecord {
                field: "type",
                reason: format!("'{}' does not match shop type '{}'", tag, descriptor.id),
            });
        }

        let shopkeeper = descriptor.load(&raw)?;
        let id = shopkeeper.id();
        // The id after the highest loaded one must stay allocatable
        let Some(after) = id.checked_add(1) else {
            return Err(ShopError::CorruptRecord {
                field: "id",
                reason: format!("{} leaves no room for new shopkeepers", id),
            });
        };

        self.next_id = self.next_id.max(after);
        self.insert_new(shopkeeper)
    }

    fn insert_new(&mut self, shopkeeper: Shopkeeper) -> Result<&Shopkeeper, ShopError> {
        match self.shopkeepers.entry(shopkeeper.id()) {
            Entry::Vacant(entry) => Ok(entry.insert(shopkeeper)),
            Entry::Occupied(entry) => Err(ShopError::CorruptRecord {
                field: "id",
                reason: format!("shopkeeper {} is already loaded", entry.key()),
            }),
        }
    }

    /// Load every record of a stored array, skipping the ones that fail.
    /// Returns the number of loaded shopkeepers.
    pub fn load_all(&mut self, records: &[Value], settings: &SettingsStore) -> usize {
        let mut loaded = 0;
        for record in records {
            let shop_type = record.get("type").and_then(Value::as_str).unwrap_or_default();
            match self.load_shopkeeper(shop_type, record) {
                Ok(shopkeeper) => {
                    if settings.is_debugging(Some(debug_options::SHOPKEEPER_ACTIVATION)) {
                        debug!("Loaded shopkeeper {} ({})", shopkeeper.id(), shopkeeper.type_id());
                    }
                    loaded += 1;
                }
                Err(e) => warn!("Skipping shopkeeper record: {}", e),
            }
        }
        info!("Loaded {} of {} shopkeepers", loaded, records.len());
        loaded
    }

    /// Get a shopkeeper by id
    pub fn get(&self, id: u32) -> Option<&Shopkeeper> {
        self.shopkeepers.get(&id)
    }

    /// Get a mutable shopkeeper by id
    pub fn get_mut(&mut self, id: u32) -> Option<&mut Shopkeeper> {
        self.shopkeepers.get_mut(&id)
    }

    /// Get an iterator over all shopkeepers in id order
    pub fn shopkeepers(&self) -> impl Iterator<Item = &Shopkeeper> {
        self.shopkeepers.values()
    }

    pub fn owned_by<'a>(&'a self, player: &'a PlayerId) -> impl Iterator<Item = &'a Shopkeeper> + 'a {
        self.shopkeepers.values().filter(move |s| s.is_owned_by(player))
    }

    /// Invalidate a shopkeeper and remove it from the index
    pub fn delete_shopkeeper(&mut self, id: u32) -> Result<Shopkeeper, ShopError> {
        let mut shopkeeper = self
            .shopkeepers
            .remove(&id)
            .ok_or(ShopError::ShopkeeperInvalidated { id })?;
        shopkeeper.invalidate()?;
        info!("Deleted shopkeeper {}", id);
        Ok(shopkeeper)
    }

    /// Set or clear the name of a shopkeeper. Names must match the configured
    /// name pattern.
    pub fn rename_shopkeeper(&mut self, id: u32, name: Option<&str>, settings: &SettingsStore) -> Result<(), ShopError> {
        if let Some(name) = name {
            if !settings.derived().shop_name_pattern.is_match(name) {
                return Err(ShopError::InvalidName { name: name.to_string() });
            }
        }
        let shopkeeper = self
            .shopkeepers
            .get_mut(&id)
            .ok_or(ShopError::ShopkeeperInvalidated { id })?;
        shopkeeper.set_name(name.map(str::to_string))
    }

    pub fn max_shops_for(&self, player: &PlayerId, settings: &SettingsStore, permissions: &dyn PermissionProvider) -> u32 {
        settings.max_shops_for(player, permissions)
    }

    /// Records of all shopkeepers, ready to be written out
    pub fn to_records(&self) -> Vec<Value> {
        self.shopkeepers
            .values()
            .filter_map(|shopkeeper| match shopkeeper.to_record().to_json() {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!("Failed to serialize shopkeeper {}: {}", shopkeeper.id(), e);
                    None
                }
            })
            .collect()
    }

    /// Get the number of live shopkeepers
    pub fn len(&self) -> usize {
        self.shopkeepers.len()
    }

    /// Check if there are no live shopkeepers
    pub fn is_empty(&self) -> bool {
        self.shopkeepers.is_empty()
    }
}

impl Default for ShopRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::economy::TradingRecipe;
    use crate::item::ItemStack;
    use crate::shop::creation::ShopOwner;
    use crate::shop::definition::ShopKind;
    use crate::shop::object::{BlockLocation, ShopObjectKind};
    use serde_json::json;

    fn allow_all(_: &PlayerId, _: &str) -> bool {
        true
    }

    fn spawn() -> BlockLocation {
        BlockLocation::new("world", 10, 64, 10)
    }

    fn player_shop(owner: &ShopOwner) -> ShopCreationData {
        ShopCreationData::new(ShopObjectKind::living("villager"), spawn())
            .by(owner.clone())
            .with_container(BlockLocation::new("world", 11, 64, 10))
    }

    #[test]
    fn test_register_duplicates() {
        let mut registry = ShopRegistry::with_default_types();
        assert_eq!(registry.shop_types().count(), 5);

        // Same descriptor twice is fine
        let trade = ShopTypeDescriptor::new("trade", ShopKind::Trading, "shopkeeper.player.trade").with_alias("trading");
        assert!(registry.register(trade).is_ok());
        assert_eq!(registry.shop_types().count(), 5);

        let clash = ShopTypeDescriptor::new("barter", ShopKind::Trading, "shopkeeper.player.trade").with_alias("Trading");
        assert_eq!(
            registry.register(clash),
            Err(ShopError::DuplicateShopType {
                identifier: "trading".to_string(),
                existing: "trade".to_string(),
            })
        );

        let other = ShopTypeDescriptor::new("admin", ShopKind::Admin, "other.permission");
        assert!(matches!(registry.register(other), Err(ShopError::DuplicateShopType { .. })));
    }

    #[test]
    fn test_register_normalizes_literal_descriptors() {
        let mut registry = ShopRegistry::new();
        let descriptor = ShopTypeDescriptor {
            id: "Trade-Post".to_string(),
            aliases: vec!["Market Stall".to_string()],
            permission: "shopkeeper.player.trade".to_string(),
            kind: ShopKind::Trading,
        };
        registry.register(descriptor.clone()).unwrap();

        assert_eq!(registry.resolve("trade post").map(|d| d.id.as_str()), Some("tradepost"));
        assert_eq!(registry.resolve("MARKET_STALL").map(|d| d.id.as_str()), Some("tradepost"));
        // The same literal again is the same descriptor
        assert!(registry.register(descriptor).is_ok());
        assert_eq!(registry.shop_types().count(), 1);
    }

    #[test]
    fn test_resolve() {
        let registry = ShopRegistry::with_default_types();
        assert_eq!(registry.resolve("Trading").map(|d| d.id.as_str()), Some("trade"));
        assert_eq!(registry.resolve(" SELL ").map(|d| d.id.as_str()), Some("sell"));
        assert_eq!(registry.resolve("player").map(|d| d.id.as_str()), Some("sell"));
        assert_eq!(registry.resolve("buy-shop").map(|d| d.id.as_str()), Some("buy"));
        assert_eq!(registry.resolve("trader").map(|d| d.id.as_str()), Some("trade"));
        assert_eq!(registry.resolve("bookshop").map(|d| d.id.as_str()), Some("book"));
        assert!(registry.resolve("auction").is_none());
    }

    #[test]
    fn test_create_validates_shape() {
        let settings = SettingsStore::new();
        let mut registry = ShopRegistry::with_default_types();
        let owner = ShopOwner::new(PlayerId::new_v4(), "alice");

        let no_spawn = ShopCreationData {
            creator: Some(owner.clone()),
            object_kind: Some(ShopObjectKind::Sign),
            ..Default::default()
        };
        assert!(matches!(
            registry.create_shopkeeper("sell", &no_spawn, &settings, &allow_all),
            Err(ShopError::InvalidCreationData { field: "spawn_location", .. })
        ));

        let no_creator = ShopCreationData::new(ShopObjectKind::Sign, spawn());
        assert!(matches!(
            registry.create_shopkeeper("sell", &no_creator, &settings, &allow_all),
            Err(ShopError::InvalidCreationData { field: "creator", .. })
        ));

        let no_container = ShopCreationData::new(ShopObjectKind::Sign, spawn()).by(owner.clone());
        assert!(matches!(
            registry.create_shopkeeper("sell", &no_container, &settings, &allow_all),
            Err(ShopError::InvalidCreationData { field: "container", .. })
        ));

        let far = ShopCreationData::new(ShopObjectKind::Sign, spawn())
            .by(owner.clone())
            .with_container(BlockLocation::new("world", 100, 64, 10));
        assert!(matches!(
            registry.create_shopkeeper("sell", &far, &settings, &allow_all),
            Err(ShopError::InvalidCreationData { field: "container", .. })
        ));

        let unicorn = ShopCreationData::new(ShopObjectKind::living("unicorn"), spawn());
        assert!(matches!(
            registry.create_shopkeeper("admin", &unicorn, &settings, &allow_all),
            Err(ShopError::InvalidCreationData { field: "object", .. })
        ));

        assert_eq!(
            registry.create_shopkeeper("auction", &unicorn, &settings, &allow_all).err(),
            Some(ShopError::UnknownShopType("auction".to_string()))
        );
        assert!(registry.is_empty());

        // Admin shops need neither creator nor container
        let admin = ShopCreationData::new(ShopObjectKind::Sign, spawn());
        let shopkeeper = registry.create_shopkeeper("admin", &admin, &settings, &allow_all).unwrap();
        assert!(shopkeeper.owner().is_none());
        assert!(shopkeeper.recipes().is_empty());
    }

    #[test]
    fn test_create_checks_permission_and_limit() {
        let mut settings = SettingsStore::new();
        settings.update(|s| {
            s.max_shops_per_player = 1;
            s.max_shops_perm_options = "2".to_string();
        });
        let mut registry = ShopRegistry::with_default_types();
        let owner = ShopOwner::new(PlayerId::new_v4(), "alice");

        let deny = |_: &PlayerId, _: &str| false;
        assert_eq!(
            registry.create_shopkeeper("sell", &player_shop(&owner), &settings, &deny).err(),
            Some(ShopError::MissingPermission {
                permission: "shopkeeper.player.sell".to_string()
            })
        );

        let no_extra = |_: &PlayerId, permission: &str| !permission.starts_with("shopkeeper.maxshops.");
        let first = registry
            .create_shopkeeper("sell", &player_shop(&owner), &settings, &no_extra)
            .unwrap()
            .id();
        assert_eq!(
            registry.create_shopkeeper("trade", &player_shop(&owner), &settings, &no_extra).err(),
            Some(ShopError::ShopLimitReached { owned: 1, limit: 1 })
        );

        let second = registry
            .create_shopkeeper("trade", &player_shop(&owner), &settings, &allow_all)
            .unwrap()
            .id();
        assert_ne!(first, second);
        assert_eq!(registry.owned_by(&owner.id).count(), 2);
        assert_eq!(registry.max_shops_for(&owner.id, &settings, &allow_all), 2);
    }

    #[test]
    fn test_record_round_trip() {
        let settings = SettingsStore::new();
        let mut registry = ShopRegistry::with_default_types();
        let owner = ShopOwner::new(PlayerId::new_v4(), "alice");

        let id = registry
            .create_shopkeeper("sell", &player_shop(&owner), &settings, &allow_all)
            .unwrap()
            .id();
        let recipes = vec![TradingRecipe {
            result: ItemStack::of("BREAD", 3),
            cost1: ItemStack::of("EMERALD", 2),
            cost2: None,
        }];
        registry.get_mut(id).unwrap().set_recipes(recipes.clone()).unwrap();
        let original = registry.get(id).unwrap().clone();
        let record = original.to_record().to_json().unwrap();

        let mut reloaded = ShopRegistry::with_default_types();
        let loaded = reloaded.load_shopkeeper("sell", &record).unwrap();
        assert_eq!(loaded.id(), original.id());
        assert_eq!(loaded.owner(), original.owner());
        assert_eq!(loaded.recipes(), recipes.as_slice());
        assert_eq!(loaded, &original);

        // Loaded ids are never handed out again
        let next = reloaded
            .create_shopkeeper("sell", &player_shop(&owner), &settings, &allow_all)
            .unwrap()
            .id();
        assert!(next > id);

        assert!(matches!(
            reloaded.load_shopkeeper("sell", &record),
            Err(ShopError::CorruptRecord { field: "id", .. })
        ));
    }

    #[test]
    fn test_ids_stay_unique_at_the_top_of_the_range() {
        let settings = SettingsStore::new();
        let mut registry = ShopRegistry::with_default_types();
        let object = json!({"kind": "sign", "location": {"world": "world", "x": 0, "y": 64, "z": 0}});

        let last = json!({"id": u32::MAX, "type": "admin", "name": "Loaded", "object": object});
        assert!(matches!(
            registry.load_shopkeeper("admin", &last),
            Err(ShopError::CorruptRecord { field: "id", .. })
        ));
        assert!(registry.is_empty());

        let second_last = json!({"id": u32::MAX - 1, "type": "admin", "name": "Loaded", "object": object});
        registry.load_shopkeeper("admin", &second_last).unwrap();

        let fresh = ShopCreationData::new(ShopObjectKind::Sign, spawn()).named("Fresh Shop");
        assert_eq!(
            registry.create_shopkeeper("admin", &fresh, &settings, &allow_all).err(),
            Some(ShopError::IdsExhausted)
        );
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(u32::MAX - 1).unwrap().name(), Some("Loaded"));
    }

    #[test]
    fn test_load_rejects_corrupt_records() {
        let mut registry = ShopRegistry::with_default_types();
        let object = json!({"kind": "sign", "location": {"world": "world", "x": 0, "y": 64, "z": 0}});

        let mismatched = json!({"id": 3, "type": "buy", "object": object});
        assert!(matches!(
            registry.load_shopkeeper("sell", &mismatched),
            Err(ShopError::CorruptRecord { field: "type", .. })
        ));

        let no_owner = json!({"id": 3, "type": "sell", "object": object});
        assert!(matches!(
            registry.load_shopkeeper("sell", &no_owner),
            Err(ShopError::CorruptRecord { field: "owner", .. })
        ));

        let no_id = json!({"type": "admin", "object": object});
        assert!(matches!(
            registry.load_shopkeeper("admin", &no_id),
            Err(ShopError::CorruptRecord { field: "id", .. })
        ));
        assert!(registry.is_empty());

        let with_bad_recipe = json!({
            "id": 4,
            "type": "admin",
            "object": object,
            "recipes": [
                {"result": {"item": "BREAD", "amount": 0}, "cost1": {"item": "EMERALD", "amount": 1}},
                {"result": {"item": "BREAD", "amount": 2}, "cost1": {"item": "EMERALD", "amount": 1}},
                {"cost1": "nonsense"},
            ],
        });
        let loaded = registry.load_shopkeeper("admin", &with_bad_recipe).unwrap();
        assert_eq!(loaded.recipes().len(), 1);
        assert_eq!(loaded.recipes()[0].result, ItemStack::of("BREAD", 2));
    }

    #[test]
    fn test_delete_and_rename() {
        let settings = SettingsStore::new();
        let mut registry = ShopRegistry::with_default_types();
        let admin = ShopCreationData::new(ShopObjectKind::Sign, spawn());
        let id = registry.create_shopkeeper("admin", &admin, &settings, &allow_all).unwrap().id();

        assert!(registry.rename_shopkeeper(id, Some("Town Market"), &settings).is_ok());
        assert_eq!(registry.get(id).unwrap().name(), Some("Town Market"));
        assert_eq!(
            registry.rename_shopkeeper(id, Some("x!"), &settings),
            Err(ShopError::InvalidName { name: "x!".to_string() })
        );

        let deleted = registry.delete_shopkeeper(id).unwrap();
        assert!(!deleted.is_valid());
        assert!(registry.get(id).is_none());
        assert_eq!(
            registry.delete_shopkeeper(id).err(),
            Some(ShopError::ShopkeeperInvalidated { id })
        );
        assert_eq!(
            registry.rename_shopkeeper(id, None, &settings),
            Err(ShopError::ShopkeeperInvalidated { id })
        );
    }

    #[test]
    fn test_load_all_skips_failures() {
        let settings = SettingsStore::new();
        let mut registry = ShopRegistry::with_default_types();
        let object = json!({"kind": {"living": "VILLAGER"}, "location": {"world": "world", "x": 0, "y": 64, "z": 0}});
        let records = vec![
            json!({"id": 1, "type": "admin", "object": object}),
            json!({"id": 2, "type": "auction", "object": object}),
            json!({"id": 1, "type": "admin", "object": object}),
        ];
        assert_eq!(registry.load_all(&records, &settings), 1);
        assert_eq!(registry.to_records().len(), 1);
    }
}
