//! Settings Store
//!
//! Owns the live settings on the main task. Loading migrates the config
//! record, fills missing keys from the defaults, parses each field, and then
//! validates the result. Every change rebuilds the derived values and
//! publishes a fresh snapshot for off-thread readers.

use std::sync::Arc;

use arc_swap::ArcSwap;
use thiserror::Error;
use tracing::{info, warn};

use super::definition::{
    CURRENT_CONFIG_VERSION, DEFAULT_NAME_REGEX, LEGACY_LIVING_KINDS, KNOWN_LIVING_KINDS, RENAMED_KEYS,
    SETTING_FIELDS, Settings, normalize_object_kind,
};
use super::derived::{DerivedSettings, compile_name_pattern, default_name_pattern};
use super::snapshot::{SettingsSnapshot, SnapshotReader};
use crate::economy::CurrencyConfig;
use crate::item::{ItemDescriptor, ItemStack};
use crate::permissions::{MAX_SHOPS_PERMISSION_PREFIX, PermissionProvider, PlayerId};

/// A non-fatal problem found while loading or validating settings
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SettingsWarning {
    #[error("missing config key '{key}': inserting default value")]
    MissingKeyDefaulted { key: &'static str },
    #[error("missing config key '{key}' and no default value is available")]
    MissingDefault { key: &'static str },
    #[error("default value for '{key}' has the wrong type: {reason}")]
    DefaultTypeMismatch { key: &'static str, reason: String },
    #[error("could not load setting '{key}', keeping the previous value: {reason}")]
    InvalidValue { key: &'static str, reason: String },
    #[error("unknown living shop type '{id}' in enabled-living-shops")]
    UnknownLivingShopType { id: String },
    #[error("living shop type '{id}' was replaced by '{replacement}'")]
    LegacyLivingShopTypeReplaced { id: String, replacement: &'static str },
    #[error("'{key}' out of range ({value}), using {clamped}")]
    OutOfRange { key: &'static str, value: i32, clamped: i32 },
    #[error("'{key}' cannot be AIR, using {replacement}")]
    AirNotAllowed { key: &'static str, replacement: &'static str },
    #[error("'name-regex' is not a valid regular expression ('{regex}'), reverting to default")]
    InvalidNameRegex { regex: String },
    #[error("migrated config from version {from} to {to}")]
    Migrated { from: i64, to: i64 },
}

/// Outcome of [`SettingsStore::load`]
#[derive(Debug, Default)]
pub struct LoadReport {
    /// The record was modified and should be written back
    pub changed: bool,
    pub warnings: Vec<SettingsWarning>,
}

impl LoadReport {
    fn warn(&mut self, warning: SettingsWarning) {
        warn!("Config: {}", warning);
        self.warnings.push(warning);
    }
}

pub struct SettingsStore {
    settings: Settings,
    derived: DerivedSettings,
    published: Arc<ArcSwap<SettingsSnapshot>>,
}

impl SettingsStore {
    pub fn new() -> Self {
        let settings = Settings::default();
        let derived = DerivedSettings::new(&settings, default_name_pattern());
        let published = Arc::new(ArcSwap::from_pointee(SettingsSnapshot::capture(&settings)));
        Self {
            settings,
            derived,
            published,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn derived(&self) -> &DerivedSettings {
        &self.derived
    }

    pub fn currency(&self) -> &CurrencyConfig {
        &self.derived.currency
    }

    pub fn snapshot_reader(&self) -> SnapshotReader {
        SnapshotReader::new(Arc::clone(&self.published))
    }

    pub fn snapshot(&self) -> Arc<SettingsSnapshot> {
        self.published.load_full()
    }

    /// Reads the live settings. Off-thread code goes through a
    /// [`SnapshotReader`] instead.
    pub fn is_debugging(&self, option: Option<&str>) -> bool {
        self.settings.debug
            && option.map_or(true, |option| self.settings.debug_options.iter().any(|o| o == option))
    }

    /// Loads the settings from a config record, using the built-in defaults
    /// for missing keys.
    pub fn load_record(&mut self, record: &mut toml::Table) -> LoadReport {
        self.load(record, &Settings::default_record())
    }

    /// Loads the settings from a config record. The record is updated in
    /// place (migrated keys, inserted defaults, rewritten values) and
    /// `changed` is set when it should be saved back.
    pub fn load(&mut self, record: &mut toml::Table, defaults: &toml::Table) -> LoadReport {
        let mut report = LoadReport::default();

        migrate(record, &mut report);
        self.load_values(record, defaults, &mut report);
        self.validate(record, &mut report);
        let derived_warnings = self.on_changed();
        report.warnings.extend(derived_warnings);

        info!(
            "Loaded settings ({} warnings{})",
            report.warnings.len(),
            if report.changed { ", config updated" } else { "" }
        );
        report
    }

    fn load_values(&mut self, record: &mut toml::Table, defaults: &toml::Table, report: &mut LoadReport) {
        for field in SETTING_FIELDS {
            let Some(value) = record.get(field.key) else {
                report.warn(SettingsWarning::MissingKeyDefaulted { key: field.key });
                let Some(default) = defaults.get(field.key) else {
                    report.warn(SettingsWarning::MissingDefault { key: field.key });
                    continue;
                };
                if let Err(reason) = (field.write)(&mut self.settings, default.clone()) {
                    report.warn(SettingsWarning::DefaultTypeMismatch { key: field.key, reason });
                    continue;
                }
                record.insert(field.key.to_string(), default.clone());
                report.changed = true;
                continue;
            };

            if let Err(reason) = (field.write)(&mut self.settings, value.clone()) {
                report.warn(SettingsWarning::InvalidValue { key: field.key, reason });
            }
        }
    }

    fn validate(&mut self, record: &mut toml::Table, report: &mut LoadReport) {
        self.validate_living_shops(record, report);

        let settings = &mut self.settings;
        clamp_setting("max-container-distance", &mut settings.max_container_distance, 0, 50, report);
        clamp_setting("gravity-chunk-range", &mut settings.gravity_chunk_range, 0, i32::MAX, report);

        replace_air("shop-creation-item", &mut settings.shop_creation_item, "VILLAGER_SPAWN_EGG", report);
        replace_air("hire-item", &mut settings.hire_item, "EMERALD", report);
        replace_air("currency-item", &mut settings.currency_item, "EMERALD", report);
        if settings.naming_of_player_shops_via_item {
            replace_air("name-item", &mut settings.name_item, "NAME_TAG", report);
        }

        clamp_setting("max-trades-pages", &mut settings.max_trades_pages, 1, 10, report);
        clamp_setting("editor-trades-per-page", &mut settings.editor_trades_per_page, 1, 8, report);
        clamp_setting("tax-rate", &mut settings.tax_rate, 0, 100, report);
        clamp_setting("high-currency-value", &mut settings.high_currency_value, 0, i32::MAX, report);
        clamp_setting("high-currency-min-cost", &mut settings.high_currency_min_cost, 0, i32::MAX, report);
    }

    /// Drops unknown living kinds and rewrites legacy ones. Rewrites are
    /// written back to the record.
    fn validate_living_shops(&mut self, record: &mut toml::Table, report: &mut LoadReport) {
        let mut enabled: Vec<String> = Vec::with_capacity(self.settings.enabled_living_shops.len());
        let mut rewritten = false;

        for id in &self.settings.enabled_living_shops {
            let kind = normalize_object_kind(id);
            if let Some(&(_, replacement)) = LEGACY_LIVING_KINDS.iter().find(|(legacy, _)| *legacy == kind) {
                report.warn(SettingsWarning::LegacyLivingShopTypeReplaced {
                    id: id.clone(),
                    replacement,
                });
                rewritten = true;
                if !enabled.iter().any(|e| e == replacement) {
                    enabled.push(replacement.to_string());
                }
            } else if KNOWN_LIVING_KINDS.contains(&kind.as_str()) {
                if !enabled.contains(&kind) {
                    enabled.push(kind);
                }
            } else {
                report.warn(SettingsWarning::UnknownLivingShopType { id: id.clone() });
            }
        }
        self.settings.enabled_living_shops = enabled;

        if rewritten {
            if let Some(field) = Settings::field("enabled-living-shops") {
                if let Ok(value) = (field.read)(&self.settings) {
                    record.insert(field.key.to_string(), value);
                    report.changed = true;
                }
            }
        }
    }

    /// Applies a change to the live settings, then rebuilds derived values and
    /// republishes the snapshot.
    pub fn update(&mut self, change: impl FnOnce(&mut Settings)) -> Vec<SettingsWarning> {
        change(&mut self.settings);
        self.on_changed()
    }

    /// Rebuilds derived values and publishes a new snapshot. An invalid name
    /// regex reverts to the default.
    pub fn on_changed(&mut self) -> Vec<SettingsWarning> {
        let mut warnings = Vec::new();
        let pattern = match compile_name_pattern(&self.settings.name_regex) {
            Ok(pattern) => pattern,
            Err(_) => {
                let warning = SettingsWarning::InvalidNameRegex {
                    regex: self.settings.name_regex.clone(),
                };
                warn!("Config: {}", warning);
                warnings.push(warning);
                self.settings.name_regex = DEFAULT_NAME_REGEX.to_string();
                default_name_pattern()
            }
        };
        self.derived = DerivedSettings::new(&self.settings, pattern);
        self.published.store(Arc::new(SettingsSnapshot::capture(&self.settings)));
        warnings
    }

    /// Highest `shopkeeper.maxshops.<n>` limit the player has, falling back to
    /// `max-shops-per-player`. Zero means unlimited.
    pub fn max_shops_for(&self, player: &PlayerId, permissions: &dyn PermissionProvider) -> u32 {
        let mut best: Option<u32> = None;
        for option in self.settings.max_shops_perm_options.split(',') {
            let option = option.trim();
            if option.is_empty() {
                continue;
            }
            let Ok(limit) = option.parse::<u32>() else {
                warn!("Ignoring invalid entry '{}' in max-shops-perm-options", option);
                continue;
            };
            let permission = format!("{MAX_SHOPS_PERMISSION_PREFIX}{option}");
            if permissions.has_permission(player, &permission) {
                best = Some(best.map_or(limit, |current| current.max(limit)));
            }
        }
        best.unwrap_or(self.settings.max_shops_per_player)
    }

    pub fn is_shop_creation_item(&self, item: &ItemStack) -> bool {
        self.settings.shop_creation_item.matches_stack(Some(item))
    }

    /// Any name item, whatever display name the player gave it
    pub fn is_naming_item(&self, item: &ItemStack) -> bool {
        self.derived.naming_item.matches_stack(Some(item))
    }

    pub fn is_hire_item(&self, item: &ItemStack) -> bool {
        self.settings.hire_item.matches_stack(Some(item))
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

fn migrate(record: &mut toml::Table, report: &mut LoadReport) {
    let from = record.get("config-version").and_then(toml::Value::as_integer).unwrap_or(0);
    if from >= CURRENT_CONFIG_VERSION {
        return;
    }

    for (version, old_key, new_key) in RENAMED_KEYS {
        if from >= *version {
            continue;
        }
        if let Some(value) = record.remove(*old_key) {
            if !record.contains_key(*new_key) {
                info!("Config migration: '{}' -> '{}'", old_key, new_key);
                record.insert(new_key.to_string(), value);
            }
        }
    }
    record.insert("config-version".to_string(), toml::Value::Integer(CURRENT_CONFIG_VERSION));
    report.changed = true;
    report.warn(SettingsWarning::Migrated {
        from,
        to: CURRENT_CONFIG_VERSION,
    });
}

fn clamp_setting(key: &'static str, value: &mut i32, min: i32, max: i32, report: &mut LoadReport) {
    let clamped = (*value).clamp(min, max);
    if clamped != *value {
        report.warn(SettingsWarning::OutOfRange {
            key,
            value: *value,
            clamped,
        });
        *value = clamped;
    }
}

fn replace_air(key: &'static str, item: &mut ItemDescriptor, replacement: &'static str, report: &mut LoadReport) {
    if item.is_air() {
        report.warn(SettingsWarning::AirNotAllowed { key, replacement });
        *item = item.with_kind(replacement);
    }
}
