pub mod definition;
pub mod derived;
pub mod snapshot;
pub mod store;

pub use definition::{SETTING_FIELDS, Settings, SettingField, debug_options};
pub use derived::{ButtonIcon, DerivedSettings};
pub use snapshot::{SettingsSnapshot, SnapshotReader};
pub use store::{LoadReport, SettingsStore, SettingsWarning};
