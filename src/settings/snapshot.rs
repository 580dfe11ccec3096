//! Settings Snapshot
//!
//! Immutable copy of the settings that are read off the main task. A new
//! snapshot is built on every settings change and published with a single
//! atomic pointer swap, so readers see either the old or the new snapshot in
//! full.

use std::sync::Arc;

use arc_swap::ArcSwap;

use super::definition::Settings;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsSnapshot {
    pub debug: bool,
    pub debug_options: Vec<String>,
    pub file_encoding: String,
}

impl SettingsSnapshot {
    pub fn capture(settings: &Settings) -> Self {
        Self {
            debug: settings.debug,
            debug_options: settings.debug_options.clone(),
            file_encoding: settings.file_encoding.clone(),
        }
    }

    pub fn is_debugging(&self, option: Option<&str>) -> bool {
        self.debug && option.map_or(true, |option| self.debug_options.iter().any(|o| o == option))
    }
}

/// Cloneable, thread-safe handle to the latest published snapshot
#[derive(Clone)]
pub struct SnapshotReader {
    published: Arc<ArcSwap<SettingsSnapshot>>,
}

impl SnapshotReader {
    pub(super) fn new(published: Arc<ArcSwap<SettingsSnapshot>>) -> Self {
        Self { published }
    }

    pub fn current(&self) -> Arc<SettingsSnapshot> {
        self.published.load_full()
    }

    pub fn is_debugging(&self, option: Option<&str>) -> bool {
        self.published.load().is_debugging(option)
    }
}
