//! Shop Objects
//!
//! Handle to the physical representation of a shop. Spawning and rendering
//! are done by the host; the core only tracks what kind of object it is,
//! where it stands, and which visual variant it shows.

use serde::{Deserialize, Serialize};

use crate::item::ItemStack;
use crate::settings::Settings;
use crate::settings::definition::normalize_object_kind;

pub const SIGN_VARIANTS: &[&str] = &["OAK", "SPRUCE", "BIRCH", "JUNGLE", "ACACIA", "DARK_OAK"];
pub const VILLAGER_PROFESSIONS: &[&str] = &[
    "NONE", "ARMORER", "BUTCHER", "CARTOGRAPHER", "CLERIC", "FARMER", "FISHERMAN", "FLETCHER",
    "LEATHERWORKER", "LIBRARIAN", "MASON", "NITWIT", "SHEPHERD", "TOOLSMITH", "WEAPONSMITH",
];
pub const LIVING_AGES: &[&str] = &["ADULT", "BABY"];

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockLocation {
    pub world: String,
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockLocation {
    pub fn new(world: &str, x: i32, y: i32, z: i32) -> Self {
        Self {
            world: world.to_string(),
            x,
            y,
            z,
        }
    }

    /// Squared block distance, `None` across worlds
    pub fn distance_squared(&self, other: &BlockLocation) -> Option<i64> {
        if self.world != other.world {
            return None;
        }
        let dx = i64::from(self.x) - i64::from(other.x);
        let dy = i64::from(self.y) - i64::from(other.y);
        let dz = i64::from(self.z) - i64::from(other.z);
        Some(dx * dx + dy * dy + dz * dz)
    }

    pub fn is_within(&self, other: &BlockLocation, max_distance: i32) -> bool {
        let max = i64::from(max_distance.max(0));
        self.distance_squared(other).is_some_and(|d| d <= max * max)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShopObjectKind {
    /// A living entity of the given type
    Living(String),
    Sign,
    Citizen,
}

impl ShopObjectKind {
    pub fn living(entity: &str) -> Self {
        ShopObjectKind::Living(normalize_object_kind(entity))
    }

    pub fn is_enabled(&self, settings: &Settings) -> bool {
        match self {
            ShopObjectKind::Living(entity) => settings.enabled_living_shops.iter().any(|e| e == entity),
            ShopObjectKind::Sign => settings.enable_sign_shops,
            ShopObjectKind::Citizen => settings.enable_citizen_shops,
        }
    }

    /// Visual variants the editor can cycle through
    pub fn variants(&self) -> &'static [&'static str] {
        match self {
            ShopObjectKind::Living(entity) if entity == "VILLAGER" => VILLAGER_PROFESSIONS,
            ShopObjectKind::Living(_) => LIVING_AGES,
            ShopObjectKind::Sign => SIGN_VARIANTS,
            ShopObjectKind::Citizen => &[],
        }
    }
}

impl std::fmt::Display for ShopObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShopObjectKind::Living(entity) => write!(f, "living:{}", entity),
            ShopObjectKind::Sign => f.write_str("sign"),
            ShopObjectKind::Citizen => f.write_str("citizen"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopObject {
    pub kind: ShopObjectKind,
    pub location: BlockLocation,
    #[serde(default)]
    pub variant: u8,
}

impl ShopObject {
    pub fn new(kind: ShopObjectKind, location: BlockLocation) -> Self {
        Self {
            kind,
            location,
            variant: 0,
        }
    }

    pub fn variant_name(&self) -> Option<&'static str> {
        let variants = self.kind.variants();
        variants.get(usize::from(self.variant) % variants.len().max(1)).copied()
    }

    /// Advances to the next variant, wrapping around. Returns the new variant
    /// name, or `None` if the object has no variants.
    pub fn cycle_variant(&mut self) -> Option<&'static str> {
        let count = self.kind.variants().len();
        if count == 0 {
            return None;
        }
        self.variant = ((usize::from(self.variant) + 1) % count) as u8;
        self.variant_name()
    }

    /// Editor icon for the current variant
    pub fn variant_icon(&self) -> Option<ItemStack> {
        let variant = self.variant_name()?;
        let kind = match &self.kind {
            ShopObjectKind::Sign => format!("{}_SIGN", variant),
            ShopObjectKind::Living(entity) => format!("{}_SPAWN_EGG", entity),
            ShopObjectKind::Citizen => return None,
        };
        Some(ItemStack::of(&kind, 1))
    }
}
