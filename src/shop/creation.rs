use serde::{Deserialize, Serialize};

use super::object::{BlockLocation, ShopObjectKind};
use crate::permissions::PlayerId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopOwner {
    pub id: PlayerId,
    pub name: String,
}

impl ShopOwner {
    pub fn new(id: PlayerId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
        }
    }
}

/// Creation input supplied by the command layer. Nothing in here is trusted;
/// the registry validates it against the requested shop type.
#[derive(Debug, Clone, Default)]
pub struct ShopCreationData {
    pub creator: Option<ShopOwner>,
    pub object_kind: Option<ShopObjectKind>,
    pub spawn_location: Option<BlockLocation>,
    pub container: Option<BlockLocation>,
    pub name: Option<String>,
}

impl ShopCreationData {
    pub fn new(object_kind: ShopObjectKind, spawn_location: BlockLocation) -> Self {
        Self {
            object_kind: Some(object_kind),
            spawn_location: Some(spawn_location),
            ..Default::default()
        }
    }

    pub fn by(mut self, creator: ShopOwner) -> Self {
        self.creator = Some(creator);
        self
    }

    pub fn with_container(mut self, container: BlockLocation) -> Self {
        self.container = Some(container);
        self
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }
}
