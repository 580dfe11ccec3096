pub mod creation;
pub mod definition;
pub mod object;
pub mod record;
pub mod registry;
pub mod shopkeeper;

pub use creation::{ShopCreationData, ShopOwner};
pub use definition::{ShopKind, ShopTypeDescriptor, normalize_identifier, validate_for_shop};
pub use object::{BlockLocation, ShopObject, ShopObjectKind};
pub use record::{RawShopRecord, ShopRecord};
pub use registry::ShopRegistry;
pub use shopkeeper::Shopkeeper;
