//! Shopkeeper economy core: shop types and shopkeepers, the trading
//! economy, editor sessions, and the settings pipeline.

pub mod economy;
pub mod editor;
pub mod error;
pub mod item;
pub mod messages;
pub mod permissions;
pub mod settings;
pub mod shop;

pub use error::{EditorError, ShopError};
