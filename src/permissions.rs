//! Permission capability consumed by shop creation.

use uuid::Uuid;

pub type PlayerId = Uuid;

pub const ADMIN_PERMISSION: &str = "shopkeeper.admin";
pub const PLAYER_SELL_PERMISSION: &str = "shopkeeper.player.sell";
pub const PLAYER_BUY_PERMISSION: &str = "shopkeeper.player.buy";
pub const PLAYER_TRADE_PERMISSION: &str = "shopkeeper.player.trade";
pub const PLAYER_BOOK_PERMISSION: &str = "shopkeeper.player.book";
pub const MAX_SHOPS_PERMISSION_PREFIX: &str = "shopkeeper.maxshops.";

/// Answers permission queries for players. Implemented by the host.
pub trait PermissionProvider {
    fn has_permission(&self, player: &PlayerId, permission: &str) -> bool;
}

impl<F> PermissionProvider for F
where
    F: Fn(&PlayerId, &str) -> bool,
{
    fn has_permission(&self, player: &PlayerId, permission: &str) -> bool {
        self(player, permission)
    }
}
