//! Editor Sessions
//!
//! Index of open editor sessions, at most one per player. Carries out the
//! button commands that reach beyond a single session.

use std::collections::HashMap;

use tracing::{info, warn};

use super::button::ButtonCommand;
use super::session::{CloseOutcome, EditorAction, EditorSession, RejectedDraft};
use crate::economy::TradingRecipeDraft;
use crate::error::{EditorError, ShopError};
use crate::permissions::PlayerId;
use crate::settings::SettingsStore;
use crate::shop::ShopRegistry;

pub struct EditorSessions {
    sessions: HashMap<PlayerId, EditorSession>,
}

impl EditorSessions {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
        }
    }

    /// Open an editor for `player`. A previous session of the same player is
    /// closed first and its drafts are discarded.
    pub fn open(
        &mut self,
        player: PlayerId,
        shopkeeper_id: u32,
        registry: &ShopRegistry,
        settings: &SettingsStore,
    ) -> Result<&mut EditorSession, EditorError> {
        if let Some(previous) = self.sessions.remove(&player) {
            info!(
                "Discarding open editor of player {} for shopkeeper {}",
                player,
                previous.shopkeeper_id()
            );
        }

        let shopkeeper = registry
            .get(shopkeeper_id)
            .ok_or(ShopError::ShopkeeperInvalidated { id: shopkeeper_id })?;
        let session = EditorSession::new(player, shopkeeper, settings)?;
        info!("Player {} opened the editor of shopkeeper {}", player, shopkeeper_id);
        Ok(self.sessions.entry(player).or_insert(session))
    }

    pub fn get(&self, player: &PlayerId) -> Option<&EditorSession> {
        self.sessions.get(player)
    }

    pub fn get_mut(&mut self, player: &PlayerId) -> Option<&mut EditorSession> {
        self.sessions.get_mut(player)
    }

    fn session_mut(&mut self, player: &PlayerId) -> Result<&mut EditorSession, EditorError> {
        self.sessions
            .get_mut(player)
            .ok_or(EditorError::SessionClosed { player: *player })
    }

    pub fn set_page(&mut self, player: &PlayerId, page: usize) -> Result<bool, EditorError> {
        self.session_mut(player)?.set_page(page)
    }

    pub fn mutate_draft(&mut self, player: &PlayerId, slot: usize, draft: TradingRecipeDraft) -> Result<(), EditorError> {
        self.session_mut(player)?.mutate_draft(slot, draft)
    }

    /// Close the player's session, committing its drafts if `commit` is set.
    /// The session leaves the index whatever the outcome.
    pub fn request_close(
        &mut self,
        player: &PlayerId,
        commit: bool,
        registry: &mut ShopRegistry,
        settings: &SettingsStore,
        on_rejected: impl FnMut(RejectedDraft),
    ) -> Result<CloseOutcome, EditorError> {
        let mut session = self
            .sessions
            .remove(player)
            .ok_or(EditorError::SessionClosed { player: *player })?;
        session.request_close(commit, registry, settings, on_rejected)
    }

    /// Close every session with commit before a final save. Sessions
    /// whose commit fails are still closed. Returns the number of commits.
    pub fn close_all(
        &mut self,
        registry: &mut ShopRegistry,
        settings: &SettingsStore,
        mut on_rejected: impl FnMut(RejectedDraft),
    ) -> usize {
        let mut committed = 0;
        for (player, mut session) in self.sessions.drain() {
            match session.request_close(true, registry, settings, &mut on_rejected) {
                Ok(CloseOutcome::Committed { .. }) => committed += 1,
                Ok(CloseOutcome::Discarded) => {}
                Err(e) => warn!("Could not commit the editor of player {}: {}", player, e),
            }
        }
        committed
    }

    /// Close every session editing `shopkeeper_id` without committing
    pub fn close_all_for(&mut self, shopkeeper_id: u32) -> usize {
        let before = self.sessions.len();
        self.sessions
            .retain(|_, session| session.shopkeeper_id() != shopkeeper_id);
        before - self.sessions.len()
    }

    /// Press the button in `slot` of the player's editor
    pub fn click(
        &mut self,
        player: &PlayerId,
        slot: usize,
        registry: &mut ShopRegistry,
        settings: &SettingsStore,
        on_rejected: impl FnMut(RejectedDraft),
    ) -> Result<EditorAction, EditorError> {
        let session = self.session_mut(player)?;
        let shopkeeper_id = session.shopkeeper_id();

        match session.press(slot)? {
            ButtonCommand::None => Ok(EditorAction::None),
            ButtonCommand::PreviousPage => {
                let target = session.page().and_then(|page| page.checked_sub(1));
                turn_page(session, target)
            }
            ButtonCommand::NextPage => {
                let target = session.page().map(|page| page + 1);
                turn_page(session, target)
            }
            ButtonCommand::StartNaming => {
                self.request_close(player, true, registry, settings, on_rejected)?;
                Ok(EditorAction::StartNaming {
                    shopkeeper: shopkeeper_id,
                })
            }
            ButtonCommand::OpenContainer => {
                self.request_close(player, true, registry, settings, on_rejected)?;
                Ok(EditorAction::OpenContainer {
                    shopkeeper: shopkeeper_id,
                })
            }
            ButtonCommand::DeleteShopkeeper => {
                let deleted = registry.delete_shopkeeper(shopkeeper_id)?;
                self.close_all_for(shopkeeper_id);
                let return_creation_item =
                    deleted.is_player_shop() && settings.settings().deleting_player_shop_returns_creation_item;
                Ok(EditorAction::DeleteShopkeeper {
                    shopkeeper: shopkeeper_id,
                    return_creation_item,
                })
            }
            ButtonCommand::CycleObjectVariant => {
                let shopkeeper = registry
                    .get_mut(shopkeeper_id)
                    .ok_or(ShopError::ShopkeeperInvalidated { id: shopkeeper_id })?;
                let variant = shopkeeper.object_mut()?.cycle_variant();
                session.set_object(shopkeeper);
                Ok(variant.map_or(EditorAction::None, |variant| EditorAction::ObjectVariantChanged { variant }))
            }
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

fn turn_page(session: &mut EditorSession, target: Option<usize>) -> Result<EditorAction, EditorError> {
    let Some(page) = target else {
        return Ok(EditorAction::None);
    };
    if session.set_page(page)? {
        Ok(EditorAction::PageChanged { page })
    } else {
        Ok(EditorAction::None)
    }
}

impl Default for EditorSessions {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemStack;
    use crate::shop::{BlockLocation, ShopCreationData, ShopObjectKind};

    #[test]
    fn test_open_replaces_previous_session() {
        let settings = SettingsStore::new();
        let mut registry = ShopRegistry::with_default_types();
        let allow = |_: &PlayerId, _: &str| true;
        let data = ShopCreationData::new(ShopObjectKind::Sign, BlockLocation::new("world", 0, 64, 0));
        let first = registry.create_shopkeeper("admin", &data, &settings, &allow).unwrap().id();
        let second = registry.create_shopkeeper("admin", &data, &settings, &allow).unwrap().id();

        let mut sessions = EditorSessions::new();
        let player = PlayerId::new_v4();
        sessions.open(player, first, &registry, &settings).unwrap().set_page(1).unwrap();
        sessions.open(player, second, &registry, &settings).unwrap();

        assert_eq!(sessions.len(), 1);
        let session = sessions.get(&player).unwrap();
        assert_eq!(session.shopkeeper_id(), second);
        assert_eq!(session.page(), Some(0));

        assert!(matches!(
            sessions.open(player, 99, &registry, &settings),
            Err(EditorError::Shop(ShopError::ShopkeeperInvalidated { id: 99 }))
        ));
        assert!(sessions.is_empty());
    }

    #[test]
    fn test_close_all_commits_open_editors() {
        let settings = SettingsStore::new();
        let mut registry = ShopRegistry::with_default_types();
        let allow = |_: &PlayerId, _: &str| true;
        let data = ShopCreationData::new(ShopObjectKind::Sign, BlockLocation::new("world", 0, 64, 0));
        let kept = registry.create_shopkeeper("admin", &data, &settings, &allow).unwrap().id();
        let deleted = registry.create_shopkeeper("admin", &data, &settings, &allow).unwrap().id();

        let mut sessions = EditorSessions::new();
        let (alice, bob) = (PlayerId::new_v4(), PlayerId::new_v4());
        sessions.open(alice, kept, &registry, &settings).unwrap();
        let bread = TradingRecipeDraft::new(ItemStack::of("BREAD", 2), ItemStack::of("WHEAT", 5), None);
        sessions.mutate_draft(&alice, 0, bread).unwrap();
        let empty_result = TradingRecipeDraft::new(ItemStack::of("BREAD", 0), ItemStack::of("WHEAT", 1), None);
        sessions.mutate_draft(&alice, 1, empty_result).unwrap();
        sessions.open(bob, deleted, &registry, &settings).unwrap();
        registry.delete_shopkeeper(deleted).unwrap();

        let mut rejected = 0;
        assert_eq!(sessions.close_all(&mut registry, &settings, |_| rejected += 1), 1);
        assert_eq!(rejected, 1);
        assert!(sessions.is_empty());
        assert_eq!(registry.get(kept).unwrap().recipes().len(), 1);
    }

    #[test]
    fn test_unknown_player_has_no_session() {
        let mut sessions = EditorSessions::default();
        let player = PlayerId::new_v4();
        assert_eq!(sessions.set_page(&player, 1), Err(EditorError::SessionClosed { player }));
        assert_eq!(sessions.close_all_for(1), 0);
    }
}
