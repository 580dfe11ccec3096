//! Editor Session
//!
//! Per-player staging area for a shopkeeper's trades. Drafts are laid out
//! page-major; only the visible page is addressed by slot. Closing with
//! commit validates every draft and replaces the shopkeeper's recipes in one
//! assignment.

use tracing::{debug, info, warn};

use super::button::{
    BUTTON_BAR_SIZE, Button, ButtonCommand, ButtonContext, ButtonDisplay, EditedShop, editor_buttons,
    layout_buttons,
};
use crate::economy::{RecipeRejection, TradingRecipe, TradingRecipeDraft};
use crate::error::{EditorError, ShopError};
use crate::messages::{Message, keys};
use crate::permissions::PlayerId;
use crate::settings::{DerivedSettings, SettingsStore};
use crate::shop::{ShopRegistry, Shopkeeper, validate_for_shop};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Open { page: usize },
    Closing,
    Closed,
}

/// A staged draft that failed validation on commit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RejectedDraft {
    pub page: usize,
    pub slot: usize,
    pub reason: RecipeRejection,
}

impl RejectedDraft {
    pub fn message(&self) -> Message {
        Message::new(keys::INVALID_TRADE)
            .arg("page", self.page + 1)
            .arg("slot", self.slot + 1)
            .arg("reason", self.reason)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    Discarded,
    Committed { recipes: usize, rejected: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditorAction {
    None,
    PageChanged { page: usize },
    /// The editor was closed; the player should now type a new name
    StartNaming { shopkeeper: u32 },
    /// The editor was closed; the host opens the shop's container
    OpenContainer { shopkeeper: u32 },
    /// The shopkeeper was deleted; the host removes its object
    DeleteShopkeeper { shopkeeper: u32, return_creation_item: bool },
    ObjectVariantChanged { variant: &'static str },
}

pub struct EditorSession {
    player: PlayerId,
    shop: EditedShop,
    state: SessionState,
    capacity: usize,
    max_pages: usize,
    drafts: Vec<TradingRecipeDraft>,
    /// Recipes beyond the navigable pages, re-appended on commit
    overflow: Vec<TradingRecipe>,
    filled_pages: usize,
    buttons: Vec<Button>,
    layout: Vec<Option<usize>>,
}

impl EditorSession {
    /// Stage the shopkeeper's current recipes
    pub fn new(player: PlayerId, shopkeeper: &Shopkeeper, settings: &SettingsStore) -> Result<Self, EditorError> {
        if !shopkeeper.is_valid() {
            return Err(ShopError::ShopkeeperInvalidated { id: shopkeeper.id() }.into());
        }

        let config = settings.settings();
        let capacity = config.editor_trades_per_page.clamp(1, 8) as usize;
        let max_pages = config.max_trades_pages.clamp(1, 10) as usize;
        let total = capacity * max_pages;

        let recipes = shopkeeper.recipes();
        let mut drafts: Vec<TradingRecipeDraft> = recipes.iter().take(total).map(TradingRecipeDraft::from).collect();
        drafts.resize(total, TradingRecipeDraft::empty());
        let overflow: Vec<TradingRecipe> = recipes.iter().skip(total).cloned().collect();
        if !overflow.is_empty() {
            warn!(
                "Shopkeeper {} has {} trades beyond the last editor page; they are kept but not editable",
                shopkeeper.id(),
                overflow.len()
            );
        }

        let shop = EditedShop::capture(shopkeeper, config);
        let buttons = editor_buttons(&shop);
        let mut session = Self {
            player,
            shop,
            state: SessionState::Open { page: 0 },
            capacity,
            max_pages,
            drafts,
            overflow,
            filled_pages: recipes.len().div_ceil(capacity).min(max_pages),
            buttons,
            layout: Vec::new(),
        };
        session.rebuild_layout();
        Ok(session)
    }

    pub fn player(&self) -> PlayerId {
        self.player
    }

    pub fn shopkeeper_id(&self) -> u32 {
        self.shop.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, SessionState::Open { .. })
    }

    /// Current page, or `None` once closing
    pub fn page(&self) -> Option<usize> {
        match self.state {
            SessionState::Open { page } => Some(page),
            _ => None,
        }
    }

    pub fn max_pages(&self) -> usize {
        self.max_pages
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Pages that held recipes when the session opened
    pub fn filled_pages(&self) -> usize {
        self.filled_pages
    }

    pub fn overflow(&self) -> &[TradingRecipe] {
        &self.overflow
    }

    /// All staged drafts, page-major
    pub fn drafts(&self) -> &[TradingRecipeDraft] {
        &self.drafts
    }

    /// Drafts of the visible page
    pub fn visible_drafts(&self) -> &[TradingRecipeDraft] {
        let page = self.page().unwrap_or(0);
        &self.drafts[page * self.capacity..(page + 1) * self.capacity]
    }

    fn open_page(&self) -> Result<usize, EditorError> {
        self.page().ok_or(EditorError::SessionClosed { player: self.player })
    }

    fn rebuild_layout(&mut self) {
        let Some(page) = self.page() else {
            return;
        };
        let ctx = ButtonContext {
            shop: &self.shop,
            page,
            max_pages: self.max_pages,
        };
        self.layout = layout_buttons(&self.buttons, &ctx);
    }

    /// Switch the visible page. Out of range or current pages are ignored.
    /// Returns whether the page changed.
    pub fn set_page(&mut self, page: usize) -> Result<bool, EditorError> {
        let current = self.open_page()?;
        if page >= self.max_pages || page == current {
            return Ok(false);
        }
        self.state = SessionState::Open { page };
        self.rebuild_layout();
        debug!("Editor of player {} switched to page {}", self.player, page + 1);
        Ok(true)
    }

    /// Replace the draft in `slot` of the visible page
    pub fn mutate_draft(&mut self, slot: usize, draft: TradingRecipeDraft) -> Result<(), EditorError> {
        let page = self.open_page()?;
        if slot >= self.capacity {
            return Err(EditorError::InvalidSlot {
                slot,
                capacity: self.capacity,
            });
        }
        self.drafts[page * self.capacity + slot] = draft;
        Ok(())
    }

    /// Laid out button bar of the visible page
    pub fn render_buttons(&self, derived: &DerivedSettings) -> Vec<Option<ButtonDisplay>> {
        let Some(page) = self.page() else {
            return Vec::new();
        };
        let ctx = ButtonContext {
            shop: &self.shop,
            page,
            max_pages: self.max_pages,
        };
        self.layout
            .iter()
            .map(|slot| slot.and_then(|index| (self.buttons[index].icon)(&ctx, derived)))
            .collect()
    }

    pub fn button_at(&self, slot: usize) -> Option<&Button> {
        self.layout.get(slot).copied().flatten().map(|index| &self.buttons[index])
    }

    /// Run the handler of the button in `slot`. Empty slots do nothing.
    pub fn press(&mut self, slot: usize) -> Result<ButtonCommand, EditorError> {
        let page = self.open_page()?;
        if slot >= BUTTON_BAR_SIZE {
            return Err(EditorError::InvalidSlot {
                slot,
                capacity: BUTTON_BAR_SIZE,
            });
        }
        let Some(button) = self.button_at(slot) else {
            return Ok(ButtonCommand::None);
        };
        let ctx = ButtonContext {
            shop: &self.shop,
            page,
            max_pages: self.max_pages,
        };
        Ok((button.on_click)(&ctx))
    }

    pub(crate) fn set_object(&mut self, shopkeeper: &Shopkeeper) {
        self.shop.object = shopkeeper.object().clone();
    }

    /// Enter `Closing`, optionally commit, and end `Closed`. The session is
    /// closed even if the commit fails.
    pub fn request_close(
        &mut self,
        commit: bool,
        registry: &mut ShopRegistry,
        settings: &SettingsStore,
        mut on_rejected: impl FnMut(RejectedDraft),
    ) -> Result<CloseOutcome, EditorError> {
        self.open_page()?;
        self.state = SessionState::Closing;
        let result = if commit {
            self.commit(registry, settings, &mut on_rejected)
        } else {
            Ok(CloseOutcome::Discarded)
        };
        self.state = SessionState::Closed;
        info!(
            "Closed editor of player {} for shopkeeper {} ({:?})",
            self.player, self.shop.id, result
        );
        result
    }

    fn commit(
        &mut self,
        registry: &mut ShopRegistry,
        settings: &SettingsStore,
        on_rejected: &mut impl FnMut(RejectedDraft),
    ) -> Result<CloseOutcome, EditorError> {
        let id = self.shop.id;
        let shopkeeper = registry
            .get_mut(id)
            .filter(|shopkeeper| shopkeeper.is_valid())
            .ok_or(ShopError::ShopkeeperInvalidated { id })?;

        let mut recipes = Vec::with_capacity(self.drafts.len() + self.overflow.len());
        let mut rejected = 0;
        for (index, draft) in self.drafts.iter().enumerate() {
            if draft.is_empty() {
                continue;
            }
            match validate_for_shop(self.shop.kind, draft, settings.currency()) {
                Ok(recipe) => recipes.push(recipe),
                Err(reason) => {
                    let rejection = RejectedDraft {
                        page: index / self.capacity,
                        slot: index % self.capacity,
                        reason,
                    };
                    if settings.is_debugging(None) {
                        debug!("Shopkeeper {}: rejected draft {:?}", id, rejection);
                    }
                    rejected += 1;
                    on_rejected(rejection);
                }
            }
        }
        recipes.extend(self.overflow.iter().cloned());

        let count = recipes.len();
        shopkeeper.set_recipes(recipes)?;
        Ok(CloseOutcome::Committed {
            recipes: count,
            rejected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemStack;
    use crate::shop::{BlockLocation, ShopCreationData, ShopObjectKind};

    fn setup(recipes: usize) -> (ShopRegistry, SettingsStore, u32) {
        let mut settings = SettingsStore::new();
        settings.update(|s| {
            s.editor_trades_per_page = 2;
            s.max_trades_pages = 2;
        });
        let mut registry = ShopRegistry::with_default_types();
        let data = ShopCreationData::new(ShopObjectKind::Sign, BlockLocation::new("world", 0, 64, 0));
        let allow = |_: &PlayerId, _: &str| true;
        let id = registry.create_shopkeeper("admin", &data, &settings, &allow).unwrap().id();
        let list = (1..=recipes as u32)
            .map(|n| TradingRecipe {
                result: ItemStack::of("BREAD", n),
                cost1: ItemStack::of("EMERALD", 1),
                cost2: None,
            })
            .collect();
        registry.get_mut(id).unwrap().set_recipes(list).unwrap();
        (registry, settings, id)
    }

    fn open(registry: &ShopRegistry, settings: &SettingsStore, id: u32) -> EditorSession {
        EditorSession::new(PlayerId::new_v4(), registry.get(id).unwrap(), settings).unwrap()
    }

    #[test]
    fn test_drafts_are_paged() {
        let (registry, settings, id) = setup(3);
        let session = open(&registry, &settings, id);
        assert_eq!(session.capacity(), 2);
        assert_eq!(session.drafts().len(), 4);
        assert_eq!(session.filled_pages(), 2);
        assert_eq!(session.visible_drafts()[1].result, Some(ItemStack::of("BREAD", 2)));
        assert!(session.drafts()[3].is_empty());
    }

    #[test]
    fn test_set_page_bounds() {
        let (registry, settings, id) = setup(0);
        let mut session = open(&registry, &settings, id);
        assert_eq!(session.filled_pages(), 0);
        assert_eq!(session.set_page(0), Ok(false));
        assert_eq!(session.set_page(2), Ok(false));
        assert_eq!(session.set_page(1), Ok(true));
        assert_eq!(session.page(), Some(1));
    }

    #[test]
    fn test_mutate_draft_slots() {
        let (mut registry, settings, id) = setup(0);
        let mut session = open(&registry, &settings, id);
        let draft = TradingRecipeDraft::new(ItemStack::of("APPLE", 1), ItemStack::of("EMERALD", 1), None);

        session.set_page(1).unwrap();
        session.mutate_draft(1, draft.clone()).unwrap();
        assert_eq!(session.drafts()[3], draft);
        assert_eq!(
            session.mutate_draft(2, draft.clone()),
            Err(EditorError::InvalidSlot { slot: 2, capacity: 2 })
        );

        session.request_close(false, &mut registry, &settings, |_| {}).unwrap();
        assert_eq!(session.state(), SessionState::Closed);
        assert!(matches!(
            session.mutate_draft(0, draft),
            Err(EditorError::SessionClosed { .. })
        ));
        assert!(registry.get(id).unwrap().recipes().is_empty());
    }

    #[test]
    fn test_commit_skips_rejected_drafts() {
        let (mut registry, settings, id) = setup(2);
        let mut session = open(&registry, &settings, id);
        session
            .mutate_draft(0, TradingRecipeDraft::new(ItemStack::of("BREAD", 0), ItemStack::of("EMERALD", 1), None))
            .unwrap();

        let mut rejected = Vec::new();
        let outcome = session
            .request_close(true, &mut registry, &settings, |r| rejected.push(r))
            .unwrap();

        assert_eq!(outcome, CloseOutcome::Committed { recipes: 1, rejected: 1 });
        assert_eq!(
            rejected,
            vec![RejectedDraft {
                page: 0,
                slot: 0,
                reason: RecipeRejection::EmptyResult
            }]
        );
        assert_eq!(rejected[0].message().get_arg("slot"), Some("1"));
        assert_eq!(registry.get(id).unwrap().recipes()[0].result, ItemStack::of("BREAD", 2));
    }

    #[test]
    fn test_overflow_is_kept() {
        let (mut registry, settings, id) = setup(6);
        let mut session = open(&registry, &settings, id);
        assert_eq!(session.overflow().len(), 2);
        assert_eq!(session.filled_pages(), 2);

        session.mutate_draft(0, TradingRecipeDraft::empty()).unwrap();
        session.request_close(true, &mut registry, &settings, |_| {}).unwrap();

        let results: Vec<u32> = registry.get(id).unwrap().recipes().iter().map(|r| r.result.amount).collect();
        assert_eq!(results, vec![2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_commit_on_deleted_shopkeeper() {
        let (mut registry, settings, id) = setup(1);
        let mut session = open(&registry, &settings, id);
        registry.delete_shopkeeper(id).unwrap();

        let result = session.request_close(true, &mut registry, &settings, |_| {});
        assert_eq!(result, Err(EditorError::Shop(ShopError::ShopkeeperInvalidated { id })));
        assert!(result.unwrap_err().is_lifecycle());
        assert_eq!(session.state(), SessionState::Closed);
        assert!(matches!(
            session.request_close(false, &mut registry, &settings, |_| {}),
            Err(EditorError::SessionClosed { .. })
        ));
    }

    #[test]
    fn test_press_navigates_buttons() {
        let (registry, settings, id) = setup(0);
        let mut session = open(&registry, &settings, id);
        assert_eq!(session.press(2), Ok(ButtonCommand::NextPage));
        assert_eq!(session.press(0), Ok(ButtonCommand::PreviousPage));
        assert_eq!(session.press(17), Ok(ButtonCommand::DeleteShopkeeper));
        assert_eq!(session.press(10), Ok(ButtonCommand::None));
        assert_eq!(
            session.press(BUTTON_BAR_SIZE),
            Err(EditorError::InvalidSlot {
                slot: BUTTON_BAR_SIZE,
                capacity: BUTTON_BAR_SIZE
            })
        );

        let icons = session.render_buttons(settings.derived());
        assert_eq!(icons.len(), BUTTON_BAR_SIZE);
        assert!(icons[0].is_some());
        assert!(icons[10].is_none());
    }
}
