//! Editor Buttons
//!
//! Buttons are plain records of function pointers: an icon provider, a click
//! handler, and an applicability predicate, plus a placement hint. A single
//! layout routine turns the registered buttons into the 18-slot button bar.

use tracing::warn;

use crate::item::ItemStack;
use crate::messages::{Message, keys};
use crate::settings::{ButtonIcon, DerivedSettings, Settings};
use crate::shop::{ShopKind, ShopObject, ShopObjectKind, Shopkeeper};

/// Two rows below the trade columns
pub const BUTTON_BAR_SIZE: usize = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonPlacement {
    /// Reserved slot in the bar
    Fixed(usize),
    /// Next free slot from the front
    Default,
    /// After all other buttons
    End,
}

/// What the session should do after a click
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonCommand {
    None,
    PreviousPage,
    NextPage,
    StartNaming,
    OpenContainer,
    DeleteShopkeeper,
    CycleObjectVariant,
}

/// The shop as seen by the editor buttons, captured when the session opens
#[derive(Debug, Clone, PartialEq)]
pub struct EditedShop {
    pub id: u32,
    pub kind: ShopKind,
    pub object: ShopObject,
    pub naming_via_item: bool,
    pub allow_renaming_player_npc: bool,
    pub container_option: bool,
}

impl EditedShop {
    pub fn capture(shopkeeper: &Shopkeeper, settings: &Settings) -> Self {
        Self {
            id: shopkeeper.id(),
            kind: shopkeeper.kind(),
            object: shopkeeper.object().clone(),
            naming_via_item: settings.naming_of_player_shops_via_item,
            allow_renaming_player_npc: settings.allow_renaming_of_player_npc_shops,
            container_option: settings.enable_container_option_on_player_shop,
        }
    }

    pub fn is_player_shop(&self) -> bool {
        self.kind.is_player_shop()
    }
}

pub struct ButtonContext<'a> {
    pub shop: &'a EditedShop,
    pub page: usize,
    pub max_pages: usize,
}

/// Rendered button content, resolved to text by the host
#[derive(Debug, Clone, PartialEq)]
pub struct ButtonDisplay {
    pub item: ItemStack,
    pub name: Message,
    pub lore: Message,
}

impl ButtonDisplay {
    fn from_icon(icon: &ButtonIcon, amount: u32) -> Self {
        Self {
            item: icon.stack(amount),
            name: Message::new(icon.name),
            lore: Message::new(icon.lore),
        }
    }
}

#[derive(Clone, Copy)]
pub struct Button {
    pub id: &'static str,
    pub placement: ButtonPlacement,
    pub icon: fn(&ButtonContext<'_>, &DerivedSettings) -> Option<ButtonDisplay>,
    pub on_click: fn(&ButtonContext<'_>) -> ButtonCommand,
    pub applies: fn(&ButtonContext<'_>) -> bool,
}

impl std::fmt::Debug for Button {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Button")
            .field("id", &self.id)
            .field("placement", &self.placement)
            .finish()
    }
}

fn always(_: &ButtonContext<'_>) -> bool {
    true
}

// ============================================================================
// Editor Buttons
// ============================================================================

fn page_number(ctx: &ButtonContext<'_>) -> u32 {
    (ctx.page + 1) as u32
}

fn with_page_args(display: ButtonDisplay, ctx: &ButtonContext<'_>) -> ButtonDisplay {
    ButtonDisplay {
        name: display.name.arg("page", ctx.page + 1).arg("max_page", ctx.max_pages),
        ..display
    }
}

const PREVIOUS_PAGE: Button = Button {
    id: "previous-page",
    placement: ButtonPlacement::Fixed(0),
    icon: |ctx, derived| {
        let amount = ctx.page.max(1) as u32;
        Some(with_page_args(ButtonDisplay::from_icon(&derived.previous_page_button, amount), ctx))
    },
    on_click: |_| ButtonCommand::PreviousPage,
    applies: always,
};

const TRADE_SETUP: Button = Button {
    id: "trade-setup",
    placement: ButtonPlacement::Fixed(1),
    icon: |ctx, derived| {
        let icon = &derived.trade_setup_button;
        Some(ButtonDisplay {
            item: icon.stack(page_number(ctx)),
            name: Message::new(keys::TRADE_SETUP_DESC_HEADER).arg("shop_type", ctx.shop.kind.display_name()),
            lore: Message::new(ctx.shop.kind.trade_setup_description())
                .arg("page", ctx.page + 1)
                .arg("max_page", ctx.max_pages),
        })
    },
    on_click: |_| ButtonCommand::None,
    applies: always,
};

const NEXT_PAGE: Button = Button {
    id: "next-page",
    placement: ButtonPlacement::Fixed(2),
    icon: |ctx, derived| {
        let amount = (ctx.page + 2).min(ctx.max_pages) as u32;
        Some(with_page_args(ButtonDisplay::from_icon(&derived.next_page_button, amount), ctx))
    },
    on_click: |_| ButtonCommand::NextPage,
    applies: always,
};

const RENAME: Button = Button {
    id: "rename",
    placement: ButtonPlacement::Default,
    icon: |_, derived| Some(ButtonDisplay::from_icon(&derived.name_button, 1)),
    on_click: |_| ButtonCommand::StartNaming,
    applies: |ctx| {
        let shop = ctx.shop;
        if !shop.is_player_shop() {
            return true;
        }
        if shop.naming_via_item {
            return false;
        }
        shop.object.kind != ShopObjectKind::Citizen || shop.allow_renaming_player_npc
    },
};

const CONTAINER: Button = Button {
    id: "container",
    placement: ButtonPlacement::Default,
    icon: |_, derived| Some(ButtonDisplay::from_icon(&derived.container_button, 1)),
    on_click: |_| ButtonCommand::OpenContainer,
    applies: |ctx| ctx.shop.is_player_shop() && ctx.shop.container_option,
};

const DELETE: Button = Button {
    id: "delete",
    placement: ButtonPlacement::End,
    icon: |_, derived| Some(ButtonDisplay::from_icon(&derived.delete_button, 1)),
    on_click: |_| ButtonCommand::DeleteShopkeeper,
    applies: always,
};

const OBJECT_VARIANT: Button = Button {
    id: "object-variant",
    placement: ButtonPlacement::Default,
    icon: |ctx, _| {
        let variant = ctx.shop.object.variant_name()?;
        Some(ButtonDisplay {
            item: ctx.shop.object.variant_icon()?,
            name: Message::new(keys::BUTTON_OBJECT_VARIANT).arg("variant", variant),
            lore: Message::new(keys::BUTTON_OBJECT_VARIANT_LORE),
        })
    },
    on_click: |_| ButtonCommand::CycleObjectVariant,
    applies: |ctx| !ctx.shop.object.kind.variants().is_empty(),
};

/// Buttons contributed by the shop object
pub fn object_buttons(kind: &ShopObjectKind) -> Vec<Button> {
    match kind {
        ShopObjectKind::Living(_) | ShopObjectKind::Sign => vec![OBJECT_VARIANT],
        ShopObjectKind::Citizen => Vec::new(),
    }
}

/// Editor buttons followed by the object's buttons, in registration order
pub fn editor_buttons(shop: &EditedShop) -> Vec<Button> {
    let mut buttons = vec![PREVIOUS_PAGE, TRADE_SETUP, NEXT_PAGE, RENAME, CONTAINER];
    buttons.extend(object_buttons(&shop.object.kind));
    buttons.push(DELETE);
    buttons
}

// ============================================================================
// Layout
// ============================================================================

/// Assigns applicable buttons to bar slots. Fixed buttons take their slot,
/// `Default` buttons fill free slots from the front, and `End` buttons take
/// the last free slots. Buttons that do not fit are dropped.
pub fn layout_buttons(buttons: &[Button], ctx: &ButtonContext<'_>) -> Vec<Option<usize>> {
    let mut slots: Vec<Option<usize>> = vec![None; BUTTON_BAR_SIZE];
    let mut front = Vec::new();
    let mut end = Vec::new();

    for (index, button) in buttons.iter().enumerate() {
        if !(button.applies)(ctx) {
            continue;
        }
        match button.placement {
            ButtonPlacement::Fixed(slot) if slot < BUTTON_BAR_SIZE && slots[slot].is_none() => {
                slots[slot] = Some(index);
            }
            ButtonPlacement::Fixed(slot) => {
                warn!("Editor button '{}' cannot take slot {}, dropping it", button.id, slot);
            }
            ButtonPlacement::Default => front.push(index),
            ButtonPlacement::End => end.push(index),
        }
    }

    let mut free: Vec<usize> = (0..BUTTON_BAR_SIZE).filter(|&slot| slots[slot].is_none()).collect();
    for index in front {
        if free.is_empty() {
            warn!("No room for editor button '{}', dropping it", buttons[index].id);
            continue;
        }
        let slot = free.remove(0);
        slots[slot] = Some(index);
    }

    let tail_start = free.len().saturating_sub(end.len());
    for (position, index) in end.into_iter().enumerate() {
        match free.get(tail_start + position) {
            Some(&slot) => slots[slot] = Some(index),
            None => warn!("No room for editor button '{}', dropping it", buttons[index].id),
        }
    }
    slots
}
