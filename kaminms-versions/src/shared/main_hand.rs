use kaminms_api::{Fault, ItemStack, MainHand, PlayerRef};
use serde_json::Value;

use crate::internals::{arg, Internals};
use crate::symbols::Internal;

/// 1.8: one hand, no off hand slot.
#[derive(Debug)]
pub struct SingleHand {
    internals: Internals,
}

impl SingleHand {
    pub fn new(internals: Internals) -> Self {
        Self { internals }
    }
}

impl MainHand for SingleHand {
    fn item_in_main_hand(&self, player: &PlayerRef) -> Result<Option<ItemStack>, Fault> {
        self.internals.call(Internal::MainHandItem, vec![arg(player)?])
    }

    fn set_item_in_main_hand(&self, player: &PlayerRef, item: Option<&ItemStack>) -> Result<(), Fault> {
        self.internals
            .run(Internal::SetMainHandItem, vec![arg(player)?, arg(&item)?])
    }

    fn item_in_off_hand(&self, _player: &PlayerRef) -> Result<Option<ItemStack>, Fault> {
        Ok(None)
    }

    fn set_item_in_off_hand(&self, _player: &PlayerRef, _item: Option<&ItemStack>) -> Result<(), Fault> {
        Err(Fault::Unsupported {
            operation: "set_item_in_off_hand",
            reason: "releases before 1.9 have no off hand",
        })
    }

    fn is_off_hand_interaction(&self, _event: &Value) -> Result<bool, Fault> {
        Ok(false)
    }
}

/// 1.9+: main and off hand.
#[derive(Debug)]
pub struct DualHand {
    internals: Internals,
}

impl DualHand {
    pub fn new(internals: Internals) -> Self {
        Self { internals }
    }
}

impl MainHand for DualHand {
    fn item_in_main_hand(&self, player: &PlayerRef) -> Result<Option<ItemStack>, Fault> {
        self.internals.call(Internal::MainHandItem, vec![arg(player)?])
    }

    fn set_item_in_main_hand(&self, player: &PlayerRef, item: Option<&ItemStack>) -> Result<(), Fault> {
        self.internals
            .run(Internal::SetMainHandItem, vec![arg(player)?, arg(&item)?])
    }

    fn item_in_off_hand(&self, player: &PlayerRef) -> Result<Option<ItemStack>, Fault> {
        self.internals.call(Internal::OffHandItem, vec![arg(player)?])
    }

    fn set_item_in_off_hand(&self, player: &PlayerRef, item: Option<&ItemStack>) -> Result<(), Fault> {
        self.internals
            .run(Internal::SetOffHandItem, vec![arg(player)?, arg(&item)?])
    }

    fn is_off_hand_interaction(&self, event: &Value) -> Result<bool, Fault> {
        let hand: String = self
            .internals
            .call(Internal::InteractionHand, vec![event.clone()])?;
        Ok(hand == "OFF_HAND")
    }
}
