use kaminms_api::{
    BlockPos, ChatColor, ChatComponent, ChunkPos, ClickAction, CommandSpec, EntityKind, EntityRef, ItemStack,
    Location, PlayerRef, Release,
};
use serde_json::{json, Value};
use uuid::Uuid;

pub fn player() -> PlayerRef {
    PlayerRef::new(Uuid::from_u128(0x6b61_6d69_0000_0000_0000_0000_0000_0001), "Kami")
}

pub fn entity() -> EntityRef {
    EntityRef(42)
}

pub fn location() -> Location {
    Location {
        world: "world".to_string(),
        x: 10.5,
        y: 64.0,
        z: -3.5,
        yaw: 90.0,
        pitch: 0.0,
    }
}

pub fn block_pos() -> BlockPos {
    BlockPos { x: 1, y: 70, z: 1 }
}

pub fn chunk() -> ChunkPos {
    block_pos().chunk()
}

pub fn sword() -> ItemStack {
    ItemStack::new("DIAMOND_SWORD", 1)
}

/// A spawner item under the material name `release` uses.
pub fn spawner(release: Release) -> ItemStack {
    if release < Release::new(1, 13, 0) {
        ItemStack::new("MOB_SPAWNER", 1)
    } else {
        ItemStack::new("SPAWNER", 1)
    }
}

pub fn zombie() -> EntityKind {
    EntityKind("ZOMBIE".to_string())
}

pub fn command() -> CommandSpec {
    CommandSpec {
        name: "kami".to_string(),
        aliases: vec!["k".to_string()],
        description: "KamiCommon".to_string(),
        prefix: "kamicommon".to_string(),
    }
}

pub fn component() -> ChatComponent {
    ChatComponent::text("Hello ")
        .color(ChatColor::Gold)
        .push(
            ChatComponent::text("there")
                .on_click(ClickAction::RunCommand("/spawn".to_string()))
                .on_hover("Go to spawn"),
        )
}

/// An interact event as the host would hand it over.
pub fn interact_event() -> Value {
    json!({ "event": "PlayerInteractEvent", "player": "Kami" })
}
