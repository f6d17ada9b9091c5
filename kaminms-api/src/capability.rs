//! Capability contracts.
//!
//! Each trait is one capability group; each [`Capability`] is one operation
//! within a group. Groups are additive-only: a changed signature gets a new
//! operation name, never a new meaning on an old one.

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::error::Fault;
use crate::host::HostInternals;
use crate::types::{
    BlockPos, ChatColor, ChatComponent, ChunkPos, CommandSpec, Enchantment, EntityKind,
    EntityRef, ItemStack, Location, NmsPacket, PlaceType, PlayerRef, Rgb,
};
use crate::version::{Release, ServerVersion};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CapabilityGroup {
    ChatColor,
    EnchantId,
    MainHand,
    Teleport,
    ItemEditor,
    Block,
    Entity,
    Packet,
    CommandMap,
    Messaging,
    World,
    ItemText,
}

impl CapabilityGroup {
    pub const ALL: [CapabilityGroup; 12] = [
        CapabilityGroup::ChatColor,
        CapabilityGroup::EnchantId,
        CapabilityGroup::MainHand,
        CapabilityGroup::Teleport,
        CapabilityGroup::ItemEditor,
        CapabilityGroup::Block,
        CapabilityGroup::Entity,
        CapabilityGroup::Packet,
        CapabilityGroup::CommandMap,
        CapabilityGroup::Messaging,
        CapabilityGroup::World,
        CapabilityGroup::ItemText,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CapabilityGroup::ChatColor => "chat_color",
            CapabilityGroup::EnchantId => "enchant_id",
            CapabilityGroup::MainHand => "main_hand",
            CapabilityGroup::Teleport => "teleport",
            CapabilityGroup::ItemEditor => "item_editor",
            CapabilityGroup::Block => "block",
            CapabilityGroup::Entity => "entity",
            CapabilityGroup::Packet => "packet",
            CapabilityGroup::CommandMap => "command_map",
            CapabilityGroup::Messaging => "messaging",
            CapabilityGroup::World => "world",
            CapabilityGroup::ItemText => "item_text",
        }
    }
}

impl fmt::Display for CapabilityGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One abstract operation every version implementation exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    ColorOf,
    Namespaced,
    ItemInMainHand,
    SetItemInMainHand,
    ItemInOffHand,
    SetItemInOffHand,
    IsOffHandInteraction,
    TeleportWithoutEvent,
    SetUnbreakable,
    IsUnbreakable,
    SetDamage,
    Damage,
    SetNbtTag,
    NbtTag,
    TranslationKey,
    SetBlockFast,
    EntityHeight,
    EntityWidth,
    SetPersists,
    SetFromSpawner,
    SetMobAi,
    SpawnerType,
    SetSpawnerType,
    DestroyEntities,
    EntityStatus,
    SendPacket,
    RegisterCommand,
    UnregisterCommand,
    KnownCommands,
    SendComponent,
    MinHeight,
    MaxHeight,
    RefreshBlock,
    SetSectionBlock,
    IsSectionEmpty,
    SendChunkUpdate,
    ItemComponents,
    NbtTooltip,
}

impl Capability {
    pub const ALL: [Capability; 38] = [
        Capability::ColorOf,
        Capability::Namespaced,
        Capability::ItemInMainHand,
        Capability::SetItemInMainHand,
        Capability::ItemInOffHand,
        Capability::SetItemInOffHand,
        Capability::IsOffHandInteraction,
        Capability::TeleportWithoutEvent,
        Capability::SetUnbreakable,
        Capability::IsUnbreakable,
        Capability::SetDamage,
        Capability::Damage,
        Capability::SetNbtTag,
        Capability::NbtTag,
        Capability::TranslationKey,
        Capability::SetBlockFast,
        Capability::EntityHeight,
        Capability::EntityWidth,
        Capability::SetPersists,
        Capability::SetFromSpawner,
        Capability::SetMobAi,
        Capability::SpawnerType,
        Capability::SetSpawnerType,
        Capability::DestroyEntities,
        Capability::EntityStatus,
        Capability::SendPacket,
        Capability::RegisterCommand,
        Capability::UnregisterCommand,
        Capability::KnownCommands,
        Capability::SendComponent,
        Capability::MinHeight,
        Capability::MaxHeight,
        Capability::RefreshBlock,
        Capability::SetSectionBlock,
        Capability::IsSectionEmpty,
        Capability::SendChunkUpdate,
        Capability::ItemComponents,
        Capability::NbtTooltip,
    ];

    /// Stable dotted name, used for diagnostics and the dynamic invoke path.
    pub fn name(&self) -> &'static str {
        self.descriptor().0
    }

    pub fn signature(&self) -> &'static str {
        self.descriptor().1
    }

    pub fn group(&self) -> CapabilityGroup {
        self.descriptor().2
    }

    pub fn from_name(name: &str) -> Option<Capability> {
        Capability::ALL.iter().copied().find(|c| c.name() == name)
    }

    fn descriptor(&self) -> (&'static str, &'static str, CapabilityGroup) {
        use CapabilityGroup as G;
        match self {
            Capability::ColorOf => ("chat_color.color_of", "(ChatColor) -> Option<Rgb>", G::ChatColor),
            Capability::Namespaced => ("enchant_id.namespaced", "(Enchantment) -> String", G::EnchantId),
            Capability::ItemInMainHand => ("main_hand.item", "(PlayerRef) -> Option<ItemStack>", G::MainHand),
            Capability::SetItemInMainHand => ("main_hand.set_item", "(PlayerRef, Option<ItemStack>) -> ()", G::MainHand),
            Capability::ItemInOffHand => ("main_hand.off_hand_item", "(PlayerRef) -> Option<ItemStack>", G::MainHand),
            Capability::SetItemInOffHand => ("main_hand.set_off_hand_item", "(PlayerRef, Option<ItemStack>) -> ()", G::MainHand),
            Capability::IsOffHandInteraction => ("main_hand.is_off_hand_interaction", "(Value) -> bool", G::MainHand),
            Capability::TeleportWithoutEvent => ("teleport.without_event", "(PlayerRef, Location) -> ()", G::Teleport),
            Capability::SetUnbreakable => ("item_editor.set_unbreakable", "(ItemStack, bool) -> ItemStack", G::ItemEditor),
            Capability::IsUnbreakable => ("item_editor.is_unbreakable", "(ItemStack) -> bool", G::ItemEditor),
            Capability::SetDamage => ("item_editor.set_damage", "(ItemStack, i32) -> ItemStack", G::ItemEditor),
            Capability::Damage => ("item_editor.damage", "(ItemStack) -> i32", G::ItemEditor),
            Capability::SetNbtTag => ("item_editor.set_nbt_tag", "(ItemStack, String, Value) -> ItemStack", G::ItemEditor),
            Capability::NbtTag => ("item_editor.nbt_tag", "(ItemStack, String) -> Option<Value>", G::ItemEditor),
            Capability::TranslationKey => ("item_editor.translation_key", "(ItemStack) -> String", G::ItemEditor),
            Capability::SetBlockFast => ("block.set_fast", "(String, BlockPos, String, PlaceType) -> ()", G::Block),
            Capability::EntityHeight => ("entity.height", "(EntityRef) -> f64", G::Entity),
            Capability::EntityWidth => ("entity.width", "(EntityRef) -> f64", G::Entity),
            Capability::SetPersists => ("entity.set_persists", "(EntityRef, bool) -> ()", G::Entity),
            Capability::SetFromSpawner => ("entity.set_from_spawner", "(EntityRef, bool) -> ()", G::Entity),
            Capability::SetMobAi => ("entity.set_mob_ai", "(EntityRef, bool) -> ()", G::Entity),
            Capability::SpawnerType => ("entity.spawner_type", "(ItemStack) -> Option<EntityKind>", G::Entity),
            Capability::SetSpawnerType => ("entity.set_spawner_type", "(ItemStack, EntityKind) -> ItemStack", G::Entity),
            Capability::DestroyEntities => ("packet.destroy_entities", "(Vec<EntityRef>) -> NmsPacket", G::Packet),
            Capability::EntityStatus => ("packet.entity_status", "(EntityRef, i8) -> NmsPacket", G::Packet),
            Capability::SendPacket => ("packet.send", "(PlayerRef, NmsPacket) -> ()", G::Packet),
            Capability::RegisterCommand => ("command_map.register", "(CommandSpec) -> bool", G::CommandMap),
            Capability::UnregisterCommand => ("command_map.unregister", "(String) -> bool", G::CommandMap),
            Capability::KnownCommands => ("command_map.known", "() -> Vec<String>", G::CommandMap),
            Capability::SendComponent => ("messaging.send_component", "(PlayerRef, ChatComponent) -> ()", G::Messaging),
            Capability::MinHeight => ("world.min_height", "(String) -> i32", G::World),
            Capability::MaxHeight => ("world.max_height", "(String) -> i32", G::World),
            Capability::RefreshBlock => ("world.refresh_block", "(PlayerRef, String, BlockPos) -> ()", G::World),
            Capability::SetSectionBlock => ("world.set_section_block", "(String, BlockPos, String) -> ()", G::World),
            Capability::IsSectionEmpty => ("world.is_section_empty", "(String, BlockPos) -> bool", G::World),
            Capability::SendChunkUpdate => ("world.send_chunk_update", "(PlayerRef, String, ChunkPos) -> ()", G::World),
            Capability::ItemComponents => ("item_text.components", "(ItemStack) -> Vec<ChatComponent>", G::ItemText),
            Capability::NbtTooltip => ("item_text.nbt_tooltip", "(ItemStack) -> String", G::ItemText),
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub trait ChatColors: Send + Sync {
    /// `None` for format codes, which carry no color.
    fn color_of(&self, color: ChatColor) -> Result<Option<Rgb>, Fault>;
}

pub trait EnchantIds: Send + Sync {
    /// Bare enchantment key such as `sharpness`, without the `minecraft:` namespace.
    fn namespaced(&self, enchantment: &Enchantment) -> Result<String, Fault>;
}

pub trait MainHand: Send + Sync {
    fn item_in_main_hand(&self, player: &PlayerRef) -> Result<Option<ItemStack>, Fault>;
    fn set_item_in_main_hand(&self, player: &PlayerRef, item: Option<&ItemStack>) -> Result<(), Fault>;
    fn item_in_off_hand(&self, player: &PlayerRef) -> Result<Option<ItemStack>, Fault>;
    /// Fails with [`Fault::Unsupported`] on releases without an off hand.
    fn set_item_in_off_hand(&self, player: &PlayerRef, item: Option<&ItemStack>) -> Result<(), Fault>;
    /// `event` is the host handle of an entity interaction event.
    fn is_off_hand_interaction(&self, event: &Value) -> Result<bool, Fault>;
}

pub trait Teleporter: Send + Sync {
    /// Moves the player without firing a teleport event.
    fn teleport_without_event(&self, player: &PlayerRef, location: &Location) -> Result<(), Fault>;
}

pub trait ItemEditor: Send + Sync {
    fn set_unbreakable(&self, item: ItemStack, unbreakable: bool) -> Result<ItemStack, Fault>;
    fn is_unbreakable(&self, item: &ItemStack) -> Result<bool, Fault>;
    fn set_damage(&self, item: ItemStack, damage: i32) -> Result<ItemStack, Fault>;
    fn damage(&self, item: &ItemStack) -> Result<i32, Fault>;
    fn set_nbt_tag(&self, item: ItemStack, key: &str, value: Value) -> Result<ItemStack, Fault>;
    fn nbt_tag(&self, item: &ItemStack, key: &str) -> Result<Option<Value>, Fault>;
    fn translation_key(&self, item: &ItemStack) -> Result<String, Fault>;
}

pub trait BlockUtil: Send + Sync {
    fn set_block_fast(
        &self,
        world: &str,
        pos: BlockPos,
        material: &str,
        place: PlaceType,
    ) -> Result<(), Fault>;
}

pub trait EntityMethods: Send + Sync {
    fn height(&self, entity: EntityRef) -> Result<f64, Fault>;
    fn width(&self, entity: EntityRef) -> Result<f64, Fault>;
    fn set_persists(&self, entity: EntityRef, value: bool) -> Result<(), Fault>;
    fn set_from_spawner(&self, entity: EntityRef, value: bool) -> Result<(), Fault>;
    fn set_mob_ai(&self, entity: EntityRef, value: bool) -> Result<(), Fault>;
    fn spawner_type(&self, item: &ItemStack) -> Result<Option<EntityKind>, Fault>;
    fn set_spawner_type(&self, item: ItemStack, kind: &EntityKind) -> Result<ItemStack, Fault>;
}

/// Packets must be built through this trait before [`PacketHandler::send_packet`].
pub trait PacketHandler: Send + Sync {
    fn destroy_entities(&self, ids: &[EntityRef]) -> Result<NmsPacket, Fault>;
    fn entity_status(&self, entity: EntityRef, status: i8) -> Result<NmsPacket, Fault>;
    fn send_packet(&self, player: &PlayerRef, packet: &NmsPacket) -> Result<(), Fault>;
}

pub trait CommandMap: Send + Sync {
    /// `false` when a command with that name is already known.
    fn register_command(&self, command: &CommandSpec) -> Result<bool, Fault>;
    fn unregister_command(&self, name: &str) -> Result<bool, Fault>;
    fn known_commands(&self) -> Result<Vec<String>, Fault>;
}

pub trait Messaging: Send + Sync {
    fn send_component(&self, player: &PlayerRef, component: &ChatComponent) -> Result<(), Fault>;
}

/// World bounds and chunk-section access below the Bukkit block API.
///
/// `world` is the Bukkit world name. Section writes skip lighting and client
/// updates; follow them with [`WorldAccess::send_chunk_update`] or
/// [`WorldAccess::refresh_block_at`].
pub trait WorldAccess: Send + Sync {
    /// Lowest buildable Y.
    fn min_height(&self, world: &str) -> Result<i32, Fault>;
    /// One above the highest buildable Y.
    fn max_height(&self, world: &str) -> Result<i32, Fault>;
    /// Resends the block at `pos` to one player.
    fn refresh_block_at(&self, player: &PlayerRef, world: &str, pos: BlockPos) -> Result<(), Fault>;
    fn set_section_block(&self, world: &str, pos: BlockPos, material: &str) -> Result<(), Fault>;
    /// Whether the section holding `pos` contains only air.
    fn is_section_empty(&self, world: &str, pos: BlockPos) -> Result<bool, Fault>;
    fn send_chunk_update(&self, player: &PlayerRef, world: &str, chunk: ChunkPos) -> Result<(), Fault>;
}

/// Item hover text for releases before 1.17.
///
/// Later releases fail with [`Fault::Unsupported`]; their hover events carry
/// item data instead of tooltip text.
pub trait ItemText: Send + Sync {
    /// Components for a `show_item` hover event.
    fn components(&self, item: &ItemStack) -> Result<Vec<ChatComponent>, Fault>;
    /// The item saved as SNBT.
    fn nbt_tooltip(&self, item: &ItemStack) -> Result<String, Fault>;
}

/// A concrete realisation of every capability group for one host release.
///
/// Accessors default to `None` so a missing group is detected when the
/// binding is resolved instead of on first call.
pub trait VersionImplementation: Send + Sync + fmt::Debug {
    fn version(&self) -> &ServerVersion;

    fn chat_colors(&self) -> Option<&dyn ChatColors> {
        None
    }

    fn enchant_ids(&self) -> Option<&dyn EnchantIds> {
        None
    }

    fn main_hand(&self) -> Option<&dyn MainHand> {
        None
    }

    fn teleporter(&self) -> Option<&dyn Teleporter> {
        None
    }

    fn item_editor(&self) -> Option<&dyn ItemEditor> {
        None
    }

    fn block_util(&self) -> Option<&dyn BlockUtil> {
        None
    }

    fn entity_methods(&self) -> Option<&dyn EntityMethods> {
        None
    }

    fn packet_handler(&self) -> Option<&dyn PacketHandler> {
        None
    }

    fn command_map(&self) -> Option<&dyn CommandMap> {
        None
    }

    fn messaging(&self) -> Option<&dyn Messaging> {
        None
    }

    fn world(&self) -> Option<&dyn WorldAccess> {
        None
    }

    fn item_text(&self) -> Option<&dyn ItemText> {
        None
    }

    fn provides(&self, group: CapabilityGroup) -> bool {
        match group {
            CapabilityGroup::ChatColor => self.chat_colors().is_some(),
            CapabilityGroup::EnchantId => self.enchant_ids().is_some(),
            CapabilityGroup::MainHand => self.main_hand().is_some(),
            CapabilityGroup::Teleport => self.teleporter().is_some(),
            CapabilityGroup::ItemEditor => self.item_editor().is_some(),
            CapabilityGroup::Block => self.block_util().is_some(),
            CapabilityGroup::Entity => self.entity_methods().is_some(),
            CapabilityGroup::Packet => self.packet_handler().is_some(),
            CapabilityGroup::CommandMap => self.command_map().is_some(),
            CapabilityGroup::Messaging => self.messaging().is_some(),
            CapabilityGroup::World => self.world().is_some(),
            CapabilityGroup::ItemText => self.item_text().is_some(),
        }
    }

    fn missing_groups(&self) -> Vec<CapabilityGroup> {
        CapabilityGroup::ALL
            .iter()
            .copied()
            .filter(|group| !self.provides(*group))
            .collect()
    }
}

/// Registry entry for one supported release.
///
/// Building the implementation is deferred to [`VersionModule::instantiate`]
/// so only the module matching the host is ever constructed.
pub trait VersionModule: Send + Sync {
    fn version(&self) -> ServerVersion;

    /// Releases this module is an exact match for.
    fn covers(&self) -> &[Release];

    fn instantiate(&self, host: Arc<dyn HostInternals>) -> Arc<dyn VersionImplementation>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_capability_names_are_unique() {
        let names: HashSet<_> = Capability::ALL.iter().map(|c| c.name()).collect();
        assert_eq!(names.len(), Capability::ALL.len());
    }

    #[test]
    fn test_capability_names_are_prefixed_by_group() {
        for capability in Capability::ALL {
            assert!(
                capability.name().starts_with(capability.group().name()),
                "{} is not under {}",
                capability,
                capability.group()
            );
        }
    }

    #[test]
    fn test_every_group_has_operations() {
        for group in CapabilityGroup::ALL {
            assert!(Capability::ALL.iter().any(|c| c.group() == group));
        }
    }

    #[test]
    fn test_lookup_by_name() {
        assert_eq!(
            Capability::from_name("packet.send"),
            Some(Capability::SendPacket)
        );
        assert_eq!(Capability::from_name("packet.build"), None);
        assert_eq!(
            Capability::from_name("world.set_section_block").map(|c| c.group()),
            Some(CapabilityGroup::World)
        );
        assert_eq!(Capability::from_name("item_text.nbt_tooltip"), Some(Capability::NbtTooltip));
    }
}
