//! 1.20.5 onwards: Mojang names at runtime, unversioned CraftBukkit, data-component items.
//!
//! Hosts in this family usually expose no revision in their package names, so
//! detection relies on the covered releases alone.

use kaminms_api::{HostInternals, Release, ServerVersion, VersionModule};
use std::sync::Arc;

use crate::internals::Internals;
use crate::module::{ReleaseModule, ReleaseRow};
use crate::shared::{
    ChunkPacketStyle, ComponentMessaging, DamageStyle, DualHand, EntityRoutines, FastBlocks,
    HeightStyle, HoverStyle, ItemRoutines, KeyedEnchantIds, KnownCommandMap, NativeColors,
    NoTooltipText, PacketRoutines, SectionWrite, SilentTeleport, SpawnerStyle, TagStyle,
    TeleportStyle, UnbreakableStyle, WorldRoutines, SKIP_PLACE_FLAGS,
};
use crate::suite::VersionSuite;
use crate::symbols::{Internal, Namespace, SymbolTable, Symbols};

const ROWS: &[ReleaseRow] = &[
    ReleaseRow { revision: "v1_20_CB", covers: &[(1, 20, 5), (1, 20, 6)] },
    ReleaseRow {
        revision: "v1_21_CB",
        covers: &[(1, 21, 0), (1, 21, 1), (1, 21, 2), (1, 21, 3)],
    },
    ReleaseRow { revision: "v1_21_4", covers: &[(1, 21, 4)] },
    ReleaseRow {
        revision: "latest",
        covers: &[(1, 21, 5), (1, 21, 6), (1, 21, 7), (1, 21, 8), (1, 21, 9), (1, 21, 10)],
    },
];

/// 1.21.2 replaced the positional teleport with `PositionMoveRotation`
/// and the build height accessors with `getMinY`/`getMaxY`.
const POSITION_MOVE_ROTATION: Release = Release::new(1, 21, 2);

/// From 1.21.5 section writes go through the chunk with placement flags.
const FLAGGED_SECTION_WRITES: Release = Release::new(1, 21, 5);

pub fn modules() -> Vec<Arc<dyn VersionModule>> {
    ReleaseModule::from_rows(ROWS, assemble)
}

fn assemble(version: &ServerVersion, host: Arc<dyn HostInternals>) -> VersionSuite {
    let release = version.release();
    let moved = release >= POSITION_MOVE_ROTATION;
    let table: SymbolTable = if moved { move_rotation_symbol } else { symbol };
    let height = if moved {
        HeightStyle::InclusiveMax
    } else {
        HeightStyle::BuildHeight
    };
    let write = if release >= FLAGGED_SECTION_WRITES {
        SectionWrite::ChunkFlags(SKIP_PLACE_FLAGS)
    } else {
        SectionWrite::Local
    };
    let internals = Internals::new(host, Symbols::mojang(table), version.revision().clone());

    VersionSuite::builder(version.clone())
        .chat_colors(NativeColors::new(internals.clone()))
        .enchant_ids(KeyedEnchantIds::new(internals.clone()))
        .main_hand(DualHand::new(internals.clone()))
        .teleporter(SilentTeleport::new(internals.clone(), TeleportStyle::Coordinates))
        .item_editor(ItemRoutines::new(
            internals.clone(),
            UnbreakableStyle::Meta,
            DamageStyle::Component,
            TagStyle::CustomData,
        ))
        .block_util(FastBlocks::new(internals.clone()))
        .entity_methods(EntityRoutines::new(internals.clone(), SpawnerStyle::Component))
        .packet_handler(PacketRoutines::new(internals.clone()))
        .command_map(KnownCommandMap::new(internals.clone()))
        .messaging(ComponentMessaging::new(internals.clone(), HoverStyle::Contents))
        .world(WorldRoutines::new(internals, height, write, ChunkPacketStyle::WithLight))
        .item_text(NoTooltipText)
        .build()
}

fn move_rotation_symbol(internal: Internal) -> Option<(Namespace, &'static str)> {
    match internal {
        Internal::TeleportSilently => Some((
            Namespace::Nms,
            "server.network.ServerGamePacketListenerImpl#internalTeleport(PositionMoveRotation)",
        )),
        Internal::WorldMinHeight => Some((Namespace::Nms, "world.level.Level#getMinY")),
        Internal::WorldMaxHeight => Some((Namespace::Nms, "world.level.Level#getMaxY")),
        other => symbol(other),
    }
}

fn symbol(internal: Internal) -> Option<(Namespace, &'static str)> {
    use Namespace::*;
    let entry = match internal {
        Internal::PlayerHandle => (CraftBukkit, "entity.CraftPlayer#getHandle"),
        Internal::EntityHandle => (CraftBukkit, "entity.CraftEntity#getHandle"),
        Internal::WorldHandle => (CraftBukkit, "CraftWorld#getHandle"),
        Internal::SendPacket => (Nms, "server.network.ServerGamePacketListenerImpl#send"),
        Internal::TeleportSilently => (Nms, "server.network.ServerGamePacketListenerImpl#internalTeleport"),
        Internal::EntityDestroyPacket => (Nms, "network.protocol.game.ClientboundRemoveEntitiesPacket"),
        Internal::EntityStatusPacket => (Nms, "network.protocol.game.ClientboundEntityEventPacket"),
        Internal::MainHandItem => (Bukkit, "inventory.PlayerInventory#getItemInMainHand"),
        Internal::SetMainHandItem => (Bukkit, "inventory.PlayerInventory#setItemInMainHand"),
        Internal::OffHandItem => (Bukkit, "inventory.PlayerInventory#getItemInOffHand"),
        Internal::SetOffHandItem => (Bukkit, "inventory.PlayerInventory#setItemInOffHand"),
        Internal::InteractionHand => (Bukkit, "event.player.PlayerInteractEvent#getHand"),
        Internal::ChatColorRgb => (Bukkit, "ChatColor#asBungee#getColor"),
        Internal::EnchantmentKey => (Bukkit, "enchantments.Enchantment#getKey#getKey"),
        Internal::ItemDescriptionId => (Nms, "world.item.Item#getDescriptionId"),
        Internal::ItemDamageable => (Bukkit, "inventory.meta.Damageable"),
        Internal::SetBlockBukkit => (Bukkit, "block.Block#setType"),
        Internal::SetBlockNms => (Nms, "world.level.Level#setBlock"),
        Internal::SetBlockSection => (Nms, "world.level.chunk.LevelChunkSection#setBlockState"),
        Internal::EntityHeight => (Nms, "world.entity.Entity#getBbHeight"),
        Internal::EntityWidth => (Nms, "world.entity.Entity#getBbWidth"),
        Internal::EntityPersistent => (Nms, "world.entity.Mob#setPersistenceRequired"),
        Internal::EntityFromSpawner => (Nms, "world.entity.Entity#spawnedViaMobSpawner"),
        Internal::EntityAware => (Nms, "world.entity.Mob#setNoAi"),
        Internal::CommandMapKnown => (CraftBukkit, "command.CraftCommandMap#getKnownCommands"),
        Internal::CommandMapRegister => (Bukkit, "command.SimpleCommandMap#register"),
        Internal::CommandMapUnregister => (CraftBukkit, "command.CraftCommandMap#getKnownCommands.remove"),
        Internal::SendChatJson => (Nms, "network.protocol.game.ClientboundSystemChatPacket"),
        Internal::WorldMinHeight => (Nms, "world.level.Level#getMinBuildHeight"),
        Internal::WorldMaxHeight => (Nms, "world.level.Level#getMaxBuildHeight"),
        Internal::ChunkAt => (Nms, "world.level.Level#getChunk"),
        Internal::ChunkSection => (Nms, "world.level.chunk.LevelChunk#getSection"),
        Internal::SectionIsEmpty => (Nms, "world.level.chunk.LevelChunkSection#hasOnlyAir"),
        Internal::ChunkSetBlockState => (Nms, "world.level.chunk.LevelChunk#setBlockState"),
        Internal::BlockChangePacket => (Nms, "network.protocol.game.ClientboundBlockUpdatePacket"),
        Internal::ChunkUpdatePacket => (Nms, "network.protocol.game.ClientboundLevelChunkWithLightPacket"),
        Internal::LightEngine => (Nms, "world.level.Level#getLightEngine"),
        Internal::ItemNbtString => return None,
    };
    Some(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::Mapping;

    #[test]
    fn test_no_remap_pass() {
        let symbols = Symbols::mojang(symbol);
        assert_eq!(symbols.mapping(), Mapping::Mojang);
        assert_eq!(
            symbols.resolve(Internal::EntityDestroyPacket).unwrap(),
            "net.minecraft.network.protocol.game.ClientboundRemoveEntitiesPacket"
        );
    }

    #[test]
    fn test_teleport_signature_switch() {
        assert_ne!(
            move_rotation_symbol(Internal::TeleportSilently),
            symbol(Internal::TeleportSilently)
        );
    }

    #[test]
    fn test_height_accessors_switch_with_teleport() {
        assert_eq!(
            move_rotation_symbol(Internal::WorldMaxHeight).map(|(_, path)| path),
            Some("world.level.Level#getMaxY")
        );
        assert_eq!(
            symbol(Internal::WorldMaxHeight).map(|(_, path)| path),
            Some("world.level.Level#getMaxBuildHeight")
        );
        assert_eq!(
            move_rotation_symbol(Internal::ChunkSetBlockState),
            symbol(Internal::ChunkSetBlockState)
        );
    }

    #[test]
    fn test_latest_is_newest() {
        let newest = modules().into_iter().map(|m| m.version()).max().unwrap();
        assert_eq!(newest.revision().as_str(), "latest");
        assert_eq!(newest.release(), Release::new(1, 21, 10));
    }
}
