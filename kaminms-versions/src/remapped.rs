//! 1.17 to 1.20.4: unversioned `net.minecraft` packages, reobfuscated from Mojang names at build time.

use kaminms_api::{HostInternals, Release, ServerVersion, VersionModule};
use std::sync::Arc;

use crate::internals::Internals;
use crate::module::{ReleaseModule, ReleaseRow};
use crate::shared::{
    ChunkPacketStyle, ComponentMessaging, DamageStyle, DualHand, EntityRoutines, FastBlocks,
    HeightStyle, HoverStyle, ItemRoutines, KeyedEnchantIds, KnownCommandMap, NativeColors,
    NoTooltipText, PacketRoutines, SectionWrite, SilentTeleport, SpawnerStyle, TagStyle,
    TeleportStyle, UnbreakableStyle, WorldRoutines,
};
use crate::suite::VersionSuite;
use crate::symbols::{Internal, Namespace, SymbolTable, Symbols};

const ROWS: &[ReleaseRow] = &[
    ReleaseRow { revision: "v1_17_R1", covers: &[(1, 17, 0), (1, 17, 1)] },
    ReleaseRow { revision: "v1_18_R1", covers: &[(1, 18, 0), (1, 18, 1)] },
    ReleaseRow { revision: "v1_18_R2", covers: &[(1, 18, 2)] },
    ReleaseRow { revision: "v1_19_R1", covers: &[(1, 19, 0), (1, 19, 1), (1, 19, 2)] },
    ReleaseRow { revision: "v1_19_R2", covers: &[(1, 19, 3)] },
    ReleaseRow { revision: "v1_19_R3", covers: &[(1, 19, 4)] },
    ReleaseRow { revision: "v1_20_R1", covers: &[(1, 20, 0), (1, 20, 1)] },
    ReleaseRow { revision: "v1_20_R2", covers: &[(1, 20, 2)] },
    ReleaseRow { revision: "v1_20_R3", covers: &[(1, 20, 3), (1, 20, 4)] },
];

pub fn modules() -> Vec<Arc<dyn VersionModule>> {
    ReleaseModule::from_rows(ROWS, assemble)
}

/// First release whose chunk packet carries light data.
const CHUNK_WITH_LIGHT: Release = Release::new(1, 18, 0);

fn assemble(version: &ServerVersion, host: Arc<dyn HostInternals>) -> VersionSuite {
    let release = version.release();
    // 1.19 moved server chat onto the system chat packet
    let table: SymbolTable = if release < CHUNK_WITH_LIGHT {
        map_chunk_symbol
    } else if release < Release::new(1, 19, 0) {
        symbol
    } else {
        system_chat_symbol
    };
    let chunk_packet = if release < CHUNK_WITH_LIGHT {
        ChunkPacketStyle::Plain
    } else {
        ChunkPacketStyle::WithLight
    };
    let internals = Internals::new(
        host,
        Symbols::reobfuscated(version.revision(), table),
        version.revision().clone(),
    );

    VersionSuite::builder(version.clone())
        .chat_colors(NativeColors::new(internals.clone()))
        .enchant_ids(KeyedEnchantIds::new(internals.clone()))
        .main_hand(DualHand::new(internals.clone()))
        .teleporter(SilentTeleport::new(internals.clone(), TeleportStyle::Coordinates))
        .item_editor(ItemRoutines::new(
            internals.clone(),
            UnbreakableStyle::Meta,
            DamageStyle::Damageable,
            TagStyle::Root,
        ))
        .block_util(FastBlocks::new(internals.clone()))
        .entity_methods(EntityRoutines::new(internals.clone(), SpawnerStyle::SpawnData))
        .packet_handler(PacketRoutines::new(internals.clone()))
        .command_map(KnownCommandMap::new(internals.clone()))
        .messaging(ComponentMessaging::new(internals.clone(), HoverStyle::Contents))
        .world(WorldRoutines::new(
            internals,
            HeightStyle::BuildHeight,
            SectionWrite::Local,
            chunk_packet,
        ))
        .item_text(NoTooltipText)
        .build()
}

fn map_chunk_symbol(internal: Internal) -> Option<(Namespace, &'static str)> {
    match internal {
        Internal::ChunkUpdatePacket => Some((Namespace::Nms, "network.protocol.game.PacketPlayOutMapChunk")),
        other => symbol(other),
    }
}

fn system_chat_symbol(internal: Internal) -> Option<(Namespace, &'static str)> {
    match internal {
        Internal::SendChatJson => Some((Namespace::Nms, "network.protocol.game.ClientboundSystemChatPacket")),
        other => symbol(other),
    }
}

fn symbol(internal: Internal) -> Option<(Namespace, &'static str)> {
    use Namespace::*;
    let entry = match internal {
        Internal::PlayerHandle => (CraftBukkit, "entity.CraftPlayer#getHandle"),
        Internal::EntityHandle => (CraftBukkit, "entity.CraftEntity#getHandle"),
        Internal::WorldHandle => (CraftBukkit, "CraftWorld#getHandle"),
        Internal::SendPacket => (Nms, "server.network.PlayerConnection#sendPacket"),
        Internal::TeleportSilently => (Nms, "server.network.PlayerConnection#internalTeleport"),
        Internal::EntityDestroyPacket => (Nms, "network.protocol.game.PacketPlayOutEntityDestroy"),
        Internal::EntityStatusPacket => (Nms, "network.protocol.game.PacketPlayOutEntityStatus"),
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
        Internal::SetBlockNms => (Nms, "world.level.World#setBlock"),
        Internal::SetBlockSection => (Nms, "world.level.chunk.ChunkSection#setBlockState"),
        Internal::EntityHeight => (Nms, "world.entity.Entity#getBbHeight"),
        Internal::EntityWidth => (Nms, "world.entity.Entity#getBbWidth"),
        Internal::EntityPersistent => (Nms, "world.entity.EntityInsentient#setPersistenceRequired"),
        Internal::EntityFromSpawner => (Nms, "world.entity.Entity#spawnedViaMobSpawner"),
        Internal::EntityAware => (Nms, "world.entity.EntityInsentient#setNoAi"),
        Internal::CommandMapKnown => (CraftBukkit, "command.CraftCommandMap#getKnownCommands"),
        Internal::CommandMapRegister => (Bukkit, "command.SimpleCommandMap#register"),
        Internal::CommandMapUnregister => (CraftBukkit, "command.CraftCommandMap#getKnownCommands.remove"),
        Internal::SendChatJson => (Nms, "network.protocol.game.PacketPlayOutChat"),
        Internal::WorldMinHeight => (Nms, "world.level.World#getMinBuildHeight"),
        Internal::WorldMaxHeight => (Nms, "world.level.World#getMaxBuildHeight"),
        Internal::ChunkAt => (Nms, "world.level.World#getChunkAt"),
        Internal::ChunkSection => (Nms, "world.level.chunk.Chunk#getSection"),
        Internal::SectionIsEmpty => (Nms, "world.level.chunk.ChunkSection#hasOnlyAir"),
        Internal::BlockChangePacket => (Nms, "network.protocol.game.PacketPlayOutBlockChange"),
        Internal::ChunkUpdatePacket => (Nms, "network.protocol.game.ClientboundLevelChunkWithLightPacket"),
        Internal::LightEngine => (Nms, "world.level.World#getLightEngine"),
        Internal::ChunkSetBlockState | Internal::ItemNbtString => return None,
    };
    Some(entry)
}
