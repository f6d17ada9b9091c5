//! 1.8 to 1.12: obfuscated internals in revision-tagged packages, pre-flattening items.

use kaminms_api::{HostInternals, Release, ServerVersion, VersionModule};
use std::sync::Arc;

use crate::internals::Internals;
use crate::module::{ReleaseModule, ReleaseRow};
use crate::shared::{
    ApproximatedColors, ChunkPacketStyle, ComponentMessaging, DamageStyle, DualHand,
    EntityRoutines, FastBlocks, HoverStyle, ItemRoutines, KnownCommandMap, LegacyEnchantIds,
    PacketRoutines, SectionWrite, SilentTeleport, SingleHand, SpawnerStyle, TagStyle,
    TeleportStyle, TooltipText, UnbreakableStyle, WorldRoutines, CLASSIC_HEIGHT,
};
use crate::suite::VersionSuite;
use crate::symbols::{Internal, Namespace, SymbolTable, Symbols};

const ROWS: &[ReleaseRow] = &[
    ReleaseRow { revision: "v1_8_R1", covers: &[(1, 8, 0)] },
    ReleaseRow { revision: "v1_8_R2", covers: &[(1, 8, 1), (1, 8, 2), (1, 8, 3)] },
    ReleaseRow {
        revision: "v1_8_R3",
        covers: &[(1, 8, 4), (1, 8, 5), (1, 8, 6), (1, 8, 7), (1, 8, 8)],
    },
    ReleaseRow { revision: "v1_9_R1", covers: &[(1, 9, 0), (1, 9, 1), (1, 9, 2)] },
    ReleaseRow { revision: "v1_9_R2", covers: &[(1, 9, 3), (1, 9, 4)] },
    ReleaseRow { revision: "v1_10_R1", covers: &[(1, 10, 0), (1, 10, 1), (1, 10, 2)] },
    ReleaseRow { revision: "v1_11_R1", covers: &[(1, 11, 0), (1, 11, 1), (1, 11, 2)] },
    ReleaseRow { revision: "v1_12_R1", covers: &[(1, 12, 0), (1, 12, 1), (1, 12, 2)] },
];

pub fn modules() -> Vec<Arc<dyn VersionModule>> {
    ReleaseModule::from_rows(ROWS, assemble)
}

fn assemble(version: &ServerVersion, host: Arc<dyn HostInternals>) -> VersionSuite {
    let release = version.release();
    let single_hand = release < Release::new(1, 9, 0);
    let table: SymbolTable = if single_hand { single_hand_symbol } else { symbol };
    let internals = Internals::new(
        host,
        Symbols::obfuscated(version.revision(), table),
        version.revision().clone(),
    );
    let unbreakable = if release < Release::new(1, 11, 0) {
        UnbreakableStyle::Spigot
    } else {
        UnbreakableStyle::Meta
    };
    let chunk_packet = if single_hand {
        ChunkPacketStyle::GroundUpBitmask
    } else {
        ChunkPacketStyle::Bitmask
    };

    let builder = VersionSuite::builder(version.clone())
        .chat_colors(ApproximatedColors)
        .enchant_ids(LegacyEnchantIds)
        .teleporter(SilentTeleport::new(internals.clone(), TeleportStyle::Location))
        .item_editor(ItemRoutines::new(
            internals.clone(),
            unbreakable,
            DamageStyle::Durability,
            TagStyle::Root,
        ))
        .block_util(FastBlocks::new(internals.clone()))
        .entity_methods(EntityRoutines::new(internals.clone(), SpawnerStyle::EntityId))
        .packet_handler(PacketRoutines::new(internals.clone()))
        .command_map(KnownCommandMap::new(internals.clone()))
        .messaging(ComponentMessaging::new(internals.clone(), HoverStyle::Value))
        .world(WorldRoutines::new(
            internals.clone(),
            CLASSIC_HEIGHT,
            SectionWrite::Local,
            chunk_packet,
        ))
        .item_text(TooltipText::new(internals.clone()));

    if single_hand {
        builder.main_hand(SingleHand::new(internals)).build()
    } else {
        builder.main_hand(DualHand::new(internals)).build()
    }
}

fn single_hand_symbol(internal: Internal) -> Option<(Namespace, &'static str)> {
    match internal {
        Internal::MainHandItem => Some((Namespace::Bukkit, "inventory.PlayerInventory#getItemInHand")),
        Internal::SetMainHandItem => Some((Namespace::Bukkit, "inventory.PlayerInventory#setItemInHand")),
        Internal::OffHandItem | Internal::SetOffHandItem | Internal::InteractionHand => None,
        other => symbol(other),
    }
}

fn symbol(internal: Internal) -> Option<(Namespace, &'static str)> {
    use Namespace::*;
    let entry = match internal {
        Internal::PlayerHandle => (CraftBukkit, "entity.CraftPlayer#getHandle"),
        Internal::EntityHandle => (CraftBukkit, "entity.CraftEntity#getHandle"),
        Internal::WorldHandle => (CraftBukkit, "CraftWorld#getHandle"),
        Internal::SendPacket => (Nms, "PlayerConnection#sendPacket"),
        Internal::TeleportSilently => (Nms, "PlayerConnection#teleport"),
        Internal::EntityDestroyPacket => (Nms, "PacketPlayOutEntityDestroy"),
        Internal::EntityStatusPacket => (Nms, "PacketPlayOutEntityStatus"),
        Internal::MainHandItem => (Bukkit, "inventory.PlayerInventory#getItemInMainHand"),
        Internal::SetMainHandItem => (Bukkit, "inventory.PlayerInventory#setItemInMainHand"),
        Internal::OffHandItem => (Bukkit, "inventory.PlayerInventory#getItemInOffHand"),
        Internal::SetOffHandItem => (Bukkit, "inventory.PlayerInventory#setItemInOffHand"),
        Internal::InteractionHand => (Bukkit, "event.player.PlayerInteractEvent#getHand"),
        Internal::ItemDescriptionId => (Nms, "Item#getName"),
        Internal::SetBlockBukkit => (Bukkit, "block.Block#setTypeIdAndData"),
        Internal::SetBlockNms => (Nms, "World#setTypeAndData"),
        Internal::SetBlockSection => (Nms, "ChunkSection#setType"),
        Internal::EntityHeight => (Nms, "Entity#length"),
        Internal::EntityWidth => (Nms, "Entity#width"),
        Internal::EntityPersistent => (Nms, "EntityInsentient#persistent"),
        Internal::EntityFromSpawner => (Nms, "Entity#fromMobSpawner"),
        Internal::EntityAware => (Nms, "Entity#NoAI"),
        Internal::CommandMapKnown => (Bukkit, "command.SimpleCommandMap#knownCommands"),
        Internal::CommandMapRegister => (Bukkit, "command.SimpleCommandMap#register"),
        Internal::CommandMapUnregister => (Bukkit, "command.SimpleCommandMap#knownCommands.remove"),
        Internal::SendChatJson => (Nms, "PacketPlayOutChat"),
        Internal::ChunkAt => (Nms, "World#getChunkAt"),
        Internal::ChunkSection => (Nms, "Chunk#getSections"),
        Internal::SectionIsEmpty => (Nms, "ChunkSection#a"),
        Internal::BlockChangePacket => (Nms, "PacketPlayOutBlockChange"),
        Internal::ChunkUpdatePacket => (Nms, "PacketPlayOutMapChunk"),
        Internal::ItemNbtString => (CraftBukkit, "inventory.CraftItemStack#asNMSCopy#save#toString"),
        Internal::ChatColorRgb
        | Internal::EnchantmentKey
        | Internal::ItemDamageable
        | Internal::WorldMinHeight
        | Internal::WorldMaxHeight
        | Internal::ChunkSetBlockState
        | Internal::LightEngine => return None,
    };
    Some(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kaminms_api::Revision;

    #[test]
    fn test_rows_cover_distinct_releases() {
        let modules = modules();
        assert_eq!(modules.len(), ROWS.len());

        let mut seen = Vec::new();
        for module in &modules {
            for release in module.covers() {
                assert!(!seen.contains(release), "{} covered twice", release);
                seen.push(*release);
            }
        }
    }

    #[test]
    fn test_version_is_newest_covered_release() {
        let r3 = modules()
            .into_iter()
            .find(|m| m.version().revision() == &Revision::from_static("v1_8_R3"))
            .unwrap();
        assert_eq!(r3.version().release(), Release::new(1, 8, 8));
        assert!(r3.covers().contains(&Release::new(1, 8, 4)));
    }

    #[test]
    fn test_single_hand_has_no_off_hand_symbols() {
        assert!(single_hand_symbol(Internal::OffHandItem).is_none());
        assert!(symbol(Internal::OffHandItem).is_some());
        assert_eq!(
            single_hand_symbol(Internal::SendPacket),
            symbol(Internal::SendPacket)
        );
    }

    #[test]
    fn test_heights_are_fixed() {
        assert!(symbol(Internal::WorldMinHeight).is_none());
        assert!(symbol(Internal::ChunkSection).is_some());
        assert!(single_hand_symbol(Internal::ItemNbtString).is_some());
    }
}
