//! 1.13 to 1.16: obfuscated internals in revision-tagged packages, flattened materials.

use kaminms_api::{HostInternals, Release, ServerVersion, VersionModule};
use std::sync::Arc;

use crate::internals::Internals;
use crate::module::{ReleaseModule, ReleaseRow};
use crate::shared::{
    ApproximatedColors, ChunkPacketStyle, ComponentMessaging, DamageStyle, DualHand,
    EntityRoutines, FastBlocks, HoverStyle, ItemRoutines, KeyedEnchantIds, KnownCommandMap,
    NativeColors, PacketRoutines, SectionWrite, SilentTeleport, SpawnerStyle, TagStyle,
    TeleportStyle, TooltipText, UnbreakableStyle, WorldRoutines, CLASSIC_HEIGHT,
};
use crate::suite::VersionSuite;
use crate::symbols::{Internal, Namespace, Symbols};

const ROWS: &[ReleaseRow] = &[
    ReleaseRow { revision: "v1_13_R1", covers: &[(1, 13, 0)] },
    ReleaseRow { revision: "v1_13_R2", covers: &[(1, 13, 1), (1, 13, 2)] },
    ReleaseRow {
        revision: "v1_14_R1",
        covers: &[(1, 14, 0), (1, 14, 1), (1, 14, 2), (1, 14, 3), (1, 14, 4)],
    },
    ReleaseRow { revision: "v1_15_R1", covers: &[(1, 15, 0), (1, 15, 1), (1, 15, 2)] },
    ReleaseRow { revision: "v1_16_R1", covers: &[(1, 16, 0), (1, 16, 1)] },
    ReleaseRow { revision: "v1_16_R2", covers: &[(1, 16, 2), (1, 16, 3)] },
    ReleaseRow { revision: "v1_16_R3", covers: &[(1, 16, 4), (1, 16, 5)] },
];

/// First release whose chat colors carry real RGB values.
const HEX_COLORS: Release = Release::new(1, 16, 2);

pub fn modules() -> Vec<Arc<dyn VersionModule>> {
    ReleaseModule::from_rows(ROWS, assemble)
}

fn assemble(version: &ServerVersion, host: Arc<dyn HostInternals>) -> VersionSuite {
    let release = version.release();
    let internals = Internals::new(
        host,
        Symbols::obfuscated(version.revision(), symbol),
        version.revision().clone(),
    );
    let hover = if release < Release::new(1, 16, 0) {
        HoverStyle::Value
    } else {
        HoverStyle::Contents
    };

    let builder = VersionSuite::builder(version.clone())
        .enchant_ids(KeyedEnchantIds::new(internals.clone()))
        .main_hand(DualHand::new(internals.clone()))
        .teleporter(SilentTeleport::new(internals.clone(), TeleportStyle::Location))
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
        .messaging(ComponentMessaging::new(internals.clone(), hover))
        .world(WorldRoutines::new(
            internals.clone(),
            CLASSIC_HEIGHT,
            SectionWrite::Local,
            ChunkPacketStyle::Bitmask,
        ))
        .item_text(TooltipText::new(internals.clone()));

    if release >= HEX_COLORS {
        builder.chat_colors(NativeColors::new(internals)).build()
    } else {
        builder.chat_colors(ApproximatedColors).build()
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
        Internal::ChatColorRgb => (Bukkit, "ChatColor#asBungee#getColor"),
        Internal::EnchantmentKey => (Bukkit, "enchantments.Enchantment#getKey#getKey"),
        Internal::ItemDescriptionId => (Nms, "Item#getName"),
        Internal::ItemDamageable => (Bukkit, "inventory.meta.Damageable"),
        Internal::SetBlockBukkit => (Bukkit, "block.Block#setType"),
        Internal::SetBlockNms => (Nms, "World#setTypeAndData"),
        Internal::SetBlockSection => (Nms, "ChunkSection#setType"),
        Internal::EntityHeight => (Nms, "Entity#getHeight"),
        Internal::EntityWidth => (Nms, "Entity#getWidth"),
        Internal::EntityPersistent => (Nms, "EntityInsentient#persistent"),
        Internal::EntityFromSpawner => (Nms, "Entity#fromMobSpawner"),
        Internal::EntityAware => (Nms, "EntityInsentient#setNoAI"),
        Internal::CommandMapKnown => (CraftBukkit, "command.CraftCommandMap#getKnownCommands"),
        Internal::CommandMapRegister => (Bukkit, "command.SimpleCommandMap#register"),
        Internal::CommandMapUnregister => (CraftBukkit, "command.CraftCommandMap#getKnownCommands.remove"),
        Internal::SendChatJson => (Nms, "PacketPlayOutChat"),
        Internal::ChunkAt => (Nms, "World#getChunkAt"),
        Internal::ChunkSection => (Nms, "Chunk#getSections"),
        Internal::SectionIsEmpty => (Nms, "ChunkSection#c"),
        Internal::BlockChangePacket => (Nms, "PacketPlayOutBlockChange"),
        Internal::ChunkUpdatePacket => (Nms, "PacketPlayOutMapChunk"),
        Internal::ItemNbtString => (CraftBukkit, "inventory.CraftItemStack#asNMSCopy#save#toString"),
        // fixed 0..256 worlds, sections written in place
        Internal::WorldMinHeight
        | Internal::WorldMaxHeight
        | Internal::ChunkSetBlockState
        | Internal::LightEngine => return None,
    };
    Some(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kaminms_api::{ChatColor, Fault, HostFault, Rgb};

    #[test]
    fn test_every_internal_is_mapped() {
        let unmapped = [
            Internal::WorldMinHeight,
            Internal::WorldMaxHeight,
            Internal::ChunkSetBlockState,
            Internal::LightEngine,
        ];
        for internal in Internal::ALL {
            assert_eq!(
                symbol(internal).is_none(),
                unmapped.contains(&internal),
                "{:?}",
                internal
            );
        }
    }

    #[test]
    fn test_hex_colors_start_at_1_16_2() {
        struct NoHost;

        impl HostInternals for NoHost {
            fn call(&self, symbol: &str, _args: Vec<serde_json::Value>) -> Result<serde_json::Value, HostFault> {
                Err(HostFault::MissingSymbol {
                    symbol: symbol.to_string(),
                })
            }
        }

        let modules = modules();
        let bind = |revision: &str| {
            modules
                .iter()
                .find(|m| m.version().revision().as_str() == revision)
                .unwrap()
                .instantiate(Arc::new(NoHost))
        };

        let r1 = bind("v1_16_R1");
        assert_eq!(
            r1.chat_colors().unwrap().color_of(ChatColor::Gold).unwrap(),
            Some(Rgb::new(255, 170, 0))
        );

        let r2 = bind("v1_16_R2");
        let err = r2.chat_colors().unwrap().color_of(ChatColor::Gold).unwrap_err();
        assert!(matches!(err, Fault::MissingSymbol { .. }));
        assert!(r2.missing_groups().is_empty());
    }
}
