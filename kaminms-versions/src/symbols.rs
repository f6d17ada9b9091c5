//! Internal symbol naming per release.
//!
//! Each family supplies a [`SymbolTable`] mapping the internal primitives it
//! drives to class/member paths relative to a [`Namespace`]. [`Symbols`]
//! anchors those paths to the packages of one concrete release.

use kaminms_api::{Fault, Revision};
use std::fmt;

/// Internal primitives a version implementation drives in the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Internal {
    PlayerHandle,
    EntityHandle,
    WorldHandle,
    SendPacket,
    TeleportSilently,
    EntityDestroyPacket,
    EntityStatusPacket,
    MainHandItem,
    SetMainHandItem,
    OffHandItem,
    SetOffHandItem,
    InteractionHand,
    ChatColorRgb,
    EnchantmentKey,
    ItemDescriptionId,
    ItemDamageable,
    SetBlockBukkit,
    SetBlockNms,
    SetBlockSection,
    EntityHeight,
    EntityWidth,
    EntityPersistent,
    EntityFromSpawner,
    EntityAware,
    CommandMapKnown,
    CommandMapRegister,
    CommandMapUnregister,
    SendChatJson,
    WorldMinHeight,
    WorldMaxHeight,
    ChunkAt,
    ChunkSection,
    SectionIsEmpty,
    ChunkSetBlockState,
    BlockChangePacket,
    ChunkUpdatePacket,
    LightEngine,
    ItemNbtString,
}

impl Internal {
    pub const ALL: [Internal; 38] = [
        Internal::PlayerHandle,
        Internal::EntityHandle,
        Internal::WorldHandle,
        Internal::SendPacket,
        Internal::TeleportSilently,
        Internal::EntityDestroyPacket,
        Internal::EntityStatusPacket,
        Internal::MainHandItem,
        Internal::SetMainHandItem,
        Internal::OffHandItem,
        Internal::SetOffHandItem,
        Internal::InteractionHand,
        Internal::ChatColorRgb,
        Internal::EnchantmentKey,
        Internal::ItemDescriptionId,
        Internal::ItemDamageable,
        Internal::SetBlockBukkit,
        Internal::SetBlockNms,
        Internal::SetBlockSection,
        Internal::EntityHeight,
        Internal::EntityWidth,
        Internal::EntityPersistent,
        Internal::EntityFromSpawner,
        Internal::EntityAware,
        Internal::CommandMapKnown,
        Internal::CommandMapRegister,
        Internal::CommandMapUnregister,
        Internal::SendChatJson,
        Internal::WorldMinHeight,
        Internal::WorldMaxHeight,
        Internal::ChunkAt,
        Internal::ChunkSection,
        Internal::SectionIsEmpty,
        Internal::ChunkSetBlockState,
        Internal::BlockChangePacket,
        Internal::ChunkUpdatePacket,
        Internal::LightEngine,
        Internal::ItemNbtString,
    ];
}

/// Root a relative symbol path is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    /// `net.minecraft.server.<rev>` on legacy releases, `net.minecraft` afterwards.
    Nms,
    /// `org.bukkit.craftbukkit[.<rev>]`.
    CraftBukkit,
    /// The stable `org.bukkit` API.
    Bukkit,
}

pub type SymbolTable = fn(Internal) -> Option<(Namespace, &'static str)>;

/// How a release names its internals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mapping {
    /// Obfuscated names in revision-tagged packages (1.8 to 1.16).
    Obfuscated,
    /// Spigot names, unversioned `net.minecraft` packages, reobfuscated at build time (1.17 to 1.20.4).
    Reobfuscated,
    /// Mojang names used directly, no remap pass (1.20.5 onwards).
    Mojang,
}

#[derive(Clone)]
pub struct Symbols {
    nms: String,
    craftbukkit: String,
    mapping: Mapping,
    table: SymbolTable,
}

impl Symbols {
    pub fn obfuscated(revision: &Revision, table: SymbolTable) -> Self {
        Symbols {
            nms: format!("net.minecraft.server.{}", revision),
            craftbukkit: format!("org.bukkit.craftbukkit.{}", revision),
            mapping: Mapping::Obfuscated,
            table,
        }
    }

    pub fn reobfuscated(revision: &Revision, table: SymbolTable) -> Self {
        Symbols {
            nms: "net.minecraft".to_string(),
            craftbukkit: format!("org.bukkit.craftbukkit.{}", revision),
            mapping: Mapping::Reobfuscated,
            table,
        }
    }

    pub fn mojang(table: SymbolTable) -> Self {
        Symbols {
            nms: "net.minecraft".to_string(),
            craftbukkit: "org.bukkit.craftbukkit".to_string(),
            mapping: Mapping::Mojang,
            table,
        }
    }

    pub fn mapping(&self) -> Mapping {
        self.mapping
    }

    /// Fully qualified symbol for `internal`.
    pub fn resolve(&self, internal: Internal) -> Result<String, Fault> {
        let (namespace, path) = (self.table)(internal).ok_or_else(|| Fault::MissingSymbol {
            symbol: format!("<unmapped {:?} in {}>", internal, self.craftbukkit),
        })?;
        let root = match namespace {
            Namespace::Nms => self.nms.as_str(),
            Namespace::CraftBukkit => self.craftbukkit.as_str(),
            Namespace::Bukkit => "org.bukkit",
        };
        Ok(format!("{}.{}", root, path))
    }
}

impl fmt::Debug for Symbols {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Symbols")
            .field("nms", &self.nms)
            .field("craftbukkit", &self.craftbukkit)
            .field("mapping", &self.mapping)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(internal: Internal) -> Option<(Namespace, &'static str)> {
        match internal {
            Internal::PlayerHandle => Some((Namespace::CraftBukkit, "entity.CraftPlayer#getHandle")),
            Internal::SendPacket => Some((Namespace::Nms, "PlayerConnection#sendPacket")),
            Internal::MainHandItem => Some((Namespace::Bukkit, "inventory.PlayerInventory#getItemInHand")),
            _ => None,
        }
    }

    #[test]
    fn test_obfuscated_packages_carry_revision() {
        let symbols = Symbols::obfuscated(&Revision::from_static("v1_8_R3"), table);
        assert_eq!(
            symbols.resolve(Internal::SendPacket).unwrap(),
            "net.minecraft.server.v1_8_R3.PlayerConnection#sendPacket"
        );
        assert_eq!(
            symbols.resolve(Internal::PlayerHandle).unwrap(),
            "org.bukkit.craftbukkit.v1_8_R3.entity.CraftPlayer#getHandle"
        );
    }

    #[test]
    fn test_mojang_packages_are_bare() {
        let symbols = Symbols::mojang(table);
        assert_eq!(
            symbols.resolve(Internal::PlayerHandle).unwrap(),
            "org.bukkit.craftbukkit.entity.CraftPlayer#getHandle"
        );
        assert_eq!(
            symbols.resolve(Internal::MainHandItem).unwrap(),
            "org.bukkit.inventory.PlayerInventory#getItemInHand"
        );
        assert_eq!(symbols.mapping(), Mapping::Mojang);
    }

    #[test]
    fn test_unmapped_internal_is_a_missing_symbol() {
        let symbols = Symbols::reobfuscated(&Revision::from_static("v1_17_R1"), table);
        match symbols.resolve(Internal::CommandMapKnown) {
            Err(Fault::MissingSymbol { symbol }) => assert!(symbol.contains("CommandMapKnown")),
            other => panic!("expected missing symbol, got {:?}", other),
        }
    }
}
