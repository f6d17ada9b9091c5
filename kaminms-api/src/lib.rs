//! Version-independent contracts for the KamiCommon NMS layer.
//!
//! Plugin code depends on this crate only: capability traits, the values they
//! exchange, the host seams and the error taxonomy.

pub mod capability;
pub mod error;
pub mod host;
pub mod types;
pub mod version;

pub use capability::{
    BlockUtil, Capability, CapabilityGroup, ChatColors, CommandMap, EnchantIds, EntityMethods,
    ItemEditor, ItemText, MainHand, Messaging, PacketHandler, Teleporter, VersionImplementation,
    VersionModule, WorldAccess,
};
pub use error::{
    AmbiguousBindingError, ErrorCode, Fault, HostFault, NmsError, NmsResult,
    UnsupportedVersionError, VersionImplementationError, VersionParseError,
};
pub use host::{HostFlavor, HostInternals, HostProbe};
pub use types::{
    BlockPos, ChatColor, ChatComponent, ChunkPos, ClickAction, CommandSpec, Enchantment,
    EntityKind, EntityRef, Hand, ItemStack, Location, NmsPacket, PlaceType, PlayerRef, Rgb,
};
pub use version::{Release, Revision, ServerVersion};
