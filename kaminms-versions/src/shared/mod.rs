//! Capability routines shared between releases.
//!
//! A release reuses another release's behaviour by holding one of these
//! routines, configured with its own [`Internals`](crate::internals::Internals)
//! and style flags. Nothing here is generic over a release's base types.

pub mod block;
pub mod chat_color;
pub mod command;
pub mod enchant;
pub mod entity;
pub mod item;
pub mod item_text;
pub mod main_hand;
pub mod message;
pub mod packet;
pub mod teleport;
pub mod world;

pub use block::FastBlocks;
pub use chat_color::{ApproximatedColors, NativeColors};
pub use command::KnownCommandMap;
pub use enchant::{KeyedEnchantIds, LegacyEnchantIds};
pub use entity::{EntityRoutines, SpawnerStyle};
pub use item::{DamageStyle, ItemRoutines, TagStyle, UnbreakableStyle};
pub use item_text::{NoTooltipText, TooltipText};
pub use main_hand::{DualHand, SingleHand};
pub use message::{ComponentMessaging, HoverStyle};
pub use packet::PacketRoutines;
pub use teleport::{SilentTeleport, TeleportStyle};
pub use world::{ChunkPacketStyle, HeightStyle, SectionWrite, WorldRoutines, CLASSIC_HEIGHT, SKIP_PLACE_FLAGS};
