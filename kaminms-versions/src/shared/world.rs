use kaminms_api::{BlockPos, ChunkPos, Fault, PlayerRef, WorldAccess};
use serde_json::{json, Value};

use crate::internals::{arg, Internals};
use crate::symbols::Internal;

/// Where a release keeps a world's vertical bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeightStyle {
    /// Every world spans `min..max` (pre 1.17).
    Fixed { min: i32, max: i32 },
    /// `getMinBuildHeight`/`getMaxBuildHeight`, max exclusive (1.17 to 1.21.1).
    BuildHeight,
    /// `getMinY`/`getMaxY`, max inclusive (1.21.2+).
    InclusiveMax,
}

/// Height range of every world before data-driven dimensions.
pub const CLASSIC_HEIGHT: HeightStyle = HeightStyle::Fixed { min: 0, max: 256 };

/// How a section write reaches the chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionWrite {
    /// `section.setType(x, y, z, state)` in section-local coordinates.
    Local,
    /// `chunk.setBlockState(pos, state, flags)` in world coordinates (1.21.5+).
    ChunkFlags(i32),
}

/// No neighbour updates and no `onPlace`, as a 1.21.5+ flag mask.
pub const SKIP_PLACE_FLAGS: i32 = 512;

/// Constructor arguments of the full-chunk packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkPacketStyle {
    /// `(chunk, groundUp, bitmask)`, 1.8.
    GroundUpBitmask,
    /// `(chunk, bitmask)`, 1.9 to 1.16.
    Bitmask,
    /// `(chunk)`, 1.17.
    Plain,
    /// `(chunk, lightEngine, null, null)`, 1.18+.
    WithLight,
}

const ALL_SECTIONS: i32 = 0xFFFF;

/// World bounds and chunk-section access through the world handle.
#[derive(Debug)]
pub struct WorldRoutines {
    internals: Internals,
    height: HeightStyle,
    write: SectionWrite,
    chunk_packet: ChunkPacketStyle,
}

impl WorldRoutines {
    pub fn new(
        internals: Internals,
        height: HeightStyle,
        write: SectionWrite,
        chunk_packet: ChunkPacketStyle,
    ) -> Self {
        Self {
            internals,
            height,
            write,
            chunk_packet,
        }
    }

    fn world_handle(&self, world: &str) -> Result<Value, Fault> {
        self.internals.handle(Internal::WorldHandle, json!(world))
    }

    fn min_of(&self, handle: &Value) -> Result<i32, Fault> {
        match self.height {
            HeightStyle::Fixed { min, .. } => Ok(min),
            HeightStyle::BuildHeight | HeightStyle::InclusiveMax => self
                .internals
                .call(Internal::WorldMinHeight, vec![handle.clone()]),
        }
    }

    fn max_of(&self, handle: &Value) -> Result<i32, Fault> {
        match self.height {
            HeightStyle::Fixed { max, .. } => Ok(max),
            HeightStyle::BuildHeight => self
                .internals
                .call(Internal::WorldMaxHeight, vec![handle.clone()]),
            HeightStyle::InclusiveMax => self
                .internals
                .call::<i32>(Internal::WorldMaxHeight, vec![handle.clone()])
                .map(|max| max + 1),
        }
    }

    fn chunk_handle(&self, world: &Value, chunk: ChunkPos) -> Result<Value, Fault> {
        self.internals
            .construct(Internal::ChunkAt, vec![world.clone(), json!(chunk.x), json!(chunk.z)])
            .map(|(_, handle)| handle)
    }

    /// The chunk and section handles holding `pos`, after a bounds check.
    fn locate(&self, world: &str, pos: BlockPos) -> Result<(Value, Value), Fault> {
        let world = self.world_handle(world)?;
        let (min, max) = (self.min_of(&world)?, self.max_of(&world)?);
        if pos.y < min || pos.y >= max {
            return Err(Fault::OutOfWorld { y: pos.y, min, max });
        }
        let chunk = self.chunk_handle(&world, pos.chunk())?;
        let (_, section) = self.internals.construct(
            Internal::ChunkSection,
            vec![chunk.clone(), json!(pos.section_index(min))],
        )?;
        Ok((chunk, section))
    }

    fn send(&self, player: &PlayerRef, packet: Value) -> Result<(), Fault> {
        let handle = self.internals.handle(Internal::PlayerHandle, arg(player)?)?;
        self.internals.run(Internal::SendPacket, vec![handle, packet])
    }
}

impl WorldAccess for WorldRoutines {
    fn min_height(&self, world: &str) -> Result<i32, Fault> {
        let handle = self.world_handle(world)?;
        self.min_of(&handle)
    }

    fn max_height(&self, world: &str) -> Result<i32, Fault> {
        let handle = self.world_handle(world)?;
        self.max_of(&handle)
    }

    fn refresh_block_at(&self, player: &PlayerRef, world: &str, pos: BlockPos) -> Result<(), Fault> {
        let world = self.world_handle(world)?;
        let (_, packet) = self
            .internals
            .construct(Internal::BlockChangePacket, vec![world, arg(&pos)?])?;
        self.send(player, packet)
    }

    fn set_section_block(&self, world: &str, pos: BlockPos, material: &str) -> Result<(), Fault> {
        let (chunk, section) = self.locate(world, pos)?;
        match self.write {
            SectionWrite::Local => {
                let (x, y, z) = pos.in_section();
                self.internals.run(
                    Internal::SetBlockSection,
                    vec![section, json!(x), json!(y), json!(z), json!(material)],
                )
            }
            SectionWrite::ChunkFlags(flags) => self.internals.run(
                Internal::ChunkSetBlockState,
                vec![chunk, arg(&pos)?, json!(material), json!(flags)],
            ),
        }
    }

    fn is_section_empty(&self, world: &str, pos: BlockPos) -> Result<bool, Fault> {
        let (_, section) = self.locate(world, pos)?;
        self.internals.call(Internal::SectionIsEmpty, vec![section])
    }

    fn send_chunk_update(&self, player: &PlayerRef, world: &str, chunk: ChunkPos) -> Result<(), Fault> {
        let world = self.world_handle(world)?;
        let handle = self.chunk_handle(&world, chunk)?;
        let args = match self.chunk_packet {
            ChunkPacketStyle::GroundUpBitmask => vec![handle, json!(true), json!(ALL_SECTIONS)],
            ChunkPacketStyle::Bitmask => vec![handle, json!(ALL_SECTIONS)],
            ChunkPacketStyle::Plain => vec![handle],
            ChunkPacketStyle::WithLight => {
                let light = self.internals.handle(Internal::LightEngine, world)?;
                vec![handle, light, Value::Null, Value::Null]
            }
        };
        let (_, packet) = self.internals.construct(Internal::ChunkUpdatePacket, args)?;
        self.send(player, packet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kaminms_api::{HostFault, HostInternals, Revision};
    use std::sync::{Arc, Mutex};
    use uuid::Uuid;

    use crate::symbols::{Namespace, Symbols};

    /// Answers every call from a fixed table and keeps what it was asked.
    #[derive(Default)]
    struct Host {
        seen: Mutex<Vec<(String, Vec<Value>)>>,
    }

    impl HostInternals for Host {
        fn call(&self, symbol: &str, args: Vec<Value>) -> Result<Value, HostFault> {
            self.seen.lock().unwrap().push((symbol.to_string(), args));
            let member = symbol.rsplit('.').next().unwrap_or(symbol);
            Ok(match member {
                "Level#getMinY" => json!(-64),
                "Level#getMaxY" => json!(319),
                "LevelChunkSection#hasOnlyAir" => json!(true),
                _ => json!({ "handle": member }),
            })
        }
    }

    fn table(internal: Internal) -> Option<(Namespace, &'static str)> {
        use Namespace::*;
        let entry = match internal {
            Internal::PlayerHandle => (CraftBukkit, "entity.CraftPlayer#getHandle"),
            Internal::WorldHandle => (CraftBukkit, "CraftWorld#getHandle"),
            Internal::SendPacket => (Nms, "server.network.ServerGamePacketListenerImpl#send"),
            Internal::WorldMinHeight => (Nms, "world.level.Level#getMinY"),
            Internal::WorldMaxHeight => (Nms, "world.level.Level#getMaxY"),
            Internal::ChunkAt => (Nms, "world.level.Level#getChunk"),
            Internal::ChunkSection => (Nms, "world.level.chunk.LevelChunk#getSection"),
            Internal::SectionIsEmpty => (Nms, "world.level.chunk.LevelChunkSection#hasOnlyAir"),
            Internal::SetBlockSection => (Nms, "world.level.chunk.LevelChunkSection#setBlockState"),
            Internal::ChunkSetBlockState => (Nms, "world.level.chunk.LevelChunk#setBlockState"),
            Internal::LightEngine => (Nms, "world.level.Level#getLightEngine"),
            Internal::ChunkUpdatePacket => (Nms, "network.protocol.game.ClientboundLevelChunkWithLightPacket"),
            _ => return None,
        };
        Some(entry)
    }

    fn routines(host: Arc<Host>, height: HeightStyle, write: SectionWrite) -> WorldRoutines {
        let revision = Revision::from_static("latest");
        let internals = Internals::new(host, Symbols::mojang(table), revision);
        WorldRoutines::new(internals, height, write, ChunkPacketStyle::WithLight)
    }

    fn seen(host: &Host, suffix: &str) -> Vec<Vec<Value>> {
        host.seen
            .lock()
            .unwrap()
            .iter()
            .filter(|(symbol, _)| symbol.ends_with(suffix))
            .map(|(_, args)| args.clone())
            .collect()
    }

    #[test]
    fn test_classic_heights_need_no_host() {
        let host = Arc::new(Host::default());
        let world = routines(host.clone(), CLASSIC_HEIGHT, SectionWrite::Local);
        assert_eq!(world.min_height("world").unwrap(), 0);
        assert_eq!(world.max_height("world").unwrap(), 256);
        assert!(seen(&host, "#getMinY").is_empty());
    }

    #[test]
    fn test_inclusive_max_is_made_exclusive() {
        let world = routines(Arc::new(Host::default()), HeightStyle::InclusiveMax, SectionWrite::Local);
        assert_eq!(world.min_height("world").unwrap(), -64);
        assert_eq!(world.max_height("world").unwrap(), 320);
    }

    #[test]
    fn test_local_write_uses_section_coordinates() {
        let host = Arc::new(Host::default());
        let world = routines(host.clone(), HeightStyle::InclusiveMax, SectionWrite::Local);
        world
            .set_section_block("world", BlockPos { x: -1, y: -60, z: 33 }, "STONE")
            .unwrap();

        assert_eq!(seen(&host, "#getChunk"), vec![vec![json!({ "handle": "CraftWorld#getHandle" }), json!(-1), json!(2)]]);
        assert_eq!(seen(&host, "#getSection")[0][1], json!(0));
        let write = &seen(&host, "LevelChunkSection#setBlockState")[0];
        assert_eq!(&write[1..], &[json!(15), json!(4), json!(1), json!("STONE")]);
    }

    #[test]
    fn test_flagged_write_goes_to_the_chunk() {
        let host = Arc::new(Host::default());
        let world = routines(host.clone(), HeightStyle::InclusiveMax, SectionWrite::ChunkFlags(SKIP_PLACE_FLAGS));
        world
            .set_section_block("world", BlockPos { x: 3, y: 100, z: 3 }, "STONE")
            .unwrap();

        assert!(seen(&host, "LevelChunkSection#setBlockState").is_empty());
        let write = &seen(&host, "LevelChunk#setBlockState")[0];
        assert_eq!(write[1], json!({ "x": 3, "y": 100, "z": 3 }));
        assert_eq!(write[3], json!(512));
    }

    #[test]
    fn test_outside_the_world_is_refused() {
        let host = Arc::new(Host::default());
        let world = routines(host.clone(), CLASSIC_HEIGHT, SectionWrite::Local);
        assert_eq!(
            world.is_section_empty("world", BlockPos { x: 0, y: 256, z: 0 }),
            Err(Fault::OutOfWorld { y: 256, min: 0, max: 256 })
        );
        assert!(seen(&host, "#getChunk").is_empty());
    }

    #[test]
    fn test_chunk_update_carries_the_light_engine() {
        let host = Arc::new(Host::default());
        let world = routines(host.clone(), HeightStyle::InclusiveMax, SectionWrite::Local);
        let player = PlayerRef::new(Uuid::nil(), "Kami");
        assert!(world.is_section_empty("world", BlockPos { x: 0, y: 0, z: 0 }).unwrap());
        world
            .send_chunk_update(&player, "world", ChunkPos { x: 4, z: -2 })
            .unwrap();

        let packet = &seen(&host, "ClientboundLevelChunkWithLightPacket")[0];
        assert_eq!(packet[1], json!({ "handle": "Level#getLightEngine" }));
        assert_eq!(packet.len(), 4);
        assert_eq!(seen(&host, "#send").len(), 1);
    }
}
