use kaminms_api::{BlockPos, BlockUtil, Fault, PlaceType};
use serde_json::json;

use crate::internals::{arg, Internals};
use crate::symbols::Internal;

/// Block placement at the depth the caller picks.
///
/// `Nms` and `Section` writes resolve the world handle first.
#[derive(Debug)]
pub struct FastBlocks {
    internals: Internals,
}

impl FastBlocks {
    pub fn new(internals: Internals) -> Self {
        Self { internals }
    }
}

impl BlockUtil for FastBlocks {
    fn set_block_fast(
        &self,
        world: &str,
        pos: BlockPos,
        material: &str,
        place: PlaceType,
    ) -> Result<(), Fault> {
        match place {
            PlaceType::Bukkit => self.internals.run(
                Internal::SetBlockBukkit,
                vec![json!(world), arg(&pos)?, json!(material)],
            ),
            PlaceType::Nms | PlaceType::Section => {
                let handle = self.internals.handle(Internal::WorldHandle, json!(world))?;
                let internal = if place == PlaceType::Nms {
                    Internal::SetBlockNms
                } else {
                    Internal::SetBlockSection
                };
                self.internals
                    .run(internal, vec![handle, arg(&pos)?, json!(material)])
            }
        }
    }
}
