use kaminms_api::{EntityRef, Fault, NmsPacket, PacketHandler, PlayerRef};
use serde_json::{json, Value};

use crate::internals::{arg, Internals};
use crate::symbols::Internal;

#[derive(Debug)]
pub struct PacketRoutines {
    internals: Internals,
}

impl PacketRoutines {
    pub fn new(internals: Internals) -> Self {
        Self { internals }
    }

    fn build(&self, internal: Internal, args: Vec<Value>) -> Result<NmsPacket, Fault> {
        let (class, handle) = self.internals.construct(internal, args)?;
        Ok(NmsPacket::built(self.internals.revision().clone(), class, handle))
    }
}

impl PacketHandler for PacketRoutines {
    fn destroy_entities(&self, ids: &[EntityRef]) -> Result<NmsPacket, Fault> {
        let ids: Vec<i32> = ids.iter().map(|id| id.0).collect();
        self.build(Internal::EntityDestroyPacket, vec![json!(ids)])
    }

    fn entity_status(&self, entity: EntityRef, status: i8) -> Result<NmsPacket, Fault> {
        let handle = self.internals.handle(Internal::EntityHandle, arg(&entity)?)?;
        self.build(Internal::EntityStatusPacket, vec![handle, json!(status)])
    }

    fn send_packet(&self, player: &PlayerRef, packet: &NmsPacket) -> Result<(), Fault> {
        if packet.revision() != self.internals.revision() {
            return Err(Fault::ForeignPacket {
                built_for: packet.revision().clone(),
                bound: self.internals.revision().clone(),
            });
        }
        let handle = self.internals.handle(Internal::PlayerHandle, arg(player)?)?;
        self.internals
            .run(Internal::SendPacket, vec![handle, packet.handle().clone()])
    }
}
