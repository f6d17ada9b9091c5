use kaminms_api::{Fault, Location, PlayerRef, Teleporter};
use serde_json::json;

use crate::internals::{arg, Internals};
use crate::symbols::Internal;

/// How the silent teleport primitive takes its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeleportStyle {
    /// `PlayerConnection#teleport(Location)`, world resolved by the host.
    Location,
    /// `internalTeleport(x, y, z, yaw, pitch)` on the target world's handle.
    Coordinates,
}

/// Moves a player through the connection, bypassing the teleport event.
#[derive(Debug)]
pub struct SilentTeleport {
    internals: Internals,
    style: TeleportStyle,
}

impl SilentTeleport {
    pub fn new(internals: Internals, style: TeleportStyle) -> Self {
        Self { internals, style }
    }
}

impl Teleporter for SilentTeleport {
    fn teleport_without_event(&self, player: &PlayerRef, location: &Location) -> Result<(), Fault> {
        let handle = self.internals.handle(Internal::PlayerHandle, arg(player)?)?;
        match self.style {
            TeleportStyle::Location => self
                .internals
                .run(Internal::TeleportSilently, vec![handle, arg(location)?]),
            TeleportStyle::Coordinates => {
                let world = self
                    .internals
                    .handle(Internal::WorldHandle, json!(location.world))?;
                self.internals.run(
                    Internal::TeleportSilently,
                    vec![
                        handle,
                        world,
                        json!([location.x, location.y, location.z, location.yaw, location.pitch]),
                    ],
                )
            }
        }
    }
}
