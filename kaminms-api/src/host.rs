//! The two seams between this library and the running server.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::HostFault;

/// Read-only version signals the host exposes at startup.
pub trait HostProbe: Send + Sync {
    /// Bukkit version string, e.g. `1.20.4-R0.1-SNAPSHOT`.
    fn bukkit_version(&self) -> String;

    /// Server brand as reported by the host (`Paper`, `WineSpigot`, ...).
    fn server_name(&self) -> String;

    /// Package of the running CraftBukkit server class.
    ///
    /// Versioned (`org.bukkit.craftbukkit.v1_8_R3`) up to 1.20.4, bare on
    /// Mojang-mapped Paper.
    fn craftbukkit_package(&self) -> Option<String>;

    /// Whether an internal marker type can be resolved in the host.
    fn has_type(&self, type_name: &str) -> bool;
}

/// The host's internal API, addressed by symbol.
///
/// A symbol is `<class>#<member>` in whatever naming scheme the running
/// release uses. Version implementations are the only callers.
pub trait HostInternals: Send + Sync {
    fn call(&self, symbol: &str, args: Vec<Value>) -> Result<Value, HostFault>;
}

/// Server brand, used for diagnostics and brand-specific quirks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HostFlavor {
    CraftBukkit,
    Spigot,
    Paper,
    WineSpigot,
    Other,
}

impl HostFlavor {
    pub fn from_server_name(name: &str) -> Self {
        match name.trim() {
            "CraftBukkit" => HostFlavor::CraftBukkit,
            "Spigot" => HostFlavor::Spigot,
            "Paper" | "Folia" | "Purpur" => HostFlavor::Paper,
            "WineSpigot" => HostFlavor::WineSpigot,
            _ => HostFlavor::Other,
        }
    }
}

impl fmt::Display for HostFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HostFlavor::CraftBukkit => "CraftBukkit",
            HostFlavor::Spigot => "Spigot",
            HostFlavor::Paper => "Paper",
            HostFlavor::WineSpigot => "WineSpigot",
            HostFlavor::Other => "other",
        };
        f.write_str(s)
    }
}
