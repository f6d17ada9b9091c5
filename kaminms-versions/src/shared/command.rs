use kaminms_api::{CommandMap, CommandSpec, Fault};
use serde_json::json;

use crate::internals::{arg, Internals};
use crate::symbols::Internal;

/// The server's command map, reached through `CraftServer#getCommandMap`.
#[derive(Debug)]
pub struct KnownCommandMap {
    internals: Internals,
}

impl KnownCommandMap {
    pub fn new(internals: Internals) -> Self {
        Self { internals }
    }
}

impl CommandMap for KnownCommandMap {
    fn register_command(&self, command: &CommandSpec) -> Result<bool, Fault> {
        let known = self.known_commands()?;
        let prefixed = format!("{}:{}", command.prefix.to_lowercase(), command.name.to_lowercase());
        if known.iter().any(|name| *name == prefixed) {
            return Ok(false);
        }
        self.internals.call(
            Internal::CommandMapRegister,
            vec![json!(command.prefix), arg(command)?],
        )
    }

    fn unregister_command(&self, name: &str) -> Result<bool, Fault> {
        self.internals
            .call(Internal::CommandMapUnregister, vec![json!(name.to_lowercase())])
    }

    fn known_commands(&self) -> Result<Vec<String>, Fault> {
        let mut names: Vec<String> = self.internals.call(Internal::CommandMapKnown, vec![])?;
        names.sort();
        Ok(names)
    }
}
