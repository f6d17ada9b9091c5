use kaminms_api::{Fault, HostInternals, Revision};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

use crate::symbols::{Internal, Symbols};

/// Host internals as seen by one release: the host plus its symbol names.
///
/// Cheap to clone; every capability routine of a release holds one.
#[derive(Clone)]
pub struct Internals {
    host: Arc<dyn HostInternals>,
    symbols: Arc<Symbols>,
    revision: Revision,
}

impl Internals {
    pub fn new(host: Arc<dyn HostInternals>, symbols: Symbols, revision: Revision) -> Self {
        Internals {
            host,
            symbols: Arc::new(symbols),
            revision,
        }
    }

    pub fn revision(&self) -> &Revision {
        &self.revision
    }

    pub fn symbols(&self) -> &Symbols {
        &self.symbols
    }

    /// Drives `internal` and decodes its result.
    pub fn call<T: DeserializeOwned>(&self, internal: Internal, args: Vec<Value>) -> Result<T, Fault> {
        let (symbol, raw) = self.raw(internal, args)?;
        serde_json::from_value(raw).map_err(|e| Fault::shape(&symbol, e))
    }

    /// Drives `internal` for its side effect; the result is discarded.
    pub fn run(&self, internal: Internal, args: Vec<Value>) -> Result<(), Fault> {
        self.raw(internal, args).map(|_| ())
    }

    /// Resolves the internal handle of a player, entity or world.
    pub fn handle(&self, internal: Internal, subject: Value) -> Result<Value, Fault> {
        self.construct(internal, vec![subject]).map(|(_, handle)| handle)
    }

    /// Drives a constructor, returning the constructed class and its handle.
    pub fn construct(&self, internal: Internal, args: Vec<Value>) -> Result<(String, Value), Fault> {
        let (symbol, handle) = self.raw(internal, args)?;
        if handle.is_null() {
            return Err(Fault::shape(&symbol, "null handle"));
        }
        Ok((symbol, handle))
    }

    fn raw(&self, internal: Internal, args: Vec<Value>) -> Result<(String, Value), Fault> {
        let symbol = self.symbols.resolve(internal)?;
        trace!(revision = %self.revision, symbol = %symbol, "calling host internal");
        let value = self
            .host
            .call(&symbol, args)
            .map_err(|fault| Fault::from_host(&symbol, fault))?;
        Ok((symbol, value))
    }
}

impl fmt::Debug for Internals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Internals")
            .field("revision", &self.revision)
            .field("symbols", &self.symbols)
            .finish()
    }
}

/// Encodes a value for the host seam.
///
/// A value with no JSON form is a shape fault, never a silent `null`.
pub(crate) fn arg<T: serde::Serialize>(value: &T) -> Result<Value, Fault> {
    serde_json::to_value(value).map_err(|e| Fault::shape("<arg>", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kaminms_api::{BlockPos, HostFault};
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Echo {
        seen: Mutex<Vec<(String, Vec<Value>)>>,
    }

    impl HostInternals for Echo {
        fn call(&self, symbol: &str, args: Vec<Value>) -> Result<Value, HostFault> {
            self.seen.lock().unwrap().push((symbol.to_string(), args));
            Ok(json!(true))
        }
    }

    #[test]
    fn test_arg_encodes_plain_values() {
        let pos = BlockPos { x: 1, y: -64, z: 3 };
        assert_eq!(arg(&pos).unwrap(), json!({ "x": 1, "y": -64, "z": 3 }));
        assert_eq!(arg(&Option::<BlockPos>::None).unwrap(), Value::Null);
    }

    #[test]
    fn test_unencodable_arg_is_a_shape_fault() {
        let mut keyed: HashMap<(i32, i32), i32> = HashMap::new();
        keyed.insert((0, 0), 1);
        match arg(&keyed) {
            Err(Fault::UnexpectedShape { symbol, .. }) => assert_eq!(symbol, "<arg>"),
            other => panic!("expected a shape fault, got {:?}", other),
        }
    }

    #[test]
    fn test_call_resolves_symbol_and_decodes() {
        let host = Arc::new(Echo::default());
        let revision = Revision::from_static("v1_20_R3");
        let symbols = Symbols::reobfuscated(&revision, |internal| match internal {
            Internal::ItemDamageable => Some((crate::symbols::Namespace::Nms, "world.item.ItemStack#isDamageableItem")),
            _ => None,
        });
        let internals = Internals::new(host.clone(), symbols, revision);

        let damageable: bool = internals
            .call(Internal::ItemDamageable, vec![json!("sword")])
            .unwrap();
        assert!(damageable);
        let seen = host.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].0.ends_with("world.item.ItemStack#isDamageableItem"));

        assert!(matches!(
            internals.run(Internal::SendPacket, Vec::new()),
            Err(Fault::MissingSymbol { .. })
        ));
    }
}
