use dashmap::DashMap;
use kaminms_api::{HostFault, HostInternals};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

/// One call the host received.
#[derive(Debug, Clone, PartialEq)]
pub struct HostCall {
    pub symbol: String,
    pub args: Vec<Value>,
}

#[derive(Debug, Clone)]
enum Response {
    Value(Value),
    Missing,
    Throw { class: String, message: String },
}

/// A host whose answers are scripted by symbol suffix.
///
/// Rules are checked newest first; the first whose pattern ends the symbol
/// answers. Symbols with no rule return a constructed object when they name a
/// class (no `#`) and `null` otherwise.
#[derive(Debug, Default)]
pub struct ScriptedHost {
    rules: RwLock<Vec<(String, Response)>>,
    calls: DashMap<u64, HostCall>,
    seq: AtomicU64,
    deny_all: bool,
}

impl ScriptedHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers every symbol the bundled versions use with a well-formed value.
    pub fn permissive() -> Self {
        Self::new()
            .on("#getHandle", json!({ "handle": true }))
            .on("#getKey", json!("sharpness"))
            .on("#getColor", json!({ "r": 255, "g": 170, "b": 0 }))
            .on("#getHand", json!("HAND"))
            .on("#getName", json!("item.minecraft.stone"))
            .on("#getDescriptionId", json!("item.minecraft.stone"))
            .on("Damageable", json!(true))
            .on("#length", json!(1.8))
            .on("#getHeight", json!(1.8))
            .on("#getBbHeight", json!(1.8))
            .on("#width", json!(0.6))
            .on("#getWidth", json!(0.6))
            .on("#getBbWidth", json!(0.6))
            .on("nownCommands", json!(["minecraft:help"]))
            .on("#register", json!(true))
            .on(".remove", json!(true))
            .on("#getChunkAt", json!({ "chunk": true }))
            .on("#getChunk", json!({ "chunk": true }))
            .on("#getSections", json!({ "section": true }))
            .on("#getSection", json!({ "section": true }))
            .on("ChunkSection#a", json!(false))
            .on("ChunkSection#c", json!(false))
            .on("#hasOnlyAir", json!(false))
            .on("#getMinBuildHeight", json!(-64))
            .on("#getMaxBuildHeight", json!(320))
            .on("#getMinY", json!(-64))
            .on("#getMaxY", json!(319))
            .on("#getLightEngine", json!({ "light": true }))
            .on("#toString", json!("{id:\"minecraft:diamond_sword\",Count:1b}"))
    }

    /// Every call fails with a missing symbol.
    pub fn denying() -> Self {
        ScriptedHost {
            deny_all: true,
            ..Self::default()
        }
    }

    pub fn on(self, suffix: &str, value: Value) -> Self {
        self.push(suffix, Response::Value(value));
        self
    }

    pub fn missing(self, suffix: &str) -> Self {
        self.push(suffix, Response::Missing);
        self
    }

    pub fn throwing(self, suffix: &str, class: &str, message: &str) -> Self {
        self.push(
            suffix,
            Response::Throw {
                class: class.to_string(),
                message: message.to_string(),
            },
        );
        self
    }

    fn push(&self, suffix: &str, response: Response) {
        let mut rules = self.rules.write().unwrap_or_else(|e| e.into_inner());
        rules.push((suffix.to_string(), response));
    }

    /// Every call so far, in arrival order.
    pub fn calls(&self) -> Vec<HostCall> {
        let mut calls: Vec<(u64, HostCall)> = self
            .calls
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();
        calls.sort_by_key(|(seq, _)| *seq);
        calls.into_iter().map(|(_, call)| call).collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.len()
    }

    pub fn calls_to(&self, suffix: &str) -> usize {
        self.calls
            .iter()
            .filter(|entry| entry.value().symbol.ends_with(suffix))
            .count()
    }

    pub fn clear(&self) {
        self.calls.clear();
    }

    fn respond(&self, symbol: &str) -> Response {
        if self.deny_all {
            return Response::Missing;
        }
        let rules = self.rules.read().unwrap_or_else(|e| e.into_inner());
        if let Some((_, response)) = rules.iter().rev().find(|(suffix, _)| symbol.ends_with(suffix.as_str())) {
            return response.clone();
        }
        if symbol.contains('#') {
            Response::Value(Value::Null)
        } else {
            Response::Value(json!({ "constructed": symbol }))
        }
    }
}

impl HostInternals for ScriptedHost {
    fn call(&self, symbol: &str, args: Vec<Value>) -> Result<Value, HostFault> {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst);
        self.calls.insert(
            seq,
            HostCall {
                symbol: symbol.to_string(),
                args,
            },
        );
        match self.respond(symbol) {
            Response::Value(value) => Ok(value),
            Response::Missing => Err(HostFault::MissingSymbol {
                symbol: symbol.to_string(),
            }),
            Response::Throw { class, message } => Err(HostFault::Exception { class, message }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newest_rule_wins() {
        let host = ScriptedHost::new()
            .on("#getKey", json!("old"))
            .on("#getKey", json!("new"));
        assert_eq!(host.call("a.B#getKey", vec![]).unwrap(), json!("new"));
    }

    #[test]
    fn test_defaults_and_log() {
        let host = ScriptedHost::new().missing("#gone");
        assert_eq!(host.call("a.B#member", vec![json!(1)]).unwrap(), Value::Null);
        assert_eq!(
            host.call("a.Packet", vec![]).unwrap(),
            json!({ "constructed": "a.Packet" })
        );
        assert!(matches!(
            host.call("a.B#gone", vec![]),
            Err(HostFault::MissingSymbol { .. })
        ));

        let calls = host.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0].args, vec![json!(1)]);
        assert_eq!(host.calls_to("#gone"), 1);
    }

    #[test]
    fn test_permissive_answers_chunk_access() {
        let host = ScriptedHost::permissive();
        assert_eq!(
            host.call("net.minecraft.world.level.Level#getChunk", vec![]).unwrap(),
            json!({ "chunk": true })
        );
        assert_eq!(
            host.call("net.minecraft.server.v1_8_R3.Chunk#getSections", vec![]).unwrap(),
            json!({ "section": true })
        );
        assert_eq!(host.call("net.minecraft.world.level.Level#getMaxY", vec![]).unwrap(), json!(319));
    }

    #[test]
    fn test_throwing() {
        let host = ScriptedHost::new().throwing("#boom", "java.lang.IllegalStateException", "nope");
        match host.call("x.Y#boom", vec![]) {
            Err(HostFault::Exception { class, .. }) => assert_eq!(class, "java.lang.IllegalStateException"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
