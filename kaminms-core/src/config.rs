use kaminms_api::{NmsError, NmsResult, Revision};
use serde::{Deserialize, Serialize};

pub const ALLOW_FALLBACK_ENV: &str = "KAMINMS_ALLOW_FALLBACK";

/// A host type whose presence pins the revision when the package name cannot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerProbe {
    pub type_name: String,
    pub revision: Revision,
}

impl MarkerProbe {
    pub fn new(type_name: impl Into<String>, revision: Revision) -> Self {
        MarkerProbe {
            type_name: type_name.into(),
            revision,
        }
    }
}

/// Resolution settings, fixed before the first capability call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NmsConfig {
    /// Bind the nearest older version of the same major line when nothing matches exactly.
    pub allow_fallback: bool,
    /// Checked in order; the first present type supplies the revision hint.
    pub marker_probes: Vec<MarkerProbe>,
    /// Log context only.
    pub plugin_name: String,
}

impl Default for NmsConfig {
    fn default() -> Self {
        NmsConfig {
            allow_fallback: false,
            marker_probes: Vec::new(),
            plugin_name: "KamiCommon".to_string(),
        }
    }
}

impl NmsConfig {
    pub fn from_json(raw: &str) -> NmsResult<Self> {
        serde_json::from_str(raw).map_err(|e| NmsError::Config(e.to_string()))
    }

    /// Defaults overridden by `KAMINMS_ALLOW_FALLBACK`.
    pub fn from_env() -> NmsResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> NmsResult<Self> {
        let mut config = NmsConfig::default();
        if let Some(raw) = lookup(ALLOW_FALLBACK_ENV) {
            config.allow_fallback = parse_flag(&raw).ok_or_else(|| {
                NmsError::Config(format!("{} must be a boolean, got {:?}", ALLOW_FALLBACK_ENV, raw))
            })?;
        }
        Ok(config)
    }

    pub fn with_fallback(mut self, allow: bool) -> Self {
        self.allow_fallback = allow;
        self
    }

    pub fn with_probe(mut self, probe: MarkerProbe) -> Self {
        self.marker_probes.push(probe);
        self
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
