use kaminms_api::{
    AmbiguousBindingError, HostFlavor, HostProbe, NmsResult, Release, Revision, ServerVersion,
    UnsupportedVersionError,
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::NmsConfig;
use crate::registry::VersionRegistry;

/// What the host said about itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetectedSignature {
    /// The raw Bukkit version string, e.g. `1.20.4-R0.1-SNAPSHOT`.
    pub raw: String,
    pub release: Option<Release>,
    pub revision_hint: Option<Revision>,
    pub flavor: HostFlavor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchKind {
    Exact,
    /// Bound to an older release of the same major line.
    Fallback { detected: Release },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub version: ServerVersion,
    pub signature: DetectedSignature,
    pub kind: MatchKind,
}

/// Maps the running host onto one registered version.
pub struct VersionDetector<'a> {
    registry: &'a VersionRegistry,
    config: &'a NmsConfig,
}

impl<'a> VersionDetector<'a> {
    pub fn new(registry: &'a VersionRegistry, config: &'a NmsConfig) -> Self {
        VersionDetector { registry, config }
    }

    pub fn signature(&self, probe: &dyn HostProbe) -> DetectedSignature {
        let raw = probe.bukkit_version();
        let release = raw.parse::<Release>().ok();
        let revision_hint = probe
            .craftbukkit_package()
            .and_then(|package| Revision::from_craftbukkit_package(&package))
            .or_else(|| {
                self.config
                    .marker_probes
                    .iter()
                    .find(|marker| probe.has_type(&marker.type_name))
                    .map(|marker| marker.revision.clone())
            });
        DetectedSignature {
            raw,
            release,
            revision_hint,
            flavor: HostFlavor::from_server_name(&probe.server_name()),
        }
    }

    pub fn detect(&self, probe: &dyn HostProbe) -> NmsResult<Detection> {
        let signature = self.signature(probe);
        debug!(
            raw = %signature.raw,
            revision_hint = ?signature.revision_hint,
            flavor = %signature.flavor,
            "detecting server version"
        );

        // A registered revision named by the package or a marker type wins
        // over release coverage, and needs no parsable release.
        if let Some(module) = signature
            .revision_hint
            .as_ref()
            .and_then(|hint| self.registry.by_revision(hint))
        {
            let version = module.version();
            debug!(bound = %version, "bound by revision hint");
            return Ok(Detection {
                version,
                signature,
                kind: MatchKind::Exact,
            });
        }

        let Some(release) = signature.release else {
            return Err(self.unsupported(&signature).into());
        };

        let mut candidates: Vec<ServerVersion> = self.registry.covering(release).cloned().collect();
        candidates.sort();

        match candidates.len() {
            1 => {
                let version = candidates.remove(0);
                return Ok(Detection {
                    version,
                    signature,
                    kind: MatchKind::Exact,
                });
            }
            0 => {}
            _ => {
                return Err(AmbiguousBindingError {
                    raw: signature.raw,
                    candidates,
                }
                .into())
            }
        }

        if self.config.allow_fallback {
            let nearest = self
                .registry
                .supported()
                .into_iter()
                .filter(|v| v.release().same_line(&release) && v.release() < release)
                .max();
            if let Some(version) = nearest {
                warn!(detected = %release, bound = %version, "no exact match, falling back");
                return Ok(Detection {
                    version,
                    signature,
                    kind: MatchKind::Fallback { detected: release },
                });
            }
        }

        Err(self.unsupported(&signature).into())
    }

    fn unsupported(&self, signature: &DetectedSignature) -> UnsupportedVersionError {
        UnsupportedVersionError {
            raw: signature.raw.clone(),
            supported: self.registry.supported(),
        }
    }
}
