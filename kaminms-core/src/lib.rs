//! Runtime binding of the KamiCommon NMS layer.
//!
//! [`NmsFacade`] detects the running server once, binds the matching version
//! implementation from the [`VersionRegistry`] and forwards every capability
//! call to it.
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use kaminms_core::{NmsConfig, NmsFacade};
//! # fn demo(probe: Arc<dyn kaminms_api::HostProbe>, host: Arc<dyn kaminms_api::HostInternals>) -> kaminms_api::NmsResult<()> {
//! let nms = NmsFacade::with_default_registry(NmsConfig::from_env()?, probe, host)?;
//! let key = nms.namespaced(&kaminms_api::Enchantment::new("DAMAGE_ALL"))?;
//! # let _ = key;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod detector;
pub mod facade;
pub mod logging;
pub mod registry;

pub use config::{MarkerProbe, NmsConfig, ALLOW_FALLBACK_ENV};
pub use detector::{DetectedSignature, Detection, MatchKind, VersionDetector};
pub use facade::{NmsFacade, ResolvedBinding};
pub use logging::{init_logging, init_test_logging, plugin_span, LogSettings};
pub use registry::{default_registry, RegistryBuilder, VersionRegistry};

pub use kaminms_api as api;
