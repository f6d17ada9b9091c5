//! Version implementations of the KamiCommon NMS capability contracts.
//!
//! Releases are grouped into families by how the host names its internals.
//! Each family is a cargo feature; [`modules`] returns every release of the
//! enabled families, ready to be registered with the facade.

pub mod internals;
pub mod module;
pub mod shared;
pub mod suite;
pub mod symbols;

#[cfg(feature = "flattened")]
pub mod flattened;
#[cfg(feature = "legacy")]
pub mod legacy;
#[cfg(feature = "mojang")]
pub mod mojang;
#[cfg(feature = "remapped")]
pub mod remapped;

use kaminms_api::VersionModule;
use std::sync::Arc;

pub use internals::Internals;
pub use module::{Assemble, ReleaseModule};
pub use suite::{SuiteBuilder, VersionSuite};
pub use symbols::{Internal, Mapping, Namespace, SymbolTable, Symbols};

/// Every release of every enabled family, oldest first.
pub fn modules() -> Vec<Arc<dyn VersionModule>> {
    #[allow(unused_mut)]
    let mut all: Vec<Arc<dyn VersionModule>> = Vec::new();
    #[cfg(feature = "legacy")]
    all.extend(legacy::modules());
    #[cfg(feature = "flattened")]
    all.extend(flattened::modules());
    #[cfg(feature = "remapped")]
    all.extend(remapped::modules());
    #[cfg(feature = "mojang")]
    all.extend(mojang::modules());
    all
}

#[cfg(test)]
#[cfg(all(feature = "legacy", feature = "flattened", feature = "remapped", feature = "mojang"))]
mod tests {
    use super::*;
    use kaminms_api::Release;
    use std::collections::HashSet;

    #[test]
    fn test_revisions_are_unique() {
        let modules = modules();
        let revisions: HashSet<_> = modules.iter().map(|m| m.version().revision().clone()).collect();
        assert_eq!(revisions.len(), modules.len());
    }

    #[test]
    fn test_modules_are_ordered() {
        let versions: Vec<_> = modules().iter().map(|m| m.version()).collect();
        let mut sorted = versions.clone();
        sorted.sort();
        assert_eq!(versions, sorted);
    }

    #[test]
    fn test_no_release_covered_twice() {
        let mut seen = HashSet::new();
        for module in modules() {
            for release in module.covers() {
                assert!(seen.insert(*release), "{} covered twice", release);
            }
        }
        assert!(seen.contains(&Release::new(1, 8, 8)));
        assert!(seen.contains(&Release::new(1, 20, 6)));
        assert!(!seen.contains(&Release::new(1, 8, 9)));
    }
}
