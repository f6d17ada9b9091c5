use kaminms_api::{HostInternals, Release, Revision, ServerVersion, VersionImplementation, VersionModule};
use std::sync::Arc;
use tracing::debug;

use crate::suite::VersionSuite;

/// Builds the implementation of one release against a host.
pub type Assemble = fn(&ServerVersion, Arc<dyn HostInternals>) -> VersionSuite;

/// One row of a family's release table.
pub(crate) struct ReleaseRow {
    pub revision: &'static str,
    pub covers: &'static [(u16, u16, u16)],
}

/// A registrable release: its version, the releases it covers and how to build it.
pub struct ReleaseModule {
    version: ServerVersion,
    covers: Vec<Release>,
    assemble: Assemble,
}

impl ReleaseModule {
    pub fn new(version: ServerVersion, covers: Vec<Release>, assemble: Assemble) -> Self {
        ReleaseModule {
            version,
            covers,
            assemble,
        }
    }

    /// Modules for every row of a family table; each row's version is its newest covered release.
    pub(crate) fn from_rows(rows: &[ReleaseRow], assemble: Assemble) -> Vec<Arc<dyn VersionModule>> {
        rows.iter()
            .filter_map(|row| {
                let covers: Vec<Release> = row
                    .covers
                    .iter()
                    .map(|&(major, minor, patch)| Release::new(major, minor, patch))
                    .collect();
                let newest = covers.iter().max().copied()?;
                let version = ServerVersion::new(newest, Revision::from_static(row.revision));
                Some(Arc::new(ReleaseModule::new(version, covers, assemble)) as Arc<dyn VersionModule>)
            })
            .collect()
    }
}

impl VersionModule for ReleaseModule {
    fn version(&self) -> ServerVersion {
        self.version.clone()
    }

    fn covers(&self) -> &[Release] {
        &self.covers
    }

    fn instantiate(&self, host: Arc<dyn HostInternals>) -> Arc<dyn VersionImplementation> {
        debug!(version = %self.version, "instantiating version implementation");
        Arc::new((self.assemble)(&self.version, host))
    }
}
