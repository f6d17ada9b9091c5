// Registry of version modules, keyed by server version.
// Populated once at startup, read-only once built.

use kaminms_api::{NmsError, NmsResult, Release, Revision, ServerVersion, VersionModule};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Collects version modules before the registry is frozen.
#[derive(Clone, Default)]
pub struct RegistryBuilder {
    entries: BTreeMap<ServerVersion, Arc<dyn VersionModule>>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one module; a revision may be registered only once.
    pub fn register(&mut self, module: Arc<dyn VersionModule>) -> NmsResult<&mut Self> {
        let version = module.version();
        if self
            .entries
            .keys()
            .any(|existing| existing.revision() == version.revision())
        {
            return Err(NmsError::DuplicateVersion {
                revision: version.revision().clone(),
            });
        }
        debug!(version = %version, covers = module.covers().len(), "registered version module");
        self.entries.insert(version, module);
        Ok(self)
    }

    pub fn register_all(
        &mut self,
        modules: impl IntoIterator<Item = Arc<dyn VersionModule>>,
    ) -> NmsResult<&mut Self> {
        for module in modules {
            self.register(module)?;
        }
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn build(self) -> VersionRegistry {
        VersionRegistry {
            entries: self.entries,
        }
    }
}

/// Frozen registry of every supported server version.
#[derive(Clone)]
pub struct VersionRegistry {
    entries: BTreeMap<ServerVersion, Arc<dyn VersionModule>>,
}

impl VersionRegistry {
    pub fn get(&self, version: &ServerVersion) -> Option<&Arc<dyn VersionModule>> {
        self.entries.get(version)
    }

    pub fn by_revision(&self, revision: &Revision) -> Option<&Arc<dyn VersionModule>> {
        self.entries
            .iter()
            .find(|(version, _)| version.revision() == revision)
            .map(|(_, module)| module)
    }

    /// Entries that declare `release` among the releases they cover.
    pub fn covering(&self, release: Release) -> impl Iterator<Item = &ServerVersion> + '_ {
        self.entries
            .iter()
            .filter(move |(_, module)| module.covers().contains(&release))
            .map(|(version, _)| version)
    }

    /// Every registered version, oldest first.
    pub fn supported(&self) -> Vec<ServerVersion> {
        self.entries.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ServerVersion, &Arc<dyn VersionModule>)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for VersionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.keys()).finish()
    }
}

impl fmt::Debug for RegistryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.keys()).finish()
    }
}

/// A builder holding every release this crate was compiled with.
pub fn default_registry() -> NmsResult<RegistryBuilder> {
    let mut builder = RegistryBuilder::new();
    builder.register_all(kaminms_versions::modules())?;
    Ok(builder)
}
