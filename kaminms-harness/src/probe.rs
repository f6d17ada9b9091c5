use kaminms_api::{HostProbe, Revision, ServerVersion};
use std::sync::atomic::{AtomicUsize, Ordering};

/// A host probe with fixed answers. Counts how often the version was read.
#[derive(Debug, Default)]
pub struct ScriptedProbe {
    bukkit_version: String,
    server_name: String,
    package: Option<String>,
    types: Vec<String>,
    reads: AtomicUsize,
}

impl ScriptedProbe {
    pub fn new(bukkit_version: impl Into<String>) -> Self {
        ScriptedProbe {
            bukkit_version: bukkit_version.into(),
            server_name: "CraftBukkit".to_string(),
            ..Default::default()
        }
    }

    /// What a host built for `version` reports: a snapshot version string,
    /// plus a versioned package when the revision looks like one.
    pub fn for_version(version: &ServerVersion) -> Self {
        let package = format!("org.bukkit.craftbukkit.{}", version.revision());
        let versioned = Revision::from_craftbukkit_package(&package).is_some();
        let probe = Self::new(format!("{}-R0.1-SNAPSHOT", version.release()));
        if versioned {
            probe.with_package(package)
        } else {
            probe.with_package("org.bukkit.craftbukkit")
        }
    }

    pub fn with_server_name(mut self, name: impl Into<String>) -> Self {
        self.server_name = name.into();
        self
    }

    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.types.push(type_name.into());
        self
    }

    /// How many times `bukkit_version` was read.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl HostProbe for ScriptedProbe {
    fn bukkit_version(&self) -> String {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.bukkit_version.clone()
    }

    fn server_name(&self) -> String {
        self.server_name.clone()
    }

    fn craftbukkit_package(&self) -> Option<String> {
        self.package.clone()
    }

    fn has_type(&self, type_name: &str) -> bool {
        self.types.iter().any(|t| t == type_name)
    }
}
