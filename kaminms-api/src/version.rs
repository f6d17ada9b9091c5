use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::VersionParseError;

/// A Minecraft release number such as `1.20.4`.
///
/// `1.21` parses as `1.21.0`. Any suffix after the first `-` is ignored, so
/// the raw Bukkit version (`1.20.4-R0.1-SNAPSHOT`) parses directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Release {
    pub major: u16,
    pub minor: u16,
    pub patch: u16,
}

impl Release {
    pub const fn new(major: u16, minor: u16, patch: u16) -> Self {
        Release {
            major,
            minor,
            patch,
        }
    }

    /// The major line, e.g. `(1, 20)` for every `1.20.x` release.
    pub fn line(&self) -> (u16, u16) {
        (self.major, self.minor)
    }

    pub fn same_line(&self, other: &Release) -> bool {
        self.line() == other.line()
    }

    /// Legacy comparable integer: one digit major, two digits minor, one digit patch.
    ///
    /// `1.8.9` is `1089`, `1.20.4` is `1204`.
    pub fn formatted(&self) -> u32 {
        u32::from(self.major) * 1000 + u32::from(self.minor) * 10 + u32::from(self.patch)
    }
}

impl FromStr for Release {
    type Err = VersionParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let head = raw.trim().split('-').next().unwrap_or_default();
        if head.is_empty() {
            return Err(VersionParseError::Empty);
        }

        let mut parts = head.split('.');
        let mut next = |required: bool| -> Result<u16, VersionParseError> {
            match parts.next() {
                Some(p) => p
                    .parse::<u16>()
                    .map_err(|_| VersionParseError::BadComponent(raw.to_string())),
                None if required => Err(VersionParseError::BadComponent(raw.to_string())),
                None => Ok(0),
            }
        };

        let major = next(true)?;
        let minor = next(true)?;
        let patch = next(false)?;
        if parts.next().is_some() {
            return Err(VersionParseError::BadComponent(raw.to_string()));
        }
        Ok(Release::new(major, minor, patch))
    }
}

impl fmt::Display for Release {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.patch == 0 {
            write!(f, "{}.{}", self.major, self.minor)
        } else {
            write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
        }
    }
}

/// Internal revision tag of a host release (`v1_8_R3`, `v1_20_CB`, `latest`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Revision(Cow<'static, str>);

impl Revision {
    pub const fn from_static(tag: &'static str) -> Self {
        Revision(Cow::Borrowed(tag))
    }

    pub fn new(tag: impl Into<String>) -> Self {
        Revision(Cow::Owned(tag.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Extracts the revision from a CraftBukkit package name.
    ///
    /// `org.bukkit.craftbukkit.v1_8_R3` yields `v1_8_R3`; the relocated-less
    /// package of modern Paper (`org.bukkit.craftbukkit`) yields `None`.
    pub fn from_craftbukkit_package(package: &str) -> Option<Self> {
        let last = package.rsplit('.').next()?;
        let mut pieces = last.split('_');
        let head = pieces.next()?;
        let minor = pieces.next()?;
        let tail = pieces.next()?;
        let valid = head.len() > 1
            && head.starts_with('v')
            && head[1..].chars().all(|c| c.is_ascii_digit())
            && !minor.is_empty()
            && minor.chars().all(|c| c.is_ascii_digit())
            && tail.len() > 1
            && tail.starts_with('R')
            && tail[1..].chars().all(|c| c.is_ascii_digit())
            && pieces.next().is_none();
        valid.then(|| Revision::new(last))
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One supported host release: the release it was built against plus its
/// internal revision tag.
///
/// Ordered by release chronology, then revision.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServerVersion {
    release: Release,
    revision: Revision,
}

impl ServerVersion {
    pub const fn new(release: Release, revision: Revision) -> Self {
        ServerVersion { release, revision }
    }

    pub fn release(&self) -> Release {
        self.release
    }

    pub fn revision(&self) -> &Revision {
        &self.revision
    }
}

impl PartialOrd for ServerVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ServerVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.release
            .cmp(&other.release)
            .then_with(|| self.revision.cmp(&other.revision))
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.release, self.revision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bukkit_version() {
        let release: Release = "1.20.4-R0.1-SNAPSHOT".parse().unwrap();
        assert_eq!(release, Release::new(1, 20, 4));

        let release: Release = "1.21-R0.1-SNAPSHOT".parse().unwrap();
        assert_eq!(release, Release::new(1, 21, 0));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!("".parse::<Release>(), Err(VersionParseError::Empty));
        assert!("1".parse::<Release>().is_err());
        assert!("1.x.2".parse::<Release>().is_err());
        assert!("1.2.3.4".parse::<Release>().is_err());
    }

    #[test]
    fn test_formatted_integer() {
        assert_eq!(Release::new(1, 8, 9).formatted(), 1089);
        assert_eq!(Release::new(1, 13, 2).formatted(), 1132);
        assert_eq!(Release::new(1, 21, 0).formatted(), 1210);
    }

    #[test]
    fn test_display_omits_zero_patch() {
        assert_eq!(Release::new(1, 21, 0).to_string(), "1.21");
        assert_eq!(Release::new(1, 8, 8).to_string(), "1.8.8");
    }

    #[test]
    fn test_revision_from_package() {
        assert_eq!(
            Revision::from_craftbukkit_package("org.bukkit.craftbukkit.v1_8_R3"),
            Some(Revision::from_static("v1_8_R3"))
        );
        assert_eq!(Revision::from_craftbukkit_package("org.bukkit.craftbukkit"), None);
        assert_eq!(Revision::from_craftbukkit_package("v1_20"), None);
        assert_eq!(Revision::from_craftbukkit_package("org.bukkit.craftbukkit.v1_20_CB"), None);
    }

    #[test]
    fn test_server_version_ordering() {
        let older = ServerVersion::new(Release::new(1, 8, 8), Revision::from_static("v1_8_R3"));
        let newer = ServerVersion::new(Release::new(1, 9, 2), Revision::from_static("v1_9_R1"));
        assert!(older < newer);
        assert_eq!(older.to_string(), "1.8.8 (v1_8_R3)");
    }
}
