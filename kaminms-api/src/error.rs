use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::capability::CapabilityGroup;
use crate::version::{Revision, ServerVersion};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    UnsupportedVersion,
    AmbiguousBinding,
    Implementation,
    IncompleteImplementation,
    DuplicateVersion,
    RegistryFrozen,
    UnknownCapability,
    BadArguments,
    Config,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::UnsupportedVersion => "unsupported_version",
            ErrorCode::AmbiguousBinding => "ambiguous_binding",
            ErrorCode::Implementation => "implementation",
            ErrorCode::IncompleteImplementation => "incomplete_implementation",
            ErrorCode::DuplicateVersion => "duplicate_version",
            ErrorCode::RegistryFrozen => "registry_frozen",
            ErrorCode::UnknownCapability => "unknown_capability",
            ErrorCode::BadArguments => "bad_arguments",
            ErrorCode::Config => "config",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionParseError {
    #[error("empty version string")]
    Empty,
    #[error("malformed version string {0:?}")]
    BadComponent(String),
}

/// Failure reported by the host when an internal symbol is driven.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HostFault {
    #[error("internal symbol {symbol} is not present")]
    MissingSymbol { symbol: String },
    #[error("{class}: {message}")]
    Exception { class: String, message: String },
}

/// Why a version implementation could not complete an operation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Fault {
    #[error("internal symbol {symbol} is missing")]
    MissingSymbol { symbol: String },

    #[error("internal symbol {symbol} returned an unexpected shape: {detail}")]
    UnexpectedShape { symbol: String, detail: String },

    #[error("host raised {class} from {symbol}: {message}")]
    HostException {
        symbol: String,
        class: String,
        message: String,
    },

    #[error("{operation} is not available on this release: {reason}")]
    Unsupported {
        operation: &'static str,
        reason: &'static str,
    },

    #[error("packet was built for {built_for}, bound revision is {bound}")]
    ForeignPacket { built_for: Revision, bound: Revision },

    #[error("y={y} is outside the world's build range {min}..{max}")]
    OutOfWorld { y: i32, min: i32, max: i32 },
}

impl Fault {
    pub fn from_host(symbol: &str, fault: HostFault) -> Self {
        match fault {
            HostFault::MissingSymbol { symbol } => Fault::MissingSymbol { symbol },
            HostFault::Exception { class, message } => Fault::HostException {
                symbol: symbol.to_string(),
                class,
                message,
            },
        }
    }

    pub fn shape(symbol: &str, detail: impl fmt::Display) -> Self {
        Fault::UnexpectedShape {
            symbol: symbol.to_string(),
            detail: detail.to_string(),
        }
    }
}

/// The detected host version has no usable binding.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("unsupported server version {raw:?}; supported: {}", join(.supported))]
pub struct UnsupportedVersionError {
    pub raw: String,
    pub supported: Vec<ServerVersion>,
}

/// More than one registry entry claims exact-match priority.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("server version {raw:?} matches several registered versions: {}", join(.candidates))]
pub struct AmbiguousBindingError {
    pub raw: String,
    pub candidates: Vec<ServerVersion>,
}

/// A bound implementation failed mid-call.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{capability} failed on {version}: {cause}")]
pub struct VersionImplementationError {
    pub capability: &'static str,
    pub version: ServerVersion,
    #[source]
    pub cause: Fault,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NmsError {
    #[error(transparent)]
    UnsupportedVersion(#[from] UnsupportedVersionError),

    #[error(transparent)]
    AmbiguousBinding(#[from] AmbiguousBindingError),

    #[error(transparent)]
    Implementation(#[from] VersionImplementationError),

    #[error("{version} does not implement {}", join(.missing))]
    IncompleteImplementation {
        version: ServerVersion,
        missing: Vec<CapabilityGroup>,
    },

    #[error("revision {revision} registered twice")]
    DuplicateVersion { revision: Revision },

    #[error("version registry is frozen; re-registration is not supported")]
    RegistryFrozen,

    #[error("unknown capability {0:?}")]
    UnknownCapability(String),

    #[error("bad arguments for {capability}: {detail}")]
    BadArguments {
        capability: &'static str,
        detail: String,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

impl NmsError {
    pub fn code(&self) -> ErrorCode {
        match self {
            NmsError::UnsupportedVersion(_) => ErrorCode::UnsupportedVersion,
            NmsError::AmbiguousBinding(_) => ErrorCode::AmbiguousBinding,
            NmsError::Implementation(_) => ErrorCode::Implementation,
            NmsError::IncompleteImplementation { .. } => ErrorCode::IncompleteImplementation,
            NmsError::DuplicateVersion { .. } => ErrorCode::DuplicateVersion,
            NmsError::RegistryFrozen => ErrorCode::RegistryFrozen,
            NmsError::UnknownCapability(_) => ErrorCode::UnknownCapability,
            NmsError::BadArguments { .. } => ErrorCode::BadArguments,
            NmsError::Config(_) => ErrorCode::Config,
        }
    }

    /// Errors raised while binding; they are never retried.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            NmsError::Implementation(_)
                | NmsError::UnknownCapability(_)
                | NmsError::BadArguments { .. }
        )
    }
}

pub type NmsResult<T> = Result<T, NmsError>;

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
