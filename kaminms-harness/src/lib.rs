//! Test support for the KamiCommon NMS layer.
//!
//! - [`ScriptedHost`]: a `HostInternals` that answers from rules and logs every call.
//! - [`ScriptedProbe`]: a `HostProbe` with fixed answers.
//! - [`RecordingImplementation`]: a version implementation that counts forwards.
//! - [`run_contract`]: drives every capability of a version module against scripted hosts.

pub mod contract;
pub mod fixtures;
pub mod host;
pub mod probe;
pub mod recording;

pub use contract::{run_contract, ContractReport, ContractViolation};
pub use host::{HostCall, ScriptedHost};
pub use probe::ScriptedProbe;
pub use recording::{RecordingImplementation, RecordingModule};
