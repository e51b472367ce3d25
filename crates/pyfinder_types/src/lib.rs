#![deny(missing_docs)]
//! `pyfinder_types` contains the data models used when discovering Python
//! interpreters on a system: permissively parsed interpreter versions, the
//! architecture an interpreter was built for, and records describing a single
//! discovered interpreter. The library itself performs no I/O.

mod architecture;
mod candidate;
mod version;

pub use architecture::{Architecture, ParseArchitectureError};
pub use candidate::{Candidate, DiscoveryOrigin};
pub use version::{
    OpaqueVersion, ParseVersionError, ParseVersionErrorKind, Prerelease, PrereleaseKind,
    PythonVersion, ReleaseVersion,
};
