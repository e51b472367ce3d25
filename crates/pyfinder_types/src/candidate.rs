use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{Architecture, PythonVersion};

/// A single interpreter discovered on the system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// The path to the interpreter executable.
    pub executable: PathBuf,

    /// The version string exactly as reported by the interpreter or by the
    /// installation metadata it was discovered through.
    pub reported: String,

    /// The parsed form of `reported`.
    pub version: PythonVersion,

    /// The architecture the interpreter was built for.
    pub architecture: Architecture,

    /// The discovery mechanism that produced this candidate.
    pub origin: DiscoveryOrigin,
}

/// The discovery mechanism through which an interpreter was found.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryOrigin {
    /// Found by crawling the directories of the search path.
    PathCrawl,
    /// Found in a version manager's `versions` directory.
    Pyenv,
    /// Found in the Windows installation registry.
    WindowsRegistry,
}

impl DiscoveryOrigin {
    /// The short name used in human readable listings.
    pub fn as_str(self) -> &'static str {
        match self {
            DiscoveryOrigin::PathCrawl => "path",
            DiscoveryOrigin::Pyenv => "pyenv",
            DiscoveryOrigin::WindowsRegistry => "registry",
        }
    }
}

impl std::fmt::Display for DiscoveryOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
