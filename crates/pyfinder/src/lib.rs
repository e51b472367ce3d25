#![deny(missing_docs)]

//! A library to discover Python interpreters installed on a system and to
//! resolve ambiguous version requests to concrete executables.
//!
//! Interpreters are found through three discovery mechanisms: crawling the
//! directories of the `PATH`-style search order for interpreter-named
//! executables and asking each one for its version, scanning the `versions`
//! directory of a pyenv-style version manager, and (on Windows) reading the
//! installation registry. Discovered candidates flow into a
//! [`VersionRegistry`] which keeps one winning executable per version key
//! under a search-order precedence rule.
//!
//! The high level entry point is [`PythonFinder`]:
//!
//! ```no_run
//! use pyfinder::{FinderOptions, PythonFinder};
//!
//! let finder = PythonFinder::new(FinderOptions::default())?;
//! if let Some(python) = finder.find_version("3.6", None) {
//!     println!("found {}", python.display());
//! }
//! # Ok::<_, pyfinder::FinderError>(())
//! ```
//!
//! Discovery runs at most once per finder instance, on first use. A fresh
//! instance rescans the system.
//!
//! The lower level building blocks are available for callers that need more
//! control: [`SearchPath`] and [`ExecutableIndex`] implement the generic
//! executable lookup, [`VersionRegistry`] the version keyed precedence cache,
//! and the [`discovery`] module the individual enumeration strategies.

pub mod discovery;
mod error;
mod probe;
mod registry;
mod resolver;
mod search_path;
mod shell;

pub use error::FinderError;
pub use probe::{CommandProbe, VersionProbe};
pub use registry::VersionRegistry;
pub use resolver::{FinderOptions, LineRequest, PythonFinder};
pub use search_path::{ExecutableIndex, PathPlacement, SearchPath};
pub use shell::{detect_shell, detect_shell_of, ShellAncestry};

pub use pyfinder_types::{
    Architecture, Candidate, DiscoveryOrigin, ParseArchitectureError, ParseVersionError,
    PythonVersion,
};
