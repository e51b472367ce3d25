//! The enumeration strategies that produce interpreter candidates.
//!
//! Each strategy inspects one kind of installation source and returns the
//! interpreters it can see as [`Candidate`](pyfinder_types::Candidate)
//! values. Strategies never fail: sources that are absent or unreadable
//! simply contribute nothing. Deciding which candidate wins a version key is
//! not their concern; that happens when the candidates are registered in a
//! [`VersionRegistry`](crate::VersionRegistry).

mod path_crawl;
mod pyenv;
#[cfg(windows)]
mod windows;

pub use path_crawl::crawl_search_path;
pub use pyenv::scan_pyenv_root;
#[cfg(windows)]
pub use windows::scan_windows_registry;
