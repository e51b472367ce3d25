use std::path::PathBuf;

/// An error that can occur when constructing a [`crate::PythonFinder`].
///
/// Discovery itself never fails: unreadable directories, broken executables
/// and malformed versions are skipped, and a version that cannot be found is
/// reported as `None` rather than an error.
#[derive(Debug, thiserror::Error)]
pub enum FinderError {
    /// An explicitly configured version manager root is not a directory.
    /// Roots that are merely auto-detected disable the version manager scan
    /// instead of failing.
    #[error("the version manager root {} is not a directory", .0.display())]
    InvalidPyenvRoot(PathBuf),
}
