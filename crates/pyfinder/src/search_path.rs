use std::{
    collections::HashMap,
    env,
    ffi::OsStr,
    fs,
    path::{Path, PathBuf},
};

/// Where an extra directory is placed relative to the entries taken from the
/// `PATH` environment variable.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum PathPlacement {
    /// Search the extra directory before everything else.
    #[default]
    Prepend,
    /// Search the extra directory after everything else. In this mode the
    /// directory containing the running executable leads the search order.
    Append,
}

/// An ordered sequence of directories to search for executables, usually
/// taken from the `PATH` environment variable.
///
/// The order is significant and stable for the lifetime of one instance: it
/// defines the precedence used when several directories provide an executable
/// with the same name. Duplicate directories are kept, later duplicates are
/// simply scanned again.
#[derive(Debug, Clone, Default)]
pub struct SearchPath {
    dirs: Vec<PathBuf>,
}

impl SearchPath {
    /// Builds the search order from the `PATH` environment variable. An unset
    /// variable yields an empty search order, which ranks every path equally
    /// instead of failing.
    pub fn from_env() -> SearchPath {
        Self::from_path_var(env::var_os("PATH").unwrap_or_default())
    }

    /// Builds the search order from an explicit `PATH`-style string,
    /// directories joined by the host's path separator. Empty entries are
    /// dropped, they would otherwise rank ahead of every real directory.
    pub fn from_path_var(path: impl AsRef<OsStr>) -> SearchPath {
        SearchPath {
            dirs: env::split_paths(&path)
                .filter(|dir| !dir.as_os_str().is_empty())
                .collect(),
        }
    }

    /// Places `dir` ahead of every directory currently in the search order.
    #[must_use]
    pub fn prepend(mut self, dir: impl Into<PathBuf>) -> SearchPath {
        self.dirs.insert(0, dir.into());
        self
    }

    /// Places `dir` after every directory currently in the search order.
    #[must_use]
    pub fn append(mut self, dir: impl Into<PathBuf>) -> SearchPath {
        self.dirs.push(dir.into());
        self
    }

    /// The directories in search order.
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// The precedence rank of `path`: the position of the first directory in
    /// the search order that is a prefix of `path`. Paths below no configured
    /// directory rank after everything, so a resolvable path always beats an
    /// unresolvable one.
    pub fn index_of(&self, path: &Path) -> usize {
        self.dirs
            .iter()
            .position(|dir| path.starts_with(dir))
            .unwrap_or(self.dirs.len() + 1)
    }
}

/// A mapping from executable name to the first matching file on a
/// [`SearchPath`], built by scanning every directory once.
///
/// Every file passing the executable-or-readable check is recorded under its
/// file name and, when different, under its file name with the last extension
/// removed. The first match in search order wins and is never replaced.
#[derive(Debug, Default)]
pub struct ExecutableIndex {
    by_name: HashMap<String, PathBuf>,
}

impl ExecutableIndex {
    /// Scans every directory of the search order once. Directories that
    /// cannot be read are skipped.
    pub fn scan(search_path: &SearchPath) -> ExecutableIndex {
        let mut by_name = HashMap::new();
        for dir in search_path.dirs() {
            let entries = match fs::read_dir(dir) {
                Ok(entries) => entries,
                Err(err) => {
                    tracing::debug!(
                        "skipping unreadable search path directory {}: {}",
                        dir.display(),
                        err
                    );
                    continue;
                }
            };
            for entry in entries.filter_map(Result::ok) {
                let path = entry.path();
                if !is_readable_or_executable(&path) {
                    continue;
                }
                let Some(name) = path.file_name().and_then(OsStr::to_str) else {
                    continue;
                };
                let Some(stem) = path.file_stem().and_then(OsStr::to_str) else {
                    continue;
                };
                if !by_name.contains_key(name) {
                    by_name.insert(name.to_owned(), path.clone());
                }
                if stem != name && !by_name.contains_key(stem) {
                    by_name.insert(stem.to_owned(), path);
                }
            }
        }
        ExecutableIndex { by_name }
    }

    /// Looks up an executable by name, either the full file name or the name
    /// without its last extension.
    pub fn lookup(&self, name: &str) -> Option<&Path> {
        self.by_name.get(name).map(PathBuf::as_path)
    }

    /// The number of names in the index.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Returns true if the index contains no names.
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// Returns true if `path` is a file the current user could plausibly execute.
#[cfg(unix)]
pub(crate) fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// Returns true if `path` is a file the current user could plausibly execute.
#[cfg(not(unix))]
pub(crate) fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Returns true if `path` names something other than a directory with at
/// least one read or execute bit set.
#[cfg(unix)]
fn is_readable_or_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path)
        .map(|meta| !meta.is_dir() && meta.permissions().mode() & 0o555 != 0)
        .unwrap_or(false)
}

/// Returns true if `path` names something other than a directory with at
/// least one read or execute bit set.
#[cfg(not(unix))]
fn is_readable_or_executable(path: &Path) -> bool {
    fs::metadata(path).map(|meta| !meta.is_dir()).unwrap_or(false)
}
