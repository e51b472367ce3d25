use std::{collections::HashSet, path::Path};

use pyfinder_types::{Architecture, Candidate, DiscoveryOrigin, PythonVersion};

/// Runtime names tried inside a version's `bin` directory when it ships no
/// plain `python` executable.
const ALTERNATE_RUNTIMES: [&str; 4] = ["pypy", "ipy", "jython", "pyston"];

/// Scans the `versions` directory of a pyenv-style installation root.
///
/// Every installed version directory contributes one candidate, reported
/// under the base form of the directory name: a prerelease directory like
/// `3.7.0rc1` is reported as `3.7.0`, and is skipped entirely when a
/// directory for that base version was already collected. Directory names
/// that carry no version information at all, and directories without a
/// recognizable runtime executable, are skipped.
pub fn scan_pyenv_root(root: &Path) -> Vec<Candidate> {
    let versions_dir = root.join("versions");
    let entries = match std::fs::read_dir(&versions_dir) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::debug!("no versions below {}: {}", versions_dir.display(), err);
            return Vec::new();
        }
    };
    let mut installed: Vec<_> = entries.filter_map(Result::ok).map(|e| e.path()).collect();
    installed.sort();

    let mut candidates = Vec::new();
    let mut seen = HashSet::new();
    for version_dir in installed {
        let Some(name) = version_dir.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        let version = match PythonVersion::parse(name) {
            Ok(version) => version,
            Err(err) => {
                tracing::debug!("skipping {}: {}", version_dir.display(), err);
                continue;
            }
        };
        let base = version.base_version();
        if version.is_prerelease() && seen.contains(&base) {
            continue;
        }
        let Some(runtime) = find_runtime(&version_dir) else {
            tracing::debug!("no runtime executable below {}", version_dir.display());
            continue;
        };
        let Ok(parsed) = PythonVersion::parse(&base) else {
            continue;
        };
        candidates.push(Candidate {
            executable: runtime,
            reported: base.clone(),
            version: parsed,
            architecture: Architecture::native(),
            origin: DiscoveryOrigin::Pyenv,
        });
        seen.insert(base);
    }
    candidates
}

/// The runtime executable of an installed version: `bin/python` when
/// present, otherwise the first alternate runtime that exists.
fn find_runtime(version_dir: &Path) -> Option<std::path::PathBuf> {
    let bin_dir = version_dir.join("bin");
    let python = bin_dir.join("python");
    if python.exists() {
        return Some(python);
    }
    ALTERNATE_RUNTIMES
        .iter()
        .map(|runtime| bin_dir.join(runtime))
        .find(|path| path.exists())
}
