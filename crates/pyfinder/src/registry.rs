use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use itertools::Itertools;
use pyfinder_types::{Architecture, OpaqueVersion, PythonVersion, ReleaseVersion};

use crate::SearchPath;

/// A cache of discovered interpreters keyed by version.
///
/// Versions that fully decompose ([`PythonVersion::Release`]) become precise
/// entries: they hold the exact-version slot, the per-architecture sub-map
/// and the reverse path map, and their raw version string is filed under the
/// `major` and `major.minor` series of the release. Irregular versions
/// ([`PythonVersion::Opaque`]) become loose entries that only touch the
/// reverse map and whatever series their leading digits allow.
///
/// Which path holds a contested slot is decided by the precedence rule of
/// [`SearchPath::index_of`]: the path ranked earliest in the search order
/// wins. Equal ranks keep the incumbent, so for tied paths registration
/// order decides, even when the later candidate would be a better
/// architecture match.
#[derive(Debug, Default)]
pub struct VersionRegistry {
    /// The winning executable per exact version string.
    by_exact: HashMap<String, PathBuf>,
    /// Every seen executable per (version, architecture) pair.
    by_arch: HashMap<String, HashMap<Architecture, PathBuf>>,
    /// Reverse map from executable to the version it reported.
    by_path: HashMap<PathBuf, String>,
    /// Raw version strings per `major` and `major.minor` series key. Append
    /// only: repeated registration duplicates entries.
    series: HashMap<String, Vec<String>>,
}

impl VersionRegistry {
    /// Records a discovered interpreter under every key its version string
    /// supports.
    ///
    /// The version is parsed permissively; a string the parser cannot
    /// interpret at all makes the call a no-op. A missing architecture
    /// counts as the native one.
    ///
    /// Registering the same executable twice is idempotent for the exact and
    /// architecture maps but duplicates the series entries.
    pub fn register(
        &mut self,
        search_path: &SearchPath,
        executable: &Path,
        reported: &str,
        architecture: Option<Architecture>,
    ) {
        let version = match PythonVersion::parse(reported) {
            Ok(version) => version,
            Err(err) => {
                tracing::debug!("not registering {}: {}", executable.display(), err);
                return;
            }
        };
        let architecture = architecture.unwrap_or(Architecture::native());
        match version {
            PythonVersion::Release(release) => {
                self.register_release(search_path, executable, reported, &release, architecture);
            }
            PythonVersion::Opaque(opaque) => self.register_opaque(executable, reported, &opaque),
        }
    }

    fn register_release(
        &mut self,
        search_path: &SearchPath,
        executable: &Path,
        reported: &str,
        release: &ReleaseVersion,
        architecture: Architecture,
    ) {
        let exact = release.to_string();

        // A non-native build can only hold the primary slot while no native
        // build of the same version is known.
        let native_seen = self
            .by_arch
            .get(&exact)
            .is_some_and(|slots| slots.contains_key(&Architecture::native()));
        if wins(search_path, self.by_exact.get(&exact), executable)
            && (architecture == Architecture::native() || !native_seen)
        {
            self.by_exact.insert(exact.clone(), executable.to_owned());
        }

        let slots = self.by_arch.entry(exact).or_default();
        if wins(search_path, slots.get(&architecture), executable) {
            slots.insert(architecture, executable.to_owned());
        }

        self.by_path
            .insert(executable.to_owned(), reported.to_owned());
        for key in series_keys(release.release()) {
            self.series
                .entry(key)
                .or_default()
                .push(reported.to_owned());
        }
    }

    fn register_opaque(&mut self, executable: &Path, reported: &str, opaque: &OpaqueVersion) {
        self.by_path
            .insert(executable.to_owned(), reported.to_owned());
        let prefix = opaque.release_prefix();
        if prefix.len() >= 2 {
            self.series
                .entry(prefix.iter().take(2).join("."))
                .or_default()
                .push(reported.to_owned());
        }
        if let Some(major) = prefix.first() {
            self.series
                .entry(major.to_string())
                .or_default()
                .push(reported.to_owned());
        }
    }

    /// The winning executable for an exact version string.
    pub fn find_exact(&self, version: &str) -> Option<&Path> {
        self.by_exact.get(version).map(PathBuf::as_path)
    }

    /// The recorded executable for a (version, architecture) pair. Succeeds
    /// whenever any candidate of that pair was registered, even when a
    /// different architecture holds the primary slot.
    pub fn find_with_architecture(
        &self,
        version: &str,
        architecture: Architecture,
    ) -> Option<&Path> {
        self.by_arch
            .get(version)?
            .get(&architecture)
            .map(PathBuf::as_path)
    }

    /// The raw version strings filed under a `major` or `major.minor` series
    /// key, in registration order and including duplicates.
    pub fn series(&self, key: &str) -> &[String] {
        self.series.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The version string an executable reported when it was registered.
    pub fn version_of(&self, executable: &Path) -> Option<&str> {
        self.by_path.get(executable).map(String::as_str)
    }

    /// Returns true if nothing was registered.
    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }
}

/// The precedence rule: the challenger only takes a slot when it ranks
/// strictly earlier in the search order than the incumbent. A slot without an
/// incumbent is taken outright.
fn wins(search_path: &SearchPath, incumbent: Option<&PathBuf>, challenger: &Path) -> bool {
    match incumbent {
        None => true,
        Some(incumbent) => search_path.index_of(challenger) < search_path.index_of(incumbent),
    }
}

/// The series keys a release tuple files under, most specific first.
fn series_keys(release: &[u64]) -> Vec<String> {
    vec![release.iter().take(2).join("."), release[0].to_string()]
}
