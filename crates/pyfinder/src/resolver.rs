use std::{
    env,
    ffi::OsString,
    path::{Path, PathBuf},
};

use once_cell::sync::OnceCell;
use pyfinder_types::{Architecture, Candidate, PythonVersion};

use crate::{
    discovery,
    error::FinderError,
    probe::{CommandProbe, VersionProbe},
    registry::VersionRegistry,
    search_path::{is_executable, ExecutableIndex, PathPlacement, SearchPath},
};

/// The directory below a virtual environment root that holds its
/// executables.
#[cfg(windows)]
const VENV_BIN_DIR: &str = "Scripts";
#[cfg(not(windows))]
const VENV_BIN_DIR: &str = "bin";

/// Options controlling how a [`PythonFinder`] assembles its search order and
/// which installation sources it consults.
#[derive(Debug, Clone, Default)]
pub struct FinderOptions {
    /// The inherited search order as a `PATH`-style string. When unset the
    /// `PATH` environment variable is used.
    pub path: Option<OsString>,

    /// An extra directory joined into the search order according to
    /// `placement`.
    pub extra_dir: Option<PathBuf>,

    /// Where `extra_dir` goes relative to the inherited order. The append
    /// placement also puts the directory of the current executable in
    /// front, so interpreters shipped next to the running program win.
    pub placement: PathPlacement,

    /// A virtual environment root. Its executable directory is searched
    /// before everything else.
    pub venv: Option<PathBuf>,

    /// An explicit version manager root. When unset, `PYENV_ROOT` and the
    /// default `~/.pyenv` location are tried; whichever exists is scanned.
    pub pyenv_root: Option<PathBuf>,
}

/// Everything one discovery pass produces.
struct Discovered {
    index: ExecutableIndex,
    registry: VersionRegistry,
    candidates: Vec<Candidate>,
}

/// Discovers the Python interpreters a system offers and resolves version
/// requests against them.
///
/// Discovery is lazy and runs at most once per finder: the first operation
/// that needs it crawls the search order, scans the version manager root if
/// one is available and, on Windows, reads the installation registry. Every
/// discovered candidate is registered in a [`VersionRegistry`] which keeps
/// one winning executable per version key. A fresh finder rescans.
pub struct PythonFinder {
    search_path: SearchPath,
    pyenv_root: Option<PathBuf>,
    probe: Box<dyn VersionProbe + Send + Sync>,
    discovered: OnceCell<Discovered>,
}

impl PythonFinder {
    /// Creates a finder that asks candidates for their version by running
    /// them.
    ///
    /// # Errors
    ///
    /// Fails when an explicitly configured version manager root is not a
    /// directory. Auto-detected roots never fail; they are simply not
    /// scanned when absent.
    pub fn new(options: FinderOptions) -> Result<PythonFinder, FinderError> {
        Self::with_probe(options, CommandProbe::default())
    }

    /// Creates a finder with a custom version probe.
    pub fn with_probe(
        options: FinderOptions,
        probe: impl VersionProbe + Send + Sync + 'static,
    ) -> Result<PythonFinder, FinderError> {
        let pyenv_root = resolve_pyenv_root(&options)?;
        Ok(PythonFinder {
            search_path: assemble_search_path(&options),
            pyenv_root,
            probe: Box::new(probe),
            discovered: OnceCell::new(),
        })
    }

    /// The search order this finder operates on.
    pub fn search_path(&self) -> &SearchPath {
        &self.search_path
    }

    /// The version manager root this finder scans, if any.
    pub fn pyenv_root(&self) -> Option<&Path> {
        self.pyenv_root.as_deref()
    }

    /// Every interpreter discovery produced, in discovery order.
    pub fn candidates(&self) -> &[Candidate] {
        &self.discovered().candidates
    }

    /// The name index over every executable on the search order.
    pub fn executable_index(&self) -> &ExecutableIndex {
        &self.discovered().index
    }

    /// The registry the discovered candidates were registered into.
    pub fn registry(&self) -> &VersionRegistry {
        &self.discovered().registry
    }

    /// Resolves a version request to the executable that wins it.
    ///
    /// The request may be an exact version like `3.6.9` or a series like
    /// `3.6` or `3`; a series resolves to its highest registered release.
    /// When an architecture is given, only candidates recorded for that
    /// architecture qualify. As a last resort a request without an
    /// architecture falls back to a suffixed executable name such as
    /// `python3.6` on the search order.
    ///
    /// Returns `None` when nothing matches. Unparseable requests do not
    /// fail, they just cannot match anything.
    pub fn find_version(
        &self,
        request: &str,
        architecture: Option<Architecture>,
    ) -> Option<PathBuf> {
        let discovered = self.discovered();
        let request = normalize_request(request);

        if let Some(found) = lookup(&discovered.registry, &request, architecture) {
            return Some(found.to_owned());
        }

        if let Some(best) = best_in_series(&discovered.registry, &request) {
            if let Some(found) = lookup(&discovered.registry, &best, architecture) {
                return Some(found.to_owned());
            }
        }

        #[cfg(not(windows))]
        if architecture.is_none() {
            if let Some(found) = discovered.index.lookup(&format!("python{request}")) {
                return Some(found.to_owned());
            }
        }

        None
    }

    /// Resolves a free-form request line to an executable.
    ///
    /// An absolute path to an existing executable is returned as given,
    /// without triggering discovery. A launcher invocation like `py -3.6`
    /// resolves through [`PythonFinder::find_version`]. Anything else is
    /// treated as an executable name and looked up with
    /// [`PythonFinder::which`].
    pub fn resolve_line(&self, line: &str) -> Option<PathBuf> {
        match LineRequest::classify(line) {
            LineRequest::AbsolutePath(path) => Some(path),
            LineRequest::LauncherSelector(version) => self.find_version(&version, None),
            LineRequest::BareName(name) => self.which(&name),
        }
    }

    /// Finds an executable by name: first in the indexed search order, then
    /// through the operating system's own lookup.
    pub fn which(&self, name: &str) -> Option<PathBuf> {
        if let Some(found) = self.discovered().index.lookup(name) {
            return Some(found.to_owned());
        }
        which::which(name).ok()
    }

    fn discovered(&self) -> &Discovered {
        self.discovered.get_or_init(|| {
            let index = ExecutableIndex::scan(&self.search_path);
            let mut candidates =
                discovery::crawl_search_path(&self.search_path, self.probe.as_ref());
            #[cfg(windows)]
            candidates.extend(discovery::scan_windows_registry());
            if let Some(root) = &self.pyenv_root {
                candidates.extend(discovery::scan_pyenv_root(root));
            }

            let mut registry = VersionRegistry::default();
            for candidate in &candidates {
                registry.register(
                    &self.search_path,
                    &candidate.executable,
                    &candidate.reported,
                    Some(candidate.architecture),
                );
            }
            tracing::debug!(
                "discovered {} interpreter candidates across {} search directories",
                candidates.len(),
                self.search_path.dirs().len()
            );
            Discovered {
                index,
                registry,
                candidates,
            }
        })
    }
}

/// The interpretation of a free-form interpreter request line.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum LineRequest {
    /// An absolute path to an existing executable, usable as given.
    AbsolutePath(PathBuf),
    /// A `py -X` launcher invocation carrying the version request `X`.
    LauncherSelector(String),
    /// A bare executable name to look up on the search order.
    BareName(String),
}

impl LineRequest {
    /// Classifies a request line without resolving it.
    pub fn classify(line: &str) -> LineRequest {
        let line = line.trim();
        let path = Path::new(line);
        if path.is_absolute() && is_executable(path) {
            return LineRequest::AbsolutePath(path.to_owned());
        }
        let mut tokens = line.split_whitespace();
        if let (Some("py"), Some(selector)) = (tokens.next(), tokens.next()) {
            if selector.starts_with('-') {
                return LineRequest::LauncherSelector(selector.trim_matches('-').to_owned());
            }
        }
        LineRequest::BareName(line.to_owned())
    }
}

/// Brings a request into the form used for registry keys: parseable release
/// requests are normalized through the parser, everything else is merely
/// trimmed.
fn normalize_request(request: &str) -> String {
    match PythonVersion::parse(request) {
        Ok(PythonVersion::Release(release)) => release.to_string(),
        _ => request.trim().to_owned(),
    }
}

fn lookup<'r>(
    registry: &'r VersionRegistry,
    version: &str,
    architecture: Option<Architecture>,
) -> Option<&'r Path> {
    match architecture {
        Some(architecture) => registry.find_with_architecture(version, architecture),
        None => registry.find_exact(version),
    }
}

/// The highest release registered under a series key, in registry key form.
fn best_in_series(registry: &VersionRegistry, request: &str) -> Option<String> {
    registry
        .series(request)
        .iter()
        .filter_map(|raw| match PythonVersion::parse(raw) {
            Ok(PythonVersion::Release(release)) => Some(release),
            _ => None,
        })
        .max()
        .map(|best| best.to_string())
}

/// Builds the search order a finder operates on.
///
/// The venv executable directory always ends up first. With the append
/// placement the directory of the current executable leads the inherited
/// order and the extra directory trails it; with the prepend placement the
/// extra directory leads.
fn assemble_search_path(options: &FinderOptions) -> SearchPath {
    let mut search = match &options.path {
        Some(path) => SearchPath::from_path_var(path),
        None => SearchPath::from_env(),
    };
    match options.placement {
        PathPlacement::Prepend => {
            if let Some(dir) = &options.extra_dir {
                search = search.prepend(dir.clone());
            }
        }
        PathPlacement::Append => {
            if let Some(dir) = &options.extra_dir {
                search = search.append(dir.clone());
            }
            if let Some(exe_dir) = env::current_exe()
                .ok()
                .and_then(|exe| exe.parent().map(Path::to_path_buf))
            {
                search = search.prepend(exe_dir);
            }
        }
    }
    if let Some(venv) = &options.venv {
        search = search.prepend(venv.join(VENV_BIN_DIR));
    }
    search
}

/// Decides which version manager root to scan, if any. An explicit root
/// must exist; detected ones are silently dropped when they do not.
fn resolve_pyenv_root(options: &FinderOptions) -> Result<Option<PathBuf>, FinderError> {
    if let Some(root) = &options.pyenv_root {
        if !root.is_dir() {
            return Err(FinderError::InvalidPyenvRoot(root.clone()));
        }
        return Ok(Some(root.clone()));
    }
    Ok(env::var_os("PYENV_ROOT")
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|home| home.join(".pyenv")))
        .filter(|root| root.is_dir()))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{normalize_request, LineRequest};

    #[rstest]
    #[case::launcher("py -3.6", LineRequest::LauncherSelector("3.6".into()))]
    #[case::long_launcher("py --3.8-", LineRequest::LauncherSelector("3.8".into()))]
    #[case::lone_launcher("py", LineRequest::BareName("py".into()))]
    #[case::name("python3", LineRequest::BareName("python3".into()))]
    #[case::prefixed_name("pypy", LineRequest::BareName("pypy".into()))]
    #[case::missing_absolute("/no/such/python", LineRequest::BareName("/no/such/python".into()))]
    #[case::padded("  python3  ", LineRequest::BareName("python3".into()))]
    fn test_classify(#[case] line: &str, #[case] expected: LineRequest) {
        assert_eq!(LineRequest::classify(line), expected);
    }

    #[cfg(unix)]
    #[test]
    fn test_classify_absolute_executable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("python");
        std::fs::write(&path, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(
            LineRequest::classify(path.to_str().unwrap()),
            LineRequest::AbsolutePath(path)
        );
    }

    #[rstest]
    #[case::exact("3.6.9", "3.6.9")]
    #[case::padded(" 3.6 ", "3.6")]
    #[case::spelled_out("3.8.0beta2", "3.8.0b2")]
    #[case::opaque("2.7.8-custom", "2.7.8-custom")]
    #[case::garbage(" system ", "system")]
    fn test_normalize_request(#[case] request: &str, #[case] expected: &str) {
        assert_eq!(normalize_request(request), expected);
    }

    mod search_order {
        use std::path::{Path, PathBuf};

        use crate::{search_path::PathPlacement, FinderOptions};

        use super::super::{assemble_search_path, VENV_BIN_DIR};

        fn path_var(dirs: &[&Path]) -> std::ffi::OsString {
            std::env::join_paths(dirs.iter().copied()).unwrap()
        }

        #[test]
        fn test_prepend_placement() {
            let options = FinderOptions {
                path: Some(path_var(&[Path::new("/base")])),
                extra_dir: Some(PathBuf::from("/extra")),
                ..FinderOptions::default()
            };
            let search = assemble_search_path(&options);
            assert_eq!(
                search.dirs(),
                [PathBuf::from("/extra"), PathBuf::from("/base")]
            );
        }

        #[test]
        fn test_append_placement_leads_with_own_directory() {
            let options = FinderOptions {
                path: Some(path_var(&[Path::new("/base")])),
                extra_dir: Some(PathBuf::from("/extra")),
                placement: PathPlacement::Append,
                ..FinderOptions::default()
            };
            let search = assemble_search_path(&options);
            let exe_dir = std::env::current_exe().unwrap().parent().unwrap().to_owned();
            assert_eq!(
                search.dirs(),
                [exe_dir, PathBuf::from("/base"), PathBuf::from("/extra")]
            );
        }

        #[test]
        fn test_venv_directory_always_comes_first() {
            let options = FinderOptions {
                path: Some(path_var(&[Path::new("/base")])),
                extra_dir: Some(PathBuf::from("/extra")),
                placement: PathPlacement::Append,
                venv: Some(PathBuf::from("/venv")),
                ..FinderOptions::default()
            };
            let search = assemble_search_path(&options);
            assert_eq!(search.dirs()[0], Path::new("/venv").join(VENV_BIN_DIR));
        }
    }

    #[cfg(unix)]
    mod finding {
        use std::{
            ffi::OsString,
            path::{Path, PathBuf},
            sync::{
                atomic::{AtomicUsize, Ordering},
                Arc,
            },
        };

        use pyfinder_types::{Architecture, DiscoveryOrigin};

        use crate::{probe::VersionProbe, FinderError, FinderOptions, PythonFinder};

        /// Maps executable names to canned version strings and counts how
        /// often it ran.
        struct FakeProbe {
            versions: Vec<(&'static str, &'static str)>,
            calls: Arc<AtomicUsize>,
        }

        impl FakeProbe {
            fn new(versions: Vec<(&'static str, &'static str)>) -> (FakeProbe, Arc<AtomicUsize>) {
                let calls = Arc::new(AtomicUsize::new(0));
                let probe = FakeProbe {
                    versions,
                    calls: Arc::clone(&calls),
                };
                (probe, calls)
            }
        }

        impl VersionProbe for FakeProbe {
            fn probe(&self, executable: &Path) -> Option<String> {
                self.calls.fetch_add(1, Ordering::SeqCst);
                let name = executable.file_name()?.to_str()?;
                self.versions
                    .iter()
                    .find(|(probed, _)| *probed == name)
                    .map(|(_, version)| (*version).to_owned())
            }
        }

        fn touch_executable(dir: &Path, name: &str) -> PathBuf {
            use std::os::unix::fs::PermissionsExt;
            let path = dir.join(name);
            std::fs::write(&path, "#!/bin/sh\n").unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        fn path_var(dirs: &[&Path]) -> OsString {
            std::env::join_paths(dirs.iter().copied()).unwrap()
        }

        /// A finder limited to the given directories, with a version manager
        /// root that is valid but empty so the surrounding system cannot
        /// leak in.
        fn finder_for(dirs: &[&Path], pyenv_root: &Path, probe: FakeProbe) -> PythonFinder {
            let options = FinderOptions {
                path: Some(path_var(dirs)),
                pyenv_root: Some(pyenv_root.to_owned()),
                ..FinderOptions::default()
            };
            PythonFinder::with_probe(options, probe).unwrap()
        }

        #[test]
        fn test_find_version_exact_series_and_architecture() {
            let first = tempfile::tempdir().unwrap();
            let second = tempfile::tempdir().unwrap();
            let pyenv = tempfile::tempdir().unwrap();
            let old = touch_executable(first.path(), "python3.6");
            let new = touch_executable(second.path(), "python3.7");

            let (probe, _) =
                FakeProbe::new(vec![("python3.6", "3.6.9"), ("python3.7", "3.7.1")]);
            let finder = finder_for(&[first.path(), second.path()], pyenv.path(), probe);

            assert_eq!(finder.find_version("3.6.9", None), Some(old.clone()));
            assert_eq!(finder.find_version("3.6", None), Some(old.clone()));
            assert_eq!(finder.find_version("3.7", None), Some(new.clone()));
            assert_eq!(finder.find_version("3", None), Some(new));
            assert_eq!(finder.find_version("3.9", None), None);
            assert_eq!(finder.find_version("3.6", Some(Architecture::native())), Some(old));
        }

        #[test]
        fn test_absolute_line_passes_through_without_discovery() {
            let dir = tempfile::tempdir().unwrap();
            let pyenv = tempfile::tempdir().unwrap();
            let python = touch_executable(dir.path(), "python");

            let (probe, calls) = FakeProbe::new(vec![("python", "3.8.0")]);
            let finder = finder_for(&[dir.path()], pyenv.path(), probe);

            assert_eq!(finder.resolve_line(python.to_str().unwrap()), Some(python));
            assert_eq!(calls.load(Ordering::SeqCst), 0);
        }

        #[test]
        fn test_launcher_selector_resolves_like_a_version() {
            let dir = tempfile::tempdir().unwrap();
            let pyenv = tempfile::tempdir().unwrap();
            let python = touch_executable(dir.path(), "python3.6");

            let (probe, _) = FakeProbe::new(vec![("python3.6", "3.6.9")]);
            let finder = finder_for(&[dir.path()], pyenv.path(), probe);

            assert_eq!(finder.resolve_line("py -3.6"), Some(python.clone()));
            assert_eq!(finder.resolve_line("py -3"), Some(python));
            assert_eq!(finder.resolve_line("py -9.9"), None);
        }

        #[test]
        fn test_bare_name_resolves_through_the_index() {
            let dir = tempfile::tempdir().unwrap();
            let pyenv = tempfile::tempdir().unwrap();
            let pypy = touch_executable(dir.path(), "pypy");

            // `pypy` is indexed but never probed or registered.
            let (probe, _) = FakeProbe::new(vec![]);
            let finder = finder_for(&[dir.path()], pyenv.path(), probe);

            assert_eq!(finder.resolve_line("pypy"), Some(pypy));
            assert_eq!(finder.resolve_line("no-such-executable-anywhere"), None);
        }

        #[test]
        fn test_unprobeable_interpreter_is_still_found_by_suffix() {
            let dir = tempfile::tempdir().unwrap();
            let pyenv = tempfile::tempdir().unwrap();
            let python = touch_executable(dir.path(), "python3.6");

            // The probe recognizes nothing, so the registry stays empty.
            let (probe, _) = FakeProbe::new(vec![]);
            let finder = finder_for(&[dir.path()], pyenv.path(), probe);

            assert_eq!(finder.find_version("3.6", None), Some(python));
            assert_eq!(finder.find_version("3.6", Some(Architecture::native())), None);
        }

        #[test]
        fn test_pyenv_versions_resolve() {
            let pyenv = tempfile::tempdir().unwrap();
            let bin_dir = pyenv.path().join("versions").join("3.8.2").join("bin");
            std::fs::create_dir_all(&bin_dir).unwrap();
            let runtime = touch_executable(&bin_dir, "python");

            let (probe, _) = FakeProbe::new(vec![]);
            let finder = finder_for(&[], pyenv.path(), probe);

            assert_eq!(finder.find_version("3.8.2", None), Some(runtime.clone()));
            assert_eq!(finder.find_version("3.8", None), Some(runtime));
            assert_eq!(finder.candidates().len(), 1);
            assert_eq!(finder.candidates()[0].origin, DiscoveryOrigin::Pyenv);
        }

        #[test]
        fn test_explicit_missing_pyenv_root_is_rejected() {
            let options = FinderOptions {
                path: Some(OsString::new()),
                pyenv_root: Some(PathBuf::from("/no/such/pyenv")),
                ..FinderOptions::default()
            };
            let (probe, _) = FakeProbe::new(vec![]);
            assert!(matches!(
                PythonFinder::with_probe(options, probe),
                Err(FinderError::InvalidPyenvRoot(_))
            ));
        }
    }
}
