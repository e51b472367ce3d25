use std::path::Path;

use glob::Pattern;
use once_cell::sync::Lazy;
use pyfinder_types::{Architecture, Candidate, DiscoveryOrigin, PythonVersion};

use crate::{probe::VersionProbe, search_path::is_executable, SearchPath};

/// The filename shapes that identify an interpreter executable: the bare
/// runtime name, a major-only suffix, a `major.minor` suffix and the
/// `m`-suffixed pymalloc builds. Helper scripts like `python3-config` match
/// none of them.
static MATCH_RULES: Lazy<[Pattern; 4]> = Lazy::new(|| {
    ["*python", "*python?", "*python?.?", "*python?.?m"]
        .map(|rule| Pattern::new(rule).expect("invalid filename rule"))
});

fn looks_like_python(name: &str) -> bool {
    name.starts_with("python") && MATCH_RULES.iter().any(|rule| rule.matches(name))
}

/// Walks the directories of the search order, asks every executable named
/// like a Python interpreter for its version and collects the answers.
///
/// Unreadable directories are skipped, as are executables whose reported
/// version cannot be parsed at all. An interpreter reachable through several
/// directories yields one candidate per occurrence; which occurrence matters
/// is decided later by registry precedence.
pub fn crawl_search_path(search_path: &SearchPath, probe: &dyn VersionProbe) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    for dir in search_path.dirs() {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::debug!("skipping search directory {}: {}", dir.display(), err);
                continue;
            }
        };
        for entry in entries.filter_map(Result::ok) {
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            if !looks_like_python(name) || !is_executable(&path) {
                continue;
            }
            if let Some(candidate) = probe_candidate(&path, probe) {
                candidates.push(candidate);
            }
        }
    }
    candidates
}

fn probe_candidate(path: &Path, probe: &dyn VersionProbe) -> Option<Candidate> {
    let reported = probe.probe(path)?;
    let version = match PythonVersion::parse(&reported) {
        Ok(version) => version,
        Err(err) => {
            tracing::debug!("ignoring {}: {}", path.display(), err);
            return None;
        }
    };
    Some(Candidate {
        executable: path.to_owned(),
        reported,
        version,
        architecture: Architecture::native(),
        origin: DiscoveryOrigin::PathCrawl,
    })
}

#[cfg(test)]
mod tests {
    use super::looks_like_python;
    use rstest::rstest;

    #[rstest]
    #[case::bare("python", true)]
    #[case::major("python3", true)]
    #[case::major_minor("python3.6", true)]
    #[case::pymalloc("python3.6m", true)]
    #[case::pypy("pypy", false)]
    #[case::config_script("python3-config", false)]
    #[case::windows_exe("python.exe", false)]
    #[case::full_patch("python3.6.9", false)]
    #[case::unrelated("perl", false)]
    fn test_match_rules(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(looks_like_python(name), expected);
    }

    #[cfg(unix)]
    mod crawling {
        use std::path::{Path, PathBuf};

        use pyfinder_types::DiscoveryOrigin;

        use crate::{discovery::crawl_search_path, probe::VersionProbe, SearchPath};

        /// Maps executable names to canned version strings without spawning
        /// any processes.
        struct FakeProbe(Vec<(&'static str, &'static str)>);

        impl VersionProbe for FakeProbe {
            fn probe(&self, executable: &Path) -> Option<String> {
                let name = executable.file_name()?.to_str()?;
                self.0
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

        #[test]
        fn test_crawl_probes_matching_executables() {
            let dir = tempfile::tempdir().unwrap();
            touch_executable(dir.path(), "python3.6");
            touch_executable(dir.path(), "python3-config");
            std::fs::write(dir.path().join("python3.9"), "not executable").unwrap();

            let search = SearchPath::default().prepend(dir.path());
            let probe = FakeProbe(vec![("python3.6", "3.6.9"), ("python3.9", "3.9.1")]);
            let candidates = crawl_search_path(&search, &probe);

            assert_eq!(candidates.len(), 1);
            assert_eq!(candidates[0].executable, dir.path().join("python3.6"));
            assert_eq!(candidates[0].reported, "3.6.9");
            assert_eq!(candidates[0].origin, DiscoveryOrigin::PathCrawl);
        }

        #[test]
        fn test_crawl_skips_unprobeable_executables() {
            let dir = tempfile::tempdir().unwrap();
            touch_executable(dir.path(), "python3.6");
            touch_executable(dir.path(), "python3.7");

            let search = SearchPath::default().prepend(dir.path());
            let probe = FakeProbe(vec![("python3.7", "3.7.1")]);
            let candidates = crawl_search_path(&search, &probe);

            assert_eq!(candidates.len(), 1);
            assert_eq!(candidates[0].reported, "3.7.1");
        }

        #[test]
        fn test_crawl_visits_directories_in_search_order() {
            let first = tempfile::tempdir().unwrap();
            let second = tempfile::tempdir().unwrap();
            touch_executable(first.path(), "python");
            touch_executable(second.path(), "python");

            let search = SearchPath::default()
                .prepend(second.path())
                .prepend(first.path());
            let probe = FakeProbe(vec![("python", "3.8.0")]);
            let candidates = crawl_search_path(&search, &probe);

            assert_eq!(candidates.len(), 2);
            assert_eq!(candidates[0].executable, first.path().join("python"));
            assert_eq!(candidates[1].executable, second.path().join("python"));
        }

        #[test]
        fn test_crawl_tolerates_missing_directories() {
            let dir = tempfile::tempdir().unwrap();
            touch_executable(dir.path(), "python");

            let search = SearchPath::default()
                .prepend(dir.path())
                .prepend("/does/not/exist");
            let probe = FakeProbe(vec![("python", "2.7.18")]);
            let candidates = crawl_search_path(&search, &probe);

            assert_eq!(candidates.len(), 1);
        }
    }
}
