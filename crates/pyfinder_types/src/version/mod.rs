use std::{
    cmp::Ordering,
    fmt,
    fmt::{Display, Formatter},
    str::FromStr,
};

use itertools::{EitherOrBoth, Itertools};
use serde::{Deserializer, Serializer};
use smallvec::SmallVec;

pub use parse::{ParseVersionError, ParseVersionErrorKind};

mod parse;

/// The result of permissively parsing a version string attached to a Python
/// interpreter, either reported by the interpreter itself or taken from
/// installation metadata such as a version manager directory name.
///
/// Interpreter versions come in two shapes:
///
/// * Structured release versions such as `3.6.9` or `3.8.0b1`. These fully
///   decompose into a numeric release tuple plus an optional pre-release
///   marker and parse into [`PythonVersion::Release`].
/// * Irregular strings such as `miniconda3-4.7.12` or `2.7.8-custom` that
///   distribution tooling uses as directory names. These cannot be ordered
///   reliably and parse into [`PythonVersion::Opaque`], keeping the raw text
///   along with whatever leading release digits could be salvaged.
///
/// Strings that contain no digit at all are rejected with a
/// [`ParseVersionError`]; there is nothing useful a finder could do with
/// them.
#[derive(Debug, Clone, PartialEq)]
pub enum PythonVersion {
    /// A version that fully decomposes into release digits and an optional
    /// pre-release marker.
    Release(ReleaseVersion),
    /// An irregular version string that does not decompose.
    Opaque(OpaqueVersion),
}

impl PythonVersion {
    /// Permissively parse a version string. See the type level documentation
    /// for the rules.
    pub fn parse(input: &str) -> Result<PythonVersion, ParseVersionError> {
        parse::parse_python_version(input)
    }

    /// Returns the version rendered without any pre-release marker, e.g.
    /// `3.7.0` for `3.7.0b1`. Opaque versions return their raw string
    /// unchanged, as there is no marker to strip.
    pub fn base_version(&self) -> String {
        match self {
            PythonVersion::Release(release) => release.base_version(),
            PythonVersion::Opaque(opaque) => opaque.as_str().to_owned(),
        }
    }

    /// Returns true if this version carries a pre-release marker. Opaque
    /// versions are never considered pre-releases.
    pub fn is_prerelease(&self) -> bool {
        match self {
            PythonVersion::Release(release) => release.pre().is_some(),
            PythonVersion::Opaque(_) => false,
        }
    }

    /// Returns the structured release version, if this version has one.
    pub fn as_release(&self) -> Option<&ReleaseVersion> {
        match self {
            PythonVersion::Release(release) => Some(release),
            PythonVersion::Opaque(_) => None,
        }
    }
}

impl FromStr for PythonVersion {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PythonVersion::parse(s)
    }
}

impl Display for PythonVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            PythonVersion::Release(release) => write!(f, "{release}"),
            PythonVersion::Opaque(opaque) => write!(f, "{}", opaque.as_str()),
        }
    }
}

impl serde::Serialize for PythonVersion {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for PythonVersion {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer)?
            .parse()
            .map_err(serde::de::Error::custom)
    }
}

/// A fully structured interpreter version: a numeric release tuple plus an
/// optional pre-release marker.
///
/// Ordering pads the shorter release tuple with zeros, so `3.6 == 3.6.0`, and
/// ranks a stable release above every pre-release of the same tuple:
///
/// ```txt
/// 3.6.9 < 3.7.0a1 < 3.7.0b2 < 3.7.0rc1 < 3.7.0 < 3.7.1
/// ```
#[derive(Debug, Clone, Eq)]
pub struct ReleaseVersion {
    /// The numeric components of the release. Versions practically always
    /// consist of at most three components, which keeps them on the stack.
    release: SmallVec<[u64; 3]>,

    /// The pre-release marker, if any.
    pre: Option<Prerelease>,
}

impl ReleaseVersion {
    pub(crate) fn new(release: SmallVec<[u64; 3]>, pre: Option<Prerelease>) -> Self {
        debug_assert!(!release.is_empty());
        Self { release, pre }
    }

    /// The numeric components of the release tuple. Never empty.
    pub fn release(&self) -> &[u64] {
        &self.release
    }

    /// The pre-release marker, if any.
    pub fn pre(&self) -> Option<&Prerelease> {
        self.pre.as_ref()
    }

    /// The first component of the release tuple.
    pub fn major(&self) -> u64 {
        self.release[0]
    }

    /// The release tuple rendered without the pre-release marker, e.g.
    /// `3.7.0` for `3.7.0b1`.
    pub fn base_version(&self) -> String {
        self.release.iter().join(".")
    }
}

impl Ord for ReleaseVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        // A missing component counts as zero, so `3.6` and `3.6.0` compare
        // equal.
        self.release
            .iter()
            .zip_longest(other.release.iter())
            .map(|components| match components {
                EitherOrBoth::Both(a, b) => a.cmp(b),
                EitherOrBoth::Left(a) => a.cmp(&0),
                EitherOrBoth::Right(b) => 0.cmp(b),
            })
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
            .then_with(|| match (&self.pre, &other.pre) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.cmp(b),
            })
    }
}

impl PartialOrd for ReleaseVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ReleaseVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Display for ReleaseVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.release.iter().join("."))?;
        if let Some(pre) = &self.pre {
            write!(f, "{pre}")?;
        }
        Ok(())
    }
}

/// A pre-release marker: the release phase plus a counter within that phase.
///
/// Markers order by phase first and counter second, so `a2 < b1 < rc1`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
pub struct Prerelease {
    kind: PrereleaseKind,
    number: u64,
}

impl Prerelease {
    pub(crate) fn new(kind: PrereleaseKind, number: u64) -> Self {
        Self { kind, number }
    }

    /// The release phase of the marker.
    pub fn kind(&self) -> PrereleaseKind {
        self.kind
    }

    /// The counter within the phase. A marker without an explicit counter,
    /// like the `b` in `3.8b`, counts as zero.
    pub fn number(&self) -> u64 {
        self.number
    }
}

impl Display for Prerelease {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.kind {
            PrereleaseKind::Dev => write!(f, ".dev{}", self.number),
            kind => write!(f, "{}{}", kind.as_str(), self.number),
        }
    }
}

/// The phase a pre-release belongs to. Variants are declared in release
/// order, development snapshots first.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum PrereleaseKind {
    /// A development snapshot (`3.9.0.dev1`).
    Dev,
    /// An alpha release (`3.8.0a4`, also spelled `alpha`).
    Alpha,
    /// A beta release (`3.8.0b1`, also spelled `beta`).
    Beta,
    /// A release candidate (`3.8.0rc1`, also spelled `c`, `pre` or
    /// `preview`).
    Rc,
}

impl PrereleaseKind {
    /// Returns the canonical spelling of the phase.
    pub fn as_str(self) -> &'static str {
        match self {
            PrereleaseKind::Dev => "dev",
            PrereleaseKind::Alpha => "a",
            PrereleaseKind::Beta => "b",
            PrereleaseKind::Rc => "rc",
        }
    }
}

/// An irregular version string that does not decompose into a release tuple,
/// such as `miniconda3-4.7.12` or `2.7.8-custom`.
///
/// Opaque versions cannot be ordered, but when the string starts with release
/// digits those are kept so a finder can still file the version under its
/// major and minor series.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct OpaqueVersion {
    raw: Box<str>,
    release_prefix: SmallVec<[u64; 3]>,
}

impl OpaqueVersion {
    pub(crate) fn new(raw: &str, release_prefix: SmallVec<[u64; 3]>) -> Self {
        Self {
            raw: raw.into(),
            release_prefix,
        }
    }

    /// The raw version string.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The release digits the string starts with, if any. Empty when the
    /// string does not start with a digit.
    pub fn release_prefix(&self) -> &[u64] {
        &self.release_prefix
    }
}

#[cfg(test)]
mod tests {
    use std::cmp::Ordering;

    use rstest::rstest;

    use super::{PrereleaseKind, PythonVersion};

    fn parse(input: &str) -> PythonVersion {
        PythonVersion::parse(input).unwrap()
    }

    fn release(input: &str) -> super::ReleaseVersion {
        match parse(input) {
            PythonVersion::Release(release) => release,
            PythonVersion::Opaque(opaque) => {
                panic!("expected '{input}' to parse as a release, got opaque '{opaque:?}'")
            }
        }
    }

    #[rstest]
    #[case("3.6.9", &[3, 6, 9])]
    #[case("2.7", &[2, 7])]
    #[case("3", &[3])]
    #[case("3.10.0", &[3, 10, 0])]
    #[case("  3.6.9\n", &[3, 6, 9])]
    fn test_parse_release(#[case] input: &str, #[case] expected: &[u64]) {
        let version = release(input);
        assert_eq!(version.release(), expected);
        assert!(version.pre().is_none());
    }

    #[rstest]
    #[case("3.8.0b1", PrereleaseKind::Beta, 1)]
    #[case("3.8.0a4", PrereleaseKind::Alpha, 4)]
    #[case("3.8.0rc1", PrereleaseKind::Rc, 1)]
    #[case("3.8.0c2", PrereleaseKind::Rc, 2)]
    #[case("3.8.0.dev3", PrereleaseKind::Dev, 3)]
    #[case("3.8.0-alpha.2", PrereleaseKind::Alpha, 2)]
    #[case("3.8.0beta1", PrereleaseKind::Beta, 1)]
    #[case("3.8b", PrereleaseKind::Beta, 0)]
    fn test_parse_prerelease(
        #[case] input: &str,
        #[case] kind: PrereleaseKind,
        #[case] number: u64,
    ) {
        let version = release(input);
        let pre = version.pre().expect("expected a pre-release marker");
        assert_eq!(pre.kind(), kind);
        assert_eq!(pre.number(), number);
    }

    #[rstest]
    #[case("miniconda3-4.7.12", &[])]
    #[case("2.7.8-custom", &[2, 7, 8])]
    #[case("3.6.9+build5", &[3, 6, 9])]
    #[case("anaconda3-2019.07", &[])]
    fn test_parse_opaque(#[case] input: &str, #[case] prefix: &[u64]) {
        match parse(input) {
            PythonVersion::Opaque(opaque) => {
                assert_eq!(opaque.as_str(), input);
                assert_eq!(opaque.release_prefix(), prefix);
            }
            PythonVersion::Release(release) => {
                panic!("expected '{input}' to parse as opaque, got release '{release}'")
            }
        }
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("system")]
    #[case("not-a-version")]
    fn test_parse_failure(#[case] input: &str) {
        assert!(PythonVersion::parse(input).is_err());
    }

    #[test]
    fn test_ordering() {
        let ordered = [
            "2.7.18", "3.6.9", "3.7.0.dev2", "3.7.0a1", "3.7.0a2", "3.7.0b1", "3.7.0c1",
            "3.7.0rc2", "3.7.0", "3.7.1", "3.10.0",
        ];
        for window in ordered.windows(2) {
            let (lower, upper) = (release(window[0]), release(window[1]));
            assert_eq!(
                lower.cmp(&upper),
                Ordering::Less,
                "expected {} < {}",
                window[0],
                window[1]
            );
        }
    }

    #[test]
    fn test_padded_equality() {
        assert_eq!(release("3.6"), release("3.6.0"));
        assert_ne!(release("3.6"), release("3.6.1"));
    }

    #[test]
    fn test_base_version() {
        assert_eq!(parse("3.7.0b1").base_version(), "3.7.0");
        assert_eq!(parse("3.6.9").base_version(), "3.6.9");
        assert_eq!(
            parse("miniconda3-4.7.12").base_version(),
            "miniconda3-4.7.12"
        );
    }

    #[test]
    fn test_is_prerelease() {
        assert!(parse("3.8.0b1").is_prerelease());
        assert!(!parse("3.8.0").is_prerelease());
        assert!(!parse("2.7.8-custom").is_prerelease());
    }

    #[test]
    fn test_display_round_trip() {
        for input in ["3.6.9", "3.8.0b1", "3.9.0.dev1", "miniconda3-4.7.12"] {
            let version = parse(input);
            assert_eq!(parse(&version.to_string()), version);
        }
    }
}
