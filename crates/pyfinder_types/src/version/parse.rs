use std::{
    error::Error,
    fmt::{Display, Formatter},
    str::FromStr,
};

use nom::{
    branch::alt,
    bytes::complete::tag_no_case,
    character::complete::{char, digit1, one_of},
    combinator::{map_res, opt, value},
    multi::separated_list1,
    IResult, Parser,
};
use smallvec::SmallVec;
use thiserror::Error;

use super::{OpaqueVersion, Prerelease, PrereleaseKind, PythonVersion, ReleaseVersion};

/// An error that occurred during parsing of a string to a version.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ParseVersionError {
    /// The original string that was the input of the parser
    pub version: String,

    /// The type of parse error that occurred
    pub kind: ParseVersionErrorKind,
}

impl Display for ParseVersionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "malformed version string '{}': {}",
            &self.version, &self.kind
        )
    }
}

impl Error for ParseVersionError {}

impl ParseVersionError {
    /// Create a new parse error
    pub fn new(text: impl Into<String>, kind: ParseVersionErrorKind) -> Self {
        Self {
            version: text.into(),
            kind,
        }
    }
}

/// The type of parse error that occurred when parsing a version string.
#[derive(Debug, Eq, PartialEq, Clone, Error)]
pub enum ParseVersionErrorKind {
    /// The string was empty
    #[error("empty string")]
    Empty,
    /// The string does not contain a single digit
    #[error("expected at least one numeric component")]
    NoDigits,
}

/// Parses a numeral from the input, fails if the parsed digits cannot be
/// represented by an `u64`.
fn numeral(input: &str) -> IResult<&str, u64> {
    map_res(digit1, u64::from_str).parse(input)
}

/// Parses the dotted release digits at the front of a version string, e.g. the
/// `3.6.9` of `3.6.9b1`.
fn release(input: &str) -> IResult<&str, SmallVec<[u64; 3]>> {
    let (rest, components) = separated_list1(char('.'), numeral).parse(input)?;
    Ok((rest, components.into_iter().collect()))
}

/// Parses a pre-release phase. Spellings are normalized, so `c`, `pre` and
/// `preview` all map to [`PrereleaseKind::Rc`]. Longer spellings must be tried
/// before their prefixes.
fn prerelease_kind(input: &str) -> IResult<&str, PrereleaseKind> {
    alt((
        value(PrereleaseKind::Dev, tag_no_case("dev")),
        value(PrereleaseKind::Alpha, tag_no_case("alpha")),
        value(PrereleaseKind::Alpha, tag_no_case("a")),
        value(PrereleaseKind::Beta, tag_no_case("beta")),
        value(PrereleaseKind::Beta, tag_no_case("b")),
        value(PrereleaseKind::Rc, tag_no_case("preview")),
        value(PrereleaseKind::Rc, tag_no_case("pre")),
        value(PrereleaseKind::Rc, tag_no_case("rc")),
        value(PrereleaseKind::Rc, tag_no_case("c")),
    ))
    .parse(input)
}

/// Parses a pre-release marker, e.g. the `b1` of `3.8.0b1` or the `-alpha.2`
/// of `3.8.0-alpha.2`. A marker without an explicit counter counts as zero.
fn prerelease(input: &str) -> IResult<&str, Prerelease> {
    let (rest, (_, kind, _, number)) = (
        opt(one_of("._-")),
        prerelease_kind,
        opt(one_of("._-")),
        opt(numeral),
    )
        .parse(input)?;
    Ok((rest, Prerelease::new(kind, number.unwrap_or(0))))
}

/// Permissively parses a version string. Strings that fully decompose into
/// release digits plus an optional pre-release marker become
/// [`PythonVersion::Release`]; everything else that contains at least one
/// digit becomes [`PythonVersion::Opaque`] with the leading release digits
/// salvaged where present.
pub(crate) fn parse_python_version(input: &str) -> Result<PythonVersion, ParseVersionError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ParseVersionError::new(input, ParseVersionErrorKind::Empty));
    }

    if let Ok((rest, (components, pre))) = (release, opt(prerelease)).parse(trimmed) {
        if rest.is_empty() {
            return Ok(PythonVersion::Release(ReleaseVersion::new(
                components, pre,
            )));
        }
    }

    if !trimmed.bytes().any(|b| b.is_ascii_digit()) {
        return Err(ParseVersionError::new(
            input,
            ParseVersionErrorKind::NoDigits,
        ));
    }

    // The string is irregular. Keep whatever release digits it starts with so
    // it can still be filed under its major and minor series.
    let release_prefix = match release(trimmed) {
        Ok((_, components)) => components,
        Err(_) => SmallVec::new(),
    };
    Ok(PythonVersion::Opaque(OpaqueVersion::new(
        trimmed,
        release_prefix,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_stops_at_first_irregularity() {
        let (rest, components) = release("3.6b1").unwrap();
        assert_eq!(components.as_slice(), &[3, 6]);
        assert_eq!(rest, "b1");

        let (rest, components) = release("3..6").unwrap();
        assert_eq!(components.as_slice(), &[3]);
        assert_eq!(rest, "..6");
    }

    #[test]
    fn test_prerelease_spellings() {
        for (input, kind) in [
            ("a1", PrereleaseKind::Alpha),
            ("alpha1", PrereleaseKind::Alpha),
            ("b1", PrereleaseKind::Beta),
            ("beta1", PrereleaseKind::Beta),
            ("c1", PrereleaseKind::Rc),
            ("rc1", PrereleaseKind::Rc),
            ("pre1", PrereleaseKind::Rc),
            ("preview1", PrereleaseKind::Rc),
            ("dev1", PrereleaseKind::Dev),
        ] {
            let (rest, pre) = prerelease(input).unwrap();
            assert_eq!(rest, "", "expected '{input}' to be fully consumed");
            assert_eq!(pre.kind(), kind);
            assert_eq!(pre.number(), 1);
        }
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            parse_python_version("").unwrap_err().kind,
            ParseVersionErrorKind::Empty
        );
        assert_eq!(
            parse_python_version("system").unwrap_err().kind,
            ParseVersionErrorKind::NoDigits
        );
    }

    #[test]
    fn test_oversized_numeral_falls_back_to_opaque() {
        let version = parse_python_version("99999999999999999999999.1").unwrap();
        match version {
            PythonVersion::Opaque(opaque) => assert!(opaque.release_prefix().is_empty()),
            PythonVersion::Release(_) => panic!("numeral does not fit in a u64"),
        }
    }
}
