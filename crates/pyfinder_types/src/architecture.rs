use std::{
    fmt,
    fmt::{Display, Formatter},
    str::FromStr,
};

use serde::{Deserializer, Serializer};
use thiserror::Error;

/// The architecture an interpreter binary was built for.
///
/// Installation metadata (most notably the Windows installation registry)
/// reports this as the literal strings `32bit` and `64bit`, which is also how
/// instances of this type display.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Architecture {
    /// A 32-bit binary.
    Bits32,
    /// A 64-bit binary.
    Bits64,
}

impl Architecture {
    /// Returns the architecture of the currently running binary.
    pub const fn native() -> Architecture {
        #[cfg(target_pointer_width = "32")]
        return Architecture::Bits32;

        #[cfg(target_pointer_width = "64")]
        return Architecture::Bits64;

        #[cfg(not(any(target_pointer_width = "32", target_pointer_width = "64")))]
        compile_error!("unsupported pointer width");
    }

    /// Returns a string representation of the architecture.
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// An error that can occur when parsing an architecture from a string.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
#[error("'{string}' is not a known architecture")]
pub struct ParseArchitectureError {
    /// The architecture string that could not be parsed.
    pub string: String,
}

impl FromStr for Architecture {
    type Err = ParseArchitectureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "32bit" => Architecture::Bits32,
            "64bit" => Architecture::Bits64,
            string => {
                return Err(ParseArchitectureError {
                    string: string.to_owned(),
                });
            }
        })
    }
}

impl From<Architecture> for &'static str {
    fn from(arch: Architecture) -> Self {
        match arch {
            Architecture::Bits32 => "32bit",
            Architecture::Bits64 => "64bit",
        }
    }
}

impl Display for Architecture {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl serde::Serialize for Architecture {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for Architecture {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer)?
            .parse()
            .map_err(serde::de::Error::custom)
    }
}
