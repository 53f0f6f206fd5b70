//! Validated identifiers used in request paths.
//!
//! Each type is a string newtype checked against a pattern on construction and
//! on deserialization, so values interpolated into URLs are always well formed.

use std::fmt;
use std::ops::Deref;
use std::str::FromStr;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid {kind}: {value:?}")]
    InvalidFormat { kind: &'static str, value: String },
}

macro_rules! pattern_string {
    ($(#[$meta:meta])* $name:ident, $kind:literal, $pattern:literal) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ParseError;

            fn try_from(value: String) -> Result<Self, ParseError> {
                static PATTERN: LazyLock<regress::Regex> = LazyLock::new(|| {
                    regress::Regex::new($pattern).expect("pattern literal is a valid regex")
                });
                if PATTERN.find(&value).is_none() {
                    return Err(ParseError::InvalidFormat { kind: $kind, value });
                }
                Ok(Self(value))
            }
        }

        impl TryFrom<&str> for $name {
            type Error = ParseError;

            fn try_from(value: &str) -> Result<Self, ParseError> {
                Self::try_from(value.to_owned())
            }
        }

        impl FromStr for $name {
            type Err = ParseError;

            fn from_str(value: &str) -> Result<Self, ParseError> {
                Self::try_from(value.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl Deref for $name {
            type Target = str;

            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

pattern_string!(
    /// A Bitcoin address, base58 or bech32.
    Address,
    "address",
    "^[a-zA-Z0-9]{25,90}$"
);

pattern_string!(
    /// Transaction id, 64 hex characters.
    TxHash,
    "transaction hash",
    "^[0-9a-fA-F]{64}$"
);

pattern_string!(
    /// Block hash, 64 hex characters.
    BlockHash,
    "block hash",
    "^[0-9a-fA-F]{64}$"
);
