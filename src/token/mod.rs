//! PASETO wire format.
//!
//! A [`Token`] is parsed and validated against the token grammar before any
//! key material is involved. The body is left encoded: decoding it is the
//! job of the protocol version that owns the token.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use base64ct::{Base64UrlUnpadded, Encoding};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::paserk::PaserkVersion;

const TOKEN_PATTERN: &str = r"^v([1-4])\.(local|public)\.([A-Za-z0-9_-]+)(?:\.([A-Za-z0-9_-]+))?$";

/// Errors while parsing a token.
#[derive(Error, Clone, Debug, PartialEq)]
pub enum Error {
    #[error("malformed token")]
    InvalidFormat,
    #[error("unable to decode token footer")]
    InvalidFooter,
}

/// PASETO protocol versions that may appear on the wire.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Version {
    V1,
    V2,
    V3,
    V4,
}

impl Version {
    pub const fn as_str(self) -> &'static str {
        match self {
            Version::V1 => "v1",
            Version::V2 => "v2",
            Version::V3 => "v3",
            Version::V4 => "v4",
        }
    }

    /// The PASERK version whose keys belong to this protocol version.
    pub const fn paserk_version(self) -> PaserkVersion {
        match self {
            Version::V1 => PaserkVersion::K1,
            Version::V2 => PaserkVersion::K2,
            Version::V3 => PaserkVersion::K3,
            Version::V4 => PaserkVersion::K4,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a token is encrypted with a shared key or signed with a key pair.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Purpose {
    Local,
    Public,
}

impl Purpose {
    pub const fn as_str(self) -> &'static str {
        match self {
            Purpose::Local => "local",
            Purpose::Public => "public",
        }
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `version.purpose.` prefix authenticated by every token.
pub fn header(version: Version, purpose: Purpose) -> String {
    format!("{}.{}.", version.as_str(), purpose.as_str())
}

fn grammar() -> &'static Regex {
    static GRAMMAR: OnceLock<Regex> = OnceLock::new();

    // the pattern is a constant, so compiling it cannot fail at runtime
    GRAMMAR.get_or_init(|| Regex::new(TOKEN_PATTERN).expect("token grammar is a valid regex"))
}

/// A PASETO in wire format.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Token {
    version: Version,
    purpose: Purpose,
    body: String,
    footer: Option<String>,
}

impl Token {
    /// Parse and validate a token string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] if the string does not match
    /// `v[1-4].(local|public).<base64url>[.<base64url>]`.
    pub fn parse(s: &str) -> Result<Self, Error> {
        let caps = grammar().captures(s).ok_or_else(|| {
            debug!("rejecting token that does not match the grammar");
            Error::InvalidFormat
        })?;

        let version = match &caps[1] {
            "1" => Version::V1,
            "2" => Version::V2,
            "3" => Version::V3,
            "4" => Version::V4,
            _ => return Err(Error::InvalidFormat),
        };
        let purpose = match &caps[2] {
            "local" => Purpose::Local,
            "public" => Purpose::Public,
            _ => return Err(Error::InvalidFormat),
        };

        Ok(Self {
            version,
            purpose,
            body: caps[3].to_string(),
            footer: caps.get(4).map(|m| m.as_str().to_string()),
        })
    }

    /// Assemble a token from raw body and footer bytes. An empty footer is
    /// left off the wire entirely.
    pub(crate) fn from_parts(
        version: Version,
        purpose: Purpose,
        body: &[u8],
        footer: &[u8],
    ) -> Self {
        Self {
            version,
            purpose,
            body: Base64UrlUnpadded::encode_string(body),
            footer: (!footer.is_empty()).then(|| Base64UrlUnpadded::encode_string(footer)),
        }
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn purpose(&self) -> Purpose {
        self.purpose
    }

    /// The `version.purpose.` prefix of this token.
    pub fn header(&self) -> String {
        header(self.version, self.purpose)
    }

    /// The still-encoded body segment.
    pub(crate) fn body(&self) -> &str {
        &self.body
    }

    /// Decode the footer. A token without a footer has an empty one.
    ///
    /// The footer is not authenticated until the token has been decrypted
    /// or verified.
    pub fn footer(&self) -> Result<Vec<u8>, Error> {
        match &self.footer {
            Some(footer) => {
                Base64UrlUnpadded::decode_vec(footer).map_err(|_| Error::InvalidFooter)
            }
            None => Ok(Vec::new()),
        }
    }

    pub fn has_footer(&self) -> bool {
        self.footer.is_some()
    }
}

impl FromStr for Token {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Token {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.version, self.purpose, self.body)?;
        if let Some(footer) = &self.footer {
            write!(f, ".{footer}")?;
        }

        Ok(())
    }
}

/// The authenticated contents of a token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    payload: Vec<u8>,
    footer: Vec<u8>,
}

impl Message {
    pub fn new(payload: Vec<u8>, footer: Vec<u8>) -> Self {
        Self { payload, footer }
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn footer(&self) -> &[u8] {
        &self.footer
    }

    pub fn into_parts(self) -> (Vec<u8>, Vec<u8>) {
        (self.payload, self.footer)
    }
}
