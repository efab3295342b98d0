use std::env::var;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use time::Duration;
use tracing::{debug, error};
use zeroize::Zeroize;

use crate::keys::{KeyPair, SharedKey};
use crate::paserk::{self, Paserk};
use crate::token::Version;

const DEFAULT_VERSION: Version = Version::V4;
const DEFAULT_TTL_SECS: u64 = 600;

/// Environment variable holding the path of the configuration file.
pub const CONFIG_ENV: &str = "NATRIUM_CONFIG";

/// Errors while loading configuration.
#[derive(Error, Clone, Debug, PartialEq)]
pub enum Error {
    #[error("unable to read configuration file")]
    ReadError,
    #[error("invalid configuration: {0}")]
    ParseError(String),
    #[error("protocol version {0} cannot be used to issue tokens")]
    UnsupportedVersion(Version),
    #[error("token lifetime must be positive")]
    InvalidTtl,
    #[error("protocol version {0} does not support implicit assertions")]
    ImplicitAssertionUnsupported(Version),
    #[error(transparent)]
    Paserk(#[from] paserk::Error),
}

#[derive(Deserialize, Clone)]
pub struct Config {
    /// Protocol version new tokens are issued with.
    #[serde(default = "default_version")]
    pub version: Version,
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    /// Implicit assertion bound into every token, if any.
    #[serde(default)]
    pub implicit_assertion: Option<String>,
    /// `local` PASERK for local tokens.
    #[serde(default)]
    pub local_key: Option<String>,
    /// `secret` PASERK for public tokens.
    #[serde(default)]
    pub secret_key: Option<String>,
}

const fn default_version() -> Version {
    DEFAULT_VERSION
}

const fn default_ttl_secs() -> u64 {
    DEFAULT_TTL_SECS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            ttl_secs: default_ttl_secs(),
            implicit_assertion: None,
            local_key: None,
            secret_key: None,
        }
    }
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| Error::ParseError(e.to_string()))?;
        config.validate()?;

        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let json = fs::read_to_string(path.as_ref()).map_err(|e| {
            error!("unable to read {}: {}", path.as_ref().display(), e);
            Error::ReadError
        })?;

        Self::from_json(&json)
    }

    /// Load the file named by `NATRIUM_CONFIG`, or the defaults when it is
    /// unset.
    pub fn try_env() -> Result<Self, Error> {
        match var(CONFIG_ENV) {
            Ok(path) => Self::from_file(path),
            Err(_) => {
                debug!("{} not set, using default configuration", CONFIG_ENV);
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        if !matches!(self.version, Version::V2 | Version::V4) {
            return Err(Error::UnsupportedVersion(self.version));
        }
        if self.version == Version::V2 && !self.implicit_assertion().is_empty() {
            return Err(Error::ImplicitAssertionUnsupported(self.version));
        }
        self.ttl()?;

        Ok(())
    }

    pub fn ttl(&self) -> Result<Duration, Error> {
        match i64::try_from(self.ttl_secs) {
            Ok(secs) if secs > 0 => Ok(Duration::seconds(secs)),
            _ => Err(Error::InvalidTtl),
        }
    }

    pub fn implicit_assertion(&self) -> &[u8] {
        self.implicit_assertion
            .as_deref()
            .map(str::as_bytes)
            .unwrap_or_default()
    }

    /// The configured shared key, if any.
    pub fn local_key(&self) -> Result<Option<SharedKey>, Error> {
        self.local_key
            .as_deref()
            .map(|key| -> Result<SharedKey, Error> { Ok(Paserk::parse(key)?.to_shared_key()?) })
            .transpose()
    }

    /// The configured signing key pair, if any.
    pub fn secret_key(&self) -> Result<Option<KeyPair>, Error> {
        self.secret_key
            .as_deref()
            .map(|key| -> Result<KeyPair, Error> { Ok(Paserk::parse(key)?.to_key_pair()?) })
            .transpose()
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |key: &Option<String>| key.as_ref().map(|_| "***");

        f.debug_struct("Config")
            .field("version", &self.version)
            .field("ttl_secs", &self.ttl_secs)
            .field("implicit_assertion", &self.implicit_assertion)
            .field("local_key", &redact(&self.local_key))
            .field("secret_key", &redact(&self.secret_key))
            .finish()
    }
}

impl Drop for Config {
    fn drop(&mut self) {
        self.local_key.zeroize();
        self.secret_key.zeroize();
    }
}
