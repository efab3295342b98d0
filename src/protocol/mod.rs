//! PASETO protocol versions.
//!
//! Each supported version implements [`Protocol`]. Tokens are dispatched by
//! the version tag they carry on the wire and nothing else, see
//! [`for_version`].

pub mod v2;
pub mod v4;

pub use v2::ProtocolV2;
pub use v4::ProtocolV4;

use base64ct::{Base64UrlUnpadded, Encoding};
use getrandom::getrandom;
use thiserror::Error;
use tracing::{debug, error};

use crate::keys::{KeyPair, PublicKey, SharedKey};
use crate::token::{Message, Purpose, Token, Version};

/// Errors while encrypting, decrypting, signing or verifying tokens.
///
/// Every authentication failure is reported as [`Error::InvalidSignature`],
/// whatever its cause.
#[derive(Error, Clone, Debug, PartialEq)]
pub enum Error {
    #[error("token version or purpose does not match the protocol")]
    VersionMismatch,
    #[error("unsupported protocol version {0}")]
    UnsupportedVersion(Version),
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("missing signature")]
    MissingSignature,
    #[error("unable to decode token body")]
    InvalidBody,
    #[error("unable to decode token footer")]
    InvalidFooter,
    #[error("implicit assertions are not supported by this protocol version")]
    ImplicitAssertionUnsupported,
    #[error("failed to get randomness for nonce")]
    RngError,
    #[error("cryptographic operation failed")]
    CryptoError,
}

/// One PASETO protocol version.
///
/// Implementations are stateless; every call is independent.
pub trait Protocol: Send + Sync {
    fn version(&self) -> Version;

    /// Encrypt a message into a local token.
    fn encrypt(&self, key: &SharedKey, message: &Message, implicit: &[u8])
        -> Result<Token, Error>;

    /// Authenticate and decrypt a local token. No plaintext is produced
    /// unless the token authenticates.
    fn decrypt(&self, key: &SharedKey, token: &Token, implicit: &[u8])
        -> Result<Message, Error>;

    /// Sign a message into a public token.
    fn sign(&self, key: &KeyPair, message: &Message, implicit: &[u8]) -> Result<Token, Error>;

    /// Verify a public token's signature.
    fn verify(&self, key: &PublicKey, token: &Token, implicit: &[u8])
        -> Result<Message, Error>;
}

/// A protocol version this crate refuses to implement.
#[derive(Clone, Copy, Debug)]
pub struct Unsupported(Version);

impl Protocol for Unsupported {
    fn version(&self) -> Version {
        self.0
    }

    fn encrypt(&self, _: &SharedKey, _: &Message, _: &[u8]) -> Result<Token, Error> {
        Err(Error::UnsupportedVersion(self.0))
    }

    fn decrypt(&self, _: &SharedKey, _: &Token, _: &[u8]) -> Result<Message, Error> {
        Err(Error::UnsupportedVersion(self.0))
    }

    fn sign(&self, _: &KeyPair, _: &Message, _: &[u8]) -> Result<Token, Error> {
        Err(Error::UnsupportedVersion(self.0))
    }

    fn verify(&self, _: &PublicKey, _: &Token, _: &[u8]) -> Result<Message, Error> {
        Err(Error::UnsupportedVersion(self.0))
    }
}

/// The implementation of a protocol version. V1 and V3 resolve to an
/// implementation that always fails.
pub fn for_version(version: Version) -> &'static dyn Protocol {
    match version {
        Version::V4 => &ProtocolV4,
        Version::V2 => &ProtocolV2,
        Version::V1 => &Unsupported(Version::V1),
        Version::V3 => &Unsupported(Version::V3),
    }
}

pub(crate) fn check_header(token: &Token, version: Version, purpose: Purpose) -> Result<(), Error> {
    if token.version() == version && token.purpose() == purpose {
        Ok(())
    } else {
        debug!(
            "{}.{} token presented to {}.{}",
            token.version(),
            token.purpose(),
            version,
            purpose
        );
        Err(Error::VersionMismatch)
    }
}

pub(crate) fn decode_body(token: &Token) -> Result<Vec<u8>, Error> {
    Base64UrlUnpadded::decode_vec(token.body()).map_err(|_| Error::InvalidBody)
}

pub(crate) fn decode_footer(token: &Token) -> Result<Vec<u8>, Error> {
    token.footer().map_err(|_| Error::InvalidFooter)
}

pub(crate) fn random_bytes<const N: usize>() -> Result<[u8; N], Error> {
    let mut bytes = [0; N];
    getrandom(&mut bytes).map_err(|e| {
        error!("unable to read from the system rng: {}", e);
        Error::RngError
    })?;

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> Message {
        Message::new(
            b"{\"data\":\"this is a message\"}".to_vec(),
            b"{\"kid\":\"k4.lid.x\"}".to_vec(),
        )
    }

    #[test]
    fn dispatch() {
        assert_eq!(for_version(Version::V4).version(), Version::V4);
        assert_eq!(for_version(Version::V2).version(), Version::V2);
        assert_eq!(for_version(Version::V1).version(), Version::V1);
        assert_eq!(for_version(Version::V3).version(), Version::V3);
    }

    #[test]
    fn legacy_versions_fail() {
        let key = SharedKey::from([0; 32]);
        let pair = KeyPair::from_seed(&[0; 32]);
        let token = Token::parse("v1.local.AAAA").expect("parse token");

        for version in [Version::V1, Version::V3] {
            let protocol = for_version(version);
            let unsupported = Err(Error::UnsupportedVersion(version));

            assert_eq!(protocol.encrypt(&key, &message(), b"").map(|_| ()), unsupported);
            assert_eq!(protocol.decrypt(&key, &token, b"").map(|_| ()), unsupported);
            assert_eq!(protocol.sign(&pair, &message(), b"").map(|_| ()), unsupported);
            assert_eq!(
                protocol.verify(&pair.public_key(), &token, b"").map(|_| ()),
                unsupported
            );
        }
    }

    #[test]
    fn versions_are_isolated() {
        let key = SharedKey::from([7; 32]);

        let v4 = ProtocolV4.encrypt(&key, &message(), b"").expect("encrypt");
        let v2 = ProtocolV2.encrypt(&key, &message(), b"").expect("encrypt");

        assert_eq!(ProtocolV2.decrypt(&key, &v4, b""), Err(Error::VersionMismatch));
        assert_eq!(ProtocolV4.decrypt(&key, &v2, b""), Err(Error::VersionMismatch));
    }

    #[test]
    fn purposes_are_isolated() {
        let key = SharedKey::from([7; 32]);
        let pair = KeyPair::from_seed(&[7; 32]);

        for protocol in [for_version(Version::V2), for_version(Version::V4)] {
            let local = protocol.encrypt(&key, &message(), b"").expect("encrypt");
            let public = protocol.sign(&pair, &message(), b"").expect("sign");

            assert_eq!(
                protocol.verify(&pair.public_key(), &local, b""),
                Err(Error::VersionMismatch)
            );
            assert_eq!(
                protocol.decrypt(&key, &public, b""),
                Err(Error::VersionMismatch)
            );
        }
    }

    #[test]
    fn bad_body_encoding() {
        let key = SharedKey::from([7; 32]);

        // grammatically valid, not canonical base64url
        let token = Token::parse("v4.local.A").expect("parse token");
        assert_eq!(ProtocolV4.decrypt(&key, &token, b""), Err(Error::InvalidBody));
    }

    #[test]
    fn random_bytes_differ() {
        let a = random_bytes::<32>().expect("random");
        let b = random_bytes::<32>().expect("random");
        assert_ne!(a, b);
    }
}
