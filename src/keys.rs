//! Key material for local and public tokens.
//!
//! Secret key types overwrite their backing memory with zeroes when dropped,
//! on every exit path.

use std::fmt;

use ed25519_dalek::pkcs8::DecodePrivateKey;
use getrandom::getrandom;
use subtle::ConstantTimeEq;
use thiserror::Error;
use tracing::error;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Errors while creating or importing keys.
#[derive(Error, Clone, Debug, PartialEq)]
pub enum Error {
    #[error("key has an invalid size")]
    SizeError,
    #[error("invalid key material")]
    InvalidKey,
    #[error("unable to decode private key")]
    PemError,
    #[error("failed to get randomness for key")]
    RngError,
}

/// A symmetric key for local tokens.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SharedKey([u8; 32]);

impl SharedKey {
    pub const LEN: usize = 32;

    /// Generate a new random key.
    pub fn generate() -> Result<Self, Error> {
        let mut key = [0; Self::LEN];
        getrandom(&mut key).map_err(|_| {
            error!("unable to read from the system rng");
            Error::RngError
        })?;

        Ok(Self(key))
    }

    pub fn from_slice(key: &[u8]) -> Result<Self, Error> {
        Ok(Self(key.try_into().map_err(|_| Error::SizeError)?))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for SharedKey {
    fn from(key: [u8; 32]) -> Self {
        Self(key)
    }
}

impl PartialEq for SharedKey {
    fn eq(&self, other: &Self) -> bool {
        self.0[..].ct_eq(&other.0[..]).into()
    }
}

impl Eq for SharedKey {}

impl fmt::Debug for SharedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedKey(***)")
    }
}

/// An Ed25519 key pair for signing public tokens.
///
/// The inner signing key zeroes itself on drop.
#[derive(Clone)]
pub struct KeyPair(ed25519_dalek::SigningKey);

impl KeyPair {
    /// Generate a new random key pair.
    pub fn generate() -> Result<Self, Error> {
        let mut seed = Zeroizing::new([0; 32]);
        getrandom(&mut *seed).map_err(|_| {
            error!("unable to read from the system rng");
            Error::RngError
        })?;

        Ok(Self::from_seed(&seed))
    }

    /// Create a key pair from a 32 byte Ed25519 seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self(ed25519_dalek::SigningKey::from_bytes(seed))
    }

    /// Create a key pair from the 64 byte `seed || public key` encoding,
    /// checking that the public half matches the seed.
    pub fn from_keypair_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let bytes: &[u8; 64] = bytes.try_into().map_err(|_| Error::SizeError)?;

        ed25519_dalek::SigningKey::from_keypair_bytes(bytes)
            .map(Self)
            .map_err(|_| Error::InvalidKey)
    }

    /// Create a new key pair from an Ed25519 secret key in a PEM-encoded
    /// PKCS#8 document.
    pub fn from_pem(pem: &str) -> Result<Self, Error> {
        match ed25519_dalek::SigningKey::from_pkcs8_pem(pem) {
            Ok(key) => Ok(Self(key)),
            Err(_) => Err(Error::PemError),
        }
    }

    /// The 64 byte `seed || public key` encoding.
    pub fn to_keypair_bytes(&self) -> Zeroizing<[u8; 64]> {
        Zeroizing::new(self.0.to_keypair_bytes())
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.0.verifying_key())
    }

    pub(crate) fn signing_key(&self) -> &ed25519_dalek::SigningKey {
        &self.0
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("KeyPair").field(&self.public_key()).finish()
    }
}

/// An Ed25519 public key for verifying public tokens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublicKey(ed25519_dalek::VerifyingKey);

impl PublicKey {
    pub const LEN: usize = 32;

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let bytes: &[u8; 32] = bytes.try_into().map_err(|_| Error::SizeError)?;

        ed25519_dalek::VerifyingKey::from_bytes(bytes)
            .map(Self)
            .map_err(|_| Error::InvalidKey)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }

    pub(crate) fn verifying_key(&self) -> &ed25519_dalek::VerifyingKey {
        &self.0
    }
}
