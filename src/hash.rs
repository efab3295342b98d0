//! BLAKE2b generic hashing.
//!
//! Inputs are described as a tree of [`Chunk`]s and fed depth-first into the
//! hash state, so callers can hash domain separators, nonces and nested
//! sequences without concatenating them first.

use blake2::{
    digest::{KeyInit, Mac, Output, Update, VariableOutput},
    Blake2bVar,
};
use thiserror::Error;

/// Errors while hashing.
#[derive(Error, Clone, Debug, PartialEq)]
pub enum Error {
    #[error("hash key has an invalid length")]
    InvalidKeyLength,
    #[error("hash output has an invalid length")]
    InvalidOutputLength,
}

/// A piece of hash input: either raw bytes or a nested sequence of pieces.
#[derive(Clone, Debug)]
pub enum Chunk<'a> {
    Bytes(&'a [u8]),
    Nested(Vec<Chunk<'a>>),
}

impl<'a> Chunk<'a> {
    /// A flat sequence of byte strings, hashed in order.
    pub fn concat(parts: &[&'a [u8]]) -> Self {
        Chunk::Nested(parts.iter().map(|p| Chunk::Bytes(p)).collect())
    }
}

impl<'a> From<&'a [u8]> for Chunk<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Chunk::Bytes(bytes)
    }
}

impl<'a> From<&'a str> for Chunk<'a> {
    fn from(s: &'a str) -> Self {
        Chunk::Bytes(s.as_bytes())
    }
}

/// Feed a chunk tree into a hash state.
pub fn pump<U: Update>(ctx: &mut U, chunk: &Chunk<'_>) {
    match chunk {
        Chunk::Bytes(bytes) => ctx.update(bytes),
        Chunk::Nested(chunks) => {
            for c in chunks {
                pump(ctx, c);
            }
        }
    }
}

/// Unkeyed BLAKE2b output sizes used in this crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    Blake2b128,
    Blake2b192,
    Blake2b256,
    /// 264 bits, the PASERK key identifier size.
    Blake2b264,
    Blake2b384,
    Blake2b512,
}

impl HashAlgorithm {
    /// Digest size in bytes.
    pub const fn output_len(self) -> usize {
        match self {
            HashAlgorithm::Blake2b128 => 16,
            HashAlgorithm::Blake2b192 => 24,
            HashAlgorithm::Blake2b256 => 32,
            HashAlgorithm::Blake2b264 => 33,
            HashAlgorithm::Blake2b384 => 48,
            HashAlgorithm::Blake2b512 => 64,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            HashAlgorithm::Blake2b128 => "blake2b-128",
            HashAlgorithm::Blake2b192 => "blake2b-192",
            HashAlgorithm::Blake2b256 => "blake2b-256",
            HashAlgorithm::Blake2b264 => "blake2b-264",
            HashAlgorithm::Blake2b384 => "blake2b-384",
            HashAlgorithm::Blake2b512 => "blake2b-512",
        }
    }
}

/// Hash a chunk tree with unkeyed BLAKE2b.
pub fn digest(algorithm: HashAlgorithm, input: &Chunk<'_>) -> Result<Vec<u8>, Error> {
    let mut ctx =
        Blake2bVar::new(algorithm.output_len()).map_err(|_| Error::InvalidOutputLength)?;
    pump(&mut ctx, input);

    let mut out = vec![0; algorithm.output_len()];
    ctx.finalize_variable(&mut out)
        .map_err(|_| Error::InvalidOutputLength)?;

    Ok(out)
}

/// Hash a chunk tree with a keyed MAC, usually `Blake2bMac<N>`.
///
/// # Errors
///
/// Returns an error if the MAC does not accept a key of this length (for
/// BLAKE2b, keys must be at most 64 bytes).
pub fn keyed<M>(key: &[u8], input: &Chunk<'_>) -> Result<Output<M>, Error>
where
    M: Mac + KeyInit + Update,
{
    let mut mac = <M as KeyInit>::new_from_slice(key).map_err(|_| Error::InvalidKeyLength)?;
    pump(&mut mac, input);

    Ok(Mac::finalize(mac).into_bytes())
}
