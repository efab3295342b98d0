//! PASETO version 2 local and public tokens.
//!
//! Version 2 predates implicit assertions. Any non-empty implicit assertion
//! is refused rather than silently dropped.

use crate::hash::{self, Chunk};
use crate::keys::{KeyPair, PublicKey, SharedKey};
use crate::pae::pre_auth_encode;
use crate::protocol::{check_header, decode_body, decode_footer, random_bytes, Error, Protocol};
use crate::token::{Message, Purpose, Token, Version};

use blake2::{digest::consts::U24, Blake2bMac};
use chacha20poly1305::{
    aead::{Aead, KeyInit, Payload},
    Key, XChaCha20Poly1305, XNonce,
};
use ed25519_dalek::{Signature, Signer};
use tracing::debug;

const LOCAL_HEADER: &str = "v2.local.";
const PUBLIC_HEADER: &str = "v2.public.";

const NONCE_LEN: usize = 24;
const TAG_LEN: usize = 16;
const SIGNATURE_LEN: usize = 64;

/// PASETO v2: XChaCha20-Poly1305 for local tokens, Ed25519 for public
/// tokens.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProtocolV2;

fn refuse_implicit(implicit: &[u8]) -> Result<(), Error> {
    if implicit.is_empty() {
        Ok(())
    } else {
        debug!("refusing implicit assertion for a v2 token");
        Err(Error::ImplicitAssertionUnsupported)
    }
}

impl ProtocolV2 {
    /// The nonce is a BLAKE2b hash of the payload keyed with random bytes,
    /// so a broken RNG alone does not repeat nonces across messages.
    fn encrypt_with_prenonce(
        &self,
        key: &SharedKey,
        message: &Message,
        prenonce: &[u8; NONCE_LEN],
    ) -> Result<Token, Error> {
        let nonce =
            hash::keyed::<Blake2bMac<U24>>(prenonce, &Chunk::Bytes(message.payload()))
                .map_err(|_| Error::CryptoError)?;

        let aad = pre_auth_encode(&[LOCAL_HEADER.as_bytes(), &nonce, message.footer()]);

        let c = XChaCha20Poly1305::new(Key::from_slice(key.as_bytes()))
            .encrypt(
                XNonce::from_slice(&nonce),
                Payload {
                    msg: message.payload(),
                    aad: &aad,
                },
            )
            .map_err(|_| Error::CryptoError)?;

        Ok(Token::from_parts(
            Version::V2,
            Purpose::Local,
            &[nonce.as_slice(), &c].concat(),
            message.footer(),
        ))
    }
}

impl Protocol for ProtocolV2 {
    fn version(&self) -> Version {
        Version::V2
    }

    fn encrypt(
        &self,
        key: &SharedKey,
        message: &Message,
        implicit: &[u8],
    ) -> Result<Token, Error> {
        refuse_implicit(implicit)?;

        let prenonce = random_bytes::<NONCE_LEN>()?;

        self.encrypt_with_prenonce(key, message, &prenonce)
    }

    fn decrypt(&self, key: &SharedKey, token: &Token, implicit: &[u8]) -> Result<Message, Error> {
        check_header(token, Version::V2, Purpose::Local)?;
        refuse_implicit(implicit)?;

        let body = decode_body(token)?;
        if body.len() < NONCE_LEN + TAG_LEN {
            return Err(Error::InvalidBody);
        }
        let footer = decode_footer(token)?;

        let (nonce, c) = body.split_at(NONCE_LEN);
        let aad = pre_auth_encode(&[LOCAL_HEADER.as_bytes(), nonce, &footer]);

        let p = XChaCha20Poly1305::new(Key::from_slice(key.as_bytes()))
            .decrypt(XNonce::from_slice(nonce), Payload { msg: c, aad: &aad })
            .map_err(|_| {
                debug!("local token failed authentication");
                Error::InvalidSignature
            })?;

        Ok(Message::new(p, footer))
    }

    fn sign(&self, key: &KeyPair, message: &Message, implicit: &[u8]) -> Result<Token, Error> {
        refuse_implicit(implicit)?;

        let sig = key.signing_key().sign(&pre_auth_encode(&[
            PUBLIC_HEADER.as_bytes(),
            message.payload(),
            message.footer(),
        ]));

        Ok(Token::from_parts(
            Version::V2,
            Purpose::Public,
            &[message.payload(), &sig.to_bytes()].concat(),
            message.footer(),
        ))
    }

    fn verify(&self, key: &PublicKey, token: &Token, implicit: &[u8]) -> Result<Message, Error> {
        check_header(token, Version::V2, Purpose::Public)?;
        refuse_implicit(implicit)?;

        let body = decode_body(token)?;
        if body.len() < SIGNATURE_LEN {
            return Err(Error::MissingSignature);
        }
        let footer = decode_footer(token)?;

        let (m, sig) = body.split_at(body.len() - SIGNATURE_LEN);
        let sig = Signature::from_slice(sig).map_err(|_| Error::InvalidSignature)?;

        key.verifying_key()
            .verify_strict(
                &pre_auth_encode(&[PUBLIC_HEADER.as_bytes(), m, &footer]),
                &sig,
            )
            .map_err(|_| {
                debug!("public token failed verification");
                Error::InvalidSignature
            })?;

        Ok(Message::new(m.to_vec(), footer))
    }
}
