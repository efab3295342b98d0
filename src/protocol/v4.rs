//! PASETO version 4 local and public tokens.

use crate::hash::{self, Chunk};
use crate::keys::{KeyPair, PublicKey, SharedKey};
use crate::pae::pre_auth_encode;
use crate::protocol::{check_header, decode_body, decode_footer, random_bytes, Error, Protocol};
use crate::token::{Message, Purpose, Token, Version};

use blake2::{
    digest::consts::{U32, U56},
    Blake2bMac,
};
use chacha20::{
    cipher::{KeyIvInit, StreamCipher},
    Key, XChaCha20, XNonce,
};
use ed25519_dalek::{Signature, Signer};
use subtle::ConstantTimeEq;
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop};

const LOCAL_HEADER: &str = "v4.local.";
const PUBLIC_HEADER: &str = "v4.public.";

const DOMAIN_ENCRYPT: &[u8] = b"paseto-encryption-key";
const DOMAIN_AUTH: &[u8] = b"paseto-auth-key-for-aead";

const NONCE_LEN: usize = 32;
const MAC_LEN: usize = 32;
const SIGNATURE_LEN: usize = 64;

/// PASETO v4: XChaCha20 with a BLAKE2b MAC for local tokens, Ed25519 for
/// public tokens.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProtocolV4;

/// Keys derived from the shared key and a token nonce.
#[derive(Zeroize, ZeroizeOnDrop)]
struct SplitKey {
    cipher_key: [u8; 32],
    cipher_nonce: [u8; 24],
    auth_key: [u8; 32],
}

fn split_key(key: &SharedKey, nonce: &[u8]) -> Result<SplitKey, Error> {
    let mut stretch = hash::keyed::<Blake2bMac<U56>>(
        key.as_bytes(),
        &Chunk::concat(&[DOMAIN_ENCRYPT, nonce]),
    )
    .map_err(|_| Error::CryptoError)?;
    let mut auth = hash::keyed::<Blake2bMac<U32>>(
        key.as_bytes(),
        &Chunk::concat(&[DOMAIN_AUTH, nonce]),
    )
    .map_err(|_| Error::CryptoError)?;

    let mut split = SplitKey {
        cipher_key: [0; 32],
        cipher_nonce: [0; 24],
        auth_key: [0; 32],
    };
    split.cipher_key.copy_from_slice(&stretch[..32]);
    split.cipher_nonce.copy_from_slice(&stretch[32..]);
    split.auth_key.copy_from_slice(&auth);

    stretch.as_mut_slice().zeroize();
    auth.as_mut_slice().zeroize();

    Ok(split)
}

fn apply_keystream(split: &SplitKey, data: &mut [u8]) {
    XChaCha20::new(
        Key::from_slice(&split.cipher_key),
        XNonce::from_slice(&split.cipher_nonce),
    )
    .apply_keystream(data);
}

fn local_mac(
    split: &SplitKey,
    nonce: &[u8],
    ciphertext: &[u8],
    footer: &[u8],
    implicit: &[u8],
) -> Result<[u8; MAC_LEN], Error> {
    let pae = pre_auth_encode(&[
        LOCAL_HEADER.as_bytes(),
        nonce,
        ciphertext,
        footer,
        implicit,
    ]);

    let mac = hash::keyed::<Blake2bMac<U32>>(&split.auth_key, &Chunk::Bytes(&pae))
        .map_err(|_| Error::CryptoError)?;

    let mut out = [0; MAC_LEN];
    out.copy_from_slice(&mac);

    Ok(out)
}

impl ProtocolV4 {
    fn encrypt_with_nonce(
        &self,
        key: &SharedKey,
        message: &Message,
        nonce: &[u8; NONCE_LEN],
        implicit: &[u8],
    ) -> Result<Token, Error> {
        let split = split_key(key, nonce)?;

        let mut c = message.payload().to_vec();
        apply_keystream(&split, &mut c);

        let mac = local_mac(&split, nonce, &c, message.footer(), implicit)?;

        Ok(Token::from_parts(
            Version::V4,
            Purpose::Local,
            &[nonce.as_slice(), &c, &mac].concat(),
            message.footer(),
        ))
    }
}

impl Protocol for ProtocolV4 {
    fn version(&self) -> Version {
        Version::V4
    }

    fn encrypt(
        &self,
        key: &SharedKey,
        message: &Message,
        implicit: &[u8],
    ) -> Result<Token, Error> {
        let nonce = random_bytes::<NONCE_LEN>()?;

        self.encrypt_with_nonce(key, message, &nonce, implicit)
    }

    fn decrypt(&self, key: &SharedKey, token: &Token, implicit: &[u8]) -> Result<Message, Error> {
        check_header(token, Version::V4, Purpose::Local)?;

        let body = decode_body(token)?;
        if body.len() < NONCE_LEN + MAC_LEN {
            return Err(Error::InvalidBody);
        }
        let footer = decode_footer(token)?;

        let (nonce, remaining) = body.split_at(NONCE_LEN);
        let (c, mac) = remaining.split_at(remaining.len() - MAC_LEN);

        let split = split_key(key, nonce)?;
        let expected = local_mac(&split, nonce, c, &footer, implicit)?;

        // the ciphertext is only touched once the MAC has been checked
        if !bool::from(expected[..].ct_eq(mac)) {
            debug!("local token failed authentication");
            return Err(Error::InvalidSignature);
        }

        let mut p = c.to_vec();
        apply_keystream(&split, &mut p);

        Ok(Message::new(p, footer))
    }

    fn sign(&self, key: &KeyPair, message: &Message, implicit: &[u8]) -> Result<Token, Error> {
        let sig = key.signing_key().sign(&pre_auth_encode(&[
            PUBLIC_HEADER.as_bytes(),
            message.payload(),
            message.footer(),
            implicit,
        ]));

        Ok(Token::from_parts(
            Version::V4,
            Purpose::Public,
            &[message.payload(), &sig.to_bytes()].concat(),
            message.footer(),
        ))
    }

    fn verify(&self, key: &PublicKey, token: &Token, implicit: &[u8]) -> Result<Message, Error> {
        check_header(token, Version::V4, Purpose::Public)?;

        let body = decode_body(token)?;
        if body.len() < SIGNATURE_LEN {
            return Err(Error::MissingSignature);
        }
        let footer = decode_footer(token)?;

        let (m, sig) = body.split_at(body.len() - SIGNATURE_LEN);
        let sig = Signature::from_slice(sig).map_err(|_| Error::InvalidSignature)?;

        key.verifying_key()
            .verify_strict(
                &pre_auth_encode(&[PUBLIC_HEADER.as_bytes(), m, &footer, implicit]),
                &sig,
            )
            .map_err(|_| {
                debug!("public token failed verification");
                Error::InvalidSignature
            })?;

        Ok(Message::new(m.to_vec(), footer))
    }
}
