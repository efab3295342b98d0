//! Issuing and reading tokens.
//!
//! [`TokenService`] ties claims, keys and protocol versions together. New
//! tokens are issued with the configured version and carry the id of their
//! key in the footer. Existing tokens are always handled by the version
//! written in the token itself.

use time::Duration;
use tracing::{debug, warn};

use crate::claims::{
    DecodedFooterClaims, DecodedPayloadClaims, FooterClaims, PayloadClaims, PayloadClaimsBuilder,
    DEFAULT_TTL,
};
use crate::config::{self, Config};
use crate::error::{Error, Result};
use crate::keys::{KeyPair, PublicKey, SharedKey};
use crate::paserk::{Paserk, PaserkKey};
use crate::protocol::{self, Protocol};
use crate::token::{Message, Token, Version};

/// Claims read back from an authenticated token.
///
/// Authentic does not mean current: check the payload with
/// [`crate::claims::validate`] before use.
#[derive(Clone, Debug, PartialEq)]
pub struct Verified {
    pub payload: DecodedPayloadClaims,
    pub footer: DecodedFooterClaims,
}

/// A newly issued token and the exact claims it was built from.
#[derive(Clone, Debug, PartialEq)]
pub struct Issued {
    pub token: Token,
    pub payload: PayloadClaims,
    pub footer: FooterClaims,
}

#[derive(Clone, Debug)]
pub struct TokenService {
    version: Version,
    ttl: Duration,
}

impl TokenService {
    /// A service issuing v4 tokens that expire after ten minutes.
    pub fn new() -> Self {
        Self {
            version: Version::V4,
            ttl: DEFAULT_TTL,
        }
    }

    /// Issue tokens with a different protocol version.
    ///
    /// # Errors
    ///
    /// Only v2 and v4 can issue tokens.
    pub fn with_version(mut self, version: Version) -> Result<Self> {
        if !matches!(version, Version::V2 | Version::V4) {
            return Err(config::Error::UnsupportedVersion(version).into());
        }
        self.version = version;

        Ok(self)
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;

        self
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        Self::new()
            .with_ttl(config.ttl()?)
            .with_version(config.version)
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// A claims builder using this service's token lifetime.
    pub fn claims(&self) -> PayloadClaimsBuilder {
        PayloadClaims::builder().with_ttl(self.ttl)
    }

    fn key_id<K: PaserkKey>(&self, version: Version, key: &K) -> Result<Paserk> {
        Ok(Paserk::key_id(version.paserk_version(), key)?)
    }

    /// Encrypt claims into a local token. The `lid` of `key` is placed in
    /// the footer as `kid`.
    pub fn encrypt(
        &self,
        key: &SharedKey,
        payload: PayloadClaims,
        footer: FooterClaims,
        implicit: &[u8],
    ) -> Result<Issued> {
        let footer = footer.with_key_id(self.key_id(self.version, key)?)?;
        let message = Message::new(payload.encode()?, footer.encode()?);

        let token = protocol::for_version(self.version).encrypt(key, &message, implicit)?;
        debug!("issued {} token {}", token.header(), payload.token_identifier());

        Ok(Issued {
            token,
            payload,
            footer,
        })
    }

    /// Sign claims into a public token. The `pid` of the key pair's public
    /// key is placed in the footer as `kid`.
    pub fn sign(
        &self,
        key: &KeyPair,
        payload: PayloadClaims,
        footer: FooterClaims,
        implicit: &[u8],
    ) -> Result<Issued> {
        let footer = footer.with_key_id(self.key_id(self.version, &key.public_key())?)?;
        let message = Message::new(payload.encode()?, footer.encode()?);

        let token = protocol::for_version(self.version).sign(key, &message, implicit)?;
        debug!("issued {} token {}", token.header(), payload.token_identifier());

        Ok(Issued {
            token,
            payload,
            footer,
        })
    }

    /// Decrypt a local token with the protocol version it names.
    ///
    /// # Errors
    ///
    /// A footer that is not a JSON object fails before the key is used.
    /// Besides authentication failures, a token whose footer names a
    /// different key fails with [`Error::KeyIdMismatch`].
    pub fn decrypt(&self, key: &SharedKey, token: &Token, implicit: &[u8]) -> Result<Verified> {
        let footer = DecodedFooterClaims::decode(&token.footer()?)?;
        let message = protocol::for_version(token.version()).decrypt(key, token, implicit)?;

        self.open(message, footer, || self.key_id(token.version(), key))
    }

    /// Verify a public token with the protocol version it names.
    pub fn verify(&self, key: &PublicKey, token: &Token, implicit: &[u8]) -> Result<Verified> {
        let footer = DecodedFooterClaims::decode(&token.footer()?)?;
        let message = protocol::for_version(token.version()).verify(key, token, implicit)?;

        self.open(message, footer, || self.key_id(token.version(), key))
    }

    fn open<F>(&self, message: Message, footer: DecodedFooterClaims, key_id: F) -> Result<Verified>
    where
        F: FnOnce() -> Result<Paserk>,
    {
        let (payload, _) = message.into_parts();

        if let Some(found) = footer.key_id() {
            let expected = key_id()?;
            if found != &expected {
                warn!("token names key {} but was opened with {}", found, expected);
                return Err(Error::KeyIdMismatch {
                    expected,
                    found: found.clone(),
                });
            }
        }

        Ok(Verified {
            payload: DecodedPayloadClaims::decode(&payload)?,
            footer,
        })
    }
}

impl Default for TokenService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::claims::validate;
    use crate::paserk::{PaserkType, PaserkVersion};

    fn claims(service: &TokenService) -> PayloadClaims {
        service
            .claims()
            .with_subject("Foo Bar")
            .expect("set subject")
            .build()
            .expect("build claims")
    }

    #[test]
    fn encrypt_injects_lid() {
        let service = TokenService::new();
        let key = SharedKey::from([3; 32]);

        let issued = service
            .encrypt(&key, claims(&service), FooterClaims::new(), b"")
            .expect("encrypt");

        let expected = Paserk::local(PaserkVersion::K4, &key)
            .and_then(|p| p.lid())
            .expect("derive lid");
        assert_eq!(issued.footer.key_id(), Some(&expected));

        let verified = service.decrypt(&key, &issued.token, b"").expect("decrypt");
        assert_eq!(verified.footer.key_id(), Some(&expected));
        assert_eq!(verified.payload.subject(), Some("Foo Bar"));
        assert!(validate(&verified.payload, issued.payload.issued_at()));
    }

    #[test]
    fn sign_injects_pid() {
        let service = TokenService::new().with_version(Version::V2).expect("v2");
        let pair = KeyPair::from_seed(&[3; 32]);

        let issued = service
            .sign(&pair, claims(&service), FooterClaims::new(), b"")
            .expect("sign");
        assert_eq!(issued.token.version(), Version::V2);
        assert_eq!(
            issued.footer.key_id().map(Paserk::kind),
            Some(PaserkType::Pid)
        );
        assert_eq!(
            issued.footer.key_id().map(Paserk::version),
            Some(PaserkVersion::K2)
        );

        let verified = service
            .verify(&pair.public_key(), &issued.token, b"")
            .expect("verify");
        assert_eq!(
            verified.payload.claims(),
            &issued.payload.to_json().expect("to json")
        );
    }

    #[test]
    fn legacy_versions_cannot_issue() {
        for version in [Version::V1, Version::V3] {
            assert_eq!(
                TokenService::new().with_version(version).unwrap_err(),
                Error::Config(config::Error::UnsupportedVersion(version))
            );
        }
    }

    #[test]
    fn dispatch_follows_token() {
        let key = SharedKey::from([3; 32]);
        let v2 = TokenService::new().with_version(Version::V2).expect("v2");
        let v4 = TokenService::new();

        let issued = v2
            .encrypt(&key, claims(&v2), FooterClaims::new(), b"")
            .expect("encrypt");

        // a v4 service still opens v2 tokens with the v2 protocol
        let verified = v4.decrypt(&key, &issued.token, b"").expect("decrypt");
        assert_eq!(verified.payload.subject(), Some("Foo Bar"));
    }

    #[test]
    fn unsupported_token_versions() {
        let service = TokenService::new();
        let key = SharedKey::from([3; 32]);
        let token = Token::parse("v3.local.AAAA").expect("parse token");

        assert_eq!(
            service.decrypt(&key, &token, b"").unwrap_err(),
            Error::Protocol(protocol::Error::UnsupportedVersion(Version::V3))
        );
    }

    #[test]
    fn key_id_mismatch() {
        let service = TokenService::new();
        let key = SharedKey::from([3; 32]);
        let other = SharedKey::from([4; 32]);

        // authentic token whose footer names a different key
        let other_lid = Paserk::key_id(PaserkVersion::K4, &other).expect("derive lid");
        let footer = FooterClaims::new()
            .with_key_id(other_lid.clone())
            .expect("set kid");
        let message = Message::new(
            claims(&service).encode().expect("encode"),
            footer.encode().expect("encode"),
        );
        let token = protocol::ProtocolV4
            .encrypt(&key, &message, b"")
            .expect("encrypt");

        match service.decrypt(&key, &token, b"") {
            Err(Error::KeyIdMismatch { found, .. }) => assert_eq!(found, other_lid),
            res => panic!("unexpected result {res:?}"),
        }
    }

    #[test]
    fn malformed_footer_before_key() {
        let service = TokenService::new();
        let key = SharedKey::from([3; 32]);
        let pair = KeyPair::from_seed(&[3; 32]);
        let message = Message::new(
            claims(&service).encode().expect("encode"),
            b"[1,2,3]".to_vec(),
        );

        let local = protocol::ProtocolV4
            .encrypt(&key, &message, b"")
            .expect("encrypt");
        let public = protocol::ProtocolV4
            .sign(&pair, &message, b"")
            .expect("sign");

        // same error with the right key and the wrong one
        for key in [key, SharedKey::from([4; 32])] {
            assert_eq!(
                service.decrypt(&key, &local, b"").unwrap_err(),
                Error::Claims(crate::claims::Error::NotAnObject)
            );
        }
        let other = KeyPair::from_seed(&[4; 32]);
        for pair in [pair, other] {
            assert_eq!(
                service.verify(&pair.public_key(), &public, b"").unwrap_err(),
                Error::Claims(crate::claims::Error::NotAnObject)
            );
        }
    }

    #[test]
    fn wrong_key_is_auth_failure() {
        let service = TokenService::new();
        let issued = service
            .encrypt(
                &SharedKey::from([3; 32]),
                claims(&service),
                FooterClaims::new(),
                b"",
            )
            .expect("encrypt");

        let err = service
            .decrypt(&SharedKey::from([4; 32]), &issued.token, b"")
            .unwrap_err();
        assert!(err.is_auth_failure());
    }
}
