//! PASERK key serialization and key identifiers.
//!
//! A PASERK is `k{version}.{type}[.{prefix}].{data}`. Which types need a
//! prefix, which id type a key type maps to, and which types may appear in a
//! token footer are all fixed by [`PaserkType::info`].

use std::fmt;
use std::str::FromStr;

use base64ct::{Base64UrlUnpadded, Encoding};
use subtle::ConstantTimeEq;
use thiserror::Error;
use tracing::warn;
use zeroize::Zeroizing;

use crate::hash::{self, Chunk, HashAlgorithm};
use crate::keys::{self, KeyPair, PublicKey, SharedKey};
use crate::token::Purpose;

/// Errors while handling PASERKs.
#[derive(Error, Clone, Debug, PartialEq)]
pub enum Error {
    #[error("invalid PASERK format")]
    InvalidFormat,
    #[error("invalid or unsupported PASERK version")]
    InvalidVersion,
    #[error("unknown PASERK type")]
    InvalidType,
    #[error("PASERK type {0} requires a prefix")]
    PrefixRequired(PaserkType),
    #[error("PASERK type {0} does not allow a prefix")]
    PrefixForbidden(PaserkType),
    #[error("expected a {expected} PASERK, found {found}")]
    TypeMismatch {
        expected: PaserkType,
        found: PaserkType,
    },
    #[error("PASERK version {0} is not supported for this operation")]
    UnsupportedVersion(PaserkVersion),
    #[error("invalid key material")]
    InvalidKey,
    #[error("key id hashing failed: {0}")]
    Hash(#[from] hash::Error),
}

/// PASERK versions, one per PASETO protocol version.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PaserkVersion {
    K1,
    K2,
    K3,
    K4,
}

impl PaserkVersion {
    pub const fn as_str(self) -> &'static str {
        match self {
            PaserkVersion::K1 => "k1",
            PaserkVersion::K2 => "k2",
            PaserkVersion::K3 => "k3",
            PaserkVersion::K4 => "k4",
        }
    }

    /// K2 and K4 use Ed25519 and BLAKE2b, the only key formats this crate
    /// can import or identify.
    pub const fn is_sodium(self) -> bool {
        matches!(self, PaserkVersion::K2 | PaserkVersion::K4)
    }
}

impl fmt::Display for PaserkVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaserkVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "k1" => Ok(PaserkVersion::K1),
            "k2" => Ok(PaserkVersion::K2),
            "k3" => Ok(PaserkVersion::K3),
            "k4" => Ok(PaserkVersion::K4),
            _ => Err(Error::InvalidVersion),
        }
    }
}

/// Every PASERK type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PaserkType {
    Local,
    Lid,
    Public,
    Pid,
    Secret,
    Sid,
    LocalWrap,
    SecretWrap,
    LocalPw,
    SecretPw,
    Seal,
}

/// Static properties of a [`PaserkType`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypeInfo {
    pub name: &'static str,
    pub prefix_required: bool,
    /// The id type derived from this type, if any.
    pub id_type: Option<PaserkType>,
    pub purpose: Purpose,
    pub footer_safe: bool,
}

const fn info(
    name: &'static str,
    prefix_required: bool,
    id_type: Option<PaserkType>,
    purpose: Purpose,
    footer_safe: bool,
) -> TypeInfo {
    TypeInfo {
        name,
        prefix_required,
        id_type,
        purpose,
        footer_safe,
    }
}

impl PaserkType {
    pub const ALL: [PaserkType; 11] = [
        PaserkType::Local,
        PaserkType::Lid,
        PaserkType::Public,
        PaserkType::Pid,
        PaserkType::Secret,
        PaserkType::Sid,
        PaserkType::LocalWrap,
        PaserkType::SecretWrap,
        PaserkType::LocalPw,
        PaserkType::SecretPw,
        PaserkType::Seal,
    ];

    pub const fn info(self) -> TypeInfo {
        use PaserkType::*;
        use Purpose::{Local as L, Public as P};

        match self {
            Local => info("local", false, Some(Lid), L, false),
            Lid => info("lid", false, None, L, true),
            Public => info("public", false, Some(Pid), P, true),
            Pid => info("pid", false, None, P, true),
            Secret => info("secret", false, Some(Sid), P, false),
            Sid => info("sid", false, None, P, true),
            LocalWrap => info("local-wrap", true, None, L, true),
            SecretWrap => info("secret-wrap", true, None, P, true),
            LocalPw => info("local-pw", false, None, L, true),
            SecretPw => info("secret-pw", false, None, P, true),
            Seal => info("seal", false, None, L, true),
        }
    }

    pub const fn as_str(self) -> &'static str {
        self.info().name
    }

    pub const fn id_type(self) -> Option<PaserkType> {
        self.info().id_type
    }

    pub const fn is_id(self) -> bool {
        matches!(self, PaserkType::Lid | PaserkType::Pid | PaserkType::Sid)
    }

    /// Whether the data segment is raw key material.
    pub const fn is_key_bearing(self) -> bool {
        matches!(self, PaserkType::Local | PaserkType::Secret)
    }
}

impl fmt::Display for PaserkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaserkType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaserkType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or(Error::InvalidType)
    }
}

/// A key type with a raw PASERK encoding.
pub trait PaserkKey: Sized {
    const TYPE: PaserkType;

    fn export(&self) -> Zeroizing<Vec<u8>>;

    fn import(bytes: &[u8]) -> Result<Self, keys::Error>;
}

impl PaserkKey for SharedKey {
    const TYPE: PaserkType = PaserkType::Local;

    fn export(&self) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(self.as_bytes().to_vec())
    }

    fn import(bytes: &[u8]) -> Result<Self, keys::Error> {
        SharedKey::from_slice(bytes)
    }
}

impl PaserkKey for PublicKey {
    const TYPE: PaserkType = PaserkType::Public;

    fn export(&self) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(self.as_bytes().to_vec())
    }

    fn import(bytes: &[u8]) -> Result<Self, keys::Error> {
        PublicKey::from_bytes(bytes)
    }
}

impl PaserkKey for KeyPair {
    const TYPE: PaserkType = PaserkType::Secret;

    fn export(&self) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(self.to_keypair_bytes().to_vec())
    }

    fn import(bytes: &[u8]) -> Result<Self, keys::Error> {
        KeyPair::from_keypair_bytes(bytes)
    }
}

/// A serialized key or key identifier.
///
/// The data segment is zeroed on drop, since for `local` and `secret` it is
/// the raw key.
#[derive(Clone)]
pub struct Paserk {
    version: PaserkVersion,
    kind: PaserkType,
    prefix: Option<String>,
    data: Zeroizing<String>,
}

fn valid_segment(s: &str) -> bool {
    !s.is_empty()
        && s.bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

impl Paserk {
    /// Build a PASERK from its parts, checking the type's prefix rule.
    pub fn new(
        version: PaserkVersion,
        kind: PaserkType,
        data: impl Into<String>,
        prefix: Option<String>,
    ) -> Result<Self, Error> {
        let data: Zeroizing<String> = Zeroizing::new(data.into());
        if !valid_segment(&data) {
            return Err(Error::InvalidFormat);
        }

        match (kind.info().prefix_required, &prefix) {
            (true, None) => return Err(Error::PrefixRequired(kind)),
            (false, Some(_)) => return Err(Error::PrefixForbidden(kind)),
            (_, Some(p)) if !valid_segment(p) => return Err(Error::InvalidFormat),
            _ => (),
        }

        Ok(Self {
            version,
            kind,
            prefix,
            data,
        })
    }

    /// Parse a PASERK string with three (`version.type.data`) or four
    /// (`version.type.prefix.data`) segments.
    pub fn parse(s: &str) -> Result<Self, Error> {
        let parts: Vec<&str> = s.split('.').collect();

        let (prefix, data) = match parts.as_slice() {
            [_, _, data] => (None, *data),
            [_, _, prefix, data] => (Some(prefix.to_string()), *data),
            _ => return Err(Error::InvalidFormat),
        };

        Self::new(parts[0].parse()?, parts[1].parse()?, data, prefix)
    }

    pub fn version(&self) -> PaserkVersion {
        self.version
    }

    pub fn kind(&self) -> PaserkType {
        self.kind
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn data(&self) -> &str {
        &self.data
    }

    /// Serialize a key under its own PASERK type.
    ///
    /// # Errors
    ///
    /// Only K2 and K4 keys can be serialized.
    pub fn from_key<K: PaserkKey>(version: PaserkVersion, key: &K) -> Result<Self, Error> {
        if !version.is_sodium() {
            return Err(Error::UnsupportedVersion(version));
        }

        let data = Base64UrlUnpadded::encode_string(&key.export());
        Self::new(version, K::TYPE, data, None)
    }

    /// Serialize a shared key as `local`.
    pub fn local(version: PaserkVersion, key: &SharedKey) -> Result<Self, Error> {
        Self::from_key(version, key)
    }

    /// Serialize a public key as `public`.
    pub fn public(version: PaserkVersion, key: &PublicKey) -> Result<Self, Error> {
        Self::from_key(version, key)
    }

    /// Serialize a key pair as `secret`.
    pub fn secret(version: PaserkVersion, key: &KeyPair) -> Result<Self, Error> {
        Self::from_key(version, key)
    }

    /// The identifier of a key, computed through its serialized form.
    pub fn key_id<K: PaserkKey>(version: PaserkVersion, key: &K) -> Result<Self, Error> {
        let paserk = Self::from_key(version, key)?;
        let target = K::TYPE.id_type().ok_or(Error::TypeMismatch {
            expected: PaserkType::Lid,
            found: K::TYPE,
        })?;

        paserk.derive_id(target)
    }

    /// Derive the `lid` of a `local` PASERK.
    pub fn lid(&self) -> Result<Self, Error> {
        self.derive_id(PaserkType::Lid)
    }

    /// Derive the `pid` of a `public` PASERK.
    pub fn pid(&self) -> Result<Self, Error> {
        self.derive_id(PaserkType::Pid)
    }

    /// Derive the `sid` of a `secret` PASERK.
    pub fn sid(&self) -> Result<Self, Error> {
        self.derive_id(PaserkType::Sid)
    }

    fn derive_id(&self, target: PaserkType) -> Result<Self, Error> {
        // the declared type must map to the requested id type
        if self.kind.id_type() != Some(target) {
            warn!(
                "refusing to derive a {} from a {} paserk",
                target, self.kind
            );
            return Err(Error::TypeMismatch {
                expected: target,
                found: self.kind,
            });
        }
        if !self.version.is_sodium() {
            return Err(Error::UnsupportedVersion(self.version));
        }

        let header = format!("{}.{}.", self.version, target);
        let serialized = Zeroizing::new(self.to_string());
        let id = hash::digest(
            HashAlgorithm::Blake2b264,
            &Chunk::concat(&[header.as_bytes(), serialized.as_bytes()]),
        )?;

        Self::new(
            self.version,
            target,
            Base64UrlUnpadded::encode_string(&id),
            None,
        )
    }

    /// Recover a key from its serialized form.
    ///
    /// # Errors
    ///
    /// Fails if this PASERK is not of the key's own type, is not a K2/K4
    /// PASERK, or does not hold valid key material.
    pub fn import<K: PaserkKey>(&self) -> Result<K, Error> {
        if self.kind != K::TYPE {
            return Err(Error::TypeMismatch {
                expected: K::TYPE,
                found: self.kind,
            });
        }
        if !self.version.is_sodium() {
            return Err(Error::UnsupportedVersion(self.version));
        }

        let bytes = Zeroizing::new(
            Base64UrlUnpadded::decode_vec(&self.data).map_err(|_| Error::InvalidKey)?,
        );

        K::import(&bytes).map_err(|_| Error::InvalidKey)
    }

    pub fn to_shared_key(&self) -> Result<SharedKey, Error> {
        self.import()
    }

    pub fn to_public_key(&self) -> Result<PublicKey, Error> {
        self.import()
    }

    pub fn to_key_pair(&self) -> Result<KeyPair, Error> {
        self.import()
    }
}

impl FromStr for Paserk {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Paserk {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl fmt::Display for Paserk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.", self.version, self.kind)?;
        if let Some(prefix) = &self.prefix {
            write!(f, "{prefix}.")?;
        }
        f.write_str(&self.data)
    }
}

impl fmt::Debug for Paserk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind.is_key_bearing() {
            write!(f, "Paserk({}.{}.***)", self.version, self.kind)
        } else {
            write!(f, "Paserk({self})")
        }
    }
}

impl PartialEq for Paserk {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
            && self.kind == other.kind
            && self.prefix == other.prefix
            && bool::from(self.data.as_bytes().ct_eq(other.data.as_bytes()))
    }
}

impl Eq for Paserk {}

#[cfg(test)]
mod tests {
    use super::*;

    use hex_literal::hex;

    const KEY: [u8; 32] = hex!("707172737475767778797a7b7c7d7e7f808182838485868788898a8b8c8d8e8f");
    const SEED: [u8; 32] = hex!("b4cbfb43df4ce210727d953e4a713307fa19bb7d9f85041438d9e11b942a3774");

    #[test]
    fn local_and_lid() {
        let key = SharedKey::from(KEY);

        let local = Paserk::local(PaserkVersion::K4, &key).expect("serialize key");
        assert_eq!(
            local.to_string(),
            "k4.local.cHFyc3R1dnd4eXp7fH1-f4CBgoOEhYaHiImKi4yNjo8"
        );

        let lid = local.lid().expect("derive lid");
        assert_eq!(
            lid.to_string(),
            "k4.lid.iVtYQDjr5gEijCSjJC3fQaJm7nCeQSeaty0Jixy8dbsk"
        );

        let k2 = Paserk::key_id(PaserkVersion::K2, &key).expect("derive lid");
        assert_eq!(
            k2.to_string(),
            "k2.lid.keK316jg65NYOw6BbBHJHeQ7YWpyuHfNRxBVtY3kNoXG"
        );
    }

    #[test]
    fn lid_is_deterministic() {
        let key = SharedKey::from(KEY);

        let a = Paserk::key_id(PaserkVersion::K4, &key).expect("derive lid");
        let b = Paserk::key_id(PaserkVersion::K4, &key).expect("derive lid");
        assert_eq!(a, b);
        assert_eq!(a.kind(), PaserkType::Lid);
    }

    #[test]
    fn public_secret_and_ids() {
        let pair = KeyPair::from_seed(&SEED);

        let public = Paserk::public(PaserkVersion::K4, &pair.public_key()).expect("serialize");
        assert_eq!(
            public.to_string(),
            "k4.public.Hrnbu7wEfAP9cGBOAHHwmH4Wsot1ciXBHwBBXQ4gsaI"
        );
        assert_eq!(
            public.pid().expect("derive pid").to_string(),
            "k4.pid.yh4-bJYjOYAG6CWy0zsfPmpKylxS7uAWrxqVmBN2KAiJ"
        );

        let secret = Paserk::secret(PaserkVersion::K4, &pair).expect("serialize");
        assert_eq!(
            secret.to_string(),
            "k4.secret.tMv7Q99M4hByfZU-SnEzB_oZu32fhQQUONnhG5QqN3Qeudu7vAR8A_1wYE4AcfCYfhayi3VyJcEfAEFdDiCxog"
        );
        assert_eq!(
            secret.sid().expect("derive sid").to_string(),
            "k4.sid.9gZFsAQuXhu9lif2pV3rCDjOewsMF4qb4RHGhc0zUklt"
        );

        let k2 = Paserk::key_id(PaserkVersion::K2, &pair.public_key()).expect("derive pid");
        assert_eq!(
            k2.to_string(),
            "k2.pid.hUSQn-kVOGDwfL50VH8hKqidIsEasljePCkbchAzLiAL"
        );
    }

    #[test]
    fn id_lucidity() {
        let pair = KeyPair::from_seed(&SEED);
        let public = Paserk::public(PaserkVersion::K4, &pair.public_key()).expect("serialize");
        let secret = Paserk::secret(PaserkVersion::K4, &pair).expect("serialize");

        assert_eq!(
            public.lid(),
            Err(Error::TypeMismatch {
                expected: PaserkType::Lid,
                found: PaserkType::Public
            })
        );
        assert_eq!(
            public.sid(),
            Err(Error::TypeMismatch {
                expected: PaserkType::Sid,
                found: PaserkType::Public
            })
        );
        assert_eq!(
            secret.lid(),
            Err(Error::TypeMismatch {
                expected: PaserkType::Lid,
                found: PaserkType::Secret
            })
        );

        // ids of ids are not a thing
        let lid = Paserk::key_id(PaserkVersion::K4, &SharedKey::from(KEY)).expect("lid");
        assert!(matches!(lid.lid(), Err(Error::TypeMismatch { .. })));
    }

    #[test]
    fn legacy_versions_unsupported() {
        let key = SharedKey::from(KEY);
        assert_eq!(
            Paserk::local(PaserkVersion::K3, &key),
            Err(Error::UnsupportedVersion(PaserkVersion::K3))
        );

        let foreign = Paserk::parse("k1.local.cHFyc3R1dnd4eXp7fH1-f4CBgoOEhYaHiImKi4yNjo8")
            .expect("parse paserk");
        assert_eq!(
            foreign.lid(),
            Err(Error::UnsupportedVersion(PaserkVersion::K1))
        );
        assert!(matches!(
            foreign.to_shared_key(),
            Err(Error::UnsupportedVersion(PaserkVersion::K1))
        ));
    }

    #[test]
    fn import_keys() {
        let key = SharedKey::from(KEY);
        let local = Paserk::local(PaserkVersion::K4, &key).expect("serialize");
        assert_eq!(local.to_shared_key().expect("import"), key);

        let pair = KeyPair::from_seed(&SEED);
        let secret = Paserk::secret(PaserkVersion::K2, &pair).expect("serialize");
        let imported = secret.to_key_pair().expect("import");
        assert_eq!(imported.public_key(), pair.public_key());

        let public: Paserk = "k4.public.Hrnbu7wEfAP9cGBOAHHwmH4Wsot1ciXBHwBBXQ4gsaI"
            .parse()
            .expect("parse");
        assert_eq!(public.to_public_key().expect("import"), pair.public_key());
    }

    #[test]
    fn import_lucidity() {
        let pair = KeyPair::from_seed(&SEED);
        let public = Paserk::public(PaserkVersion::K4, &pair.public_key()).expect("serialize");

        assert!(matches!(
            public.to_shared_key(),
            Err(Error::TypeMismatch {
                expected: PaserkType::Local,
                found: PaserkType::Public
            })
        ));
        assert!(matches!(
            public.to_key_pair(),
            Err(Error::TypeMismatch { .. })
        ));

        let short = Paserk::parse("k4.local.AAAAAAAAAAAAAAAAAAAAAA").expect("parse");
        assert!(matches!(short.to_shared_key(), Err(Error::InvalidKey)));
    }

    #[test]
    fn format_round_trip() {
        for s in [
            "k4.local.cHFyc3R1dnd4eXp7fH1-f4CBgoOEhYaHiImKi4yNjo8",
            "k4.lid.iVtYQDjr5gEijCSjJC3fQaJm7nCeQSeaty0Jixy8dbsk",
            "k2.public.Hrnbu7wEfAP9cGBOAHHwmH4Wsot1ciXBHwBBXQ4gsaI",
            "k2.pid.hUSQn-kVOGDwfL50VH8hKqidIsEasljePCkbchAzLiAL",
            "k4.secret.tMv7Q99M4hByfZU-SnEzB_oZu32fhQQUONnhG5QqN3Qeudu7vAR8A_1wYE4AcfCYfhayi3VyJcEfAEFdDiCxog",
            "k4.sid.9gZFsAQuXhu9lif2pV3rCDjOewsMF4qb4RHGhc0zUklt",
            "k4.local-wrap.pie.cHFyc3R1dnd4eXp7fH1-f4CBgoOEhYaHiImKi4yNjo8",
            "k2.secret-wrap.pie.cHFyc3R1dnd4eXp7fH1-f4CBgoOEhYaHiImKi4yNjo8",
            "k4.local-pw.cHFyc3R1dnd4eXp7fH1-f4CBgoOEhYaHiImKi4yNjo8",
            "k4.secret-pw.cHFyc3R1dnd4eXp7fH1-f4CBgoOEhYaHiImKi4yNjo8",
            "k4.seal.cHFyc3R1dnd4eXp7fH1-f4CBgoOEhYaHiImKi4yNjo8",
            "k1.local.cHFyc3R1dnd4eXp7fH1-f4CBgoOEhYaHiImKi4yNjo8",
            "k3.pid.iVtYQDjr5gEijCSjJC3fQaJm7nCeQSeaty0Jixy8dbsk",
        ] {
            let paserk = Paserk::parse(s).expect(s);
            assert_eq!(paserk.to_string(), s);
        }
    }

    #[test]
    fn four_part_form() {
        let paserk = Paserk::parse("k4.local-wrap.pie.ZGF0YQ").expect("parse");
        assert_eq!(paserk.kind(), PaserkType::LocalWrap);
        assert_eq!(paserk.prefix(), Some("pie"));
        assert_eq!(paserk.data(), "ZGF0YQ");
    }

    #[test]
    fn prefix_rules() {
        assert_eq!(
            Paserk::parse("k4.local-wrap.ZGF0YQ"),
            Err(Error::PrefixRequired(PaserkType::LocalWrap))
        );
        assert_eq!(
            Paserk::parse("k4.local.pie.ZGF0YQ"),
            Err(Error::PrefixForbidden(PaserkType::Local))
        );
        assert_eq!(
            Paserk::new(PaserkVersion::K4, PaserkType::SecretWrap, "ZGF0YQ", None),
            Err(Error::PrefixRequired(PaserkType::SecretWrap))
        );
        assert_eq!(
            Paserk::new(
                PaserkVersion::K4,
                PaserkType::Lid,
                "ZGF0YQ",
                Some("pie".to_string())
            ),
            Err(Error::PrefixForbidden(PaserkType::Lid))
        );
    }

    #[test]
    fn malformed() {
        assert_eq!(Paserk::parse("k4.local"), Err(Error::InvalidFormat));
        assert_eq!(Paserk::parse("k4"), Err(Error::InvalidFormat));
        assert_eq!(Paserk::parse(""), Err(Error::InvalidFormat));
        assert_eq!(Paserk::parse("k4.local."), Err(Error::InvalidFormat));
        assert_eq!(Paserk::parse("k4.a.b.c.d"), Err(Error::InvalidFormat));
        assert_eq!(Paserk::parse("k5.local.ZGF0YQ"), Err(Error::InvalidVersion));
        assert_eq!(Paserk::parse("v4.local.ZGF0YQ"), Err(Error::InvalidVersion));
        assert_eq!(Paserk::parse("k4.shared.ZGF0YQ"), Err(Error::InvalidType));
        assert_eq!(Paserk::parse("k4.local.ZG+0YQ"), Err(Error::InvalidFormat));
    }

    #[test]
    fn type_table() {
        for t in PaserkType::ALL {
            assert_eq!(t.as_str().parse::<PaserkType>(), Ok(t));

            if let Some(id) = t.id_type() {
                assert!(id.is_id());
                assert_eq!(id.info().purpose, t.info().purpose);
            }
            if t.is_key_bearing() {
                assert!(!t.info().footer_safe);
            }
        }

        assert!(PaserkType::LocalWrap.info().prefix_required);
        assert!(PaserkType::SecretWrap.info().prefix_required);
        assert_eq!(PaserkType::Local.id_type(), Some(PaserkType::Lid));
        assert_eq!(PaserkType::Public.id_type(), Some(PaserkType::Pid));
        assert_eq!(PaserkType::Secret.id_type(), Some(PaserkType::Sid));
    }

    #[test]
    fn debug_redacts_keys() {
        let local = Paserk::local(PaserkVersion::K4, &SharedKey::from(KEY)).expect("serialize");
        assert_eq!(format!("{local:?}"), "Paserk(k4.local.***)");

        let lid = local.lid().expect("lid");
        assert!(format!("{lid:?}").contains("iVtYQDjr5gEijCSjJC3fQaJm7nCeQSeaty0Jixy8dbsk"));
    }
}
