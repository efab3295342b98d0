//! Token claims.
//!
//! Issuance goes through [`PayloadClaims`] and [`FooterClaims`], whose
//! setters refuse values that would produce an invalid token. The other
//! direction goes through [`DecodedPayloadClaims`] and
//! [`DecodedFooterClaims`], which only require well-formed JSON objects.
//!
//! Decoding a token never checks its lifetime. Run the decoded claims through
//! [`validate`] or a [`ClaimsValidator`] before trusting them.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use time::{format_description::well_known::Rfc3339, Duration, OffsetDateTime, UtcOffset};
use tracing::debug;
use uuid::Uuid;

use crate::paserk::Paserk;

/// Errors while building or decoding claims.
#[derive(Error, Clone, Debug, PartialEq)]
pub enum Error {
    #[error("claim would be empty")]
    EmptyClaim,
    #[error("cannot set registered claim as custom")]
    RegisteredClaim,
    #[error("expiration must be after issued at and not before")]
    InvalidExpiration,
    #[error("timestamp cannot be represented")]
    InvalidTime,
    #[error("claim in unexpected format")]
    InvalidClaimFormat,
    #[error("key id must be a lid, pid or sid paserk")]
    InvalidKeyId,
    #[error("paserk is not safe to place in a footer")]
    InvalidWrappedKey,
    #[error("cannot serialize value as json")]
    SerializeError,
    #[error("unable to decode claims as json")]
    DecodeError,
    #[error("claims must be a json object")]
    NotAnObject,
}

/// Registered payload claims. These can only be set through the typed
/// setters.
pub const REGISTERED_CLAIMS: [&str; 7] = ["iss", "sub", "aud", "exp", "nbf", "iat", "jti"];

/// Registered footer claims.
pub const REGISTERED_FOOTER_CLAIMS: [&str; 2] = ["kid", "wpk"];

/// Lifetime of a token when no expiration is given.
pub const DEFAULT_TTL: Duration = Duration::minutes(10);

fn normalize(time: OffsetDateTime) -> Result<OffsetDateTime, Error> {
    time.to_offset(UtcOffset::UTC)
        .replace_nanosecond(0)
        .map_err(|_| Error::InvalidTime)
}

fn format_time(time: &OffsetDateTime) -> Result<String, Error> {
    time.format(&Rfc3339).map_err(|_| Error::InvalidTime)
}

fn parse_time(time: &str) -> Option<OffsetDateTime> {
    OffsetDateTime::parse(time, &Rfc3339)
        .ok()
        .map(|t| t.to_offset(UtcOffset::UTC))
}

fn non_empty(value: &str) -> Result<String, Error> {
    if value.is_empty() {
        Err(Error::EmptyClaim)
    } else {
        Ok(value.to_string())
    }
}

fn to_value<V: Serialize>(value: V) -> Result<Value, Error> {
    serde_json::to_value(value).map_err(|_| Error::SerializeError)
}

fn decode_object(bytes: &[u8]) -> Result<Map<String, Value>, Error> {
    match serde_json::from_slice(bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => {
            debug!("rejecting claims that are not a json object");
            Err(Error::NotAnObject)
        }
        Err(_) => Err(Error::DecodeError),
    }
}

/// The claims placed in a token payload.
#[derive(Clone, Debug, PartialEq)]
pub struct PayloadClaims {
    iss: Option<String>,
    sub: Option<String>,
    aud: Option<String>,
    iat: OffsetDateTime,
    nbf: OffsetDateTime,
    exp: OffsetDateTime,
    jti: String,
    other: Map<String, Value>,
}

impl PayloadClaims {
    /// Start building a set of payload claims.
    ///
    /// # Examples
    ///
    /// ```
    /// # use natrium_token::claims::{Error, PayloadClaims};
    /// # fn try_main() -> Result<(), Error> {
    /// let claims = PayloadClaims::builder()
    ///     .with_subject("natrium")?
    ///     .with_custom_claim("name", "User")?
    ///     .build()?;
    ///
    /// assert_eq!(claims.subject(), Some("natrium"));
    /// assert!(claims.expiration() > claims.issued_at());
    /// #     Ok(())
    /// # }
    /// # fn main() { try_main().unwrap(); }
    /// ```
    pub fn builder() -> PayloadClaimsBuilder {
        PayloadClaimsBuilder::default()
    }

    pub fn issuer(&self) -> Option<&str> {
        self.iss.as_deref()
    }

    pub fn subject(&self) -> Option<&str> {
        self.sub.as_deref()
    }

    pub fn audience(&self) -> Option<&str> {
        self.aud.as_deref()
    }

    pub fn issued_at(&self) -> OffsetDateTime {
        self.iat
    }

    pub fn not_before(&self) -> OffsetDateTime {
        self.nbf
    }

    pub fn expiration(&self) -> OffsetDateTime {
        self.exp
    }

    pub fn token_identifier(&self) -> &str {
        &self.jti
    }

    /// Get a custom claim.
    pub fn get(&self, claim: &str) -> Option<&Value> {
        self.other.get(claim)
    }

    /// The claims as a JSON object. Absent optional claims are omitted.
    pub fn to_json(&self) -> Result<Map<String, Value>, Error> {
        let mut map = self.other.clone();

        for (claim, value) in [("iss", &self.iss), ("sub", &self.sub), ("aud", &self.aud)] {
            if let Some(value) = value {
                map.insert(claim.to_string(), Value::String(value.clone()));
            }
        }
        map.insert("iat".to_string(), Value::String(format_time(&self.iat)?));
        map.insert("nbf".to_string(), Value::String(format_time(&self.nbf)?));
        map.insert("exp".to_string(), Value::String(format_time(&self.exp)?));
        map.insert("jti".to_string(), Value::String(self.jti.clone()));

        Ok(map)
    }

    /// Serialize the claims for use as a token payload.
    pub fn encode(&self) -> Result<Vec<u8>, Error> {
        serde_json::to_vec(&self.to_json()?).map_err(|_| Error::SerializeError)
    }
}

/// Builder for [`PayloadClaims`].
///
/// Timestamps default to the time [`PayloadClaimsBuilder::build`] is called,
/// and the expiration defaults to [`DEFAULT_TTL`] after the issued at time.
#[derive(Clone, Debug)]
pub struct PayloadClaimsBuilder {
    iss: Option<String>,
    sub: Option<String>,
    aud: Option<String>,
    iat: Option<OffsetDateTime>,
    nbf: Option<OffsetDateTime>,
    exp: Option<OffsetDateTime>,
    ttl: Duration,
    jti: Option<String>,
    other: Map<String, Value>,
}

impl Default for PayloadClaimsBuilder {
    fn default() -> Self {
        Self {
            iss: None,
            sub: None,
            aud: None,
            iat: None,
            nbf: None,
            exp: None,
            ttl: DEFAULT_TTL,
            jti: None,
            other: Map::new(),
        }
    }
}

impl PayloadClaimsBuilder {
    /// Set the token issuer.
    ///
    /// # Errors
    ///
    /// Will return an error if given an empty string.
    pub fn with_issuer(mut self, iss: &str) -> Result<Self, Error> {
        self.iss = Some(non_empty(iss)?);

        Ok(self)
    }

    /// Set the token subject.
    ///
    /// # Errors
    ///
    /// Will return an error if given an empty string.
    pub fn with_subject(mut self, sub: &str) -> Result<Self, Error> {
        self.sub = Some(non_empty(sub)?);

        Ok(self)
    }

    /// Set the token audience.
    ///
    /// # Errors
    ///
    /// Will return an error if given an empty string.
    pub fn with_audience(mut self, aud: &str) -> Result<Self, Error> {
        self.aud = Some(non_empty(aud)?);

        Ok(self)
    }

    pub fn with_issued_at(mut self, iat: OffsetDateTime) -> Result<Self, Error> {
        self.iat = Some(normalize(iat)?);

        Ok(self)
    }

    pub fn with_not_before(mut self, nbf: OffsetDateTime) -> Result<Self, Error> {
        self.nbf = Some(normalize(nbf)?);

        Ok(self)
    }

    /// Set the token expiration. Takes precedence over
    /// [`PayloadClaimsBuilder::with_ttl`].
    pub fn with_expiration(mut self, exp: OffsetDateTime) -> Result<Self, Error> {
        self.exp = Some(normalize(exp)?);

        Ok(self)
    }

    /// Set how long after the issued at time the token expires.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;

        self
    }

    /// Set the token identifier. A time-ordered UUID is used otherwise.
    ///
    /// # Errors
    ///
    /// Will return an error if given an empty string.
    pub fn with_token_identifier(mut self, jti: &str) -> Result<Self, Error> {
        self.jti = Some(non_empty(jti)?);

        Ok(self)
    }

    /// Set a non-registered claim to a JSON-serializable value.
    ///
    /// # Errors
    ///
    /// Returns an error when attempting to set a registered claim or when the
    /// provided value can't be serialized to JSON.
    pub fn with_custom_claim<V>(mut self, claim: &str, value: V) -> Result<Self, Error>
    where
        V: Serialize,
    {
        if REGISTERED_CLAIMS.contains(&claim) {
            return Err(Error::RegisteredClaim);
        }
        self.other.insert(claim.to_string(), to_value(value)?);

        Ok(self)
    }

    /// Fill in defaults and check the timestamps.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidExpiration`] unless the expiration is strictly
    /// after both the issued at and not before times.
    pub fn build(self) -> Result<PayloadClaims, Error> {
        let iat = match self.iat {
            Some(iat) => iat,
            None => normalize(OffsetDateTime::now_utc())?,
        };
        let nbf = self.nbf.unwrap_or(iat);
        let exp = match self.exp {
            Some(exp) => exp,
            None => iat.checked_add(self.ttl).ok_or(Error::InvalidTime)?,
        };

        if exp <= iat || exp <= nbf {
            return Err(Error::InvalidExpiration);
        }

        Ok(PayloadClaims {
            iss: self.iss,
            sub: self.sub,
            aud: self.aud,
            iat,
            nbf,
            exp,
            jti: self.jti.unwrap_or_else(|| Uuid::now_v7().to_string()),
            other: self.other,
        })
    }
}

/// The claims placed in a token footer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FooterClaims {
    kid: Option<Paserk>,
    wpk: Option<Paserk>,
    other: Map<String, Value>,
}

impl FooterClaims {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the id of the key the token is protected with.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKeyId`] unless the PASERK is a `lid`, `pid`
    /// or `sid`.
    pub fn with_key_id(mut self, kid: Paserk) -> Result<Self, Error> {
        if !kid.kind().is_id() {
            return Err(Error::InvalidKeyId);
        }
        self.kid = Some(kid);

        Ok(self)
    }

    /// Attach a wrapped or public key for the recipient.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidWrappedKey`] for ids and for PASERK types that
    /// must never appear in a footer.
    pub fn with_wrapped_key(mut self, wpk: Paserk) -> Result<Self, Error> {
        if wpk.kind().is_id() || !wpk.kind().info().footer_safe {
            return Err(Error::InvalidWrappedKey);
        }
        self.wpk = Some(wpk);

        Ok(self)
    }

    /// Set a non-registered footer claim.
    pub fn with_custom_claim<V>(mut self, claim: &str, value: V) -> Result<Self, Error>
    where
        V: Serialize,
    {
        if REGISTERED_FOOTER_CLAIMS.contains(&claim) {
            return Err(Error::RegisteredClaim);
        }
        self.other.insert(claim.to_string(), to_value(value)?);

        Ok(self)
    }

    pub fn key_id(&self) -> Option<&Paserk> {
        self.kid.as_ref()
    }

    pub fn wrapped_key(&self) -> Option<&Paserk> {
        self.wpk.as_ref()
    }

    pub fn get(&self, claim: &str) -> Option<&Value> {
        self.other.get(claim)
    }

    pub fn to_json(&self) -> Map<String, Value> {
        let mut map = self.other.clone();
        if let Some(kid) = &self.kid {
            map.insert("kid".to_string(), Value::String(kid.to_string()));
        }
        if let Some(wpk) = &self.wpk {
            map.insert("wpk".to_string(), Value::String(wpk.to_string()));
        }

        map
    }

    /// Serialize the claims for use as a token footer.
    pub fn encode(&self) -> Result<Vec<u8>, Error> {
        if self.kid.is_none() && self.wpk.is_none() && self.other.is_empty() {
            return Ok(b"{}".to_vec());
        }

        serde_json::to_vec(&self.to_json()).map_err(|_| Error::SerializeError)
    }
}

/// Payload claims read back from an authenticated token.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedPayloadClaims(Map<String, Value>);

impl DecodedPayloadClaims {
    /// Decode a payload. Anything but a JSON object is rejected.
    pub fn decode(payload: &[u8]) -> Result<Self, Error> {
        decode_object(payload).map(Self)
    }

    /// Get the JSON value of any claim, registered or not.
    pub fn get(&self, claim: &str) -> Option<&Value> {
        self.0.get(claim)
    }

    /// Every claim in the payload.
    pub fn claims(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn issuer(&self) -> Option<&str> {
        self.get("iss").and_then(Value::as_str)
    }

    pub fn subject(&self) -> Option<&str> {
        self.get("sub").and_then(Value::as_str)
    }

    pub fn audience(&self) -> Option<&str> {
        self.get("aud").and_then(Value::as_str)
    }

    /// Returns [`None`] if the claim is absent or not an RFC3339 timestamp.
    pub fn expiration(&self) -> Option<OffsetDateTime> {
        self.get("exp").and_then(Value::as_str).and_then(parse_time)
    }

    pub fn not_before(&self) -> Option<OffsetDateTime> {
        self.get("nbf").and_then(Value::as_str).and_then(parse_time)
    }

    pub fn issued_at(&self) -> Option<OffsetDateTime> {
        self.get("iat").and_then(Value::as_str).and_then(parse_time)
    }

    pub fn token_identifier(&self) -> Option<&str> {
        self.get("jti").and_then(Value::as_str)
    }
}

/// Footer claims read back from a token.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DecodedFooterClaims {
    kid: Option<Paserk>,
    wpk: Option<Paserk>,
    claims: Map<String, Value>,
}

impl DecodedFooterClaims {
    /// Decode a footer. An empty footer has no claims.
    ///
    /// # Errors
    ///
    /// Besides malformed JSON, a `kid` that is not an id PASERK or a `wpk`
    /// that is not footer-safe is rejected.
    pub fn decode(footer: &[u8]) -> Result<Self, Error> {
        if footer.is_empty() {
            return Ok(Self::default());
        }
        let claims = decode_object(footer)?;

        let kid = match claims.get("kid") {
            None => None,
            Some(Value::String(kid)) => match Paserk::parse(kid) {
                Ok(kid) if kid.kind().is_id() => Some(kid),
                _ => return Err(Error::InvalidKeyId),
            },
            Some(_) => return Err(Error::InvalidClaimFormat),
        };
        let wpk = match claims.get("wpk") {
            None => None,
            Some(Value::String(wpk)) => match Paserk::parse(wpk) {
                Ok(wpk) if !wpk.kind().is_id() && wpk.kind().info().footer_safe => Some(wpk),
                _ => return Err(Error::InvalidWrappedKey),
            },
            Some(_) => return Err(Error::InvalidClaimFormat),
        };

        Ok(Self { kid, wpk, claims })
    }

    pub fn key_id(&self) -> Option<&Paserk> {
        self.kid.as_ref()
    }

    pub fn wrapped_key(&self) -> Option<&Paserk> {
        self.wpk.as_ref()
    }

    pub fn get(&self, claim: &str) -> Option<&Value> {
        self.claims.get(claim)
    }

    pub fn claims(&self) -> &Map<String, Value> {
        &self.claims
    }
}

type Rule = Box<dyn Fn(&DecodedPayloadClaims, OffsetDateTime) -> bool + Send + Sync>;

/// A collection of rules to validate a set of claims against.
pub struct ClaimsValidator(Vec<Rule>);

impl ClaimsValidator {
    /// Create a claims validator with the default time rule, see
    /// [`validate`].
    pub fn new() -> Self {
        Self::empty().with_rule(validate)
    }

    /// Create a claims validator without the default validation rules.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Add a new rule to a claims validator.
    pub fn with_rule<F>(mut self, rule: F) -> Self
    where
        F: Fn(&DecodedPayloadClaims, OffsetDateTime) -> bool + Send + Sync + 'static,
    {
        self.0.push(Box::new(rule));

        self
    }

    /// Require an exact issuer.
    pub fn with_issuer(self, iss: &str) -> Self {
        let iss = iss.to_string();
        self.with_rule(move |claims, _| claims.issuer() == Some(iss.as_str()))
    }

    /// Require an exact audience.
    pub fn with_audience(self, aud: &str) -> Self {
        let aud = aud.to_string();
        self.with_rule(move |claims, _| claims.audience() == Some(aud.as_str()))
    }

    /// Require an exact subject.
    pub fn with_subject(self, sub: &str) -> Self {
        let sub = sub.to_string();
        self.with_rule(move |claims, _| claims.subject() == Some(sub.as_str()))
    }

    /// Validate a set of claims at a point in time.
    pub fn validate(&self, claims: &DecodedPayloadClaims, now: OffsetDateTime) -> bool {
        self.0.iter().all(|rule| rule(claims, now))
    }
}

impl Default for ClaimsValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Check that "Expiration", "Not Before" and "Issued At" are all set and
/// that `now` falls within them.
pub fn validate(claims: &DecodedPayloadClaims, now: OffsetDateTime) -> bool {
    if let Some(exp) = claims.expiration() {
        if let Some(nbf) = claims.not_before() {
            if let Some(iat) = claims.issued_at() {
                return exp >= now && nbf <= now && iat <= now;
            }
        }
    }

    false
}
