//! # natrium-token
//!
//! natrium-token issues and verifies [PASETO] tokens and the [PASERK] keys
//! and key ids that go with them.
//!
//! ## About
//!
//! Tokens of versions 4 and 2 are supported, for both local (shared key)
//! and public (key pair) purposes. Versions 1 and 3 are recognised on the
//! wire and always refused. Every token issued through [`TokenService`]
//! carries the PASERK id of its key in the footer, which is checked again
//! when the token is read back.
//!
//! Decrypting or verifying a token only establishes that it is authentic.
//! Whether it is still valid is up to [`claims::validate`] or a
//! [`claims::ClaimsValidator`].
//!
//! ```
//! # use natrium_token::{claims::{validate, FooterClaims}, SharedKey, TokenService};
//! # fn try_main() -> Result<(), natrium_token::Error> {
//! let service = TokenService::new();
//! let key = SharedKey::generate()?;
//!
//! let claims = service.claims().with_subject("Foo Bar")?.build()?;
//! let issued = service.encrypt(&key, claims, FooterClaims::new(), b"")?;
//!
//! let verified = service.decrypt(&key, &issued.token, b"")?;
//! assert_eq!(verified.payload.subject(), Some("Foo Bar"));
//! assert!(validate(&verified.payload, issued.payload.issued_at()));
//! #     Ok(())
//! # }
//! # fn main() { try_main().unwrap(); }
//! ```
//!
//! [PASETO]: https://github.com/paseto-standard/paseto-spec
//! [PASERK]: https://github.com/paseto-standard/paserk

pub mod claims;
pub mod config;
pub mod error;
pub mod hash;
pub mod keys;
pub mod pae;
pub mod paserk;
pub mod protocol;
pub mod service;
pub mod token;

pub use error::{Error, Result};
pub use keys::{KeyPair, PublicKey, SharedKey};
pub use paserk::{Paserk, PaserkType, PaserkVersion};
pub use protocol::{Protocol, ProtocolV2, ProtocolV4};
pub use service::{Issued, TokenService, Verified};
pub use token::{Message, Purpose, Token, Version};
