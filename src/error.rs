use thiserror::Error;

use crate::paserk::Paserk;

/// Every error this crate can return.
#[derive(Error, Clone, Debug, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Token(#[from] crate::token::Error),
    #[error(transparent)]
    Protocol(#[from] crate::protocol::Error),
    #[error(transparent)]
    Claims(#[from] crate::claims::Error),
    #[error(transparent)]
    Paserk(#[from] crate::paserk::Error),
    #[error(transparent)]
    Keys(#[from] crate::keys::Error),
    #[error(transparent)]
    Config(#[from] crate::config::Error),
    #[error("token key id {found} does not match the key it was verified with")]
    KeyIdMismatch { expected: Paserk, found: Paserk },
}

impl Error {
    /// Whether the token failed authentication, whatever the cause.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Error::Protocol(
                crate::protocol::Error::InvalidSignature | crate::protocol::Error::MissingSignature
            )
        )
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
