//! Caller identity
//!
//! The session service only needs to turn a credential into a user id.
//! [`JwtIdentityProvider`] is the bundled implementation.

pub mod jwt;

pub use jwt::{Claims, JwtIdentityProvider};

use crate::{models::UserId, Result};

/// Resolves a bearer credential to a user.
///
/// Failures are always `Error::Unauthenticated` and are never retried.
pub trait IdentityProvider: Send + Sync {
    fn authenticate(&self, token: &str) -> Result<UserId>;
}
