//! Stateless session tokens.
//!
//! - [`TokenIssuer`] - signs tokens for a user id and verifies them
//! - [`SessionClaims`] - the claims carried by every token
//! - [`SessionToken`] - an issued token with its claims

mod claims;
mod issuer;

pub use claims::SessionClaims;
pub use issuer::{
    DEFAULT_AUDIENCE, DEFAULT_ISSUER, DEFAULT_LIFETIME, SessionToken, TokenError, TokenIssuer,
};
