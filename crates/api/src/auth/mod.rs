//! Authentication primitives and the session lifecycle.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- HS256 bearer-token generation and validation.
//! - [`session`] -- the session manager: token issue/validate against the
//!   authoritative session row, single-session enforcement, revocation.

pub mod jwt;
pub mod password;
pub mod session;
