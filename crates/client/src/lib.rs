//! Remote-client side of the credential restoration protocol.
//!
//! This crate is what the browser extension embeds: it holds a bearer
//! token, talks to the knox API, and swaps a service's credentials into
//! the local cookie jar with the clear-then-set sequence. The jar and the
//! navigation surface are traits so the concrete browser messaging API
//! stays pluggable.
//!
//! - [`jar`] -- the cookie-store and navigation traits.
//! - [`api`] -- the HTTP client for catalog / restore / session-check.
//! - [`restore`] -- the per-attempt restoration state machine.
//! - [`token_channel`] -- the web-app -> extension token hand-off seam.

pub mod api;
pub mod jar;
pub mod restore;
pub mod token_channel;
