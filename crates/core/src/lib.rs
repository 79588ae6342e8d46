//! Shared domain types and access-control logic for the knox platform.
//!
//! - [`types`] -- database id and timestamp aliases.
//! - [`error`] -- the domain error taxonomy returned at every boundary.
//! - [`cookie`] -- credential descriptor model (one browser cookie).
//! - [`subscription`] -- the none/active/expired entitlement state machine.
//! - [`entitlement`] -- pure authorization decisions for catalog and
//!   credential fetches.

pub mod cookie;
pub mod entitlement;
pub mod error;
pub mod subscription;
pub mod types;
