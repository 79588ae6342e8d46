//! Request extractors for authentication and admin gating.

pub mod auth;
