//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - Create DTOs for inserts where the insert is non-trivial
//! - Safe `Serialize` response shapes where the row must not leak fields

pub mod failed_login;
pub mod plan;
pub mod service;
pub mod session;
pub mod subscription;
pub mod transaction;
pub mod user;
