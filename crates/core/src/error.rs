/// Domain error taxonomy.
///
/// Every access-control outcome is one of these variants; handlers map them
/// to HTTP statuses and machine-readable codes at the boundary.
///
/// [`Unauthenticated`](CoreError::Unauthenticated) deliberately carries no
/// detail: a bad signature, an expired token, a deleted session row, and a
/// banned account are indistinguishable to the caller, which closes the
/// session-enumeration side channel.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Too many failed login attempts")]
    LockedOut,

    #[error("Active subscription required")]
    NotEntitled,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Entity not found: {entity} {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
