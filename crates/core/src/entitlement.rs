//! Pure authorization decisions.
//!
//! The resolver answers one question: may this user fetch this service's
//! credentials right now? Handlers load the facts (subscription state,
//! plan membership, service flags) and the decision itself stays here,
//! independent of the store.
//!
//! Unknown and inactive services are denied with the same
//! [`CoreError::NotEntitled`] as an out-of-plan service, so unauthorized
//! callers cannot probe which service codes exist.

use crate::error::CoreError;
use crate::subscription::SubscriptionState;

/// Facts about the requested service relevant to authorization.
#[derive(Debug, Clone, Copy)]
pub struct ServiceAccess {
    /// The service's active flag.
    pub active: bool,
    /// Whether the user's current plan maps to this service.
    pub in_plan: bool,
}

/// Authorize a single-service credential fetch.
///
/// `service` is `None` when no service with the requested code exists.
/// Admins bypass the subscription and plan checks but still cannot reach
/// inactive or unknown services.
pub fn authorize_service(
    is_admin: bool,
    state: SubscriptionState,
    service: Option<ServiceAccess>,
) -> Result<(), CoreError> {
    let service = match service {
        Some(s) if s.active => s,
        _ => return Err(CoreError::NotEntitled),
    };

    if is_admin {
        return Ok(());
    }

    if !state.is_active() || !service.in_plan {
        return Err(CoreError::NotEntitled);
    }

    Ok(())
}

/// Whether a user sees any catalog at all.
///
/// Admins always do; everyone else needs an active subscription. The
/// per-service filtering (plan membership, service/category/group active
/// flags) happens in the catalog query itself.
pub fn catalog_visible(is_admin: bool, state: SubscriptionState) -> bool {
    is_admin || state.is_active()
}
