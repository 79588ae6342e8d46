//! Subscription entitlement window.
//!
//! A user's subscription moves between three observable states. The stored
//! row only ever holds `active` or `expired`; `none` means no row exists.
//! The `active -> expired` transition is lazy: any read past `ends_at`
//! flips the row (see `SubscriptionRepo::read` in `knox-db`), so every
//! entitlement check self-heals without a scheduled sweep.

use crate::types::Timestamp;

/// Persisted subscription row status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionStatus {
    Active,
    Expired,
}

impl SubscriptionStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "expired" => Some(Self::Expired),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Expired => "expired",
        }
    }
}

/// The computed entitlement state of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    /// No subscription row, or none ever paid for.
    None,
    /// Row is `active` and `ends_at` lies in the future.
    Active,
    /// Row has lapsed: either already flipped to `expired`, or still
    /// `active` with `ends_at` in the past (pending the lazy flip).
    Expired,
}

impl SubscriptionState {
    /// Evaluate the state from a row's status and end bound at `now`.
    pub fn evaluate(row: Option<(SubscriptionStatus, Timestamp)>, now: Timestamp) -> Self {
        match row {
            None => Self::None,
            Some((SubscriptionStatus::Active, ends_at)) if ends_at > now => Self::Active,
            Some(_) => Self::Expired,
        }
    }

    pub fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}
