use crate::models::QuoteStatus;
use merca_core::identity::Role;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum QuoteError {
    #[error("Quote not found: {0}")]
    NotFound(String),

    #[error("Invalid quote transition from {from} to {to}")]
    InvalidTransition { from: QuoteStatus, to: QuoteStatus },

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Repository(#[from] merca_core::CoreError),
}

impl From<merca_pricing::PricingError> for QuoteError {
    fn from(err: merca_pricing::PricingError) -> Self {
        QuoteError::Validation(err.to_string())
    }
}

/// Configuration knobs for the two acceptance-path ambiguities the
/// original business rules left open. Both are deterministic either way.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TransitionPolicy {
    /// Permit `DRAFT -> ACCEPTED` without an intervening send. Off by
    /// default: a quote must be sent before it can be accepted.
    #[serde(default)]
    pub allow_accept_from_draft: bool,
    /// Require `VIEWED` before acceptance. Off by default: accepting a
    /// `SENT` quote sight-unseen is permitted.
    #[serde(default)]
    pub require_view_before_accept: bool,
}

impl Default for TransitionPolicy {
    fn default() -> Self {
        Self {
            allow_accept_from_draft: false,
            require_view_before_accept: false,
        }
    }
}

/// Roles permitted to drive a `from -> to` transition, or `None` when
/// the pair is not part of the state machine under `policy`.
fn allowed_roles(
    from: QuoteStatus,
    to: QuoteStatus,
    policy: &TransitionPolicy,
) -> Option<&'static [Role]> {
    use QuoteStatus::*;

    const REP_ADMIN: &[Role] = &[Role::SalesRep, Role::Admin];
    const RETAILER: &[Role] = &[Role::Retailer];
    const ANY_CREATOR: &[Role] = &[Role::Retailer, Role::SalesRep, Role::Admin];
    const ADMIN_SYSTEM: &[Role] = &[Role::Admin, Role::System];
    const SYSTEM: &[Role] = &[Role::System];

    match (from, to) {
        (Draft, Sent) => Some(REP_ADMIN),
        (Sent, Viewed) => Some(RETAILER),
        (Sent, Accepted) if !policy.require_view_before_accept => Some(RETAILER),
        (Viewed, Accepted) => Some(RETAILER),
        (Draft, Accepted) if policy.allow_accept_from_draft => Some(RETAILER),
        (Sent | Viewed, Rejected) => Some(RETAILER),
        (Sent | Viewed, Revised) => Some(RETAILER),
        // A revised quote re-enters the accept path by being re-sent.
        (Revised, Sent) => Some(REP_ADMIN),
        (Accepted, Converted) => Some(ADMIN_SYSTEM),
        // Cancellation only while still a draft; the service additionally
        // requires the actor to be the creator unless they are an admin.
        (Draft, Cancelled) => Some(ANY_CREATOR),
        (Sent | Viewed, Expired) => Some(SYSTEM),
        _ => None,
    }
}

/// Validate a transition against the state machine and the actor's role.
pub fn check_transition(
    from: QuoteStatus,
    to: QuoteStatus,
    role: Role,
    policy: &TransitionPolicy,
) -> Result<(), QuoteError> {
    match allowed_roles(from, to, policy) {
        None => Err(QuoteError::InvalidTransition { from, to }),
        Some(roles) if roles.contains(&role) => Ok(()),
        Some(_) => Err(QuoteError::Forbidden(format!(
            "role {} may not transition a quote from {} to {}",
            role, from, to
        ))),
    }
}
