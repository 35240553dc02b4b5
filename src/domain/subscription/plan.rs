//! Subscription plans and their entitlements.
//!
//! A plan is read-only reference data during activation. Its entitlement
//! flags are snapshotted onto the business record at that moment and never
//! re-derived afterwards.

use crate::domain::foundation::{PlanId, Timestamp};
use serde::{Deserialize, Serialize};

/// A purchasable subscription plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionPlan {
    /// Unique identifier.
    pub id: PlanId,

    /// Display name (e.g. "Premium Annual").
    pub name: String,

    /// Subscription length in days.
    pub duration_days: u32,

    /// Feature flags granted by this plan.
    pub entitlements: PlanEntitlements,
}

/// Feature flags a plan grants to a business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlanEntitlements {
    /// Business may run advertisements.
    pub allow_advertisements: bool,

    /// Business is promoted to top placement in listings.
    pub top_placement: bool,

    /// Business receives the verified badge.
    pub verified_badge: bool,

    /// Business gets priority support handling.
    pub priority_support: bool,
}

impl PlanEntitlements {
    /// Human-readable feature list for notification and email bodies.
    pub fn feature_list(&self) -> Vec<&'static str> {
        let mut features = Vec::new();
        if self.allow_advertisements {
            features.push("Advertisements");
        }
        if self.top_placement {
            features.push("Top placement");
        }
        if self.verified_badge {
            features.push("Verified badge");
        }
        if self.priority_support {
            features.push("Priority support");
        }
        features
    }
}

/// The entitlement values written onto a business record at activation.
///
/// The verified flag is a grant, not an assignment: storage must OR it with
/// the existing value so a verified business is never un-verified here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitlementGrant {
    /// New value for the business's advertisement permission.
    pub allow_advertisements: bool,

    /// Promotion window end, set when the plan grants top placement.
    pub promoted_until: Option<Timestamp>,

    /// Whether this plan grants the verified badge (monotone).
    pub grant_verified_badge: bool,
}

impl EntitlementGrant {
    /// Builds the grant for a plan activated until `ends_at`.
    pub fn from_plan(plan: &SubscriptionPlan, ends_at: Timestamp) -> Self {
        Self {
            allow_advertisements: plan.entitlements.allow_advertisements,
            promoted_until: plan.entitlements.top_placement.then_some(ends_at),
            grant_verified_badge: plan.entitlements.verified_badge,
        }
    }
}
