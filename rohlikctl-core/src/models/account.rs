//! Account-related types.

use serde::{Deserialize, Serialize};

/// Account information for a logged-in user.
///
/// Combines data from the login envelope (name, email, credit) with the
/// reusable-bag counters that live on a separate endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountInfo {
    /// Upstream user id.
    pub user_id: i64,
    /// Display name on the account.
    pub name: String,
    /// Email the account is registered under.
    pub email: String,
    /// Phone number, if set.
    pub phone: Option<String>,
    /// Store credit balance.
    pub credit_amount: f64,
    /// Number of reusable bags currently held by the customer.
    pub bags_count: Option<u32>,
}

/// Premium membership status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PremiumStatus {
    /// Whether a premium plan is currently active.
    pub active: bool,
    /// Plan name (e.g. "Premium Měsíční"), if active.
    pub plan: Option<String>,
    /// Days remaining until the membership expires.
    pub days_remaining: Option<u32>,
    /// Remaining free express deliveries this period.
    pub free_express_orders: Option<u32>,
}

impl PremiumStatus {
    /// A status representing an account without premium membership.
    pub fn inactive() -> Self {
        Self {
            active: false,
            plan: None,
            days_remaining: None,
            free_express_orders: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inactive_premium_has_no_plan() {
        let status = PremiumStatus::inactive();
        assert!(!status.active);
        assert!(status.plan.is_none());
        assert!(status.days_remaining.is_none());
    }
}
