//! The polled aggregate published by the data coordinator.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::account::{AccountInfo, PremiumStatus};
use super::cart::CartSummary;
use super::delivery::DeliveryInfo;

/// A sub-fetch result tagged with the timestamp of its own fetch.
///
/// When a sub-fetch fails during a refresh cycle, the previous `Polled`
/// value is carried into the new snapshot unchanged, so the timestamp
/// always says how old the value actually is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polled<T> {
    /// The fetched value.
    pub value: T,
    /// When this particular value was fetched.
    pub fetched_at: DateTime<Utc>,
}

impl<T> Polled<T> {
    /// Wraps a freshly fetched value with the current time.
    pub fn now(value: T) -> Self {
        Self {
            value,
            fetched_at: Utc::now(),
        }
    }

    /// Returns true if the value is older than the given threshold.
    pub fn is_stale(&self, threshold: Duration) -> bool {
        Utc::now() - self.fetched_at > threshold
    }
}

/// Immutable aggregate of all periodically polled data.
///
/// Built once per refresh cycle and published atomically; consumers always
/// see either the entire previous snapshot or the entire new one, never a
/// mix. Fields are `None` only until their first successful fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Account information.
    pub account: Option<Polled<AccountInfo>>,
    /// Premium membership status.
    pub premium: Option<Polled<PremiumStatus>>,
    /// Delivery slots and announcements.
    pub delivery: Option<Polled<DeliveryInfo>>,
    /// Cart summary.
    pub cart: Option<Polled<CartSummary>>,
    /// True when at least one sub-fetch failed this cycle and its field
    /// carries a previous value (or none).
    pub partial: bool,
    /// When the refresh cycle that produced this snapshot completed.
    pub completed_at: Option<DateTime<Utc>>,
    /// Set when repeated authentication failures require operator action.
    pub needs_reconfiguration: bool,
}

impl Snapshot {
    /// An empty snapshot, used before the first refresh cycle completes.
    pub fn empty() -> Self {
        Self {
            account: None,
            premium: None,
            delivery: None,
            cart: None,
            partial: false,
            completed_at: None,
            needs_reconfiguration: false,
        }
    }

    /// Returns true if any polled field is present.
    pub fn has_data(&self) -> bool {
        self.account.is_some()
            || self.premium.is_some()
            || self.delivery.is_some()
            || self.cart.is_some()
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_snapshot_has_no_data() {
        let snapshot = Snapshot::empty();
        assert!(!snapshot.has_data());
        assert!(!snapshot.partial);
        assert!(snapshot.completed_at.is_none());
    }

    #[test]
    fn polled_now_is_not_stale() {
        let polled = Polled::now(42u32);
        assert!(!polled.is_stale(Duration::minutes(10)));
    }

    #[test]
    fn snapshot_serializes_round_trip() {
        let snapshot = Snapshot {
            cart: Some(Polled::now(CartSummary::empty())),
            partial: true,
            completed_at: Some(Utc::now()),
            ..Snapshot::empty()
        };

        let json = serde_json::to_string(&snapshot).unwrap();
        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snapshot, back);
    }
}
