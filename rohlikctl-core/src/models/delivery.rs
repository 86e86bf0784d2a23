//! Delivery slot and announcement types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single delivery window offered by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliverySlot {
    /// Start of the window.
    pub since: Option<DateTime<Utc>>,
    /// End of the window.
    pub till: Option<DateTime<Utc>>,
    /// Human-readable description (e.g. "Dnes 18:00–20:00").
    pub description: Option<String>,
}

/// Aggregated delivery information for the configured address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryInfo {
    /// Earliest available delivery slot.
    pub first_slot: Option<DeliverySlot>,
    /// Currently reserved timeslot, if the user holds one.
    pub reserved_slot: Option<DeliverySlot>,
    /// Delivery announcement text shown by the shop front, if any.
    pub announcement: Option<String>,
}

impl DeliveryInfo {
    /// Returns true when no slot information is available at all.
    pub fn is_empty(&self) -> bool {
        self.first_slot.is_none() && self.reserved_slot.is_none() && self.announcement.is_none()
    }
}
