//! Wire-format structures for the reverse-engineered upstream API.
//!
//! These shapes are an external contract owned by the service and can
//! change without notice; everything here is an implementation detail
//! behind the typed methods on [`crate::api::RohlikApi`].
//!
//! Frontend-service endpoints wrap their payload in an envelope:
//!
//! ```json
//! { "status": 200, "messages": [], "data": { ... } }
//! ```
//!
//! while the `/api/v1` endpoints return the payload bare.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;

use rohlikctl_core::{
    AccountInfo, CartItem, CartSummary, DeliveryInfo, DeliverySlot, PremiumStatus, ProductMatch,
    ShoppingList, ShoppingListItem,
};

/// Parses the timestamp format used by the slot endpoints
/// (`2025-06-01T18:00:00+02:00`, occasionally with fractional seconds).
fn parse_upstream_time(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z"))
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

// ============================================================================
// Envelope
// ============================================================================

/// Response envelope used by the frontend-service endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    /// Application-level status, mirrors HTTP semantics.
    pub status: u16,
    /// Human-readable messages accompanying non-200 statuses.
    #[serde(default)]
    pub messages: Vec<EnvelopeMessage>,
    /// Payload, present on success.
    pub data: Option<T>,
}

/// A single message in a response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct EnvelopeMessage {
    /// Message text.
    #[serde(default)]
    pub content: String,
}

impl<T> Envelope<T> {
    /// First message content, or a placeholder when the envelope has none.
    pub fn first_message(&self) -> &str {
        self.messages
            .first()
            .map_or("no message", |m| m.content.as_str())
    }
}

// ============================================================================
// Login
// ============================================================================

/// Payload of a successful login.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    /// Session token to authorize subsequent requests with.
    pub session_token: String,
    /// The logged-in user.
    pub user: UserData,
    /// Default delivery address, absent when none is configured.
    #[serde(default)]
    pub address: Option<AddressData>,
}

/// User record inside the login payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    /// Upstream user id.
    pub id: i64,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Registered email.
    #[serde(default)]
    pub email: String,
    /// Phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Store credit balance.
    #[serde(default)]
    pub credits: f64,
}

/// Delivery address record inside the login payload.
#[derive(Debug, Clone, Deserialize)]
pub struct AddressData {
    /// Upstream address id.
    pub id: i64,
}

// ============================================================================
// Account extras
// ============================================================================

/// Reusable-bag counters from `/api/v1/reusable-bags/user-info` (bare).
#[derive(Debug, Clone, Deserialize)]
pub struct BagsData {
    /// Bags currently held by the customer.
    #[serde(default)]
    pub current: u32,
    /// Maximum bags the customer may hold.
    #[serde(default)]
    pub max: u32,
}

// ============================================================================
// Premium
// ============================================================================

/// Premium profile payload from the premium profile endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PremiumData {
    /// Whether premium is active.
    #[serde(default)]
    pub active: bool,
    /// Membership plan name.
    #[serde(default)]
    pub premium_membership_type: Option<String>,
    /// Days remaining on the membership.
    #[serde(default)]
    pub remaining_days: Option<u32>,
    /// Free express delivery allowance.
    #[serde(default)]
    pub free_express_limit: Option<LimitData>,
}

/// A remaining/total limit pair.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitData {
    /// Remaining count in the current period.
    #[serde(default)]
    pub remaining: u32,
}

impl PremiumData {
    /// Converts to the core model.
    ///
    /// An inactive membership maps to the bare inactive status; the
    /// upstream payload sometimes carries leftover plan fields from an
    /// expired subscription.
    pub fn into_premium_status(self) -> PremiumStatus {
        if !self.active {
            return PremiumStatus::inactive();
        }
        PremiumStatus {
            active: true,
            plan: self.premium_membership_type,
            days_remaining: self.remaining_days,
            free_express_orders: self.free_express_limit.map(|l| l.remaining),
        }
    }
}

// ============================================================================
// Delivery
// ============================================================================

/// Payload of the preselected-slots (first delivery) endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotsData {
    /// Slot offers, typed EXPRESS / FIRST / FIRST_CHEAPEST / RECOMMENDED.
    #[serde(default)]
    pub preselected_slots: Vec<PreselectedSlot>,
}

/// One slot offer.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreselectedSlot {
    /// Offer type discriminator.
    #[serde(default, rename = "type")]
    pub slot_type: String,
    /// Short title shown by the shop front.
    #[serde(default)]
    pub title: Option<String>,
    /// Slot details.
    #[serde(default)]
    pub slot: Option<SlotDetail>,
}

/// Slot interval wrapper.
#[derive(Debug, Clone, Deserialize)]
pub struct SlotDetail {
    /// Delivery window.
    #[serde(default)]
    pub interval: Option<SlotInterval>,
}

/// A delivery window as raw timestamps.
#[derive(Debug, Clone, Deserialize)]
pub struct SlotInterval {
    /// Window start.
    #[serde(default)]
    pub since: Option<String>,
    /// Window end.
    #[serde(default)]
    pub till: Option<String>,
}

/// Payload of the timeslot-reservation endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationData {
    /// Whether a reservation is currently held.
    #[serde(default)]
    pub active: bool,
    /// Reserved window details.
    #[serde(default)]
    pub reservation_detail: Option<SlotInterval>,
}

/// Payload of the delivery announcements endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct AnnouncementsData {
    /// Announcement entries, most relevant first.
    #[serde(default)]
    pub announcements: Vec<Announcement>,
}

/// A single announcement.
#[derive(Debug, Clone, Deserialize)]
pub struct Announcement {
    /// Announcement text.
    #[serde(default)]
    pub content: String,
}

impl SlotsData {
    /// Picks the first standard slot offer, preferring explicit FIRST types
    /// the way the shop front does.
    pub fn first_slot(&self) -> Option<DeliverySlot> {
        const PREFERRED: [&str; 3] = ["FIRST", "FIRST_CHEAPEST", "RECOMMENDED"];

        let candidate = PREFERRED
            .iter()
            .find_map(|t| self.preselected_slots.iter().find(|s| s.slot_type == *t))
            .or_else(|| self.preselected_slots.first())?;

        let interval = candidate.slot.as_ref()?.interval.as_ref()?;
        Some(DeliverySlot {
            since: interval.since.as_deref().and_then(parse_upstream_time),
            till: interval.till.as_deref().and_then(parse_upstream_time),
            description: candidate.title.clone(),
        })
    }
}

impl ReservationData {
    /// Converts an active reservation to a slot, `None` when not reserved.
    pub fn reserved_slot(&self) -> Option<DeliverySlot> {
        if !self.active {
            return None;
        }
        let interval = self.reservation_detail.as_ref()?;
        Some(DeliverySlot {
            since: interval.since.as_deref().and_then(parse_upstream_time),
            till: interval.till.as_deref().and_then(parse_upstream_time),
            description: None,
        })
    }
}

/// Builds the aggregated delivery info from the three delivery endpoints.
pub fn build_delivery_info(
    slots: Option<SlotsData>,
    reservation: Option<ReservationData>,
    announcements: Option<AnnouncementsData>,
) -> DeliveryInfo {
    DeliveryInfo {
        first_slot: slots.as_ref().and_then(SlotsData::first_slot),
        reserved_slot: reservation.as_ref().and_then(ReservationData::reserved_slot),
        announcement: announcements
            .and_then(|a| a.announcements.into_iter().next())
            .map(|a| a.content)
            .filter(|c| !c.is_empty()),
    }
}

// ============================================================================
// Cart
// ============================================================================

/// Cart payload from the v2 cart endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartData {
    /// Total cart price.
    #[serde(default)]
    pub total_price: f64,
    /// Whether the order minimum is met.
    #[serde(default)]
    pub submit_condition_passed: bool,
    /// Line items keyed by product id.
    #[serde(default)]
    pub items: HashMap<String, CartItemData>,
}

/// One cart line on the wire.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemData {
    /// Cart line id, needed for deletion.
    #[serde(default)]
    pub order_field_id: String,
    /// Product name.
    #[serde(default)]
    pub product_name: String,
    /// Quantity.
    #[serde(default)]
    pub quantity: u32,
    /// Line price.
    #[serde(default)]
    pub price: f64,
    /// Brand.
    #[serde(default)]
    pub brand: Option<String>,
}

impl CartData {
    /// Converts to the core cart summary. Item order follows the upstream
    /// map and is not meaningful.
    pub fn into_cart_summary(self) -> CartSummary {
        let total_items = self.items.len() as u32;
        let items = self
            .items
            .into_iter()
            .map(|(product_id, item)| CartItem {
                product_id,
                cart_item_id: item.order_field_id,
                name: item.product_name,
                quantity: item.quantity,
                price: item.price,
                brand: item.brand,
            })
            .collect();

        CartSummary {
            total_price: self.total_price,
            total_items,
            can_make_order: self.submit_condition_passed,
            items,
        }
    }
}

// ============================================================================
// Search
// ============================================================================

/// Search payload from the search-metadata endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchData {
    /// Matching products, relevance-ranked.
    #[serde(default)]
    pub product_list: Vec<SearchProduct>,
}

/// One search hit on the wire.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchProduct {
    /// Product id.
    pub product_id: i64,
    /// Product name.
    #[serde(default)]
    pub product_name: String,
    /// Price breakdown.
    #[serde(default)]
    pub price: Option<PriceData>,
    /// Brand.
    #[serde(default)]
    pub brand: Option<String>,
    /// Textual amount (e.g. "500 g").
    #[serde(default)]
    pub textual_amount: Option<String>,
    /// Whether the account marked this product as a favourite.
    #[serde(default)]
    pub favourite: bool,
    /// Badges; slug `promoted` marks sponsored placement.
    #[serde(default)]
    pub badge: Vec<BadgeData>,
}

/// Price with currency.
#[derive(Debug, Clone, Deserialize)]
pub struct PriceData {
    /// Full price.
    #[serde(default)]
    pub full: f64,
    /// Currency code.
    #[serde(default)]
    pub currency: String,
}

/// Product badge.
#[derive(Debug, Clone, Deserialize)]
pub struct BadgeData {
    /// Badge slug.
    #[serde(default)]
    pub slug: String,
}

impl SearchProduct {
    /// Returns true for sponsored placements, which are filtered out of
    /// search results.
    pub fn is_promoted(&self) -> bool {
        self.badge.iter().any(|b| b.slug == "promoted")
    }

    /// Converts to the core model.
    pub fn into_product_match(self) -> ProductMatch {
        let (price, currency) = self
            .price
            .map_or((0.0, String::new()), |p| (p.full, p.currency));
        ProductMatch {
            id: self.product_id,
            name: self.product_name,
            price,
            currency,
            brand: self.brand,
            amount: self.textual_amount,
            favourite: self.favourite,
        }
    }
}

// ============================================================================
// Shopping lists
// ============================================================================

/// Shopping list payload from `/api/v1/shopping-lists/id/{id}` (bare).
#[derive(Debug, Clone, Deserialize)]
pub struct ShoppingListData {
    /// List id.
    #[serde(default)]
    pub id: String,
    /// List name.
    #[serde(default)]
    pub name: String,
    /// Saved items.
    #[serde(default)]
    pub products: Vec<ShoppingListProduct>,
}

/// One saved product on the wire.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingListProduct {
    /// Product id.
    pub product_id: i64,
    /// Product name.
    #[serde(default)]
    pub product_name: String,
    /// Saved quantity.
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

impl ShoppingListData {
    /// Converts to the core model, substituting the requested id when the
    /// payload omits its own.
    pub fn into_shopping_list(self, requested_id: &str) -> ShoppingList {
        let id = if self.id.is_empty() {
            requested_id.to_string()
        } else {
            self.id
        };
        ShoppingList {
            id,
            name: self.name,
            items: self
                .products
                .into_iter()
                .map(|p| ShoppingListItem {
                    product_id: p.product_id,
                    name: p.product_name,
                    quantity: p.quantity,
                })
                .collect(),
        }
    }
}

// ============================================================================
// Account assembly
// ============================================================================

/// Builds the account model from the session's user profile and the bag
/// counters endpoint.
pub fn build_account_info(user: &UserData, bags: Option<&BagsData>) -> AccountInfo {
    AccountInfo {
        user_id: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
        phone: user.phone.clone(),
        credit_amount: user.credits,
        bags_count: bags.map(|b| b.current),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_login_envelope() {
        let json = r#"{
            "status": 200,
            "messages": [],
            "data": {
                "sessionToken": "tok-123",
                "user": {
                    "id": 77,
                    "name": "Jana Nováková",
                    "email": "jana@example.com",
                    "phone": "+420123456789",
                    "credits": 150.5
                },
                "address": { "id": 901 }
            }
        }"#;

        let envelope: Envelope<LoginData> = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.status, 200);

        let data = envelope.data.unwrap();
        assert_eq!(data.session_token, "tok-123");
        assert_eq!(data.user.id, 77);
        assert_eq!(data.address.unwrap().id, 901);
        assert!((data.user.credits - 150.5).abs() < f64::EPSILON);
    }

    #[test]
    fn rejected_login_carries_message() {
        let json = r#"{
            "status": 401,
            "messages": [{ "content": "Invalid credentials" }],
            "data": null
        }"#;

        let envelope: Envelope<LoginData> = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.status, 401);
        assert_eq!(envelope.first_message(), "Invalid credentials");
        assert!(envelope.data.is_none());
    }

    #[test]
    fn expired_premium_drops_leftover_plan_fields() {
        let json = r#"{
            "active": false,
            "premiumMembershipType": "MONTHLY",
            "remainingDays": 0
        }"#;

        let premium: PremiumData = serde_json::from_str(json).unwrap();
        let status = premium.into_premium_status();

        assert_eq!(status, PremiumStatus::inactive());
    }

    #[test]
    fn cart_conversion_counts_lines() {
        let json = r#"{
            "totalPrice": 249.9,
            "submitConditionPassed": true,
            "items": {
                "1421": {
                    "orderFieldId": "of-1",
                    "productName": "Máslo",
                    "quantity": 2,
                    "price": 119.8,
                    "brand": "Madeta"
                },
                "88": {
                    "orderFieldId": "of-2",
                    "productName": "Chléb",
                    "quantity": 1,
                    "price": 34.9
                }
            }
        }"#;

        let cart: CartData = serde_json::from_str(json).unwrap();
        let summary = cart.into_cart_summary();

        assert_eq!(summary.total_items, 2);
        assert!(summary.can_make_order);
        assert_eq!(summary.quantity_of("1421"), 2);
    }

    #[test]
    fn promoted_results_are_detected() {
        let json = r#"{
            "productList": [
                {
                    "productId": 1,
                    "productName": "Mléko čerstvé",
                    "price": { "full": 25.9, "currency": "CZK" },
                    "badge": []
                },
                {
                    "productId": 2,
                    "productName": "Mléko sponzorované",
                    "price": { "full": 23.9, "currency": "CZK" },
                    "badge": [{ "slug": "promoted" }]
                }
            ]
        }"#;

        let search: SearchData = serde_json::from_str(json).unwrap();
        assert!(!search.product_list[0].is_promoted());
        assert!(search.product_list[1].is_promoted());
    }

    #[test]
    fn slot_selection_prefers_first_type() {
        let json = r#"{
            "preselectedSlots": [
                {
                    "type": "EXPRESS",
                    "title": "Expres",
                    "slot": { "interval": { "since": "2025-06-01T18:00:00+02:00", "till": "2025-06-01T20:00:00+02:00" } }
                },
                {
                    "type": "FIRST",
                    "title": "Nejbližší",
                    "slot": { "interval": { "since": "2025-06-01T16:00:00+02:00", "till": "2025-06-01T18:00:00+02:00" } }
                }
            ]
        }"#;

        let slots: SlotsData = serde_json::from_str(json).unwrap();
        let slot = slots.first_slot().unwrap();
        assert_eq!(slot.description.as_deref(), Some("Nejbližší"));
        assert!(slot.since.is_some());
    }

    #[test]
    fn inactive_reservation_yields_no_slot() {
        let json = r#"{ "active": false, "reservationDetail": null }"#;
        let reservation: ReservationData = serde_json::from_str(json).unwrap();
        assert!(reservation.reserved_slot().is_none());
    }

    #[test]
    fn upstream_time_parses_without_colon_offset() {
        assert!(parse_upstream_time("2025-06-01T18:00:00+0200").is_some());
        assert!(parse_upstream_time("2025-06-01T18:00:00+02:00").is_some());
        assert!(parse_upstream_time("2025-06-01T18:00:00.123+02:00").is_some());
        assert!(parse_upstream_time("not a time").is_none());
    }
}
