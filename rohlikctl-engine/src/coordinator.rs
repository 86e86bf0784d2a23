//! The data coordinator: scheduled multi-endpoint refresh with atomic
//! snapshot publication.
//!
//! One refresh cycle issues the four read sub-fetches concurrently and
//! folds the results into a new [`Snapshot`], which is published through a
//! watch channel. Consumers either read [`Coordinator::snapshot`] or hold
//! a [`Coordinator::subscribe`] receiver that fires once per completed
//! cycle. A snapshot is replaced wholesale, never mutated, so readers
//! never observe a half-updated aggregate.

use std::sync::{Arc, Mutex as StdMutex};
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::sync::{Mutex, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, instrument, warn};

use rohlikctl_client::{ApiError, RohlikApi};
use rohlikctl_core::{Polled, Snapshot};

/// Default refresh interval.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(600);

// ============================================================================
// Refresh State
// ============================================================================

/// Coordinator state, for observability.
///
/// `Failed` means the last cycle had at least one failed sub-fetch; the
/// coordinator is otherwise idle and the next trigger starts a new cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    /// No cycle in flight.
    Idle,
    /// A cycle is in flight.
    Refreshing,
    /// Idle, but the previous cycle published a partial snapshot.
    Failed,
}

// ============================================================================
// Coordinator
// ============================================================================

/// Schedules periodic refreshes and publishes snapshots.
pub struct Coordinator {
    api: RohlikApi,
    interval: Duration,
    snapshot_tx: watch::Sender<Arc<Snapshot>>,
    // Held for the duration of a cycle; try_lock failure means a cycle is
    // in flight and the trigger is coalesced into it.
    gate: Mutex<()>,
    state: StdMutex<RefreshState>,
}

impl Coordinator {
    /// Creates a coordinator polling through the given API client.
    pub fn new(api: RohlikApi, interval: Duration) -> Self {
        let (snapshot_tx, _) = watch::channel(Arc::new(Snapshot::empty()));
        Self {
            api,
            interval,
            snapshot_tx,
            gate: Mutex::new(()),
            state: StdMutex::new(RefreshState::Idle),
        }
    }

    /// The current snapshot. Cheap; clones an `Arc`.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot_tx.borrow().clone()
    }

    /// Subscribes to snapshot publications, one notification per
    /// completed (or partial) cycle.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.snapshot_tx.subscribe()
    }

    /// Current coordinator state.
    pub fn state(&self) -> RefreshState {
        *self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// The API client this coordinator polls through.
    pub fn api(&self) -> &RohlikApi {
        &self.api
    }

    /// Runs the poll loop forever. The first tick fires immediately, so
    /// startup gets an initial refresh.
    pub async fn run(&self) {
        info!(interval_secs = self.interval.as_secs(), "Starting poll loop");

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if !self.refresh_now().await {
                debug!("Refresh already in flight, dropping tick");
            }
        }
    }

    /// Triggers a refresh cycle now.
    ///
    /// Returns false when a cycle is already in flight; the trigger is
    /// coalesced into it instead of starting a second one.
    pub async fn refresh_now(&self) -> bool {
        let Ok(_guard) = self.gate.try_lock() else {
            return false;
        };
        self.run_cycle().await;
        true
    }

    fn set_state(&self, state: RefreshState) {
        *self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = state;
    }

    /// Executes one refresh cycle and publishes the resulting snapshot.
    #[instrument(skip(self))]
    async fn run_cycle(&self) {
        self.set_state(RefreshState::Refreshing);
        let started = Instant::now();
        let prev = self.snapshot();

        let (account, premium, delivery, cart) = tokio::join!(
            self.api.fetch_account(),
            self.api.fetch_premium(),
            self.api.fetch_delivery_slots(),
            self.api.fetch_cart(),
        );

        let mut partial = false;
        let next = Snapshot {
            account: merge("account", account, prev.account.clone(), &mut partial),
            premium: merge("premium", premium, prev.premium.clone(), &mut partial),
            delivery: merge("delivery", delivery, prev.delivery.clone(), &mut partial),
            cart: merge("cart", cart, prev.cart.clone(), &mut partial),
            partial,
            completed_at: Some(Utc::now()),
            needs_reconfiguration: self.api.needs_reconfiguration(),
        };

        self.set_state(if partial {
            RefreshState::Failed
        } else {
            RefreshState::Idle
        });

        // Single atomic publication per cycle.
        self.snapshot_tx.send_replace(Arc::new(next));

        info!(
            partial,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Refresh cycle complete"
        );
    }
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("interval", &self.interval)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// Folds one sub-fetch result into the next snapshot: success produces a
/// freshly timestamped value, failure keeps the previous one and marks
/// the cycle partial.
fn merge<T>(
    endpoint: &str,
    result: Result<T, ApiError>,
    prev: Option<Polled<T>>,
    partial: &mut bool,
) -> Option<Polled<T>> {
    match result {
        Ok(value) => Some(Polled::now(value)),
        Err(error) => {
            warn!(
                endpoint,
                %error,
                transient = error.is_transient(),
                "Sub-fetch failed, keeping previous value"
            );
            *partial = true;
            prev
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use rohlikctl_client::{Credentials, HttpClient, SessionManager};

    fn enveloped(data: serde_json::Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "status": 200,
            "messages": [],
            "data": data
        }))
    }

    fn cart_body(total_items: usize) -> serde_json::Value {
        let mut items = serde_json::Map::new();
        for n in 0..total_items {
            items.insert(
                format!("{}", 100 + n),
                json!({
                    "orderFieldId": format!("of-{n}"),
                    "productName": format!("Produkt {n}"),
                    "quantity": 1,
                    "price": 10.0
                }),
            );
        }
        json!({
            "totalPrice": 10.0 * total_items as f64,
            "submitConditionPassed": total_items > 0,
            "items": items
        })
    }

    async fn mount_premium_ok(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/services/frontend-service/premium/profile"))
            .respond_with(enveloped(json!({
                "active": true,
                "premiumMembershipType": "Premium",
                "remainingDays": 12
            })))
            .mount(server)
            .await;
    }

    async fn mount_cart(server: &MockServer, items: usize, delay: Duration) {
        Mock::given(method("GET"))
            .and(path("/services/frontend-service/v2/cart"))
            .respond_with(enveloped(cart_body(items)).set_delay(delay))
            .mount(server)
            .await;
    }

    /// Mounts the endpoints shared by every test; premium and cart are
    /// mounted per test.
    async fn mount_base(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/services/frontend-service/login"))
            .respond_with(enveloped(json!({
                "sessionToken": "tok",
                "user": { "id": 7, "name": "Test", "email": "t@example.com", "credits": 10.0 },
                "address": { "id": 11 }
            })))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/reusable-bags/user-info"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "current": 3, "max": 10 })))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/services/frontend-service/first-delivery"))
            .respond_with(enveloped(json!({ "preselectedSlots": [] })))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/services/frontend-service/v1/timeslot-reservation"))
            .respond_with(enveloped(json!({ "active": false })))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/services/frontend-service/announcements/delivery"))
            .respond_with(enveloped(json!({ "announcements": [] })))
            .mount(server)
            .await;
    }

    fn coordinator(server: &MockServer) -> Coordinator {
        let sessions = Arc::new(SessionManager::new(
            Credentials::new("t@example.com", "secret"),
            server.uri(),
            HttpClient::new().unwrap(),
        ));
        Coordinator::new(RohlikApi::new(sessions), Duration::from_secs(600))
    }

    #[tokio::test]
    async fn full_cycle_publishes_complete_snapshot() {
        let server = MockServer::start().await;
        mount_base(&server).await;
        mount_premium_ok(&server).await;
        mount_cart(&server, 2, Duration::ZERO).await;

        let coordinator = coordinator(&server);
        let mut rx = coordinator.subscribe();

        assert!(coordinator.refresh_now().await);

        let snapshot = coordinator.snapshot();
        assert!(!snapshot.partial);
        assert_eq!(snapshot.cart.as_ref().unwrap().value.total_items, 2);
        assert!(snapshot.premium.as_ref().unwrap().value.active);
        assert!(snapshot.account.is_some());
        assert!(snapshot.delivery.is_some());
        assert_eq!(coordinator.state(), RefreshState::Idle);

        // Exactly one publication for the cycle.
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn failed_sub_fetch_keeps_previous_value_and_marks_partial() {
        let server = MockServer::start().await;
        mount_base(&server).await;
        mount_cart(&server, 1, Duration::ZERO).await;

        // Premium succeeds once, then the 503 mock takes over.
        Mock::given(method("GET"))
            .and(path("/services/frontend-service/premium/profile"))
            .respond_with(enveloped(json!({
                "active": true,
                "premiumMembershipType": "Premium",
                "remainingDays": 12
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/services/frontend-service/premium/profile"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let coordinator = coordinator(&server);

        assert!(coordinator.refresh_now().await);
        let first = coordinator.snapshot();
        assert!(!first.partial);
        let first_premium = first.premium.clone().unwrap();

        assert!(coordinator.refresh_now().await);
        let second = coordinator.snapshot();

        assert!(second.partial);
        assert_eq!(coordinator.state(), RefreshState::Failed);
        // Failed field carries the old value and its old timestamp.
        assert_eq!(second.premium.as_ref().unwrap().value, first_premium.value);
        assert_eq!(
            second.premium.as_ref().unwrap().fetched_at,
            first_premium.fetched_at
        );
        // Unrelated fields were still updated.
        assert!(second.cart.as_ref().unwrap().fetched_at > first.cart.as_ref().unwrap().fetched_at);
    }

    #[tokio::test]
    async fn concurrent_triggers_run_one_cycle() {
        let server = MockServer::start().await;
        mount_base(&server).await;
        mount_premium_ok(&server).await;
        // A slow cart keeps the first cycle in flight while the second
        // trigger lands.
        mount_cart(&server, 1, Duration::from_millis(150)).await;

        let coordinator = Arc::new(coordinator(&server));
        let mut rx = coordinator.subscribe();

        let first = {
            let c = Arc::clone(&coordinator);
            tokio::spawn(async move { c.refresh_now().await })
        };
        tokio::time::sleep(Duration::from_millis(30)).await;
        let second = {
            let c = Arc::clone(&coordinator);
            tokio::spawn(async move { c.refresh_now().await })
        };

        let (first, second) = (first.await.unwrap(), second.await.unwrap());
        assert!(first);
        assert!(!second, "second trigger must be coalesced");

        // Exactly one snapshot publication.
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn snapshot_is_replaced_not_mutated() {
        let server = MockServer::start().await;
        mount_base(&server).await;
        mount_premium_ok(&server).await;
        mount_cart(&server, 1, Duration::ZERO).await;

        let coordinator = coordinator(&server);
        let before = coordinator.snapshot();
        assert!(coordinator.refresh_now().await);
        let after = coordinator.snapshot();

        // The pre-cycle Arc still points at the old, untouched snapshot.
        assert!(!before.has_data());
        assert!(after.has_data());
    }
}
