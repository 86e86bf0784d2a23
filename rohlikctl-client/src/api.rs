//! Typed API client, one method per upstream operation.
//!
//! Every method obtains a session first, attaches its token, and on a 401
//! response invalidates the session and retries the request exactly once
//! with a fresh token before surfacing the failure. A second 401 means
//! the credentials themselves are bad.

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use rohlikctl_core::{
    AccountInfo, CartOperationResult, CartSummary, DeliveryInfo, PremiumStatus, ProductMatch,
    ShoppingList,
};

use crate::error::ApiError;
use crate::session::{Session, SessionManager};
use crate::wire::{
    self, AnnouncementsData, BagsData, CartData, Envelope, PremiumData, ReservationData,
    SearchData, ShoppingListData, SlotsData,
};

// Endpoint paths. The upstream contract is unversioned and undocumented;
// all knowledge of it stays in this module and `wire`.
const BAGS_PATH: &str = "/api/v1/reusable-bags/user-info";
const PREMIUM_PATH: &str = "/services/frontend-service/premium/profile";
const FIRST_DELIVERY_PATH: &str =
    "/services/frontend-service/first-delivery?reasonableDeliveryTime=true";
const TIMESLOT_PATH: &str = "/services/frontend-service/v1/timeslot-reservation";
const DELIVERY_ANNOUNCEMENTS_PATH: &str = "/services/frontend-service/announcements/delivery";
const CART_PATH: &str = "/services/frontend-service/v2/cart";
const SEARCH_PATH: &str = "/services/frontend-service/search-metadata";
const SHOPPING_LIST_PATH: &str = "/api/v1/shopping-lists/id";

/// API client for the grocery service.
///
/// Cheap to clone; the session manager is shared, so the data coordinator
/// and the action gateway authenticate through the same session.
#[derive(Debug, Clone)]
pub struct RohlikApi {
    sessions: Arc<SessionManager>,
}

impl RohlikApi {
    /// Creates a client over a shared session manager.
    pub fn new(sessions: Arc<SessionManager>) -> Self {
        Self { sessions }
    }

    /// The shared session manager.
    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    /// True when repeated login rejections require operator action.
    pub fn needs_reconfiguration(&self) -> bool {
        self.sessions.needs_reconfiguration()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.sessions.base_url(), path)
    }

    /// Sends an authorized request, re-authenticating once on 401.
    async fn send_authorized<F>(&self, build: F) -> Result<Response, ApiError>
    where
        F: Fn(&Session) -> RequestBuilder,
    {
        let session = self.sessions.session().await?;
        let response = self
            .sessions
            .http()
            .send(build(&session).bearer_auth(&session.token))
            .await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        debug!("Token rejected, re-authenticating once");
        self.sessions.invalidate(&session.token).await;

        let session = self.sessions.session().await?;
        let response = self
            .sessions
            .http()
            .send(build(&session).bearer_auth(&session.token))
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Authentication(
                "session rejected after re-login".to_string(),
            ));
        }
        Ok(response)
    }

    /// Maps non-2xx statuses to `Upstream` and decodes the body.
    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Upstream request failed");
            return Err(ApiError::Upstream {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }

    /// Unwraps a frontend-service envelope, treating a non-200 envelope
    /// status as an upstream failure.
    fn unwrap_envelope<T>(envelope: Envelope<T>) -> Result<T, ApiError> {
        if envelope.status != 200 {
            return Err(ApiError::Upstream {
                status: envelope.status,
                body: envelope.first_message().to_string(),
            });
        }
        envelope
            .data
            .ok_or_else(|| ApiError::Decode("envelope missing data".to_string()))
    }

    async fn get_enveloped<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        let response = self
            .send_authorized(|_| self.sessions.http().inner().get(&url))
            .await?;
        Self::unwrap_envelope(Self::decode::<Envelope<T>>(response).await?)
    }

    // ------------------------------------------------------------------
    // Read operations
    // ------------------------------------------------------------------

    /// Fetches account information: the user profile from a fresh login
    /// envelope plus the reusable-bag counters.
    ///
    /// Credits and profile fields only appear in the login payload, so
    /// the session is refreshed here rather than reused.
    #[instrument(skip(self))]
    pub async fn fetch_account(&self) -> Result<AccountInfo, ApiError> {
        let session = self.sessions.refresh_session().await?;

        let url = self.url(BAGS_PATH);
        let response = self
            .send_authorized(|_| self.sessions.http().inner().get(&url))
            .await?;
        let bags: BagsData = Self::decode(response).await?;

        Ok(wire::build_account_info(&session.user, Some(&bags)))
    }

    /// Fetches premium membership status.
    #[instrument(skip(self))]
    pub async fn fetch_premium(&self) -> Result<PremiumStatus, ApiError> {
        let premium: PremiumData = self.get_enveloped(PREMIUM_PATH).await?;
        Ok(premium.into_premium_status())
    }

    /// Fetches delivery slot offers, the held reservation, and the
    /// current delivery announcement.
    #[instrument(skip(self))]
    pub async fn fetch_delivery_slots(&self) -> Result<DeliveryInfo, ApiError> {
        let slots: SlotsData = self.get_enveloped(FIRST_DELIVERY_PATH).await?;
        let reservation: ReservationData = self.get_enveloped(TIMESLOT_PATH).await?;
        let announcements: AnnouncementsData =
            self.get_enveloped(DELIVERY_ANNOUNCEMENTS_PATH).await?;

        Ok(wire::build_delivery_info(
            Some(slots),
            Some(reservation),
            Some(announcements),
        ))
    }

    /// Fetches the current cart contents.
    #[instrument(skip(self))]
    pub async fn fetch_cart(&self) -> Result<CartSummary, ApiError> {
        let cart: CartData = self.get_enveloped(CART_PATH).await?;
        Ok(cart.into_cart_summary())
    }

    /// Searches the catalog. Results arrive relevance-ranked; sponsored
    /// placements are filtered out and the order is otherwise preserved.
    /// An empty result is not an error.
    #[instrument(skip(self))]
    pub async fn search_products(
        &self,
        query: &str,
        limit: usize,
        favourites_only: bool,
    ) -> Result<Vec<ProductMatch>, ApiError> {
        let url = self.url(SEARCH_PATH);
        // Over-fetch to compensate for sponsored results being dropped.
        let fetch_limit = limit + 5;
        let search: SearchData = {
            let response = self
                .send_authorized(|_| {
                    self.sessions.http().inner().get(&url).query(&[
                        ("search", query),
                        ("offset", "0"),
                        ("limit", &fetch_limit.to_string()),
                        ("companyId", "1"),
                        ("canCorrect", "true"),
                    ])
                })
                .await?;
            Self::unwrap_envelope(Self::decode(response).await?)?
        };

        let matches = search
            .product_list
            .into_iter()
            .filter(|p| !p.is_promoted())
            .filter(|p| !favourites_only || p.favourite)
            .take(limit)
            .map(wire::SearchProduct::into_product_match)
            .collect();

        Ok(matches)
    }

    /// Fetches a saved shopping list by id. An upstream 404 maps to
    /// [`ApiError::NotFound`].
    #[instrument(skip(self))]
    pub async fn fetch_shopping_list(&self, list_id: &str) -> Result<ShoppingList, ApiError> {
        if list_id.trim().is_empty() {
            return Err(ApiError::Validation("shopping list id is empty".to_string()));
        }

        let url = format!("{}/{}", self.url(SHOPPING_LIST_PATH), list_id);
        let response = self
            .send_authorized(|_| self.sessions.http().inner().get(&url))
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(format!("shopping list {list_id}")));
        }

        let list: ShoppingListData = Self::decode(response).await?;
        Ok(list.into_shopping_list(list_id))
    }

    // ------------------------------------------------------------------
    // Write operations
    // ------------------------------------------------------------------

    /// Adds a product to the cart and returns the resulting cart state.
    ///
    /// NOT idempotent: every call adds `quantity` more units. Callers that
    /// need exactly-once semantics must dedupe upstream of this client.
    #[instrument(skip(self))]
    pub async fn add_to_cart(
        &self,
        product_id: i64,
        quantity: u32,
    ) -> Result<CartOperationResult, ApiError> {
        if quantity == 0 {
            return Err(ApiError::Validation(
                "quantity must be a positive integer".to_string(),
            ));
        }

        let url = self.url(CART_PATH);
        let payload = json!({
            "actionId": null,
            "productId": product_id,
            "quantity": quantity,
            "recipeId": null,
            "source": "true:Shopping Lists",
        });

        let response = self
            .send_authorized(|_| self.sessions.http().inner().post(&url).json(&payload))
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let cart = self.fetch_cart().await?;
        Ok(CartOperationResult {
            product_id,
            quantity,
            cart,
        })
    }

    /// Deletes a cart line by its cart line id.
    #[instrument(skip(self))]
    pub async fn delete_from_cart(&self, cart_item_id: &str) -> Result<CartSummary, ApiError> {
        if cart_item_id.trim().is_empty() {
            return Err(ApiError::Validation("cart item id is empty".to_string()));
        }

        let url = self.url(CART_PATH);
        let response = self
            .send_authorized(|_| {
                self.sessions
                    .http()
                    .inner()
                    .delete(&url)
                    .query(&[("orderFieldId", cart_item_id)])
            })
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        self.fetch_cart().await
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpClient;
    use crate::session::Credentials;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const LOGIN_PATH: &str = "/services/frontend-service/login";

    fn login_response(token: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "status": 200,
            "messages": [],
            "data": {
                "sessionToken": token,
                "user": {
                    "id": 7,
                    "name": "Test",
                    "email": "t@example.com",
                    "credits": 42.0
                },
                "address": { "id": 11 }
            }
        }))
    }

    fn enveloped(data: serde_json::Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "status": 200,
            "messages": [],
            "data": data
        }))
    }

    async fn api(server: &MockServer) -> RohlikApi {
        let sessions = Arc::new(SessionManager::new(
            Credentials::new("t@example.com", "secret"),
            server.uri(),
            HttpClient::new().unwrap(),
        ));
        RohlikApi::new(sessions)
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

    #[tokio::test]
    async fn fetch_cart_returns_summary() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(LOGIN_PATH))
            .respond_with(login_response("tok"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(CART_PATH))
            .respond_with(enveloped(cart_body(2)))
            .mount(&server)
            .await;

        let api = api(&server).await;
        let cart = api.fetch_cart().await.unwrap();
        assert_eq!(cart.total_items, 2);
        assert!(cart.can_make_order);
    }

    #[tokio::test]
    async fn fetch_account_picks_up_changed_credits() {
        let server = MockServer::start().await;
        let logins = std::sync::Arc::new(AtomicUsize::new(0));
        let counter = std::sync::Arc::clone(&logins);
        Mock::given(method("POST"))
            .and(path(LOGIN_PATH))
            .respond_with(move |_req: &wiremock::Request| {
                let credits = if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    10.0
                } else {
                    99.5
                };
                ResponseTemplate::new(200).set_body_json(json!({
                    "status": 200,
                    "messages": [],
                    "data": {
                        "sessionToken": "tok",
                        "user": {
                            "id": 7,
                            "name": "Test",
                            "email": "t@example.com",
                            "credits": credits
                        },
                        "address": { "id": 11 }
                    }
                }))
            })
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(BAGS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "current": 3,
                "max": 10
            })))
            .mount(&server)
            .await;

        let api = api(&server).await;
        let first = api.fetch_account().await.unwrap();
        assert_eq!(first.credit_amount, 10.0);

        // Credits change upstream between polls; the next fetch logs in
        // again and reflects the new balance.
        let second = api.fetch_account().await.unwrap();
        assert_eq!(second.credit_amount, 99.5);
        assert_eq!(second.bags_count, Some(3));
        assert_eq!(logins.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn rejected_token_retries_exactly_once() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(LOGIN_PATH))
            .respond_with(login_response("tok"))
            .expect(2)
            .mount(&server)
            .await;

        let cart_hits = std::sync::Arc::new(AtomicUsize::new(0));
        let hits = std::sync::Arc::clone(&cart_hits);
        Mock::given(method("GET"))
            .and(path(CART_PATH))
            .respond_with(move |_req: &wiremock::Request| {
                if hits.fetch_add(1, Ordering::SeqCst) == 0 {
                    ResponseTemplate::new(401)
                } else {
                    enveloped(cart_body(1))
                }
            })
            .expect(2)
            .mount(&server)
            .await;

        let api = api(&server).await;
        let cart = api.fetch_cart().await.unwrap();
        assert_eq!(cart.total_items, 1);
        assert_eq!(cart_hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn second_rejection_surfaces_authentication_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(LOGIN_PATH))
            .respond_with(login_response("tok"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(CART_PATH))
            .respond_with(ResponseTemplate::new(401))
            .expect(2)
            .mount(&server)
            .await;

        let api = api(&server).await;
        let err = api.fetch_cart().await.unwrap_err();
        assert!(matches!(err, ApiError::Authentication(_)));
    }

    #[tokio::test]
    async fn add_to_cart_rejects_zero_quantity_without_network() {
        let server = MockServer::start().await;
        // No mocks mounted: any request would 404 and fail the test below.

        let api = api(&server).await;
        let err = api.add_to_cart(42, 0).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn add_to_cart_reflects_increased_count() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(LOGIN_PATH))
            .respond_with(login_response("tok"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(CART_PATH))
            .respond_with(enveloped(json!({})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(CART_PATH))
            .respond_with(enveloped(cart_body(3)))
            .mount(&server)
            .await;

        let api = api(&server).await;
        let result = api.add_to_cart(42, 1).await.unwrap();
        assert_eq!(result.product_id, 42);
        assert_eq!(result.cart.total_items, 3);
    }

    #[tokio::test]
    async fn search_filters_promoted_and_preserves_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(LOGIN_PATH))
            .respond_with(login_response("tok"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(SEARCH_PATH))
            .and(query_param("search", "mléko"))
            .respond_with(enveloped(json!({
                "productList": [
                    {
                        "productId": 2,
                        "productName": "Sponzorované mléko",
                        "price": { "full": 19.9, "currency": "CZK" },
                        "badge": [{ "slug": "promoted" }]
                    },
                    {
                        "productId": 1,
                        "productName": "Mléko čerstvé",
                        "price": { "full": 25.9, "currency": "CZK" },
                        "badge": []
                    },
                    {
                        "productId": 3,
                        "productName": "Mléko trvanlivé",
                        "price": { "full": 21.9, "currency": "CZK" },
                        "badge": []
                    }
                ]
            })))
            .mount(&server)
            .await;

        let api = api(&server).await;
        let matches = api.search_products("mléko", 10, false).await.unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].id, 1);
        assert_eq!(matches[1].id, 3);
    }

    #[tokio::test]
    async fn empty_search_result_is_ok() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(LOGIN_PATH))
            .respond_with(login_response("tok"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(SEARCH_PATH))
            .respond_with(enveloped(json!({ "productList": [] })))
            .mount(&server)
            .await;

        let api = api(&server).await;
        let matches = api.search_products("neexistuje", 10, false).await.unwrap();
        assert!(matches.is_empty());
    }

    #[tokio::test]
    async fn missing_shopping_list_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(LOGIN_PATH))
            .respond_with(login_response("tok"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("{SHOPPING_LIST_PATH}/nope")))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let api = api(&server).await;
        let err = api.fetch_shopping_list("nope").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn upstream_error_carries_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(LOGIN_PATH))
            .respond_with(login_response("tok"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(PREMIUM_PATH))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let api = api(&server).await;
        let err = api.fetch_premium().await.unwrap_err();
        match err {
            ApiError::Upstream { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "maintenance");
            }
            other => panic!("expected upstream error, got {other:?}"),
        }
    }
}
