//! End-to-end test harness for Ristretto.
//!
//! Each test gets its own stack on ephemeral local ports:
//!
//! ```text
//! ApiClient ──► ristretto-proxy (/api/proxy) ──► FakeBackend (/api)
//! ```
//!
//! [`FakeBackend`] keeps favorites and visits in memory, accepts a single
//! bearer token ([`TOKEN`]) and can be scripted to fail its next request.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p ristretto-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::{Arc, Mutex, PoisonError};

use axum::{
    Json, Router,
    extract::{Path, Query, RawQuery, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::Utc;
use ristretto_client::{ApiClient, ClientConfig};
use ristretto_core::{
    CoffeeShop, CoffeeShopDetails, CoffeeShopDetailsResponse, CoffeeShopsResponse,
    FavoritesResponse, PlaceId, User, Visit, VisitsResponse,
};
use ristretto_proxy::{config::ProxyConfig, state::AppState};
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::json;
use url::Url;

/// The only bearer token the fake backend accepts.
pub const TOKEN: &str = "token-ada";

/// In-memory stand-in for the Ristretto backend.
pub struct FakeBackend {
    shops: Vec<CoffeeShop>,
    favorites: Mutex<Vec<CoffeeShop>>,
    visits: Mutex<Vec<Visit>>,
    failure: Mutex<Option<(StatusCode, String)>>,
    requests: Mutex<Vec<String>>,
}

impl FakeBackend {
    /// A backend that knows about `shops`.
    #[must_use]
    pub const fn new(shops: Vec<CoffeeShop>) -> Self {
        Self {
            shops,
            favorites: Mutex::new(Vec::new()),
            visits: Mutex::new(Vec::new()),
            failure: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answer the next authorized request with `status` and `{"error": message}`.
    pub fn fail_next(&self, status: StatusCode, message: &str) {
        *lock(&self.failure) = Some((status, message.to_string()));
    }

    /// Every authorized request seen so far, as `METHOD /path?query`.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        lock(&self.requests).clone()
    }

    /// IDs of the current favorites, in insertion order.
    #[must_use]
    pub fn favorite_ids(&self) -> Vec<String> {
        lock(&self.favorites)
            .iter()
            .map(|shop| shop.id.to_string())
            .collect()
    }

    /// The backend's routes, mounted under `/api`.
    pub fn router(self: &Arc<Self>) -> Router {
        Router::new()
            .route("/api/health", get(|| async { "ok" }))
            .route("/api/coffee_shops", get(search))
            .route("/api/coffee_shops/{id}", get(details))
            .route(
                "/api/favorites",
                get(list_favorites)
                    .post(add_favorite)
                    .delete(remove_favorite),
            )
            .route("/api/visits", get(list_visits).post(add_visit))
            .route("/api/user", get(user))
            .with_state(Arc::clone(self))
    }

    /// Check the bearer token, log the request and apply any scripted failure.
    fn admit(&self, headers: &HeaderMap, request: String) -> Result<(), Response> {
        let authorized = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value == format!("Bearer {TOKEN}"));
        if !authorized {
            return Err(error(StatusCode::UNAUTHORIZED, "Unauthorized"));
        }

        lock(&self.requests).push(request);
        match lock(&self.failure).take() {
            Some((status, message)) => Err(error(status, &message)),
            None => Ok(()),
        }
    }

    fn is_favorite(&self, id: &PlaceId) -> bool {
        lock(&self.favorites).iter().any(|shop| &shop.id == id)
    }

    fn with_flag(&self, shop: &CoffeeShop) -> CoffeeShop {
        CoffeeShop {
            is_favorite: self.is_favorite(&shop.id),
            ..shop.clone()
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    max: usize,
}

#[derive(Debug, Deserialize)]
struct RemoveQuery {
    #[serde(rename = "placeId")]
    place_id: PlaceId,
}

type Backend = State<Arc<FakeBackend>>;

async fn search(
    State(backend): Backend,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
    Query(query): Query<SearchQuery>,
) -> Result<Json<CoffeeShopsResponse>, Response> {
    backend.admit(
        &headers,
        format!("GET /coffee_shops?{}", raw.unwrap_or_default()),
    )?;
    let coffee_shops = backend
        .shops
        .iter()
        .take(query.max)
        .map(|shop| backend.with_flag(shop))
        .collect();
    Ok(Json(CoffeeShopsResponse { coffee_shops }))
}

async fn details(
    State(backend): Backend,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<CoffeeShopDetailsResponse>, Response> {
    backend.admit(&headers, format!("GET /coffee_shops/{id}"))?;
    let shop = backend
        .shops
        .iter()
        .find(|shop| shop.id.as_str() == id)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Coffee shop not found"))?;

    Ok(Json(CoffeeShopDetailsResponse {
        coffee_shop: CoffeeShopDetails {
            id: shop.id.clone(),
            name: shop.name.clone(),
            latitude: shop.latitude,
            longitude: shop.longitude,
            is_favorite: backend.is_favorite(&shop.id),
            address: Some("1 Ferry Building".to_string()),
            phone_number: None,
            website: None,
            rating: Some(4.5),
            price_level: Some(2),
            opening_hours: Vec::new(),
            photos: Vec::new(),
        },
    }))
}

async fn list_favorites(
    State(backend): Backend,
    headers: HeaderMap,
) -> Result<Json<FavoritesResponse>, Response> {
    backend.admit(&headers, "GET /favorites".to_string())?;
    Ok(Json(FavoritesResponse {
        favorites: lock(&backend.favorites).clone(),
    }))
}

async fn add_favorite(
    State(backend): Backend,
    headers: HeaderMap,
    Json(shop): Json<CoffeeShop>,
) -> Result<Json<serde_json::Value>, Response> {
    backend.admit(&headers, format!("POST /favorites {}", shop.id))?;
    let mut favorites = lock(&backend.favorites);
    if !favorites.iter().any(|existing| existing.id == shop.id) {
        favorites.push(CoffeeShop {
            is_favorite: true,
            ..shop
        });
    }
    Ok(Json(json!({ "success": true })))
}

async fn remove_favorite(
    State(backend): Backend,
    headers: HeaderMap,
    Query(query): Query<RemoveQuery>,
) -> Result<Json<serde_json::Value>, Response> {
    backend.admit(&headers, format!("DELETE /favorites {}", query.place_id))?;
    lock(&backend.favorites).retain(|shop| shop.id != query.place_id);
    Ok(Json(json!({ "success": true })))
}

async fn list_visits(
    State(backend): Backend,
    headers: HeaderMap,
) -> Result<Json<VisitsResponse>, Response> {
    backend.admit(&headers, "GET /visits".to_string())?;
    Ok(Json(VisitsResponse {
        visits: lock(&backend.visits).clone(),
    }))
}

async fn add_visit(
    State(backend): Backend,
    headers: HeaderMap,
    Json(shop): Json<CoffeeShop>,
) -> Result<Json<serde_json::Value>, Response> {
    backend.admit(&headers, format!("POST /visits {}", shop.id))?;
    lock(&backend.visits).push(Visit {
        place_id: shop.id,
        name: shop.name,
        visited_at: Utc::now(),
    });
    Ok(Json(json!({ "success": true })))
}

async fn user(State(backend): Backend, headers: HeaderMap) -> Result<Json<User>, Response> {
    backend.admit(&headers, "GET /user".to_string())?;
    let now = Utc::now();
    Ok(Json(User {
        id: 1.into(),
        clerk_id: "user_ada".to_string(),
        email: "ada@example.com".to_string(),
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        created_at: now,
        updated_at: now,
    }))
}

/// A shop record.
///
/// # Panics
///
/// Panics if `id` is blank.
#[must_use]
pub fn shop(id: &str, name: &str, latitude: f64, longitude: f64) -> CoffeeShop {
    CoffeeShop {
        id: PlaceId::parse(id).expect("valid place id"),
        name: name.to_string(),
        latitude,
        longitude,
        is_favorite: false,
        photos: None,
    }
}

/// Three shops around the default location, listed farthest first so that
/// ranking by distance is observable.
#[must_use]
pub fn sample_shops() -> Vec<CoffeeShop> {
    vec![
        shop("far", "Ritual", 37.8080, -122.4177),
        shop("near", "Blue Bottle", 37.7940, -122.3960),
        shop("mid", "Sightglass", 37.7890, -122.4010),
    ]
}

/// Serve `router` on an ephemeral local port and return its root URL.
///
/// # Panics
///
/// Panics if no local port can be bound.
pub async fn serve(router: Router) -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind local port");
    let addr = listener.local_addr().expect("local address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("test server");
    });
    Url::parse(&format!("http://{addr}/")).expect("server url")
}

/// A proxy forwarding to `backend_url`, served locally. Returns its root URL.
///
/// # Panics
///
/// Panics if the proxy state cannot be built.
pub async fn serve_proxy(backend_url: Url) -> Url {
    let state = AppState::new(ProxyConfig::with_backend(backend_url)).expect("proxy state");
    serve(ristretto_proxy::app(state)).await
}

/// A running backend and proxy pair.
pub struct Stack {
    pub backend: Arc<FakeBackend>,
    /// Backend base URL (`.../api`)
    pub backend_url: Url,
    /// Proxy root URL
    pub proxy_root: Url,
    /// Proxy API base URL (`.../api/proxy`), suitable for [`ApiClient`]
    pub proxy_url: Url,
}

impl Stack {
    /// Start a backend over [`sample_shops`] and a proxy in front of it.
    ///
    /// # Panics
    ///
    /// Panics if either server fails to start.
    pub async fn start() -> Self {
        let backend = Arc::new(FakeBackend::new(sample_shops()));
        let backend_url = serve(backend.router())
            .await
            .join("api")
            .expect("backend url");
        let proxy_root = serve_proxy(backend_url.clone()).await;
        let proxy_url = proxy_root.join("api/proxy").expect("proxy url");

        Self {
            backend,
            backend_url,
            proxy_root,
            proxy_url,
        }
    }

    /// A client talking to the proxy, optionally signed in with `token`.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    pub fn client(&self, token: Option<&str>) -> ApiClient {
        client(&self.proxy_url, token)
    }
}

/// An API client for `base_url`, optionally signed in with `token`.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
pub fn client(base_url: &Url, token: Option<&str>) -> ApiClient {
    let mut config = ClientConfig::new(base_url.clone());
    config.token = token.map(SecretString::from);
    ApiClient::from_config(&config).expect("api client")
}
