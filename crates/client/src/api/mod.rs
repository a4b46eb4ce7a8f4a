//! Ristretto backend API client.
//!
//! Every authenticated call asks the client's [`CredentialProvider`] for a
//! token first; without one the call fails with
//! [`ClientError::AuthRequired`] and no request is sent. Each operation issues
//! exactly one request and never retries.
//!
//! Shop details are cached with `moka` for a few minutes. The cache belongs to
//! one credential: clients derived with [`ApiClient::with_credential`] share the
//! connection pool but start without a cache, so a user's favorite flags never
//! leak into another user's responses.

mod response;

use std::sync::Arc;

use moka::future::Cache;
use reqwest::{Method, RequestBuilder, StatusCode};
use ristretto_core::{
    CoffeeShop, CoffeeShopDetails, CoffeeShopDetailsResponse, CoffeeShopsResponse, Coordinates,
    FavoritesResponse, PlaceId, User, Visit, VisitsResponse,
};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::credential::{CredentialProvider, StaticCredential};
use crate::error::ClientError;

pub use response::remote_message;

/// Header carrying the caller's request ID to the backend.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Maximum number of shop details kept in the cache.
const DETAILS_CACHE_CAPACITY: u64 = 500;

/// Client for the Ristretto backend.
///
/// Cheap to clone; clones share the connection pool and details cache.
#[derive(Clone)]
pub struct ApiClient<C = StaticCredential> {
    inner: Arc<ApiClientInner>,
    details: Option<Cache<PlaceId, CoffeeShopDetails>>,
    credential: C,
    request_id: Option<String>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: Url,
    details_ttl: std::time::Duration,
}

impl<C> std::fmt::Debug for ApiClient<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("details_cache", &self.details.is_some())
            .field("request_id", &self.request_id)
            .finish_non_exhaustive()
    }
}

impl ApiClient<StaticCredential> {
    /// Build a client whose credential is the configured token, if any.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        Self::new(config, StaticCredential::new(config.token.clone()))
    }
}

impl<C: CredentialProvider> ApiClient<C> {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build or the base URL cannot
    /// carry a path.
    pub fn new(config: &ClientConfig, credential: C) -> Result<Self, ClientError> {
        if config.api_url.cannot_be_a_base() {
            return Err(ClientError::Config(format!(
                "API URL cannot carry a path: {}",
                config.api_url
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        let inner = Arc::new(ApiClientInner {
            http,
            base_url: config.api_url.clone(),
            details_ttl: config.details_cache_ttl,
        });

        Ok(Self {
            details: build_details_cache(&inner),
            inner,
            credential,
            request_id: None,
        })
    }

    /// A client for another credential, sharing this client's connection pool.
    #[must_use]
    pub fn with_credential<D: CredentialProvider>(&self, credential: D) -> ApiClient<D> {
        ApiClient {
            inner: Arc::clone(&self.inner),
            details: None,
            credential,
            request_id: None,
        }
    }

    /// Tag every authenticated request from this client with `request_id`.
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// The request ID sent with each call, if any.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    /// The backend base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// The credential provider attached to this client.
    #[must_use]
    pub const fn credential(&self) -> &C {
        &self.credential
    }

    /// Build an endpoint URL from path segments.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.inner.base_url.clone();
        // `new` rejected cannot-be-a-base URLs, so segments are always available.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// The nearby-search URL for `coordinates`.
    ///
    /// Carries exactly the `lat`, `lng`, `radius` and `max` parameters.
    #[must_use]
    pub fn search_url(&self, coordinates: &Coordinates) -> Url {
        let mut url = self.endpoint(&["coffee_shops"]);
        url.query_pairs_mut()
            .extend_pairs(coordinates.query_pairs());
        url
    }

    /// Attach the bearer token, send, and map the status.
    ///
    /// Returns the response body text for 2xx responses.
    async fn execute(&self, request: RequestBuilder) -> Result<String, ClientError> {
        let Some(token) = self.credential.token().await else {
            debug!("No credential available, request not sent");
            return Err(ClientError::AuthRequired(
                "authentication required".to_string(),
            ));
        };

        let mut request = request.bearer_auth(token.expose_secret());
        if let Some(request_id) = &self.request_id {
            request = request.header(REQUEST_ID_HEADER, request_id);
        }

        let response = request
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Backend request failed");
                ClientError::Network(e)
            })?;

        let status = response.status();
        let body = response.text().await?;

        if status == StatusCode::UNAUTHORIZED {
            warn!("Backend rejected credential");
            return Err(ClientError::AuthRequired(remote_message(status, &body)));
        }

        if !status.is_success() {
            let message = remote_message(status, &body);
            warn!(status = %status, message = %message, "Backend returned error");
            return Err(ClientError::Remote {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }

    /// GET `url` and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ClientError> {
        let body = self
            .execute(self.inner.http.request(Method::GET, url))
            .await?;
        decode(&body)
    }

    /// Search coffee shops near `coordinates`.
    ///
    /// # Errors
    ///
    /// Returns `AuthRequired`, `Remote`, `Parse` or `Network` as described on
    /// [`ClientError`].
    #[instrument(skip_all, fields(
        lat = coordinates.latitude(),
        lng = coordinates.longitude(),
        radius = coordinates.radius_meters(),
        max = coordinates.max_results(),
    ))]
    pub async fn search_nearby(
        &self,
        coordinates: &Coordinates,
    ) -> Result<Vec<CoffeeShop>, ClientError> {
        let response: CoffeeShopsResponse = self.get_json(self.search_url(coordinates)).await?;
        debug!(count = response.coffee_shops.len(), "Nearby search returned");
        Ok(response.coffee_shops)
    }

    /// Fetch the detail record for one shop.
    ///
    /// # Errors
    ///
    /// Returns `AuthRequired`, `Remote`, `Parse` or `Network`.
    #[instrument(skip_all, fields(place_id = %place_id))]
    pub async fn shop_details(&self, place_id: &PlaceId) -> Result<CoffeeShopDetails, ClientError> {
        if let Some(cache) = &self.details
            && let Some(cached) = cache.get(place_id).await
        {
            debug!("Shop details cache hit");
            return Ok(cached);
        }

        let url = self.endpoint(&["coffee_shops", place_id.as_str()]);
        let response: CoffeeShopDetailsResponse = self.get_json(url).await?;

        if let Some(cache) = &self.details {
            cache
                .insert(place_id.clone(), response.coffee_shop.clone())
                .await;
        }

        Ok(response.coffee_shop)
    }

    /// Drop a cached details record.
    pub async fn invalidate_details(&self, place_id: &PlaceId) {
        if let Some(cache) = &self.details {
            cache.invalidate(place_id).await;
        }
    }

    /// List the user's favorite shops.
    ///
    /// # Errors
    ///
    /// Returns `AuthRequired`, `Remote`, `Parse` or `Network`.
    #[instrument(skip(self))]
    pub async fn favorites(&self) -> Result<Vec<CoffeeShop>, ClientError> {
        let response: FavoritesResponse = self.get_json(self.endpoint(&["favorites"])).await?;
        Ok(response.favorites)
    }

    /// Add a shop to the user's favorites.
    ///
    /// # Errors
    ///
    /// Returns `AuthRequired`, `Remote` or `Network`.
    #[instrument(skip_all, fields(place_id = %shop.id))]
    pub async fn add_favorite(&self, shop: &CoffeeShop) -> Result<(), ClientError> {
        let request = self
            .inner
            .http
            .request(Method::POST, self.endpoint(&["favorites"]))
            .json(shop);
        self.execute(request).await?;
        self.invalidate_details(&shop.id).await;
        debug!("Favorite added");
        Ok(())
    }

    /// Remove a shop from the user's favorites.
    ///
    /// # Errors
    ///
    /// Returns `AuthRequired`, `Remote` or `Network`.
    #[instrument(skip_all, fields(place_id = %place_id))]
    pub async fn remove_favorite(&self, place_id: &PlaceId) -> Result<(), ClientError> {
        let mut url = self.endpoint(&["favorites"]);
        url.query_pairs_mut().append_pair("placeId", place_id.as_str());

        self.execute(self.inner.http.request(Method::DELETE, url))
            .await?;
        self.invalidate_details(place_id).await;
        debug!("Favorite removed");
        Ok(())
    }

    /// Record a visit to a shop.
    ///
    /// # Errors
    ///
    /// Returns `AuthRequired`, `Remote` or `Network`.
    #[instrument(skip_all, fields(place_id = %shop.id))]
    pub async fn record_visit(&self, shop: &CoffeeShop) -> Result<(), ClientError> {
        let request = self
            .inner
            .http
            .request(Method::POST, self.endpoint(&["visits"]))
            .json(shop);
        self.execute(request).await?;
        debug!("Visit recorded");
        Ok(())
    }

    /// List the user's visit history.
    ///
    /// # Errors
    ///
    /// Returns `AuthRequired`, `Remote`, `Parse` or `Network`.
    #[instrument(skip(self))]
    pub async fn visits(&self) -> Result<Vec<Visit>, ClientError> {
        let response: VisitsResponse = self.get_json(self.endpoint(&["visits"])).await?;
        Ok(response.visits)
    }

    /// Fetch the signed-in user's profile.
    ///
    /// # Errors
    ///
    /// Returns `AuthRequired`, `Remote`, `Parse` or `Network`.
    #[instrument(skip(self))]
    pub async fn user(&self) -> Result<User, ClientError> {
        self.get_json(self.endpoint(&["user"])).await
    }

    /// Unauthenticated liveness check.
    ///
    /// Returns `false` for any non-2xx status or transport failure.
    #[instrument(skip(self))]
    pub async fn health(&self) -> bool {
        match self.inner.http.get(self.endpoint(&["health"])).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(error = %e, "Health check failed");
                false
            }
        }
    }
}

fn build_details_cache(inner: &ApiClientInner) -> Option<Cache<PlaceId, CoffeeShopDetails>> {
    if inner.details_ttl.is_zero() {
        return None;
    }
    Some(
        Cache::builder()
            .max_capacity(DETAILS_CACHE_CAPACITY)
            .time_to_live(inner.details_ttl)
            .build(),
    )
}

/// Decode a JSON body, logging a prefix of it on failure.
fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ClientError> {
    serde_json::from_str(body).map_err(|e| {
        warn!(
            error = %e,
            body = %body.chars().take(200).collect::<String>(),
            "Failed to parse backend response"
        );
        ClientError::Parse(e.to_string())
    })
}
