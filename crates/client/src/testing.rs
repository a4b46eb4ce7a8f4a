//! Test support: an in-memory backend and a local HTTP server helper.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use ristretto_core::{CoffeeShop, Coordinates, PlaceId};
use secrecy::SecretString;
use tokio::sync::Notify;
use url::Url;

use crate::api::ApiClient;
use crate::backend::Backend;
use crate::config::ClientConfig;
use crate::error::ClientError;

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn serve(router: axum::Router) -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    Url::parse(&format!("http://{addr}")).unwrap()
}

/// An API client for `base_url`, optionally signed in with `token`.
pub fn client(base_url: Url, token: Option<&str>) -> ApiClient {
    let mut config = ClientConfig::new(base_url);
    config.token = token.map(SecretString::from);
    ApiClient::from_config(&config).unwrap()
}

/// A shop record for tests.
pub fn shop(id: &str, latitude: f64, longitude: f64, is_favorite: bool) -> CoffeeShop {
    CoffeeShop {
        id: PlaceId::parse(id).unwrap(),
        name: format!("Shop {id}"),
        latitude,
        longitude,
        is_favorite,
        photos: None,
    }
}

/// A backend call recorded by [`FakeBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Search(Coordinates),
    Favorites,
    Add(PlaceId),
    Remove(PlaceId),
    Visit(PlaceId),
}

/// A scripted nearby-search reply.
struct SearchReply {
    gate: Option<Arc<Notify>>,
    shops: Option<Vec<CoffeeShop>>,
}

/// In-memory [`Backend`] that records every call.
#[derive(Default)]
pub struct FakeBackend {
    calls: Mutex<Vec<Call>>,
    searches: Mutex<VecDeque<SearchReply>>,
    favorites: Mutex<Vec<CoffeeShop>>,
    write_gate: Mutex<Option<Arc<Notify>>>,
    fail_writes: AtomicBool,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a search reply. `None` shops answer with a 500. A gate holds the
    /// reply until notified.
    pub fn push_search(&self, gate: Option<Arc<Notify>>, shops: Option<Vec<CoffeeShop>>) {
        lock(&self.searches).push_back(SearchReply { gate, shops });
    }

    pub fn set_favorites(&self, shops: Vec<CoffeeShop>) {
        *lock(&self.favorites) = shops;
    }

    /// Hold every add/remove until `gate` is notified.
    pub fn gate_writes(&self, gate: Arc<Notify>) {
        *lock(&self.write_gate) = Some(gate);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<Call> {
        lock(&self.calls).clone()
    }

    fn record(&self, call: Call) {
        lock(&self.calls).push(call);
    }

    async fn write(&self, call: Call) -> Result<(), ClientError> {
        self.record(call);
        let gate = lock(&self.write_gate).clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ClientError::Remote {
                status: 500,
                message: "Database error".to_string(),
            });
        }
        Ok(())
    }
}

impl Backend for FakeBackend {
    async fn search_nearby(&self, coordinates: &Coordinates) -> Result<Vec<CoffeeShop>, ClientError> {
        self.record(Call::Search(*coordinates));
        let reply = lock(&self.searches).pop_front();
        let Some(reply) = reply else {
            return Ok(Vec::new());
        };
        if let Some(gate) = reply.gate {
            gate.notified().await;
        }
        reply.shops.ok_or_else(|| ClientError::Remote {
            status: 500,
            message: "Places API error".to_string(),
        })
    }

    async fn favorites(&self) -> Result<Vec<CoffeeShop>, ClientError> {
        self.record(Call::Favorites);
        Ok(lock(&self.favorites).clone())
    }

    async fn add_favorite(&self, shop: &CoffeeShop) -> Result<(), ClientError> {
        self.write(Call::Add(shop.id.clone())).await
    }

    async fn remove_favorite(&self, place_id: &PlaceId) -> Result<(), ClientError> {
        self.write(Call::Remove(place_id.clone())).await
    }

    async fn record_visit(&self, shop: &CoffeeShop) -> Result<(), ClientError> {
        self.write(Call::Visit(shop.id.clone())).await
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
