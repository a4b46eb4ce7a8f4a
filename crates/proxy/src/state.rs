//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use ristretto_client::{ApiClient, ClientConfig, ClientError, StaticCredential};

use crate::config::ProxyConfig;
use crate::middleware::{Caller, RequestId};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and holds the configuration and
/// the backend client whose connection pool every request shares.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ProxyConfig,
    backend: ApiClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend HTTP client fails to build.
    pub fn new(config: ProxyConfig) -> Result<Self, ClientError> {
        let mut client_config = ClientConfig::new(config.backend_url.clone());
        client_config.timeout = config.backend_timeout;
        // Per-caller clients never cache; the shared client only checks health.
        client_config.details_cache_ttl = Duration::ZERO;

        let backend = ApiClient::from_config(&client_config)?;

        Ok(Self {
            inner: Arc::new(AppStateInner { config, backend }),
        })
    }

    /// Get a reference to the proxy configuration.
    #[must_use]
    pub fn config(&self) -> &ProxyConfig {
        &self.inner.config
    }

    /// The shared backend client. It carries no credential.
    #[must_use]
    pub fn backend(&self) -> &ApiClient {
        &self.inner.backend
    }

    /// A backend client that forwards the caller's token and request ID.
    #[must_use]
    pub fn backend_for(&self, caller: Caller) -> ApiClient {
        let client = self
            .inner
            .backend
            .with_credential(StaticCredential::from(caller.token));
        match caller.request_id {
            Some(RequestId(id)) => client.with_request_id(id),
            None => client,
        }
    }
}
