//! List view state.
//!
//! [`NearbyShops`] holds the most recent search result. Searches are not
//! cancelled when a newer one starts; instead each takes a [`SearchTicket`] and
//! only the newest ticket may replace the list.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ristretto_core::{CoffeeShop, Coordinates, GeoPoint, PlaceId, rank_by_distance};
use tracing::{debug, instrument};

use crate::backend::Backend;
use crate::error::ClientError;
use crate::reconcile::Reconciler;

/// Identifies one search request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SearchTicket(u64);

/// Monotonic search counter.
#[derive(Debug, Default)]
pub struct Generation(AtomicU64);

impl Generation {
    /// Issue a ticket newer than every ticket issued before.
    pub fn next(&self) -> SearchTicket {
        SearchTicket(self.0.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether `ticket` is the newest issued.
    #[must_use]
    pub fn is_current(&self, ticket: SearchTicket) -> bool {
        self.0.load(Ordering::SeqCst) == ticket.0
    }
}

/// What became of a search.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// The results replaced the list, ranked nearest first.
    Applied(Vec<CoffeeShop>),
    /// A newer search was started before this one finished.
    Stale,
}

#[derive(Debug, Default)]
struct NearbyState {
    origin: Option<GeoPoint>,
    shops: Vec<CoffeeShop>,
}

/// Nearby search results.
#[derive(Debug)]
pub struct NearbyShops<B> {
    reconciler: Arc<Reconciler<B>>,
    generation: Generation,
    state: Mutex<NearbyState>,
}

impl<B: Backend> NearbyShops<B> {
    #[must_use]
    pub fn new(reconciler: Arc<Reconciler<B>>) -> Self {
        Self {
            reconciler,
            generation: Generation::default(),
            state: Mutex::new(NearbyState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, NearbyState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run a search and apply its results unless a newer search has started.
    ///
    /// # Errors
    ///
    /// Returns the backend error for the newest search. Errors from a
    /// superseded search are dropped and reported as [`SearchOutcome::Stale`].
    #[instrument(skip_all, fields(lat = coordinates.latitude(), lng = coordinates.longitude()))]
    pub async fn search(&self, coordinates: &Coordinates) -> Result<SearchOutcome, ClientError> {
        let ticket = self.generation.next();
        let result = self.reconciler.backend().search_nearby(coordinates).await;
        self.apply(ticket, coordinates.center(), result)
    }

    fn apply(
        &self,
        ticket: SearchTicket,
        origin: GeoPoint,
        result: Result<Vec<CoffeeShop>, ClientError>,
    ) -> Result<SearchOutcome, ClientError> {
        let mut state = self.state();
        if !self.generation.is_current(ticket) {
            debug!(ticket = ticket.0, "Discarding stale search response");
            return Ok(SearchOutcome::Stale);
        }

        let mut shops = self.reconciler.merge(result?);
        rank_by_distance(origin, &mut shops);

        state.origin = Some(origin);
        state.shops.clone_from(&shops);
        debug!(count = shops.len(), "Search results applied");
        Ok(SearchOutcome::Applied(shops))
    }

    /// The held results with optimistic favorite flags.
    #[must_use]
    pub fn shops(&self) -> Vec<CoffeeShop> {
        let mut shops = self.state().shops.clone();
        self.reconciler.overlay(&mut shops);
        shops
    }

    /// Where the held results were searched from.
    #[must_use]
    pub fn origin(&self) -> Option<GeoPoint> {
        self.state().origin
    }

    /// Toggle the favorite flag of a held shop.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::UnknownShop` if the shop is not in the list, or
    /// any error from [`Reconciler::toggle_favorite`].
    pub async fn toggle_favorite(&self, id: &PlaceId) -> Result<bool, ClientError> {
        let shop = self.find(id)?;
        let now = self.reconciler.toggle_favorite(&shop).await?;

        if let Some(held) = self.state().shops.iter_mut().find(|s| &s.id == id) {
            held.is_favorite = now;
        }
        Ok(now)
    }

    /// Record a visit to a held shop.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::UnknownShop` if the shop is not in the list, or
    /// the backend error.
    pub async fn record_visit(&self, id: &PlaceId) -> Result<(), ClientError> {
        let shop = self.find(id)?;
        self.reconciler.record_visit(&shop).await
    }

    fn find(&self, id: &PlaceId) -> Result<CoffeeShop, ClientError> {
        self.state()
            .shops
            .iter()
            .find(|s| &s.id == id)
            .cloned()
            .ok_or_else(|| ClientError::UnknownShop(id.clone()))
    }
}

/// The favorites-only list.
#[derive(Debug)]
pub struct FavoritesView<B> {
    reconciler: Arc<Reconciler<B>>,
    favorites: Mutex<Vec<CoffeeShop>>,
}

impl<B: Backend> FavoritesView<B> {
    #[must_use]
    pub fn new(reconciler: Arc<Reconciler<B>>) -> Self {
        Self {
            reconciler,
            favorites: Mutex::new(Vec::new()),
        }
    }

    fn favorites(&self) -> MutexGuard<'_, Vec<CoffeeShop>> {
        self.favorites.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the list with the backend's favorites.
    ///
    /// # Errors
    ///
    /// Returns the backend error; the held list is left as it was.
    #[instrument(skip_all)]
    pub async fn load(&self) -> Result<Vec<CoffeeShop>, ClientError> {
        let mut shops = self.reconciler.backend().favorites().await?;
        for shop in &mut shops {
            shop.is_favorite = true;
        }
        let shops = self.reconciler.merge(shops);

        *self.favorites() = shops.clone();
        debug!(count = shops.len(), "Favorites loaded");
        Ok(shops)
    }

    #[must_use]
    pub fn shops(&self) -> Vec<CoffeeShop> {
        self.favorites().clone()
    }

    /// Unfavorite a listed shop and drop it from the list on success.
    ///
    /// Only ever issues a remove. If the shop is already known not to be a
    /// favorite, the entry is dropped without a backend call.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::UnknownShop` if the shop is not listed, or the
    /// reconciler's error, in which case the list is unchanged.
    #[instrument(skip_all, fields(place_id = %id))]
    pub async fn remove(&self, id: &PlaceId) -> Result<(), ClientError> {
        let shop = self
            .favorites()
            .iter()
            .find(|s| &s.id == id)
            .cloned()
            .ok_or_else(|| ClientError::UnknownShop(id.clone()))?;

        self.reconciler.remove_favorite(&shop.id).await?;
        self.favorites().retain(|s| &s.id != id);
        debug!("Removed from favorites list");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tokio::sync::Notify;

    use super::*;
    use crate::reconcile::FavoriteState;
    use crate::testing::{Call, FakeBackend, shop};

    fn id(s: &str) -> PlaceId {
        PlaceId::parse(s).unwrap()
    }

    fn ids(shops: &[CoffeeShop]) -> Vec<&str> {
        shops.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn test_generation_tickets() {
        let generation = Generation::default();
        let first = generation.next();
        assert!(generation.is_current(first));
        let second = generation.next();
        assert!(second > first);
        assert!(!generation.is_current(first));
        assert!(generation.is_current(second));
    }

    #[tokio::test]
    async fn test_search_ranks_by_distance() {
        let backend = FakeBackend::new();
        backend.push_search(
            None,
            Some(vec![
                shop("far", 37.8044, -122.2712, false),
                shop("near", 37.7940, -122.3960, false),
                shop("mid", 37.7749, -122.4194, false),
            ]),
        );
        let view = NearbyShops::new(Arc::new(Reconciler::new(backend)));

        let outcome = view.search(&Coordinates::default()).await.unwrap();

        let SearchOutcome::Applied(shops) = outcome else {
            panic!("expected applied results");
        };
        assert_eq!(ids(&shops), vec!["near", "mid", "far"]);
        assert_eq!(ids(&view.shops()), vec!["near", "mid", "far"]);
        assert_eq!(view.origin(), Some(GeoPoint::DEFAULT));
    }

    #[tokio::test]
    async fn test_stale_response_discarded() {
        let slow = Arc::new(Notify::new());
        let backend = FakeBackend::new();
        backend.push_search(Some(Arc::clone(&slow)), Some(vec![shop("old", 37.79, -122.39, false)]));
        backend.push_search(None, Some(vec![shop("new", 37.79, -122.39, false)]));
        let view = NearbyShops::new(Arc::new(Reconciler::new(backend)));
        let coords = Coordinates::default();

        let (first, second) = tokio::join!(view.search(&coords), async {
            let second = view.search(&coords).await;
            slow.notify_one();
            second
        });

        assert_eq!(first.unwrap(), SearchOutcome::Stale);
        assert!(matches!(second.unwrap(), SearchOutcome::Applied(_)));
        assert_eq!(ids(&view.shops()), vec!["new"]);
    }

    #[tokio::test]
    async fn test_stale_error_is_dropped() {
        let slow = Arc::new(Notify::new());
        let backend = FakeBackend::new();
        backend.push_search(Some(Arc::clone(&slow)), None);
        backend.push_search(None, Some(vec![shop("new", 37.79, -122.39, false)]));
        let view = NearbyShops::new(Arc::new(Reconciler::new(backend)));
        let coords = Coordinates::default();

        let (first, _) = tokio::join!(view.search(&coords), async {
            let second = view.search(&coords).await;
            slow.notify_one();
            second
        });

        assert_eq!(first.unwrap(), SearchOutcome::Stale);
    }

    #[tokio::test]
    async fn test_failed_search_keeps_list() {
        let backend = FakeBackend::new();
        backend.push_search(None, Some(vec![shop("a", 37.79, -122.39, false)]));
        backend.push_search(None, None);
        let view = NearbyShops::new(Arc::new(Reconciler::new(backend)));

        view.search(&Coordinates::default()).await.unwrap();
        let err = view.search(&Coordinates::default()).await.unwrap_err();

        assert_eq!(err.status(), Some(500));
        assert_eq!(ids(&view.shops()), vec!["a"]);
    }

    #[tokio::test]
    async fn test_toggle_updates_held_entry() {
        let backend = FakeBackend::new();
        backend.push_search(None, Some(vec![shop("a", 37.79, -122.39, false)]));
        let view = NearbyShops::new(Arc::new(Reconciler::new(backend)));
        view.search(&Coordinates::default()).await.unwrap();

        assert!(view.toggle_favorite(&id("a")).await.unwrap());
        assert!(view.shops()[0].is_favorite);

        let err = view.toggle_favorite(&id("zzz")).await.unwrap_err();
        assert!(matches!(err, ClientError::UnknownShop(_)));
    }

    #[tokio::test]
    async fn test_record_visit_keeps_flags() {
        let backend = FakeBackend::new();
        backend.push_search(None, Some(vec![shop("a", 37.79, -122.39, true)]));
        let reconciler = Arc::new(Reconciler::new(backend));
        let view = NearbyShops::new(Arc::clone(&reconciler));
        view.search(&Coordinates::default()).await.unwrap();

        view.record_visit(&id("a")).await.unwrap();

        assert!(view.shops()[0].is_favorite);
        assert_eq!(reconciler.state(&id("a")), Some(FavoriteState::Synced(true)));
    }

    #[tokio::test]
    async fn test_favorites_remove_drops_entry() {
        let backend = FakeBackend::new();
        backend.set_favorites(vec![shop("a", 37.79, -122.39, false), shop("b", 37.78, -122.40, false)]);
        let view = FavoritesView::new(Arc::new(Reconciler::new(backend)));

        let loaded = view.load().await.unwrap();
        assert!(loaded.iter().all(|s| s.is_favorite));

        view.remove(&id("a")).await.unwrap();

        assert_eq!(ids(&view.shops()), vec!["b"]);
        assert!(view.reconciler.backend().calls().contains(&Call::Remove(id("a"))));
    }

    #[tokio::test]
    async fn test_favorites_remove_after_search_cleared_flag() {
        let backend = FakeBackend::new();
        backend.set_favorites(vec![shop("a", 37.79, -122.39, true)]);
        backend.push_search(None, Some(vec![shop("a", 37.79, -122.39, false)]));
        let reconciler = Arc::new(Reconciler::new(backend));
        let favorites = FavoritesView::new(Arc::clone(&reconciler));
        let nearby = NearbyShops::new(Arc::clone(&reconciler));

        favorites.load().await.unwrap();
        nearby.search(&Coordinates::default()).await.unwrap();

        favorites.remove(&id("a")).await.unwrap();

        assert!(favorites.shops().is_empty());
        let calls = reconciler.backend().calls();
        assert!(!calls.contains(&Call::Add(id("a"))));
        assert!(!calls.contains(&Call::Remove(id("a"))));
        assert_eq!(reconciler.state(&id("a")), Some(FavoriteState::Synced(false)));
    }

    #[tokio::test]
    async fn test_favorites_remove_is_never_an_add() {
        let backend = FakeBackend::new();
        backend.set_favorites(vec![shop("a", 37.79, -122.39, true)]);
        let reconciler = Arc::new(Reconciler::new(backend));
        let favorites = FavoritesView::new(Arc::clone(&reconciler));
        favorites.load().await.unwrap();

        favorites.remove(&id("a")).await.unwrap();

        assert_eq!(
            reconciler.backend().calls(),
            vec![Call::Favorites, Call::Remove(id("a"))]
        );
        assert_eq!(reconciler.state(&id("a")), Some(FavoriteState::Synced(false)));
    }

    #[tokio::test]
    async fn test_favorites_failed_remove_keeps_entry() {
        let backend = FakeBackend::new();
        backend.set_favorites(vec![shop("a", 37.79, -122.39, false)]);
        backend.fail_writes(true);
        let view = FavoritesView::new(Arc::new(Reconciler::new(backend)));
        view.load().await.unwrap();

        assert!(view.remove(&id("a")).await.is_err());

        assert_eq!(ids(&view.shops()), vec!["a"]);
        assert_eq!(
            view.reconciler.state(&id("a")),
            Some(FavoriteState::Synced(true))
        );
    }
}
