//! Favorite reconciliation.
//!
//! Favorite flags are shown optimistically: a toggle flips the displayed value
//! at once and the backend call confirms or reverts it. Each shop moves through
//! a small state machine:
//!
//! ```text
//! Synced(x) --toggle--> Pending { was: x } --success--> Synced(!x)
//!                                          --failure--> Synced(x)
//! ```
//!
//! A shop with a toggle in flight refuses a second toggle until the first
//! resolves.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use ristretto_core::{CoffeeShop, PlaceId};
use tracing::{debug, instrument, warn};

use crate::backend::Backend;
use crate::error::ClientError;

/// Favorite status of one shop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteState {
    /// The backend has acknowledged this value.
    Synced(bool),
    /// A toggle away from `was` is in flight.
    Pending { was: bool },
}

impl FavoriteState {
    /// The value to show the user.
    #[must_use]
    pub const fn displayed(self) -> bool {
        match self {
            Self::Synced(value) => value,
            Self::Pending { was } => !was,
        }
    }

    /// The last value the backend acknowledged.
    #[must_use]
    pub const fn acknowledged(self) -> bool {
        match self {
            Self::Synced(value) | Self::Pending { was: value } => value,
        }
    }

    #[must_use]
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::Pending { .. })
    }
}

/// Per-shop favorite states.
#[derive(Debug, Clone, Default)]
pub struct FavoriteLedger {
    entries: HashMap<PlaceId, FavoriteState>,
}

impl FavoriteLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a toggle and return the value being toggled away from.
    ///
    /// `current` is used only when the ledger has not seen the shop yet.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::ToggleInFlight` if a toggle is already pending.
    pub fn begin_toggle(&mut self, id: &PlaceId, current: bool) -> Result<bool, ClientError> {
        let state = self
            .entries
            .get(id)
            .copied()
            .unwrap_or(FavoriteState::Synced(current));

        match state {
            FavoriteState::Pending { .. } => Err(ClientError::ToggleInFlight(id.clone())),
            FavoriteState::Synced(was) => {
                self.entries.insert(id.clone(), FavoriteState::Pending { was });
                Ok(was)
            }
        }
    }

    /// Start a toggle that may only turn the favorite off.
    ///
    /// Returns `false` when the shop is already acknowledged as not a
    /// favorite, in which case nothing is left to remove.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::ToggleInFlight` if a toggle is already pending.
    pub fn begin_remove(&mut self, id: &PlaceId) -> Result<bool, ClientError> {
        match self.entries.get(id).copied() {
            Some(FavoriteState::Pending { .. }) => Err(ClientError::ToggleInFlight(id.clone())),
            Some(FavoriteState::Synced(false)) => Ok(false),
            Some(FavoriteState::Synced(true)) | None => {
                self.entries
                    .insert(id.clone(), FavoriteState::Pending { was: true });
                Ok(true)
            }
        }
    }

    /// Confirm a pending toggle. Returns the new acknowledged value.
    pub fn acknowledge(&mut self, id: &PlaceId) -> Option<bool> {
        let entry = self.entries.get_mut(id)?;
        match *entry {
            FavoriteState::Pending { was } => {
                *entry = FavoriteState::Synced(!was);
                Some(!was)
            }
            FavoriteState::Synced(_) => None,
        }
    }

    /// Undo a pending toggle. Returns the restored value.
    pub fn revert(&mut self, id: &PlaceId) -> Option<bool> {
        let entry = self.entries.get_mut(id)?;
        match *entry {
            FavoriteState::Pending { was } => {
                *entry = FavoriteState::Synced(was);
                Some(was)
            }
            FavoriteState::Synced(_) => None,
        }
    }

    /// Fold server-reported flags into the ledger.
    ///
    /// Settled shops adopt the server's flag. Pending shops keep their
    /// optimistic value, and `shops` is rewritten to show it.
    pub fn merge_server(&mut self, shops: &mut [CoffeeShop]) {
        for shop in shops {
            match self.entries.get(&shop.id) {
                Some(state @ FavoriteState::Pending { .. }) => {
                    shop.is_favorite = state.displayed();
                }
                _ => {
                    self.entries
                        .insert(shop.id.clone(), FavoriteState::Synced(shop.is_favorite));
                }
            }
        }
    }

    /// The optimistic value for a shop.
    #[must_use]
    pub fn displayed(&self, id: &PlaceId) -> Option<bool> {
        self.state(id).map(FavoriteState::displayed)
    }

    /// The last acknowledged value for a shop.
    #[must_use]
    pub fn acknowledged(&self, id: &PlaceId) -> Option<bool> {
        self.state(id).map(FavoriteState::acknowledged)
    }

    #[must_use]
    pub fn state(&self, id: &PlaceId) -> Option<FavoriteState> {
        self.entries.get(id).copied()
    }
}

/// Drives favorite toggles and visit recording against a [`Backend`].
#[derive(Debug)]
pub struct Reconciler<B> {
    backend: B,
    ledger: Mutex<FavoriteLedger>,
}

impl<B: Backend> Reconciler<B> {
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            ledger: Mutex::new(FavoriteLedger::new()),
        }
    }

    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    fn ledger(&self) -> MutexGuard<'_, FavoriteLedger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Flip a shop's favorite status.
    ///
    /// Issues an add if the shop was not a favorite and a remove otherwise.
    /// Returns the acknowledged value on success.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::ToggleInFlight` without calling the backend if a
    /// toggle for this shop is pending, or the backend error after reverting.
    #[instrument(skip_all, fields(place_id = %shop.id))]
    pub async fn toggle_favorite(&self, shop: &CoffeeShop) -> Result<bool, ClientError> {
        let was = self.ledger().begin_toggle(&shop.id, shop.is_favorite)?;
        debug!(was, "Favorite toggle started");

        let result = if was {
            self.backend.remove_favorite(&shop.id).await
        } else {
            self.backend.add_favorite(shop).await
        };

        match result {
            Ok(()) => {
                let now = self.ledger().acknowledge(&shop.id).unwrap_or(!was);
                debug!(now, "Favorite toggle acknowledged");
                Ok(now)
            }
            Err(e) => {
                self.ledger().revert(&shop.id);
                warn!(error = %e, "Favorite toggle failed, reverted");
                Err(e)
            }
        }
    }

    /// Unfavorite a shop. Never issues an add.
    ///
    /// A shop already acknowledged as not a favorite is left alone and no
    /// backend call is made.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::ToggleInFlight` without calling the backend if a
    /// toggle for this shop is pending, or the backend error after reverting.
    #[instrument(skip_all, fields(place_id = %id))]
    pub async fn remove_favorite(&self, id: &PlaceId) -> Result<(), ClientError> {
        if !self.ledger().begin_remove(id)? {
            debug!("Already not a favorite");
            return Ok(());
        }

        match self.backend.remove_favorite(id).await {
            Ok(()) => {
                self.ledger().acknowledge(id);
                debug!("Favorite removed");
                Ok(())
            }
            Err(e) => {
                self.ledger().revert(id);
                warn!(error = %e, "Favorite removal failed, reverted");
                Err(e)
            }
        }
    }

    /// Record a visit. Favorite state is untouched.
    ///
    /// # Errors
    ///
    /// Returns the backend error.
    #[instrument(skip_all, fields(place_id = %shop.id))]
    pub async fn record_visit(&self, shop: &CoffeeShop) -> Result<(), ClientError> {
        self.backend.record_visit(shop).await
    }

    /// Fold freshly fetched shops into the ledger and return them with
    /// reconciled flags.
    #[must_use]
    pub fn merge(&self, mut shops: Vec<CoffeeShop>) -> Vec<CoffeeShop> {
        self.ledger().merge_server(&mut shops);
        shops
    }

    /// Show the ledger's optimistic flags on held shops without adopting theirs.
    pub fn overlay(&self, shops: &mut [CoffeeShop]) {
        let ledger = self.ledger();
        for shop in shops {
            if let Some(displayed) = ledger.displayed(&shop.id) {
                shop.is_favorite = displayed;
            }
        }
    }

    #[must_use]
    pub fn state(&self, id: &PlaceId) -> Option<FavoriteState> {
        self.ledger().state(id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tokio::sync::Notify;

    use super::*;
    use crate::testing::{Call, FakeBackend, shop};

    fn id(s: &str) -> PlaceId {
        PlaceId::parse(s).unwrap()
    }

    #[test]
    fn test_ledger_transitions() {
        let mut ledger = FavoriteLedger::new();
        let p = id("p1");

        assert!(!ledger.begin_toggle(&p, false).unwrap());
        assert_eq!(ledger.state(&p), Some(FavoriteState::Pending { was: false }));
        assert_eq!(ledger.displayed(&p), Some(true));
        assert_eq!(ledger.acknowledged(&p), Some(false));

        assert_eq!(ledger.acknowledge(&p), Some(true));
        assert_eq!(ledger.state(&p), Some(FavoriteState::Synced(true)));

        assert!(ledger.begin_toggle(&p, false).unwrap());
        assert_eq!(ledger.revert(&p), Some(true));
        assert_eq!(ledger.state(&p), Some(FavoriteState::Synced(true)));

        assert_eq!(ledger.acknowledge(&p), None);
    }

    #[test]
    fn test_ledger_rejects_second_toggle() {
        let mut ledger = FavoriteLedger::new();
        let p = id("p1");
        ledger.begin_toggle(&p, true).unwrap();
        assert!(matches!(
            ledger.begin_toggle(&p, true),
            Err(ClientError::ToggleInFlight(ref e)) if *e == p
        ));
    }

    #[test]
    fn test_ledger_begin_remove() {
        let mut ledger = FavoriteLedger::new();

        assert!(ledger.begin_remove(&id("new")).unwrap());
        assert_eq!(
            ledger.state(&id("new")),
            Some(FavoriteState::Pending { was: true })
        );
        assert!(matches!(
            ledger.begin_remove(&id("new")),
            Err(ClientError::ToggleInFlight(_))
        ));

        let mut shops = vec![shop("gone", 0.0, 0.0, false)];
        ledger.merge_server(&mut shops);
        assert!(!ledger.begin_remove(&id("gone")).unwrap());
        assert_eq!(ledger.state(&id("gone")), Some(FavoriteState::Synced(false)));
    }

    #[test]
    fn test_merge_server_keeps_pending() {
        let mut ledger = FavoriteLedger::new();
        ledger.begin_toggle(&id("p1"), false).unwrap();

        let mut shops = vec![shop("p1", 0.0, 0.0, false), shop("p2", 0.0, 0.0, true)];
        ledger.merge_server(&mut shops);

        assert!(shops[0].is_favorite);
        assert_eq!(ledger.state(&id("p1")), Some(FavoriteState::Pending { was: false }));
        assert_eq!(ledger.state(&id("p2")), Some(FavoriteState::Synced(true)));
    }

    #[test]
    fn test_merge_server_adopts_settled() {
        let mut ledger = FavoriteLedger::new();
        ledger.begin_toggle(&id("p1"), false).unwrap();
        ledger.acknowledge(&id("p1"));

        let mut shops = vec![shop("p1", 0.0, 0.0, false)];
        ledger.merge_server(&mut shops);

        assert!(!shops[0].is_favorite);
        assert_eq!(ledger.displayed(&id("p1")), Some(false));
    }

    #[tokio::test]
    async fn test_toggle_adds_when_not_favorite() {
        let reconciler = Reconciler::new(FakeBackend::new());
        let s = shop("p1", 0.0, 0.0, false);

        assert!(reconciler.toggle_favorite(&s).await.unwrap());
        assert_eq!(reconciler.backend().calls(), vec![Call::Add(id("p1"))]);
        assert_eq!(reconciler.state(&s.id), Some(FavoriteState::Synced(true)));
    }

    #[tokio::test]
    async fn test_toggle_removes_when_favorite() {
        let reconciler = Reconciler::new(FakeBackend::new());
        let s = shop("p1", 0.0, 0.0, true);

        assert!(!reconciler.toggle_favorite(&s).await.unwrap());
        assert_eq!(reconciler.backend().calls(), vec![Call::Remove(id("p1"))]);
    }

    #[tokio::test]
    async fn test_failed_toggle_reverts() {
        let backend = FakeBackend::new();
        backend.fail_writes(true);
        let reconciler = Reconciler::new(backend);
        let s = shop("p1", 0.0, 0.0, false);

        let err = reconciler.toggle_favorite(&s).await.unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(reconciler.state(&s.id), Some(FavoriteState::Synced(false)));
    }

    #[tokio::test]
    async fn test_second_toggle_while_pending_is_rejected() {
        let gate = Arc::new(Notify::new());
        let backend = FakeBackend::new();
        backend.gate_writes(Arc::clone(&gate));
        let reconciler = Reconciler::new(backend);
        let s = shop("p1", 0.0, 0.0, false);

        let (first, second) = tokio::join!(reconciler.toggle_favorite(&s), async {
            let second = reconciler.toggle_favorite(&s).await;
            gate.notify_one();
            second
        });

        assert!(first.unwrap());
        assert!(matches!(second, Err(ClientError::ToggleInFlight(_))));
        assert_eq!(reconciler.backend().calls(), vec![Call::Add(id("p1"))]);
    }

    #[tokio::test]
    async fn test_record_visit_leaves_favorites_alone() {
        let reconciler = Reconciler::new(FakeBackend::new());
        let s = shop("p1", 0.0, 0.0, true);
        let _ = reconciler.merge(vec![s.clone()]);

        reconciler.record_visit(&s).await.unwrap();

        assert_eq!(reconciler.backend().calls(), vec![Call::Visit(id("p1"))]);
        assert_eq!(reconciler.state(&s.id), Some(FavoriteState::Synced(true)));
    }

    #[tokio::test]
    async fn test_overlay_does_not_adopt() {
        let reconciler = Reconciler::new(FakeBackend::new());
        let _ = reconciler.merge(vec![shop("p1", 0.0, 0.0, true)]);

        let mut held = vec![shop("p1", 0.0, 0.0, false), shop("p2", 0.0, 0.0, false)];
        reconciler.overlay(&mut held);

        assert!(held[0].is_favorite);
        assert!(!held[1].is_favorite);
        assert_eq!(reconciler.state(&id("p2")), None);
    }
}
