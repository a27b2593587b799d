//! Shared application state for the board API server.
//!
//! [`AppState`] bundles the components every handler needs: the registry
//! for creation and reads, the engine for placements, and the hub for
//! live streams. The hub is injected rather than global, so tests and
//! embedded deployments can run several independent servers in one
//! process.

use std::sync::Arc;
use std::time::Duration;

use tessera_core::{BoardRegistry, BroadcastHub, PlacementEngine};
use tessera_store::BoardStore;

/// Default time budget for one placement request.
///
/// Generous: a placement only waits on the per-board lock and one store
/// round trip. If the budget elapses, the request fails with 504 and --
/// because the store save is a single atomic CAS -- no partial state.
const DEFAULT_PLACEMENT_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Board creation, lookup, and listing.
    pub registry: BoardRegistry,
    /// The placement engine; the only writer of board state.
    pub engine: PlacementEngine,
    /// Fan-out hub the WebSocket endpoint subscribes through.
    pub hub: Arc<BroadcastHub>,
    /// Time budget applied to each placement request.
    pub placement_timeout: Duration,
}

impl AppState {
    /// Wire registry, engine, and hub over a board store.
    pub fn new(store: Arc<dyn BoardStore>) -> Self {
        let hub = Arc::new(BroadcastHub::new());
        let registry = BoardRegistry::new(store);
        let engine = PlacementEngine::new(registry.clone(), Arc::clone(&hub));
        Self {
            registry,
            engine,
            hub,
            placement_timeout: DEFAULT_PLACEMENT_TIMEOUT,
        }
    }

    /// Override the placement time budget.
    #[must_use]
    pub const fn with_placement_timeout(mut self, timeout: Duration) -> Self {
        self.placement_timeout = timeout;
        self
    }
}
