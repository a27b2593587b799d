//! The placement engine: validates and durably applies one placement
//! against one board.
//!
//! # Serialization per board
//!
//! Steps load-check-append-save must execute as if serialized per board:
//! two concurrent writers must not both observe "cell free" and both
//! append, nor both pass the cooldown check against a stale timestamp.
//! Two mechanisms compose to guarantee this:
//!
//! 1. an in-process async mutex per board id -- writers to the same
//!    board queue, writers to different boards proceed in parallel, and
//!    a call holds at most one lock (no deadlock);
//! 2. the store's versioned compare-and-swap save -- the safety net when
//!    several processes share one store, where the in-process lock
//!    cannot see the other writers. A conflicted save re-runs every
//!    check against the fresh state, boundedly.
//!
//! # Durability ordering
//!
//! The engine mutates a private copy of the board and the acknowledged
//! CAS save is the only publication point, so no reader ever observes an
//! append that failed to persist. The accepted-placement event is
//! published to the hub strictly after the save commits; a lost event is
//! acceptable (viewers resynchronize with a full fetch), a phantom event
//! is not.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use tessera_store::SaveOutcome;
use tessera_types::{
    Board, BoardId, BoardMessage, BoardMode, BoardStatus, HexColor, PlacementRecord, UserId,
};
use tracing::{debug, warn};

use crate::error::EngineError;
use crate::hub::BroadcastHub;
use crate::lifecycle;
use crate::registry::BoardRegistry;

/// How many conflicted CAS saves to re-run before reporting contention.
const MAX_CAS_RETRIES: u32 = 3;

/// How many retryable store failures to absorb per save.
const MAX_PERSIST_RETRIES: u32 = 2;

/// Microseconds per second, for cooldown ceiling arithmetic.
const MICROS_PER_SECOND: u64 = 1_000_000;

/// One placement request, as validated and authenticated upstream.
///
/// Coordinates are signed so that negative input reaches the engine and
/// fails its bounds check as a domain validation error rather than dying
/// in deserialization. The color has already been parsed, so only
/// well-formed colors can be requested.
#[derive(Debug, Clone)]
pub struct Placement {
    /// Requested cell x coordinate.
    pub x: i64,
    /// Requested cell y coordinate.
    pub y: i64,
    /// Color to write.
    pub color: HexColor,
    /// The verified requesting user.
    pub user_id: UserId,
}

/// Validates and applies placements; the only writer of board state.
#[derive(Clone)]
pub struct PlacementEngine {
    registry: BoardRegistry,
    hub: Arc<BroadcastHub>,
    locks: Arc<Mutex<HashMap<BoardId, Arc<tokio::sync::Mutex<()>>>>>,
}

impl PlacementEngine {
    /// Create an engine over the registry's store, publishing accepted
    /// placements to `hub`.
    pub fn new(registry: BoardRegistry, hub: Arc<BroadcastHub>) -> Self {
        Self {
            registry,
            hub,
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Apply one placement to one board at time `now`.
    ///
    /// Exactly one durable append and at most one published event happen
    /// on success; a rejected call has no effect, with one mandated
    /// exception: observing an expired board persists its `Completed`
    /// status before the rejection is returned.
    ///
    /// # Errors
    ///
    /// - [`EngineError::NotFound`] -- unknown board
    /// - [`EngineError::Lifecycle`] -- board completed or past its end date
    /// - [`EngineError::Validation`] -- coordinate off the board
    /// - [`EngineError::Conflict`] -- cell taken on a no-overwrite board
    /// - [`EngineError::RateLimit`] -- cooldown still running
    /// - [`EngineError::Persistence`] / [`EngineError::Contention`] --
    ///   the store failed or kept conflicting
    pub async fn place(
        &self,
        board_id: BoardId,
        placement: Placement,
        now: DateTime<Utc>,
    ) -> Result<Board, EngineError> {
        let lock = self.board_lock(board_id);
        let _guard = lock.lock().await;

        let mut cas_attempts: u32 = 0;
        loop {
            match self.try_place(board_id, &placement, now).await? {
                Attempt::Done(board) => return Ok(board),
                Attempt::Conflicted => {
                    cas_attempts = cas_attempts.saturating_add(1);
                    if cas_attempts > MAX_CAS_RETRIES {
                        warn!(%board_id, cas_attempts, "giving up on contended board");
                        return Err(EngineError::Contention { board_id });
                    }
                    debug!(%board_id, cas_attempts, "save conflicted, re-running checks");
                }
            }
        }
    }

    /// One pass of steps load / lifecycle / bounds / conflict / cooldown /
    /// append / save / publish. `Attempt::Conflicted` means another
    /// writer committed between our read and our save.
    async fn try_place(
        &self,
        board_id: BoardId,
        placement: &Placement,
        now: DateTime<Utc>,
    ) -> Result<Attempt, EngineError> {
        let versioned = self.registry.get_versioned(board_id).await?;
        let mut board = versioned.value;

        // Lifecycle: an expired board completes now, durably, then rejects.
        if lifecycle::status_at(&board, now) == BoardStatus::Completed {
            if board.status == BoardStatus::Active {
                board.status = BoardStatus::Completed;
                match self.save_with_retry(board, versioned.version).await {
                    Ok(SaveOutcome::Saved(_)) => {
                        debug!(%board_id, "expired board marked completed");
                    }
                    Ok(SaveOutcome::VersionConflict) => {
                        // Someone else just wrote the board; whoever it
                        // was, the expiry stands and they (or the next
                        // attempt) will persist it.
                        debug!(%board_id, "expiry persist lost a race");
                    }
                    Err(err) => {
                        // The rejection stands either way; the transition
                        // is re-detected at the next attempt.
                        warn!(%board_id, error = %err, "failed to persist expiry");
                    }
                }
            }
            return Err(EngineError::Lifecycle(board_id));
        }

        // Bounds.
        if !board.size.contains(placement.x, placement.y) {
            return Err(EngineError::Validation(format!(
                "coordinate ({}, {}) is outside the {}x{} board",
                placement.x, placement.y, board.size.width, board.size.height
            )));
        }
        let (Ok(x), Ok(y)) = (u32::try_from(placement.x), u32::try_from(placement.y)) else {
            // contains() already rejected negatives; defends the cast anyway.
            return Err(EngineError::Validation(format!(
                "coordinate ({}, {}) is outside the {}x{} board",
                placement.x, placement.y, board.size.width, board.size.height
            )));
        };

        // Conflict policy.
        if board.mode == BoardMode::NoOverwrite && board.first_record_at(x, y).is_some() {
            return Err(EngineError::Conflict { x, y });
        }

        // Cooldown.
        if board.cooldown_seconds > 0 {
            if let Some(last) = board.last_placement_by(placement.user_id) {
                if let Some(remaining_seconds) =
                    remaining_cooldown(board.cooldown_seconds, last, now)
                {
                    return Err(EngineError::RateLimit { remaining_seconds });
                }
            }
        }

        // Append, then persist; the save is the commit point.
        let record = PlacementRecord {
            x,
            y,
            color: placement.color.clone(),
            user_id: placement.user_id,
            timestamp: now,
        };
        board.pixels.push(record.clone());

        match self.save_with_retry(board, versioned.version).await? {
            SaveOutcome::Saved(saved) => {
                // Post-commit, best-effort: a dropped event only costs a
                // viewer one frame until their next full fetch.
                let receivers = self.hub.publish(&BoardMessage::PixelAdded {
                    board_id,
                    pixel: record,
                });
                debug!(%board_id, x, y, user = %placement.user_id, receivers, "placement accepted");
                Ok(Attempt::Done(saved.value))
            }
            SaveOutcome::VersionConflict => Ok(Attempt::Conflicted),
        }
    }

    /// Save with bounded retries on transient store failures.
    async fn save_with_retry(
        &self,
        board: Board,
        expected_version: u64,
    ) -> Result<SaveOutcome, EngineError> {
        let mut attempt: u32 = 0;
        loop {
            match self
                .registry
                .store()
                .save(board.clone(), expected_version)
                .await
            {
                Ok(outcome) => return Ok(outcome),
                Err(err) if err.is_retryable() && attempt < MAX_PERSIST_RETRIES => {
                    attempt = attempt.saturating_add(1);
                    warn!(board_id = %board.id, error = %err, attempt, "retrying board save");
                }
                Err(err) => return Err(EngineError::Persistence(err)),
            }
        }
    }

    /// The per-board exclusive section. Entries are one small allocation
    /// per board ever written and are kept for the process lifetime.
    fn board_lock(&self, board_id: BoardId) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(board_id).or_default())
    }
}

/// Outcome of one optimistic placement pass.
enum Attempt {
    /// Committed; the updated board is returned to the caller.
    Done(Board),
    /// The CAS save lost to a concurrent writer; re-run the checks.
    Conflicted,
}

/// Whole seconds (rounded up) a user must still wait, or `None` once the
/// cooldown has fully elapsed.
///
/// Ceiling rounding is deliberate: the value is user-facing ("wait N
/// more seconds") and must never underestimate.
fn remaining_cooldown(
    cooldown_seconds: u32,
    last: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Option<u64> {
    let cooldown = chrono::Duration::seconds(i64::from(cooldown_seconds));
    let elapsed = now.signed_duration_since(last);
    let remaining = cooldown.checked_sub(&elapsed)?;
    if remaining <= chrono::Duration::zero() {
        return None;
    }
    // Microsecond resolution so even a sliver of cooldown reports "1",
    // never "0". num_microseconds only overflows past ~292k years.
    let micros = remaining
        .num_microseconds()
        .and_then(|m| u64::try_from(m).ok())
        .unwrap_or(u64::MAX);
    Some(micros.div_ceil(MICROS_PER_SECOND))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tessera_store::{BoardStore, MemoryBoardStore};
    use tessera_types::BoardSize;

    use crate::registry::BoardSpec;

    struct Harness {
        engine: PlacementEngine,
        registry: BoardRegistry,
        store: Arc<MemoryBoardStore>,
        hub: Arc<BroadcastHub>,
    }

    fn harness() -> Harness {
        let store = Arc::new(MemoryBoardStore::new());
        let registry = BoardRegistry::new(Arc::clone(&store) as Arc<dyn BoardStore>);
        let hub = Arc::new(BroadcastHub::new());
        let engine = PlacementEngine::new(registry.clone(), Arc::clone(&hub));
        Harness {
            engine,
            registry,
            store,
            hub,
        }
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).single().unwrap()
    }

    fn at_millis(millis: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(millis).single().unwrap()
    }

    fn spec(mode: BoardMode, cooldown_seconds: u32, end_secs: i64) -> BoardSpec {
        BoardSpec {
            title: String::from("engine test"),
            size: BoardSize {
                width: 4,
                height: 4,
            },
            mode,
            cooldown_seconds,
            end_at: at(end_secs),
            exportable: None,
            initial_pixels: Vec::new(),
        }
    }

    fn placement(x: i64, y: i64, color: &str, user: UserId) -> Placement {
        Placement {
            x,
            y,
            color: HexColor::parse(color).unwrap(),
            user_id: user,
        }
    }

    async fn make_board(h: &Harness, spec: BoardSpec) -> Board {
        h.registry.create(UserId::new(), spec, at(0)).await.unwrap()
    }

    #[tokio::test]
    async fn no_overwrite_first_writer_wins_for_everyone() {
        // Scenario A: 4x4, no_overwrite, delay 0.
        let h = harness();
        let board = make_board(&h, spec(BoardMode::NoOverwrite, 0, 10_000)).await;
        let alice = UserId::new();
        let bob = UserId::new();

        let updated = h
            .engine
            .place(board.id, placement(0, 0, "#ff0000", alice), at(1))
            .await
            .unwrap();
        assert_eq!(updated.pixels.len(), 1);

        // The same user cannot repaint the cell...
        let err = h
            .engine
            .place(board.id, placement(0, 0, "#00ff00", alice), at(2))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Conflict { x: 0, y: 0 }));

        // ...and neither can anyone else.
        let err = h
            .engine
            .place(board.id, placement(0, 0, "#00ff00", bob), at(3))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Conflict { x: 0, y: 0 }));

        let stored = h.registry.get(board.id).await.unwrap();
        assert_eq!(stored.pixels.len(), 1);
        assert_eq!(stored.pixels.first().unwrap().color.as_str(), "#ff0000");
    }

    #[tokio::test]
    async fn cooldown_rejects_with_ceiling_remainder() {
        // Scenario B: delay 5s; accepted at t=0, rejected at t=3 with 2s
        // remaining, accepted again at t=5.
        let h = harness();
        let board = make_board(&h, spec(BoardMode::Overwrite, 5, 10_000)).await;
        let user = UserId::new();

        h.engine
            .place(board.id, placement(0, 0, "#111111", user), at(0))
            .await
            .unwrap();

        let err = h
            .engine
            .place(board.id, placement(1, 0, "#222222", user), at(3))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::RateLimit { remaining_seconds: 2 }));

        h.engine
            .place(board.id, placement(1, 0, "#222222", user), at(5))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn cooldown_remainder_rounds_fractional_seconds_up() {
        let h = harness();
        let board = make_board(&h, spec(BoardMode::Overwrite, 5, 10_000)).await;
        let user = UserId::new();

        h.engine
            .place(board.id, placement(0, 0, "#111111", user), at_millis(0))
            .await
            .unwrap();

        // 3.8s elapsed of 5 -> 1.2s left -> user is told 2.
        let err = h
            .engine
            .place(board.id, placement(1, 0, "#222222", user), at_millis(3_800))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::RateLimit { remaining_seconds: 2 }));
    }

    #[tokio::test]
    async fn cooldown_is_per_user() {
        let h = harness();
        let board = make_board(&h, spec(BoardMode::Overwrite, 5, 10_000)).await;

        h.engine
            .place(board.id, placement(0, 0, "#111111", UserId::new()), at(0))
            .await
            .unwrap();
        // A different user is not throttled by the first user's placement.
        h.engine
            .place(board.id, placement(1, 0, "#222222", UserId::new()), at(1))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn expired_board_rejects_and_persists_completion() {
        // Scenario C: end date already past at the first attempt.
        let h = harness();
        let board = make_board(&h, spec(BoardMode::Overwrite, 0, 50)).await;

        let err = h
            .engine
            .place(board.id, placement(0, 0, "#111111", UserId::new()), at(60))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Lifecycle(_)));

        // The transition was persisted as a side effect of the attempt.
        let stored = h.store.get(board.id).await.unwrap().unwrap();
        assert_eq!(stored.value.status, BoardStatus::Completed);
        assert!(stored.value.pixels.is_empty());
        assert_eq!(stored.version, 2);

        // A later attempt rejects off the stored status without saving.
        let err = h
            .engine
            .place(board.id, placement(0, 0, "#111111", UserId::new()), at(70))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Lifecycle(_)));
        let stored = h.store.get(board.id).await.unwrap().unwrap();
        assert_eq!(stored.version, 2);
    }

    #[tokio::test]
    async fn out_of_bounds_coordinates_are_validation_errors() {
        let h = harness();
        let board = make_board(&h, spec(BoardMode::Overwrite, 0, 10_000)).await;

        for (x, y) in [(4, 0), (0, 4), (-1, 0), (0, -1), (99, 99)] {
            let err = h
                .engine
                .place(board.id, placement(x, y, "#111111", UserId::new()), at(1))
                .await
                .unwrap_err();
            assert!(
                matches!(err, EngineError::Validation(_)),
                "accepted ({x}, {y})"
            );
        }
        // Nothing was appended by any rejected call.
        assert!(h.registry.get(board.id).await.unwrap().pixels.is_empty());
    }

    #[tokio::test]
    async fn unknown_board_is_not_found() {
        let h = harness();
        let err = h
            .engine
            .place(
                BoardId::new(),
                placement(0, 0, "#111111", UserId::new()),
                at(0),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
    }

    #[tokio::test]
    async fn overwrite_mode_keeps_every_record_latest_wins() {
        let h = harness();
        let board = make_board(&h, spec(BoardMode::Overwrite, 0, 10_000)).await;
        let user = UserId::new();

        h.engine
            .place(board.id, placement(2, 2, "#ff0000", user), at(1))
            .await
            .unwrap();
        let updated = h
            .engine
            .place(board.id, placement(2, 2, "#00ff00", user), at(2))
            .await
            .unwrap();

        // Both records survive in the log; the newest defines the color.
        assert_eq!(updated.pixels.len(), 2);
        assert_eq!(updated.current_record_at(2, 2).unwrap().color.as_str(), "#00ff00");
    }

    #[tokio::test]
    async fn accepted_placement_publishes_one_event_after_commit() {
        let h = harness();
        let board = make_board(&h, spec(BoardMode::NoOverwrite, 0, 10_000)).await;
        let mut rx = h.hub.subscribe(board.id);
        let user = UserId::new();

        h.engine
            .place(board.id, placement(1, 2, "#abcdef", user), at(1))
            .await
            .unwrap();

        let BoardMessage::PixelAdded { board_id, pixel } = rx.recv().await.unwrap();
        assert_eq!(board_id, board.id);
        assert_eq!((pixel.x, pixel.y), (1, 2));
        assert_eq!(pixel.user_id, user);

        // A rejected placement publishes nothing.
        let _ = h
            .engine
            .place(board.id, placement(1, 2, "#abcdef", user), at(2))
            .await
            .unwrap_err();
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn concurrent_writers_to_one_cell_produce_one_winner() {
        let h = harness();
        let board = make_board(&h, spec(BoardMode::NoOverwrite, 0, 10_000)).await;

        let mut handles = Vec::new();
        for i in 0..16_i64 {
            let engine = h.engine.clone();
            let board_id = board.id;
            handles.push(tokio::spawn(async move {
                engine
                    .place(
                        board_id,
                        placement(0, 0, "#123456", UserId::new()),
                        at(1 + i),
                    )
                    .await
            }));
        }

        let mut accepted = 0;
        let mut conflicted = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => accepted += 1,
                Err(EngineError::Conflict { .. }) => conflicted += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        assert_eq!(accepted, 1);
        assert_eq!(conflicted, 15);

        let stored = h.registry.get(board.id).await.unwrap();
        assert_eq!(stored.pixels.len(), 1);
    }

    #[test]
    fn remaining_cooldown_edges() {
        let last = at(100);
        // Exactly elapsed -> no wait.
        assert_eq!(remaining_cooldown(5, last, at(105)), None);
        // One millisecond short -> told a full second.
        assert_eq!(remaining_cooldown(5, last, at_millis(104_999)), Some(1));
        // Clock skew (now before last) still reports a bounded wait.
        assert_eq!(remaining_cooldown(5, last, at(99)), Some(6));
    }
}
