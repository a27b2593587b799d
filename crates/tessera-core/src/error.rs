//! Error taxonomy for the placement engine.
//!
//! Domain rejections (validation, not-found, conflict, rate limit,
//! lifecycle) are terminal for the request that triggered them: retrying
//! without changing the input cannot change the outcome, so the engine
//! never retries them and surfaces the structured reason verbatim.
//! Only persistence failures are retried, and only boundedly.

use tessera_store::StoreError;
use tessera_types::BoardId;

/// Errors a placement-engine or registry operation can fail with.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The request was malformed: bad geometry, a blank title, an
    /// oversized board, or invalid seed pixels.
    #[error("validation error: {0}")]
    Validation(String),

    /// No board exists with the requested id.
    #[error("board {0} not found")]
    NotFound(BoardId),

    /// The target cell already holds a record and the board forbids
    /// overwriting.
    #[error("cell ({x}, {y}) is already taken")]
    Conflict {
        /// The contested cell's x coordinate.
        x: u32,
        /// The contested cell's y coordinate.
        y: u32,
    },

    /// The user placed too recently on this board.
    #[error("cooldown active: wait {remaining_seconds} more seconds")]
    RateLimit {
        /// Whole seconds until the next placement is allowed, rounded up.
        remaining_seconds: u64,
    },

    /// The board is completed (explicitly or past its end date) and no
    /// longer accepts placements.
    #[error("board {0} is completed and no longer accepts placements")]
    Lifecycle(BoardId),

    /// The durable store failed after bounded retries.
    #[error("persistence error: {0}")]
    Persistence(#[from] StoreError),

    /// Optimistic saves kept losing to concurrent writers.
    ///
    /// Only reachable when several processes share one store; within one
    /// process the per-board lock serializes writers ahead of the save.
    #[error("board {board_id} is under write contention, try again")]
    Contention {
        /// The contested board.
        board_id: BoardId,
    },
}
