//! Board lifecycle evaluation.
//!
//! A board's effective status is derived, not polled: nothing scans for
//! boards whose end date has passed. Instead the engine evaluates
//! [`status_at`] at each placement attempt and persists an observed
//! `Active -> Completed` transition so later attempts short-circuit on
//! the stored status (idempotent memoization; not required for
//! correctness, it just avoids recomputing the time comparison).

use chrono::{DateTime, Utc};
use tessera_types::{Board, BoardStatus};

/// The status a board effectively has at `now`.
///
/// `Completed` once the stored status says so or the end date has
/// passed; the transition is monotone and never reverses.
pub fn status_at(board: &Board, now: DateTime<Utc>) -> BoardStatus {
    if board.status == BoardStatus::Completed || now >= board.end_at {
        BoardStatus::Completed
    } else {
        BoardStatus::Active
    }
}
