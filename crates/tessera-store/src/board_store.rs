//! The repository contract boards are persisted through.
//!
//! Saves are optimistic: every stored board carries a version, and
//! [`BoardStore::save`] only commits when the caller's expected version
//! still matches. Under a single process the engine's per-board lock makes
//! conflicts impossible; under multiple processes sharing one store the
//! conflict surfaces as [`SaveOutcome::VersionConflict`] and the engine
//! re-runs its checks against the fresh state.

use async_trait::async_trait;
use tessera_types::{Board, BoardId};

use crate::error::StoreError;

/// A value paired with the storage version it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versioned<T> {
    /// The stored value.
    pub value: T,
    /// Monotonically increasing version, bumped on every committed save.
    pub version: u64,
}

/// Result of a compare-and-swap save attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The save committed; the new version is returned with the board.
    Saved(Versioned<Board>),
    /// Another writer committed first; nothing was written.
    VersionConflict,
}

/// Data persistence contract for boards.
///
/// Implementations must make [`save`](Self::save) atomic: concurrent
/// saves against the same expected version commit at most one winner,
/// and a failed or conflicted save leaves no partial state.
#[async_trait]
pub trait BoardStore: Send + Sync {
    /// Persist a brand-new board at version 1.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AlreadyExists`] if the id is taken.
    async fn insert(&self, board: Board) -> Result<Versioned<Board>, StoreError>;

    /// Fetch a board with its current version, or `None` if unknown.
    async fn get(&self, id: BoardId) -> Result<Option<Versioned<Board>>, StoreError>;

    /// Compare-and-swap save: commit `board` only if the stored version
    /// still equals `expected_version`.
    ///
    /// A save against an id that no longer exists also reports
    /// [`SaveOutcome::VersionConflict`]; the caller's re-read will then
    /// observe the absence.
    async fn save(&self, board: Board, expected_version: u64) -> Result<SaveOutcome, StoreError>;

    /// All boards in creation order, with their versions.
    async fn list(&self) -> Result<Vec<Versioned<Board>>, StoreError>;
}
