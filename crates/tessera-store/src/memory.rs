//! In-memory board store.
//!
//! The default backend for single-process deployments and the backend
//! every test runs against. It honors the same versioned CAS contract as
//! the `PostgreSQL` backend so the engine's retry path is exercised
//! identically regardless of deployment shape.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tessera_types::{Board, BoardId};
use tokio::sync::RwLock;

use crate::board_store::{BoardStore, SaveOutcome, Versioned};
use crate::error::StoreError;

/// Boards held in process memory behind a read-write lock.
///
/// Keys are UUID v7 board ids, so the `BTreeMap` iteration order is
/// creation order -- [`list`](BoardStore::list) needs no extra sort.
#[derive(Debug, Default)]
pub struct MemoryBoardStore {
    boards: RwLock<BTreeMap<BoardId, Versioned<Board>>>,
}

impl MemoryBoardStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BoardStore for MemoryBoardStore {
    async fn insert(&self, board: Board) -> Result<Versioned<Board>, StoreError> {
        let mut boards = self.boards.write().await;
        if boards.contains_key(&board.id) {
            return Err(StoreError::AlreadyExists(board.id));
        }
        let stored = Versioned {
            value: board,
            version: 1,
        };
        boards.insert(stored.value.id, stored.clone());
        Ok(stored)
    }

    async fn get(&self, id: BoardId) -> Result<Option<Versioned<Board>>, StoreError> {
        let boards = self.boards.read().await;
        Ok(boards.get(&id).cloned())
    }

    async fn save(&self, board: Board, expected_version: u64) -> Result<SaveOutcome, StoreError> {
        let mut boards = self.boards.write().await;
        let Some(current) = boards.get(&board.id) else {
            return Ok(SaveOutcome::VersionConflict);
        };
        if current.version != expected_version {
            return Ok(SaveOutcome::VersionConflict);
        }
        let stored = Versioned {
            value: board,
            version: expected_version.saturating_add(1),
        };
        boards.insert(stored.value.id, stored.clone());
        Ok(SaveOutcome::Saved(stored))
    }

    async fn list(&self) -> Result<Vec<Versioned<Board>>, StoreError> {
        let boards = self.boards.read().await;
        Ok(boards.values().cloned().collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tessera_types::{BoardMode, BoardSize, BoardStatus, UserId};

    fn sample_board() -> Board {
        Board {
            id: BoardId::new(),
            title: String::from("store test"),
            size: BoardSize {
                width: 8,
                height: 8,
            },
            mode: BoardMode::NoOverwrite,
            cooldown_seconds: 0,
            created_at: Utc.timestamp_opt(0, 0).single().unwrap(),
            end_at: Utc.timestamp_opt(10_000, 0).single().unwrap(),
            status: BoardStatus::Active,
            author_id: UserId::new(),
            exportable: true,
            pixels: Vec::new(),
        }
    }

    #[tokio::test]
    async fn insert_then_get_roundtrips_at_version_one() {
        let store = MemoryBoardStore::new();
        let board = sample_board();
        let id = board.id;

        let stored = store.insert(board).await.unwrap();
        assert_eq!(stored.version, 1);

        let fetched = store.get(id).await.unwrap().unwrap();
        assert_eq!(fetched, stored);
    }

    #[tokio::test]
    async fn duplicate_insert_is_rejected() {
        let store = MemoryBoardStore::new();
        let board = sample_board();

        store.insert(board.clone()).await.unwrap();
        let err = store.insert(board).await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(_)));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn save_commits_only_against_current_version() {
        let store = MemoryBoardStore::new();
        let board = sample_board();
        let stored = store.insert(board).await.unwrap();

        let mut updated = stored.value.clone();
        updated.title = String::from("renamed");

        // First CAS at the current version commits and bumps it.
        let outcome = store.save(updated.clone(), stored.version).await.unwrap();
        let SaveOutcome::Saved(saved) = outcome else {
            panic!("expected commit");
        };
        assert_eq!(saved.version, 2);
        assert_eq!(saved.value.title, "renamed");

        // A second CAS re-using the stale version must not commit.
        updated.title = String::from("stale write");
        let outcome = store.save(updated, stored.version).await.unwrap();
        assert_eq!(outcome, SaveOutcome::VersionConflict);
        let current = store.get(saved.value.id).await.unwrap().unwrap();
        assert_eq!(current.value.title, "renamed");
    }

    #[tokio::test]
    async fn save_of_unknown_board_reports_conflict() {
        let store = MemoryBoardStore::new();
        let outcome = store.save(sample_board(), 1).await.unwrap();
        assert_eq!(outcome, SaveOutcome::VersionConflict);
    }

    #[tokio::test]
    async fn list_returns_boards_in_creation_order() {
        let store = MemoryBoardStore::new();
        let first = sample_board();
        let second = sample_board();
        let (first_id, second_id) = (first.id, second.id);

        store.insert(first).await.unwrap();
        store.insert(second).await.unwrap();

        let ids: Vec<BoardId> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|v| v.value.id)
            .collect();
        assert_eq!(ids, vec![first_id, second_id]);
    }
}
