//! Board creation and lookup.
//!
//! The registry is the authoritative source of board configuration: it
//! validates author-supplied specs, mints board ids, seeds any initial
//! pixels, and is the only component that inserts boards into the store.
//! Mutation after creation belongs to the placement engine.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tessera_store::{BoardStore, Versioned};
use tessera_types::{
    Board, BoardId, BoardMode, BoardSize, BoardStatus, BoardSummary, HexColor, PlacementRecord,
    UserId, MAX_BOARD_DIMENSION,
};

use crate::error::EngineError;

/// Author-supplied configuration for a new board.
#[derive(Debug, Clone)]
pub struct BoardSpec {
    /// Human-readable board title; must not be blank.
    pub title: String,
    /// Grid dimensions, each in `1..=MAX_BOARD_DIMENSION`.
    pub size: BoardSize,
    /// Conflict resolution policy.
    pub mode: BoardMode,
    /// Minimum seconds between one user's accepted placements.
    pub cooldown_seconds: u32,
    /// When the board stops accepting placements. May already be in the
    /// past; such a board completes at its first placement attempt.
    pub end_at: DateTime<Utc>,
    /// Whether the finished canvas may be exported; defaults to `true`.
    pub exportable: Option<bool>,
    /// Pixels painted at creation time, attributed to the author.
    pub initial_pixels: Vec<SeedPixel>,
}

/// One pixel painted as part of board creation.
#[derive(Debug, Clone)]
pub struct SeedPixel {
    /// Cell x coordinate.
    pub x: i64,
    /// Cell y coordinate.
    pub y: i64,
    /// Color in `#rrggbb` form.
    pub color: String,
}

/// Owns board creation and lookup against the shared store.
#[derive(Clone)]
pub struct BoardRegistry {
    store: Arc<dyn BoardStore>,
}

impl BoardRegistry {
    /// Create a registry over a board store.
    pub fn new(store: Arc<dyn BoardStore>) -> Self {
        Self { store }
    }

    /// The underlying store, shared with the placement engine.
    pub(crate) fn store(&self) -> &Arc<dyn BoardStore> {
        &self.store
    }

    /// Validate a spec and persist the new board.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Validation`] for a blank title, dimensions
    /// outside `1..=MAX_BOARD_DIMENSION`, or invalid seed pixels, and
    /// [`EngineError::Persistence`] if the insert fails.
    pub async fn create(
        &self,
        author_id: UserId,
        spec: BoardSpec,
        now: DateTime<Utc>,
    ) -> Result<Board, EngineError> {
        let title = spec.title.trim();
        if title.is_empty() {
            return Err(EngineError::Validation(String::from(
                "title must not be blank",
            )));
        }
        validate_dimension("width", spec.size.width)?;
        validate_dimension("height", spec.size.height)?;

        let pixels = seed_records(&spec, author_id, now)?;

        let board = Board {
            id: BoardId::new(),
            title: title.to_owned(),
            size: spec.size,
            mode: spec.mode,
            cooldown_seconds: spec.cooldown_seconds,
            created_at: now,
            end_at: spec.end_at,
            status: BoardStatus::Active,
            author_id,
            exportable: spec.exportable.unwrap_or(true),
            pixels,
        };

        let stored = self.store.insert(board).await?;
        tracing::info!(
            board_id = %stored.value.id,
            title = stored.value.title,
            width = stored.value.size.width,
            height = stored.value.size.height,
            mode = ?stored.value.mode,
            cooldown_seconds = stored.value.cooldown_seconds,
            "Board created"
        );
        Ok(stored.value)
    }

    /// Fetch a board by id.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] if the id is unknown.
    pub async fn get(&self, id: BoardId) -> Result<Board, EngineError> {
        Ok(self.get_versioned(id).await?.value)
    }

    /// Fetch a board with its storage version, for CAS writers.
    pub(crate) async fn get_versioned(&self, id: BoardId) -> Result<Versioned<Board>, EngineError> {
        self.store
            .get(id)
            .await?
            .ok_or(EngineError::NotFound(id))
    }

    /// Summaries of all boards, in creation order. No side effects.
    pub async fn list(&self) -> Result<Vec<BoardSummary>, EngineError> {
        let boards = self.store.list().await?;
        Ok(boards
            .iter()
            .map(|versioned| BoardSummary::from(&versioned.value))
            .collect())
    }
}

/// Reject a dimension outside `1..=MAX_BOARD_DIMENSION`.
fn validate_dimension(name: &str, value: u32) -> Result<(), EngineError> {
    if value == 0 || value > MAX_BOARD_DIMENSION {
        return Err(EngineError::Validation(format!(
            "{name} must be between 1 and {MAX_BOARD_DIMENSION}, got {value}"
        )));
    }
    Ok(())
}

/// Validate seed pixels and stamp them into placement records.
///
/// Seed pixels carry the author's id and the creation timestamp, so they
/// participate in conflict checks, heatmaps, and replay exactly like
/// interactively placed pixels. Under [`BoardMode::NoOverwrite`] a
/// duplicate seed coordinate would violate the one-record-per-cell
/// invariant from the very first moment, so it is rejected.
fn seed_records(
    spec: &BoardSpec,
    author_id: UserId,
    now: DateTime<Utc>,
) -> Result<Vec<PlacementRecord>, EngineError> {
    let mut records = Vec::with_capacity(spec.initial_pixels.len());
    for seed in &spec.initial_pixels {
        if !spec.size.contains(seed.x, seed.y) {
            return Err(EngineError::Validation(format!(
                "initial pixel ({}, {}) is outside the {}x{} board",
                seed.x, seed.y, spec.size.width, spec.size.height
            )));
        }
        let color = HexColor::parse(&seed.color)
            .map_err(|err| EngineError::Validation(err.to_string()))?;
        let (Ok(x), Ok(y)) = (u32::try_from(seed.x), u32::try_from(seed.y)) else {
            // contains() already rejected negatives; defends the cast anyway.
            return Err(EngineError::Validation(format!(
                "initial pixel ({}, {}) is outside the {}x{} board",
                seed.x, seed.y, spec.size.width, spec.size.height
            )));
        };
        if spec.mode == BoardMode::NoOverwrite
            && records.iter().any(|r: &PlacementRecord| r.x == x && r.y == y)
        {
            return Err(EngineError::Validation(format!(
                "initial pixels repeat cell ({x}, {y}) on a no-overwrite board"
            )));
        }
        records.push(PlacementRecord {
            x,
            y,
            color,
            user_id: author_id,
            timestamp: now,
        });
    }
    Ok(records)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tessera_store::MemoryBoardStore;

    fn registry() -> BoardRegistry {
        BoardRegistry::new(Arc::new(MemoryBoardStore::new()))
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).single().unwrap()
    }

    fn spec() -> BoardSpec {
        BoardSpec {
            title: String::from("community canvas"),
            size: BoardSize {
                width: 16,
                height: 9,
            },
            mode: BoardMode::NoOverwrite,
            cooldown_seconds: 5,
            end_at: at(100_000),
            exportable: None,
            initial_pixels: Vec::new(),
        }
    }

    #[tokio::test]
    async fn create_persists_and_defaults_exportable() {
        let registry = registry();
        let author = UserId::new();

        let board = registry.create(author, spec(), at(10)).await.unwrap();
        assert_eq!(board.status, BoardStatus::Active);
        assert_eq!(board.author_id, author);
        assert!(board.exportable);
        assert_eq!(board.created_at, at(10));

        let fetched = registry.get(board.id).await.unwrap();
        assert_eq!(fetched, board);
    }

    #[tokio::test]
    async fn create_rejects_blank_title() {
        let registry = registry();
        let mut bad = spec();
        bad.title = String::from("   ");
        let err = registry.create(UserId::new(), bad, at(0)).await.unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[tokio::test]
    async fn create_rejects_out_of_range_dimensions() {
        let registry = registry();
        for (width, height) in [(0, 5), (5, 0), (81, 5), (5, 81)] {
            let mut bad = spec();
            bad.size = BoardSize { width, height };
            let err = registry
                .create(UserId::new(), bad, at(0))
                .await
                .unwrap_err();
            assert!(
                matches!(err, EngineError::Validation(_)),
                "accepted {width}x{height}"
            );
        }
    }

    #[tokio::test]
    async fn create_accepts_maximum_dimensions() {
        let registry = registry();
        let mut big = spec();
        big.size = BoardSize {
            width: MAX_BOARD_DIMENSION,
            height: MAX_BOARD_DIMENSION,
        };
        assert!(registry.create(UserId::new(), big, at(0)).await.is_ok());
    }

    #[tokio::test]
    async fn seed_pixels_are_stamped_with_author_and_creation_time() {
        let registry = registry();
        let author = UserId::new();
        let mut seeded = spec();
        seeded.initial_pixels = vec![
            SeedPixel {
                x: 0,
                y: 0,
                color: String::from("#FF0000"),
            },
            SeedPixel {
                x: 2,
                y: 1,
                color: String::from("#00ff00"),
            },
        ];

        let board = registry.create(author, seeded, at(42)).await.unwrap();
        assert_eq!(board.pixels.len(), 2);
        for record in &board.pixels {
            assert_eq!(record.user_id, author);
            assert_eq!(record.timestamp, at(42));
        }
        // Colors are normalized on the way in.
        assert_eq!(board.pixels.first().unwrap().color.as_str(), "#ff0000");
    }

    #[tokio::test]
    async fn seed_pixels_outside_board_or_malformed_are_rejected() {
        let registry = registry();
        for seed in [
            SeedPixel {
                x: 16,
                y: 0,
                color: String::from("#ffffff"),
            },
            SeedPixel {
                x: -1,
                y: 0,
                color: String::from("#ffffff"),
            },
            SeedPixel {
                x: 0,
                y: 0,
                color: String::from("white"),
            },
        ] {
            let mut bad = spec();
            bad.initial_pixels = vec![seed];
            let err = registry
                .create(UserId::new(), bad, at(0))
                .await
                .unwrap_err();
            assert!(matches!(err, EngineError::Validation(_)));
        }
    }

    #[tokio::test]
    async fn duplicate_seed_cells_rejected_on_no_overwrite_boards() {
        let registry = registry();
        let duplicate = vec![
            SeedPixel {
                x: 1,
                y: 1,
                color: String::from("#111111"),
            },
            SeedPixel {
                x: 1,
                y: 1,
                color: String::from("#222222"),
            },
        ];

        let mut bad = spec();
        bad.initial_pixels = duplicate.clone();
        let err = registry
            .create(UserId::new(), bad, at(0))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));

        // The same seeds are fine when overwriting is allowed.
        let mut ok = spec();
        ok.mode = BoardMode::Overwrite;
        ok.initial_pixels = duplicate;
        let board = registry.create(UserId::new(), ok, at(0)).await.unwrap();
        assert_eq!(board.pixels.len(), 2);
    }

    #[tokio::test]
    async fn get_unknown_board_is_not_found() {
        let registry = registry();
        let err = registry.get(BoardId::new()).await.unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_returns_summaries_with_pixel_counts() {
        let registry = registry();
        let mut seeded = spec();
        seeded.initial_pixels = vec![SeedPixel {
            x: 0,
            y: 0,
            color: String::from("#123456"),
        }];
        let board = registry.create(UserId::new(), seeded, at(0)).await.unwrap();

        let summaries = registry.list().await.unwrap();
        assert_eq!(summaries.len(), 1);
        let summary = summaries.first().unwrap();
        assert_eq!(summary.id, board.id);
        assert_eq!(summary.pixel_count, 1);
        assert_eq!(summary.title, board.title);
    }
}
