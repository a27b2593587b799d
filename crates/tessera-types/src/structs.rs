//! Core entity structs: board geometry, placement records, and boards.
//!
//! Wire serialization is camelCase to match the dashboard's TypeScript
//! interfaces. A [`PlacementRecord`]'s author field serializes as `user`,
//! the name the canvas component reads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::color::HexColor;
use crate::enums::{BoardMode, BoardStatus};
use crate::ids::{BoardId, UserId};

/// Upper bound on board width and height, in cells.
///
/// Conflict checks and analytics scan the full placement log; the bound
/// keeps a board's worst-case log growth per repaint at 6,400 cells.
pub const MAX_BOARD_DIMENSION: u32 = 80;

// ---------------------------------------------------------------------------
// BoardSize
// ---------------------------------------------------------------------------

/// Fixed board dimensions in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct BoardSize {
    /// Number of cells along the x axis.
    pub width: u32,
    /// Number of cells along the y axis.
    pub height: u32,
}

impl BoardSize {
    /// Whether a (possibly negative) coordinate pair lies on the board,
    /// i.e. within `[0, width) x [0, height)`.
    pub const fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < self.width as i64 && y < self.height as i64
    }
}

// ---------------------------------------------------------------------------
// PlacementRecord
// ---------------------------------------------------------------------------

/// One accepted write of a color to a coordinate by a user.
///
/// Records are immutable once appended to a board's pixel log. The
/// timestamp is assigned by the placement engine at acceptance time,
/// never supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "camelCase")]
pub struct PlacementRecord {
    /// Cell x coordinate, `0 <= x < width`.
    pub x: u32,
    /// Cell y coordinate, `0 <= y < height`.
    pub y: u32,
    /// The color written, `#rrggbb`.
    pub color: HexColor,
    /// The user who placed the pixel.
    #[serde(rename = "user")]
    pub user_id: UserId,
    /// Engine-assigned acceptance time.
    pub timestamp: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// A fixed-size pixel grid with a conflict mode, cooldown, and lifetime.
///
/// The pixel log is append-only and ordered by acceptance: the engine is
/// the only writer, and every accepted placement appends exactly one
/// record. Current cell colors, heatmaps, and replay history are all
/// derived from the log rather than stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "camelCase")]
pub struct Board {
    /// Unique board identifier.
    pub id: BoardId,
    /// Human-readable board title.
    pub title: String,
    /// Grid dimensions, each in `1..=MAX_BOARD_DIMENSION`.
    pub size: BoardSize,
    /// Conflict resolution policy for coordinate collisions.
    pub mode: BoardMode,
    /// Minimum seconds between one user's accepted placements (0 = none).
    pub cooldown_seconds: u32,
    /// When the board was created.
    pub created_at: DateTime<Utc>,
    /// When the board stops accepting placements.
    pub end_at: DateTime<Utc>,
    /// Current lifecycle status.
    pub status: BoardStatus,
    /// The user who created the board.
    pub author_id: UserId,
    /// Whether the finished canvas may be exported as an image.
    pub exportable: bool,
    /// Append-only, acceptance-ordered placement log.
    pub pixels: Vec<PlacementRecord>,
}

impl Board {
    /// First record ever placed at `(x, y)`, if any.
    ///
    /// Under [`BoardMode::NoOverwrite`] this is also the only record at
    /// that coordinate, so `Some` means the cell is permanently taken.
    pub fn first_record_at(&self, x: u32, y: u32) -> Option<&PlacementRecord> {
        self.pixels.iter().find(|p| p.x == x && p.y == y)
    }

    /// The record currently defining the color of `(x, y)`, if any:
    /// greatest timestamp at that coordinate, later appends winning ties.
    pub fn current_record_at(&self, x: u32, y: u32) -> Option<&PlacementRecord> {
        // max_by_key keeps the last of several maxima, so equal timestamps
        // fall to the later append.
        self.pixels
            .iter()
            .filter(|p| p.x == x && p.y == y)
            .max_by_key(|p| p.timestamp)
    }

    /// Timestamp of `user`'s most recent accepted placement on this board.
    pub fn last_placement_by(&self, user: UserId) -> Option<DateTime<Utc>> {
        self.pixels
            .iter()
            .filter(|p| p.user_id == user)
            .map(|p| p.timestamp)
            .max()
    }
}

// ---------------------------------------------------------------------------
// BoardSummary
// ---------------------------------------------------------------------------

/// Lightweight board listing entry: everything the home screen needs
/// without shipping the pixel log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "camelCase")]
pub struct BoardSummary {
    /// Unique board identifier.
    pub id: BoardId,
    /// Human-readable board title.
    pub title: String,
    /// Current lifecycle status.
    pub status: BoardStatus,
    /// Grid dimensions.
    pub size: BoardSize,
    /// Conflict resolution policy.
    pub mode: BoardMode,
    /// When the board was created.
    pub created_at: DateTime<Utc>,
    /// When the board stops accepting placements.
    pub end_at: DateTime<Utc>,
    /// Total placements accepted so far.
    pub pixel_count: u64,
    /// Whether the finished canvas may be exported as an image.
    pub exportable: bool,
}

impl From<&Board> for BoardSummary {
    fn from(board: &Board) -> Self {
        Self {
            id: board.id,
            title: board.title.clone(),
            status: board.status,
            size: board.size,
            mode: board.mode,
            created_at: board.created_at,
            end_at: board.end_at,
            pixel_count: u64::try_from(board.pixels.len()).unwrap_or(u64::MAX),
            exportable: board.exportable,
        }
    }
}
