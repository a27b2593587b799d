//! Read-only analytical views over a board's placement log.
//!
//! Both views are pure functions over a point-in-time snapshot of the
//! log; they take the board by reference and never touch the store, so
//! concurrent writers can at worst make a view one record stale, which
//! is acceptable for visualization.

use tessera_types::{Board, PlacementRecord};

/// Per-cell modification density over a board's full history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heatmap {
    /// `grid[y][x]` counts every record ever placed at `(x, y)`,
    /// overwritten ones included, regardless of board mode.
    pub grid: Vec<Vec<u32>>,
    /// The largest cell count; 0 for an untouched board.
    pub max_value: u32,
}

/// Count all placements per cell, overwritten ones included.
pub fn heatmap(board: &Board) -> Heatmap {
    let width = usize::try_from(board.size.width).unwrap_or(0);
    let height = usize::try_from(board.size.height).unwrap_or(0);
    let mut grid = vec![vec![0_u32; width]; height];
    let mut max_value = 0_u32;

    for record in &board.pixels {
        let x = usize::try_from(record.x).unwrap_or(usize::MAX);
        let y = usize::try_from(record.y).unwrap_or(usize::MAX);
        // Records are bounds-checked on the way in; get_mut just keeps a
        // hypothetical corrupt log from panicking a read path.
        if let Some(cell) = grid.get_mut(y).and_then(|row| row.get_mut(x)) {
            *cell = cell.saturating_add(1);
            max_value = max_value.max(*cell);
        }
    }

    Heatmap { grid, max_value }
}

/// The full placement log ordered for deterministic replay: ascending
/// timestamp, ties keeping original append order (the sort is stable).
///
/// Applying the records in order reconstructs the board visually --
/// last writer per cell under overwrite mode, and trivially the recorded
/// cells under no-overwrite mode, where each cell appears at most once.
pub fn history(board: &Board) -> Vec<PlacementRecord> {
    let mut records = board.pixels.clone();
    records.sort_by_key(|record| record.timestamp);
    records
}
