//! Enumeration types for board conflict policy and lifecycle status.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Conflict mode
// ---------------------------------------------------------------------------

/// How a board resolves two placements targeting the same coordinate.
///
/// The mode is fixed at board creation and never changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum BoardMode {
    /// Any coordinate may be painted over; the most recent record defines
    /// the current color.
    Overwrite,
    /// First writer wins: once a coordinate holds a record, every later
    /// placement there is rejected for the lifetime of the board.
    #[default]
    // Older dashboard builds send the hyphenated spelling.
    #[serde(alias = "no-overwrite")]
    NoOverwrite,
}

// ---------------------------------------------------------------------------
// Lifecycle status
// ---------------------------------------------------------------------------

/// Whether a board still accepts placements.
///
/// The transition `Active -> Completed` is monotone: it happens once, either
/// when the end date passes (detected lazily at the next placement attempt)
/// or by explicit completion, and is never reversed by the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum BoardStatus {
    /// The board accepts placements until its end date.
    #[default]
    // Accepted for documents written by the pre-rewrite backend.
    #[serde(alias = "in_progress")]
    Active,
    /// The board is frozen; placements are rejected, reads still work.
    Completed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_wire_spelling() {
        assert_eq!(
            serde_json::to_string(&BoardMode::NoOverwrite).ok(),
            Some(String::from("\"no_overwrite\""))
        );
        assert_eq!(
            serde_json::to_string(&BoardMode::Overwrite).ok(),
            Some(String::from("\"overwrite\""))
        );
    }

    #[test]
    fn mode_accepts_hyphenated_alias() {
        let parsed: Result<BoardMode, _> = serde_json::from_str("\"no-overwrite\"");
        assert_eq!(parsed.ok(), Some(BoardMode::NoOverwrite));
    }

    #[test]
    fn status_accepts_legacy_alias() {
        let parsed: Result<BoardStatus, _> = serde_json::from_str("\"in_progress\"");
        assert_eq!(parsed.ok(), Some(BoardStatus::Active));
        assert_eq!(
            serde_json::to_string(&BoardStatus::Active).ok(),
            Some(String::from("\"active\""))
        );
    }
}
