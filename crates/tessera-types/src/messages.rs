//! Live-update messages pushed to board viewers.
//!
//! Every accepted placement produces one [`BoardMessage::PixelAdded`]
//! frame, serialized with a `type` tag so the dashboard can dispatch on
//! it: `{"type": "pixelAdded", "boardId": ..., "pixel": {...}}`.
//! Delivery is best-effort; a viewer that misses frames refetches the
//! full board.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::BoardId;
use crate::structs::PlacementRecord;

/// A message on a board's live-update stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BoardMessage {
    /// A placement was accepted and durably recorded.
    PixelAdded {
        /// The board the pixel landed on.
        #[serde(rename = "boardId")]
        board_id: BoardId,
        /// The accepted placement record.
        pixel: PlacementRecord,
    },
}

impl BoardMessage {
    /// The board this message concerns, used by the hub to route fan-out.
    pub const fn board_id(&self) -> BoardId {
        match self {
            Self::PixelAdded { board_id, .. } => *board_id,
        }
    }
}
