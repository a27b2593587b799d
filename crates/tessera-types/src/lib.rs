//! Shared type definitions for the Tessera pixel canvas.
//!
//! This crate is the single source of truth for all types used across the
//! Tessera workspace. Types defined here flow downstream to `TypeScript`
//! via `ts-rs` for the canvas dashboard.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for boards and users
//! - [`enums`] -- Conflict mode and lifecycle status
//! - [`color`] -- Validated `#rrggbb` color strings
//! - [`structs`] -- Board geometry, placement records, boards, summaries
//! - [`messages`] -- Live-update frames pushed to board viewers

pub mod color;
pub mod enums;
pub mod ids;
pub mod messages;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use color::{ColorParseError, HexColor};
pub use enums::{BoardMode, BoardStatus};
pub use ids::{BoardId, UserId};
pub use messages::BoardMessage;
pub use structs::{Board, BoardSize, BoardSummary, PlacementRecord, MAX_BOARD_DIMENSION};

#[cfg(test)]
mod tests {
    //! Integration tests for type exports and `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // ts-rs generates TypeScript bindings when types with
        // #[ts(export)] are used. Importing them here triggers generation.
        // The actual files are written to the `bindings/` directory
        // relative to the crate root.
        use ts_rs::TS;

        let _ = crate::ids::BoardId::export_all();
        let _ = crate::ids::UserId::export_all();
        let _ = crate::enums::BoardMode::export_all();
        let _ = crate::enums::BoardStatus::export_all();
        let _ = crate::color::HexColor::export_all();
        let _ = crate::structs::BoardSize::export_all();
        let _ = crate::structs::PlacementRecord::export_all();
        let _ = crate::structs::Board::export_all();
        let _ = crate::structs::BoardSummary::export_all();
        let _ = crate::messages::BoardMessage::export_all();
    }
}
