//! Board persistence layer for the Tessera pixel canvas.
//!
//! Defines the [`BoardStore`] repository contract the placement engine
//! writes through, plus two backends:
//!
//! - [`MemoryBoardStore`] -- in-process, the default for single-node
//!   deployments and the backend all tests run against
//! - [`PgBoardStore`] -- `PostgreSQL`, for deployments where several
//!   processes share one durable store
//!
//! Both honor the same versioned compare-and-swap save contract, so the
//! engine's conflict-retry path behaves identically everywhere.

pub mod board_store;
pub mod error;
pub mod memory;
pub mod postgres;

pub use board_store::{BoardStore, SaveOutcome, Versioned};
pub use error::StoreError;
pub use memory::MemoryBoardStore;
pub use postgres::{PgBoardStore, PostgresConfig};
