//! The Tessera placement engine.
//!
//! Everything between a validated placement request and a durably
//! appended pixel lives here:
//!
//! - [`registry`] -- board creation, lookup, and listing
//! - [`lifecycle`] -- derived `Active`/`Completed` status
//! - [`engine`] -- the serialized validate-append-save-publish pipeline
//! - [`hub`] -- best-effort fan-out of accepted placements to viewers
//! - [`analytics`] -- heatmap and replay-history projections
//! - [`error`] -- the domain error taxonomy
//!
//! Transport (HTTP/WebSocket) and persistence backends live in sibling
//! crates; this one only sees the [`tessera_store::BoardStore`] contract
//! and never blocks on a viewer.

pub mod analytics;
pub mod engine;
pub mod error;
pub mod hub;
pub mod lifecycle;
pub mod registry;

pub use analytics::{heatmap, history, Heatmap};
pub use engine::{Placement, PlacementEngine};
pub use error::EngineError;
pub use hub::{BroadcastHub, DEFAULT_CHANNEL_CAPACITY};
pub use registry::{BoardRegistry, BoardSpec, SeedPixel};
