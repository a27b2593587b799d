//! Board API server for the Tessera pixel canvas.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **REST endpoints** for creating, listing, and reading boards,
//!   placing pixels, and fetching heatmap/history projections
//! - **`WebSocket` endpoint** (`/ws/boards/{id}`) streaming accepted
//!   placements via the core [`BroadcastHub`](tessera_core::BroadcastHub)
//! - **Minimal HTML status page** (`GET /`)
//!
//! # Architecture
//!
//! Handlers are thin: they parse and validate wire shapes, attach the
//! verified identity, and delegate to the registry/engine in
//! `tessera-core`. All domain decisions (bounds, conflicts, cooldowns,
//! lifecycle) happen in the core so they hold for any transport.
//!
//! Identity is trusted, not verified: an upstream authenticator forwards
//! the caller's user id in the `x-user-id` header (see [`auth`]).

pub mod auth;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use error::ApiError;
pub use router::build_router;
pub use server::{start_server, ServerConfig, ServerError};
pub use state::AppState;
