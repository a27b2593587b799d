//! Request and response bodies for the board API.
//!
//! Field names mirror the dashboard's TypeScript interfaces (camelCase,
//! `endDate`, `heatmapData`, `boardSize`). Structural validation lives
//! on the DTOs via [`validator`]; semantic validation (seed pixel
//! bounds, color syntax, duplicate cells) belongs to the registry and
//! engine, which re-check regardless of transport.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tessera_core::{BoardSpec, Heatmap, SeedPixel};
use tessera_types::{BoardMode, BoardSize, PlacementRecord};
use validator::Validate;

use crate::error::ApiError;

/// Body of `POST /api/pixelboards`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBoardRequest {
    /// Board title.
    #[validate(length(min = 1, max = 120, message = "title must be 1-120 characters"))]
    pub title: String,
    /// Grid dimensions.
    #[validate(nested)]
    pub size: SizeBody,
    /// Conflict policy; defaults to no-overwrite like the original boards.
    #[serde(default)]
    pub mode: BoardMode,
    /// Cooldown between one user's placements, in seconds.
    #[validate(range(min = 0, message = "delay must not be negative"))]
    pub delay: i64,
    /// When the board stops accepting placements.
    pub end_date: DateTime<Utc>,
    /// Whether the finished canvas may be exported (default true).
    #[serde(default)]
    pub exportable: Option<bool>,
    /// Pixels painted at creation, attributed to the author.
    #[serde(default)]
    pub initial_pixels: Vec<InitialPixelBody>,
}

/// Grid dimensions as sent by the client.
#[derive(Debug, Clone, Copy, Deserialize, Validate)]
pub struct SizeBody {
    /// Cells along the x axis.
    #[validate(range(min = 1, max = 80, message = "width must be between 1 and 80"))]
    pub width: u32,
    /// Cells along the y axis.
    #[validate(range(min = 1, max = 80, message = "height must be between 1 and 80"))]
    pub height: u32,
}

/// One seed pixel in a create request.
#[derive(Debug, Clone, Deserialize)]
pub struct InitialPixelBody {
    /// Cell x coordinate.
    pub x: i64,
    /// Cell y coordinate.
    pub y: i64,
    /// Color in `#rrggbb` form.
    pub color: String,
}

impl CreateBoardRequest {
    /// Validate the structural constraints and convert into the
    /// registry's spec type.
    pub fn into_spec(self) -> Result<BoardSpec, ApiError> {
        self.validate()
            .map_err(|err| ApiError::InvalidBody(err.to_string()))?;
        let cooldown_seconds = u32::try_from(self.delay)
            .map_err(|_err| ApiError::InvalidBody(String::from("delay is out of range")))?;
        Ok(BoardSpec {
            title: self.title,
            size: BoardSize {
                width: self.size.width,
                height: self.size.height,
            },
            mode: self.mode,
            cooldown_seconds,
            end_at: self.end_date,
            exportable: self.exportable,
            initial_pixels: self
                .initial_pixels
                .into_iter()
                .map(|p| SeedPixel {
                    x: p.x,
                    y: p.y,
                    color: p.color,
                })
                .collect(),
        })
    }
}

/// Body of `POST /api/pixelboards/{id}/pixels`.
#[derive(Debug, Clone, Deserialize)]
pub struct PlacePixelRequest {
    /// Cell x coordinate.
    pub x: i64,
    /// Cell y coordinate.
    pub y: i64,
    /// Color in `#rrggbb` form.
    pub color: String,
}

/// Response of `GET /api/pixelboards/{id}/heatmap`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapResponse {
    /// `heatmapData[y][x]` counts every placement ever made at `(x, y)`.
    pub heatmap_data: Vec<Vec<u32>>,
    /// Largest cell count, 0 for an untouched board.
    pub max_value: u32,
    /// Grid dimensions, so the client can scale its canvas.
    pub board_size: BoardSize,
}

impl HeatmapResponse {
    /// Package a computed heatmap with its board's dimensions.
    pub fn new(heatmap: Heatmap, board_size: BoardSize) -> Self {
        Self {
            heatmap_data: heatmap.grid,
            max_value: heatmap.max_value,
            board_size,
        }
    }
}

/// Response of `GET /api/pixelboards/{id}/history`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    /// The full placement log in replay order (ascending timestamp).
    pub pixels: Vec<PlacementRecord>,
    /// Grid dimensions, so the client can scale its canvas.
    pub board_size: BoardSize,
}
