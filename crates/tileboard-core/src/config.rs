//! Board configuration and the bundled card dataset.

use crate::animation::DEFAULT_TRANSITION;
use crate::camera::{Camera, DEFAULT_OFFSET, MAX_ZOOM, MIN_ZOOM};
use crate::error::BoardResult;
use crate::gesture::GestureConfig;
use crate::tile::TileMeta;
use kurbo::{Size, Vec2};
use serde::{Deserialize, Serialize};

#[cfg(target_arch = "wasm32")]
use web_time::Duration;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

/// Size of one grid cell in board units.
pub const CELL_SIZE: Size = Size::new(316.0, 166.0);

const DEFAULT_CARDS: &str = include_str!("../assets/default_cards.json");

/// Startup settings of a board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub rows: usize,
    pub cols: usize,
    pub cell_size: Size,
    pub initial_offset: Vec2,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub gesture: GestureConfig,
    /// Length of tile transitions in milliseconds.
    pub transition_ms: u64,
    /// Cards placed in order when the board is created.
    pub cards: Vec<TileMeta>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            rows: 9,
            cols: 3,
            cell_size: CELL_SIZE,
            initial_offset: DEFAULT_OFFSET,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            gesture: GestureConfig::default(),
            transition_ms: DEFAULT_TRANSITION.as_millis() as u64,
            cards: default_cards(),
        }
    }
}

impl BoardConfig {
    /// Empty board of the given size with default settings.
    pub fn empty(cols: usize, rows: usize) -> Self {
        Self {
            rows,
            cols,
            cards: Vec::new(),
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> BoardResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> BoardResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn transition(&self) -> Duration {
        Duration::from_millis(self.transition_ms)
    }

    /// Camera at the configured offset and zoom bounds.
    pub fn camera(&self) -> Camera {
        Camera::with_bounds(self.initial_offset, self.min_zoom, self.max_zoom)
    }
}

/// The bundled startup dataset.
pub fn default_cards() -> Vec<TileMeta> {
    match serde_json::from_str(DEFAULT_CARDS) {
        Ok(cards) => cards,
        Err(e) => {
            log::error!("Bundled card dataset is invalid: {}", e);
            Vec::new()
        }
    }
}
