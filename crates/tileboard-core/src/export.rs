//! Board snapshots and the export collaborator.

use crate::position::Position;
use crate::tile::TileMeta;
use kurbo::Size;
use serde::{Deserialize, Serialize};

/// Lowest export scale.
pub const MIN_QUALITY: f64 = 1.0;
/// Highest export scale.
pub const MAX_QUALITY: f64 = 3.0;

/// Pixel ratio of an exported image, in half steps from 1.0 to 3.0.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExportQuality(f64);

impl ExportQuality {
    /// Clamp to the supported range and round to the nearest half step.
    pub fn new(value: f64) -> Self {
        if !value.is_finite() {
            return Self(MIN_QUALITY);
        }
        let clamped = value.clamp(MIN_QUALITY, MAX_QUALITY);
        Self((clamped * 2.0).round() / 2.0)
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for ExportQuality {
    fn default() -> Self {
        Self(MIN_QUALITY)
    }
}

/// One placed tile, as seen by an exporter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileSnapshot {
    pub position: Position,
    pub meta: TileMeta,
    pub number_visible: bool,
}

/// Committed board contents, row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub rows: usize,
    pub cols: usize,
    pub cell_size: Size,
    pub tiles: Vec<TileSnapshot>,
}

impl BoardSnapshot {
    /// Size of the rendered board at the given quality, in pixels.
    pub fn pixel_size(&self, quality: ExportQuality) -> Size {
        Size::new(
            self.cols as f64 * self.cell_size.width * quality.value(),
            self.rows as f64 * self.cell_size.height * quality.value(),
        )
    }
}

/// Turns a snapshot into an artifact (image, document, ...).
pub trait BoardExporter {
    type Output;
    type Error: std::error::Error;

    fn export(&mut self, snapshot: &BoardSnapshot, quality: ExportQuality) -> Result<Self::Output, Self::Error>;
}

/// Exporter that serializes the snapshot as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonExporter {
    pub pretty: bool,
}

#[derive(Serialize)]
struct JsonExport<'a> {
    quality: ExportQuality,
    width: f64,
    height: f64,
    #[serde(flatten)]
    board: &'a BoardSnapshot,
}

impl BoardExporter for JsonExporter {
    type Output = String;
    type Error = serde_json::Error;

    fn export(&mut self, snapshot: &BoardSnapshot, quality: ExportQuality) -> Result<String, serde_json::Error> {
        let size = snapshot.pixel_size(quality);
        let doc = JsonExport {
            quality,
            width: size.width,
            height: size.height,
            board: snapshot,
        };
        if self.pretty {
            serde_json::to_string_pretty(&doc)
        } else {
            serde_json::to_string(&doc)
        }
    }
}
