//! Tileboard Core Library
//!
//! Platform-agnostic grid placement and drag reconciliation for the Tileboard
//! card editor. Rendering, edit forms and image export are collaborators
//! behind traits; the board only tells them what changed.

pub mod animation;
pub mod board;
pub mod camera;
pub mod config;
pub mod error;
pub mod export;
pub mod gesture;
pub mod grid;
pub mod input;
mod interaction;
pub mod position;
pub mod render;
pub mod tile;

pub use animation::{Elevation, PendingAnimation, TileStyle, Transition};
pub use board::{Board, MoveOutcome};
pub use camera::Camera;
pub use config::BoardConfig;
pub use error::{BoardError, BoardResult, InvariantViolation};
pub use export::{BoardExporter, BoardSnapshot, ExportQuality, JsonExporter, TileSnapshot};
pub use gesture::{ContextMenu, DragPhase, GestureConfig};
pub use grid::Grid;
pub use input::{Modifiers, MouseButton, PointerEvent, PointerId, PointerKind};
pub use position::Position;
pub use render::{NullRenderer, RecordingRenderer, RenderOp, TileRenderer};
pub use tile::{Tile, TileEdit, TileEditor, TileId, TileMeta, parse_color};
