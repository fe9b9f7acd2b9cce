//! Renderer collaborator.
//!
//! The board never draws. It tells a [`TileRenderer`] what changed and the
//! renderer decides how to show it.

use crate::animation::TileStyle;
use crate::input::PointerId;
use crate::tile::{Tile, TileId, TileMeta};
use kurbo::{Affine, Point};

/// Receives visual updates from the board.
///
/// Positions are tile offsets in board units; the board transform maps them
/// to the screen.
pub trait TileRenderer {
    /// A tile was placed on the board.
    fn create(&mut self, tile: &Tile);
    /// The tile's visual offset changed.
    fn update_position(&mut self, id: TileId, offset: Point);
    /// The tile's label, number, color, image or number visibility changed.
    fn update_meta(&mut self, tile: &Tile);
    fn update_style(&mut self, id: TileId, style: TileStyle);
    fn remove(&mut self, id: TileId);
    /// Show (or move) the drop preview of a drag.
    fn show_preview(&mut self, pointer: PointerId, offset: Point);
    fn remove_preview(&mut self, pointer: PointerId);
    /// Board pan/zoom changed. `shadow` is off while exporting.
    fn set_board_transform(&mut self, transform: Affine, shadow: bool);

    fn show_context_menu(&mut self, _tile: TileId, _position: Point) {}
    fn hide_context_menu(&mut self) {}
}

/// Renderer that ignores every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl TileRenderer for NullRenderer {
    fn create(&mut self, _tile: &Tile) {}
    fn update_position(&mut self, _id: TileId, _offset: Point) {}
    fn update_meta(&mut self, _tile: &Tile) {}
    fn update_style(&mut self, _id: TileId, _style: TileStyle) {}
    fn remove(&mut self, _id: TileId) {}
    fn show_preview(&mut self, _pointer: PointerId, _offset: Point) {}
    fn remove_preview(&mut self, _pointer: PointerId) {}
    fn set_board_transform(&mut self, _transform: Affine, _shadow: bool) {}
}

/// One recorded renderer call.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderOp {
    Create { id: TileId, offset: Point },
    Position { id: TileId, offset: Point },
    Meta { id: TileId, meta: TileMeta, number_visible: bool },
    Style { id: TileId, style: TileStyle },
    Remove { id: TileId },
    ShowPreview { pointer: PointerId, offset: Point },
    RemovePreview { pointer: PointerId },
    Transform { transform: Affine, shadow: bool },
    ShowMenu { tile: TileId, position: Point },
    HideMenu,
}

/// Renderer that records every call, in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    ops: Vec<RenderOp>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[RenderOp] {
        &self.ops
    }

    /// Take the recorded calls, leaving the log empty.
    pub fn take(&mut self) -> Vec<RenderOp> {
        std::mem::take(&mut self.ops)
    }

    pub fn clear(&mut self) {
        self.ops.clear();
    }
}

impl TileRenderer for RecordingRenderer {
    fn create(&mut self, tile: &Tile) {
        self.ops.push(RenderOp::Create {
            id: tile.id(),
            offset: tile.visual_offset(),
        });
    }

    fn update_position(&mut self, id: TileId, offset: Point) {
        self.ops.push(RenderOp::Position { id, offset });
    }

    fn update_meta(&mut self, tile: &Tile) {
        self.ops.push(RenderOp::Meta {
            id: tile.id(),
            meta: tile.meta().clone(),
            number_visible: tile.is_number_visible(),
        });
    }

    fn update_style(&mut self, id: TileId, style: TileStyle) {
        self.ops.push(RenderOp::Style { id, style });
    }

    fn remove(&mut self, id: TileId) {
        self.ops.push(RenderOp::Remove { id });
    }

    fn show_preview(&mut self, pointer: PointerId, offset: Point) {
        self.ops.push(RenderOp::ShowPreview { pointer, offset });
    }

    fn remove_preview(&mut self, pointer: PointerId) {
        self.ops.push(RenderOp::RemovePreview { pointer });
    }

    fn set_board_transform(&mut self, transform: Affine, shadow: bool) {
        self.ops.push(RenderOp::Transform { transform, shadow });
    }

    fn show_context_menu(&mut self, tile: TileId, position: Point) {
        self.ops.push(RenderOp::ShowMenu { tile, position });
    }

    fn hide_context_menu(&mut self) {
        self.ops.push(RenderOp::HideMenu);
    }
}
