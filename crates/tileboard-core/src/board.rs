//! The board: tile arena, grid index, camera and gesture state.

use crate::animation::{self, PendingAnimation, TileStyle};
use crate::camera::Camera;
use crate::config::BoardConfig;
use crate::error::{BoardError, BoardResult, InvariantViolation};
use crate::export::{BoardExporter, BoardSnapshot, ExportQuality, TileSnapshot};
use crate::gesture::{ContextMenu, DragPhase, GestureConfig, PointerCoordinator, SessionPhase};
use crate::grid::Grid;
use crate::position::Position;
use crate::render::{NullRenderer, TileRenderer};
use crate::tile::{Tile, TileEditor, TileId, TileMeta};
use kurbo::{Affine, Size};
use std::collections::HashMap;

#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};
#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

/// Result of [`Board::move_tile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The tile was dropped on its own cell.
    Unchanged,
    /// The tile moved to an empty cell.
    Moved { from: Position },
    /// The tile traded cells with `other`.
    Swapped { from: Position, other: TileId },
}

/// A board of card tiles.
///
/// Tiles live in an arena keyed by [`TileId`]; the [`Grid`] only indexes
/// them. Every public operation leaves the two in agreement: each occupied
/// cell names a tile whose stored position is that cell, and every tile is
/// indexed exactly once.
pub struct Board<R: TileRenderer = NullRenderer> {
    pub(crate) grid: Grid,
    pub(crate) tiles: HashMap<TileId, Tile>,
    pub(crate) camera: Camera,
    pub(crate) gestures: PointerCoordinator,
    pub(crate) renderer: R,
    pub(crate) cell_size: Size,
    pub(crate) gesture_config: GestureConfig,
    pub(crate) transition: Duration,
    /// Latest time seen by a handler; never moves backwards.
    pub(crate) clock: Instant,
}

impl Board {
    /// Create an empty board of `cols × rows` cells without a renderer.
    pub fn new(cols: usize, rows: usize) -> BoardResult<Self> {
        Self::with_renderer(cols, rows, NullRenderer)
    }
}

impl<R: TileRenderer> Board<R> {
    /// Create an empty board drawing through `renderer`.
    pub fn with_renderer(cols: usize, rows: usize, renderer: R) -> BoardResult<Self> {
        Self::from_config(&BoardConfig::empty(cols, rows), renderer)
    }

    /// Create a board and place the configured cards in order.
    pub fn from_config(config: &BoardConfig, renderer: R) -> BoardResult<Self> {
        let camera = config.camera();
        let mut board = Self {
            grid: Grid::new(config.cols, config.rows)?,
            tiles: HashMap::new(),
            camera,
            gestures: PointerCoordinator::new(),
            renderer,
            cell_size: config.cell_size,
            gesture_config: config.gesture.clone(),
            transition: config.transition(),
            clock: Instant::now(),
        };
        board.sync_view();

        let mut skipped = 0;
        for card in &config.cards {
            match board.add_card(card.clone()) {
                Ok(_) => {}
                Err(BoardError::GridFull) => skipped += 1,
                Err(e) => return Err(e),
            }
        }
        if skipped > 0 {
            log::warn!("{} cards did not fit on a {}x{} board", skipped, config.cols, config.rows);
        }
        log::info!(
            "Created {}x{} board with {} cards",
            config.cols,
            config.rows,
            board.len()
        );
        Ok(board)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn gesture_config(&self) -> &GestureConfig {
        &self.gesture_config
    }

    /// Latest time the board has seen.
    pub fn now(&self) -> Instant {
        self.clock
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.grid.width()
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.grid.height()
    }

    pub fn cell_size(&self) -> Size {
        self.cell_size
    }

    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(&id)
    }

    /// Tile occupying a cell.
    pub fn tile_at(&self, pos: Position) -> Option<&Tile> {
        self.grid.get(pos).and_then(|id| self.tiles.get(&id))
    }

    /// Tiles in row-major order.
    pub fn tiles_ordered(&self) -> impl Iterator<Item = &Tile> {
        self.grid.occupied().filter_map(|(_, id)| self.tiles.get(&id))
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn context_menu(&self) -> Option<&ContextMenu> {
        self.gestures.menu()
    }

    /// Drag state of a tile.
    pub fn drag_phase(&self, id: TileId) -> DragPhase {
        self.gestures.tile_phase(id)
    }

    /// Check whether any tile is being dragged.
    pub fn is_dragging(&self) -> bool {
        self.gestures.is_dragging()
    }

    /// Earliest time at which [`Board::tick`] has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        let long_press = self
            .gestures
            .sessions()
            .filter_map(|s| match s.phase {
                SessionPhase::LongPressPending { deadline, .. } => Some(deadline),
                _ => None,
            });
        let animations = self.tiles.values().filter_map(Tile::next_animation_deadline);
        long_press.chain(animations).min()
    }

    /// Place a card in the first empty cell (row-major).
    pub fn add_card(&mut self, meta: TileMeta) -> BoardResult<TileId> {
        let Some(position) = self.grid.first_empty() else {
            log::warn!("Cannot add card {:?}: the board is full", meta.name);
            return Err(BoardError::GridFull);
        };

        let tile = Tile::new(meta, position, self.cell_size);
        let id = tile.id();
        self.renderer.create(&tile);
        self.grid.set(position, Some(id));
        self.tiles.insert(id, tile);
        log::debug!("Added tile {} at {}", id, position);

        self.settle(id);
        self.reload();
        self.debug_check();
        Ok(id)
    }

    /// Move a tile to a cell, swapping with its occupant if there is one.
    ///
    /// Any session involving either tile is abandoned; both tiles play the
    /// settle transition and the board is renumbered.
    pub fn move_tile(&mut self, id: TileId, to: Position) -> BoardResult<MoveOutcome> {
        let from = self
            .tiles
            .get(&id)
            .map(Tile::position)
            .ok_or(BoardError::UnknownTile(id))?;
        if !self.grid.contains(to) {
            return Err(BoardError::NoSuchCell { x: to.x, y: to.y });
        }

        let other = self.grid.get(to).filter(|other| *other != id);
        self.abandon_session(id);
        if let Some(other) = other {
            self.abandon_session(other);
        }

        let outcome = if from == to {
            MoveOutcome::Unchanged
        } else if let Some(other) = other {
            self.grid.set(from, Some(other));
            self.grid.set(to, Some(id));
            self.set_tile_position(other, from);
            self.set_tile_position(id, to);
            MoveOutcome::Swapped { from, other }
        } else {
            self.grid.set(from, None);
            self.grid.set(to, Some(id));
            self.set_tile_position(id, to);
            MoveOutcome::Moved { from }
        };
        log::debug!("Tile {} {} -> {}: {:?}", id, from, to, outcome);

        self.settle(id);
        if let Some(other) = other {
            self.settle(other);
        }
        self.reload();
        self.debug_check();
        Ok(outcome)
    }

    /// Remove a tile and renumber. Returns its metadata.
    pub fn delete_tile(&mut self, id: TileId) -> BoardResult<TileMeta> {
        if !self.tiles.contains_key(&id) {
            return Err(BoardError::UnknownTile(id));
        }
        self.abandon_session(id);
        if self.gestures.menu().is_some_and(|menu| menu.tile == id) {
            self.close_context_menu();
        }

        let tile = self.tiles.remove(&id).ok_or(BoardError::UnknownTile(id))?;
        self.grid.set(tile.position(), None);
        self.renderer.remove(id);
        log::debug!("Deleted tile {} at {}", id, tile.position());

        self.reload();
        self.debug_check();
        Ok(tile.into_meta())
    }

    /// Remove every tile. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        self.cancel_all_gestures();
        let removed = self.grid.clear();
        for id in &removed {
            self.tiles.remove(id);
            self.renderer.remove(*id);
        }
        self.tiles.clear();
        log::debug!("Cleared {} tiles", removed.len());
        self.debug_check();
        removed.len()
    }

    /// Change the number of rows. Returns how many tiles were destroyed.
    pub fn set_height(&mut self, rows: usize) -> BoardResult<usize> {
        if rows == 0 {
            return Err(BoardError::InvalidDimension(rows));
        }
        self.cancel_all_gestures();
        let evicted = self.grid.set_height(rows)?;
        Ok(self.finish_resize(evicted))
    }

    /// Change the number of columns. Returns how many tiles were destroyed.
    pub fn set_width(&mut self, cols: usize) -> BoardResult<usize> {
        if cols == 0 {
            return Err(BoardError::InvalidDimension(cols));
        }
        self.cancel_all_gestures();
        let evicted = self.grid.set_width(cols)?;
        Ok(self.finish_resize(evicted))
    }

    fn finish_resize(&mut self, evicted: Vec<TileId>) -> usize {
        for id in &evicted {
            self.tiles.remove(id);
            self.renderer.remove(*id);
        }
        if !evicted.is_empty() {
            self.reload();
        }
        log::debug!(
            "Resized board to {}x{}, {} tiles destroyed",
            self.width(),
            self.height(),
            evicted.len()
        );
        self.debug_check();
        evicted.len()
    }

    /// Renumber tiles 1..N in row-major order.
    ///
    /// Only tiles whose number changed are pushed to the renderer.
    pub fn reload(&mut self) {
        for (index, (_, id)) in self.grid.occupied().enumerate() {
            let number = (index + 1) as u32;
            if let Some(tile) = self.tiles.get_mut(&id) {
                if tile.number() != number {
                    tile.set_number(number);
                    self.renderer.update_meta(tile);
                }
            }
        }
    }

    /// Run the edit form for a tile. Returns false if the user cancelled.
    pub fn edit_tile<E: TileEditor + ?Sized>(&mut self, id: TileId, editor: &mut E) -> BoardResult<bool> {
        let current = self
            .tiles
            .get(&id)
            .map(Tile::edit_form)
            .ok_or(BoardError::UnknownTile(id))?;
        self.close_context_menu();

        let Some(edit) = editor.edit(&current) else {
            log::debug!("Edit of tile {} cancelled", id);
            return Ok(false);
        };
        let tile = self.tiles.get_mut(&id).ok_or(BoardError::UnknownTile(id))?;
        tile.apply_edit(edit)?;
        self.renderer.update_meta(tile);
        Ok(true)
    }

    pub fn set_number_visible(&mut self, id: TileId, visible: bool) -> BoardResult<()> {
        let tile = self.tiles.get_mut(&id).ok_or(BoardError::UnknownTile(id))?;
        if tile.is_number_visible() != visible {
            tile.set_number_visible(visible);
            self.renderer.update_meta(tile);
        }
        Ok(())
    }

    /// Show or hide the number of every tile.
    pub fn set_numbers_visible(&mut self, visible: bool) {
        for tile in self.tiles.values_mut() {
            if tile.is_number_visible() != visible {
                tile.set_number_visible(visible);
                self.renderer.update_meta(tile);
            }
        }
    }

    pub fn close_context_menu(&mut self) {
        if self.gestures.close_menu().is_some() {
            self.renderer.hide_context_menu();
        }
    }

    /// Committed contents of the board.
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            rows: self.height(),
            cols: self.width(),
            cell_size: self.cell_size,
            tiles: self
                .tiles_ordered()
                .map(|tile| TileSnapshot {
                    position: tile.position(),
                    meta: tile.meta().clone(),
                    number_visible: tile.is_number_visible(),
                })
                .collect(),
        }
    }

    /// Export the board.
    ///
    /// The board transform is reset to identity (no shadow) for the
    /// exporter and restored afterwards, whether or not it succeeded.
    pub fn export<E: BoardExporter>(&mut self, exporter: &mut E, quality: f64) -> BoardResult<E::Output> {
        let quality = ExportQuality::new(quality);
        let snapshot = self.snapshot();

        self.renderer.set_board_transform(Affine::IDENTITY, false);
        let result = exporter.export(&snapshot, quality);
        self.sync_view();

        result.map_err(|e| {
            log::warn!("Export at {}x failed: {}", quality.value(), e);
            BoardError::Export(e.to_string())
        })
    }

    /// Check that the grid index and the tile arena agree.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        for (cell, id) in self.grid.occupied() {
            match self.tiles.get(&id) {
                None => return Err(InvariantViolation::DanglingCell { cell, tile: id }),
                Some(tile) if tile.position() != cell => {
                    return Err(InvariantViolation::PositionDrift {
                        tile: id,
                        stored: tile.position(),
                        cell,
                    });
                }
                Some(_) => {}
            }
        }
        for tile in self.tiles.values() {
            if self.grid.get(tile.position()) != Some(tile.id()) {
                return Err(InvariantViolation::Orphan {
                    tile: tile.id(),
                    stored: tile.position(),
                });
            }
        }
        Ok(())
    }

    pub(crate) fn debug_check(&self) {
        if !cfg!(debug_assertions) {
            return;
        }
        let result = self.check_invariants();
        if let Err(violation) = &result {
            log::error!("Board invariant broken: {}", violation);
        }
        debug_assert!(result.is_ok(), "grid index and tile arena disagree");
    }

    /// Advance time: complete due long presses and run due style steps.
    pub fn tick(&mut self, now: Instant) {
        self.advance_clock(now);
        for pointer in self.gestures.due_long_presses(self.clock) {
            self.complete_long_press(pointer);
        }
        for (id, tile) in self.tiles.iter_mut() {
            if let Some(style) = tile.poll_animation(self.clock) {
                self.renderer.update_style(*id, style);
            }
        }
        self.debug_check();
    }

    /// Put the camera back to its initial offset and zoom.
    pub fn reset_view(&mut self) {
        self.camera.reset();
        self.sync_view();
    }

    pub(crate) fn sync_view(&mut self) {
        self.renderer.set_board_transform(self.camera.transform(), true);
    }

    pub(crate) fn advance_clock(&mut self, now: Instant) {
        if now > self.clock {
            self.clock = now;
        }
    }

    fn set_tile_position(&mut self, id: TileId, position: Position) {
        if let Some(tile) = self.tiles.get_mut(&id) {
            tile.set_position(position);
        }
    }

    /// Animate a tile into its committed cell after a move.
    pub(crate) fn settle(&mut self, id: TileId) {
        self.animate_home(id, animation::settle);
    }

    /// Animate a tile back to its committed cell after a cancelled drag.
    pub(crate) fn snap_back(&mut self, id: TileId) {
        self.animate_home(id, animation::snap_back);
    }

    fn animate_home(
        &mut self,
        id: TileId,
        play: fn(Instant, TileStyle, Duration) -> (TileStyle, PendingAnimation),
    ) {
        let Some(tile) = self.tiles.get_mut(&id) else {
            return;
        };
        let (style, pending) = play(self.clock, tile.style(), self.transition);
        let home = tile.position().origin(self.cell_size);
        tile.set_style(style);
        tile.set_visual_offset(home);
        tile.start_animation(pending);
        self.renderer.update_style(id, style);
        self.renderer.update_position(id, home);
    }

    /// Forget the session holding a tile, if any. The caller decides where
    /// the tile goes.
    fn abandon_session(&mut self, tile: TileId) {
        let Some(pointer) = self.gestures.session_for_tile(tile) else {
            return;
        };
        if let Some(session) = self.gestures.remove_session(pointer) {
            if session.drag().is_some() {
                self.renderer.remove_preview(pointer);
            }
            log::debug!("Abandoned session of pointer {} on tile {}", pointer, tile);
        }
    }

    /// Cancel every tile session; dragged tiles snap back.
    pub(crate) fn cancel_tile_sessions(&mut self) {
        for (pointer, session) in self.gestures.drain_sessions() {
            if session.drag().is_some() {
                self.renderer.remove_preview(pointer);
                self.snap_back(session.tile);
                log::debug!("Cancelled drag of tile {} by pointer {}", session.tile, pointer);
            }
        }
    }

    /// Cancel tile sessions, the pinch and the context menu.
    pub(crate) fn cancel_all_gestures(&mut self) {
        self.cancel_tile_sessions();
        self.gestures.reset_pinch();
        self.close_context_menu();
    }
}
