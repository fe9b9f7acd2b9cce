//! Pointer handling: tile drags, long presses, panning and pinch zoom.

use crate::animation::TileStyle;
use crate::board::Board;
use crate::camera::WHEEL_ZOOM_RATE;
use crate::gesture::{DragSession, SessionPhase, TileSession};
use crate::input::{MouseButton, Modifiers, PointerEvent, PointerId, PointerKind, exceeds_threshold};
use crate::position::Position;
use crate::render::TileRenderer;
use crate::tile::TileId;
use kurbo::{Point, Vec2};

#[cfg(target_arch = "wasm32")]
use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

impl<R: TileRenderer> Board<R> {
    /// Feed one pointer event, observed at `now`.
    ///
    /// Due timers run first, so a long press that completed before this
    /// event is honored.
    pub fn handle_pointer(&mut self, event: PointerEvent, now: Instant) {
        self.tick(now);
        match event {
            PointerEvent::Down {
                pointer,
                position,
                kind,
                button,
                modifiers,
            } => self.pointer_down(pointer, position, kind, button, modifiers),
            PointerEvent::Move { pointer, position } => self.pointer_move(pointer, position),
            PointerEvent::Up { pointer, position } => self.pointer_up(pointer, Some(position)),
            PointerEvent::Cancel { pointer } => self.pointer_up(pointer, None),
            PointerEvent::Wheel { position, delta } => self.wheel(position, delta),
        }
        self.debug_check();
    }

    /// Tile whose committed cell lies under a screen point.
    pub fn hit_test(&self, screen: Point) -> Option<TileId> {
        let world = self.camera.screen_to_world(screen);
        if !(world.x >= 0.0 && world.y >= 0.0) {
            return None;
        }
        let x = (world.x / self.cell_size.width).floor() as usize;
        let y = (world.y / self.cell_size.height).floor() as usize;
        self.grid.get(Position::new(x, y))
    }

    fn pointer_down(
        &mut self,
        pointer: PointerId,
        position: Point,
        kind: PointerKind,
        button: MouseButton,
        modifiers: Modifiers,
    ) {
        // A reused id whose release was lost: drop its old gesture first.
        if self.gestures.pointer(pointer).is_some() || self.gestures.session(pointer).is_some() {
            log::debug!("Pointer {} pressed again without a release", pointer);
            self.pointer_up(pointer, None);
        }
        self.close_context_menu();
        let hit = self.hit_test(position);

        if button == MouseButton::Right {
            if let Some(tile) = hit {
                self.open_context_menu(tile, position);
            }
            return;
        }

        self.gestures.register(pointer, position, self.camera.offset);
        if self.gestures.pointer_count() >= 2 {
            self.cancel_tile_sessions();
            self.gestures.reset_pinch();
            log::debug!("Pointer {} started a pinch", pointer);
            return;
        }

        // Anything but a plain primary press falls through to panning.
        let Some(tile) = hit else {
            return;
        };
        if button != MouseButton::Left || modifiers.any() {
            return;
        }
        if self.gestures.session_for_tile(tile).is_some() {
            return;
        }

        match kind {
            PointerKind::Touch => {
                if let Some(t) = self.tiles.get_mut(&tile) {
                    t.cancel_animation();
                }
                let deadline = self.clock + self.gesture_config.long_press();
                self.gestures.insert_session(
                    pointer,
                    TileSession {
                        tile,
                        phase: SessionPhase::LongPressPending {
                            origin: position,
                            deadline,
                        },
                    },
                );
                log::debug!("Pointer {} holding tile {}", pointer, tile);
            }
            PointerKind::Mouse | PointerKind::Pen => self.start_drag(pointer, tile, position),
        }
    }

    fn pointer_move(&mut self, pointer: PointerId, position: Point) {
        if !self.gestures.update_last(pointer, position) {
            return;
        }

        if self.gestures.pointer_count() >= 2 {
            if self.gestures.has_sessions() {
                self.cancel_tile_sessions();
            }
            if let Some(step) = self.gestures.pinch_step() {
                self.camera.zoom_at(step.center, step.factor);
                self.camera.pan(step.pan);
                self.sync_view();
            }
            return;
        }

        match self.gestures.session(pointer).copied() {
            Some(TileSession {
                tile,
                phase: SessionPhase::LongPressPending { origin, .. },
            }) => {
                if exceeds_threshold(origin, position, self.gesture_config.move_threshold) {
                    self.gestures.remove_session(pointer);
                    self.start_drag(pointer, tile, position);
                }
            }
            Some(TileSession {
                phase: SessionPhase::Dragging(_),
                ..
            }) => self.drag_to(pointer, position),
            Some(TileSession {
                phase: SessionPhase::MenuOpen,
                ..
            }) => {}
            None => {
                if self.gestures.is_dragging() {
                    return;
                }
                if let Some(offset) = self.gestures.pan_target(pointer) {
                    self.camera.move_to(offset);
                    self.sync_view();
                }
            }
        }
    }

    /// End a pointer. `release` is `None` when the platform cancelled it,
    /// in which case a dragged tile snaps back instead of committing.
    fn pointer_up(&mut self, pointer: PointerId, release: Option<Point>) {
        if let Some(position) = release {
            if self.gestures.session(pointer).is_some_and(|s| s.drag().is_some()) {
                self.drag_to(pointer, position);
            }
        }

        if let Some(session) = self.gestures.remove_session(pointer) {
            match session.phase {
                SessionPhase::Dragging(drag) => {
                    self.renderer.remove_preview(pointer);
                    if release.is_some() {
                        self.commit_drag(session.tile, drag.target);
                    } else {
                        log::debug!("Pointer {} cancelled, tile {} returns", pointer, session.tile);
                        self.snap_back(session.tile);
                    }
                }
                SessionPhase::LongPressPending { .. } => {
                    log::debug!("Pointer {} tapped tile {}", pointer, session.tile);
                }
                SessionPhase::MenuOpen => {}
            }
        }

        self.gestures.unregister(pointer, self.camera.offset);
    }

    fn wheel(&mut self, position: Point, delta: Vec2) {
        if self.camera.zoom_by(-delta.y * WHEEL_ZOOM_RATE, position) {
            self.sync_view();
        }
    }

    fn start_drag(&mut self, pointer: PointerId, tile: TileId, screen: Point) {
        let world = self.camera.screen_to_world(screen);
        let Some(t) = self.tiles.get_mut(&tile) else {
            return;
        };
        let cell = t.position();
        let origin = cell.origin(self.cell_size);
        let style = TileStyle::lifted(self.transition);
        t.cancel_animation();
        t.set_style(style);
        self.renderer.update_style(tile, style);
        self.renderer.show_preview(pointer, origin);

        self.gestures.insert_session(
            pointer,
            TileSession {
                tile,
                phase: SessionPhase::Dragging(DragSession {
                    shift: world - origin,
                    target: cell,
                    offset: origin,
                }),
            },
        );
        log::debug!("Pointer {} started dragging tile {} from {}", pointer, tile, cell);
        self.drag_to(pointer, screen);
    }

    /// Move a dragged tile under the pointer and retarget its drop cell.
    fn drag_to(&mut self, pointer: PointerId, screen: Point) {
        let world = self.camera.screen_to_world(screen);
        let cell = self.cell_size;
        let Some(session) = self.gestures.session_mut(pointer) else {
            return;
        };
        let tile = session.tile;
        let SessionPhase::Dragging(drag) = &mut session.phase else {
            return;
        };

        let offset = world - drag.shift;
        let center = offset + cell.to_vec2() * 0.5;
        let target = self.grid.find(center.x / cell.width, center.y / cell.height);
        let retarget = drag.target != target;
        drag.offset = offset;
        drag.target = target;

        if let Some(t) = self.tiles.get_mut(&tile) {
            t.set_visual_offset(offset);
        }
        self.renderer.update_position(tile, offset);
        if retarget {
            self.renderer.show_preview(pointer, target.origin(cell));
        }
    }

    fn commit_drag(&mut self, tile: TileId, target: Position) {
        if let Err(e) = self.move_tile(tile, target) {
            log::warn!("Dropping tile {} on {} failed: {}", tile, target, e);
            self.snap_back(tile);
        }
    }

    fn open_context_menu(&mut self, tile: TileId, position: Point) {
        if self.gestures.is_dragging() {
            log::debug!("Context menu suppressed while a tile is dragged");
            return;
        }
        self.gestures.open_menu(tile, position);
        self.renderer.show_context_menu(tile, position);
    }

    /// Turn a held touch into an open context menu.
    pub(crate) fn complete_long_press(&mut self, pointer: PointerId) {
        let Some(TileSession {
            tile,
            phase: SessionPhase::LongPressPending { origin, .. },
        }) = self.gestures.session(pointer).copied()
        else {
            return;
        };
        if self.gestures.is_dragging() {
            log::debug!("Long press on tile {} ignored while a tile is dragged", tile);
            self.gestures.remove_session(pointer);
            return;
        }
        if let Some(session) = self.gestures.session_mut(pointer) {
            session.phase = SessionPhase::MenuOpen;
        }
        log::debug!("Long press on tile {} by pointer {}", tile, pointer);
        self.open_context_menu(tile, origin);
    }
}
