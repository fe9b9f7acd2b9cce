//! Pointer bookkeeping and gesture arbitration.
//!
//! The [`PointerCoordinator`] owns two tables:
//!
//! - **board pointers**: every live pointer, used for panning and pinching.
//! - **tile sessions**: pointers pressed on a tile, each either waiting for a
//!   long press, dragging the tile, or holding an open context menu.
//!
//! It only tracks state. Deciding what an event means, and mutating tiles
//! and the camera, is done by the board.

use crate::input::PointerId;
use crate::position::Position;
use crate::tile::TileId;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};
#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

/// Thresholds for touch gesture recognition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Hold time before a stationary touch opens the context menu.
    pub long_press_ms: u64,
    /// Movement (screen px, either axis) that turns a touch into a drag.
    pub move_threshold: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            long_press_ms: 500,
            move_threshold: 10.0,
        }
    }
}

impl GestureConfig {
    pub fn long_press(&self) -> Duration {
        Duration::from_millis(self.long_press_ms)
    }
}

/// A live pointer in the pan/zoom table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardPointer {
    /// Last seen screen position.
    pub last: Point,
    /// Pointer position minus board offset, fixed while panning.
    pub shift: Vec2,
}

/// A tile being relocated by one pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    /// Pointer offset inside the tile, in board units.
    pub shift: Vec2,
    /// Cell the tile would land on if released now.
    pub target: Position,
    /// Current visual offset of the tile, in board units.
    pub offset: Point,
}

/// What a pointer pressed on a tile is doing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionPhase {
    /// Touch held still; becomes a context menu at `deadline`.
    LongPressPending { origin: Point, deadline: Instant },
    Dragging(DragSession),
    /// Long press completed; the pointer no longer moves the tile.
    MenuOpen,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileSession {
    pub tile: TileId,
    pub phase: SessionPhase,
}

impl TileSession {
    pub fn drag(&self) -> Option<&DragSession> {
        match &self.phase {
            SessionPhase::Dragging(drag) => Some(drag),
            _ => None,
        }
    }
}

/// Coarse drag state of a tile, for observers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DragPhase {
    #[default]
    Idle,
    LongPressPending,
    Dragging,
    MenuOpen,
}

impl From<&SessionPhase> for DragPhase {
    fn from(phase: &SessionPhase) -> Self {
        match phase {
            SessionPhase::LongPressPending { .. } => DragPhase::LongPressPending,
            SessionPhase::Dragging(_) => DragPhase::Dragging,
            SessionPhase::MenuOpen => DragPhase::MenuOpen,
        }
    }
}

/// An open context menu.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContextMenu {
    pub tile: TileId,
    /// Screen position the menu was opened at.
    pub position: Point,
}

/// Reference values of an ongoing pinch.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct PinchBaseline {
    prev_distance: f64,
    last_center: Option<Point>,
}

/// One pinch update, to be applied to the camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchStep {
    /// Midpoint of the two pointers (zoom anchor).
    pub center: Point,
    /// Ratio of current to previous distance.
    pub factor: f64,
    /// Movement of the midpoint since the previous step.
    pub pan: Vec2,
}

/// Live pointer and tile-session tables of one board.
#[derive(Debug, Clone, Default)]
pub struct PointerCoordinator {
    pointers: BTreeMap<PointerId, BoardPointer>,
    sessions: BTreeMap<PointerId, TileSession>,
    pinch: PinchBaseline,
    menu: Option<ContextMenu>,
}

impl PointerCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pointer to the pan/zoom table.
    pub fn register(&mut self, pointer: PointerId, position: Point, board_offset: Vec2) {
        self.pointers.insert(
            pointer,
            BoardPointer {
                last: position,
                shift: position.to_vec2() - board_offset,
            },
        );
    }

    /// Drop a pointer and re-base the others for a fresh pan.
    pub fn unregister(&mut self, pointer: PointerId, board_offset: Vec2) -> Option<BoardPointer> {
        let removed = self.pointers.remove(&pointer);
        if removed.is_some() {
            self.reset_pinch();
            for remaining in self.pointers.values_mut() {
                remaining.shift = remaining.last.to_vec2() - board_offset;
            }
        }
        removed
    }

    /// Record a new position. Returns false for unknown pointers.
    pub fn update_last(&mut self, pointer: PointerId, position: Point) -> bool {
        match self.pointers.get_mut(&pointer) {
            Some(entry) => {
                entry.last = position;
                true
            }
            None => false,
        }
    }

    pub fn pointer(&self, pointer: PointerId) -> Option<&BoardPointer> {
        self.pointers.get(&pointer)
    }

    pub fn pointer_count(&self) -> usize {
        self.pointers.len()
    }

    /// Board offset that keeps the pointer over the spot it grabbed.
    pub fn pan_target(&self, pointer: PointerId) -> Option<Vec2> {
        self.pointers
            .get(&pointer)
            .map(|p| p.last.to_vec2() - p.shift)
    }

    /// Advance the pinch over the two lowest pointer ids.
    ///
    /// The first call after a reset only records the baseline.
    pub fn pinch_step(&mut self) -> Option<PinchStep> {
        let mut live = self.pointers.values();
        let a = live.next()?.last;
        let b = live.next()?.last;

        let distance = (a - b).hypot();
        let center = a.midpoint(b);
        let prev = self.pinch;
        self.pinch = PinchBaseline {
            prev_distance: distance,
            last_center: Some(center),
        };

        if prev.prev_distance <= 0.0 || distance <= 0.0 {
            return None;
        }
        Some(PinchStep {
            center,
            factor: distance / prev.prev_distance,
            pan: prev.last_center.map_or(Vec2::ZERO, |last| center - last),
        })
    }

    pub fn reset_pinch(&mut self) {
        self.pinch = PinchBaseline::default();
    }

    pub fn session(&self, pointer: PointerId) -> Option<&TileSession> {
        self.sessions.get(&pointer)
    }

    pub fn session_mut(&mut self, pointer: PointerId) -> Option<&mut TileSession> {
        self.sessions.get_mut(&pointer)
    }

    pub fn insert_session(&mut self, pointer: PointerId, session: TileSession) {
        self.sessions.insert(pointer, session);
    }

    pub fn remove_session(&mut self, pointer: PointerId) -> Option<TileSession> {
        self.sessions.remove(&pointer)
    }

    pub fn sessions(&self) -> impl Iterator<Item = &TileSession> {
        self.sessions.values()
    }

    /// Pointer holding a session on `tile`.
    pub fn session_for_tile(&self, tile: TileId) -> Option<PointerId> {
        self.sessions
            .iter()
            .find(|(_, session)| session.tile == tile)
            .map(|(pointer, _)| *pointer)
    }

    /// Remove and return every session.
    pub fn drain_sessions(&mut self) -> Vec<(PointerId, TileSession)> {
        std::mem::take(&mut self.sessions).into_iter().collect()
    }

    pub fn has_sessions(&self) -> bool {
        !self.sessions.is_empty()
    }

    /// Check whether any tile is being dragged.
    pub fn is_dragging(&self) -> bool {
        self.sessions.values().any(|s| s.drag().is_some())
    }

    /// Drag state of a tile.
    pub fn tile_phase(&self, tile: TileId) -> DragPhase {
        self.sessions
            .values()
            .find(|s| s.tile == tile)
            .map_or(DragPhase::Idle, |s| DragPhase::from(&s.phase))
    }

    /// Pointers whose long press has completed by `now`.
    pub fn due_long_presses(&self, now: Instant) -> Vec<PointerId> {
        self.sessions
            .iter()
            .filter(|(_, s)| matches!(s.phase, SessionPhase::LongPressPending { deadline, .. } if deadline <= now))
            .map(|(pointer, _)| *pointer)
            .collect()
    }

    pub fn open_menu(&mut self, tile: TileId, position: Point) {
        self.menu = Some(ContextMenu { tile, position });
    }

    pub fn close_menu(&mut self) -> Option<ContextMenu> {
        self.menu.take()
    }

    pub fn menu(&self) -> Option<&ContextMenu> {
        self.menu.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    const P1: PointerId = PointerId(1);
    const P2: PointerId = PointerId(2);

    #[test]
    fn test_pan_target_follows_pointer() {
        let mut coordinator = PointerCoordinator::new();
        let offset = Vec2::new(10.0, 200.0);
        coordinator.register(P1, Point::new(50.0, 250.0), offset);
        assert_eq!(coordinator.pan_target(P1), Some(offset));

        coordinator.update_last(P1, Point::new(80.0, 240.0));
        assert_eq!(coordinator.pan_target(P1), Some(Vec2::new(40.0, 190.0)));
        assert!(!coordinator.update_last(P2, Point::ZERO));
    }

    #[test]
    fn test_pinch_needs_baseline() {
        let mut coordinator = PointerCoordinator::new();
        coordinator.register(P1, Point::new(0.0, 0.0), Vec2::ZERO);
        coordinator.register(P2, Point::new(100.0, 0.0), Vec2::ZERO);

        assert_eq!(coordinator.pinch_step(), None);

        coordinator.update_last(P2, Point::new(200.0, 0.0));
        let step = coordinator.pinch_step().unwrap();
        assert!((step.factor - 2.0).abs() < 1e-12);
        assert_eq!(step.center, Point::new(100.0, 0.0));
        assert_eq!(step.pan, Vec2::new(50.0, 0.0));
    }

    #[test]
    fn test_pinch_with_single_pointer() {
        let mut coordinator = PointerCoordinator::new();
        coordinator.register(P1, Point::ZERO, Vec2::ZERO);
        assert_eq!(coordinator.pinch_step(), None);
    }

    #[test]
    fn test_unregister_rebases_remaining() {
        let mut coordinator = PointerCoordinator::new();
        coordinator.register(P1, Point::new(0.0, 0.0), Vec2::ZERO);
        coordinator.register(P2, Point::new(100.0, 0.0), Vec2::ZERO);
        coordinator.pinch_step();
        coordinator.update_last(P2, Point::new(150.0, 30.0));

        let offset = Vec2::new(-20.0, 5.0);
        assert!(coordinator.unregister(P1, offset).is_some());
        assert_eq!(coordinator.pointer_count(), 1);
        // Remaining pointer starts a fresh pan from the current offset.
        assert_eq!(coordinator.pan_target(P2), Some(offset));

        coordinator.register(P1, Point::new(0.0, 0.0), offset);
        assert_eq!(coordinator.pinch_step(), None);
    }

    #[test]
    fn test_sessions_and_long_press() {
        let mut coordinator = PointerCoordinator::new();
        let tile = Uuid::new_v4();
        let now = Instant::now();
        coordinator.insert_session(
            P1,
            TileSession {
                tile,
                phase: SessionPhase::LongPressPending {
                    origin: Point::ZERO,
                    deadline: now + Duration::from_millis(500),
                },
            },
        );
        assert_eq!(coordinator.tile_phase(tile), DragPhase::LongPressPending);
        assert_eq!(coordinator.session_for_tile(tile), Some(P1));
        assert!(!coordinator.is_dragging());
        assert!(coordinator.due_long_presses(now).is_empty());
        assert_eq!(coordinator.due_long_presses(now + Duration::from_millis(500)), vec![P1]);

        let drained = coordinator.drain_sessions();
        assert_eq!(drained.len(), 1);
        assert!(!coordinator.has_sessions());
        assert_eq!(coordinator.tile_phase(tile), DragPhase::Idle);
    }

    #[test]
    fn test_menu() {
        let mut coordinator = PointerCoordinator::new();
        let tile = Uuid::new_v4();
        coordinator.open_menu(tile, Point::new(3.0, 4.0));
        assert_eq!(coordinator.menu().map(|m| m.tile), Some(tile));
        assert!(coordinator.close_menu().is_some());
        assert!(coordinator.menu().is_none());
    }
}
