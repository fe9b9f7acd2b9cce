//! Pointer events for unified mouse/touch/pen handling.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of one live pointer (a mouse, a finger, a pen).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointerId(pub u64);

impl fmt::Display for PointerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kind of device behind a pointer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerKind {
    #[default]
    Mouse,
    Touch,
    Pen,
}

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Check whether any modifier key is held.
    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt || self.meta
    }
}

/// Pointer event in screen coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PointerEvent {
    Down {
        pointer: PointerId,
        position: Point,
        #[serde(default)]
        kind: PointerKind,
        #[serde(default)]
        button: MouseButton,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Move {
        pointer: PointerId,
        position: Point,
    },
    Up {
        pointer: PointerId,
        position: Point,
    },
    /// The platform took the pointer away (e.g. a system gesture).
    Cancel {
        pointer: PointerId,
    },
    Wheel {
        position: Point,
        delta: Vec2,
    },
}

impl PointerEvent {
    /// Primary left-button mouse press, the common case.
    pub fn down(pointer: u64, position: Point) -> Self {
        Self::Down {
            pointer: PointerId(pointer),
            position,
            kind: PointerKind::Mouse,
            button: MouseButton::Left,
            modifiers: Modifiers::default(),
        }
    }

    pub fn touch(pointer: u64, position: Point) -> Self {
        Self::Down {
            pointer: PointerId(pointer),
            position,
            kind: PointerKind::Touch,
            button: MouseButton::Left,
            modifiers: Modifiers::default(),
        }
    }

    pub fn moved(pointer: u64, position: Point) -> Self {
        Self::Move {
            pointer: PointerId(pointer),
            position,
        }
    }

    pub fn up(pointer: u64, position: Point) -> Self {
        Self::Up {
            pointer: PointerId(pointer),
            position,
        }
    }

    /// Pointer this event belongs to. Wheel events have none.
    pub fn pointer(&self) -> Option<PointerId> {
        match self {
            Self::Down { pointer, .. }
            | Self::Move { pointer, .. }
            | Self::Up { pointer, .. }
            | Self::Cancel { pointer } => Some(*pointer),
            Self::Wheel { .. } => None,
        }
    }

    /// Screen position of the event, if it has one.
    pub fn position(&self) -> Option<Point> {
        match self {
            Self::Down { position, .. }
            | Self::Move { position, .. }
            | Self::Up { position, .. }
            | Self::Wheel { position, .. } => Some(*position),
            Self::Cancel { .. } => None,
        }
    }
}

/// Check whether `to` is more than `threshold` away from `from` on either axis.
pub fn exceeds_threshold(from: Point, to: Point, threshold: f64) -> bool {
    (to.x - from.x).abs() > threshold || (to.y - from.y).abs() > threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_json_defaults() {
        let event: PointerEvent =
            serde_json::from_str(r#"{"type":"down","pointer":3,"position":{"x":10.0,"y":20.0}}"#).unwrap();
        assert_eq!(event, PointerEvent::down(3, Point::new(10.0, 20.0)));

        let event: PointerEvent = serde_json::from_str(
            r#"{"type":"down","pointer":1,"position":{"x":0.0,"y":0.0},"kind":"touch","modifiers":{"ctrl":true}}"#,
        )
        .unwrap();
        match event {
            PointerEvent::Down { kind, modifiers, .. } => {
                assert_eq!(kind, PointerKind::Touch);
                assert!(modifiers.ctrl);
                assert!(modifiers.any());
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_pointer_accessor() {
        assert_eq!(PointerEvent::up(7, Point::ZERO).pointer(), Some(PointerId(7)));
        let wheel = PointerEvent::Wheel {
            position: Point::new(1.0, 2.0),
            delta: Vec2::new(0.0, -120.0),
        };
        assert_eq!(wheel.pointer(), None);
        assert_eq!(wheel.position(), Some(Point::new(1.0, 2.0)));
        assert_eq!(PointerEvent::Cancel { pointer: PointerId(1) }.position(), None);
    }

    #[test]
    fn test_threshold_is_per_axis() {
        let origin = Point::new(100.0, 100.0);
        assert!(!exceeds_threshold(origin, Point::new(110.0, 90.0), 10.0));
        assert!(!exceeds_threshold(origin, Point::new(107.0, 107.0), 10.0));
        assert!(exceeds_threshold(origin, Point::new(110.5, 100.0), 10.0));
        assert!(exceeds_threshold(origin, Point::new(100.0, 89.0), 10.0));
    }
}
