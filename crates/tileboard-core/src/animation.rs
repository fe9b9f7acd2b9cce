//! Tile styling transitions and their scheduled revert steps.
//!
//! Every tile holds at most one [`PendingAnimation`]. Installing a new one
//! drops the previous token, so a revert scheduled by an older move can
//! never overwrite the style of a newer drag.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};
#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

/// Default length of a tile transition.
pub const DEFAULT_TRANSITION: Duration = Duration::from_millis(300);

/// Stacking level of a tile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Elevation {
    /// Sitting in its cell.
    #[default]
    Resting,
    /// Raised above every other tile while dragged.
    Lifted,
}

/// Which properties are animated, and for how long.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transition {
    #[default]
    None,
    All(Duration),
    Transform(Duration),
    BorderRadius(Duration),
}

/// Visual state of a tile as pushed to the renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileStyle {
    pub elevation: Elevation,
    /// Rounded corners (shown while the tile is picked up).
    pub rounded: bool,
    pub transition: Transition,
}

impl TileStyle {
    /// Style of a tile at rest.
    pub const RESTING: Self = Self {
        elevation: Elevation::Resting,
        rounded: false,
        transition: Transition::None,
    };

    /// Style of a tile that has just been picked up.
    pub fn lifted(duration: Duration) -> Self {
        Self {
            elevation: Elevation::Lifted,
            rounded: true,
            transition: Transition::BorderRadius(duration),
        }
    }

    pub fn is_lifted(&self) -> bool {
        self.elevation == Elevation::Lifted
    }
}

/// Ordered style steps waiting for their deadline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingAnimation {
    steps: VecDeque<(Instant, TileStyle)>,
}

impl PendingAnimation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step. Deadlines are expected in ascending order.
    pub fn then(mut self, at: Instant, style: TileStyle) -> Self {
        self.steps.push_back((at, style));
        self
    }

    /// Pop every step whose deadline has passed and return the latest one.
    pub fn poll(&mut self, now: Instant) -> Option<TileStyle> {
        let mut latest = None;
        while let Some(&(at, style)) = self.steps.front() {
            if at > now {
                break;
            }
            latest = Some(style);
            self.steps.pop_front();
        }
        latest
    }

    /// Deadline of the next step.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.steps.front().map(|(at, _)| *at)
    }

    pub fn is_finished(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Transition played when a tile lands on a cell.
///
/// Returns the style to apply right away and the pending reverts: corners
/// and elevation reset after one `duration`, the transition itself is
/// cleared after two.
pub fn settle(now: Instant, current: TileStyle, duration: Duration) -> (TileStyle, PendingAnimation) {
    let moving = TileStyle {
        transition: Transition::All(duration),
        ..current
    };
    let landed = TileStyle {
        elevation: Elevation::Resting,
        rounded: false,
        transition: Transition::All(duration),
    };
    let pending = PendingAnimation::new()
        .then(now + duration, landed)
        .then(now + duration * 2, TileStyle::RESTING);
    (moving, pending)
}

/// Transition played when a drag is abandoned and the tile returns home.
pub fn snap_back(now: Instant, current: TileStyle, duration: Duration) -> (TileStyle, PendingAnimation) {
    let moving = TileStyle {
        transition: Transition::Transform(duration),
        ..current
    };
    let pending = PendingAnimation::new().then(now + duration, TileStyle::RESTING);
    (moving, pending)
}
