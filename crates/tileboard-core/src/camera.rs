//! Camera module for board pan/zoom transforms.

use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

/// Smallest allowed zoom.
pub const MIN_ZOOM: f64 = 0.5;
/// Largest allowed zoom.
pub const MAX_ZOOM: f64 = 2.0;
/// Where the board sits on screen before the user pans it.
pub const DEFAULT_OFFSET: Vec2 = Vec2::new(10.0, 200.0);
/// Zoom change per wheel delta unit.
pub const WHEEL_ZOOM_RATE: f64 = 0.001;

/// Camera manages the view transform of the board.
///
/// Screen coordinates are `offset + zoom * board`. Board coordinates are
/// the unscaled layout space in which a cell at `(x, y)` starts at
/// `(x * cell_width, y * cell_height)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Current translation offset (pan)
    pub offset: Vec2,
    /// Current zoom level
    pub zoom: f64,
    /// Minimum allowed zoom level
    pub min_zoom: f64,
    /// Maximum allowed zoom level
    pub max_zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: DEFAULT_OFFSET,
            zoom: 1.0,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
        }
    }
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a camera at the given offset with custom zoom bounds.
    pub fn with_bounds(offset: Vec2, min_zoom: f64, max_zoom: f64) -> Self {
        let min_zoom = min_zoom.min(max_zoom);
        Self {
            offset,
            zoom: 1.0_f64.clamp(min_zoom, max_zoom),
            min_zoom,
            max_zoom,
        }
    }

    /// Get the affine transform for rendering.
    ///
    /// This transform converts board coordinates to screen coordinates.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.zoom)
    }

    /// Get the inverse transform for input handling.
    ///
    /// This transform converts screen coordinates to board coordinates.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.offset)
    }

    /// Convert a screen point to board coordinates.
    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    /// Convert a board point to screen coordinates.
    pub fn world_to_screen(&self, world_point: Point) -> Point {
        self.transform() * world_point
    }

    /// Pan the camera by a delta in screen coordinates.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Place the board at an absolute screen offset.
    pub fn move_to(&mut self, offset: Vec2) {
        self.offset = offset;
    }

    /// Multiply the zoom by `factor`, keeping the given screen point fixed.
    pub fn zoom_at(&mut self, anchor: Point, factor: f64) -> bool {
        self.set_zoom_at(self.zoom * factor, anchor)
    }

    /// Add `amount` to the zoom, keeping the given screen point fixed.
    pub fn zoom_by(&mut self, amount: f64, anchor: Point) -> bool {
        self.set_zoom_at(self.zoom + amount, anchor)
    }

    /// Set the zoom (clamped), keeping `anchor` fixed on screen.
    ///
    /// Returns false when the clamped zoom is unchanged.
    pub fn set_zoom_at(&mut self, zoom: f64, anchor: Point) -> bool {
        if !zoom.is_finite() {
            return false;
        }
        let new_zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return false;
        }

        let anchor = anchor.to_vec2();
        self.offset = (self.offset - anchor) * (new_zoom / self.zoom) + anchor;
        self.zoom = new_zoom;
        true
    }

    /// Reset camera to default position and zoom.
    pub fn reset(&mut self) {
        self.offset = DEFAULT_OFFSET;
        self.zoom = 1.0_f64.clamp(self.min_zoom, self.max_zoom);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at_origin() -> Camera {
        let mut camera = Camera::new();
        camera.offset = Vec2::ZERO;
        camera
    }

    #[test]
    fn test_default_camera() {
        let camera = Camera::new();
        assert_eq!(camera.offset, DEFAULT_OFFSET);
        assert!((camera.zoom - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_screen_to_world_with_offset() {
        let mut camera = at_origin();
        camera.offset = Vec2::new(50.0, 100.0);
        let world = camera.screen_to_world(Point::new(100.0, 200.0));
        assert!((world.x - 50.0).abs() < f64::EPSILON);
        assert!((world.y - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_screen_to_world_with_zoom() {
        let mut camera = at_origin();
        camera.zoom = 2.0;
        let world = camera.screen_to_world(Point::new(100.0, 200.0));
        assert!((world.x - 50.0).abs() < f64::EPSILON);
        assert!((world.y - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_roundtrip_conversion() {
        let mut camera = Camera::new();
        camera.offset = Vec2::new(30.0, -20.0);
        camera.zoom = 1.5;

        let original = Point::new(123.0, 456.0);
        let back = camera.world_to_screen(camera.screen_to_world(original));

        assert!((back.x - original.x).abs() < 1e-10);
        assert!((back.y - original.y).abs() < 1e-10);
    }

    #[test]
    fn test_zoom_clamp() {
        let mut camera = Camera::new();
        camera.zoom_at(Point::ZERO, 0.001);
        assert!((camera.zoom - MIN_ZOOM).abs() < f64::EPSILON);

        camera.zoom_at(Point::ZERO, 1000.0);
        assert!((camera.zoom - MAX_ZOOM).abs() < f64::EPSILON);

        assert!(!camera.zoom_at(Point::ZERO, 2.0));
        assert!(!camera.zoom_at(Point::ZERO, f64::NAN));
    }

    #[test]
    fn test_zoom_keeps_anchor_fixed() {
        let mut camera = Camera::new();
        let anchor = Point::new(400.0, 300.0);
        let under_anchor = camera.screen_to_world(anchor);

        assert!(camera.zoom_at(anchor, 1.5));
        let back = camera.world_to_screen(under_anchor);
        assert!((back.x - anchor.x).abs() < 1e-9);
        assert!((back.y - anchor.y).abs() < 1e-9);

        // newTranslate = (oldTranslate - anchor) * ratio + anchor
        let expected = (DEFAULT_OFFSET - anchor.to_vec2()) * 1.5 + anchor.to_vec2();
        assert!((camera.offset - expected).hypot() < 1e-9);
    }

    #[test]
    fn test_zoom_by_is_additive() {
        let mut camera = Camera::new();
        camera.zoom_by(-100.0 * -WHEEL_ZOOM_RATE, Point::ZERO);
        assert!((camera.zoom - 1.1).abs() < 1e-12);
    }

    #[test]
    fn test_pan() {
        let mut camera = at_origin();
        camera.pan(Vec2::new(10.0, 20.0));
        assert!((camera.offset.x - 10.0).abs() < f64::EPSILON);
        assert!((camera.offset.y - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reset() {
        let mut camera = Camera::new();
        camera.pan(Vec2::new(5.0, 5.0));
        camera.zoom_at(Point::ZERO, 1.7);
        camera.reset();
        assert_eq!(camera, Camera::new());
    }
}
