//! Viewport and coordinate transformation for canvas rendering.
//!
//! Handles conversion between screen space (pixels, origin at the top-left
//! of the canvas) and document space. Both spaces point +Y down, so the
//! mapping is a plain scale followed by a translation:
//!
//! ```text
//! screen = document * zoom + pan
//! document = (screen - pan) / zoom
//! ```

use std::fmt;
use std::sync::Arc;

use diagramkit_core::constants::{
    DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH, MAX_ZOOM, MIN_ZOOM, VIEW_PADDING, ZOOM_STEP,
};
use diagramkit_core::{DiagramEvent, EventBus, Point, Rect, ViewportEvent};
use diagramkit_settings::ViewportSettings;
use serde::{Deserialize, Serialize};

/// Persisted pan/zoom state, the `viewport` object of a document file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportState {
    pub pan_x: f64,
    pub pan_y: f64,
    pub zoom: f64,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            pan_x: 0.0,
            pan_y: 0.0,
            zoom: 1.0,
        }
    }
}

/// Pan/zoom state plus the canvas size it is applied to.
#[derive(Debug, Clone)]
pub struct ViewportTransform {
    zoom: f64,
    pan_x: f64,
    pan_y: f64,
    canvas_width: f64,
    canvas_height: f64,
    min_zoom: f64,
    max_zoom: f64,
    zoom_step: f64,
    events: Arc<EventBus>,
}

impl ViewportTransform {
    pub fn new(events: Arc<EventBus>) -> Self {
        Self {
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
            canvas_width: DEFAULT_CANVAS_WIDTH,
            canvas_height: DEFAULT_CANVAS_HEIGHT,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            zoom_step: ZOOM_STEP,
            events,
        }
    }

    /// Applies zoom limits and step from configuration, re-clamping the
    /// current zoom.
    pub fn with_settings(mut self, settings: &ViewportSettings) -> Self {
        self.apply_settings(settings);
        self
    }

    pub fn apply_settings(&mut self, settings: &ViewportSettings) {
        self.min_zoom = settings.min_zoom;
        self.max_zoom = settings.max_zoom;
        self.zoom_step = settings.zoom_step;
        let zoom = self.zoom;
        self.set_zoom(zoom);
    }

    pub fn canvas_width(&self) -> f64 {
        self.canvas_width
    }

    pub fn canvas_height(&self) -> f64 {
        self.canvas_height
    }

    /// Sets the canvas dimensions (typically called when the host resizes).
    pub fn set_canvas_size(&mut self, width: f64, height: f64) {
        self.canvas_width = width;
        self.canvas_height = height;
    }

    /// Current zoom level (1.0 = 100%).
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn pan_x(&self) -> f64 {
        self.pan_x
    }

    pub fn pan_y(&self) -> f64 {
        self.pan_y
    }

    pub fn zoom_limits(&self) -> (f64, f64) {
        (self.min_zoom, self.max_zoom)
    }

    fn clamp_zoom(&self, zoom: f64) -> f64 {
        if zoom.is_finite() {
            zoom.clamp(self.min_zoom, self.max_zoom)
        } else {
            self.zoom
        }
    }

    /// Sets the zoom level, clamped to the configured limits.
    pub fn set_zoom(&mut self, zoom: f64) {
        let before = self.state();
        self.zoom = self.clamp_zoom(zoom);
        self.changed(before);
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom * self.zoom_step);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom / self.zoom_step);
    }

    /// Zooms while keeping the document point under `screen_point` fixed on
    /// screen ("zoom to cursor").
    pub fn zoom_at(&mut self, screen_point: Point, zoom: f64) {
        let before = self.state();
        let anchor = self.screen_to_document(screen_point);
        self.zoom = self.clamp_zoom(zoom);
        self.pan_x = screen_point.x - anchor.x * self.zoom;
        self.pan_y = screen_point.y - anchor.y * self.zoom;
        self.changed(before);
    }

    pub fn zoom_in_at(&mut self, screen_point: Point) {
        self.zoom_at(screen_point, self.zoom * self.zoom_step);
    }

    pub fn zoom_out_at(&mut self, screen_point: Point) {
        self.zoom_at(screen_point, self.zoom / self.zoom_step);
    }

    pub fn set_pan(&mut self, x: f64, y: f64) {
        let before = self.state();
        self.pan_x = x;
        self.pan_y = y;
        self.changed(before);
    }

    /// Pans by a screen-space delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.set_pan(self.pan_x + dx, self.pan_y + dy);
    }

    pub fn screen_to_document(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.pan_x) / self.zoom,
            (screen.y - self.pan_y) / self.zoom,
        )
    }

    pub fn document_to_screen(&self, point: Point) -> Point {
        Point::new(point.x * self.zoom + self.pan_x, point.y * self.zoom + self.pan_y)
    }

    /// Converts a screen-space distance (e.g. a pointer delta) to document units.
    pub fn screen_delta_to_document(&self, dx: f64, dy: f64) -> (f64, f64) {
        (dx / self.zoom, dy / self.zoom)
    }

    /// Document-space rectangle currently visible on the canvas.
    pub fn visible_rect(&self) -> Rect {
        let top_left = self.screen_to_document(Point::new(0.0, 0.0));
        Rect::new(
            top_left.x,
            top_left.y,
            self.canvas_width / self.zoom,
            self.canvas_height / self.zoom,
        )
    }

    /// Fits `bounds` into the canvas, reserving `padding` (a fraction of the
    /// canvas, 0.0 - 0.5) on each side, and centers it.
    ///
    /// Degenerate bounds only re-center without changing the zoom.
    pub fn fit_to_bounds(&mut self, bounds: &Rect, padding: f64) {
        let before = self.state();
        let padding_factor = (1.0 - padding.clamp(0.0, 0.49) * 2.0).max(f64::EPSILON);

        if bounds.width > 0.0 && bounds.height > 0.0 {
            let zoom_x = self.canvas_width * padding_factor / bounds.width;
            let zoom_y = self.canvas_height * padding_factor / bounds.height;
            self.zoom = self.clamp_zoom(zoom_x.min(zoom_y));
        }

        let center = bounds.center();
        self.pan_x = self.canvas_width / 2.0 - center.x * self.zoom;
        self.pan_y = self.canvas_height / 2.0 - center.y * self.zoom;
        self.changed(before);
    }

    /// Fits `bounds` with the default padding.
    pub fn fit_to_view(&mut self, bounds: &Rect) {
        self.fit_to_bounds(bounds, VIEW_PADDING);
    }

    /// Scrolls so that `point` sits at the canvas center.
    pub fn center_on(&mut self, point: Point) {
        self.set_pan(
            self.canvas_width / 2.0 - point.x * self.zoom,
            self.canvas_height / 2.0 - point.y * self.zoom,
        );
    }

    /// Back to 1:1 zoom with the document origin at the canvas origin.
    pub fn reset(&mut self) {
        self.set_state(ViewportState::default());
    }

    pub fn state(&self) -> ViewportState {
        ViewportState {
            pan_x: self.pan_x,
            pan_y: self.pan_y,
            zoom: self.zoom,
        }
    }

    /// Restores persisted pan/zoom. The zoom is clamped like any other.
    pub fn set_state(&mut self, state: ViewportState) {
        let before = self.state();
        self.zoom = self.clamp_zoom(state.zoom);
        self.pan_x = state.pan_x;
        self.pan_y = state.pan_y;
        self.changed(before);
    }

    fn changed(&self, before: ViewportState) {
        let now = self.state();
        if now != before {
            self.events
                .emit(DiagramEvent::Viewport(ViewportEvent::Changed {
                    pan_x: now.pan_x,
                    pan_y: now.pan_y,
                    zoom: now.zoom,
                }));
        }
    }
}

impl fmt::Display for ViewportTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Zoom: {:.2}x | Pan: ({:.1}, {:.1})",
            self.zoom, self.pan_x, self.pan_y
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> ViewportTransform {
        ViewportTransform::new(Arc::new(EventBus::new()))
    }

    fn assert_close(a: Point, b: Point) {
        assert!((a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9, "{:?} != {:?}", a, b);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut vp = viewport();
        vp.set_zoom(100.0);
        assert_eq!(vp.zoom(), MAX_ZOOM);
        vp.set_zoom(0.0001);
        assert_eq!(vp.zoom(), MIN_ZOOM);
        vp.set_zoom(f64::NAN);
        assert_eq!(vp.zoom(), MIN_ZOOM);
    }

    #[test]
    fn test_coordinate_round_trip() {
        let mut vp = viewport();
        vp.set_zoom(2.0);
        vp.set_pan(30.0, -40.0);

        let doc = Point::new(12.5, 80.0);
        let screen = vp.document_to_screen(doc);
        assert_eq!(screen, Point::new(55.0, 120.0));
        assert_close(vp.screen_to_document(screen), doc);
    }

    #[test]
    fn test_zoom_at_keeps_anchor_fixed() {
        let mut vp = viewport();
        vp.set_pan(10.0, 20.0);
        let cursor = Point::new(300.0, 200.0);
        let under_cursor = vp.screen_to_document(cursor);

        vp.zoom_in_at(cursor);
        assert!((vp.zoom() - ZOOM_STEP).abs() < 1e-12);
        assert_close(vp.screen_to_document(cursor), under_cursor);
    }

    #[test]
    fn test_fit_to_bounds_centers_content() {
        let mut vp = viewport();
        let bounds = Rect::new(100.0, 100.0, 400.0, 200.0);
        vp.fit_to_bounds(&bounds, 0.0);

        // Width-limited: 1200 / 400
        assert!((vp.zoom() - 3.0).abs() < 1e-12);
        assert_close(
            vp.document_to_screen(bounds.center()),
            Point::new(600.0, 400.0),
        );
    }

    #[test]
    fn test_visible_rect() {
        let mut vp = viewport();
        vp.set_zoom(2.0);
        vp.set_pan(-100.0, -50.0);
        assert_eq!(vp.visible_rect(), Rect::new(50.0, 25.0, 600.0, 400.0));
    }

    #[test]
    fn test_changes_emit_once() {
        let bus = EventBus::recording();
        let mut vp = ViewportTransform::new(bus.clone());

        vp.pan_by(5.0, 0.0);
        vp.set_pan(5.0, 0.0); // unchanged
        vp.set_zoom(MAX_ZOOM * 2.0);
        vp.zoom_in(); // already at max

        assert_eq!(
            bus.history_names(),
            vec!["viewport:changed", "viewport:changed"]
        );
    }

    #[test]
    fn test_settings_narrow_zoom_range() {
        let mut vp = viewport();
        vp.set_zoom(4.0);
        vp.apply_settings(&ViewportSettings {
            min_zoom: 0.5,
            max_zoom: 2.0,
            zoom_step: 1.5,
        });
        assert_eq!(vp.zoom(), 2.0);
        vp.zoom_out();
        assert!((vp.zoom() - 2.0 / 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_state_serializes_camel_case() {
        let json = serde_json::to_value(ViewportState {
            pan_x: 1.0,
            pan_y: 2.0,
            zoom: 1.5,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"panX": 1.0, "panY": 2.0, "zoom": 1.5}));
    }
}
