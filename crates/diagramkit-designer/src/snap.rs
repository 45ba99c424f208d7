//! Grid and neighbour-alignment snapping.
//!
//! Every function here is pure: the result depends only on the arguments
//! and the engine's explicit configuration.

use diagramkit_core::constants::{DEFAULT_GRID_SIZE, DEFAULT_SNAP_THRESHOLD};
use diagramkit_core::{Point, Rect};
use diagramkit_settings::{NeighborPolicy, SnapSettings};

use crate::model::Node;

/// Rounds each coordinate to the nearest multiple of `grid_size`.
///
/// Half-way values round up (toward positive infinity), so -10 on a
/// 20 grid lands on 0 and 10 lands on 20. A non-positive or non-finite grid leaves the point unchanged.
pub fn snap_to_grid(x: f64, y: f64, grid_size: f64) -> Point {
    if grid_size <= 0.0 || !grid_size.is_finite() {
        return Point::new(x, y);
    }
    Point::new(round_half_up(x, grid_size), round_half_up(y, grid_size))
}

fn round_half_up(value: f64, grid_size: f64) -> f64 {
    (value / grid_size + 0.5).floor() * grid_size
}

/// Aligns `rect` with the left/right and top/bottom edges of `others`.
///
/// An edge pair matches when the distance is strictly below `threshold`.
/// Each axis keeps one snapped value: under [`NeighborPolicy::LastMatch`]
/// the last match in iteration order wins (left is checked before right,
/// top before bottom); under [`NeighborPolicy::Closest`] the smallest
/// adjustment wins and earlier candidates win ties.
pub fn snap_to_neighbors<'a>(
    rect: &Rect,
    others: impl IntoIterator<Item = &'a Rect>,
    threshold: f64,
    policy: NeighborPolicy,
) -> Point {
    let mut x = AxisSnap::new(rect.x, policy);
    let mut y = AxisSnap::new(rect.y, policy);

    for other in others {
        let left = (rect.x - other.x).abs();
        if left < threshold {
            x.offer(other.x, left);
        }
        let right = (rect.right() - other.right()).abs();
        if right < threshold {
            x.offer(other.right() - rect.width, right);
        }
        let top = (rect.y - other.y).abs();
        if top < threshold {
            y.offer(other.y, top);
        }
        let bottom = (rect.bottom() - other.bottom()).abs();
        if bottom < threshold {
            y.offer(other.bottom() - rect.height, bottom);
        }
    }

    Point::new(x.value, y.value)
}

struct AxisSnap {
    value: f64,
    best: f64,
    policy: NeighborPolicy,
}

impl AxisSnap {
    fn new(value: f64, policy: NeighborPolicy) -> Self {
        Self {
            value,
            best: f64::INFINITY,
            policy,
        }
    }

    fn offer(&mut self, candidate: f64, distance: f64) {
        match self.policy {
            NeighborPolicy::LastMatch => self.value = candidate,
            NeighborPolicy::Closest => {
                if distance < self.best {
                    self.best = distance;
                    self.value = candidate;
                }
            }
        }
    }
}

/// Configured snapping, as used by drag sessions.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapEngine {
    pub enabled: bool,
    pub grid_size: f64,
    pub threshold: f64,
    pub policy: NeighborPolicy,
}

impl Default for SnapEngine {
    fn default() -> Self {
        Self {
            enabled: true,
            grid_size: DEFAULT_GRID_SIZE,
            threshold: DEFAULT_SNAP_THRESHOLD,
            policy: NeighborPolicy::default(),
        }
    }
}

impl SnapEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_settings(settings: &SnapSettings) -> Self {
        Self {
            enabled: settings.enabled,
            grid_size: settings.grid_size,
            threshold: settings.threshold,
            policy: settings.neighbor_policy,
        }
    }

    pub fn snap_to_grid(&self, x: f64, y: f64) -> Point {
        if !self.enabled {
            return Point::new(x, y);
        }
        snap_to_grid(x, y, self.grid_size)
    }

    /// Neighbour alignment for `node`; `others` may include `node` itself,
    /// which is skipped.
    pub fn snap_to_neighbors<'a>(
        &self,
        node: &Node,
        others: impl IntoIterator<Item = &'a Node>,
    ) -> Point {
        self.snap_rect_to_neighbors(&node.bounds(), others.into_iter().filter(|o| o.id != node.id))
    }

    fn snap_rect_to_neighbors<'a>(
        &self,
        rect: &Rect,
        others: impl IntoIterator<Item = &'a Node>,
    ) -> Point {
        if !self.enabled {
            return Point::new(rect.x, rect.y);
        }
        let bounds: Vec<Rect> = others.into_iter().map(Node::bounds).collect();
        snap_to_neighbors(rect, bounds.iter(), self.threshold, self.policy)
    }

    /// Snaps a proposed top-left position for `node`: grid first, then
    /// alignment with `others`, so an aligned edge wins over the grid.
    pub fn snap_position<'a>(
        &self,
        node: &Node,
        x: f64,
        y: f64,
        others: impl IntoIterator<Item = &'a Node>,
    ) -> Point {
        if !self.enabled {
            return Point::new(x, y);
        }
        let gridded = snap_to_grid(x, y, self.grid_size);
        let rect = Rect::new(gridded.x, gridded.y, node.width, node.height);
        self.snap_rect_to_neighbors(&rect, others.into_iter().filter(|o| o.id != node.id))
    }

    /// Rounds a size to the grid, never below one grid cell.
    pub fn snap_size(&self, width: f64, height: f64) -> (f64, f64) {
        if !self.enabled || self.grid_size <= 0.0 || !self.grid_size.is_finite() {
            return (width, height);
        }
        let snapped = snap_to_grid(width, height, self.grid_size);
        (snapped.x.max(self.grid_size), snapped.y.max(self.grid_size))
    }
}
