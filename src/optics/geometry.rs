//! Segment and rectangle intersection primitives
//!
//! Everything here works in scene space: x grows to the right, y grows
//! downward (screen convention).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{CONTAIN_EPSILON, PARALLEL_EPSILON, PARAM_EPSILON};

/// A directed line segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub from: Vec2,
    pub to: Vec2,
}

impl Segment {
    pub fn new(from: Vec2, to: Vec2) -> Self {
        Self { from, to }
    }

    /// Segment starting at `origin` running `length` along `direction`
    pub fn cast(origin: Vec2, direction: Vec2, length: f32) -> Self {
        Self::new(origin, origin + direction * length)
    }

    #[inline]
    pub fn length(&self) -> f32 {
        (self.to - self.from).length()
    }

    #[inline]
    pub fn midpoint(&self) -> Vec2 {
        (self.from + self.to) * 0.5
    }

    /// Intersection point with another segment, if they cross
    #[inline]
    pub fn intersect(&self, other: &Segment) -> Option<Vec2> {
        segment_intersect(self.from, self.to, other.from, other.to)
    }
}

/// Intersect segment `p1 -> p2` with segment `p3 -> p4`
///
/// Parametric determinant form. Returns `None` when the segments are
/// parallel (or degenerate) or when the crossing lies outside either one.
pub fn segment_intersect(p1: Vec2, p2: Vec2, p3: Vec2, p4: Vec2) -> Option<Vec2> {
    let denom = (p1.x - p2.x) * (p3.y - p4.y) - (p1.y - p2.y) * (p3.x - p4.x);
    if denom.abs() < PARALLEL_EPSILON {
        return None;
    }

    let t = ((p1.x - p3.x) * (p3.y - p4.y) - (p1.y - p3.y) * (p3.x - p4.x)) / denom;
    let u = -((p1.x - p2.x) * (p1.y - p3.y) - (p1.y - p2.y) * (p1.x - p3.x)) / denom;

    let range = -PARAM_EPSILON..=1.0 + PARAM_EPSILON;
    if range.contains(&t) && range.contains(&u) {
        Some(p1 + (p2 - p1) * t.clamp(0.0, 1.0))
    } else {
        None
    }
}

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Rectangle centred on `center` with full extent `size`
    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self::new(center - half, center + half)
    }

    /// Rectangle with top-left corner `origin` and full extent `size`
    pub fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Self::new(origin, origin + size)
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Length of the diagonal
    #[inline]
    pub fn diagonal(&self) -> f32 {
        (self.max - self.min).length()
    }

    /// True when both extents are strictly positive (false for NaN)
    pub fn has_area(&self) -> bool {
        self.width() > 0.0 && self.height() > 0.0
    }

    /// Point-in-rectangle test, inclusive of the edges
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x - CONTAIN_EPSILON
            && p.x <= self.max.x + CONTAIN_EPSILON
            && p.y >= self.min.y - CONTAIN_EPSILON
            && p.y <= self.max.y + CONTAIN_EPSILON
    }

    /// True when `other` lies entirely within this rectangle
    pub fn contains_rect(&self, other: &Rect) -> bool {
        self.contains(other.min) && self.contains(other.max)
    }

    /// True when the interiors overlap (touching edges do not count)
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }

    /// The four edges: top, right, bottom, left
    pub fn edges(&self) -> [Segment; 4] {
        let top_right = Vec2::new(self.max.x, self.min.y);
        let bottom_left = Vec2::new(self.min.x, self.max.y);
        [
            Segment::new(self.min, top_right),
            Segment::new(top_right, self.max),
            Segment::new(self.max, bottom_left),
            Segment::new(bottom_left, self.min),
        ]
    }
}

/// Cast a ray against a rectangle, returning the nearest edge crossing
///
/// The ray is long enough to cross the whole rectangle from `origin`.
/// A ray starting inside the rectangle reports the point where it leaves.
pub fn ray_to_rect(origin: Vec2, direction: Vec2, rect: &Rect) -> Option<Vec2> {
    let reach = (origin - rect.center()).length() + rect.diagonal() + 1.0;
    let ray = Segment::cast(origin, direction.normalize_or_zero(), reach);

    rect.edges()
        .iter()
        .filter_map(|edge| ray.intersect(edge))
        .min_by(|a, b| {
            a.distance_squared(origin)
                .partial_cmp(&b.distance_squared(origin))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
}
