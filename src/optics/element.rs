//! Reflective prism elements and the quarter-turn reflection law
//!
//! An element is a right isosceles triangle. Its two legs (either side of
//! the right angle) let a ray in and out; the hypotenuse is the internal
//! mirror. A ray that enters through one leg is turned by exactly 90° and
//! leaves through the other leg. A ray that meets the hypotenuse from
//! outside passes straight through.
//!
//! Orientation: in local space the footprint is `(-s, +s), (-s, -s), (+s, +s)`
//! with the right angle at the first vertex. Mirroring negates x, then the
//! rotation is applied. The rest pose (rotation 0) is the local footprint
//! turned one quarter counter-clockwise, which puts the right-angle corner
//! at the south-east. Every +90° moves the corner clockwise: SE, SW, NW, NE.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use super::direction::{Direction, QuarterTurn};
use super::geometry::{Rect, Segment};
use super::layout::SlotId;
use crate::{turn_quarter, turn_quarter_i};

/// Quarter-turns from the local footprint to the rest pose
const REST_TURNS: i32 = -1;

/// Local footprint in units of the half-size, right angle first
const LOCAL_VERTICES: [Vec2; 3] = [
    Vec2::new(-1.0, 1.0),
    Vec2::new(-1.0, -1.0),
    Vec2::new(1.0, 1.0),
];

/// Direction from the footprint centre toward the right-angle corner
const LOCAL_CORNER: IVec2 = IVec2::new(-1, 1);

fn orient_i(v: IVec2, rotation: QuarterTurn, mirrored: bool) -> IVec2 {
    let v = if mirrored { IVec2::new(-v.x, v.y) } else { v };
    turn_quarter_i(v, rotation.turns() + REST_TURNS)
}

fn orient(v: Vec2, rotation: QuarterTurn, mirrored: bool) -> Vec2 {
    let v = if mirrored { Vec2::new(-v.x, v.y) } else { v };
    turn_quarter(v, rotation.turns() + REST_TURNS)
}

/// What happens to a ray arriving at an element from outside
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Deflection {
    /// Entered through a leg, bounced off the hypotenuse, left heading this way
    Turned(Direction),
    /// Met the hypotenuse from outside and kept its heading
    PassThrough,
}

impl Deflection {
    /// Heading after the interaction
    pub fn outgoing(self, incoming: Direction) -> Direction {
        match self {
            Deflection::Turned(out) => out,
            Deflection::PassThrough => incoming,
        }
    }
}

/// Hypotenuse normal pointing away from the right-angle corner
///
/// Unnormalized: both components are ±1, so `|n|² = 2`.
pub fn hypotenuse_normal(rotation: QuarterTurn, mirrored: bool) -> IVec2 {
    -orient_i(LOCAL_CORNER, rotation, mirrored)
}

/// The reflection law: outcome for a ray with heading `incoming`
///
/// A ray travelling against the hypotenuse normal comes from the hypotenuse
/// side and passes through. Otherwise it entered through a leg and is
/// mirrored across the hypotenuse: `d - 2(d·n)n / |n|²`, which stays
/// integral because `|n|² = 2`.
pub fn deflect(rotation: QuarterTurn, mirrored: bool, incoming: Direction) -> Deflection {
    let normal = hypotenuse_normal(rotation, mirrored);
    let d = incoming.to_ivec();
    let along = d.dot(normal);
    if along < 0 {
        return Deflection::PassThrough;
    }

    match Direction::from_ivec(d - normal * along) {
        Some(out) => Deflection::Turned(out),
        None => Deflection::PassThrough,
    }
}

/// Outcome for every heading, indexed like `Direction::ALL`
pub fn reflection_table(rotation: QuarterTurn, mirrored: bool) -> [Deflection; 4] {
    Direction::ALL.map(|incoming| deflect(rotation, mirrored, incoming))
}

/// Which edge of a footprint a ray touched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// One of the two straight edges meeting at the right angle
    Leg(usize),
    Hypotenuse,
}

/// Placed triangle in scene space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Footprint {
    /// Right-angle vertex
    pub corner: Vec2,
    pub a: Vec2,
    pub b: Vec2,
}

impl Footprint {
    pub fn new(center: Vec2, half_size: f32, rotation: QuarterTurn, mirrored: bool) -> Self {
        let [corner, a, b] =
            LOCAL_VERTICES.map(|v| center + orient(v * half_size, rotation, mirrored));
        Self { corner, a, b }
    }

    pub fn vertices(&self) -> [Vec2; 3] {
        [self.corner, self.a, self.b]
    }

    /// The straight edges either side of the right angle
    pub fn legs(&self) -> [Segment; 2] {
        [
            Segment::new(self.corner, self.a),
            Segment::new(self.b, self.corner),
        ]
    }

    pub fn hypotenuse(&self) -> Segment {
        Segment::new(self.a, self.b)
    }

    /// All three edges, legs first
    pub fn edges(&self) -> [(EdgeKind, Segment); 3] {
        let [leg0, leg1] = self.legs();
        [
            (EdgeKind::Leg(0), leg0),
            (EdgeKind::Leg(1), leg1),
            (EdgeKind::Hypotenuse, self.hypotenuse()),
        ]
    }

    /// Axis-aligned bounding box
    pub fn bounds(&self) -> Rect {
        let [v0, v1, v2] = self.vertices();
        Rect::new(v0.min(v1).min(v2), v0.max(v1).max(v2))
    }
}

/// A prism placed in a slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReflectiveElement {
    pub id: String,
    /// Slot the element occupies
    pub slot: SlotId,
    #[serde(default)]
    pub rotation: QuarterTurn,
    #[serde(default)]
    pub mirrored: bool,
}

impl ReflectiveElement {
    pub fn new(id: impl Into<String>, slot: impl Into<SlotId>) -> Self {
        Self {
            id: id.into(),
            slot: slot.into(),
            rotation: QuarterTurn::R0,
            mirrored: false,
        }
    }

    pub fn with_rotation(mut self, rotation: QuarterTurn) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_mirrored(mut self, mirrored: bool) -> Self {
        self.mirrored = mirrored;
        self
    }

    /// Quarter-turn clockwise
    pub fn rotate(&mut self) {
        self.rotation = self.rotation.next();
    }

    pub fn toggle_mirror(&mut self) {
        self.mirrored = !self.mirrored;
    }

    pub fn deflect(&self, incoming: Direction) -> Deflection {
        deflect(self.rotation, self.mirrored, incoming)
    }

    pub fn footprint(&self, center: Vec2, half_size: f32) -> Footprint {
        Footprint::new(center, half_size, self.rotation, self.mirrored)
    }
}
