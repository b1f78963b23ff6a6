//! Deterministic light-routing engine
//!
//! No rendering or input code here. Everything is a pure function of the
//! layout, the placed elements and the settings, except [`SlotController`],
//! which owns the mutable session.

pub mod controller;
pub mod direction;
pub mod element;
pub mod evaluator;
pub mod geometry;
pub mod layout;
pub mod state;
pub mod trace;

pub use controller::{
    DragState, DropOutcome, PlaceOutcome, PuzzleError, PuzzleEvent, RejectReason, SlotController,
};
pub use direction::{AngleError, Direction, QuarterTurn};
pub use element::{Deflection, EdgeKind, Footprint, ReflectiveElement, deflect, reflection_table};
pub use evaluator::{SolutionEvaluator, SolvedTransition, evaluate};
pub use geometry::{Rect, Segment, ray_to_rect, segment_intersect};
pub use layout::{Emitter, LayoutError, Receptor, SceneConfig, SceneLayout, Slot, SlotId};
pub use state::PuzzleState;
pub use trace::{
    Interaction, InteractionKind, PathSegment, SegmentKind, Terminal, TracePath, trace,
};
