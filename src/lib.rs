//! Prism Route - light-ray routing for quarter-turn prism puzzles
//!
//! Core modules:
//! - `optics`: Deterministic engine (geometry, elements, tracing, slot control)
//! - `inventory`: Inventory collaborator interface
//! - `persistence`: Versioned save envelopes and slot stores
//! - `settings`: Tunable engine constants
//! - `platform`: Browser bindings (wasm32 only)

pub mod inventory;
pub mod optics;
pub mod persistence;
pub mod platform;
pub mod settings;

pub use inventory::{Inventory, InventoryError, MemoryInventory};
pub use persistence::{MemorySlotStore, SlotStore, StoreError};
pub use settings::Settings;

use glam::{IVec2, Vec2};

/// Engine configuration constants
pub mod consts {
    /// Maximum element interactions per trace (anti-loop guard)
    pub const BOUNCE_CAP: u32 = 20;
    /// Half-size of an element footprint in scene units
    pub const ELEMENT_HALF_SIZE: f32 = 35.0;
    /// Maximum pointer distance from a slot centre for a drop to land in it
    pub const SNAP_RADIUS: f32 = 80.0;

    /// Determinant magnitude below which two segments count as parallel
    pub const PARALLEL_EPSILON: f32 = 1e-4;
    /// Slack on the [0, 1] segment parameter range
    pub const PARAM_EPSILON: f32 = 1e-6;
    /// Hits closer than this to the ray origin are ignored
    pub const MIN_HIT_DISTANCE: f32 = 1e-3;
    /// Tolerance for point-in-rectangle tests
    pub const CONTAIN_EPSILON: f32 = 1e-3;
}

/// Rotate an integer vector by `turns` quarter-turns, clockwise on screen (y down)
///
/// Exact: no trigonometry involved, so repeated turns never drift.
#[inline]
pub fn turn_quarter_i(v: IVec2, turns: i32) -> IVec2 {
    match turns.rem_euclid(4) {
        0 => v,
        1 => IVec2::new(-v.y, v.x),
        2 => IVec2::new(-v.x, -v.y),
        _ => IVec2::new(v.y, -v.x),
    }
}

/// Rotate a vector by `turns` quarter-turns, clockwise on screen (y down)
#[inline]
pub fn turn_quarter(v: Vec2, turns: i32) -> Vec2 {
    match turns.rem_euclid(4) {
        0 => v,
        1 => Vec2::new(-v.y, v.x),
        2 => Vec2::new(-v.x, -v.y),
        _ => Vec2::new(v.y, -v.x),
    }
}

/// Normalize an angle in whole degrees to [0, 360)
#[inline]
pub fn normalize_degrees(degrees: i32) -> i32 {
    degrees.rem_euclid(360)
}
