//! Cardinal headings and quarter-turn rotations
//!
//! Degrees follow the screen convention: 0 = east, 90 = south,
//! 180 = west, 270 = north. Both types serialize as whole degrees.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use crate::{normalize_degrees, turn_quarter_i};

/// Rejected angle (not a multiple of 90°)
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{0}° is not a quarter-turn angle")]
pub struct AngleError(pub i32);

/// Convert degrees to a quarter-turn count in 0..4
fn quarter_turns_of(degrees: i32) -> Result<i32, AngleError> {
    let normalized = normalize_degrees(degrees);
    if normalized % 90 == 0 {
        Ok(normalized / 90)
    } else {
        Err(AngleError(degrees))
    }
}

/// Heading of a ray segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum Direction {
    East,
    South,
    West,
    North,
}

impl Direction {
    /// All headings in clockwise order starting east
    pub const ALL: [Direction; 4] = [
        Direction::East,
        Direction::South,
        Direction::West,
        Direction::North,
    ];

    pub fn from_quarter_turns(turns: i32) -> Self {
        Self::ALL[turns.rem_euclid(4) as usize]
    }

    pub fn quarter_turns(self) -> i32 {
        match self {
            Direction::East => 0,
            Direction::South => 1,
            Direction::West => 2,
            Direction::North => 3,
        }
    }

    pub fn from_degrees(degrees: i32) -> Result<Self, AngleError> {
        quarter_turns_of(degrees).map(Self::from_quarter_turns)
    }

    pub fn degrees(self) -> i32 {
        self.quarter_turns() * 90
    }

    /// Unit step in integer scene space
    pub fn to_ivec(self) -> IVec2 {
        turn_quarter_i(IVec2::X, self.quarter_turns())
    }

    /// Unit step in scene space
    pub fn to_vec(self) -> Vec2 {
        self.to_ivec().as_vec2()
    }

    /// Heading of an axis-aligned unit step
    pub fn from_ivec(v: IVec2) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.to_ivec() == v)
    }

    /// Turn clockwise by `turns` quarter-turns (negative turns go counter-clockwise)
    pub fn turned(self, turns: i32) -> Self {
        Self::from_quarter_turns(self.quarter_turns() + turns)
    }

    pub fn opposite(self) -> Self {
        self.turned(2)
    }
}

impl TryFrom<i32> for Direction {
    type Error = AngleError;

    fn try_from(degrees: i32) -> Result<Self, Self::Error> {
        Self::from_degrees(degrees)
    }
}

impl From<Direction> for i32 {
    fn from(direction: Direction) -> Self {
        direction.degrees()
    }
}

/// Element rotation, always a whole number of quarter-turns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum QuarterTurn {
    #[default]
    R0,
    R90,
    R180,
    R270,
}

impl QuarterTurn {
    pub const ALL: [QuarterTurn; 4] = [
        QuarterTurn::R0,
        QuarterTurn::R90,
        QuarterTurn::R180,
        QuarterTurn::R270,
    ];

    pub fn from_turns(turns: i32) -> Self {
        Self::ALL[turns.rem_euclid(4) as usize]
    }

    pub fn turns(self) -> i32 {
        match self {
            QuarterTurn::R0 => 0,
            QuarterTurn::R90 => 1,
            QuarterTurn::R180 => 2,
            QuarterTurn::R270 => 3,
        }
    }

    pub fn from_degrees(degrees: i32) -> Result<Self, AngleError> {
        quarter_turns_of(degrees).map(Self::from_turns)
    }

    pub fn degrees(self) -> i32 {
        self.turns() * 90
    }

    /// The next rotation clockwise: (degrees + 90) mod 360
    pub fn next(self) -> Self {
        Self::from_turns(self.turns() + 1)
    }
}

impl TryFrom<i32> for QuarterTurn {
    type Error = AngleError;

    fn try_from(degrees: i32) -> Result<Self, Self::Error> {
        Self::from_degrees(degrees)
    }
}

impl From<QuarterTurn> for i32 {
    fn from(rotation: QuarterTurn) -> Self {
        rotation.degrees()
    }
}
