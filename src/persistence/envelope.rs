//! Versioned save envelope
//!
//! ```json
//! { "version": 1, "puzzle_id": "hall_prism", "state": { "slots": {...}, "solved": false } }
//! ```

use serde::{Deserialize, Serialize};

use super::StoreError;
use crate::optics::PuzzleState;

/// Current save format version
pub const SAVE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveEnvelope {
    pub version: u32,
    pub puzzle_id: String,
    pub state: PuzzleState,
}

/// Just enough of an envelope to check compatibility before a full parse
#[derive(Deserialize)]
struct Header {
    version: u32,
    puzzle_id: String,
}

impl SaveEnvelope {
    pub fn new(puzzle_id: impl Into<String>, state: PuzzleState) -> Self {
        Self {
            version: SAVE_VERSION,
            puzzle_id: puzzle_id.into(),
            state,
        }
    }

    pub fn to_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a stored envelope, checking version and owner
    pub fn from_json(json: &str, expected_puzzle: &str) -> Result<Self, StoreError> {
        let header: Header = serde_json::from_str(json)?;
        if header.version != SAVE_VERSION {
            return Err(StoreError::UnsupportedVersion {
                found: header.version,
                expected: SAVE_VERSION,
            });
        }
        if header.puzzle_id != expected_puzzle {
            return Err(StoreError::PuzzleMismatch {
                found: header.puzzle_id,
                expected: expected_puzzle.to_string(),
            });
        }
        Ok(serde_json::from_str(json)?)
    }
}
