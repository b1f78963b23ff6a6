//! Puzzle slot persistence
//!
//! Features:
//! - Versioned JSON envelope
//! - One entry per puzzle under `prism_state_{puzzle_id}`
//! - In-memory store (native, tests) and LocalStorage store (web)
//! - Saving driven by queued controller events; failures never roll back state

pub mod envelope;
#[cfg(target_arch = "wasm32")]
pub mod local_storage;

use std::collections::HashMap;

use crate::inventory::Inventory;
use crate::optics::{PuzzleEvent, PuzzleState, SlotController};

pub use envelope::{SAVE_VERSION, SaveEnvelope};
#[cfg(target_arch = "wasm32")]
pub use local_storage::LocalStorageSlotStore;

/// Persistence failure
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("save (de)serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("unsupported save version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
    #[error("save belongs to puzzle '{found}', not '{expected}'")]
    PuzzleMismatch { found: String, expected: String },
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Storage key for a puzzle's slot state
pub fn storage_key(puzzle_id: &str) -> String {
    format!("prism_state_{puzzle_id}")
}

/// Keyed store for per-puzzle slot state
pub trait SlotStore {
    /// `Ok(None)` when nothing was saved for this puzzle
    fn load_slot_state(&self, puzzle_id: &str) -> Result<Option<PuzzleState>, StoreError>;

    fn save_slot_state(&mut self, puzzle_id: &str, state: &PuzzleState) -> Result<(), StoreError>;
}

/// Envelopes held in a map, keyed like LocalStorage
#[derive(Debug, Clone, Default)]
pub struct MemorySlotStore {
    entries: HashMap<String, String>,
}

impl MemorySlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored JSON for a puzzle, if any
    pub fn raw(&self, puzzle_id: &str) -> Option<&str> {
        self.entries.get(&storage_key(puzzle_id)).map(String::as_str)
    }

    /// Overwrite the stored JSON directly (import, tests)
    pub fn insert_raw(&mut self, puzzle_id: &str, json: impl Into<String>) {
        self.entries.insert(storage_key(puzzle_id), json.into());
    }

    pub fn remove(&mut self, puzzle_id: &str) -> bool {
        self.entries.remove(&storage_key(puzzle_id)).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SlotStore for MemorySlotStore {
    fn load_slot_state(&self, puzzle_id: &str) -> Result<Option<PuzzleState>, StoreError> {
        self.raw(puzzle_id)
            .map(|json| SaveEnvelope::from_json(json, puzzle_id).map(|e| e.state))
            .transpose()
    }

    fn save_slot_state(&mut self, puzzle_id: &str, state: &PuzzleState) -> Result<(), StoreError> {
        let json = SaveEnvelope::new(puzzle_id, state.clone()).to_json()?;
        self.insert_raw(puzzle_id, json);
        Ok(())
    }
}

/// Drain the controller's events and save if anything changed
///
/// Returns true when a save was written. Failures are logged; the
/// in-memory session is never rolled back.
pub fn persist_changes<I, S>(controller: &mut SlotController<I>, store: &mut S) -> bool
where
    I: Inventory,
    S: SlotStore + ?Sized,
{
    let events = controller.drain_events();
    if events.is_empty() {
        return false;
    }

    let puzzle_id = controller.puzzle_id().to_string();
    match store.save_slot_state(&puzzle_id, controller.state()) {
        Ok(()) => {
            if events.contains(&PuzzleEvent::Solved) {
                log::info!("Saved solved puzzle '{}'", puzzle_id);
            } else {
                log::debug!("Saved puzzle '{}' ({} changes)", puzzle_id, events.len());
            }
            true
        }
        Err(e) => {
            log::warn!("Failed to save puzzle '{}': {}", puzzle_id, e);
            false
        }
    }
}
