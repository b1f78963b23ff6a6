//! Browser LocalStorage slot store (WASM only)

use wasm_bindgen::JsValue;

use super::{SaveEnvelope, SlotStore, StoreError, storage_key};
use crate::optics::PuzzleState;

fn backend(err: JsValue) -> StoreError {
    StoreError::Backend(format!("{err:?}"))
}

/// Envelopes stored in `window.localStorage`
pub struct LocalStorageSlotStore {
    storage: web_sys::Storage,
}

impl LocalStorageSlotStore {
    /// `None` when the page has no LocalStorage (private mode, workers)
    pub fn open() -> Option<Self> {
        let storage = web_sys::window()?.local_storage().ok()??;
        Some(Self { storage })
    }

    pub fn clear(&self, puzzle_id: &str) {
        if self.storage.remove_item(&storage_key(puzzle_id)).is_ok() {
            log::info!("Cleared saved state for '{}'", puzzle_id);
        }
    }
}

impl SlotStore for LocalStorageSlotStore {
    fn load_slot_state(&self, puzzle_id: &str) -> Result<Option<PuzzleState>, StoreError> {
        let Some(json) = self
            .storage
            .get_item(&storage_key(puzzle_id))
            .map_err(backend)?
        else {
            return Ok(None);
        };
        SaveEnvelope::from_json(&json, puzzle_id).map(|e| Some(e.state))
    }

    fn save_slot_state(&mut self, puzzle_id: &str, state: &PuzzleState) -> Result<(), StoreError> {
        let json = SaveEnvelope::new(puzzle_id, state.clone()).to_json()?;
        self.storage
            .set_item(&storage_key(puzzle_id), &json)
            .map_err(backend)
    }
}
