//! Browser facade
//!
//! JavaScript talks to one [`PrismPuzzle`] per open scene. Structured
//! values cross the boundary as JSON strings; errors become `Error`
//! objects. Every mutating call saves to LocalStorage when something
//! changed.

use glam::Vec2;
use wasm_bindgen::prelude::*;

use crate::inventory::MemoryInventory;
use crate::optics::{DropOutcome, PlaceOutcome, SceneLayout, SlotController};
use crate::persistence::{LocalStorageSlotStore, MemorySlotStore, SlotStore, persist_changes};
use crate::settings::Settings;

fn js_error(err: impl std::fmt::Display) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    // Already initialized when the module is started twice
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("Prism Route starting...");
}

/// Storage behind a browser session
enum Store {
    Local(LocalStorageSlotStore),
    /// No LocalStorage available; progress lives for the page only
    Memory(MemorySlotStore),
}

impl Store {
    fn backend(&self) -> &dyn SlotStore {
        match self {
            Store::Local(store) => store,
            Store::Memory(store) => store,
        }
    }

    fn backend_mut(&mut self) -> &mut dyn SlotStore {
        match self {
            Store::Local(store) => store,
            Store::Memory(store) => store,
        }
    }
}

#[wasm_bindgen]
pub struct PrismPuzzle {
    controller: SlotController<MemoryInventory>,
    store: Store,
}

#[wasm_bindgen]
impl PrismPuzzle {
    /// Open a scene (JSON) with the given inventory element ids
    #[wasm_bindgen(constructor)]
    pub fn new(scene_json: &str, inventory: Vec<String>) -> Result<PrismPuzzle, JsValue> {
        let settings = Settings::load();
        let layout = SceneLayout::from_json(scene_json, &settings).map_err(js_error)?;
        let store = match LocalStorageSlotStore::open() {
            Some(local) => Store::Local(local),
            None => {
                log::warn!("LocalStorage unavailable; progress will not persist");
                Store::Memory(MemorySlotStore::new())
            }
        };
        let mut puzzle = Self {
            controller: SlotController::open(
                layout,
                settings,
                MemoryInventory::with_items(inventory),
                store.backend(),
            ),
            store,
        };
        puzzle.save();
        Ok(puzzle)
    }

    fn save(&mut self) -> bool {
        persist_changes(&mut self.controller, self.store.backend_mut())
    }

    /// Returns the rejection reason, or `undefined` when placed
    #[wasm_bindgen(js_name = attemptPlace)]
    pub fn attempt_place(&mut self, element_id: &str, slot_id: &str) -> Option<String> {
        let outcome = self.controller.attempt_place(element_id, slot_id);
        self.save();
        match outcome {
            PlaceOutcome::Accepted => None,
            PlaceOutcome::Rejected(reason) => Some(reason.to_string()),
        }
    }

    pub fn rotate(&mut self, slot_id: &str) -> Result<bool, JsValue> {
        let changed = self.controller.rotate(slot_id).map_err(js_error)?;
        self.save();
        Ok(changed)
    }

    pub fn mirror(&mut self, slot_id: &str) -> Result<bool, JsValue> {
        let changed = self.controller.mirror(slot_id).map_err(js_error)?;
        self.save();
        Ok(changed)
    }

    /// Returns the removed element id, if the slot was filled
    #[wasm_bindgen(js_name = pickUp)]
    pub fn pick_up(&mut self, slot_id: &str) -> Result<Option<String>, JsValue> {
        let element = self.controller.pick_up(slot_id).map_err(js_error)?;
        self.save();
        Ok(element.map(|e| e.id))
    }

    #[wasm_bindgen(js_name = beginDrag)]
    pub fn begin_drag(&mut self, element_id: &str) -> Result<(), JsValue> {
        self.controller.begin_drag(element_id).map_err(js_error)
    }

    /// Slot id under the pointer, if a drop would land there
    #[wasm_bindgen(js_name = updateDrag)]
    pub fn update_drag(&mut self, x: f32, y: f32) -> Option<String> {
        self.controller.update_drag(Vec2::new(x, y))
    }

    /// Returns the filled slot id; rejected drops throw, missed drops return `undefined`
    #[wasm_bindgen(js_name = endDrag)]
    pub fn end_drag(&mut self, x: f32, y: f32) -> Result<Option<String>, JsValue> {
        let outcome = self.controller.end_drag(Vec2::new(x, y));
        self.save();
        match outcome {
            DropOutcome::Placed { slot } => Ok(Some(slot)),
            DropOutcome::Rejected(reason) => Err(js_error(reason)),
            DropOutcome::Cancelled => Ok(None),
        }
    }

    #[wasm_bindgen(js_name = cancelDrag)]
    pub fn cancel_drag(&mut self) {
        self.controller.cancel_drag();
    }

    #[wasm_bindgen(js_name = isSolved)]
    pub fn is_solved(&self) -> bool {
        self.controller.is_solved()
    }

    /// Current `TracePath` as JSON
    #[wasm_bindgen(js_name = pathJson)]
    pub fn path_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.controller.current_path()).map_err(js_error)
    }

    /// Current `PuzzleState` as JSON
    #[wasm_bindgen(js_name = stateJson)]
    pub fn state_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.controller.state()).map_err(js_error)
    }

    /// Validated layout as JSON, for drawing slots and the receptor
    #[wasm_bindgen(js_name = layoutJson)]
    pub fn layout_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.controller.layout()).map_err(js_error)
    }

    #[wasm_bindgen(js_name = inventoryItems)]
    pub fn inventory_items(&self) -> Vec<String> {
        self.controller
            .inventory()
            .items()
            .map(String::from)
            .collect()
    }
}
