//! Puzzle slot state
//!
//! Everything that must survive a scene reload lives here.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use super::element::ReflectiveElement;
use super::layout::{SceneLayout, SlotId};

/// Slot contents plus the latched solved flag
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PuzzleState {
    /// Every slot of the layout, `None` when empty
    pub slots: BTreeMap<SlotId, Option<ReflectiveElement>>,
    #[serde(default)]
    pub solved: bool,
}

impl PuzzleState {
    /// All slots empty, unsolved
    pub fn empty(layout: &SceneLayout) -> Self {
        Self {
            slots: layout.slots().iter().map(|s| (s.id.clone(), None)).collect(),
            solved: false,
        }
    }

    /// Rebuild a saved state against the current layout
    ///
    /// Entries the layout can no longer hold (unknown slot, required element
    /// mismatch, element already placed elsewhere) are dropped.
    pub fn hydrate(layout: &SceneLayout, saved: PuzzleState) -> Self {
        let mut state = Self::empty(layout);
        state.solved = saved.solved;

        let mut placed = HashSet::new();
        for (slot_id, element) in saved.slots {
            let Some(mut element) = element else {
                continue;
            };
            let Some(slot) = layout.slot(&slot_id) else {
                log::warn!(
                    "Dropping saved element '{}': slot '{}' is not in layout '{}'",
                    element.id,
                    slot_id,
                    layout.id()
                );
                continue;
            };
            if !slot.accepts(&element.id) {
                log::warn!(
                    "Dropping saved element '{}': slot '{}' requires another element",
                    element.id,
                    slot_id
                );
                continue;
            }
            if !placed.insert(element.id.clone()) {
                log::warn!(
                    "Dropping saved element '{}' in slot '{}': already placed",
                    element.id,
                    slot_id
                );
                continue;
            }
            element.slot = slot_id.clone();
            state.slots.insert(slot_id, Some(element));
        }

        state
    }

    pub fn element(&self, slot_id: &str) -> Option<&ReflectiveElement> {
        self.slots.get(slot_id).and_then(Option::as_ref)
    }

    pub fn element_mut(&mut self, slot_id: &str) -> Option<&mut ReflectiveElement> {
        self.slots.get_mut(slot_id).and_then(Option::as_mut)
    }

    pub fn is_filled(&self, slot_id: &str) -> bool {
        self.element(slot_id).is_some()
    }

    /// Placed elements in slot id order
    pub fn placed(&self) -> impl Iterator<Item = &ReflectiveElement> {
        self.slots.values().flatten()
    }

    pub fn placed_count(&self) -> usize {
        self.placed().count()
    }

    /// Slot currently holding `element_id`
    pub fn slot_of(&self, element_id: &str) -> Option<&SlotId> {
        self.placed().find(|e| e.id == element_id).map(|e| &e.slot)
    }

    pub(crate) fn put(&mut self, element: ReflectiveElement) {
        self.slots.insert(element.slot.clone(), Some(element));
    }

    pub(crate) fn take(&mut self, slot_id: &str) -> Option<ReflectiveElement> {
        self.slots.get_mut(slot_id).and_then(Option::take)
    }
}
