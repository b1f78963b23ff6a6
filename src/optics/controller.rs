//! Slot controller: the only way puzzle state changes
//!
//! Every accepted mutation re-traces the ray and re-evaluates the solved
//! flag before returning, then queues [`PuzzleEvent`]s for whoever renders
//! or persists the session. Rejected operations leave everything untouched.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::element::ReflectiveElement;
use super::evaluator::SolutionEvaluator;
use super::layout::{SceneLayout, Slot, SlotId};
use super::state::PuzzleState;
use super::trace::{TracePath, trace};
use crate::inventory::{Inventory, InventoryError};
use crate::persistence::SlotStore;
use crate::settings::Settings;

/// Why a placement was refused
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RejectReason {
    #[error("unknown slot '{0}'")]
    UnknownSlot(SlotId),
    #[error("slot '{0}' is already filled")]
    SlotOccupied(SlotId),
    #[error("slot '{slot}' only accepts '{required}'")]
    WrongElement { slot: SlotId, required: String },
    #[error("element '{element}' is already placed in slot '{slot}'")]
    AlreadyPlaced { element: String, slot: SlotId },
    #[error("element '{0}' is not in the inventory")]
    NotInInventory(String),
    #[error("inventory refused: {0}")]
    InventoryRefused(InventoryError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceOutcome {
    Accepted,
    Rejected(RejectReason),
}

impl PlaceOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, PlaceOutcome::Accepted)
    }
}

/// Operation on a slot the layout does not have
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PuzzleError {
    #[error("unknown slot '{0}'")]
    UnknownSlot(SlotId),
}

/// Notification queued after a mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PuzzleEvent {
    /// Slot contents or solved flag changed; the path was re-traced
    StateChanged,
    /// The puzzle became solved (queued once per session)
    Solved,
}

/// Drag-and-drop progress
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        element_id: String,
        /// Slot the element would land in if dropped now
        hovered: Option<SlotId>,
    },
}

/// Result of releasing a drag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    Placed { slot: SlotId },
    Rejected(RejectReason),
    /// Nothing was dragged, or the drop was not near an empty slot
    Cancelled,
}

/// Owns one puzzle session
pub struct SlotController<I: Inventory> {
    layout: SceneLayout,
    settings: Settings,
    inventory: I,
    state: PuzzleState,
    evaluator: SolutionEvaluator,
    path: TracePath,
    drag: DragState,
    events: Vec<PuzzleEvent>,
}

impl<I: Inventory> SlotController<I> {
    /// Fresh session with every slot empty
    pub fn new(layout: SceneLayout, settings: Settings, inventory: I) -> Self {
        let state = PuzzleState::empty(&layout);
        Self::start(layout, settings, inventory, state)
    }

    /// Resume from a saved state
    ///
    /// Saved entries the layout cannot hold are dropped. Elements that end
    /// up placed are taken out of the inventory if it still lists them; a
    /// slot whose element the inventory will not give up is cleared, and
    /// the cleaned state is queued for saving.
    pub fn hydrate(layout: SceneLayout, settings: Settings, mut inventory: I, saved: PuzzleState) -> Self {
        let mut state = PuzzleState::hydrate(&layout, saved);
        let mut unclaimed: Vec<SlotId> = Vec::new();
        for element in state.placed() {
            if inventory.has_element(&element.id) {
                if let Err(e) = inventory.remove_element(&element.id) {
                    log::warn!(
                        "Could not reclaim '{}' from inventory, clearing slot '{}': {}",
                        element.id,
                        element.slot,
                        e
                    );
                    unclaimed.push(element.slot.clone());
                }
            }
        }
        for slot_id in &unclaimed {
            state.take(slot_id);
        }

        let mut controller = Self::start(layout, settings, inventory, state);
        if !unclaimed.is_empty() {
            controller.events.insert(0, PuzzleEvent::StateChanged);
        }
        controller
    }

    /// Resume from `store` if it has a save for this layout, else start fresh
    pub fn open<S: SlotStore + ?Sized>(layout: SceneLayout, settings: Settings, inventory: I, store: &S) -> Self {
        match store.load_slot_state(layout.id()) {
            Ok(Some(saved)) => {
                log::info!("Resuming puzzle '{}' from saved state", layout.id());
                Self::hydrate(layout, settings, inventory, saved)
            }
            Ok(None) => Self::new(layout, settings, inventory),
            Err(e) => {
                log::warn!("Ignoring unreadable save for '{}': {}", layout.id(), e);
                Self::new(layout, settings, inventory)
            }
        }
    }

    fn start(layout: SceneLayout, settings: Settings, inventory: I, state: PuzzleState) -> Self {
        let path = trace(&layout, state.placed(), &settings);
        let mut controller = Self {
            evaluator: SolutionEvaluator::new(state.solved),
            layout,
            settings,
            inventory,
            state,
            path,
            drag: DragState::Idle,
            events: Vec::new(),
        };
        let transition = controller.evaluator.evaluate(&controller.path);
        controller.state.solved = transition.solved;
        if transition.became_solved {
            controller.events.push(PuzzleEvent::Solved);
        }
        log::info!(
            "Opened puzzle '{}' ({} slots, {} placed, solved: {})",
            controller.layout.id(),
            controller.layout.slots().len(),
            controller.state.placed_count(),
            controller.state.solved
        );
        controller
    }

    /// Re-trace, re-evaluate and queue notifications
    fn refresh(&mut self) {
        self.path = trace(&self.layout, self.state.placed(), &self.settings);
        let transition = self.evaluator.evaluate(&self.path);
        self.state.solved = transition.solved;

        log::debug!(
            "Traced '{}': {:?} after {} interactions",
            self.layout.id(),
            self.path.terminal,
            self.path.interactions.len()
        );

        self.events.push(PuzzleEvent::StateChanged);
        if transition.became_solved {
            log::info!("Puzzle '{}' solved", self.layout.id());
            self.events.push(PuzzleEvent::Solved);
        }
    }

    fn known_slot(&self, slot_id: &str) -> Result<(), PuzzleError> {
        match self.layout.slot(slot_id) {
            Some(_) => Ok(()),
            None => Err(PuzzleError::UnknownSlot(slot_id.to_string())),
        }
    }

    fn check_place(&self, element_id: &str, slot_id: &str) -> Result<(), RejectReason> {
        let slot = self
            .layout
            .slot(slot_id)
            .ok_or_else(|| RejectReason::UnknownSlot(slot_id.to_string()))?;
        if self.state.is_filled(slot_id) {
            return Err(RejectReason::SlotOccupied(slot_id.to_string()));
        }
        if !slot.accepts(element_id) {
            return Err(RejectReason::WrongElement {
                slot: slot_id.to_string(),
                required: slot.required_element.clone().unwrap_or_default(),
            });
        }
        if let Some(current) = self.state.slot_of(element_id) {
            return Err(RejectReason::AlreadyPlaced {
                element: element_id.to_string(),
                slot: current.clone(),
            });
        }
        if !self.inventory.has_element(element_id) {
            return Err(RejectReason::NotInInventory(element_id.to_string()));
        }
        Ok(())
    }

    /// Place an inventory element into an empty slot at rotation 0
    pub fn attempt_place(&mut self, element_id: &str, slot_id: &str) -> PlaceOutcome {
        let checked = self.check_place(element_id, slot_id).and_then(|()| {
            self.inventory
                .remove_element(element_id)
                .map_err(RejectReason::InventoryRefused)
        });
        if let Err(reason) = checked {
            log::warn!("Rejected '{}' in slot '{}': {}", element_id, slot_id, reason);
            return PlaceOutcome::Rejected(reason);
        }

        log::debug!("Placed '{}' in slot '{}'", element_id, slot_id);
        self.state.put(ReflectiveElement::new(element_id, slot_id));
        self.refresh();
        PlaceOutcome::Accepted
    }

    /// Quarter-turn the element in `slot_id` clockwise
    ///
    /// Returns false (and changes nothing) when the slot is empty.
    pub fn rotate(&mut self, slot_id: &str) -> Result<bool, PuzzleError> {
        self.known_slot(slot_id)?;
        let Some(element) = self.state.element_mut(slot_id) else {
            return Ok(false);
        };
        element.rotate();
        log::debug!("Rotated slot '{}' to {}°", slot_id, element.rotation.degrees());
        self.refresh();
        Ok(true)
    }

    /// Toggle the mirror flag of the element in `slot_id`
    pub fn mirror(&mut self, slot_id: &str) -> Result<bool, PuzzleError> {
        self.known_slot(slot_id)?;
        let Some(element) = self.state.element_mut(slot_id) else {
            return Ok(false);
        };
        element.toggle_mirror();
        log::debug!("Mirrored slot '{}' (mirrored: {})", slot_id, element.mirrored);
        self.refresh();
        Ok(true)
    }

    /// Clear `slot_id` and hand its element back to the inventory
    pub fn pick_up(&mut self, slot_id: &str) -> Result<Option<ReflectiveElement>, PuzzleError> {
        self.known_slot(slot_id)?;
        let Some(element) = self.state.take(slot_id) else {
            return Ok(None);
        };
        self.inventory.return_element(&element.id);
        log::debug!("Picked up '{}' from slot '{}'", element.id, slot_id);
        self.refresh();
        Ok(Some(element))
    }

    // === Drag and drop ===

    /// Start dragging an inventory element
    pub fn begin_drag(&mut self, element_id: &str) -> Result<(), RejectReason> {
        if let Some(slot) = self.state.slot_of(element_id) {
            return Err(RejectReason::AlreadyPlaced {
                element: element_id.to_string(),
                slot: slot.clone(),
            });
        }
        if !self.inventory.has_element(element_id) {
            return Err(RejectReason::NotInInventory(element_id.to_string()));
        }
        self.drag = DragState::Dragging {
            element_id: element_id.to_string(),
            hovered: None,
        };
        Ok(())
    }

    /// Track the pointer; returns the slot a drop would target
    pub fn update_drag(&mut self, point: Vec2) -> Option<SlotId> {
        let target = self.slot_at(point).map(|s| s.id.clone());
        match &mut self.drag {
            DragState::Dragging { hovered, .. } => {
                hovered.clone_from(&target);
                target
            }
            DragState::Idle => None,
        }
    }

    /// Release the drag at `point`
    pub fn end_drag(&mut self, point: Vec2) -> DropOutcome {
        let DragState::Dragging { element_id, .. } = std::mem::take(&mut self.drag) else {
            return DropOutcome::Cancelled;
        };
        let Some(slot) = self.slot_at(point).map(|s| s.id.clone()) else {
            log::debug!("Drop of '{}' missed every slot", element_id);
            return DropOutcome::Cancelled;
        };
        match self.attempt_place(&element_id, &slot) {
            PlaceOutcome::Accepted => DropOutcome::Placed { slot },
            PlaceOutcome::Rejected(reason) => DropOutcome::Rejected(reason),
        }
    }

    pub fn cancel_drag(&mut self) {
        self.drag = DragState::Idle;
    }

    /// Nearest empty slot within the snap radius of `point`
    pub fn slot_at(&self, point: Vec2) -> Option<&Slot> {
        self.layout
            .slots()
            .iter()
            .filter(|s| !self.state.is_filled(&s.id))
            .map(|s| (s, s.position.distance(point)))
            .filter(|(_, d)| *d <= self.settings.snap_radius)
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(s, _)| s)
    }

    pub fn drag_state(&self) -> &DragState {
        &self.drag
    }

    // === Queries ===

    pub fn is_solved(&self) -> bool {
        self.state.solved
    }

    /// Path from the most recent trace
    pub fn current_path(&self) -> &TracePath {
        &self.path
    }

    pub fn state(&self) -> &PuzzleState {
        &self.state
    }

    pub fn layout(&self) -> &SceneLayout {
        &self.layout
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn puzzle_id(&self) -> &str {
        self.layout.id()
    }

    pub fn slot_element(&self, slot_id: &str) -> Option<&ReflectiveElement> {
        self.state.element(slot_id)
    }

    pub fn inventory(&self) -> &I {
        &self.inventory
    }

    pub fn inventory_mut(&mut self) -> &mut I {
        &mut self.inventory
    }

    /// Take every queued notification, oldest first
    pub fn drain_events(&mut self) -> Vec<PuzzleEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn has_pending_events(&self) -> bool {
        !self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::MemoryInventory;
    use crate::optics::direction::{Direction, QuarterTurn};
    use crate::optics::geometry::Rect;
    use crate::optics::layout::{Emitter, Receptor};
    use crate::optics::trace::Terminal;

    fn layout() -> SceneLayout {
        SceneLayout::new(
            "hall",
            Emitter {
                position: Vec2::ZERO,
                direction: Direction::East,
                tag: String::new(),
            },
            Receptor {
                position: Vec2::new(100.0, 100.0),
                width: 20.0,
                height: 20.0,
            },
            Rect::new(Vec2::splat(-200.0), Vec2::splat(400.0)),
            vec![
                Slot {
                    id: "s1".into(),
                    position: Vec2::new(100.0, 0.0),
                    required_element: Some("prism-a".into()),
                },
                Slot {
                    id: "s2".into(),
                    position: Vec2::new(250.0, -100.0),
                    required_element: None,
                },
            ],
            35.0,
        )
        .unwrap()
    }

    fn controller() -> SlotController<MemoryInventory> {
        SlotController::new(
            layout(),
            Settings::default(),
            MemoryInventory::with_items(["prism-a", "prism-b"]),
        )
    }

    /// Inventory that lists items but refuses to hand them over
    struct LockedInventory;

    impl Inventory for LockedInventory {
        fn has_element(&self, _element_id: &str) -> bool {
            true
        }

        fn remove_element(&mut self, element_id: &str) -> Result<(), InventoryError> {
            Err(InventoryError::Unavailable(element_id.to_string()))
        }

        fn return_element(&mut self, _element_id: &str) {}
    }

    #[test]
    fn test_new_session_is_unsolved_and_quiet() {
        let mut c = controller();
        assert!(!c.is_solved());
        assert_eq!(c.current_path().terminal, Terminal::ExitedBounds);
        assert!(c.drain_events().is_empty());
    }

    #[test]
    fn test_place_then_rotate_solves_once() {
        let mut c = controller();

        assert_eq!(c.attempt_place("prism-a", "s1"), PlaceOutcome::Accepted);
        assert!(!c.inventory().has_element("prism-a"));
        assert_eq!(c.slot_element("s1").unwrap().rotation, QuarterTurn::R0);
        assert!(!c.is_solved());
        assert_eq!(c.drain_events(), vec![PuzzleEvent::StateChanged]);

        assert_eq!(c.rotate("s1"), Ok(true));
        assert!(c.is_solved());
        assert!(c.state().solved);
        assert_eq!(
            c.drain_events(),
            vec![PuzzleEvent::StateChanged, PuzzleEvent::Solved]
        );

        // Further turns break the path but the puzzle stays solved
        assert_eq!(c.rotate("s1"), Ok(true));
        assert_ne!(c.current_path().terminal, Terminal::HitReceptor);
        assert!(c.is_solved());
        c.rotate("s1").unwrap();
        c.rotate("s1").unwrap();
        c.rotate("s1").unwrap();
        assert_eq!(c.current_path().terminal, Terminal::HitReceptor);
        assert!(!c.drain_events().contains(&PuzzleEvent::Solved));
    }

    #[test]
    fn test_placement_rejections_leave_state_alone() {
        let mut c = controller();
        c.attempt_place("prism-b", "s2");
        c.drain_events();
        let before = c.state().clone();

        let cases = [
            ("prism-a", "nowhere", RejectReason::UnknownSlot("nowhere".into())),
            ("prism-a", "s2", RejectReason::SlotOccupied("s2".into())),
            (
                "prism-b",
                "s1",
                RejectReason::WrongElement {
                    slot: "s1".into(),
                    required: "prism-a".into(),
                },
            ),
        ];
        for (element, slot, reason) in cases {
            assert_eq!(c.attempt_place(element, slot), PlaceOutcome::Rejected(reason));
        }

        c.pick_up("s2").unwrap();
        c.attempt_place("prism-a", "s1");
        c.drain_events();
        let before_again = c.state().clone();
        assert_eq!(
            c.attempt_place("prism-a", "s2"),
            PlaceOutcome::Rejected(RejectReason::AlreadyPlaced {
                element: "prism-a".into(),
                slot: "s1".into(),
            })
        );
        assert_eq!(
            c.attempt_place("prism-z", "s2"),
            PlaceOutcome::Rejected(RejectReason::NotInInventory("prism-z".into()))
        );
        assert_eq!(c.state(), &before_again);
        assert_ne!(&before, &before_again);
        assert!(c.drain_events().is_empty());
    }

    #[test]
    fn test_inventory_refusal() {
        let mut c = SlotController::new(layout(), Settings::default(), LockedInventory);
        assert_eq!(
            c.attempt_place("prism-a", "s1"),
            PlaceOutcome::Rejected(RejectReason::InventoryRefused(
                InventoryError::Unavailable("prism-a".into())
            ))
        );
        assert!(!c.state().is_filled("s1"));
    }

    #[test]
    fn test_rotate_and_mirror_empty_or_unknown() {
        let mut c = controller();
        assert_eq!(c.rotate("s1"), Ok(false));
        assert_eq!(c.mirror("s2"), Ok(false));
        assert_eq!(c.rotate("x"), Err(PuzzleError::UnknownSlot("x".into())));
        assert_eq!(c.mirror("x"), Err(PuzzleError::UnknownSlot("x".into())));
        assert_eq!(c.pick_up("x"), Err(PuzzleError::UnknownSlot("x".into())));
        assert!(c.drain_events().is_empty());
    }

    #[test]
    fn test_mirror_toggles() {
        let mut c = controller();
        c.attempt_place("prism-b", "s2");
        assert_eq!(c.mirror("s2"), Ok(true));
        assert!(c.slot_element("s2").unwrap().mirrored);
        assert_eq!(c.mirror("s2"), Ok(true));
        assert!(!c.slot_element("s2").unwrap().mirrored);
        assert_eq!(c.drain_events().len(), 3);
    }

    #[test]
    fn test_pick_up_returns_element() {
        let mut c = controller();
        c.attempt_place("prism-a", "s1");
        c.rotate("s1").unwrap();
        assert_eq!(c.current_path().terminal, Terminal::HitReceptor);

        let element = c.pick_up("s1").unwrap().unwrap();
        assert_eq!(element.id, "prism-a");
        assert!(c.inventory().has_element("prism-a"));
        assert_eq!(c.current_path().terminal, Terminal::ExitedBounds);
        assert!(c.is_solved());
        assert_eq!(c.pick_up("s1"), Ok(None));
    }

    #[test]
    fn test_drag_and_drop() {
        let mut c = controller();
        assert_eq!(
            c.begin_drag("prism-z"),
            Err(RejectReason::NotInInventory("prism-z".into()))
        );
        assert_eq!(c.update_drag(Vec2::new(100.0, 10.0)), None);

        c.begin_drag("prism-a").unwrap();
        assert_eq!(c.update_drag(Vec2::new(110.0, 30.0)), Some("s1".to_string()));
        assert_eq!(
            c.drag_state(),
            &DragState::Dragging {
                element_id: "prism-a".into(),
                hovered: Some("s1".into()),
            }
        );
        assert_eq!(c.update_drag(Vec2::new(-150.0, 300.0)), None);

        assert_eq!(
            c.end_drag(Vec2::new(95.0, -5.0)),
            DropOutcome::Placed { slot: "s1".into() }
        );
        assert_eq!(c.drag_state(), &DragState::Idle);
        assert!(c.state().is_filled("s1"));

        // Filled slots no longer attract drops
        assert!(c.slot_at(Vec2::new(100.0, 0.0)).is_none());
        assert_eq!(
            c.begin_drag("prism-a"),
            Err(RejectReason::AlreadyPlaced {
                element: "prism-a".into(),
                slot: "s1".into(),
            })
        );
    }

    #[test]
    fn test_drop_rejected_or_cancelled() {
        let mut c = controller();
        assert_eq!(c.end_drag(Vec2::ZERO), DropOutcome::Cancelled);

        c.begin_drag("prism-b").unwrap();
        assert_eq!(
            c.end_drag(Vec2::new(100.0, 0.0)),
            DropOutcome::Rejected(RejectReason::WrongElement {
                slot: "s1".into(),
                required: "prism-a".into(),
            })
        );

        c.begin_drag("prism-b").unwrap();
        assert_eq!(c.end_drag(Vec2::new(-150.0, 300.0)), DropOutcome::Cancelled);

        c.begin_drag("prism-b").unwrap();
        c.cancel_drag();
        assert_eq!(c.end_drag(Vec2::new(250.0, -100.0)), DropOutcome::Cancelled);
        assert!(c.inventory().has_element("prism-b"));
    }

    #[test]
    fn test_hydrate_solved_session() {
        let mut saved = PuzzleState::default();
        saved.slots.insert(
            "s1".into(),
            Some(ReflectiveElement::new("prism-a", "s1").with_rotation(QuarterTurn::R90)),
        );
        saved.solved = true;

        let mut c = SlotController::hydrate(
            layout(),
            Settings::default(),
            MemoryInventory::with_items(["prism-a", "prism-b"]),
            saved,
        );
        assert!(c.is_solved());
        assert_eq!(c.current_path().terminal, Terminal::HitReceptor);
        assert!(!c.inventory().has_element("prism-a"));
        assert!(c.drain_events().is_empty());
    }

    #[test]
    fn test_hydrate_unsolved_save_that_hits() {
        let mut saved = PuzzleState::default();
        saved.slots.insert(
            "s1".into(),
            Some(ReflectiveElement::new("prism-a", "s1").with_rotation(QuarterTurn::R90)),
        );

        let mut c = SlotController::hydrate(layout(), Settings::default(), MemoryInventory::new(), saved);
        assert!(c.is_solved());
        assert_eq!(c.drain_events(), vec![PuzzleEvent::Solved]);
    }

    #[test]
    fn test_hydrate_clears_slot_the_inventory_keeps() {
        let mut saved = PuzzleState::default();
        saved.slots.insert(
            "s1".into(),
            Some(ReflectiveElement::new("prism-a", "s1").with_rotation(QuarterTurn::R90)),
        );

        let mut c = SlotController::hydrate(layout(), Settings::default(), LockedInventory, saved);
        assert!(c.slot_element("s1").is_none());
        assert!(c.inventory().has_element("prism-a"));
        assert_ne!(c.current_path().terminal, Terminal::HitReceptor);
        assert!(!c.is_solved());
        assert_eq!(c.drain_events(), vec![PuzzleEvent::StateChanged]);
        assert!(c.state().slot_of("prism-a").is_none());
    }
}
