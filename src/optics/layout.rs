//! Static scene description for one puzzle instance
//!
//! A layout is validated once at construction; a `SceneLayout` value is
//! always safe to trace.

use std::collections::HashSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::direction::Direction;
use super::geometry::Rect;
use crate::settings::Settings;

/// Slot identifier, unique within a layout
pub type SlotId = String;

/// Fixed ray origin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Emitter {
    pub position: Vec2,
    pub direction: Direction,
    /// Free-form label (colour name, sprite key)
    #[serde(default)]
    pub tag: String,
}

/// Target rectangle, positioned by its centre
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Receptor {
    pub position: Vec2,
    pub width: f32,
    pub height: f32,
}

impl Receptor {
    pub fn rect(&self) -> Rect {
        Rect::from_center_size(self.position, Vec2::new(self.width, self.height))
    }
}

/// Fixed placement position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub id: SlotId,
    pub position: Vec2,
    /// Only this element may be placed here (`None` accepts any)
    #[serde(default)]
    pub required_element: Option<String>,
}

impl Slot {
    pub fn accepts(&self, element_id: &str) -> bool {
        self.required_element
            .as_deref()
            .is_none_or(|required| required == element_id)
    }
}

/// Malformed scene configuration
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("scene bounds must have positive width and height")]
    EmptyBounds,
    #[error("receptor must have positive width and height (got {width}x{height})")]
    DegenerateReceptor { width: f32, height: f32 },
    #[error("emitter at ({x}, {y}) lies outside the scene bounds")]
    EmitterOutOfBounds { x: f32, y: f32 },
    #[error("duplicate slot id '{0}'")]
    DuplicateSlot(SlotId),
    #[error("emitter lies inside the footprint of slot '{0}'")]
    EmitterInsideSlot(SlotId),
    #[error("element half-size must be positive (got {0})")]
    InvalidElementSize(f32),
    #[error("slot '{0}' footprint extends outside the scene bounds")]
    SlotOutOfBounds(SlotId),
    #[error("slots '{0}' and '{1}' have overlapping footprints")]
    OverlappingSlots(SlotId, SlotId),
    #[error("invalid scene file: {0}")]
    Parse(String),
}

/// Validated puzzle scene
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneLayout {
    id: String,
    emitter: Emitter,
    receptor: Receptor,
    bounds: Rect,
    slots: Vec<Slot>,
    element_half_size: f32,
}

impl SceneLayout {
    /// Build and validate a layout; fails fast on anything untraceable
    pub fn new(
        id: impl Into<String>,
        emitter: Emitter,
        receptor: Receptor,
        bounds: Rect,
        slots: Vec<Slot>,
        element_half_size: f32,
    ) -> Result<Self, LayoutError> {
        if !bounds.has_area() {
            return Err(LayoutError::EmptyBounds);
        }
        if !receptor.rect().has_area() {
            return Err(LayoutError::DegenerateReceptor {
                width: receptor.width,
                height: receptor.height,
            });
        }
        if !bounds.contains(emitter.position) {
            return Err(LayoutError::EmitterOutOfBounds {
                x: emitter.position.x,
                y: emitter.position.y,
            });
        }
        if element_half_size.is_nan() || element_half_size <= 0.0 {
            return Err(LayoutError::InvalidElementSize(element_half_size));
        }

        let mut seen = HashSet::new();
        for slot in &slots {
            if !seen.insert(slot.id.as_str()) {
                return Err(LayoutError::DuplicateSlot(slot.id.clone()));
            }
            let footprint = footprint_box(slot.position, element_half_size);
            if !bounds.contains_rect(&footprint) {
                return Err(LayoutError::SlotOutOfBounds(slot.id.clone()));
            }
            // Tracing starts at the emitter, so an element around it would never be hit
            if footprint.contains(emitter.position) {
                return Err(LayoutError::EmitterInsideSlot(slot.id.clone()));
            }
        }

        for (i, a) in slots.iter().enumerate() {
            let box_a = footprint_box(a.position, element_half_size);
            for b in &slots[i + 1..] {
                if box_a.overlaps(&footprint_box(b.position, element_half_size)) {
                    return Err(LayoutError::OverlappingSlots(a.id.clone(), b.id.clone()));
                }
            }
        }

        Ok(Self {
            id: id.into(),
            emitter,
            receptor,
            bounds,
            slots,
            element_half_size,
        })
    }

    /// Build from a parsed scene file
    pub fn from_config(config: SceneConfig, settings: &Settings) -> Result<Self, LayoutError> {
        let emitter = Emitter {
            position: Vec2::new(config.emitter.x, config.emitter.y),
            direction: config.emitter.direction,
            tag: config.emitter.tag,
        };
        let receptor = Receptor {
            position: Vec2::new(config.receptor.x, config.receptor.y),
            width: config.receptor.width,
            height: config.receptor.height,
        };
        let bounds = Rect::from_origin_size(
            Vec2::new(config.bounds.x, config.bounds.y),
            Vec2::new(config.bounds.width, config.bounds.height),
        );
        let slots = config
            .slots
            .into_iter()
            .map(|s| Slot {
                id: s.id,
                position: Vec2::new(s.x, s.y),
                required_element: s.required_item,
            })
            .collect();

        Self::new(
            config.id,
            emitter,
            receptor,
            bounds,
            slots,
            settings.element_half_size,
        )
    }

    /// Parse and validate a JSON scene file
    pub fn from_json(json: &str, settings: &Settings) -> Result<Self, LayoutError> {
        let config: SceneConfig =
            serde_json::from_str(json).map_err(|e| LayoutError::Parse(e.to_string()))?;
        Self::from_config(config, settings)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn emitter(&self) -> &Emitter {
        &self.emitter
    }

    pub fn receptor(&self) -> &Receptor {
        &self.receptor
    }

    pub fn bounds(&self) -> &Rect {
        &self.bounds
    }

    /// Slots in declaration order (also the trace iteration order)
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn element_half_size(&self) -> f32 {
        self.element_half_size
    }

    pub fn slot(&self, id: &str) -> Option<&Slot> {
        self.slots.iter().find(|s| s.id == id)
    }

    pub fn slot_index(&self, id: &str) -> Option<usize> {
        self.slots.iter().position(|s| s.id == id)
    }
}

/// Square that contains an element footprint in any orientation
fn footprint_box(center: Vec2, half_size: f32) -> Rect {
    Rect::from_center_size(center, Vec2::splat(half_size * 2.0))
}

fn default_receptor_extent() -> f32 {
    50.0
}

/// Scene file format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneConfig {
    pub id: String,
    pub emitter: EmitterConfig,
    pub receptor: ReceptorConfig,
    pub bounds: BoundsConfig,
    #[serde(default)]
    pub slots: Vec<SlotConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmitterConfig {
    pub x: f32,
    pub y: f32,
    /// Degrees, one of 0 / 90 / 180 / 270
    pub direction: Direction,
    #[serde(default)]
    pub tag: String,
}

/// Receptor centre and size
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceptorConfig {
    pub x: f32,
    pub y: f32,
    #[serde(default = "default_receptor_extent")]
    pub width: f32,
    #[serde(default = "default_receptor_extent")]
    pub height: f32,
}

/// Scene bounds by top-left corner and size
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundsConfig {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotConfig {
    pub id: SlotId,
    pub x: f32,
    pub y: f32,
    #[serde(default, alias = "requiredItem")]
    pub required_item: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emitter() -> Emitter {
        Emitter {
            position: Vec2::ZERO,
            direction: Direction::East,
            tag: String::new(),
        }
    }

    fn receptor() -> Receptor {
        Receptor {
            position: Vec2::new(100.0, 100.0),
            width: 20.0,
            height: 20.0,
        }
    }

    fn bounds() -> Rect {
        Rect::new(Vec2::new(-200.0, -200.0), Vec2::new(300.0, 300.0))
    }

    fn slot(id: &str, x: f32, y: f32) -> Slot {
        Slot {
            id: id.into(),
            position: Vec2::new(x, y),
            required_element: None,
        }
    }

    #[test]
    fn test_valid_layout() {
        let layout = SceneLayout::new(
            "p1",
            emitter(),
            receptor(),
            bounds(),
            vec![slot("a", 100.0, 0.0), slot("b", -100.0, 0.0)],
            35.0,
        )
        .unwrap();
        assert_eq!(layout.slot_index("b"), Some(1));
        assert!(layout.slot("missing").is_none());
    }

    #[test]
    fn test_zero_size_receptor_rejected() {
        let mut r = receptor();
        r.width = 0.0;
        let err = SceneLayout::new("p", emitter(), r, bounds(), vec![], 35.0).unwrap_err();
        assert!(matches!(err, LayoutError::DegenerateReceptor { .. }));
    }

    #[test]
    fn test_emitter_outside_bounds_rejected() {
        let mut e = emitter();
        e.position = Vec2::new(1000.0, 0.0);
        let err = SceneLayout::new("p", e, receptor(), bounds(), vec![], 35.0).unwrap_err();
        assert_eq!(err, LayoutError::EmitterOutOfBounds { x: 1000.0, y: 0.0 });
    }

    #[test]
    fn test_duplicate_slot_rejected() {
        let slots = vec![slot("a", 100.0, 0.0), slot("a", -100.0, 0.0)];
        let err = SceneLayout::new("p", emitter(), receptor(), bounds(), slots, 35.0).unwrap_err();
        assert_eq!(err, LayoutError::DuplicateSlot("a".into()));
    }

    #[test]
    fn test_overlapping_slots_rejected() {
        let slots = vec![slot("a", 100.0, 0.0), slot("b", 150.0, 0.0)];
        let err = SceneLayout::new("p", emitter(), receptor(), bounds(), slots, 35.0).unwrap_err();
        assert_eq!(err, LayoutError::OverlappingSlots("a".into(), "b".into()));
    }

    #[test]
    fn test_slot_outside_bounds_rejected() {
        let slots = vec![slot("edge", 290.0, 0.0)];
        let err = SceneLayout::new("p", emitter(), receptor(), bounds(), slots, 35.0).unwrap_err();
        assert_eq!(err, LayoutError::SlotOutOfBounds("edge".into()));
    }

    #[test]
    fn test_emitter_inside_slot_rejected() {
        let slots = vec![slot("s1", 20.0, -10.0)];
        let err = SceneLayout::new("p", emitter(), receptor(), bounds(), slots, 35.0).unwrap_err();
        assert_eq!(err, LayoutError::EmitterInsideSlot("s1".into()));

        // Touching the footprint edge counts as inside
        let slots = vec![slot("s1", 35.0, 0.0)];
        let err = SceneLayout::new("p", emitter(), receptor(), bounds(), slots, 35.0).unwrap_err();
        assert_eq!(err, LayoutError::EmitterInsideSlot("s1".into()));
    }

    #[test]
    fn test_empty_bounds_rejected() {
        let flat = Rect::new(Vec2::new(-200.0, 0.0), Vec2::new(300.0, 0.0));
        let err = SceneLayout::new("p", emitter(), receptor(), flat, vec![], 35.0).unwrap_err();
        assert_eq!(err, LayoutError::EmptyBounds);

        let inverted = Rect::new(Vec2::splat(300.0), Vec2::splat(-200.0));
        let err = SceneLayout::new("p", emitter(), receptor(), inverted, vec![], 35.0).unwrap_err();
        assert_eq!(err, LayoutError::EmptyBounds);
    }

    #[test]
    fn test_non_positive_element_size_rejected() {
        let err = SceneLayout::new("p", emitter(), receptor(), bounds(), vec![], 0.0).unwrap_err();
        assert_eq!(err, LayoutError::InvalidElementSize(0.0));

        let err = SceneLayout::new("p", emitter(), receptor(), bounds(), vec![], -5.0).unwrap_err();
        assert_eq!(err, LayoutError::InvalidElementSize(-5.0));

        let err = SceneLayout::new("p", emitter(), receptor(), bounds(), vec![], f32::NAN).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidElementSize(size) if size.is_nan()));
    }

    #[test]
    fn test_slot_accepts() {
        let mut s = slot("a", 0.0, 0.0);
        assert!(s.accepts("anything"));
        s.required_element = Some("prism-a".into());
        assert!(s.accepts("prism-a"));
        assert!(!s.accepts("prism-b"));
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "id": "hall_prism",
            "emitter": { "x": 0, "y": 0, "direction": 0, "tag": "green" },
            "receptor": { "x": 100, "y": 100, "width": 20, "height": 20 },
            "bounds": { "x": -200, "y": -200, "width": 500, "height": 500 },
            "slots": [ { "id": "s1", "x": 100, "y": 0, "requiredItem": "prism-a" } ]
        }"#;
        let layout = SceneLayout::from_json(json, &Settings::default()).unwrap();
        assert_eq!(layout.id(), "hall_prism");
        assert_eq!(layout.emitter().tag, "green");
        assert_eq!(layout.slots()[0].required_element.as_deref(), Some("prism-a"));
        assert_eq!(layout.element_half_size(), Settings::default().element_half_size);
    }

    #[test]
    fn test_from_json_bad_direction() {
        let json = r#"{
            "id": "p",
            "emitter": { "x": 0, "y": 0, "direction": 45 },
            "receptor": { "x": 100, "y": 100 },
            "bounds": { "x": -200, "y": -200, "width": 500, "height": 500 }
        }"#;
        let err = SceneLayout::from_json(json, &Settings::default()).unwrap_err();
        assert!(matches!(err, LayoutError::Parse(_)));
    }
}
