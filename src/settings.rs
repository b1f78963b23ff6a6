//! Engine settings
//!
//! Tunables shared by every puzzle session. Loaded from a JSON file by the
//! CLI and from LocalStorage in the browser; missing fields fall back to
//! the defaults in [`crate::consts`].

use serde::{Deserialize, Serialize};

use crate::consts::{BOUNCE_CAP, ELEMENT_HALF_SIZE, SNAP_RADIUS};

/// Tracing and placement tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Maximum element interactions per trace
    pub bounce_cap: u32,
    /// Half-size of every element footprint (scene units)
    pub element_half_size: f32,
    /// Drop distance within which a dragged element snaps to a slot
    pub snap_radius: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bounce_cap: BOUNCE_CAP,
            element_half_size: ELEMENT_HALF_SIZE,
            snap_radius: SNAP_RADIUS,
        }
    }
}

impl Settings {
    /// Parse settings JSON; absent fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "prism_route_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = Self::from_json(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}
