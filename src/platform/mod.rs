//! Platform abstraction layer
//!
//! The engine itself is platform-neutral. Browser builds get a
//! `wasm_bindgen` facade over one puzzle session, backed by LocalStorage.

#[cfg(target_arch = "wasm32")]
pub mod web;
