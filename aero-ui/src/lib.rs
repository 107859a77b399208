//! Shared Dioxus state, browser bridge and components for the Aero-Cast apps.
//!
//! This crate provides:
//! - `js_bridge`: fetch and `requestAnimationFrame` wrappers over `web_sys`
//! - `loader`: fetching CSVs and boundary files into core types
//! - `state`: Reactive AppState with Dioxus Signals
//! - `components`: Reusable RSX components (selectors, sliders, map canvas, etc.)

pub mod components;
pub mod js_bridge;
pub mod loader;
pub mod state;
