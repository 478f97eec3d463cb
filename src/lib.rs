//=========================================================================
// Aetheric Popups — Library Root
//
// Popup stacking, priority arbitration and input guarding for game UI
// overlays.
//
// Responsibilities:
// - Expose the `PopupManager` facade and its request types
// - Define the host contracts (scene graph, animator, asset loader) the
//   manager drives, with headless implementations for tools and tests
// - Translate Winit window events into routed popup-layer input
//
// Typical usage:
// ```no_run
// use std::sync::Arc;
// use aetheric_popups::prelude::*;
// # fn host() -> Host { unimplemented!() }
//
// let mut popups = PopupManager::new(host());
// popups.init().unwrap();
// popups
//     .show(ShowOptions::template(Arc::new(SimpleTemplate::new("Shop"))).with_priority(2))
//     .unwrap();
//
// // once per frame
// for error in popups.update() {
//     log::error!("{error}");
// }
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` holds the platform-independent popup machinery.
// `platform` adapts Winit events to it.
//
pub mod core;
pub mod platform;
pub mod prelude;

//--- Public Exports ------------------------------------------------------

pub use crate::core::popup::{PopupError, PopupManager, PopupManagerBuilder};
