//=========================================================================
// Core Systems
//
// Platform-independent popup machinery.
//
// Modules:
// - `host`:  contracts for the scene graph, animator and asset loader,
//            plus headless implementations of each
// - `input`: platform-neutral input events routed by the popup guard
// - `popup`: lifecycle contract, instance cache, stack arbiter, input
//            guard and the `PopupManager` facade
//
// Notes:
// Everything here runs on the thread that owns the UI. Asynchronous work
// (animations, loads) reports back through crossbeam channels that the
// manager drains in `update()`.
//
//=========================================================================

pub mod host;
pub mod input;
pub mod popup;
