//=========================================================================
// Input
//=========================================================================
//
// Input event types routed by the popup input guard.
//
//=========================================================================

//=== Module Declarations =================================================

pub mod event;

//=== Public API ==========================================================

pub use event::{InputEvent, KeyCode, Modifiers, MouseButton};
