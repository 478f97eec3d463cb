//=========================================================================
// Platform Subsystem
//
// Bridges Winit window events to the popup layer.
//
// Architecture:
// ```text
//  Winit Event Loop
//    ↓ WindowEvent
//  InputProcessor
//    ├─ converts Winit types → InputEvent
//    └─ tracks sticky modifiers
//    ↓
//  PopupManager::route_input
//    → Scene | Overlay | Blocked
// ```
//
// The application keeps ownership of its event loop and window. This
// module only translates; it never creates windows or threads.
//
//=========================================================================

//=== Submodules ==========================================================

mod input_processor;

//=== Public API ==========================================================

pub use input_processor::InputProcessor;
