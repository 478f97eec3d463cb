//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use aetheric_popups::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Manager facade
pub use crate::core::popup::{
    CloseKind, Closer, PopupError, PopupManager, PopupManagerBuilder, PreloadOptions, ShowOptions,
    ShowOutcome, ShowType,
};

// Popup implementations
pub use crate::core::popup::{AnimType, Popup, PopupBase, PopupState, SimplePopup, SimpleTemplate};

// Host contracts
pub use crate::core::host::{
    Animator, AssetLoader, Completion, Host, NodeId, PopupContext, PopupTemplate, SceneGraph,
    TemplateRef,
};

// Input routing
pub use crate::core::input::{InputEvent, KeyCode, Modifiers, MouseButton};
pub use crate::core::popup::InputRoute;
pub use crate::platform::InputProcessor;
