//=========================================================================
// Popup System
//=========================================================================
//
// Stack-based popup arbitration above the primary scene.
//
// Architecture:
//   PopupManager (facade)
//     ├─ cache: InstanceCache      name → live instance, path → name
//     ├─ stack: StackArbiter       open names, back to front
//     ├─ guard: InputGuard         blocks input while transitioning
//     ├─ closer: Closer            close requests from popups and UI
//     └─ host: Host                scene graph, animator, loader
//
// Flow:
//   show() → resolve name → cached? ─yes─→ arbitrate → animate_in
//                              └─no─→ instantiate / load ─┘
//   update() → drain loads → replay waiting shows → poll popups
//            → apply close requests → settle guard
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;

//=== Internal Dependencies ===============================================

use crate::core::host::{Completion, NodeId, PopupContext};

//=== Module Declarations =================================================

mod arbiter;
mod base;
mod cache;
mod close;
mod error;
mod input_guard;
mod manager;
mod simple;

//=== Public API ==========================================================

pub use arbiter::{Placement, StackArbiter};
pub use base::{AnimType, PopupBase};
pub use cache::{InstanceCache, NameResolution, Origin, PathIndex, PopupEntry};
pub use close::{CloseKind, CloseRequest, Closer};
pub use error::PopupError;
pub use input_guard::{InputGuard, InputRoute};
pub use manager::{PopupManager, PopupManagerBuilder, PreloadOptions, ShowOptions, ShowOutcome};
pub use simple::{SimplePopup, SimpleTemplate};

//=== Core Types ==========================================================

/// Logical popup identity, unique among cached instances.
pub type PopupName = String;

/// Arbitrary caller data handed to a popup when it is shown.
pub type Params = Box<dyn Any>;

/// How a newly shown popup treats the popups already open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ShowType {
    /// Hide everything open and take the previous top's place.
    #[default]
    Replace,

    /// Hide everything open and stack on top; hiding the new popup later
    /// brings the previous one back.
    Push,

    /// Show alongside whatever is already visible.
    Keep,
}

/// Lifecycle state of a popup instance.
///
/// ```text
/// Unshown ─┐
///          ├─animate_in─> Showing ──(anim done)──> Shown
/// Hidden ──┘                 │                       │
///    ↑                       └─────animate_out───────┴─> Hiding ─> Hidden
///    └──────────────────────────────────────────────────────────────┘
/// any ──destroy──> Removed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PopupState {
    Unshown,
    Showing,
    Shown,
    Hiding,
    Hidden,
    Removed,
}

impl PopupState {
    /// Whether the instance is on screen (or animating onto it).
    pub fn is_active(self) -> bool {
        matches!(self, Self::Showing | Self::Shown)
    }
}

//=== Popup Trait =========================================================

/// Lifecycle contract every managed popup implements.
///
/// Only the [`PopupManager`] calls these. Application code asks the
/// manager to show/hide a popup by name instead of driving it directly.
///
/// Most implementations embed a [`PopupBase`] and forward to it; see
/// [`SimplePopup`] for a complete example.
pub trait Popup {
    /// Root node of this popup in the scene graph.
    fn node(&self) -> NodeId;

    /// Current lifecycle state.
    fn state(&self) -> PopupState;

    /// Called once, before the first show, with the caller's params.
    fn init(&mut self, name: &str, params: Option<Params>);

    /// Starts the show transition. The returned completion resolves when
    /// the show animation (if any) has finished.
    fn animate_in(&mut self, ctx: &mut PopupContext<'_>) -> Completion;

    /// Hides the popup. Must tolerate being called while `Showing`, and
    /// must be a no-op when already hidden.
    fn animate_out(&mut self, ctx: &mut PopupContext<'_>);

    /// Releases every resource held by the popup, including its node.
    fn destroy(&mut self, ctx: &mut PopupContext<'_>);

    /// Receives params for every show after the first.
    fn reopen(&mut self, _params: Option<Params>) {}

    /// Called by the manager on each update while the popup is active.
    fn poll(&mut self) {}

    fn is_active(&self) -> bool {
        self.state().is_active()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_type_defaults_to_replace() {
        assert_eq!(ShowType::default(), ShowType::Replace);
    }

    #[test]
    fn only_showing_and_shown_are_active() {
        assert!(PopupState::Showing.is_active());
        assert!(PopupState::Shown.is_active());
        assert!(!PopupState::Unshown.is_active());
        assert!(!PopupState::Hiding.is_active());
        assert!(!PopupState::Hidden.is_active());
        assert!(!PopupState::Removed.is_active());
    }
}
