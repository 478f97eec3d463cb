//=========================================================================
// Input Events
//=========================================================================
//
// Platform-neutral input events, as seen by the input guard.
//
// The popup system does not interpret input; it only decides which layer
// (scene beneath, popup layer, or nobody) an event is delivered to. The
// types here carry just enough to make that decision and to hand the
// event on unchanged.
//
// Event Flow:
// ```text
// Platform Layer (Winit)
//         ↓
//    InputProcessor → InputEvent (this module)
//         ↓
//    PopupManager::route_input → InputRoute
// ```
//
//=========================================================================

//=== MouseButton =========================================================

/// Physical mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,

    /// Side, thumb and other non-standard buttons.
    Other,
}

//=== KeyCode =============================================================

/// Physical key location (layout independent).
///
/// Covers the keys popup UIs typically react to; anything else maps to
/// `Unidentified` and is filtered out by the platform layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    //--- Numeric Keys -----------------------------------------------------
    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    //--- Alphabetic Keys --------------------------------------------------
    KeyA, KeyB, KeyC, KeyD, KeyE, KeyF, KeyG, KeyH, KeyI,
    KeyJ, KeyK, KeyL, KeyM, KeyN, KeyO, KeyP, KeyQ, KeyR,
    KeyS, KeyT, KeyU, KeyV, KeyW, KeyX, KeyY, KeyZ,

    //--- Navigation -------------------------------------------------------
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    Tab,

    //--- Confirm / Dismiss ------------------------------------------------
    Space,
    Enter,
    Escape,
    Backspace,
    Delete,

    Unidentified,
}

//=== Modifiers ===========================================================

/// Modifier keys held while an event fired. Left/right are not told
/// apart; Command on macOS reports as `ctrl`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Self = Self { shift: false, ctrl: false, alt: false };
    pub const SHIFT: Self = Self { shift: true, ctrl: false, alt: false };
    pub const CTRL: Self = Self { shift: false, ctrl: true, alt: false };
    pub const ALT: Self = Self { shift: false, ctrl: false, alt: true };

    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt
    }
}

//=== InputEvent ==========================================================

/// Low-level input event from the platform layer.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    KeyDown { key: KeyCode, modifiers: Modifiers },
    KeyUp { key: KeyCode, modifiers: Modifiers },
    MouseButtonDown { button: MouseButton, modifiers: Modifiers },
    MouseButtonUp { button: MouseButton, modifiers: Modifiers },

    /// Cursor position in screen space (pixels, top-left origin).
    MouseMoved { x: f32, y: f32 },

    /// Event the platform layer could not classify.
    Unidentified,
}

impl InputEvent {
    /// Key or button release. A release must reach whichever layer saw
    /// the matching press, even while the guard is blocking.
    pub fn is_release(&self) -> bool {
        matches!(self, Self::KeyUp { .. } | Self::MouseButtonUp { .. })
    }

    /// Mouse events (buttons and motion).
    pub fn is_pointer(&self) -> bool {
        matches!(
            self,
            Self::MouseButtonDown { .. } | Self::MouseButtonUp { .. } | Self::MouseMoved { .. }
        )
    }

    /// Modifier state carried by the event, if any.
    pub fn modifiers(&self) -> Option<Modifiers> {
        match self {
            Self::KeyDown { modifiers, .. }
            | Self::KeyUp { modifiers, .. }
            | Self::MouseButtonDown { modifiers, .. }
            | Self::MouseButtonUp { modifiers, .. } => Some(*modifiers),
            _ => None,
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn releases_are_detected() {
        let up = InputEvent::KeyUp { key: KeyCode::Escape, modifiers: Modifiers::NONE };
        let down = InputEvent::KeyDown { key: KeyCode::Escape, modifiers: Modifiers::NONE };
        let click_up = InputEvent::MouseButtonUp {
            button: MouseButton::Left,
            modifiers: Modifiers::NONE,
        };

        assert!(up.is_release());
        assert!(click_up.is_release());
        assert!(!down.is_release());
        assert!(!InputEvent::MouseMoved { x: 1.0, y: 2.0 }.is_release());
    }

    #[test]
    fn pointer_events_are_classified() {
        assert!(InputEvent::MouseMoved { x: 0.0, y: 0.0 }.is_pointer());
        assert!(!InputEvent::Unidentified.is_pointer());
    }

    #[test]
    fn modifiers_are_exposed_where_carried() {
        let event = InputEvent::MouseButtonDown {
            button: MouseButton::Right,
            modifiers: Modifiers::SHIFT,
        };

        assert_eq!(event.modifiers(), Some(Modifiers::SHIFT));
        assert!(Modifiers::SHIFT.any());
        assert!(!Modifiers::default().any());
        assert_eq!(InputEvent::MouseMoved { x: 0.0, y: 0.0 }.modifiers(), None);
    }
}
