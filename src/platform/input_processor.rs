//=========================================================================
// Input Processor
//=========================================================================
//
// Converts Winit window events into popup-layer InputEvents and asks the
// popup manager which layer should receive them.
//
// Architecture:
//   WindowEvent → InputProcessor → InputEvent → PopupManager::route_input
//                                                   ↓
//                                    Scene / Overlay / Blocked
//
// Modifier state is sticky: it is cached from ModifiersChanged and applied
// to every later key and button event. Key repeats and unmapped keys
// (F13-F24, media keys, numpad) produce no event.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::trace;
use winit::{
    event::{ElementState, KeyEvent, MouseButton as WinitMouseButton, WindowEvent},
    keyboard::{KeyCode as WinitKeyCode, ModifiersState, PhysicalKey},
};

//=== Internal Dependencies ===============================================

use crate::core::input::{InputEvent, KeyCode, Modifiers, MouseButton};
use crate::core::popup::{InputRoute, PopupManager};

//=== InputProcessor ======================================================

/// Stateful translator from Winit events to [`InputEvent`]s.
#[derive(Debug, Default)]
pub struct InputProcessor {
    modifiers: Modifiers,
}

impl InputProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    //--- Modifier State ---------------------------------------------------

    pub fn update_modifiers(&mut self, state: ModifiersState) {
        self.modifiers = Modifiers::from(state);
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    //--- Window Events ----------------------------------------------------

    /// Translates a window event, or returns `None` if it carries no
    /// input the popup layer cares about.
    pub fn process_window_event(&mut self, event: &WindowEvent) -> Option<InputEvent> {
        match event {
            WindowEvent::ModifiersChanged(modifiers) => {
                self.update_modifiers(modifiers.state());
                None
            }
            WindowEvent::KeyboardInput { event, .. } => self.process_key_event(event),
            WindowEvent::MouseInput { state, button, .. } => {
                Some(self.process_mouse_button(*button, *state))
            }
            WindowEvent::CursorMoved { position, .. } => {
                Some(self.process_cursor(position.x, position.y))
            }
            _ => None,
        }
    }

    /// Translates `event` and routes it through the popup guard.
    pub fn route_window_event(
        &mut self,
        popups: &PopupManager,
        event: &WindowEvent,
    ) -> Option<(InputEvent, InputRoute)> {
        let input = self.process_window_event(event)?;
        let route = popups.route_input(&input);
        trace!(target: "platform::input", "{:?} routed to {:?}", input, route);
        Some((input, route))
    }

    //--- Individual Conversions -------------------------------------------

    pub fn process_key_event(&self, key_event: &KeyEvent) -> Option<InputEvent> {
        if key_event.repeat {
            return None;
        }

        let PhysicalKey::Code(code) = key_event.physical_key else {
            return None;
        };

        match KeyCode::from(code) {
            KeyCode::Unidentified => None,
            key => Some(self.key_event(key, key_event.state)),
        }
    }

    pub fn process_mouse_button(&self, button: WinitMouseButton, state: ElementState) -> InputEvent {
        let button = MouseButton::from(button);
        let modifiers = self.modifiers;

        match state {
            ElementState::Pressed => InputEvent::MouseButtonDown { button, modifiers },
            ElementState::Released => InputEvent::MouseButtonUp { button, modifiers },
        }
    }

    /// Cursor position in physical pixels.
    pub fn process_cursor(&self, x: f64, y: f64) -> InputEvent {
        InputEvent::MouseMoved {
            x: x as f32,
            y: y as f32,
        }
    }

    fn key_event(&self, key: KeyCode, state: ElementState) -> InputEvent {
        let modifiers = self.modifiers;

        match state {
            ElementState::Pressed => InputEvent::KeyDown { key, modifiers },
            ElementState::Released => InputEvent::KeyUp { key, modifiers },
        }
    }
}

//=========================================================================
// Winit Conversions
//=========================================================================

/// Winit already folds macOS Cmd into Ctrl and Option into Alt.
impl From<ModifiersState> for Modifiers {
    fn from(state: ModifiersState) -> Self {
        Self {
            shift: state.shift_key(),
            ctrl: state.control_key(),
            alt: state.alt_key(),
        }
    }
}

impl From<WinitKeyCode> for KeyCode {
    fn from(code: WinitKeyCode) -> Self {
        use WinitKeyCode as W;

        match code {
            W::Digit0 => Self::Digit0,
            W::Digit1 => Self::Digit1,
            W::Digit2 => Self::Digit2,
            W::Digit3 => Self::Digit3,
            W::Digit4 => Self::Digit4,
            W::Digit5 => Self::Digit5,
            W::Digit6 => Self::Digit6,
            W::Digit7 => Self::Digit7,
            W::Digit8 => Self::Digit8,
            W::Digit9 => Self::Digit9,

            W::KeyA => Self::KeyA,
            W::KeyB => Self::KeyB,
            W::KeyC => Self::KeyC,
            W::KeyD => Self::KeyD,
            W::KeyE => Self::KeyE,
            W::KeyF => Self::KeyF,
            W::KeyG => Self::KeyG,
            W::KeyH => Self::KeyH,
            W::KeyI => Self::KeyI,
            W::KeyJ => Self::KeyJ,
            W::KeyK => Self::KeyK,
            W::KeyL => Self::KeyL,
            W::KeyM => Self::KeyM,
            W::KeyN => Self::KeyN,
            W::KeyO => Self::KeyO,
            W::KeyP => Self::KeyP,
            W::KeyQ => Self::KeyQ,
            W::KeyR => Self::KeyR,
            W::KeyS => Self::KeyS,
            W::KeyT => Self::KeyT,
            W::KeyU => Self::KeyU,
            W::KeyV => Self::KeyV,
            W::KeyW => Self::KeyW,
            W::KeyX => Self::KeyX,
            W::KeyY => Self::KeyY,
            W::KeyZ => Self::KeyZ,

            W::ArrowUp => Self::ArrowUp,
            W::ArrowDown => Self::ArrowDown,
            W::ArrowLeft => Self::ArrowLeft,
            W::ArrowRight => Self::ArrowRight,

            W::Tab => Self::Tab,
            W::Space => Self::Space,
            W::Enter | W::NumpadEnter => Self::Enter,
            W::Escape => Self::Escape,
            W::Backspace => Self::Backspace,
            W::Delete => Self::Delete,

            _ => Self::Unidentified,
        }
    }
}

/// Back, Forward and numbered buttons collapse into `Other`.
impl From<WinitMouseButton> for MouseButton {
    fn from(button: WinitMouseButton) -> Self {
        match button {
            WinitMouseButton::Left => Self::Left,
            WinitMouseButton::Right => Self::Right,
            WinitMouseButton::Middle => Self::Middle,
            _ => Self::Other,
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::core::host::headless::{HeadlessScene, ManualAnimator, QueuedLoader};
    use crate::core::host::Host;
    use crate::core::popup::{ShowOptions, SimpleTemplate};

    fn modifiers(shift: bool, ctrl: bool, alt: bool) -> ModifiersState {
        let mut state = ModifiersState::empty();
        state.set(ModifiersState::SHIFT, shift);
        state.set(ModifiersState::CONTROL, ctrl);
        state.set(ModifiersState::ALT, alt);
        state
    }

    #[test]
    fn modifiers_start_clear_and_stick() {
        let mut processor = InputProcessor::new();
        assert_eq!(processor.modifiers(), Modifiers::NONE);

        processor.update_modifiers(modifiers(true, false, true));

        let mods = processor.modifiers();
        assert!(mods.shift && !mods.ctrl && mods.alt);
    }

    #[test]
    fn key_events_carry_modifiers() {
        let mut processor = InputProcessor::new();
        processor.update_modifiers(modifiers(false, true, false));

        let down = processor.key_event(KeyCode::KeyS, ElementState::Pressed);
        let up = processor.key_event(KeyCode::KeyS, ElementState::Released);

        assert_eq!(down, InputEvent::KeyDown { key: KeyCode::KeyS, modifiers: Modifiers::CTRL });
        assert_eq!(up, InputEvent::KeyUp { key: KeyCode::KeyS, modifiers: Modifiers::CTRL });
    }

    #[test]
    fn mouse_buttons_carry_modifiers() {
        let mut processor = InputProcessor::new();
        processor.update_modifiers(modifiers(false, false, true));

        let event = processor.process_mouse_button(WinitMouseButton::Back, ElementState::Released);

        assert_eq!(
            event,
            InputEvent::MouseButtonUp { button: MouseButton::Other, modifiers: Modifiers::ALT }
        );
        assert!(event.is_release());
    }

    #[test]
    fn cursor_moves_narrow_to_f32() {
        let processor = InputProcessor::new();
        assert_eq!(
            processor.process_cursor(123.5, 456.25),
            InputEvent::MouseMoved { x: 123.5, y: 456.25 }
        );
    }

    #[test]
    fn key_conversion() {
        assert_eq!(KeyCode::from(WinitKeyCode::KeyA), KeyCode::KeyA);
        assert_eq!(KeyCode::from(WinitKeyCode::Escape), KeyCode::Escape);
        assert_eq!(KeyCode::from(WinitKeyCode::NumpadEnter), KeyCode::Enter);
        assert_eq!(KeyCode::from(WinitKeyCode::F13), KeyCode::Unidentified);
    }

    #[test]
    fn clicks_are_blocked_while_a_popup_animates_in() {
        let host = Host::new(HeadlessScene::default(), ManualAnimator::new(), QueuedLoader::new());
        let mut popups = PopupManager::new(host);
        popups.init().unwrap();
        popups.show(ShowOptions::template(Arc::new(SimpleTemplate::new("Shop")))).unwrap();

        let processor = InputProcessor::new();
        let press = processor.process_mouse_button(WinitMouseButton::Left, ElementState::Pressed);
        let release = processor.process_mouse_button(WinitMouseButton::Left, ElementState::Released);

        assert_eq!(popups.route_input(&press), InputRoute::Blocked);
        assert_eq!(popups.route_input(&release), InputRoute::Scene);
    }
}
