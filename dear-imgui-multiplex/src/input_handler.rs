//! Consume or pass-through policy for raw input events
//!
//! Before a surface folds an event into a context it asks its
//! [`InputHandler`] two questions: should the GUI see the event, and should
//! the host's own handling be suppressed. The default policy keeps the host
//! console key and configured escape hotkeys working while the GUI has input.

use crate::config::{InputChord, InputSettings};
use crate::events::{AnalogInputEvent, CharacterEvent, KeyEvent, PointerEvent};
use crate::input::Key;

/// Answer of an [`InputHandler`] for one event
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct InputResponse {
    /// Fold the event into the context's input state
    pub process: bool,
    /// Suppress the host's default handling
    pub consume: bool,
}

impl InputResponse {
    pub const fn new(process: bool, consume: bool) -> Self {
        Self { process, consume }
    }

    /// Process and consume
    pub const fn process_and_consume() -> Self {
        Self::new(true, true)
    }

    /// Neither process nor consume
    pub const fn ignore() -> Self {
        Self::new(false, false)
    }
}

impl Default for InputResponse {
    fn default() -> Self {
        Self::process_and_consume()
    }
}

/// Per-event input policy
///
/// Every method defaults to processing and consuming. `has_active_item` is
/// the context's cached active-item flag from the last frame.
pub trait InputHandler {
    fn on_key_char(&self, _event: &CharacterEvent) -> InputResponse {
        InputResponse::default()
    }

    fn on_key_down(&self, _event: &KeyEvent, _has_active_item: bool) -> InputResponse {
        InputResponse::default()
    }

    fn on_key_up(&self, _event: &KeyEvent) -> InputResponse {
        InputResponse::default()
    }

    fn on_analog_value_changed(&self, _event: &AnalogInputEvent) -> InputResponse {
        InputResponse::default()
    }

    fn on_mouse_button_down(&self, _event: &PointerEvent) -> InputResponse {
        InputResponse::default()
    }

    fn on_mouse_button_double_click(&self, _event: &PointerEvent) -> InputResponse {
        InputResponse::default()
    }

    fn on_mouse_button_up(&self, _event: &PointerEvent) -> InputResponse {
        InputResponse::default()
    }

    fn on_mouse_wheel(&self, _event: &PointerEvent) -> InputResponse {
        InputResponse::default()
    }

    fn on_mouse_move(&self, _event: &PointerEvent) -> InputResponse {
        InputResponse::default()
    }
}

/// Policy protecting the console key and escape hotkeys
#[derive(Clone, Debug)]
pub struct DefaultInputHandler {
    console_keys: Vec<Key>,
    escape_bindings: Vec<InputChord>,
}

impl DefaultInputHandler {
    /// Cache the bindings from `settings`
    pub fn new(settings: &InputSettings) -> Self {
        if settings.escape_bindings.is_empty() {
            crate::multiplex_warn!(
                "Input handler has no escape bindings; stop-session hotkeys will be swallowed"
            );
        }
        Self {
            console_keys: settings.console_keys.clone(),
            escape_bindings: settings.escape_bindings.clone(),
        }
    }

    /// Console key with no modifier held
    pub fn is_console_event(&self, event: &KeyEvent) -> bool {
        !event.has_modifiers()
            && event
                .keyboard_key()
                .is_some_and(|key| self.console_keys.contains(&key))
    }

    pub fn is_escape_event(&self, event: &KeyEvent) -> bool {
        self.escape_bindings.iter().any(|chord| chord.matches(event))
    }
}

impl InputHandler for DefaultInputHandler {
    fn on_key_down(&self, event: &KeyEvent, has_active_item: bool) -> InputResponse {
        if self.is_console_event(event) {
            return InputResponse::ignore();
        }
        if !has_active_item && self.is_escape_event(event) {
            return InputResponse::ignore();
        }
        InputResponse::default()
    }
}

/// Creates the input handler for each new surface
pub trait InputHandlerFactory {
    fn new_handler(&self, settings: &InputSettings) -> Box<dyn InputHandler>;
}

/// Factory building [`DefaultInputHandler`]s
#[derive(Copy, Clone, Debug, Default)]
pub struct DefaultInputHandlerFactory;

impl InputHandlerFactory for DefaultInputHandlerFactory {
    fn new_handler(&self, settings: &InputSettings) -> Box<dyn InputHandler> {
        Box::new(DefaultInputHandler::new(settings))
    }
}

impl<F> InputHandlerFactory for F
where
    F: Fn(&InputSettings) -> Box<dyn InputHandler>,
{
    fn new_handler(&self, settings: &InputSettings) -> Box<dyn InputHandler> {
        self(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::KeyModFlags;

    fn handler() -> DefaultInputHandler {
        DefaultInputHandler::new(&InputSettings {
            console_keys: vec![Key::GraveAccent],
            escape_bindings: vec![InputChord::new(Key::Escape).with_shift()],
            ..InputSettings::default()
        })
    }

    #[test]
    fn test_console_key_passes_through() {
        let response = handler().on_key_down(&KeyEvent::new(Key::GraveAccent), true);
        assert_eq!(response, InputResponse::ignore());
    }

    #[test]
    fn test_console_key_with_modifier_is_processed() {
        let event = KeyEvent::new(Key::GraveAccent).with_modifiers(KeyModFlags::CTRL);
        assert_eq!(handler().on_key_down(&event, false), InputResponse::default());
    }

    #[test]
    fn test_escape_depends_on_active_item() {
        let event = KeyEvent::new(Key::Escape).with_modifiers(KeyModFlags::SHIFT);
        assert_eq!(handler().on_key_down(&event, false), InputResponse::ignore());
        assert_eq!(
            handler().on_key_down(&event, true),
            InputResponse::process_and_consume()
        );
    }

    #[test]
    fn test_other_events_default() {
        let handler = handler();
        assert_eq!(
            handler.on_key_down(&KeyEvent::new(Key::A), false),
            InputResponse::process_and_consume()
        );
        assert_eq!(
            handler.on_key_char(&CharacterEvent::new('a')),
            InputResponse::process_and_consume()
        );
    }

    #[test]
    fn test_closure_factory() {
        struct PassAll;
        impl InputHandler for PassAll {
            fn on_key_down(&self, _: &KeyEvent, _: bool) -> InputResponse {
                InputResponse::ignore()
            }
        }

        let factory = |_: &InputSettings| -> Box<dyn InputHandler> { Box::new(PassAll) };
        let handler = factory.new_handler(&InputSettings::default());
        assert_eq!(
            handler.on_key_down(&KeyEvent::new(Key::A), true),
            InputResponse::ignore()
        );
    }
}
