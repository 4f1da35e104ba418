//! Host input event contract
//!
//! Surfaces receive these already-normalized events from the host adapter and
//! answer each one with an [`EventReply`].

use crate::input::{GamepadAxis, GamepadKey, Key, KeyModFlags, MouseButton, MouseButtons};

/// A key on either the keyboard or a gamepad
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub enum InputKey {
    Keyboard(Key),
    Gamepad(GamepadKey),
}

impl InputKey {
    /// Whether this key comes from a gamepad
    #[inline]
    pub fn is_gamepad_key(&self) -> bool {
        matches!(self, InputKey::Gamepad(_))
    }
}

impl From<Key> for InputKey {
    fn from(key: Key) -> Self {
        InputKey::Keyboard(key)
    }
}

impl From<GamepadKey> for InputKey {
    fn from(key: GamepadKey) -> Self {
        InputKey::Gamepad(key)
    }
}

/// Key down or key up
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: InputKey,
    /// Modifier keys held when the event was produced
    pub modifiers: KeyModFlags,
    /// Auto-repeat of a key that is already down
    pub repeat: bool,
}

impl KeyEvent {
    pub fn new(key: impl Into<InputKey>) -> Self {
        Self {
            key: key.into(),
            modifiers: KeyModFlags::empty(),
            repeat: false,
        }
    }

    pub fn with_modifiers(mut self, modifiers: KeyModFlags) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_repeat(mut self, repeat: bool) -> Self {
        self.repeat = repeat;
        self
    }

    /// The keyboard key, or `None` for gamepad keys
    pub fn keyboard_key(&self) -> Option<Key> {
        match self.key {
            InputKey::Keyboard(key) => Some(key),
            InputKey::Gamepad(_) => None,
        }
    }

    #[inline]
    pub fn is_gamepad_key(&self) -> bool {
        self.key.is_gamepad_key()
    }

    /// Whether any of ctrl, shift, alt or super is held
    #[inline]
    pub fn has_modifiers(&self) -> bool {
        !self.modifiers.is_empty()
    }
}

/// Typed character
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CharacterEvent {
    pub character: char,
    pub modifiers: KeyModFlags,
}

impl CharacterEvent {
    pub fn new(character: char) -> Self {
        Self {
            character,
            modifiers: KeyModFlags::empty(),
        }
    }

    pub fn with_modifiers(mut self, modifiers: KeyModFlags) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Mouse move, button, wheel, enter or leave
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PointerEvent {
    /// Pointer position in host screen space
    pub screen_position: [f32; 2],
    /// Button that changed state, for button events
    pub button: Option<MouseButton>,
    /// Wheel movement, for wheel events
    pub wheel_delta: f32,
    pub modifiers: KeyModFlags,
    /// Every button the host reports as currently held
    pub pressed_buttons: MouseButtons,
}

impl PointerEvent {
    pub fn new(screen_position: impl Into<mint::Vector2<f32>>) -> Self {
        let position: mint::Vector2<f32> = screen_position.into();
        Self {
            screen_position: [position.x, position.y],
            button: None,
            wheel_delta: 0.0,
            modifiers: KeyModFlags::empty(),
            pressed_buttons: MouseButtons::empty(),
        }
    }

    pub fn with_button(mut self, button: MouseButton) -> Self {
        self.button = Some(button);
        self
    }

    pub fn with_wheel_delta(mut self, delta: f32) -> Self {
        self.wheel_delta = delta;
        self
    }

    pub fn with_modifiers(mut self, modifiers: KeyModFlags) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_pressed_buttons(mut self, pressed: MouseButtons) -> Self {
        self.pressed_buttons = pressed;
        self
    }

    /// Whether the host reports `button` as held
    #[inline]
    pub fn is_pressed(&self, button: MouseButton) -> bool {
        self.pressed_buttons.contains(button.flag())
    }
}

/// Analog gamepad axis movement
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AnalogInputEvent {
    pub axis: GamepadAxis,
    /// Axis value in `-1.0..=1.0`
    pub value: f32,
    pub modifiers: KeyModFlags,
}

impl AnalogInputEvent {
    pub fn new(axis: GamepadAxis, value: f32) -> Self {
        Self {
            axis,
            value,
            modifiers: KeyModFlags::empty(),
        }
    }
}

/// A surface's answer to the host for one event
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EventReply {
    /// Host default handling is suppressed
    Handled,
    /// Event continues through the host's own handling
    Unhandled,
}

impl EventReply {
    #[inline]
    pub fn is_handled(self) -> bool {
        self == EventReply::Handled
    }

    pub(crate) fn from_consumed(consumed: bool) -> Self {
        if consumed {
            EventReply::Handled
        } else {
            EventReply::Unhandled
        }
    }
}
