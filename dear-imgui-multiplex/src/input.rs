//! Input identifiers shared by events, input state and settings
//!
//! These are the normalized encodings this crate works with. Host adapters
//! (see the winit backend) translate their native key codes into them.

use bitflags::bitflags;

/// Mouse button identifier
#[repr(i32)]
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MouseButton {
    /// Left mouse button
    Left = 0,
    /// Right mouse button
    Right = 1,
    /// Middle mouse button
    Middle = 2,
    /// First extra button (usually "back")
    Extra1 = 3,
    /// Second extra button (usually "forward")
    Extra2 = 4,
}

impl MouseButton {
    /// Number of tracked mouse buttons
    pub const COUNT: usize = 5;

    /// All tracked buttons, in index order
    pub const ALL: [MouseButton; Self::COUNT] = [
        MouseButton::Left,
        MouseButton::Right,
        MouseButton::Middle,
        MouseButton::Extra1,
        MouseButton::Extra2,
    ];

    /// Index of this button in per-button arrays
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The matching flag in [`MouseButtons`]
    pub const fn flag(self) -> MouseButtons {
        match self {
            MouseButton::Left => MouseButtons::LEFT,
            MouseButton::Right => MouseButtons::RIGHT,
            MouseButton::Middle => MouseButtons::MIDDLE,
            MouseButton::Extra1 => MouseButtons::EXTRA1,
            MouseButton::Extra2 => MouseButtons::EXTRA2,
        }
    }
}

bitflags! {
    /// Set of mouse buttons the host reports as held down
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct MouseButtons: u8 {
        const LEFT = 1 << 0;
        const RIGHT = 1 << 1;
        const MIDDLE = 1 << 2;
        const EXTRA1 = 1 << 3;
        const EXTRA2 = 1 << 4;
    }
}

/// Mouse cursor shapes a GUI context can request
#[repr(i32)]
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MouseCursor {
    /// No cursor
    #[default]
    None = -1,
    /// Arrow cursor
    Arrow = 0,
    /// Text input I-beam cursor
    TextInput,
    /// Resize all directions cursor
    ResizeAll,
    /// Resize north-south cursor
    ResizeNS,
    /// Resize east-west cursor
    ResizeEW,
    /// Resize northeast-southwest cursor
    ResizeNESW,
    /// Resize northwest-southeast cursor
    ResizeNWSE,
    /// Hand cursor
    Hand,
    /// Not allowed cursor
    NotAllowed,
}

/// Keyboard key identifier
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Key {
    Tab,
    LeftArrow,
    RightArrow,
    UpArrow,
    DownArrow,
    PageUp,
    PageDown,
    Home,
    End,
    Insert,
    Delete,
    Backspace,
    Space,
    Enter,
    Escape,
    LeftCtrl,
    LeftShift,
    LeftAlt,
    LeftSuper,
    RightCtrl,
    RightShift,
    RightAlt,
    RightSuper,
    Menu,
    Key0,
    Key1,
    Key2,
    Key3,
    Key4,
    Key5,
    Key6,
    Key7,
    Key8,
    Key9,
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    Apostrophe,
    Comma,
    Minus,
    Period,
    Slash,
    Semicolon,
    Equal,
    LeftBracket,
    Backslash,
    RightBracket,
    GraveAccent,
    CapsLock,
    ScrollLock,
    NumLock,
    PrintScreen,
    Pause,
    Keypad0,
    Keypad1,
    Keypad2,
    Keypad3,
    Keypad4,
    Keypad5,
    Keypad6,
    Keypad7,
    Keypad8,
    Keypad9,
    KeypadDecimal,
    KeypadDivide,
    KeypadMultiply,
    KeypadSubtract,
    KeypadAdd,
    KeypadEnter,
    KeypadEqual,
}

impl Key {
    /// Modifier flag carried by this key, if it is a modifier key
    pub const fn modifier(self) -> Option<KeyModFlags> {
        match self {
            Key::LeftCtrl | Key::RightCtrl => Some(KeyModFlags::CTRL),
            Key::LeftShift | Key::RightShift => Some(KeyModFlags::SHIFT),
            Key::LeftAlt | Key::RightAlt => Some(KeyModFlags::ALT),
            Key::LeftSuper | Key::RightSuper => Some(KeyModFlags::SUPER),
            _ => None,
        }
    }

    /// Whether this key is one of the modifier keys
    #[inline]
    pub const fn is_modifier(self) -> bool {
        self.modifier().is_some()
    }
}

bitflags! {
    /// Key modifier flags
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct KeyModFlags: i32 {
        /// No modifiers
        const NONE = 0;
        /// Ctrl key modifier
        const CTRL = 1 << 0;
        /// Shift key modifier
        const SHIFT = 1 << 1;
        /// Alt key modifier
        const ALT = 1 << 2;
        /// Super (command) key modifier
        const SUPER = 1 << 3;
    }
}

/// Digital gamepad buttons
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GamepadKey {
    FaceButtonBottom,
    FaceButtonRight,
    FaceButtonLeft,
    FaceButtonTop,
    DPadUp,
    DPadDown,
    DPadLeft,
    DPadRight,
    LeftShoulder,
    RightShoulder,
    LeftTrigger,
    RightTrigger,
    LeftThumb,
    RightThumb,
    Start,
    Back,
}

impl GamepadKey {
    /// Navigation input driven by this button, if any
    pub const fn nav_input(self) -> Option<NavInput> {
        match self {
            GamepadKey::FaceButtonBottom => Some(NavInput::Activate),
            GamepadKey::FaceButtonRight => Some(NavInput::Cancel),
            GamepadKey::FaceButtonTop => Some(NavInput::Input),
            GamepadKey::FaceButtonLeft => Some(NavInput::Menu),
            GamepadKey::DPadUp => Some(NavInput::DpadUp),
            GamepadKey::DPadDown => Some(NavInput::DpadDown),
            GamepadKey::DPadLeft => Some(NavInput::DpadLeft),
            GamepadKey::DPadRight => Some(NavInput::DpadRight),
            GamepadKey::LeftShoulder => Some(NavInput::FocusPrev),
            GamepadKey::RightShoulder => Some(NavInput::FocusNext),
            GamepadKey::LeftTrigger => Some(NavInput::TweakSlow),
            GamepadKey::RightTrigger => Some(NavInput::TweakFast),
            GamepadKey::LeftThumb
            | GamepadKey::RightThumb
            | GamepadKey::Start
            | GamepadKey::Back => None,
        }
    }
}

/// Analog gamepad axes
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GamepadAxis {
    LeftStickX,
    LeftStickY,
    RightStickX,
    RightStickY,
    LeftTrigger,
    RightTrigger,
}

impl GamepadAxis {
    /// Navigation inputs driven by the negative and positive half of this axis
    ///
    /// Stick Y is positive upwards.
    pub const fn nav_inputs(self) -> Option<(NavInput, NavInput)> {
        match self {
            GamepadAxis::LeftStickX => Some((NavInput::LStickLeft, NavInput::LStickRight)),
            GamepadAxis::LeftStickY => Some((NavInput::LStickDown, NavInput::LStickUp)),
            _ => None,
        }
    }
}

/// Gamepad navigation inputs consumed by the GUI library
#[repr(usize)]
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub enum NavInput {
    Activate,
    Cancel,
    Input,
    Menu,
    DpadLeft,
    DpadRight,
    DpadUp,
    DpadDown,
    LStickLeft,
    LStickRight,
    LStickUp,
    LStickDown,
    FocusPrev,
    FocusNext,
    TweakSlow,
    TweakFast,
}

impl NavInput {
    /// Number of navigation inputs
    pub const COUNT: usize = 16;

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mouse_button_indices() {
        for (i, button) in MouseButton::ALL.iter().enumerate() {
            assert_eq!(button.index(), i);
        }
        assert_eq!(MouseButton::Extra2.flag(), MouseButtons::EXTRA2);
    }

    #[test]
    fn test_modifier_keys() {
        assert_eq!(Key::RightShift.modifier(), Some(KeyModFlags::SHIFT));
        assert_eq!(Key::LeftSuper.modifier(), Some(KeyModFlags::SUPER));
        assert!(!Key::A.is_modifier());
    }

    #[test]
    fn test_gamepad_navigation_mapping() {
        assert_eq!(
            GamepadKey::FaceButtonBottom.nav_input(),
            Some(NavInput::Activate)
        );
        assert_eq!(GamepadKey::RightShoulder.nav_input(), Some(NavInput::FocusNext));
        assert_eq!(GamepadKey::Start.nav_input(), None);
        assert_eq!(
            GamepadAxis::LeftStickY.nav_inputs(),
            Some((NavInput::LStickDown, NavInput::LStickUp))
        );
        assert_eq!(GamepadAxis::RightStickX.nav_inputs(), None);
        assert_eq!(NavInput::TweakFast.index(), NavInput::COUNT - 1);
    }
}
