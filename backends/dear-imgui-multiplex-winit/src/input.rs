//! Key, button and modifier translation from winit
//!
//! winit reports logical keys plus a location; the multiplexer wants one
//! [`Key`] per physical position, so numpad and left/right variants are
//! resolved here.

use dear_imgui_multiplex::{Key, KeyModFlags, MouseButton, MouseButtons};
use winit::event::MouseButton as WinitMouseButton;
use winit::keyboard::{Key as WinitKey, KeyLocation, ModifiersState, NamedKey};

/// Convert a winit mouse button
pub fn to_mouse_button(button: WinitMouseButton) -> Option<MouseButton> {
    match button {
        WinitMouseButton::Left => Some(MouseButton::Left),
        WinitMouseButton::Right => Some(MouseButton::Right),
        WinitMouseButton::Middle => Some(MouseButton::Middle),
        WinitMouseButton::Back | WinitMouseButton::Other(3) => Some(MouseButton::Extra1),
        WinitMouseButton::Forward | WinitMouseButton::Other(4) => Some(MouseButton::Extra2),
        WinitMouseButton::Other(_) => None,
    }
}

/// Convert winit's modifier state
pub fn to_key_mod_flags(state: ModifiersState) -> KeyModFlags {
    let mut flags = KeyModFlags::empty();
    flags.set(KeyModFlags::SHIFT, state.shift_key());
    flags.set(KeyModFlags::CTRL, state.control_key());
    flags.set(KeyModFlags::ALT, state.alt_key());
    flags.set(KeyModFlags::SUPER, state.super_key());
    flags
}

/// Convert a winit logical key at `location`
pub fn to_key(key: &WinitKey, location: KeyLocation) -> Option<Key> {
    match key {
        WinitKey::Character(text) => character_key(text.chars().next()?, location),
        WinitKey::Named(named) => named_key(*named, location),
        _ => None,
    }
}

const DIGITS: [Key; 10] = [
    Key::Key0,
    Key::Key1,
    Key::Key2,
    Key::Key3,
    Key::Key4,
    Key::Key5,
    Key::Key6,
    Key::Key7,
    Key::Key8,
    Key::Key9,
];

const KEYPAD_DIGITS: [Key; 10] = [
    Key::Keypad0,
    Key::Keypad1,
    Key::Keypad2,
    Key::Keypad3,
    Key::Keypad4,
    Key::Keypad5,
    Key::Keypad6,
    Key::Keypad7,
    Key::Keypad8,
    Key::Keypad9,
];

const LETTERS: [Key; 26] = [
    Key::A,
    Key::B,
    Key::C,
    Key::D,
    Key::E,
    Key::F,
    Key::G,
    Key::H,
    Key::I,
    Key::J,
    Key::K,
    Key::L,
    Key::M,
    Key::N,
    Key::O,
    Key::P,
    Key::Q,
    Key::R,
    Key::S,
    Key::T,
    Key::U,
    Key::V,
    Key::W,
    Key::X,
    Key::Y,
    Key::Z,
];

fn character_key(ch: char, location: KeyLocation) -> Option<Key> {
    let numpad = location == KeyLocation::Numpad;
    if let Some(digit) = ch.to_digit(10) {
        let table = if numpad { &KEYPAD_DIGITS } else { &DIGITS };
        return Some(table[digit as usize]);
    }
    if ch.is_ascii_alphabetic() {
        let index = (ch.to_ascii_lowercase() as u8 - b'a') as usize;
        return Some(LETTERS[index]);
    }
    let key = match (ch, numpad) {
        ('-', true) => Key::KeypadSubtract,
        ('.', true) => Key::KeypadDecimal,
        ('/', true) => Key::KeypadDivide,
        ('=', true) => Key::KeypadEqual,
        ('*', true) => Key::KeypadMultiply,
        ('+', true) => Key::KeypadAdd,
        ('-', false) => Key::Minus,
        ('.', false) => Key::Period,
        ('/', false) => Key::Slash,
        ('=', false) => Key::Equal,
        ('\'', _) => Key::Apostrophe,
        (',', _) => Key::Comma,
        (';', _) => Key::Semicolon,
        ('[', _) => Key::LeftBracket,
        ('\\', _) => Key::Backslash,
        (']', _) => Key::RightBracket,
        ('`', _) => Key::GraveAccent,
        _ => return None,
    };
    Some(key)
}

fn sided(location: KeyLocation, left: Key, right: Key) -> Key {
    if location == KeyLocation::Right {
        right
    } else {
        left
    }
}

fn named_key(named: NamedKey, location: KeyLocation) -> Option<Key> {
    let key = match named {
        NamedKey::ArrowDown => Key::DownArrow,
        NamedKey::ArrowLeft => Key::LeftArrow,
        NamedKey::ArrowRight => Key::RightArrow,
        NamedKey::ArrowUp => Key::UpArrow,
        NamedKey::End => Key::End,
        NamedKey::Home => Key::Home,
        NamedKey::PageDown => Key::PageDown,
        NamedKey::PageUp => Key::PageUp,
        NamedKey::Backspace => Key::Backspace,
        NamedKey::Delete => Key::Delete,
        NamedKey::Insert => Key::Insert,
        NamedKey::Tab => Key::Tab,
        NamedKey::Space => Key::Space,
        NamedKey::Enter if location == KeyLocation::Numpad => Key::KeypadEnter,
        NamedKey::Enter => Key::Enter,
        NamedKey::Escape => Key::Escape,
        NamedKey::Shift => sided(location, Key::LeftShift, Key::RightShift),
        NamedKey::Control => sided(location, Key::LeftCtrl, Key::RightCtrl),
        NamedKey::Alt => sided(location, Key::LeftAlt, Key::RightAlt),
        NamedKey::Super => sided(location, Key::LeftSuper, Key::RightSuper),
        NamedKey::F1 => Key::F1,
        NamedKey::F2 => Key::F2,
        NamedKey::F3 => Key::F3,
        NamedKey::F4 => Key::F4,
        NamedKey::F5 => Key::F5,
        NamedKey::F6 => Key::F6,
        NamedKey::F7 => Key::F7,
        NamedKey::F8 => Key::F8,
        NamedKey::F9 => Key::F9,
        NamedKey::F10 => Key::F10,
        NamedKey::F11 => Key::F11,
        NamedKey::F12 => Key::F12,
        NamedKey::CapsLock => Key::CapsLock,
        NamedKey::ScrollLock => Key::ScrollLock,
        NamedKey::NumLock => Key::NumLock,
        NamedKey::PrintScreen => Key::PrintScreen,
        NamedKey::Pause => Key::Pause,
        NamedKey::ContextMenu => Key::Menu,
        _ => return None,
    };
    Some(key)
}

/// Flag set with `button` added or removed
pub(crate) fn update_pressed(pressed: MouseButtons, button: MouseButton, down: bool) -> MouseButtons {
    let mut pressed = pressed;
    pressed.set(button.flag(), down);
    pressed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(text: &str, location: KeyLocation) -> Option<Key> {
        to_key(&WinitKey::Character(text.into()), location)
    }

    #[test]
    fn test_mouse_button_mapping() {
        assert_eq!(to_mouse_button(WinitMouseButton::Left), Some(MouseButton::Left));
        assert_eq!(to_mouse_button(WinitMouseButton::Back), Some(MouseButton::Extra1));
        assert_eq!(
            to_mouse_button(WinitMouseButton::Other(4)),
            Some(MouseButton::Extra2)
        );
        assert_eq!(to_mouse_button(WinitMouseButton::Other(10)), None);
    }

    #[test]
    fn test_character_keys() {
        assert_eq!(key("a", KeyLocation::Standard), Some(Key::A));
        assert_eq!(key("Z", KeyLocation::Standard), Some(Key::Z));
        assert_eq!(key("7", KeyLocation::Standard), Some(Key::Key7));
        assert_eq!(key("7", KeyLocation::Numpad), Some(Key::Keypad7));
        assert_eq!(key("-", KeyLocation::Numpad), Some(Key::KeypadSubtract));
        assert_eq!(key("`", KeyLocation::Standard), Some(Key::GraveAccent));
        assert_eq!(key("é", KeyLocation::Standard), None);
    }

    #[test]
    fn test_named_keys() {
        let named = |named, location| to_key(&WinitKey::Named(named), location);
        assert_eq!(
            named(NamedKey::Enter, KeyLocation::Numpad),
            Some(Key::KeypadEnter)
        );
        assert_eq!(
            named(NamedKey::Control, KeyLocation::Right),
            Some(Key::RightCtrl)
        );
        assert_eq!(
            named(NamedKey::Shift, KeyLocation::Standard),
            Some(Key::LeftShift)
        );
        assert_eq!(named(NamedKey::MediaPlay, KeyLocation::Standard), None);
    }

    #[test]
    fn test_modifier_flags() {
        let state = ModifiersState::SHIFT | ModifiersState::SUPER;
        assert_eq!(
            to_key_mod_flags(state),
            KeyModFlags::SHIFT | KeyModFlags::SUPER
        );
        assert!(to_key_mod_flags(ModifiersState::empty()).is_empty());
    }
}
