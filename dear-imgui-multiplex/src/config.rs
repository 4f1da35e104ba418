//! Runtime settings
//!
//! Plain `Default` structs. With the `serde` feature they can be loaded from
//! whatever format the host keeps its configuration in.

use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{MultiplexError, MultiplexResult};
use crate::events::KeyEvent;
use crate::input::{Key, KeyModFlags};

/// Top-level settings shared by every surface
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Settings {
    /// The GUI draws its own cursor instead of the host
    pub draw_mouse_cursor: bool,
    /// Show a per-surface debug overlay with the context name and input mode
    pub debug_surface: bool,
    /// Size every surface reports as desired, independent of content
    pub canvas_size: [f32; 2],
    pub input: InputSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            draw_mouse_cursor: false,
            debug_surface: false,
            canvas_size: [3840.0, 2160.0],
            input: InputSettings::default(),
        }
    }
}

impl Settings {
    pub fn validate(&self) -> MultiplexResult<()> {
        let [w, h] = self.canvas_size;
        if !(w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0) {
            return Err(MultiplexError::configuration(format!(
                "canvas_size must be positive, got {}x{}",
                w, h
            )));
        }
        if self.input.escape_bindings.is_empty() {
            crate::multiplex_warn!(
                "No escape bindings configured; the GUI will swallow the stop-session hotkey"
            );
        }
        Ok(())
    }
}

/// Settings for input routing
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct InputSettings {
    /// Keys that open the host console; always passed through untouched
    pub console_keys: Vec<Key>,
    /// Host hotkeys passed through while the GUI has no active item
    pub escape_bindings: Vec<InputChord>,
    pub gamepad_navigation: bool,
    pub keyboard_navigation: bool,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            console_keys: vec![Key::GraveAccent],
            escape_bindings: vec![InputChord::new(Key::Escape)],
            gamepad_navigation: false,
            keyboard_navigation: false,
        }
    }
}

/// A key plus an exact set of modifiers
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InputChord {
    pub key: Key,
    #[cfg_attr(feature = "serde", serde(default))]
    pub shift: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub ctrl: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub alt: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub command: bool,
}

impl InputChord {
    pub const fn new(key: Key) -> Self {
        Self {
            key,
            shift: false,
            ctrl: false,
            alt: false,
            command: false,
        }
    }

    pub const fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub const fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub const fn with_alt(mut self) -> Self {
        self.alt = true;
        self
    }

    pub const fn with_command(mut self) -> Self {
        self.command = true;
        self
    }

    pub fn modifiers(&self) -> KeyModFlags {
        let mut flags = KeyModFlags::empty();
        flags.set(KeyModFlags::SHIFT, self.shift);
        flags.set(KeyModFlags::CTRL, self.ctrl);
        flags.set(KeyModFlags::ALT, self.alt);
        flags.set(KeyModFlags::SUPER, self.command);
        flags
    }

    /// Same key with exactly the same modifiers held
    pub fn matches(&self, event: &KeyEvent) -> bool {
        event.keyboard_key() == Some(self.key) && event.modifiers == self.modifiers()
    }
}

/// Settings shared between the module and its surfaces
///
/// Every replacement bumps a generation counter; surfaces compare it on each
/// event and rebuild their input handler when it changed.
#[derive(Clone, Debug, Default)]
pub struct SharedSettings {
    inner: Rc<SettingsSlot>,
}

#[derive(Debug, Default)]
struct SettingsSlot {
    settings: RefCell<Settings>,
    generation: Cell<u64>,
}

impl SharedSettings {
    pub fn new(settings: Settings) -> Self {
        Self {
            inner: Rc::new(SettingsSlot {
                settings: RefCell::new(settings),
                generation: Cell::new(0),
            }),
        }
    }

    pub fn get(&self) -> Ref<'_, Settings> {
        self.inner.settings.borrow()
    }

    pub fn generation(&self) -> u64 {
        self.inner.generation.get()
    }

    pub fn replace(&self, settings: Settings) {
        *self.inner.settings.borrow_mut() = settings;
        self.inner.generation.set(self.generation() + 1);
    }
}
