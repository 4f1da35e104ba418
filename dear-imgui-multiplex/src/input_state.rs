//! Per-context input snapshot and its ownership queue
//!
//! An [`InputState`] collects keyboard, mouse and gamepad input for one
//! context between two frames. Several surfaces may point at the same
//! context; [`InputOwnership`] decides which one of them writes into it.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::input::{GamepadAxis, GamepadKey, Key, KeyModFlags, MouseButton, NavInput};

/// Identity of a visual surface
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub struct SurfaceId(u64);

impl SurfaceId {
    /// Allocate a fresh, process-unique id
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        SurfaceId(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// Normalized input collected for one context
#[derive(Clone, Debug)]
pub struct InputState {
    keys_down: HashSet<Key>,
    characters: Vec<char>,
    mouse_position: Option<[f32; 2]>,
    mouse_down: [bool; MouseButton::COUNT],
    mouse_wheel: f32,
    modifiers: KeyModFlags,
    nav_inputs: [f32; NavInput::COUNT],
    gamepad_navigation: bool,
    keyboard_navigation: bool,
    has_mouse_pointer: bool,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            keys_down: HashSet::new(),
            characters: Vec::new(),
            mouse_position: None,
            mouse_down: [false; MouseButton::COUNT],
            mouse_wheel: 0.0,
            modifiers: KeyModFlags::empty(),
            nav_inputs: [0.0; NavInput::COUNT],
            gamepad_navigation: false,
            keyboard_navigation: false,
            has_mouse_pointer: false,
        }
    }
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    // Keyboard

    pub fn set_key_down(&mut self, key: Key, down: bool) {
        if down {
            self.keys_down.insert(key);
        } else {
            self.keys_down.remove(&key);
        }
    }

    pub fn is_key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    pub fn keys_down(&self) -> impl Iterator<Item = Key> + '_ {
        self.keys_down.iter().copied()
    }

    pub fn add_character(&mut self, character: char) {
        self.characters.push(character);
    }

    /// Characters typed since the last completed frame
    pub fn characters(&self) -> &[char] {
        &self.characters
    }

    pub fn set_modifiers(&mut self, modifiers: KeyModFlags) {
        self.modifiers = modifiers;
    }

    pub fn modifiers(&self) -> KeyModFlags {
        self.modifiers
    }

    // Mouse

    /// Set the pointer position in context space; `None` means no pointer
    pub fn set_mouse_position(&mut self, position: Option<[f32; 2]>) {
        self.mouse_position = position;
    }

    pub fn mouse_position(&self) -> Option<[f32; 2]> {
        self.mouse_position
    }

    pub fn set_mouse_down(&mut self, button: MouseButton, down: bool) {
        self.mouse_down[button.index()] = down;
    }

    pub fn is_mouse_down(&self, button: MouseButton) -> bool {
        self.mouse_down[button.index()]
    }

    pub fn mouse_down(&self) -> [bool; MouseButton::COUNT] {
        self.mouse_down
    }

    pub fn add_mouse_wheel_delta(&mut self, delta: f32) {
        self.mouse_wheel += delta;
    }

    /// Wheel movement accumulated since the last completed frame
    pub fn mouse_wheel(&self) -> f32 {
        self.mouse_wheel
    }

    pub fn set_mouse_pointer(&mut self, has_pointer: bool) {
        self.has_mouse_pointer = has_pointer;
    }

    /// Whether the GUI should draw its own software cursor
    pub fn has_mouse_pointer(&self) -> bool {
        self.has_mouse_pointer
    }

    // Navigation

    pub fn set_gamepad_navigation(&mut self, enabled: bool) {
        self.gamepad_navigation = enabled;
    }

    pub fn is_gamepad_navigation_enabled(&self) -> bool {
        self.gamepad_navigation
    }

    pub fn set_keyboard_navigation(&mut self, enabled: bool) {
        self.keyboard_navigation = enabled;
    }

    pub fn is_keyboard_navigation_enabled(&self) -> bool {
        self.keyboard_navigation
    }

    /// Fold a gamepad button into the navigation inputs
    pub fn set_gamepad_nav_key(&mut self, key: GamepadKey, down: bool) {
        if let Some(nav) = key.nav_input() {
            self.nav_inputs[nav.index()] = if down { 1.0 } else { 0.0 };
        }
    }

    /// Fold an analog axis into the navigation inputs
    ///
    /// The axis is split by sign: only the half matching the sign of `value`
    /// is non-zero.
    pub fn set_gamepad_nav_axis(&mut self, axis: GamepadAxis, value: f32) {
        if let Some((negative, positive)) = axis.nav_inputs() {
            self.nav_inputs[negative.index()] = (-value).max(0.0);
            self.nav_inputs[positive.index()] = value.max(0.0);
        }
    }

    pub fn nav_input(&self, nav: NavInput) -> f32 {
        self.nav_inputs[nav.index()]
    }

    pub fn nav_inputs(&self) -> &[f32; NavInput::COUNT] {
        &self.nav_inputs
    }

    // Resets

    /// Drop everything held, keeping the navigation switches
    pub fn reset_state(&mut self) {
        self.reset_keyboard_state();
        self.reset_mouse_state();
        self.reset_navigation_state();
    }

    pub fn reset_keyboard_state(&mut self) {
        self.keys_down.clear();
        self.characters.clear();
        self.modifiers = KeyModFlags::empty();
    }

    /// Release buttons and forget the pointer position
    pub fn reset_mouse_state(&mut self) {
        self.mouse_position = None;
        self.mouse_down = [false; MouseButton::COUNT];
        self.mouse_wheel = 0.0;
    }

    pub fn reset_navigation_state(&mut self) {
        self.nav_inputs = [0.0; NavInput::COUNT];
    }

    /// Clear per-frame transient fields after a completed frame
    ///
    /// Key and button down-state survive.
    pub fn clear_update_state(&mut self) {
        self.characters.clear();
        self.mouse_wheel = 0.0;
    }
}

/// Request queue deciding which surface owns a context's input state
///
/// The front of the queue is the owner. Requests from other surfaces are
/// queued behind it and ownership only moves on an explicit release.
#[derive(Clone, Debug, Default)]
pub struct InputOwnership {
    requests: VecDeque<SurfaceId>,
}

impl InputOwnership {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `surface` as a requester; returns whether it now owns the state
    pub fn request(&mut self, surface: SurfaceId) -> bool {
        if !self.requests.contains(&surface) {
            self.requests.push_back(surface);
        }
        self.is_owner(surface)
    }

    /// Remove `surface` from the queue; returns the new owner if ownership moved
    ///
    /// Releasing a surface that is not queued does nothing.
    pub fn release(&mut self, surface: SurfaceId) -> Option<SurfaceId> {
        let position = self.requests.iter().position(|id| *id == surface)?;
        self.requests.remove(position);
        if position == 0 { self.owner() } else { None }
    }

    pub fn owner(&self) -> Option<SurfaceId> {
        self.requests.front().copied()
    }

    #[inline]
    pub fn is_owner(&self, surface: SurfaceId) -> bool {
        self.owner() == Some(surface)
    }

    pub fn is_queued(&self, surface: SurfaceId) -> bool {
        self.requests.contains(&surface)
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}
