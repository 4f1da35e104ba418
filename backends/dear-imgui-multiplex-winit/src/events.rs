//! Window event routing into a surface
//!
//! [`WinitSurfaceInput`] keeps the bits of input state winit only reports as
//! deltas (modifiers, held buttons, last cursor position) and turns each
//! [`WindowEvent`] into the matching [`Surface`] call.

use dear_imgui_multiplex::{
    CharacterEvent, EventReply, GuiContext, KeyEvent, KeyModFlags, MouseButtons, PointerEvent,
    Surface,
};
use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, Ime, KeyEvent as WinitKeyEvent, MouseScrollDelta, WindowEvent};
use winit::keyboard::ModifiersState;

use crate::input::{to_key, to_key_mod_flags, to_mouse_button, update_pressed};

/// Lines per pixel for touchpad scrolling
const PIXELS_PER_LINE: f32 = 100.0;

/// Per-window input tracker feeding one surface
#[derive(Clone, Debug)]
pub struct WinitSurfaceInput {
    modifiers: KeyModFlags,
    pressed: MouseButtons,
    position: [f32; 2],
    scale_factor: f64,
}

impl Default for WinitSurfaceInput {
    fn default() -> Self {
        Self {
            modifiers: KeyModFlags::empty(),
            pressed: MouseButtons::empty(),
            position: [0.0, 0.0],
            scale_factor: 1.0,
        }
    }
}

impl WinitSurfaceInput {
    /// Tracker for a window with the given scale factor
    ///
    /// Pointer positions are reported to the surface in logical pixels.
    pub fn new(scale_factor: f64) -> Self {
        Self {
            scale_factor,
            ..Self::default()
        }
    }

    pub fn modifiers(&self) -> KeyModFlags {
        self.modifiers
    }

    pub fn pressed_buttons(&self) -> MouseButtons {
        self.pressed
    }

    /// Last cursor position in logical pixels
    pub fn cursor_position(&self) -> [f32; 2] {
        self.position
    }

    /// Route one window event; events a surface does not care about are unhandled
    pub fn handle_window_event<C: GuiContext + 'static>(
        &mut self,
        surface: &mut Surface<C>,
        event: &WindowEvent,
    ) -> EventReply {
        match event {
            WindowEvent::ModifiersChanged(modifiers) => {
                self.modifiers_changed(modifiers.state());
                EventReply::Unhandled
            }
            WindowEvent::KeyboardInput { event, .. } => self.keyboard_input(surface, event),
            WindowEvent::Ime(Ime::Commit(text)) => self.text_input(surface, text),
            WindowEvent::CursorMoved { position, .. } => self.cursor_moved(surface, *position),
            WindowEvent::CursorEntered { .. } => {
                surface.on_mouse_enter(&self.pointer());
                EventReply::Unhandled
            }
            WindowEvent::CursorLeft { .. } => {
                surface.on_mouse_leave();
                EventReply::Unhandled
            }
            WindowEvent::MouseInput { state, button, .. } => match to_mouse_button(*button) {
                Some(button) => self.mouse_button(surface, button, *state),
                None => EventReply::Unhandled,
            },
            WindowEvent::MouseWheel { delta, .. } => self.mouse_wheel(surface, *delta),
            WindowEvent::Focused(true) => {
                surface.on_focus_received();
                EventReply::Unhandled
            }
            WindowEvent::Focused(false) => {
                surface.on_focus_lost();
                EventReply::Unhandled
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                #[cfg(feature = "tracing")]
                tracing::debug!("Scale factor {} -> {}", self.scale_factor, scale_factor);
                self.scale_factor = *scale_factor;
                EventReply::Unhandled
            }
            _ => EventReply::Unhandled,
        }
    }

    pub fn modifiers_changed(&mut self, state: ModifiersState) {
        self.modifiers = to_key_mod_flags(state);
    }

    /// Key press or release, followed by the text it produced
    pub fn keyboard_input<C: GuiContext + 'static>(
        &mut self,
        surface: &mut Surface<C>,
        event: &WinitKeyEvent,
    ) -> EventReply {
        let Some(key) = to_key(&event.logical_key, event.location) else {
            return match (&event.text, event.state) {
                (Some(text), ElementState::Pressed) => self.text_input(surface, text),
                _ => EventReply::Unhandled,
            };
        };

        let key_event = KeyEvent::new(key)
            .with_modifiers(self.modifiers)
            .with_repeat(event.repeat);
        match event.state {
            ElementState::Pressed => {
                let reply = surface.on_key_down(&key_event);
                if let Some(text) = &event.text {
                    self.text_input(surface, text);
                }
                reply
            }
            ElementState::Released => surface.on_key_up(&key_event),
        }
    }

    /// Typed text; control characters other than tab and newlines are dropped
    pub fn text_input<C: GuiContext + 'static>(
        &mut self,
        surface: &mut Surface<C>,
        text: &str,
    ) -> EventReply {
        let mut reply = EventReply::Unhandled;
        for character in text
            .chars()
            .filter(|ch| !ch.is_control() || matches!(ch, '\t' | '\n' | '\r'))
        {
            let event = CharacterEvent::new(character).with_modifiers(self.modifiers);
            if surface.on_key_char(&event).is_handled() {
                reply = EventReply::Handled;
            }
        }
        reply
    }

    pub fn cursor_moved<C: GuiContext + 'static>(
        &mut self,
        surface: &mut Surface<C>,
        position: PhysicalPosition<f64>,
    ) -> EventReply {
        let logical = position.to_logical::<f64>(self.scale_factor);
        self.position = [logical.x as f32, logical.y as f32];
        surface.on_mouse_move(&self.pointer())
    }

    pub fn mouse_button<C: GuiContext + 'static>(
        &mut self,
        surface: &mut Surface<C>,
        button: dear_imgui_multiplex::MouseButton,
        state: ElementState,
    ) -> EventReply {
        let down = state == ElementState::Pressed;
        self.pressed = update_pressed(self.pressed, button, down);
        let event = self.pointer().with_button(button);
        if down {
            surface.on_mouse_button_down(&event)
        } else {
            surface.on_mouse_button_up(&event)
        }
    }

    pub fn mouse_wheel<C: GuiContext + 'static>(
        &mut self,
        surface: &mut Surface<C>,
        delta: MouseScrollDelta,
    ) -> EventReply {
        let lines = match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / PIXELS_PER_LINE,
        };
        surface.on_mouse_wheel(&self.pointer().with_wheel_delta(lines))
    }

    fn pointer(&self) -> PointerEvent {
        PointerEvent::new(self.position)
            .with_modifiers(self.modifiers)
            .with_pressed_buttons(self.pressed)
    }
}
